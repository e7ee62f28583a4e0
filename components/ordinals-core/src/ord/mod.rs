pub mod epoch;
pub mod height;
pub mod inscription_id;
pub mod rarity;
pub mod sat;
pub mod sat_point;

pub const DIFFCHANGE_INTERVAL: u64 = 2016;
pub const SUBSIDY_HALVING_INTERVAL: u64 = 210_000;
pub const COIN_VALUE: u64 = 100_000_000;
