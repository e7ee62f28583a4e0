use std::fmt::{Display, Formatter};
use std::str::FromStr;

use super::{height::Height, sat::Sat};

/// Sat rarity tiers, declared from most to least common so that the derived
/// ordering matches the rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    /// Evaluated by descending priority; the first matching tier wins.
    pub fn classify(ordinal_number: u64, coinbase_height: Height, coinbase_offset: u64) -> Rarity {
        if ordinal_number == 0 {
            return Rarity::Mythic;
        }
        if coinbase_offset != 0 {
            return Rarity::Common;
        }
        let halving = coinbase_height.epoch_offset() == 0;
        let adjustment = coinbase_height.period_offset() == 0;
        match (halving, adjustment) {
            (true, true) => Rarity::Legendary,
            (true, false) => Rarity::Epic,
            (false, true) => Rarity::Rare,
            (false, false) => Rarity::Uncommon,
        }
    }

    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn from_rank(rank: u8) -> Option<Rarity> {
        Rarity::ALL.get(rank as usize).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Mythic => "mythic",
        }
    }
}

impl From<Sat> for Rarity {
    fn from(sat: Sat) -> Self {
        sat.rarity()
    }
}

impl Display for Rarity {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rarity::ALL
            .iter()
            .find(|rarity| rarity.as_str() == s)
            .copied()
            .ok_or_else(|| format!("invalid rarity: {s}"))
    }
}
