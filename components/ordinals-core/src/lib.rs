#[macro_use]
extern crate hiro_system_kit;

#[macro_use]
extern crate serde_derive;

#[macro_use]
extern crate lazy_static;

extern crate serde;

pub extern crate hex;
pub extern crate rusqlite;

pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod ord;
pub mod query;
pub mod types;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

use config::Config;
use db::initialize_ordinals_db;
use error::IndexerError;
use rusqlite::Connection;
use utils::Context;

pub fn initialize_db(config: &Config, ctx: &Context) -> Result<Connection, IndexerError> {
    initialize_ordinals_db(config.expected_cache_path().as_ref(), ctx)
}
