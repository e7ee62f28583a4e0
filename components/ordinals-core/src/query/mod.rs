//! Read side of the index.
//!
//! Every function here only reads, so any number of connections may serve
//! queries while the ingestion worker writes. Unknown inscriptions come back
//! as `None` rather than as errors.

pub mod etag;
pub mod inscriptions;
pub mod stats;
pub mod transfers;

use std::fmt;
use std::str::FromStr;

use rusqlite::Connection;
use serde_json::Value as JsonValue;

use crate::{
    config::QueryConfig,
    db::{
        inscriptions::{find_inscription_with_id, find_inscription_with_number, DbInscription},
        locations::DbLocation,
    },
    error::IndexerError,
    ord::{inscription_id::InscriptionId, rarity::Rarity, sat::Sat},
    utils::timestamp_to_millis,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl Pagination {
    pub fn new(offset: usize, limit: usize) -> Pagination {
        Pagination {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    /// `(limit, offset)` once defaults and the configured ceiling apply.
    pub fn resolve(&self, config: &QueryConfig) -> (usize, usize) {
        let limit = self
            .limit
            .unwrap_or(config.default_page_limit)
            .min(config.max_page_limit);
        (limit, self.offset.unwrap_or(0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub limit: usize,
    pub offset: usize,
    pub total: u64,
    pub results: Vec<T>,
}

/// An inscription designated by its genesis id or by its number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InscriptionIdentifier {
    Id(InscriptionId),
    Number(i64),
}

impl FromStr for InscriptionIdentifier {
    type Err = IndexerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(number) = s.parse::<i64>() {
            return Ok(InscriptionIdentifier::Number(number));
        }
        InscriptionId::from_str(s)
            .map(InscriptionIdentifier::Id)
            .map_err(|e| IndexerError::InvalidIdentifier(format!("{s}: {e}")))
    }
}

impl fmt::Display for InscriptionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InscriptionIdentifier::Id(id) => write!(f, "{}", id),
            InscriptionIdentifier::Number(number) => write!(f, "{}", number),
        }
    }
}

pub fn find_inscription(
    identifier: &InscriptionIdentifier,
    db_conn: &Connection,
) -> Result<Option<DbInscription>, IndexerError> {
    match identifier {
        InscriptionIdentifier::Id(id) => find_inscription_with_id(&id.to_string(), db_conn),
        InscriptionIdentifier::Number(number) => find_inscription_with_number(*number, db_conn),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    #[default]
    GenesisBlockHeight,
    Number,
    Ordinal,
    Rarity,
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "genesis_block_height" => Ok(OrderBy::GenesisBlockHeight),
            "number" => Ok(OrderBy::Number),
            "ordinal" => Ok(OrderBy::Ordinal),
            "rarity" => Ok(OrderBy::Rarity),
            _ => Err(format!("unknown ordering {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl Order {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

impl FromStr for Order {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            _ => Err(format!("unknown order {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InscriptionResponse {
    pub id: String,
    pub number: i64,
    pub address: Option<String>,
    pub genesis_address: Option<String>,
    pub genesis_block_height: u64,
    pub genesis_block_hash: String,
    pub genesis_tx_id: String,
    pub genesis_fee: String,
    pub genesis_timestamp: i64,
    pub tx_id: String,
    pub location: String,
    pub output: String,
    pub value: Option<String>,
    pub offset: Option<String>,
    pub sat_ordinal: String,
    pub sat_rarity: Rarity,
    pub sat_coinbase_height: u64,
    pub mime_type: String,
    pub content_type: String,
    pub content_length: u64,
    pub timestamp: i64,
    pub curse_type: Option<String>,
    pub recursive: bool,
    pub recursion_refs: Option<Vec<String>>,
    pub parent: Option<String>,
    pub delegate: Option<String>,
    pub metadata: Option<JsonValue>,
    pub metaprotocol: Option<String>,
}

fn non_empty(address: &str) -> Option<String> {
    if address.is_empty() {
        None
    } else {
        Some(address.to_string())
    }
}

impl InscriptionResponse {
    pub fn from_db(
        inscription: DbInscription,
        current: &DbLocation,
    ) -> Result<InscriptionResponse, IndexerError> {
        let metadata = match inscription.metadata {
            Some(ref metadata) => Some(serde_json::from_str(metadata)?),
            None => None,
        };
        Ok(InscriptionResponse {
            address: non_empty(&current.address),
            genesis_address: non_empty(&inscription.address),
            genesis_block_height: inscription.block_height,
            genesis_block_hash: inscription.block_hash,
            genesis_tx_id: inscription.tx_id,
            genesis_fee: inscription.fee.to_string(),
            genesis_timestamp: timestamp_to_millis(inscription.timestamp),
            tx_id: current.tx_id.clone(),
            location: current.satpoint.clone(),
            output: current.output.clone(),
            value: current.value.map(|value| value.to_string()),
            offset: Some(current.offset.to_string()),
            sat_ordinal: inscription.ordinal_number.to_string(),
            sat_rarity: Sat(inscription.ordinal_number).rarity(),
            sat_coinbase_height: inscription.sat_coinbase_height,
            mime_type: inscription.mime_type,
            content_type: inscription.content_type,
            content_length: inscription.content_length,
            timestamp: timestamp_to_millis(current.timestamp),
            curse_type: inscription.curse_type,
            recursive: inscription.recursive,
            recursion_refs: inscription.recursion_refs,
            parent: inscription.parent,
            delegate: inscription.delegate,
            metadata,
            metaprotocol: inscription.metaprotocol,
            id: inscription.genesis_id,
            number: inscription.number,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationResponse {
    pub block_height: u64,
    pub block_hash: String,
    pub address: Option<String>,
    pub tx_id: String,
    pub location: String,
    pub output: String,
    pub value: Option<String>,
    pub offset: Option<String>,
    pub timestamp: i64,
}

impl From<DbLocation> for LocationResponse {
    fn from(location: DbLocation) -> Self {
        LocationResponse {
            block_height: location.block_height,
            address: non_empty(&location.address),
            block_hash: location.block_hash,
            tx_id: location.tx_id,
            location: location.satpoint,
            output: location.output,
            value: location.value.map(|value| value.to_string()),
            offset: Some(location.offset.to_string()),
            timestamp: timestamp_to_millis(location.timestamp),
        }
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use test_case::test_case;

    use super::{InscriptionIdentifier, Order, OrderBy, Pagination};
    use crate::config::Config;

    #[test_case(Pagination::default() => (20, 0); "defaults")]
    #[test_case(Pagination::new(40, 5) => (5, 40); "explicit")]
    #[test_case(Pagination::new(0, 500) => (60, 0); "clamped")]
    fn resolves_pagination(pagination: Pagination) -> (usize, usize) {
        pagination.resolve(&Config::test_default().query)
    }

    #[test]
    fn parses_identifiers() {
        assert_eq!(
            InscriptionIdentifier::from_str("-7").unwrap(),
            InscriptionIdentifier::Number(-7)
        );
        let id = "38c46a8bf7ec90bc7f6b797e7dc84baa97f4e5fd4286b92fe1b50176d03b18dci0";
        assert_eq!(
            InscriptionIdentifier::from_str(id).unwrap().to_string(),
            id.to_string()
        );
        assert!(InscriptionIdentifier::from_str("38c46a8bi0").is_err());
    }

    #[test]
    fn orderings_default_to_newest_genesis_first() {
        assert_eq!(OrderBy::default(), OrderBy::GenesisBlockHeight);
        assert_eq!(Order::default(), Order::Desc);
        assert_eq!(OrderBy::from_str("rarity"), Ok(OrderBy::Rarity));
        assert!(Order::from_str("sideways").is_err());
    }
}
