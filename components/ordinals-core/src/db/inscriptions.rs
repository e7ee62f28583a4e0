use rusqlite::{Connection, Row, ToSql};

use super::{perform_query_exists, perform_query_one};
use crate::error::IndexerError;

#[derive(Debug, Clone, PartialEq)]
pub struct DbInscription {
    pub genesis_id: String,
    pub number: i64,
    pub classic_number: i64,
    pub jubilee_number: i64,
    pub ordinal_number: u64,
    pub sat_coinbase_height: u64,
    pub sat_coinbase_offset: u64,
    pub block_height: u64,
    pub block_hash: String,
    pub tx_id: String,
    pub tx_index: u64,
    pub timestamp: u32,
    pub fee: u64,
    pub address: String,
    pub content_type: String,
    pub mime_type: String,
    pub content_length: u64,
    pub curse_type: Option<String>,
    pub delegate: Option<String>,
    pub metaprotocol: Option<String>,
    pub metadata: Option<String>,
    pub parent: Option<String>,
    pub recursive: bool,
    pub recursion_refs: Option<Vec<String>>,
}

pub const INSCRIPTION_COLUMNS: &str = "i.genesis_id, i.number, i.classic_number, i.jubilee_number, \
    i.ordinal_number, i.sat_coinbase_height, i.sat_coinbase_offset, i.block_height, i.block_hash, \
    i.tx_id, i.tx_index, i.timestamp, i.fee, i.address, i.content_type, i.mime_type, \
    i.content_length, i.curse_type, i.delegate, i.metaprotocol, i.metadata, i.parent, \
    i.recursive, i.recursion_refs";

pub const INSCRIPTION_COLUMN_COUNT: usize = 24;

/// Maps a row selected with [`INSCRIPTION_COLUMNS`], starting at column 0.
pub fn inscription_from_row(row: &Row<'_>) -> Result<DbInscription, rusqlite::Error> {
    let recursion_refs: Option<String> = row.get(23)?;
    let recursion_refs = match recursion_refs {
        Some(encoded) => Some(serde_json::from_str(&encoded).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(23, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };
    Ok(DbInscription {
        genesis_id: row.get(0)?,
        number: row.get(1)?,
        classic_number: row.get(2)?,
        jubilee_number: row.get(3)?,
        ordinal_number: row.get(4)?,
        sat_coinbase_height: row.get(5)?,
        sat_coinbase_offset: row.get(6)?,
        block_height: row.get(7)?,
        block_hash: row.get(8)?,
        tx_id: row.get(9)?,
        tx_index: row.get(10)?,
        timestamp: row.get(11)?,
        fee: row.get(12)?,
        address: row.get(13)?,
        content_type: row.get(14)?,
        mime_type: row.get(15)?,
        content_length: row.get(16)?,
        curse_type: row.get(17)?,
        delegate: row.get(18)?,
        metaprotocol: row.get(19)?,
        metadata: row.get(20)?,
        parent: row.get(21)?,
        recursive: row.get(22)?,
        recursion_refs,
    })
}

pub fn insert_inscription(
    inscription: &DbInscription,
    db_tx: &Connection,
) -> Result<(), IndexerError> {
    let recursion_refs = match inscription.recursion_refs {
        Some(ref refs) => Some(serde_json::to_string(refs)?),
        None => None,
    };
    db_tx.execute(
        "INSERT INTO inscriptions (
            genesis_id, number, classic_number, jubilee_number, ordinal_number,
            sat_coinbase_height, sat_coinbase_offset, block_height, block_hash, tx_id,
            tx_index, timestamp, fee, address, content_type, mime_type, content_length,
            curse_type, delegate, metaprotocol, metadata, parent, recursive, recursion_refs
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
            ?18, ?19, ?20, ?21, ?22, ?23, ?24)",
        rusqlite::params![
            &inscription.genesis_id,
            &inscription.number,
            &inscription.classic_number,
            &inscription.jubilee_number,
            &inscription.ordinal_number,
            &inscription.sat_coinbase_height,
            &inscription.sat_coinbase_offset,
            &inscription.block_height,
            &inscription.block_hash,
            &inscription.tx_id,
            &inscription.tx_index,
            &inscription.timestamp,
            &inscription.fee,
            &inscription.address,
            &inscription.content_type,
            &inscription.mime_type,
            &inscription.content_length,
            &inscription.curse_type,
            &inscription.delegate,
            &inscription.metaprotocol,
            &inscription.metadata,
            &inscription.parent,
            &inscription.recursive,
            &recursion_refs,
        ],
    )?;
    Ok(())
}

pub fn find_inscription_with_id(
    inscription_id: &str,
    db_conn: &Connection,
) -> Result<Option<DbInscription>, IndexerError> {
    let args: &[&dyn ToSql] = &[&inscription_id];
    let query = format!("SELECT {INSCRIPTION_COLUMNS} FROM inscriptions AS i WHERE i.genesis_id = ?1");
    perform_query_one(&query, args, db_conn, inscription_from_row)
}

/// Numbers are unique within a numbering epoch; the earliest genesis wins
/// should two epochs overlap.
pub fn find_inscription_with_number(
    number: i64,
    db_conn: &Connection,
) -> Result<Option<DbInscription>, IndexerError> {
    let args: &[&dyn ToSql] = &[&number];
    let query = format!(
        "SELECT {INSCRIPTION_COLUMNS} FROM inscriptions AS i WHERE i.number = ?1
        ORDER BY i.block_height ASC, i.tx_index ASC LIMIT 1"
    );
    perform_query_one(&query, args, db_conn, inscription_from_row)
}

pub fn inscription_exists(inscription_id: &str, db_conn: &Connection) -> Result<bool, IndexerError> {
    let args: &[&dyn ToSql] = &[&inscription_id];
    perform_query_exists(
        "SELECT 1 FROM inscriptions WHERE genesis_id = ?1",
        args,
        db_conn,
    )
}

pub fn delete_inscription(inscription_id: &str, db_tx: &Connection) -> Result<(), IndexerError> {
    db_tx.execute(
        "DELETE FROM inscriptions WHERE genesis_id = ?1",
        rusqlite::params![&inscription_id],
    )?;
    Ok(())
}
