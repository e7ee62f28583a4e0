use rusqlite::{Connection, ToSql};

use super::{perform_query_one, perform_query_set};
use crate::error::IndexerError;
use crate::types::BlockIdentifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbBlockStats {
    pub block_height: u64,
    pub block_hash: String,
    pub timestamp: u32,
    pub inscription_count: u64,
    pub inscription_count_accum: u64,
}

fn block_stats_from_row(row: &rusqlite::Row<'_>) -> Result<DbBlockStats, rusqlite::Error> {
    Ok(DbBlockStats {
        block_height: row.get(0)?,
        block_hash: row.get(1)?,
        timestamp: row.get(2)?,
        inscription_count: row.get(3)?,
        inscription_count_accum: row.get(4)?,
    })
}

pub fn increment_inscription_count(
    block_identifier: &BlockIdentifier,
    timestamp: u32,
    db_tx: &Connection,
) -> Result<(), IndexerError> {
    db_tx.execute(
        "INSERT INTO inscriptions_per_block
            (block_height, block_hash, timestamp, inscription_count, inscription_count_accum)
        VALUES (?1, ?2, ?3, 1, 0)
        ON CONFLICT(block_height) DO UPDATE SET inscription_count = inscription_count + 1",
        rusqlite::params![&block_identifier.index, &block_identifier.hash, &timestamp],
    )?;
    Ok(())
}

/// Drops the row once its last genesis is gone.
pub fn decrement_inscription_count(block_height: u64, db_tx: &Connection) -> Result<(), IndexerError> {
    db_tx.execute(
        "UPDATE inscriptions_per_block SET inscription_count = inscription_count - 1
        WHERE block_height = ?1",
        rusqlite::params![&block_height],
    )?;
    db_tx.execute(
        "DELETE FROM inscriptions_per_block WHERE block_height = ?1 AND inscription_count <= 0",
        rusqlite::params![&block_height],
    )?;
    Ok(())
}

/// Rebuilds the running totals of every row at or above `from_height` out
/// of the rows currently present, so that rolled back blocks stop counting.
pub fn recompute_inscription_count_accum(
    from_height: u64,
    db_tx: &Connection,
) -> Result<(), IndexerError> {
    db_tx.execute(
        "UPDATE inscriptions_per_block SET inscription_count_accum = (
            SELECT SUM(p.inscription_count) FROM inscriptions_per_block AS p
            WHERE p.block_height <= inscriptions_per_block.block_height
        )
        WHERE block_height >= ?1",
        rusqlite::params![&from_height],
    )?;
    Ok(())
}

/// Rows within the optional height bounds, highest first.
pub fn find_block_stats(
    from_height: Option<u64>,
    to_height: Option<u64>,
    db_conn: &Connection,
) -> Result<Vec<DbBlockStats>, IndexerError> {
    let args: &[&dyn ToSql] = &[&from_height, &to_height];
    perform_query_set(
        "SELECT block_height, block_hash, timestamp, inscription_count, inscription_count_accum
        FROM inscriptions_per_block
        WHERE (?1 IS NULL OR block_height >= ?1) AND (?2 IS NULL OR block_height <= ?2)
        ORDER BY block_height DESC",
        args,
        db_conn,
        block_stats_from_row,
    )
}

pub fn find_latest_block_stats(db_conn: &Connection) -> Result<Option<DbBlockStats>, IndexerError> {
    perform_query_one(
        "SELECT block_height, block_hash, timestamp, inscription_count, inscription_count_accum
        FROM inscriptions_per_block ORDER BY block_height DESC LIMIT 1",
        &[],
        db_conn,
        block_stats_from_row,
    )
}

/// Heights whose stored running total disagrees with the rows present.
pub fn find_inconsistent_accumulations(db_conn: &Connection) -> Result<Vec<u64>, IndexerError> {
    perform_query_set(
        "SELECT b.block_height FROM inscriptions_per_block AS b
        WHERE b.inscription_count_accum != (
            SELECT SUM(p.inscription_count) FROM inscriptions_per_block AS p
            WHERE p.block_height <= b.block_height
        )
        ORDER BY b.block_height ASC",
        &[],
        db_conn,
        |row| row.get(0),
    )
}
