//! Opaque tokens changing whenever the data behind a read changes.

use rusqlite::{Connection, ToSql};

use super::{find_inscription, InscriptionIdentifier};
use crate::{
    db::{
        get_chain_tip, locations::find_current_location, perform_query_one,
        stats::find_latest_block_stats,
    },
    error::IndexerError,
};

/// Timestamp in seconds of the inscription's latest location.
pub fn inscription_etag(
    identifier: &InscriptionIdentifier,
    db_conn: &Connection,
) -> Result<Option<String>, IndexerError> {
    let Some(inscription) = find_inscription(identifier, db_conn)? else {
        return Ok(None);
    };
    Ok(find_current_location(&inscription.genesis_id, db_conn)?
        .map(|location| location.timestamp.to_string()))
}

/// `<tip hash>:<write sequence>`.
pub fn inscriptions_index_etag(db_conn: &Connection) -> Result<String, IndexerError> {
    let tip = get_chain_tip(db_conn)?;
    Ok(format!(
        "{}:{}",
        tip.block_hash
            .unwrap_or_else(|| tip.block_height.to_string()),
        tip.write_sequence
    ))
}

/// `<block hash>:<transfer count>` of the highest block holding transfers,
/// `0` when nothing was ever transferred.
pub fn transfers_per_block_etag(db_conn: &Connection) -> Result<String, IndexerError> {
    let args: &[&dyn ToSql] = &[];
    let latest: Option<(String, u64)> = perform_query_one(
        "SELECT block_hash, COUNT(*) FROM locations
        WHERE is_genesis = 0
            AND block_height = (SELECT MAX(block_height) FROM locations WHERE is_genesis = 0)
        GROUP BY block_hash",
        args,
        db_conn,
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(match latest {
        Some((block_hash, count)) => format!("{}:{}", block_hash, count),
        None => "0".to_string(),
    })
}

pub fn inscriptions_per_block_etag(db_conn: &Connection) -> Result<Option<String>, IndexerError> {
    Ok(find_latest_block_stats(db_conn)?.map(|stats| stats.block_hash))
}
