pub mod content;
pub mod inscriptions;
pub mod locations;
pub mod stats;

use std::path::PathBuf;

use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OpenFlags, Row, ToSql};

use crate::error::IndexerError;
use crate::ord::sat::Sat;
use crate::try_warn;
use crate::types::BlockIdentifier;
use crate::utils::Context;

pub fn get_default_ordinals_db_file_path(base_dir: &PathBuf) -> PathBuf {
    let mut destination_path = base_dir.clone();
    destination_path.push("ordinals.sqlite");
    destination_path
}

fn create_table(
    conn: &Connection,
    table: &str,
    definition: &str,
    indexes: &[&str],
    ctx: &Context,
) -> Result<(), IndexerError> {
    if let Err(e) = conn.execute(definition, []) {
        try_warn!(ctx, "Unable to create table {}: {}", table, e.to_string());
        return Err(e.into());
    }
    for index in indexes.iter() {
        if let Err(e) = conn.execute(index, []) {
            try_warn!(ctx, "unable to index table {}: {}", table, e.to_string());
            return Err(e.into());
        }
    }
    Ok(())
}

pub fn initialize_ordinals_db(
    base_dir: Option<&PathBuf>,
    ctx: &Context,
) -> Result<Connection, IndexerError> {
    let conn = create_or_open_readwrite_db(base_dir, ctx)?;
    create_table(
        &conn,
        "inscriptions",
        "CREATE TABLE IF NOT EXISTS inscriptions (
            genesis_id TEXT NOT NULL PRIMARY KEY,
            number INTEGER NOT NULL,
            classic_number INTEGER NOT NULL,
            jubilee_number INTEGER NOT NULL,
            ordinal_number INTEGER NOT NULL,
            sat_coinbase_height INTEGER NOT NULL,
            sat_coinbase_offset INTEGER NOT NULL,
            block_height INTEGER NOT NULL,
            block_hash TEXT NOT NULL,
            tx_id TEXT NOT NULL,
            tx_index INTEGER NOT NULL,
            timestamp INTEGER NOT NULL,
            fee INTEGER NOT NULL,
            address TEXT NOT NULL,
            content_type TEXT NOT NULL,
            mime_type TEXT NOT NULL,
            content_length INTEGER NOT NULL,
            curse_type TEXT,
            delegate TEXT,
            metaprotocol TEXT,
            metadata TEXT,
            parent TEXT,
            recursive INTEGER NOT NULL,
            recursion_refs TEXT
        )",
        &[
            "CREATE INDEX IF NOT EXISTS index_inscriptions_on_number ON inscriptions(number);",
            "CREATE INDEX IF NOT EXISTS index_inscriptions_on_ordinal_number ON inscriptions(ordinal_number);",
            "CREATE INDEX IF NOT EXISTS index_inscriptions_on_block_height ON inscriptions(block_height);",
            "CREATE INDEX IF NOT EXISTS index_inscriptions_on_mime_type ON inscriptions(mime_type);",
        ],
        ctx,
    )?;
    create_table(
        &conn,
        "locations",
        "CREATE TABLE IF NOT EXISTS locations (
            id INTEGER PRIMARY KEY,
            inscription_id TEXT NOT NULL,
            ordinal_number INTEGER NOT NULL,
            block_height INTEGER NOT NULL,
            block_hash TEXT NOT NULL,
            tx_id TEXT NOT NULL,
            tx_index INTEGER NOT NULL,
            satpoint TEXT NOT NULL,
            output TEXT NOT NULL,
            offset INTEGER NOT NULL,
            address TEXT NOT NULL,
            value INTEGER,
            timestamp INTEGER NOT NULL,
            is_genesis INTEGER NOT NULL
        )",
        &[
            "CREATE INDEX IF NOT EXISTS locations_indexed_on_inscription_id ON locations(inscription_id, block_height, tx_index);",
            "CREATE INDEX IF NOT EXISTS locations_indexed_on_block_height ON locations(block_height);",
            "CREATE INDEX IF NOT EXISTS locations_indexed_on_ordinal_number ON locations(ordinal_number);",
        ],
        ctx,
    )?;
    // ordinal_number -> latest location, the hot path of transfer resolution.
    create_table(
        &conn,
        "current_locations",
        "CREATE TABLE IF NOT EXISTS current_locations (
            inscription_id TEXT NOT NULL PRIMARY KEY,
            ordinal_number INTEGER NOT NULL,
            location_id INTEGER NOT NULL,
            block_height INTEGER NOT NULL,
            tx_index INTEGER NOT NULL,
            satpoint TEXT NOT NULL,
            output TEXT NOT NULL,
            address TEXT NOT NULL
        )",
        &[
            "CREATE INDEX IF NOT EXISTS current_locations_indexed_on_ordinal_number ON current_locations(ordinal_number);",
            "CREATE INDEX IF NOT EXISTS current_locations_indexed_on_address ON current_locations(address);",
            "CREATE INDEX IF NOT EXISTS current_locations_indexed_on_output ON current_locations(output);",
        ],
        ctx,
    )?;
    create_table(
        &conn,
        "inscriptions_per_block",
        "CREATE TABLE IF NOT EXISTS inscriptions_per_block (
            block_height INTEGER NOT NULL PRIMARY KEY,
            block_hash TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            inscription_count INTEGER NOT NULL,
            inscription_count_accum INTEGER NOT NULL
        )",
        &[],
        ctx,
    )?;
    create_table(
        &conn,
        "inscription_contents",
        "CREATE TABLE IF NOT EXISTS inscription_contents (
            inscription_id TEXT NOT NULL PRIMARY KEY,
            content BLOB NOT NULL,
            content_type TEXT NOT NULL
        )",
        &[],
        ctx,
    )?;
    // Every applied block, with or without inscription activity.
    create_table(
        &conn,
        "indexed_blocks",
        "CREATE TABLE IF NOT EXISTS indexed_blocks (
            block_height INTEGER NOT NULL PRIMARY KEY,
            block_hash TEXT NOT NULL
        )",
        &[],
        ctx,
    )?;
    create_table(
        &conn,
        "chain_tip",
        "CREATE TABLE IF NOT EXISTS chain_tip (
            id INTEGER NOT NULL PRIMARY KEY CHECK (id = 0),
            block_height INTEGER NOT NULL,
            block_hash TEXT,
            write_sequence INTEGER NOT NULL
        )",
        &["INSERT OR IGNORE INTO chain_tip (id, block_height, block_hash, write_sequence) VALUES (0, 0, NULL, 0);"],
        ctx,
    )?;
    Ok(conn)
}

pub fn create_or_open_readwrite_db(
    base_dir: Option<&PathBuf>,
    ctx: &Context,
) -> Result<Connection, IndexerError> {
    let conn = match base_dir {
        None => Connection::open_in_memory()?,
        Some(base_dir) => {
            let path = get_default_ordinals_db_file_path(base_dir);
            let open_flags = match std::fs::metadata(&path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    if let Some(dirp) = path.parent() {
                        if let Err(e) = std::fs::create_dir_all(dirp) {
                            try_warn!(ctx, "unable to create {}: {}", dirp.display(), e.to_string());
                        }
                    }
                    OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
                }
                Err(e) => {
                    return Err(IndexerError::Config(format!(
                        "could not stat {}: {}",
                        path.display(),
                        e
                    )))
                }
                Ok(_md) => OpenFlags::SQLITE_OPEN_READ_WRITE,
            };
            Connection::open_with_flags(&path, open_flags)?
        }
    };
    register_sql_functions(&conn)?;
    Ok(conn)
}

pub fn open_readonly_ordinals_db_conn(
    base_dir: &PathBuf,
    _ctx: &Context,
) -> Result<Connection, IndexerError> {
    let path = get_default_ordinals_db_file_path(base_dir);
    if !path.exists() {
        return Err(IndexerError::Config(format!(
            "could not find {}",
            path.display()
        )));
    }
    let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    register_sql_functions(&conn)?;
    Ok(conn)
}

/// Makes the rarity classifier available to queries so that filtering and
/// sorting by rarity agree with what responses report.
pub fn register_sql_functions(conn: &Connection) -> Result<(), IndexerError> {
    conn.create_scalar_function(
        "sat_rarity_rank",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |fn_ctx| {
            let ordinal_number: i64 = fn_ctx.get(0)?;
            Ok(Sat(ordinal_number as u64).rarity().rank() as i64)
        },
    )?;
    Ok(())
}

pub fn perform_query_one<F, T>(
    query: &str,
    args: &[&dyn ToSql],
    db_conn: &Connection,
    mapping_func: F,
) -> Result<Option<T>, IndexerError>
where
    F: Fn(&Row<'_>) -> Result<T, rusqlite::Error>,
{
    let mut stmt = db_conn.prepare_cached(query)?;
    let mut rows = stmt.query(args)?;
    match rows.next()? {
        Some(row) => Ok(Some(mapping_func(row)?)),
        None => Ok(None),
    }
}

pub fn perform_query_set<F, T>(
    query: &str,
    args: &[&dyn ToSql],
    db_conn: &Connection,
    mapping_func: F,
) -> Result<Vec<T>, IndexerError>
where
    F: Fn(&Row<'_>) -> Result<T, rusqlite::Error>,
{
    let mut stmt = db_conn.prepare_cached(query)?;
    let mut rows = stmt.query(args)?;
    let mut results = vec![];
    while let Some(row) = rows.next()? {
        results.push(mapping_func(row)?);
    }
    Ok(results)
}

pub fn perform_query_exists(
    query: &str,
    args: &[&dyn ToSql],
    db_conn: &Connection,
) -> Result<bool, IndexerError> {
    Ok(perform_query_one(query, args, db_conn, |_| Ok(()))?.is_some())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainTip {
    pub block_height: u64,
    pub block_hash: Option<String>,
    pub write_sequence: u64,
}

pub fn get_chain_tip(db_conn: &Connection) -> Result<ChainTip, IndexerError> {
    let tip = perform_query_one(
        "SELECT block_height, block_hash, write_sequence FROM chain_tip WHERE id = 0",
        &[],
        db_conn,
        |row| {
            Ok(ChainTip {
                block_height: row.get(0)?,
                block_hash: row.get(1)?,
                write_sequence: row.get(2)?,
            })
        },
    )?;
    Ok(tip.unwrap_or(ChainTip {
        block_height: 0,
        block_hash: None,
        write_sequence: 0,
    }))
}

/// Records `block_identifier` and moves the tip onto it, unless the tip is
/// already higher (a redelivered older block).
pub fn update_chain_tip_on_apply(
    block_identifier: &BlockIdentifier,
    db_tx: &Connection,
) -> Result<(), IndexerError> {
    db_tx.execute(
        "INSERT OR REPLACE INTO indexed_blocks (block_height, block_hash) VALUES (?1, ?2)",
        rusqlite::params![&block_identifier.index, &block_identifier.hash],
    )?;
    db_tx.execute(
        "UPDATE chain_tip SET block_height = ?1, block_hash = ?2
        WHERE id = 0 AND block_height <= ?1",
        rusqlite::params![&block_identifier.index, &block_identifier.hash],
    )?;
    Ok(())
}

/// After a rollback the tip moves to the parent height. Its hash is `NULL`
/// when the parent was never applied to this index (nor carries a location
/// written before `indexed_blocks` existed).
pub fn update_chain_tip_on_rollback(
    block_identifier: &BlockIdentifier,
    db_tx: &Connection,
) -> Result<(), IndexerError> {
    db_tx.execute(
        "DELETE FROM indexed_blocks WHERE block_height = ?1",
        rusqlite::params![&block_identifier.index],
    )?;
    let parent_height = block_identifier.index.saturating_sub(1);
    let args: &[&dyn ToSql] = &[&parent_height];
    let parent_hash: Option<String> = perform_query_one(
        "SELECT COALESCE(
            (SELECT block_hash FROM indexed_blocks WHERE block_height = ?1),
            (SELECT block_hash FROM locations WHERE block_height = ?1 LIMIT 1)
        )",
        args,
        db_tx,
        |row| row.get(0),
    )?;
    db_tx.execute(
        "UPDATE chain_tip SET block_height = ?1, block_hash = ?2 WHERE id = 0",
        rusqlite::params![&parent_height, &parent_hash],
    )?;
    Ok(())
}

pub fn increment_write_sequence(db_tx: &Connection) -> Result<(), IndexerError> {
    db_tx.execute(
        "UPDATE chain_tip SET write_sequence = write_sequence + 1 WHERE id = 0",
        [],
    )?;
    Ok(())
}
