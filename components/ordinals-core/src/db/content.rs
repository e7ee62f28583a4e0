use rusqlite::{Connection, ToSql};

use super::perform_query_one;
use crate::error::IndexerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbInscriptionContent {
    pub content: Vec<u8>,
    pub content_type: String,
}

pub fn insert_inscription_content(
    inscription_id: &str,
    content: &[u8],
    content_type: &str,
    db_tx: &Connection,
) -> Result<(), IndexerError> {
    db_tx.execute(
        "INSERT OR REPLACE INTO inscription_contents (inscription_id, content, content_type)
        VALUES (?1, ?2, ?3)",
        rusqlite::params![&inscription_id, &content, &content_type],
    )?;
    Ok(())
}

pub fn find_inscription_content(
    inscription_id: &str,
    db_conn: &Connection,
) -> Result<Option<DbInscriptionContent>, IndexerError> {
    let args: &[&dyn ToSql] = &[&inscription_id];
    perform_query_one(
        "SELECT content, content_type FROM inscription_contents WHERE inscription_id = ?1",
        args,
        db_conn,
        |row| {
            Ok(DbInscriptionContent {
                content: row.get(0)?,
                content_type: row.get(1)?,
            })
        },
    )
}

pub fn delete_inscription_content(inscription_id: &str, db_tx: &Connection) -> Result<(), IndexerError> {
    db_tx.execute(
        "DELETE FROM inscription_contents WHERE inscription_id = ?1",
        rusqlite::params![&inscription_id],
    )?;
    Ok(())
}
