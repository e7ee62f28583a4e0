use rusqlite::{Connection, Row, ToSql};

use super::{perform_query_exists, perform_query_one, perform_query_set};
use crate::error::IndexerError;

#[derive(Debug, Clone, PartialEq)]
pub struct DbLocation {
    /// Assigned by storage on insert.
    pub id: i64,
    pub inscription_id: String,
    pub ordinal_number: u64,
    pub block_height: u64,
    pub block_hash: String,
    pub tx_id: String,
    pub tx_index: u64,
    pub satpoint: String,
    pub output: String,
    pub offset: u64,
    pub address: String,
    pub value: Option<u64>,
    pub timestamp: u32,
    pub is_genesis: bool,
}

pub const LOCATION_COLUMNS: &str = "l.id, l.inscription_id, l.ordinal_number, l.block_height, \
    l.block_hash, l.tx_id, l.tx_index, l.satpoint, l.output, l.offset, l.address, l.value, \
    l.timestamp, l.is_genesis";

pub fn location_from_row(row: &Row<'_>) -> Result<DbLocation, rusqlite::Error> {
    location_from_row_at(row, 0)
}

/// Same as [`location_from_row`] for rows where the location columns start at `base`.
pub fn location_from_row_at(row: &Row<'_>, base: usize) -> Result<DbLocation, rusqlite::Error> {
    Ok(DbLocation {
        id: row.get(base)?,
        inscription_id: row.get(base + 1)?,
        ordinal_number: row.get(base + 2)?,
        block_height: row.get(base + 3)?,
        block_hash: row.get(base + 4)?,
        tx_id: row.get(base + 5)?,
        tx_index: row.get(base + 6)?,
        satpoint: row.get(base + 7)?,
        output: row.get(base + 8)?,
        offset: row.get(base + 9)?,
        address: row.get(base + 10)?,
        value: row.get(base + 11)?,
        timestamp: row.get(base + 12)?,
        is_genesis: row.get(base + 13)?,
    })
}

/// Appends a location and makes it the inscription's current one. Returns
/// the stored row with its assigned id.
pub fn insert_location(
    location: &DbLocation,
    db_tx: &Connection,
) -> Result<DbLocation, IndexerError> {
    db_tx.execute(
        "INSERT INTO locations (
            inscription_id, ordinal_number, block_height, block_hash, tx_id, tx_index,
            satpoint, output, offset, address, value, timestamp, is_genesis
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        rusqlite::params![
            &location.inscription_id,
            &location.ordinal_number,
            &location.block_height,
            &location.block_hash,
            &location.tx_id,
            &location.tx_index,
            &location.satpoint,
            &location.output,
            &location.offset,
            &location.address,
            &location.value,
            &location.timestamp,
            &location.is_genesis,
        ],
    )?;
    let mut stored = location.clone();
    stored.id = db_tx.last_insert_rowid();
    set_current_location(&stored, db_tx)?;
    Ok(stored)
}

pub fn set_current_location(location: &DbLocation, db_tx: &Connection) -> Result<(), IndexerError> {
    db_tx.execute(
        "INSERT OR REPLACE INTO current_locations (
            inscription_id, ordinal_number, location_id, block_height, tx_index, satpoint,
            output, address
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            &location.inscription_id,
            &location.ordinal_number,
            &location.id,
            &location.block_height,
            &location.tx_index,
            &location.satpoint,
            &location.output,
            &location.address,
        ],
    )?;
    Ok(())
}

pub fn delete_location(location_id: i64, db_tx: &Connection) -> Result<(), IndexerError> {
    db_tx.execute(
        "DELETE FROM locations WHERE id = ?1",
        rusqlite::params![&location_id],
    )?;
    Ok(())
}

pub fn delete_current_location(inscription_id: &str, db_tx: &Connection) -> Result<(), IndexerError> {
    db_tx.execute(
        "DELETE FROM current_locations WHERE inscription_id = ?1",
        rusqlite::params![&inscription_id],
    )?;
    Ok(())
}

/// Latest location of every live inscription sitting on `ordinal_number`.
/// More than one entry means the sat was reinscribed.
pub fn find_current_locations_for_ordinal_number(
    ordinal_number: u64,
    db_conn: &Connection,
) -> Result<Vec<DbLocation>, IndexerError> {
    let args: &[&dyn ToSql] = &[&ordinal_number];
    let query = format!(
        "SELECT {LOCATION_COLUMNS} FROM current_locations AS c
        INNER JOIN locations AS l ON l.id = c.location_id
        WHERE c.ordinal_number = ?1
        ORDER BY l.inscription_id ASC"
    );
    perform_query_set(&query, args, db_conn, location_from_row)
}

pub fn find_current_location(
    inscription_id: &str,
    db_conn: &Connection,
) -> Result<Option<DbLocation>, IndexerError> {
    let args: &[&dyn ToSql] = &[&inscription_id];
    let query = format!(
        "SELECT {LOCATION_COLUMNS} FROM current_locations AS c
        INNER JOIN locations AS l ON l.id = c.location_id
        WHERE c.inscription_id = ?1"
    );
    perform_query_one(&query, args, db_conn, location_from_row)
}

/// Location preceding `location` in its inscription's chain.
pub fn find_previous_location(
    location: &DbLocation,
    db_conn: &Connection,
) -> Result<Option<DbLocation>, IndexerError> {
    let args: &[&dyn ToSql] = &[
        &location.inscription_id,
        &location.block_height,
        &location.tx_index,
        &location.id,
    ];
    let query = format!(
        "SELECT {LOCATION_COLUMNS} FROM locations AS l
        WHERE l.inscription_id = ?1
            AND (l.block_height < ?2
                OR (l.block_height = ?2 AND l.tx_index < ?3)
                OR (l.block_height = ?2 AND l.tx_index = ?3 AND l.id < ?4))
        ORDER BY l.block_height DESC, l.tx_index DESC, l.id DESC
        LIMIT 1"
    );
    perform_query_one(&query, args, db_conn, location_from_row)
}

/// Whether `inscription_id` already moved to `satpoint` in the given transaction.
pub fn location_exists(
    inscription_id: &str,
    satpoint: &str,
    block_height: u64,
    tx_index: u64,
    db_conn: &Connection,
) -> Result<bool, IndexerError> {
    let args: &[&dyn ToSql] = &[&inscription_id, &satpoint, &block_height, &tx_index];
    perform_query_exists(
        "SELECT 1 FROM locations
        WHERE inscription_id = ?1 AND satpoint = ?2 AND block_height = ?3 AND tx_index = ?4",
        args,
        db_conn,
    )
}

pub fn count_locations(inscription_id: &str, db_conn: &Connection) -> Result<u64, IndexerError> {
    let args: &[&dyn ToSql] = &[&inscription_id];
    let count = perform_query_one(
        "SELECT COUNT(*) FROM locations WHERE inscription_id = ?1",
        args,
        db_conn,
        |row| row.get(0),
    )?;
    Ok(count.unwrap_or(0))
}

/// Full history of an inscription, most recent first.
pub fn find_inscription_locations(
    inscription_id: &str,
    limit: usize,
    offset: usize,
    db_conn: &Connection,
) -> Result<Vec<DbLocation>, IndexerError> {
    let args: &[&dyn ToSql] = &[&inscription_id, &limit, &offset];
    let query = format!(
        "SELECT {LOCATION_COLUMNS} FROM locations AS l
        WHERE l.inscription_id = ?1
        ORDER BY l.block_height DESC, l.tx_index DESC, l.id DESC
        LIMIT ?2 OFFSET ?3"
    );
    perform_query_set(&query, args, db_conn, location_from_row)
}

/// Transfers recorded at `block_height`, grouped by inscription in chain order.
pub fn find_transfer_locations_at_height(
    block_height: u64,
    db_conn: &Connection,
) -> Result<Vec<DbLocation>, IndexerError> {
    let args: &[&dyn ToSql] = &[&block_height];
    let query = format!(
        "SELECT {LOCATION_COLUMNS} FROM locations AS l
        WHERE l.block_height = ?1 AND l.is_genesis = 0
        ORDER BY l.inscription_id ASC, l.tx_index ASC, l.id ASC"
    );
    perform_query_set(&query, args, db_conn, location_from_row)
}

/// Every location of `inscription_id`, oldest first.
pub fn find_location_chain(
    inscription_id: &str,
    db_conn: &Connection,
) -> Result<Vec<DbLocation>, IndexerError> {
    let args: &[&dyn ToSql] = &[&inscription_id];
    let query = format!(
        "SELECT {LOCATION_COLUMNS} FROM locations AS l
        WHERE l.inscription_id = ?1
        ORDER BY l.block_height ASC, l.tx_index ASC, l.id ASC"
    );
    perform_query_set(&query, args, db_conn, location_from_row)
}

/// Inscriptions whose history is not a single chain rooted at its genesis
/// with the current pointer on the latest hop.
pub fn find_broken_location_chains(db_conn: &Connection) -> Result<Vec<String>, IndexerError> {
    perform_query_set(
        "SELECT i.genesis_id FROM inscriptions AS i
        LEFT JOIN current_locations AS c ON c.inscription_id = i.genesis_id
        LEFT JOIN locations AS l ON l.id = c.location_id
        WHERE l.id IS NULL
            OR (SELECT COUNT(*) FROM locations AS g
                WHERE g.inscription_id = i.genesis_id AND g.is_genesis = 1) != 1
            OR EXISTS (SELECT 1 FROM locations AS g
                WHERE g.inscription_id = i.genesis_id AND g.is_genesis = 1
                AND (g.block_height, g.tx_index) != (i.block_height, i.tx_index))
            OR EXISTS (SELECT 1 FROM locations AS n
                WHERE n.inscription_id = i.genesis_id
                AND (n.block_height, n.tx_index, n.id) > (l.block_height, l.tx_index, l.id))
        ORDER BY i.genesis_id ASC",
        &[],
        db_conn,
        |row| row.get(0),
    )
}

#[cfg(test)]
mod test {
    use super::{
        count_locations, find_broken_location_chains, find_current_location,
        find_current_locations_for_ordinal_number, find_inscription_locations,
        find_previous_location, insert_location, set_current_location,
    };
    use crate::db::{initialize_ordinals_db, inscriptions::insert_inscription};
    use crate::test_utils::{get_test_ctx, test_db_inscription, test_db_location};

    #[test]
    fn tracks_current_location() {
        let conn = initialize_ordinals_db(None, &get_test_ctx()).unwrap();
        let genesis = insert_location(&test_db_location(775617, 0, true), &conn).unwrap();
        let transfer = insert_location(&test_db_location(775700, 4, false), &conn).unwrap();

        let current = find_current_location(&genesis.inscription_id, &conn)
            .unwrap()
            .unwrap();
        assert_eq!(current, transfer);
        assert_eq!(
            find_previous_location(&transfer, &conn).unwrap(),
            Some(genesis.clone())
        );
        assert_eq!(find_previous_location(&genesis, &conn).unwrap(), None);

        let on_sat = find_current_locations_for_ordinal_number(genesis.ordinal_number, &conn).unwrap();
        assert_eq!(on_sat, vec![transfer.clone()]);
        assert_eq!(count_locations(&genesis.inscription_id, &conn).unwrap(), 2);

        let history = find_inscription_locations(&genesis.inscription_id, 10, 0, &conn).unwrap();
        assert_eq!(history, vec![transfer, genesis]);
    }

    #[test]
    fn detects_stale_current_pointer() {
        let conn = initialize_ordinals_db(None, &get_test_ctx()).unwrap();
        let inscription = test_db_inscription();
        insert_inscription(&inscription, &conn).unwrap();
        let genesis = insert_location(&test_db_location(778576, 0, true), &conn).unwrap();
        insert_location(&test_db_location(778600, 4, false), &conn).unwrap();
        assert!(find_broken_location_chains(&conn).unwrap().is_empty());

        set_current_location(&genesis, &conn).unwrap();
        assert_eq!(
            find_broken_location_chains(&conn).unwrap(),
            vec![inscription.genesis_id]
        );
    }
}
