use rusqlite::{Connection, ToSql};

use super::{
    find_inscription, InscriptionIdentifier, InscriptionResponse, LocationResponse, Order,
    OrderBy, Paginated, Pagination,
};
use crate::{
    config::QueryConfig,
    db::{
        content::find_inscription_content,
        inscriptions::{inscription_from_row, INSCRIPTION_COLUMNS, INSCRIPTION_COLUMN_COUNT},
        locations::{
            count_locations, find_current_location, find_inscription_locations,
            location_from_row_at, LOCATION_COLUMNS,
        },
        perform_query_one, perform_query_set,
    },
    error::IndexerError,
    ord::rarity::Rarity,
    utils::normalize_hash,
};

/// Filters of [`list_inscriptions`]. Empty sets and `None` values do not
/// filter anything. Timestamps are in milliseconds.
#[derive(Debug, Clone, Default)]
pub struct InscriptionFilters {
    pub genesis_id: Vec<String>,
    pub number: Vec<i64>,
    pub genesis_block_height: Option<u64>,
    pub genesis_block_hash: Option<String>,
    pub from_genesis_block_height: Option<u64>,
    pub to_genesis_block_height: Option<u64>,
    pub from_genesis_timestamp: Option<i64>,
    pub to_genesis_timestamp: Option<i64>,
    pub from_sat_ordinal: Option<u64>,
    pub to_sat_ordinal: Option<u64>,
    pub from_sat_coinbase_height: Option<u64>,
    pub to_sat_coinbase_height: Option<u64>,
    pub from_number: Option<i64>,
    pub to_number: Option<i64>,
    pub output: Option<String>,
    /// Current owners.
    pub address: Vec<String>,
    pub genesis_address: Vec<String>,
    pub mime_type: Vec<String>,
    pub sat_rarity: Vec<Rarity>,
    pub recursive: Option<bool>,
    pub cursed: Option<bool>,
}

#[derive(Default)]
struct WhereClause {
    conditions: Vec<String>,
    args: Vec<Box<dyn ToSql>>,
}

impl WhereClause {
    fn push<T: ToSql + 'static>(&mut self, condition: &str, value: Option<T>) {
        if let Some(value) = value {
            self.conditions.push(condition.to_string());
            self.args.push(Box::new(value));
        }
    }

    fn push_set<T: ToSql + Clone + 'static>(&mut self, column: &str, values: &[T]) {
        if values.is_empty() {
            return;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        self.conditions.push(format!("{column} IN ({placeholders})"));
        for value in values.iter() {
            self.args.push(Box::new(value.clone()));
        }
    }

    fn to_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }
}

impl InscriptionFilters {
    fn where_clause(&self) -> WhereClause {
        let mut clause = WhereClause::default();
        clause.push_set("i.genesis_id", &self.genesis_id);
        clause.push_set("i.number", &self.number);
        clause.push("i.block_height = ?", self.genesis_block_height);
        clause.push(
            "i.block_hash = ?",
            self.genesis_block_hash.as_deref().map(normalize_hash),
        );
        clause.push("i.block_height >= ?", self.from_genesis_block_height);
        clause.push("i.block_height <= ?", self.to_genesis_block_height);
        clause.push("i.timestamp * 1000 >= ?", self.from_genesis_timestamp);
        clause.push("i.timestamp * 1000 <= ?", self.to_genesis_timestamp);
        clause.push("i.ordinal_number >= ?", self.from_sat_ordinal);
        clause.push("i.ordinal_number <= ?", self.to_sat_ordinal);
        clause.push("i.sat_coinbase_height >= ?", self.from_sat_coinbase_height);
        clause.push("i.sat_coinbase_height <= ?", self.to_sat_coinbase_height);
        clause.push("i.number >= ?", self.from_number);
        clause.push("i.number <= ?", self.to_number);
        clause.push("c.output = ?", self.output.clone());
        clause.push_set("c.address", &self.address);
        clause.push_set("i.address", &self.genesis_address);
        clause.push_set("i.mime_type", &self.mime_type);
        let ranks: Vec<i64> = self
            .sat_rarity
            .iter()
            .map(|rarity| rarity.rank() as i64)
            .collect();
        clause.push_set("sat_rarity_rank(i.ordinal_number)", &ranks);
        clause.push("i.recursive = ?", self.recursive);
        match self.cursed {
            Some(true) => clause.conditions.push("i.curse_type IS NOT NULL".into()),
            Some(false) => clause.conditions.push("i.curse_type IS NULL".into()),
            None => {}
        }
        clause
    }
}

/// Ties on the primary ordering are broken by number then genesis id, in the
/// same direction.
pub fn list_inscriptions(
    filters: &InscriptionFilters,
    order_by: OrderBy,
    order: Order,
    pagination: &Pagination,
    config: &QueryConfig,
    db_conn: &Connection,
) -> Result<Paginated<InscriptionResponse>, IndexerError> {
    let (limit, offset) = pagination.resolve(config);
    let where_clause = filters.where_clause();
    let sql_where = where_clause.to_sql();
    let args: Vec<&dyn ToSql> = where_clause.args.iter().map(|arg| arg.as_ref()).collect();

    let total: Option<u64> = perform_query_one(
        &format!(
            "SELECT COUNT(*) FROM inscriptions AS i
            INNER JOIN current_locations AS c ON c.inscription_id = i.genesis_id
            {sql_where}"
        ),
        &args,
        db_conn,
        |row| row.get(0),
    )?;

    let primary = match order_by {
        OrderBy::GenesisBlockHeight => "i.block_height",
        OrderBy::Number => "i.number",
        OrderBy::Ordinal => "i.ordinal_number",
        OrderBy::Rarity => "sat_rarity_rank(i.ordinal_number)",
    };
    let direction = order.as_sql();
    let query = format!(
        "SELECT {INSCRIPTION_COLUMNS}, {LOCATION_COLUMNS} FROM inscriptions AS i
        INNER JOIN current_locations AS c ON c.inscription_id = i.genesis_id
        INNER JOIN locations AS l ON l.id = c.location_id
        {sql_where}
        ORDER BY {primary} {direction}, i.number {direction}, i.genesis_id {direction}
        LIMIT ? OFFSET ?"
    );
    let mut page_args = args.clone();
    page_args.push(&limit);
    page_args.push(&offset);
    let rows = perform_query_set(&query, &page_args, db_conn, |row| {
        Ok((
            inscription_from_row(row)?,
            location_from_row_at(row, INSCRIPTION_COLUMN_COUNT)?,
        ))
    })?;
    let results = rows
        .into_iter()
        .map(|(inscription, current)| InscriptionResponse::from_db(inscription, &current))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Paginated {
        limit,
        offset,
        total: total.unwrap_or(0),
        results,
    })
}

pub fn get_inscription(
    identifier: &InscriptionIdentifier,
    db_conn: &Connection,
) -> Result<Option<InscriptionResponse>, IndexerError> {
    let Some(inscription) = find_inscription(identifier, db_conn)? else {
        return Ok(None);
    };
    let current = find_current_location(&inscription.genesis_id, db_conn)?.ok_or_else(|| {
        IndexerError::continuity(
            inscription.block_height,
            format!("inscription {} has no current location", inscription.genesis_id),
        )
    })?;
    Ok(Some(InscriptionResponse::from_db(inscription, &current)?))
}

/// Full location history, most recent first.
pub fn get_inscription_locations(
    identifier: &InscriptionIdentifier,
    pagination: &Pagination,
    config: &QueryConfig,
    db_conn: &Connection,
) -> Result<Option<Paginated<LocationResponse>>, IndexerError> {
    let Some(inscription) = find_inscription(identifier, db_conn)? else {
        return Ok(None);
    };
    let (limit, offset) = pagination.resolve(config);
    let total = count_locations(&inscription.genesis_id, db_conn)?;
    let results = find_inscription_locations(&inscription.genesis_id, limit, offset, db_conn)?
        .into_iter()
        .map(LocationResponse::from)
        .collect();
    Ok(Some(Paginated {
        limit,
        offset,
        total,
        results,
    }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InscriptionContent {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub content_length: u64,
}

pub fn get_inscription_content(
    identifier: &InscriptionIdentifier,
    db_conn: &Connection,
) -> Result<Option<InscriptionContent>, IndexerError> {
    let Some(inscription) = find_inscription(identifier, db_conn)? else {
        return Ok(None);
    };
    Ok(
        find_inscription_content(&inscription.genesis_id, db_conn)?.map(|content| {
            InscriptionContent {
                content_length: content.content.len() as u64,
                bytes: content.content,
                content_type: content.content_type,
            }
        }),
    )
}
