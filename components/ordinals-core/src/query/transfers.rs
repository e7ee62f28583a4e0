use rusqlite::Connection;

use super::{LocationResponse, Paginated, Pagination};
use crate::{
    config::QueryConfig,
    db::{
        inscriptions::find_inscription_with_id,
        locations::{find_previous_location, find_transfer_locations_at_height, DbLocation},
    },
    error::IndexerError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockTransferResponse {
    pub id: String,
    pub number: i64,
    pub from: LocationResponse,
    pub to: LocationResponse,
}

/// One entry per inscription moved at `block_height`: where it was before
/// its first hop in the block and where its last hop left it. Entries whose
/// last hop came later in the block come first.
pub fn get_transfers_per_block(
    block_height: u64,
    pagination: &Pagination,
    config: &QueryConfig,
    db_conn: &Connection,
) -> Result<Paginated<BlockTransferResponse>, IndexerError> {
    let (limit, offset) = pagination.resolve(config);

    let mut hops: Vec<(DbLocation, DbLocation)> = vec![];
    for location in find_transfer_locations_at_height(block_height, db_conn)? {
        let same_inscription = hops
            .last()
            .map_or(false, |(first, _)| first.inscription_id == location.inscription_id);
        if same_inscription {
            if let Some((_, last)) = hops.last_mut() {
                *last = location;
            }
        } else {
            hops.push((location.clone(), location));
        }
    }
    hops.sort_by(|(_, a), (_, b)| {
        b.tx_index
            .cmp(&a.tx_index)
            .then_with(|| a.inscription_id.cmp(&b.inscription_id))
    });

    let total = hops.len() as u64;
    let mut results = vec![];
    for (first, last) in hops.into_iter().skip(offset).take(limit) {
        let from = find_previous_location(&first, db_conn)?.ok_or_else(|| {
            IndexerError::continuity(
                block_height,
                format!("transfer of {} has no origin", first.inscription_id),
            )
        })?;
        let inscription = find_inscription_with_id(&last.inscription_id, db_conn)?.ok_or_else(|| {
            IndexerError::continuity(
                block_height,
                format!("transfer of unknown inscription {}", last.inscription_id),
            )
        })?;
        results.push(BlockTransferResponse {
            id: inscription.genesis_id,
            number: inscription.number,
            from: from.into(),
            to: last.into(),
        });
    }

    Ok(Paginated {
        limit,
        offset,
        total,
        results,
    })
}
