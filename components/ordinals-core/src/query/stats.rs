use rusqlite::Connection;

use crate::{
    db::{get_chain_tip, stats::find_block_stats},
    error::IndexerError,
    types::BlockIdentifier,
    utils::timestamp_to_millis,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InscriptionsPerBlockResponse {
    pub block_height: String,
    pub block_hash: String,
    pub inscription_count: String,
    pub inscription_count_accum: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InscriptionStatsResponse {
    pub results: Vec<InscriptionsPerBlockResponse>,
}

/// Per block genesis counts within the optional height bounds, highest
/// block first.
pub fn inscription_stats(
    from_height: Option<u64>,
    to_height: Option<u64>,
    db_conn: &Connection,
) -> Result<InscriptionStatsResponse, IndexerError> {
    let results = find_block_stats(from_height, to_height, db_conn)?
        .into_iter()
        .map(|stats| InscriptionsPerBlockResponse {
            block_height: stats.block_height.to_string(),
            block_hash: stats.block_hash,
            inscription_count: stats.inscription_count.to_string(),
            inscription_count_accum: stats.inscription_count_accum.to_string(),
            timestamp: timestamp_to_millis(stats.timestamp),
        })
        .collect();
    Ok(InscriptionStatsResponse { results })
}

/// Highest block applied so far, `None` on an empty index.
pub fn get_indexed_chain_tip(db_conn: &Connection) -> Result<Option<BlockIdentifier>, IndexerError> {
    let tip = get_chain_tip(db_conn)?;
    if tip.block_height == 0 && tip.block_hash.is_none() {
        return Ok(None);
    }
    Ok(Some(BlockIdentifier {
        index: tip.block_height,
        hash: tip.block_hash.unwrap_or_default(),
    }))
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::{get_indexed_chain_tip, inscription_stats};
    use crate::{
        db::initialize_ordinals_db,
        test_utils::{
            get_test_ctx, index_test_blocks, test_hash, TestBlockBuilder, TestRevealBuilder,
        },
        types::BlockIdentifier,
    };

    fn reveal(seed: u64) -> crate::types::OrdinalInscriptionRevealData {
        TestRevealBuilder::new()
            .inscription_id(&format!("{}i0", test_hash(seed)))
            .ordinal_number(seed)
            .build()
    }

    #[test]
    fn reports_counts_per_block() {
        let mut conn = initialize_ordinals_db(None, &get_test_ctx()).unwrap();
        assert_eq!(get_indexed_chain_tip(&conn).unwrap(), None);
        index_test_blocks(
            &mut conn,
            vec![
                TestBlockBuilder::new(778575)
                    .timestamp(1676913207)
                    .reveal(reveal(1))
                    .reveal(reveal(2))
                    .build(),
                TestBlockBuilder::new(778576).build(),
                TestBlockBuilder::new(778577)
                    .timestamp(1676923207)
                    .reveal(reveal(3))
                    .build(),
            ],
        );

        let stats = inscription_stats(None, None, &conn).unwrap();
        assert_eq!(
            serde_json::to_value(&stats).unwrap(),
            json!({
                "results": [
                    {
                        "block_height": "778577",
                        "block_hash": test_hash(778577),
                        "inscription_count": "1",
                        "inscription_count_accum": "3",
                        "timestamp": 1676923207000i64,
                    },
                    {
                        "block_height": "778575",
                        "block_hash": test_hash(778575),
                        "inscription_count": "2",
                        "inscription_count_accum": "2",
                        "timestamp": 1676913207000i64,
                    },
                ]
            })
        );

        let stats = inscription_stats(Some(778576), None, &conn).unwrap();
        assert_eq!(stats.results.len(), 1);
        let stats = inscription_stats(None, Some(778576), &conn).unwrap();
        assert_eq!(stats.results[0].block_height, "778575");

        assert_eq!(
            get_indexed_chain_tip(&conn).unwrap(),
            Some(BlockIdentifier {
                index: 778577,
                hash: test_hash(778577),
            })
        );
    }
}
