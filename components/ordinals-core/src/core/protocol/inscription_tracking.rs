use rusqlite::Connection;

use super::{parse_satpoint, BlockContext};
use crate::{
    core::{IndexingConfig, OperationOutcome},
    db::locations::{
        delete_location, find_current_locations_for_ordinal_number, find_previous_location,
        insert_location, location_exists, set_current_location, DbLocation,
    },
    error::IndexerError,
    try_debug,
    types::OrdinalInscriptionTransferData,
    utils::Context,
};

/// Moves every inscription sitting on the transferred sat from the
/// pre-transfer satpoint to the post-transfer one. Reinscribed sats move
/// together.
pub fn apply_inscription_transfer(
    transfer: &OrdinalInscriptionTransferData,
    tx_id: &str,
    block: &BlockContext,
    config: &IndexingConfig,
    db_tx: &Connection,
    ctx: &Context,
) -> Result<OperationOutcome, IndexerError> {
    let block_height = block.block_identifier.index;
    let tx_index = transfer.tx_index as u64;
    let satpoint_pre_transfer = parse_satpoint(&transfer.satpoint_pre_transfer)?.to_string();
    let satpoint_post_transfer = parse_satpoint(&transfer.satpoint_post_transfer)?;
    let post = satpoint_post_transfer.to_string();

    let current_locations =
        find_current_locations_for_ordinal_number(transfer.ordinal_number, db_tx)?;
    if current_locations.is_empty() {
        return Err(IndexerError::continuity(
            block_height,
            format!(
                "no inscription found on sat {} (expected at {})",
                transfer.ordinal_number, satpoint_pre_transfer
            ),
        ));
    }

    let mut to_move = vec![];
    for current in current_locations.into_iter() {
        if current.satpoint == satpoint_pre_transfer {
            to_move.push(current);
        } else if current.satpoint != post
            && !location_exists(&current.inscription_id, &post, block_height, tx_index, db_tx)?
        {
            return Err(IndexerError::continuity(
                block_height,
                format!(
                    "inscription {} expected at {}, found at {}",
                    current.inscription_id, satpoint_pre_transfer, current.satpoint
                ),
            ));
        }
    }
    if to_move.is_empty() {
        try_debug!(
            ctx,
            "Transfer of sat {} to {} already indexed, skipping",
            transfer.ordinal_number,
            post
        );
        return Ok(OperationOutcome::Skipped);
    }

    for current in to_move.into_iter() {
        if (block_height, tx_index) < (current.block_height, current.tx_index) {
            return Err(IndexerError::continuity(
                block_height,
                format!(
                    "transfer of inscription {} in tx #{} predates its current location at block #{} tx #{}",
                    current.inscription_id, tx_index, current.block_height, current.tx_index
                ),
            ));
        }
        let location = insert_location(
            &DbLocation {
                id: 0,
                inscription_id: current.inscription_id,
                ordinal_number: transfer.ordinal_number,
                block_height,
                block_hash: block.block_identifier.hash.clone(),
                tx_id: tx_id.to_string(),
                tx_index,
                satpoint: post.clone(),
                output: satpoint_post_transfer.output(),
                offset: satpoint_post_transfer.offset,
                address: transfer.destination.address().to_string(),
                value: transfer.post_transfer_output_value,
                timestamp: block.timestamp,
                is_genesis: false,
            },
            db_tx,
        )?;
        if config.logs.ingestion_internals {
            try_debug!(
                ctx,
                "Inscription {} moved from {} to {} at block #{}",
                location.inscription_id,
                satpoint_pre_transfer,
                location.satpoint,
                block_height
            );
        }
    }
    Ok(OperationOutcome::Applied)
}

/// Inverse of [`apply_inscription_transfer`]: drops the locations the
/// transfer created and restores their predecessors as current.
pub fn rollback_inscription_transfer(
    transfer: &OrdinalInscriptionTransferData,
    block: &BlockContext,
    config: &IndexingConfig,
    db_tx: &Connection,
    ctx: &Context,
) -> Result<OperationOutcome, IndexerError> {
    let block_height = block.block_identifier.index;
    let tx_index = transfer.tx_index as u64;
    let satpoint_pre_transfer = parse_satpoint(&transfer.satpoint_pre_transfer)?.to_string();
    let post = parse_satpoint(&transfer.satpoint_post_transfer)?.to_string();

    let created: Vec<DbLocation> =
        find_current_locations_for_ordinal_number(transfer.ordinal_number, db_tx)?
            .into_iter()
            .filter(|location| {
                !location.is_genesis
                    && location.satpoint == post
                    && location.block_height == block_height
                    && location.tx_index == tx_index
            })
            .collect();
    if created.is_empty() {
        return Err(IndexerError::continuity(
            block_height,
            format!(
                "no transfer of sat {} to {} to roll back",
                transfer.ordinal_number, post
            ),
        ));
    }

    for location in created.iter() {
        let Some(previous) = find_previous_location(location, db_tx)? else {
            return Err(IndexerError::continuity(
                block_height,
                format!("inscription {} has no location to restore", location.inscription_id),
            ));
        };
        if previous.satpoint != satpoint_pre_transfer {
            return Err(IndexerError::continuity(
                block_height,
                format!(
                    "inscription {} was at {} before the transfer, not {}",
                    location.inscription_id, previous.satpoint, satpoint_pre_transfer
                ),
            ));
        }
        delete_location(location.id, db_tx)?;
        set_current_location(&previous, db_tx)?;
        if config.logs.ingestion_internals {
            try_debug!(
                ctx,
                "Inscription {} restored to {} after rolling back block #{}",
                previous.inscription_id,
                previous.satpoint,
                block_height
            );
        }
    }
    Ok(OperationOutcome::Applied)
}
