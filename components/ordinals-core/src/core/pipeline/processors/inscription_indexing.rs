use std::thread::JoinHandle;

use rusqlite::Connection;

use crate::{
    config::Config,
    core::{
        pipeline::{IngestionCommand, IngestionController, IngestionEvent},
        protocol::{
            inscription_sequencing::{apply_inscription_reveal, rollback_inscription_reveal},
            inscription_tracking::{apply_inscription_transfer, rollback_inscription_transfer},
            BlockContext,
        },
        IndexingConfig, IngestionReport, OperationOutcome,
    },
    db::{
        increment_write_sequence, stats::recompute_inscription_count_accum,
        update_chain_tip_on_apply, update_chain_tip_on_rollback,
    },
    error::IndexerError,
    initialize_db,
    types::{BitcoinBlockData, BitcoinInscriptionsPayload, BlockIdentifier, OrdinalOperation},
    utils::{normalize_hash, Context},
};

/// Applies a payload atomically: rollback blocks first, in the order given,
/// then apply blocks. Any error discards every write of the payload.
pub fn apply_chainhook_payload(
    payload: &BitcoinInscriptionsPayload,
    conn: &mut Connection,
    config: &IndexingConfig,
    ctx: &Context,
) -> Result<IngestionReport, IndexerError> {
    let db_tx = conn.transaction()?;
    let mut report = IngestionReport::default();

    for block in payload.rollback.iter() {
        rollback_block(block, &db_tx, config, &mut report, ctx)?;
    }
    for block in payload.apply.iter() {
        apply_block(block, &db_tx, config, &mut report, ctx)?;
    }
    if report.has_changes() {
        increment_write_sequence(&db_tx)?;
    }
    db_tx.commit()?;
    Ok(report)
}

fn block_context(block: &BitcoinBlockData) -> BlockContext {
    BlockContext {
        block_identifier: BlockIdentifier {
            index: block.block_identifier.index,
            hash: normalize_hash(&block.block_identifier.hash),
        },
        timestamp: block.timestamp,
    }
}

/// Operations of `block` paired with their transaction hash, ordered by
/// `tx_index`. The sort is stable so operations sharing a transaction keep
/// their delivery order.
fn sorted_operations(block: &BitcoinBlockData) -> Vec<(String, &OrdinalOperation)> {
    let mut operations = vec![];
    for tx in block.transactions.iter() {
        let tx_id = normalize_hash(&tx.transaction_identifier.hash);
        for operation in tx.metadata.ordinal_operations.iter() {
            operations.push((tx_id.clone(), operation));
        }
    }
    operations.sort_by_key(|(_, operation)| operation.tx_index());
    operations
}

pub fn apply_block(
    block: &BitcoinBlockData,
    db_tx: &Connection,
    config: &IndexingConfig,
    report: &mut IngestionReport,
    ctx: &Context,
) -> Result<(), IndexerError> {
    let block_ctx = block_context(block);
    let mut revealed = 0;
    let mut transferred = 0;

    for (tx_id, operation) in sorted_operations(block) {
        let outcome = match operation {
            OrdinalOperation::InscriptionRevealed(reveal) => {
                apply_inscription_reveal(reveal, &tx_id, &block_ctx, config, db_tx, ctx)?
            }
            OrdinalOperation::InscriptionTransferred(transfer) => {
                apply_inscription_transfer(transfer, &tx_id, &block_ctx, config, db_tx, ctx)?
            }
        };
        match (outcome, operation) {
            (OperationOutcome::Skipped, _) => report.operations_skipped += 1,
            (OperationOutcome::Applied, OrdinalOperation::InscriptionRevealed(_)) => revealed += 1,
            (OperationOutcome::Applied, OrdinalOperation::InscriptionTransferred(_)) => {
                transferred += 1
            }
        }
    }

    if revealed > 0 {
        recompute_inscription_count_accum(block_ctx.block_identifier.index, db_tx)?;
    }
    update_chain_tip_on_apply(&block_ctx.block_identifier, db_tx)?;

    report.blocks_applied += 1;
    report.inscriptions_revealed += revealed;
    report.inscriptions_transferred += transferred;
    ctx.try_log(|logger| {
        info!(
            logger,
            "Block #{} applied: {} inscriptions revealed, {} transferred",
            block_ctx.block_identifier.index,
            revealed,
            transferred
        )
    });
    Ok(())
}

/// Undoes `block` by replaying the inverse of its operations, last first.
pub fn rollback_block(
    block: &BitcoinBlockData,
    db_tx: &Connection,
    config: &IndexingConfig,
    report: &mut IngestionReport,
    ctx: &Context,
) -> Result<(), IndexerError> {
    let block_ctx = block_context(block);
    let mut reveals_rolled_back = 0;
    let mut transfers_rolled_back = 0;

    for (_, operation) in sorted_operations(block).into_iter().rev() {
        match operation {
            OrdinalOperation::InscriptionRevealed(reveal) => {
                rollback_inscription_reveal(reveal, &block_ctx, config, db_tx, ctx)?;
                reveals_rolled_back += 1;
            }
            OrdinalOperation::InscriptionTransferred(transfer) => {
                rollback_inscription_transfer(transfer, &block_ctx, config, db_tx, ctx)?;
                transfers_rolled_back += 1;
            }
        }
    }

    if reveals_rolled_back > 0 {
        recompute_inscription_count_accum(block_ctx.block_identifier.index, db_tx)?;
    }
    update_chain_tip_on_rollback(&block_ctx.block_identifier, db_tx)?;

    report.blocks_rolled_back += 1;
    report.reveals_rolled_back += reveals_rolled_back;
    report.transfers_rolled_back += transfers_rolled_back;
    ctx.try_log(|logger| {
        info!(
            logger,
            "Block #{} rolled back: {} reveals, {} transfers undone",
            block_ctx.block_identifier.index,
            reveals_rolled_back,
            transfers_rolled_back
        )
    });
    Ok(())
}

pub fn start_inscription_ingestion_processor(
    config: &Config,
    ctx: &Context,
) -> Result<IngestionController, IndexerError> {
    let conn = initialize_db(config, ctx)?;
    start_inscription_ingestion_processor_with_connection(conn, config, ctx)
}

/// Spawns the ingestion runloop on top of an already opened connection,
/// which the runloop owns from then on.
pub fn start_inscription_ingestion_processor_with_connection(
    mut conn: Connection,
    config: &Config,
    ctx: &Context,
) -> Result<IngestionController, IndexerError> {
    let (commands_tx, commands_rx) =
        crossbeam_channel::bounded::<IngestionCommand>(config.resources.ingestion_queue_size);
    let (events_tx, events_rx) = crossbeam_channel::unbounded::<IngestionEvent>();

    let indexing_config = config.get_indexing_config();
    let ctx = ctx.clone();
    let handle: JoinHandle<()> = hiro_system_kit::thread_named("Inscription ingestion runloop")
        .spawn(move || loop {
            let (payload, reply_tx) = match commands_rx.recv() {
                Ok(IngestionCommand::ApplyPayload(payload, reply_tx)) => (payload, reply_tx),
                Ok(IngestionCommand::Terminate) | Err(_) => {
                    let _ = events_tx.send(IngestionEvent::Terminated);
                    break;
                }
            };

            ctx.try_log(|logger| {
                info!(
                    logger,
                    "Processing payload ({} blocks to roll back, {} to apply)",
                    payload.rollback.len(),
                    payload.apply.len()
                )
            });
            let result = apply_chainhook_payload(&payload, &mut conn, &indexing_config, &ctx);
            if let Err(ref e) = result {
                ctx.try_log(|logger| error!(logger, "Payload rejected: {}", e.to_string()));
                let _ = events_tx.send(IngestionEvent::PayloadRejected(e.to_string()));
            }
            let _ = reply_tx.send(result);
        })
        .map_err(|e| IndexerError::Worker(e.to_string()))?;

    Ok(IngestionController {
        commands_tx,
        events_rx,
        thread_handle: handle,
    })
}
