pub mod processors;

use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

use crate::core::IngestionReport;
use crate::error::IndexerError;
use crate::types::BitcoinInscriptionsPayload;

pub enum IngestionCommand {
    ApplyPayload(
        BitcoinInscriptionsPayload,
        Sender<Result<IngestionReport, IndexerError>>,
    ),
    Terminate,
}

pub enum IngestionEvent {
    PayloadRejected(String),
    Terminated,
}

/// Handle on the single writer of the index. Payloads sent through it are
/// applied one at a time, in submission order.
pub struct IngestionController {
    pub commands_tx: Sender<IngestionCommand>,
    pub events_rx: Receiver<IngestionEvent>,
    pub thread_handle: JoinHandle<()>,
}

impl IngestionController {
    /// Queues `payload` and blocks until the worker has committed or
    /// discarded it.
    pub fn apply_payload(
        &self,
        payload: BitcoinInscriptionsPayload,
    ) -> Result<IngestionReport, IndexerError> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.commands_tx
            .send(IngestionCommand::ApplyPayload(payload, reply_tx))
            .map_err(|e| IndexerError::Worker(e.to_string()))?;
        reply_rx
            .recv()
            .map_err(|e| IndexerError::Worker(e.to_string()))?
    }

    pub fn terminate(self) -> Result<(), IndexerError> {
        let _ = self.commands_tx.send(IngestionCommand::Terminate);
        self.thread_handle
            .join()
            .map_err(|_| IndexerError::Worker("ingestion runloop panicked".into()))
    }
}
