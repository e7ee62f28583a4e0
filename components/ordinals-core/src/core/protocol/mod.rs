pub mod inscription_sequencing;
pub mod inscription_tracking;
pub mod numbering;
pub mod recursion;

use std::str::FromStr;

use crate::error::IndexerError;
use crate::ord::{inscription_id::InscriptionId, sat_point::SatPoint};
use crate::types::BlockIdentifier;

pub(crate) fn parse_satpoint(satpoint: &str) -> Result<SatPoint, IndexerError> {
    SatPoint::from_str(satpoint).map_err(IndexerError::InvalidIdentifier)
}

pub(crate) fn parse_inscription_id(inscription_id: &str) -> Result<InscriptionId, IndexerError> {
    InscriptionId::from_str(inscription_id)
        .map_err(|e| IndexerError::InvalidIdentifier(format!("{inscription_id}: {e}")))
}

/// Block being applied or rolled back, with hashes already normalized.
#[derive(Debug, Clone)]
pub struct BlockContext {
    pub block_identifier: BlockIdentifier,
    pub timestamp: u32,
}
