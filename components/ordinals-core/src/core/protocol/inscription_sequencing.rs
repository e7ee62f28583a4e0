use rusqlite::Connection;
use serde_json::Value as JsonValue;

use super::{
    numbering::{assign_inscription_number, is_consistent_numbering},
    parse_inscription_id, parse_satpoint,
    recursion::{decode_content_bytes, get_recursive_inscription_refs},
    BlockContext,
};
use crate::{
    core::{IndexingConfig, OperationOutcome},
    db::{
        content::{delete_inscription_content, insert_inscription_content},
        inscriptions::{delete_inscription, find_inscription_with_id, insert_inscription, DbInscription},
        locations::{delete_current_location, delete_location, find_location_chain, insert_location, DbLocation},
        stats::{decrement_inscription_count, increment_inscription_count},
    },
    error::IndexerError,
    try_debug, try_warn,
    types::OrdinalInscriptionRevealData,
    utils::Context,
};

/// Curse types are opaque: strings are kept verbatim, anything else is kept
/// as its compact JSON text.
pub fn curse_type_to_string(curse_type: &Option<JsonValue>) -> Option<String> {
    match curse_type {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(value)) => Some(value.clone()),
        Some(value) => Some(value.to_string()),
    }
}

pub fn mime_type_from_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

pub fn apply_inscription_reveal(
    reveal: &OrdinalInscriptionRevealData,
    tx_id: &str,
    block: &BlockContext,
    config: &IndexingConfig,
    db_tx: &Connection,
    ctx: &Context,
) -> Result<OperationOutcome, IndexerError> {
    let block_height = block.block_identifier.index;
    let inscription_id = parse_inscription_id(&reveal.inscription_id)?.to_string();
    let satpoint = parse_satpoint(&reveal.satpoint_post_inscription)?;

    if let Some(existing) = find_inscription_with_id(&inscription_id, db_tx)? {
        let genesis = find_location_chain(&inscription_id, db_tx)?.into_iter().next();
        let same_genesis = existing.block_height == block_height
            && genesis.map_or(false, |location| location.satpoint == satpoint.to_string());
        if same_genesis {
            try_debug!(ctx, "Inscription {} already revealed, skipping", inscription_id);
            return Ok(OperationOutcome::Skipped);
        }
        return Err(IndexerError::continuity(
            block_height,
            format!(
                "inscription {} already revealed at block #{}",
                inscription_id, existing.block_height
            ),
        ));
    }

    if !is_consistent_numbering(&reveal.inscription_number) {
        try_warn!(
            ctx,
            "Inscription {} carries a negative jubilee number {}",
            inscription_id,
            reveal.inscription_number.jubilee
        );
    }
    if block_height < config.first_inscription_height {
        try_warn!(
            ctx,
            "Inscription {} revealed at block #{}, before the first inscription height #{}",
            inscription_id,
            block_height,
            config.first_inscription_height
        );
    }

    let content = decode_content_bytes(&reveal.content_bytes);
    let recursion_refs = get_recursive_inscription_refs(&content);
    let recursive = !recursion_refs.is_empty();

    let inscription = DbInscription {
        genesis_id: inscription_id.clone(),
        number: assign_inscription_number(
            &reveal.inscription_number,
            block_height,
            config.jubilee_height,
        ),
        classic_number: reveal.inscription_number.classic,
        jubilee_number: reveal.inscription_number.jubilee,
        ordinal_number: reveal.ordinal_number,
        sat_coinbase_height: reveal.ordinal_block_height,
        sat_coinbase_offset: reveal.ordinal_offset,
        block_height,
        block_hash: block.block_identifier.hash.clone(),
        tx_id: tx_id.to_string(),
        tx_index: reveal.tx_index as u64,
        timestamp: block.timestamp,
        fee: reveal.inscription_fee,
        address: reveal.inscriber_address.clone().unwrap_or_default(),
        content_type: reveal.content_type.clone(),
        mime_type: mime_type_from_content_type(&reveal.content_type),
        content_length: reveal.content_length,
        curse_type: curse_type_to_string(&reveal.curse_type),
        delegate: reveal.delegate.clone(),
        metaprotocol: reveal.metaprotocol.clone(),
        metadata: match reveal.metadata {
            None | Some(JsonValue::Null) => None,
            Some(ref metadata) => Some(metadata.to_string()),
        },
        parent: reveal.parent.clone(),
        recursive,
        recursion_refs: if recursive { Some(recursion_refs) } else { None },
    };
    insert_inscription(&inscription, db_tx)?;
    insert_location(
        &DbLocation {
            id: 0,
            inscription_id: inscription_id.clone(),
            ordinal_number: reveal.ordinal_number,
            block_height,
            block_hash: block.block_identifier.hash.clone(),
            tx_id: tx_id.to_string(),
            tx_index: reveal.tx_index as u64,
            satpoint: satpoint.to_string(),
            output: satpoint.output(),
            offset: satpoint.offset,
            address: inscription.address.clone(),
            value: Some(reveal.inscription_output_value),
            timestamp: block.timestamp,
            is_genesis: true,
        },
        db_tx,
    )?;
    insert_inscription_content(&inscription_id, &content, &reveal.content_type, db_tx)?;
    increment_inscription_count(&block.block_identifier, block.timestamp, db_tx)?;

    if config.logs.ingestion_internals {
        try_debug!(
            ctx,
            "Inscription {} revealed at block #{} (number {}, ordinal_number {})",
            inscription_id,
            block_height,
            inscription.number,
            inscription.ordinal_number
        );
    }
    Ok(OperationOutcome::Applied)
}

/// Inverse of [`apply_inscription_reveal`]. Transfers of the inscription must
/// have been rolled back first.
pub fn rollback_inscription_reveal(
    reveal: &OrdinalInscriptionRevealData,
    block: &BlockContext,
    config: &IndexingConfig,
    db_tx: &Connection,
    ctx: &Context,
) -> Result<OperationOutcome, IndexerError> {
    let block_height = block.block_identifier.index;
    let inscription_id = parse_inscription_id(&reveal.inscription_id)?.to_string();

    let Some(inscription) = find_inscription_with_id(&inscription_id, db_tx)? else {
        return Err(IndexerError::continuity(
            block_height,
            format!("unable to roll back unknown inscription {}", inscription_id),
        ));
    };
    if inscription.block_height != block_height {
        return Err(IndexerError::continuity(
            block_height,
            format!(
                "inscription {} was revealed at block #{}",
                inscription_id, inscription.block_height
            ),
        ));
    }
    let chain = find_location_chain(&inscription_id, db_tx)?;
    let genesis = match chain.as_slice() {
        [genesis] if genesis.is_genesis => genesis,
        _ => {
            return Err(IndexerError::continuity(
                block_height,
                format!(
                    "inscription {} still has {} locations",
                    inscription_id,
                    chain.len()
                ),
            ))
        }
    };

    delete_location(genesis.id, db_tx)?;
    delete_current_location(&inscription_id, db_tx)?;
    delete_inscription(&inscription_id, db_tx)?;
    delete_inscription_content(&inscription_id, db_tx)?;
    decrement_inscription_count(block_height, db_tx)?;

    if config.logs.ingestion_internals {
        ctx.try_log(|logger| {
            debug!(
                logger,
                "Inscription {} rolled back from block #{}", inscription_id, block_height
            )
        });
    }
    Ok(OperationOutcome::Applied)
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use test_case::test_case;

    use super::{curse_type_to_string, mime_type_from_content_type};

    #[test_case(None => None; "absent")]
    #[test_case(Some(json!(null)) => None; "null")]
    #[test_case(Some(json!(88)) => Some("88".to_string()); "tag number")]
    #[test_case(Some(json!("test")) => Some("test".to_string()); "string")]
    #[test_case(Some(json!({"tag": 66})) => Some("{\"tag\":66}".to_string()); "structured")]
    fn represents_curse_types(curse_type: Option<serde_json::Value>) -> Option<String> {
        curse_type_to_string(&curse_type)
    }

    #[test_case("text/plain;charset=utf-8" => "text/plain"; "with parameters")]
    #[test_case("image/png" => "image/png"; "bare")]
    #[test_case("" => ""; "empty")]
    fn extracts_mime_types(content_type: &str) -> String {
        mime_type_from_content_type(content_type)
    }
}
