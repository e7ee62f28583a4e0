use rusqlite::Connection;
use serde_json::Value as JsonValue;

use crate::{
    config::Config,
    core::pipeline::processors::inscription_indexing::apply_chainhook_payload,
    db::{inscriptions::DbInscription, locations::DbLocation},
    types::{
        BitcoinBlockData, BitcoinInscriptionsPayload, BitcoinTransactionData,
        BitcoinTransactionMetadata, BlockIdentifier, OrdinalInscriptionNumber,
        OrdinalInscriptionRevealData, OrdinalInscriptionTransferData,
        OrdinalInscriptionTransferDestination, OrdinalOperation, TransactionIdentifier,
    },
    utils::Context,
};

pub fn get_test_ctx() -> Context {
    let logger = hiro_system_kit::log::setup_logger();
    let _guard = hiro_system_kit::log::setup_global_logger(logger.clone());
    Context {
        logger: Some(logger),
        tracer: false,
    }
}

pub const TEST_INSCRIPTION_ID: &str =
    "38c46a8bf7ec90bc7f6b797e7dc84baa97f4e5fd4286b92fe1b50176d03b18dci0";
pub const TEST_ORDINAL_NUMBER: u64 = 257418248345364;

/// Hash-looking hex string unique to `seed`.
pub fn test_hash(seed: u64) -> String {
    format!("{:064x}", seed)
}

pub fn test_db_inscription() -> DbInscription {
    DbInscription {
        genesis_id: TEST_INSCRIPTION_ID.to_string(),
        number: 1,
        classic_number: 1,
        jubilee_number: 1,
        ordinal_number: TEST_ORDINAL_NUMBER,
        sat_coinbase_height: 51483,
        sat_coinbase_offset: 0,
        block_height: 778576,
        block_hash: "00000000000000000002ec3ca27b0aa4f6bb4346d4d81ac4ab2ec0a41ee7fcba".to_string(),
        tx_id: "38c46a8bf7ec90bc7f6b797e7dc84baa97f4e5fd4286b92fe1b50176d03b18dc".to_string(),
        tx_index: 0,
        timestamp: 1676913207,
        fee: 705,
        address: "bc1pscktlmn99gyzlvymvrezh6vwd0l4kg06tg5rvssw0czg8873gz5sdkteqj".to_string(),
        content_type: "image/png".to_string(),
        mime_type: "image/png".to_string(),
        content_length: 5,
        curse_type: None,
        delegate: None,
        metaprotocol: None,
        metadata: None,
        parent: None,
        recursive: false,
        recursion_refs: None,
    }
}

/// Location of [`TEST_INSCRIPTION_ID`]; each `(block_height, tx_index)` pair
/// yields its own satpoint.
pub fn test_db_location(block_height: u64, tx_index: u64, is_genesis: bool) -> DbLocation {
    let tx_id = test_hash(block_height * 10_000 + tx_index);
    DbLocation {
        id: 0,
        inscription_id: TEST_INSCRIPTION_ID.to_string(),
        ordinal_number: TEST_ORDINAL_NUMBER,
        block_height,
        block_hash: test_hash(block_height),
        satpoint: format!("{}:0:0", tx_id),
        output: format!("{}:0", tx_id),
        tx_id,
        tx_index,
        offset: 0,
        address: "bc1pscktlmn99gyzlvymvrezh6vwd0l4kg06tg5rvssw0czg8873gz5sdkteqj".to_string(),
        value: Some(10000),
        timestamp: 1676913207,
        is_genesis,
    }
}

pub struct TestRevealBuilder {
    pub inscription_id: String,
    pub inscription_number: OrdinalInscriptionNumber,
    pub ordinal_number: u64,
    pub ordinal_block_height: u64,
    pub ordinal_offset: u64,
    pub tx_index: usize,
    pub satpoint_post_inscription: Option<String>,
    pub content_bytes: String,
    pub content_type: String,
    pub inscriber_address: Option<String>,
    pub inscription_output_value: u64,
    pub curse_type: Option<JsonValue>,
}

impl TestRevealBuilder {
    pub fn new() -> Self {
        TestRevealBuilder {
            inscription_id: TEST_INSCRIPTION_ID.to_string(),
            inscription_number: OrdinalInscriptionNumber {
                classic: 0,
                jubilee: 0,
            },
            ordinal_number: TEST_ORDINAL_NUMBER,
            ordinal_block_height: 51483,
            ordinal_offset: 0,
            tx_index: 0,
            satpoint_post_inscription: None,
            content_bytes: "0x48656C6C6F".to_string(),
            content_type: "text/plain;charset=utf-8".to_string(),
            inscriber_address: Some(
                "bc1pscktlmn99gyzlvymvrezh6vwd0l4kg06tg5rvssw0czg8873gz5sdkteqj".to_string(),
            ),
            inscription_output_value: 10000,
            curse_type: None,
        }
    }

    pub fn inscription_id(mut self, val: &str) -> Self {
        self.inscription_id = val.to_string();
        self
    }

    pub fn inscription_number(mut self, val: i64) -> Self {
        self.inscription_number = OrdinalInscriptionNumber {
            classic: val,
            jubilee: val,
        };
        self
    }

    pub fn numbers(mut self, classic: i64, jubilee: i64) -> Self {
        self.inscription_number = OrdinalInscriptionNumber { classic, jubilee };
        self
    }

    pub fn ordinal_number(mut self, val: u64) -> Self {
        self.ordinal_number = val;
        self
    }

    pub fn sat_coinbase(mut self, height: u64, offset: u64) -> Self {
        self.ordinal_block_height = height;
        self.ordinal_offset = offset;
        self
    }

    pub fn tx_index(mut self, val: usize) -> Self {
        self.tx_index = val;
        self
    }

    pub fn satpoint(mut self, val: &str) -> Self {
        self.satpoint_post_inscription = Some(val.to_string());
        self
    }

    pub fn content(mut self, content_type: &str, content: &[u8]) -> Self {
        self.content_type = content_type.to_string();
        self.content_bytes = format!("0x{}", hex::encode(content));
        self
    }

    pub fn inscriber_address(mut self, val: Option<&str>) -> Self {
        self.inscriber_address = val.map(|a| a.to_string());
        self
    }

    pub fn curse_type(mut self, val: JsonValue) -> Self {
        self.curse_type = Some(val);
        self
    }

    pub fn build(self) -> OrdinalInscriptionRevealData {
        let txid = self
            .inscription_id
            .split('i')
            .next()
            .unwrap_or_default()
            .to_string();
        let content_length = hex::decode(self.content_bytes.trim_start_matches("0x"))
            .map(|bytes| bytes.len() as u64)
            .unwrap_or(0);
        OrdinalInscriptionRevealData {
            content_bytes: self.content_bytes,
            content_type: self.content_type,
            content_length,
            inscription_number: self.inscription_number,
            inscription_fee: 705,
            inscription_output_value: self.inscription_output_value,
            inscription_id: self.inscription_id,
            inscription_input_index: 0,
            inscription_pointer: None,
            inscriber_address: self.inscriber_address,
            delegate: None,
            metaprotocol: None,
            metadata: None,
            parent: None,
            ordinal_number: self.ordinal_number,
            ordinal_block_height: self.ordinal_block_height,
            ordinal_offset: self.ordinal_offset,
            tx_index: self.tx_index,
            transfers_pre_inscription: 0,
            satpoint_post_inscription: self
                .satpoint_post_inscription
                .unwrap_or_else(|| format!("{}:0:0", txid)),
            curse_type: self.curse_type,
        }
    }
}

pub struct TestTransferBuilder {
    pub ordinal_number: u64,
    pub destination: OrdinalInscriptionTransferDestination,
    pub satpoint_pre_transfer: String,
    pub satpoint_post_transfer: String,
    pub post_transfer_output_value: Option<u64>,
    pub tx_index: usize,
}

impl TestTransferBuilder {
    pub fn new() -> Self {
        TestTransferBuilder {
            ordinal_number: TEST_ORDINAL_NUMBER,
            destination: OrdinalInscriptionTransferDestination::Transferred(
                "bc1pls75sfwullhygkmqap344f5cqf97qz95lvle6fvddm0tpz2l5ffslgq3m0".to_string(),
            ),
            satpoint_pre_transfer: "".to_string(),
            satpoint_post_transfer: "".to_string(),
            post_transfer_output_value: Some(9000),
            tx_index: 0,
        }
    }

    pub fn ordinal_number(mut self, val: u64) -> Self {
        self.ordinal_number = val;
        self
    }

    pub fn destination(mut self, val: OrdinalInscriptionTransferDestination) -> Self {
        self.destination = val;
        self
    }

    pub fn satpoints(mut self, pre: &str, post: &str) -> Self {
        self.satpoint_pre_transfer = pre.to_string();
        self.satpoint_post_transfer = post.to_string();
        self
    }

    pub fn value(mut self, val: Option<u64>) -> Self {
        self.post_transfer_output_value = val;
        self
    }

    pub fn tx_index(mut self, val: usize) -> Self {
        self.tx_index = val;
        self
    }

    pub fn build(self) -> OrdinalInscriptionTransferData {
        OrdinalInscriptionTransferData {
            ordinal_number: self.ordinal_number,
            destination: self.destination,
            satpoint_pre_transfer: self.satpoint_pre_transfer,
            satpoint_post_transfer: self.satpoint_post_transfer,
            post_transfer_output_value: self.post_transfer_output_value,
            tx_index: self.tx_index,
        }
    }
}

/// Builds a block whose transactions each carry a single operation; the
/// transaction hash is taken from the operation's resulting satpoint.
pub struct TestBlockBuilder {
    pub block_identifier: BlockIdentifier,
    pub timestamp: u32,
    pub transactions: Vec<BitcoinTransactionData>,
}

impl TestBlockBuilder {
    pub fn new(height: u64) -> Self {
        TestBlockBuilder {
            block_identifier: BlockIdentifier {
                index: height,
                hash: format!("0x{}", test_hash(height)),
            },
            timestamp: 1676913207,
            transactions: vec![],
        }
    }

    pub fn hash(mut self, val: &str) -> Self {
        self.block_identifier.hash = val.to_string();
        self
    }

    pub fn timestamp(mut self, val: u32) -> Self {
        self.timestamp = val;
        self
    }

    pub fn reveal(self, reveal: OrdinalInscriptionRevealData) -> Self {
        let tx_hash = reveal.satpoint_post_inscription.clone();
        self.operation(&tx_hash, OrdinalOperation::InscriptionRevealed(reveal))
    }

    pub fn transfer(self, transfer: OrdinalInscriptionTransferData) -> Self {
        let tx_hash = transfer.satpoint_post_transfer.clone();
        self.operation(&tx_hash, OrdinalOperation::InscriptionTransferred(transfer))
    }

    fn operation(mut self, satpoint: &str, operation: OrdinalOperation) -> Self {
        let tx_hash = satpoint.split(':').next().unwrap_or_default();
        self.transactions.push(BitcoinTransactionData {
            transaction_identifier: TransactionIdentifier {
                hash: format!("0x{}", tx_hash),
            },
            metadata: BitcoinTransactionMetadata {
                ordinal_operations: vec![operation],
            },
        });
        self
    }

    pub fn build(self) -> BitcoinBlockData {
        BitcoinBlockData {
            block_identifier: self.block_identifier,
            timestamp: self.timestamp,
            transactions: self.transactions,
        }
    }
}

pub fn apply_payload(blocks: Vec<BitcoinBlockData>) -> BitcoinInscriptionsPayload {
    BitcoinInscriptionsPayload {
        apply: blocks,
        rollback: vec![],
    }
}

pub fn rollback_payload(blocks: Vec<BitcoinBlockData>) -> BitcoinInscriptionsPayload {
    BitcoinInscriptionsPayload {
        apply: vec![],
        rollback: blocks,
    }
}

/// Indexes `blocks` with the test configuration.
pub fn index_test_blocks(conn: &mut Connection, blocks: Vec<BitcoinBlockData>) {
    apply_chainhook_payload(
        &apply_payload(blocks),
        conn,
        &Config::test_default().get_indexing_config(),
        &get_test_ctx(),
    )
    .unwrap();
}

pub fn rollback_test_blocks(conn: &mut Connection, blocks: Vec<BitcoinBlockData>) {
    apply_chainhook_payload(
        &rollback_payload(blocks),
        conn,
        &Config::test_default().get_indexing_config(),
        &get_test_ctx(),
    )
    .unwrap();
}
