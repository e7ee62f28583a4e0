//! Wire types for the block payloads produced by the chain observer.
//!
//! A payload carries the blocks to roll back (processed first) and the blocks
//! to apply. Unknown fields are ignored so full observer payloads can be fed
//! as-is.

use std::fmt;
use std::str::FromStr;

use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitcoinNetwork {
    Mainnet,
    Testnet,
    Signet,
    Regtest,
}

impl FromStr for BitcoinNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(BitcoinNetwork::Mainnet),
            "testnet" => Ok(BitcoinNetwork::Testnet),
            "signet" => Ok(BitcoinNetwork::Signet),
            "regtest" | "devnet" => Ok(BitcoinNetwork::Regtest),
            _ => Err(format!("network {} not supported", s)),
        }
    }
}

impl fmt::Display for BitcoinNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BitcoinNetwork::Mainnet => "mainnet",
            BitcoinNetwork::Testnet => "testnet",
            BitcoinNetwork::Signet => "signet",
            BitcoinNetwork::Regtest => "regtest",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockIdentifier {
    pub index: u64,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionIdentifier {
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitcoinInscriptionsPayload {
    #[serde(default)]
    pub apply: Vec<BitcoinBlockData>,
    #[serde(default)]
    pub rollback: Vec<BitcoinBlockData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitcoinBlockData {
    pub block_identifier: BlockIdentifier,
    /// Seconds since epoch.
    pub timestamp: u32,
    #[serde(default)]
    pub transactions: Vec<BitcoinTransactionData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitcoinTransactionData {
    pub transaction_identifier: TransactionIdentifier,
    #[serde(default)]
    pub metadata: BitcoinTransactionMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BitcoinTransactionMetadata {
    #[serde(default)]
    pub ordinal_operations: Vec<OrdinalOperation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdinalOperation {
    InscriptionRevealed(OrdinalInscriptionRevealData),
    InscriptionTransferred(OrdinalInscriptionTransferData),
}

impl OrdinalOperation {
    pub fn tx_index(&self) -> usize {
        match self {
            OrdinalOperation::InscriptionRevealed(data) => data.tx_index,
            OrdinalOperation::InscriptionTransferred(data) => data.tx_index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalInscriptionNumber {
    pub classic: i64,
    pub jubilee: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinalInscriptionRevealData {
    /// Hex encoded, with or without a `0x` prefix.
    #[serde(default)]
    pub content_bytes: String,
    pub content_type: String,
    pub content_length: u64,
    pub inscription_number: OrdinalInscriptionNumber,
    pub inscription_fee: u64,
    pub inscription_output_value: u64,
    pub inscription_id: String,
    #[serde(default)]
    pub inscription_input_index: usize,
    #[serde(default)]
    pub inscription_pointer: Option<u64>,
    pub inscriber_address: Option<String>,
    #[serde(default)]
    pub delegate: Option<String>,
    #[serde(default)]
    pub metaprotocol: Option<String>,
    #[serde(default)]
    pub metadata: Option<JsonValue>,
    #[serde(default)]
    pub parent: Option<String>,
    pub ordinal_number: u64,
    pub ordinal_block_height: u64,
    pub ordinal_offset: u64,
    pub tx_index: usize,
    #[serde(default)]
    pub transfers_pre_inscription: u32,
    pub satpoint_post_inscription: String,
    #[serde(default)]
    pub curse_type: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OrdinalInscriptionTransferDestination {
    Transferred(String),
    SpentInFees,
    Burnt(String),
}

impl OrdinalInscriptionTransferDestination {
    /// Only regular transfers land on an address we can expose.
    pub fn address(&self) -> &str {
        match self {
            OrdinalInscriptionTransferDestination::Transferred(address) => address,
            OrdinalInscriptionTransferDestination::SpentInFees
            | OrdinalInscriptionTransferDestination::Burnt(_) => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalInscriptionTransferData {
    pub ordinal_number: u64,
    pub destination: OrdinalInscriptionTransferDestination,
    pub satpoint_pre_transfer: String,
    pub satpoint_post_transfer: String,
    pub post_transfer_output_value: Option<u64>,
    pub tx_index: usize,
}
