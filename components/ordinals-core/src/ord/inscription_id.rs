use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const TXID_LEN: usize = 64;

/// `<txid>i<index>`: the reveal transaction and the position of the
/// envelope inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InscriptionId {
    pub txid: String,
    pub index: u32,
}

impl InscriptionId {
    pub fn new(txid: &str, index: u32) -> InscriptionId {
        InscriptionId {
            txid: txid.to_lowercase(),
            index,
        }
    }
}

impl Display for InscriptionId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}i{}", self.txid, self.index)
    }
}

impl FromStr for InscriptionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((txid, index)) = s.split_once('i') else {
            return Err(format!("missing 'i' separator in {s}"));
        };
        if txid.len() != TXID_LEN || !txid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("malformed txid in {s}"));
        }
        if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("malformed index in {s}"));
        }
        let index = index
            .parse::<u32>()
            .map_err(|e| format!("index out of range in {s}: {e}"))?;
        Ok(InscriptionId::new(txid, index))
    }
}

impl Serialize for InscriptionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InscriptionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use test_case::test_case;

    use super::InscriptionId;

    const TXID: &str = "38c46a8bf7ec90bc7f6b797e7dc84baa97f4e5fd4286b92fe1b50176d03b18dc";

    #[test]
    fn parses_genesis_id() {
        let id: InscriptionId = format!("{TXID}i0").parse().unwrap();
        assert_eq!(id.txid, TXID);
        assert_eq!(id.index, 0);
        assert_eq!(id.to_string(), format!("{TXID}i0"));
    }

    #[test]
    fn lowercases_txid() {
        let id: InscriptionId = format!("{}i7", TXID.to_uppercase()).parse().unwrap();
        assert_eq!(id, InscriptionId::new(TXID, 7));
    }

    #[test]
    fn serializes_as_string() {
        let id = InscriptionId::new(TXID, 4294967295);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{TXID}i4294967295\""));
        assert_eq!(serde_json::from_str::<InscriptionId>(&json).unwrap(), id);
    }

    #[test_case("foo"; "too short")]
    #[test_case("38c46a8bf7ec90bc7f6b797e7dc84baa97f4e5fd4286b92fe1b50176d03b18dcx0"; "bad separator")]
    #[test_case("38c46a8bf7ec90bc7f6b797e7dc84baa97f4e5fd4286b92fe1b50176d03b18dci"; "missing index")]
    #[test_case("38c46a8bf7ec90bc7f6b797e7dc84baa97f4e5fd4286b92fe1b50176d03b18dcifoo"; "bad index")]
    #[test_case("38c46a8bf7ec90bc7f6b797e7dc84baa97f4e5fd4286b92fe1b50176d03b18dci4294967296"; "index overflow")]
    #[test_case("x8c46a8bf7ec90bc7f6b797e7dc84baa97f4e5fd4286b92fe1b50176d03b18dci0"; "bad txid")]
    #[test_case("→"; "non ascii")]
    fn rejects_malformed_ids(s: &str) {
        assert!(s.parse::<InscriptionId>().is_err());
    }
}
