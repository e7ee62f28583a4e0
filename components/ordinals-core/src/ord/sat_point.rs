use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::utils::normalize_hash;

/// `<txid>:<vout>:<offset>`, the exact position of a sat inside an output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SatPoint {
    pub tx_id: String,
    pub vout: u32,
    pub offset: u64,
}

impl SatPoint {
    /// `<txid>:<vout>`
    pub fn output(&self) -> String {
        format!("{}:{}", self.tx_id, self.vout)
    }
}

impl Display for SatPoint {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.tx_id, self.vout, self.offset)
    }
}

impl FromStr for SatPoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (tx_id, vout, offset) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(tx_id), Some(vout), Some(offset), None) => (tx_id, vout, offset),
            _ => return Err(format!("malformed satpoint {s}")),
        };
        let tx_id = normalize_hash(tx_id);
        if tx_id.len() != 64 || !tx_id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("malformed txid in satpoint {s}"));
        }
        Ok(SatPoint {
            tx_id,
            vout: vout
                .parse()
                .map_err(|e| format!("malformed vout in satpoint {s}: {e}"))?,
            offset: offset
                .parse()
                .map_err(|e| format!("malformed offset in satpoint {s}: {e}"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::SatPoint;

    #[test]
    fn parses_and_formats() {
        let satpoint: SatPoint =
            "0xbdda0d240132bab2af7f797d1507beb1acab6ad43e2c0ef7f96291aea5cc3444:1:250"
                .parse()
                .unwrap();
        assert_eq!(satpoint.vout, 1);
        assert_eq!(satpoint.offset, 250);
        assert_eq!(
            satpoint.output(),
            "bdda0d240132bab2af7f797d1507beb1acab6ad43e2c0ef7f96291aea5cc3444:1"
        );
        assert_eq!(
            satpoint.to_string(),
            "bdda0d240132bab2af7f797d1507beb1acab6ad43e2c0ef7f96291aea5cc3444:1:250"
        );
    }

    #[test_case("bdda0d240132bab2af7f797d1507beb1acab6ad43e2c0ef7f96291aea5cc3444:0"; "missing offset")]
    #[test_case("bdda0d240132bab2af7f797d1507beb1acab6ad43e2c0ef7f96291aea5cc3444:0:0:0"; "extra segment")]
    #[test_case("bdda:0:0"; "short txid")]
    #[test_case("bdda0d240132bab2af7f797d1507beb1acab6ad43e2c0ef7f96291aea5cc3444:x:0"; "bad vout")]
    fn rejects_malformed(input: &str) {
        assert!(input.parse::<SatPoint>().is_err());
    }
}
