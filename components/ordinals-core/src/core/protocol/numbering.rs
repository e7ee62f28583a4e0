use crate::types::OrdinalInscriptionNumber;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingEpoch {
    /// Cursed inscriptions get their own descending negative sequence.
    Classic,
    /// Cursed and blessed inscriptions share one sequence.
    Jubilee,
}

pub fn numbering_epoch_at_height(block_height: u64, jubilee_height: u64) -> NumberingEpoch {
    if block_height < jubilee_height {
        NumberingEpoch::Classic
    } else {
        NumberingEpoch::Jubilee
    }
}

/// Picks the number exposed for an inscription revealed at `block_height`.
/// Both raw values are persisted next to it, so this choice is never
/// revisited after the fact.
pub fn assign_inscription_number(
    inscription_number: &OrdinalInscriptionNumber,
    block_height: u64,
    jubilee_height: u64,
) -> i64 {
    match numbering_epoch_at_height(block_height, jubilee_height) {
        NumberingEpoch::Classic => inscription_number.classic,
        NumberingEpoch::Jubilee => inscription_number.jubilee,
    }
}

pub fn is_consistent_numbering(inscription_number: &OrdinalInscriptionNumber) -> bool {
    inscription_number.jubilee >= 0
}

#[cfg(test)]
mod test {
    use test_case::test_case;

    use super::{assign_inscription_number, is_consistent_numbering};
    use crate::types::OrdinalInscriptionNumber;

    const JUBILEE_HEIGHT: u64 = 824544;

    #[test_case(1, 1, 778576 => 1; "blessed before jubilee")]
    #[test_case(-7, 66_000_101, 800000 => -7; "cursed before jubilee")]
    #[test_case(-7, 66_000_101, 824544 => 66_000_101; "cursed at jubilee")]
    #[test_case(71_000_000, 71_000_100, 830000 => 71_000_100; "blessed after jubilee")]
    fn picks_number_by_epoch(classic: i64, jubilee: i64, block_height: u64) -> i64 {
        assign_inscription_number(
            &OrdinalInscriptionNumber { classic, jubilee },
            block_height,
            JUBILEE_HEIGHT,
        )
    }

    #[test]
    fn flags_negative_jubilee_numbers() {
        assert!(is_consistent_numbering(&OrdinalInscriptionNumber {
            classic: -1,
            jubilee: 10
        }));
        assert!(!is_consistent_numbering(&OrdinalInscriptionNumber {
            classic: -1,
            jubilee: -1
        }));
    }
}
