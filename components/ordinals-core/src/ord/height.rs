use std::ops::Add;

use super::{epoch::Epoch, sat::Sat, DIFFCHANGE_INTERVAL, SUBSIDY_HALVING_INTERVAL};

#[derive(Copy, Clone, Debug, Ord, Eq, PartialEq, PartialOrd)]
pub struct Height(pub u64);

impl Height {
    pub fn n(self) -> u64 {
        self.0
    }

    pub fn subsidy(self) -> u64 {
        Epoch::from(self).subsidy()
    }

    pub fn starting_sat(self) -> Sat {
        let epoch = Epoch::from(self);
        let epoch_starting_height = epoch.starting_height();
        epoch.starting_sat() + (self.0 - epoch_starting_height.0) * epoch.subsidy()
    }

    /// Blocks since the last difficulty adjustment.
    pub fn period_offset(self) -> u64 {
        self.0 % DIFFCHANGE_INTERVAL
    }

    /// Blocks since the last halving.
    pub fn epoch_offset(self) -> u64 {
        self.0 % SUBSIDY_HALVING_INTERVAL
    }
}

impl Add<u64> for Height {
    type Output = Self;

    fn add(self, other: u64) -> Height {
        Self(self.0 + other)
    }
}

impl PartialEq<u64> for Height {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_sat() {
        assert_eq!(Height(0).starting_sat(), 0);
        assert_eq!(Height(1).starting_sat(), 5000000000);
        assert_eq!(
            Height(SUBSIDY_HALVING_INTERVAL).starting_sat(),
            1050000000000000
        );
        assert_eq!(
            Height(SUBSIDY_HALVING_INTERVAL + 1).starting_sat(),
            1050000000000000 + 2500000000
        );
    }

    #[test]
    fn offsets() {
        assert_eq!(Height(4032).period_offset(), 0);
        assert_eq!(Height(4033).period_offset(), 1);
        assert_eq!(Height(420000).epoch_offset(), 0);
        assert_eq!(Height(51483).epoch_offset(), 51483);
    }
}
