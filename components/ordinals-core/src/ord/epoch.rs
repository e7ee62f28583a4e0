use super::{height::Height, sat::Sat, COIN_VALUE, SUBSIDY_HALVING_INTERVAL};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Ord, PartialOrd)]
pub struct Epoch(pub u64);

impl Epoch {
    /// First epoch whose subsidy rounds down to zero.
    pub const FIRST_POST_SUBSIDY: Epoch = Self(33);

    pub fn subsidy(self) -> u64 {
        if self < Self::FIRST_POST_SUBSIDY {
            (50 * COIN_VALUE) >> self.0
        } else {
            0
        }
    }

    pub fn starting_sat(self) -> Sat {
        Sat((0..self.0.min(Self::FIRST_POST_SUBSIDY.0))
            .map(|epoch| Epoch(epoch).subsidy() * SUBSIDY_HALVING_INTERVAL)
            .sum())
    }

    pub fn starting_height(self) -> Height {
        Height(self.0 * SUBSIDY_HALVING_INTERVAL)
    }
}

impl From<Sat> for Epoch {
    fn from(sat: Sat) -> Self {
        let mut epoch = 0;
        while epoch < Self::FIRST_POST_SUBSIDY.0 && Epoch(epoch + 1).starting_sat() <= sat {
            epoch += 1;
        }
        Epoch(epoch)
    }
}

impl From<Height> for Epoch {
    fn from(height: Height) -> Self {
        Self(height.0 / SUBSIDY_HALVING_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_sat() {
        assert_eq!(Epoch(0).starting_sat(), 0);
        assert_eq!(
            Epoch(1).starting_sat(),
            Epoch(0).subsidy() * SUBSIDY_HALVING_INTERVAL
        );
        assert_eq!(Epoch(33).starting_sat(), Sat::SUPPLY);
        assert_eq!(Epoch(34).starting_sat(), Sat::SUPPLY);
    }

    #[test]
    fn subsidy() {
        assert_eq!(Epoch(0).subsidy(), 5000000000);
        assert_eq!(Epoch(1).subsidy(), 2500000000);
        assert_eq!(Epoch(32).subsidy(), 1);
        assert_eq!(Epoch(33).subsidy(), 0);
    }

    #[test]
    fn from_sat() {
        assert_eq!(Epoch::from(Sat(0)), 0);
        assert_eq!(Epoch::from(Sat(1)), 0);
        assert_eq!(Epoch::from(Epoch(1).starting_sat()), 1);
        assert_eq!(Epoch::from(Epoch(1).starting_sat() + 1), 1);
        assert_eq!(Epoch::from(Sat::LAST), 32);
    }

    #[test]
    fn from_height() {
        assert_eq!(Epoch::from(Height(0)), 0);
        assert_eq!(Epoch::from(Height(SUBSIDY_HALVING_INTERVAL)), 1);
        assert_eq!(Epoch::from(Height(SUBSIDY_HALVING_INTERVAL) + 1), 1);
    }
}

impl PartialEq<u64> for Epoch {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}
