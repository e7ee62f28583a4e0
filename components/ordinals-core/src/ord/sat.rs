use std::ops::Add;

use super::{epoch::Epoch, height::Height, rarity::Rarity};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Ord, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Sat(pub u64);

impl Sat {
    pub const LAST: Self = Self(Self::SUPPLY - 1);
    pub const SUPPLY: u64 = 2099999997690000;

    pub fn n(self) -> u64 {
        self.0
    }

    pub fn epoch(self) -> Epoch {
        self.into()
    }

    /// Height of the block whose coinbase first created this sat.
    pub fn height(self) -> Height {
        let epoch = self.epoch();
        match epoch.subsidy() {
            0 => epoch.starting_height(),
            subsidy => Height(epoch.starting_height().n() + self.epoch_position() / subsidy),
        }
    }

    /// Position of this sat inside its coinbase subsidy.
    pub fn third(self) -> u64 {
        match self.epoch().subsidy() {
            0 => 0,
            subsidy => self.epoch_position() % subsidy,
        }
    }

    pub fn epoch_position(self) -> u64 {
        self.0.saturating_sub(self.epoch().starting_sat().0)
    }

    pub fn rarity(self) -> Rarity {
        Rarity::classify(self.0, self.height(), self.third())
    }
}

impl PartialEq<u64> for Sat {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<u64> for Sat {
    fn partial_cmp(&self, other: &u64) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl Add<u64> for Sat {
    type Output = Self;

    fn add(self, other: u64) -> Sat {
        Sat(self.0 + other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height() {
        assert_eq!(Sat(0).height(), 0);
        assert_eq!(Sat(1).height(), 0);
        assert_eq!(Sat(Epoch(0).subsidy()).height(), 1);
        assert_eq!(Sat(Epoch(0).subsidy() * 2).height(), 2);
        assert_eq!(Epoch(2).starting_sat().height(), 420000);
        assert_eq!(Sat(257418248345364).height(), 51483);
    }

    #[test]
    fn third() {
        assert_eq!(Sat(0).third(), 0);
        assert_eq!(Sat(1).third(), 1);
        assert_eq!(Sat(Height(0).subsidy() - 1).third(), Height(0).subsidy() - 1);
        assert_eq!(Sat(Height(0).subsidy()).third(), 0);
        assert_eq!(Sat(257418248345364).third(), 3248345364);
        assert_eq!(Sat::LAST.third(), 0);
    }

    #[test]
    fn out_of_supply_sats_do_not_panic() {
        assert_eq!(Sat(Sat::SUPPLY).third(), 0);
        assert_eq!(Sat(u64::MAX).height(), Epoch(33).starting_height());
    }
}
