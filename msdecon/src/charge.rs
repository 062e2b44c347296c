//! Charge state ranges and the isotopic spacing they imply
use std::cmp;

/// The minimum and maximum charge state to consider, inclusive
pub type ChargeRange = (i32, i32);

/// The mass difference between consecutive isotopic peaks at charge 1
pub const NEUTRON_MASS: f64 = 1.00866491578;

const ISOTOPIC_SHIFT: [f64; 10] = [
    NEUTRON_MASS / 1.0,
    NEUTRON_MASS / 2.0,
    NEUTRON_MASS / 3.0,
    NEUTRON_MASS / 4.0,
    NEUTRON_MASS / 5.0,
    NEUTRON_MASS / 6.0,
    NEUTRON_MASS / 7.0,
    NEUTRON_MASS / 8.0,
    NEUTRON_MASS / 9.0,
    NEUTRON_MASS / 10.0,
];

/// The expected m/z spacing between isotopic peaks of an ion with `charge`
#[inline]
pub fn isotopic_shift(charge: i32) -> f64 {
    if charge > 0 && charge < 11 {
        ISOTOPIC_SHIFT[(charge - 1) as usize]
    } else {
        NEUTRON_MASS / charge as f64
    }
}

/// Iterate over every charge in a [`ChargeRange`] in ascending order,
/// including both ends.
#[derive(Debug, Clone)]
pub struct ChargeRangeIter {
    pub min: i32,
    pub max: i32,
    current: i32,
}

impl ChargeRangeIter {
    pub fn new(min: i32, max: i32) -> ChargeRangeIter {
        let low = cmp::min(min, max);
        let high = cmp::max(min, max);
        ChargeRangeIter {
            min: low,
            max: high,
            current: low,
        }
    }

    pub fn next_charge(&mut self) -> Option<i32> {
        if self.current > self.max {
            None
        } else {
            let z = self.current;
            self.current += 1;
            Some(z)
        }
    }

    pub fn len(&self) -> usize {
        (self.max - self.current + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Iterator for ChargeRangeIter {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        self.next_charge()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len();
        (n, Some(n))
    }
}

impl ExactSizeIterator for ChargeRangeIter {}

impl From<ChargeRange> for ChargeRangeIter {
    fn from(pair: ChargeRange) -> ChargeRangeIter {
        ChargeRangeIter::new(pair.0, pair.1)
    }
}
