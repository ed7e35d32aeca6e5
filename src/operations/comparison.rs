//! Comparisons of best estimates.
//!
//! Comparing uncertain numbers compares their values only; the uncertainty
//! plays no part. `x == y` therefore says nothing about whether `x - y` has
//! zero uncertainty.

use crate::uncertain::UncertainReal;
use std::cmp::Ordering;

impl PartialEq for UncertainReal {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl PartialOrd for UncertainReal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value().partial_cmp(&other.value())
    }
}

impl PartialEq<f64> for UncertainReal {
    fn eq(&self, other: &f64) -> bool {
        self.value() == *other
    }
}

impl PartialOrd<f64> for UncertainReal {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.value().partial_cmp(other)
    }
}

impl PartialEq<UncertainReal> for f64 {
    fn eq(&self, other: &UncertainReal) -> bool {
        *self == other.value()
    }
}

impl PartialOrd<UncertainReal> for f64 {
    fn partial_cmp(&self, other: &UncertainReal) -> Option<Ordering> {
        self.partial_cmp(&other.value())
    }
}
