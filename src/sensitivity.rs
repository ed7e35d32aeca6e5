//! Sparse sensitivity vectors.
//!
//! A sensitivity vector maps each elementary ancestor of an uncertain number
//! to the partial derivative of the number with respect to that ancestor.
//! Only ancestors with a non-zero coefficient are stored.

use crate::registry::ElementaryId;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Partial derivatives of an uncertain number with respect to its elementary ancestors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sensitivity {
    coefficients: BTreeMap<ElementaryId, f64>,
}

impl Sensitivity {
    /// An empty vector, as carried by constants.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            coefficients: BTreeMap::new(),
        }
    }

    /// The vector of an elementary quantity: a single unit coefficient.
    pub(crate) fn unit(id: ElementaryId) -> Self {
        Self {
            coefficients: BTreeMap::from([(id, 1.0)]),
        }
    }

    /// A copy of this vector with a unit coefficient for `id`.
    pub(crate) fn with_unit(&self, id: ElementaryId) -> Self {
        let mut coefficients = self.coefficients.clone();
        coefficients.insert(id, 1.0);
        Self { coefficients }
    }

    /// Coefficient for `id`, zero if it is not an ancestor.
    #[must_use]
    pub fn get(&self, id: ElementaryId) -> f64 {
        self.coefficients.get(&id).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn contains(&self, id: ElementaryId) -> bool {
        self.coefficients.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Ancestors and coefficients in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementaryId, f64)> + '_ {
        self.coefficients.iter().map(|(&id, &c)| (id, c))
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementaryId> + '_ {
        self.coefficients.keys().copied()
    }

    /// Chain rule over any number of operands.
    ///
    /// Each term is a local derivative and the operand's own sensitivity
    /// vector. The result is merged over the union of keys. A coefficient
    /// that cancels to within `tolerance` of the magnitude of its terms is
    /// dropped, as are exact zeros.
    pub(crate) fn chain(terms: &[(f64, &Sensitivity)], tolerance: f64) -> Self {
        let mut merged: BTreeMap<ElementaryId, (f64, f64)> = BTreeMap::new();
        for &(derivative, sensitivity) in terms {
            if derivative == 0.0 {
                continue;
            }
            for (id, coefficient) in sensitivity.iter() {
                let term = derivative * coefficient;
                let entry = merged.entry(id).or_insert((0.0, 0.0));
                entry.0 += term;
                entry.1 += term.abs();
            }
        }

        let coefficients = merged
            .into_iter()
            .filter(|&(_, (sum, magnitude))| sum != 0.0 && sum.abs() > tolerance * magnitude)
            .map(|(id, (sum, _))| (id, sum))
            .collect();
        Self { coefficients }
    }
}

impl<'a> IntoIterator for &'a Sensitivity {
    type Item = (&'a ElementaryId, &'a f64);
    type IntoIter = btree_map::Iter<'a, ElementaryId, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.coefficients.iter()
    }
}
