//! Centroid representation for the digest.
//!
//! A centroid is a pair `(mean, weight)` summarizing `weight` observations
//! clustered near `mean`. A centroid with `weight == 1` is a *singleton*: it
//! carries one exact sample. The serialized form uses the short field names
//! `m` / `c` of the interchange contract.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A weighted point `(m, c)` summarizing `c` observations near mean `m`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Centroid {
    #[serde(rename = "m")]
    mean: OrderedFloat<f64>,
    #[serde(rename = "c")]
    weight: OrderedFloat<f64>,
}

impl PartialOrd for Centroid {
    fn partial_cmp(&self, other: &Centroid) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Centroid {
    fn cmp(&self, other: &Centroid) -> Ordering {
        // Centroids are kept sorted by mean; ordering by mean alone is fine.
        self.mean.cmp(&other.mean)
    }
}

impl Centroid {
    pub fn new(mean: f64, weight: f64) -> Self {
        debug_assert!(!mean.is_nan(), "centroid mean must not be NaN");
        debug_assert!(weight > 0.0, "centroid weight must be > 0");
        Centroid {
            mean: OrderedFloat::from(mean),
            weight: OrderedFloat::from(weight),
        }
    }

    /// A centroid carrying exactly one sample.
    #[inline]
    pub fn singleton(mean: f64) -> Self {
        Centroid::new(mean, 1.0)
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean.into_inner()
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight.into_inner()
    }

    /// `true` iff this centroid carries exactly one sample.
    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.weight() == 1.0
    }

    /// Absorb another cluster using the incremental weighted-mean update
    /// `m ← m + (c'/(c+c'))·(m' − m)`, which keeps accumulated rounding at
    /// O(n·ε) over a merge pass.
    pub(crate) fn absorb(&mut self, mean: f64, weight: f64) {
        let w0 = self.weight.into_inner();
        let m0 = self.mean.into_inner();
        let w_new = w0 + weight;
        self.mean = OrderedFloat::from(m0 + (weight / w_new) * (mean - m0));
        self.weight = OrderedFloat::from(w_new);
    }

    /// Add weight at the same mean (exact-tie coalescing). The mean is
    /// untouched, so piles of identical values stay lossless.
    pub(crate) fn fuse(&mut self, weight: f64) {
        self.weight = OrderedFloat::from(self.weight.into_inner() + weight);
    }
}

/// Verify non-decreasing order by centroid mean (ties allowed).
#[inline]
pub fn is_sorted_by_mean(cs: &[Centroid]) -> bool {
    cs.windows(2).all(|w| w[0].mean() <= w[1].mean())
}
