//! Digest facade: ingestion, merging, management.
//!
//! The facade owns the centroid store plus the exact aggregates (min, max,
//! sum, count). Aggregates are updated from raw ingestion data and combined
//! additively on merges; they are never recomputed from the lossy centroid
//! list, which is what keeps `min()`, `max()` and `mean()` exact for digests
//! built by ingestion.

use std::fmt;
use std::ops::{Add, AddAssign};

use ordered_float::OrderedFloat;

use crate::error::{DigestError, DigestResult};
use crate::tdigest::budget::Budget;
use crate::tdigest::centroids::Centroid;
use crate::tdigest::compressor::compress_centroids;
use crate::tdigest::merges::{KWayCentroidMerge, MergeByMean};
use crate::tdigest::scale::ScaleFamily;

/// A t-digest summary of a stream of real-valued observations.
///
/// Mutating operations keep these invariants:
/// - centroids sorted by mean, exact ties fused;
/// - Σ centroid weight == number of ingested observations;
/// - `n_centroids ≤ max_centroids` when the budget is bounded;
/// - extremal singletons survive compression, so `min()`/`max()` are exact.
#[derive(Debug, Clone)]
pub struct TDigest {
    centroids: Vec<Centroid>,
    max_centroids: Budget,
    scale: ScaleFamily,
    sum: OrderedFloat<f64>,
    count: OrderedFloat<f64>,
    min: OrderedFloat<f64>,
    max: OrderedFloat<f64>,
}

impl Default for TDigest {
    fn default() -> Self {
        TDigest {
            centroids: Vec::new(),
            max_centroids: Budget::default(),
            scale: ScaleFamily::default(),
            sum: OrderedFloat::from(0.0),
            count: OrderedFloat::from(0.0),
            min: OrderedFloat::from(f64::NAN),
            max: OrderedFloat::from(f64::NAN),
        }
    }
}

/// Two digests are equal iff their centroid lists match element-wise under
/// IEEE float equality and their budgets agree. The scale family and the
/// exact aggregates are deliberately excluded: equality describes the
/// summary, not its provenance.
impl PartialEq for TDigest {
    fn eq(&self, other: &Self) -> bool {
        self.max_centroids == other.max_centroids && self.centroids == other.centroids
    }
}
impl Eq for TDigest {}

/// Fluent construction.
#[derive(Debug, Clone, Default)]
pub struct TDigestBuilder {
    max_centroids: Budget,
    scale: ScaleFamily,
}

impl TDigestBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn max_centroids(mut self, budget: Budget) -> Self {
        self.max_centroids = budget;
        self
    }
    pub fn scale(mut self, scale: ScaleFamily) -> Self {
        self.scale = scale;
        self
    }
    pub fn build(self) -> TDigest {
        TDigest {
            max_centroids: self.max_centroids,
            scale: self.scale,
            ..TDigest::default()
        }
    }
}

impl TDigest {
    /// An empty digest with the default budget.
    pub fn new() -> TDigest {
        TDigest::default()
    }

    /// An empty digest with an explicit budget.
    pub fn with_budget(max_centroids: Budget) -> TDigest {
        TDigest {
            max_centroids,
            ..TDigest::default()
        }
    }

    /// Entry point for fluent construction.
    pub fn builder() -> TDigestBuilder {
        TDigestBuilder::default()
    }

    /// Build a digest from a batch of values.
    ///
    /// Rejects NaN samples with a domain error; an empty slice yields an
    /// empty digest with the requested budget.
    pub fn from_values(values: &[f64], max_centroids: Budget) -> DigestResult<TDigest> {
        let mut d = TDigest::with_budget(max_centroids);
        d.batch_update(values)?;
        Ok(d)
    }

    /// Rebuild from raw parts (deserialization path). Runs one compression
    /// pass when the centroid list exceeds the budget so the budget
    /// invariant holds for reconstructed digests too.
    pub(crate) fn from_parts(
        centroids: Vec<Centroid>,
        max_centroids: Budget,
        scale: ScaleFamily,
        sum: f64,
        count: f64,
        min: f64,
        max: f64,
    ) -> TDigest {
        let centroids = match max_centroids.limit() {
            Some(limit) if centroids.len() > limit => {
                compress_centroids(centroids, max_centroids, scale)
            }
            _ => centroids,
        };
        TDigest {
            centroids,
            max_centroids,
            scale,
            sum: OrderedFloat::from(sum),
            count: OrderedFloat::from(count),
            min: OrderedFloat::from(min),
            max: OrderedFloat::from(max),
        }
    }

    /* ===========================
     * Accessors
     * =========================== */

    #[inline]
    pub fn max_centroids(&self) -> Budget {
        self.max_centroids
    }

    /// Change the budget. Shrinking below the current centroid count runs a
    /// compression pass immediately so the budget invariant keeps holding.
    pub fn set_max_centroids(&mut self, max_centroids: Budget) -> DigestResult<()> {
        if max_centroids == Budget::Bounded(0) {
            return Err(DigestError::Domain {
                context: "max_centroids must be positive",
            });
        }
        self.max_centroids = max_centroids;
        if let Some(limit) = max_centroids.limit() {
            if self.centroids.len() > limit {
                let drained = std::mem::take(&mut self.centroids);
                self.centroids = compress_centroids(drained, max_centroids, self.scale);
            }
        }
        Ok(())
    }

    #[inline]
    pub fn scale(&self) -> ScaleFamily {
        self.scale
    }

    /// Number of ingested observations.
    #[inline]
    pub fn n_values(&self) -> u64 {
        self.count.into_inner().round() as u64
    }

    /// Total centroid weight (equals `n_values` for ingestion-built digests;
    /// may be fractional after deserializing foreign summaries).
    #[inline]
    pub fn total_weight(&self) -> f64 {
        self.count.into_inner()
    }

    #[inline]
    pub fn n_centroids(&self) -> usize {
        self.centroids.len()
    }

    /// Same as [`TDigest::n_centroids`].
    #[inline]
    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    #[inline]
    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    /// Exact minimum of all ingested values.
    pub fn min(&self) -> DigestResult<f64> {
        self.require_data("min")?;
        Ok(self.min.into_inner())
    }

    /// Exact maximum of all ingested values.
    pub fn max(&self) -> DigestResult<f64> {
        self.require_data("max")?;
        Ok(self.max.into_inner())
    }

    /// Exact arithmetic mean of all ingested values.
    ///
    /// Exact for digests built by ingestion; after deserialization the sum
    /// is reconstructed from centroids and the mean becomes an estimate.
    pub fn mean(&self) -> DigestResult<f64> {
        self.require_data("mean")?;
        Ok(self.sum.into_inner() / self.count.into_inner())
    }

    #[inline]
    pub(crate) fn min_value(&self) -> f64 {
        self.min.into_inner()
    }

    #[inline]
    pub(crate) fn max_value(&self) -> f64 {
        self.max.into_inner()
    }

    #[inline]
    pub(crate) fn require_data(&self, op: &'static str) -> DigestResult<()> {
        if self.centroids.is_empty() {
            Err(DigestError::Empty { op })
        } else {
            Ok(())
        }
    }

    /* ===========================
     * Ingestion
     * =========================== */

    /// Ingest a single observation.
    pub fn update(&mut self, value: f64) -> DigestResult<()> {
        self.batch_update(&[value])
    }

    /// Ingest a batch of observations.
    ///
    /// NaN samples are rejected before any state changes, so a failing call
    /// leaves the digest untouched. Infinities are accepted and propagate
    /// into min/max/mean per IEEE-754. An empty batch is a no-op.
    pub fn batch_update(&mut self, values: &[f64]) -> DigestResult<()> {
        if values.is_empty() {
            return Ok(());
        }
        if values.iter().any(|v| v.is_nan()) {
            return Err(DigestError::Domain {
                context: "sample value is NaN",
            });
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let batch_sum: f64 = sorted.iter().sum();
        let vmin = OrderedFloat::from(sorted[0]);
        let vmax = OrderedFloat::from(sorted[sorted.len() - 1]);

        let stream = MergeByMean::from_centroids_and_values(&self.centroids, &sorted);
        self.centroids = compress_centroids(stream, self.max_centroids, self.scale);

        if self.count.into_inner() > 0.0 {
            self.min = std::cmp::min(self.min, vmin);
            self.max = std::cmp::max(self.max, vmax);
        } else {
            self.min = vmin;
            self.max = vmax;
        }
        self.sum = OrderedFloat::from(self.sum.into_inner() + batch_sum);
        self.count = OrderedFloat::from(self.count.into_inner() + sorted.len() as f64);
        Ok(())
    }

    /* ===========================
     * Merging
     * =========================== */

    /// Merge with another digest into a new one. The result's budget is the
    /// larger of the two, with `Unbounded` dominating any bound.
    pub fn merge(&self, other: &TDigest) -> TDigest {
        let budget = self.max_centroids.combine(other.max_centroids);
        self.merged_with(other, budget)
    }

    /// Merge `other`'s contribution into `self`. `self`'s budget is kept;
    /// `other` is only traversed, never consumed.
    pub fn merge_inplace(&mut self, other: &TDigest) {
        *self = self.merged_with(other, self.max_centroids);
    }

    fn merged_with(&self, other: &TDigest, budget: Budget) -> TDigest {
        let mut runs: Vec<&[Centroid]> = Vec::with_capacity(2);
        if !self.centroids.is_empty() {
            runs.push(&self.centroids);
        }
        if !other.centroids.is_empty() {
            runs.push(&other.centroids);
        }

        let stream = KWayCentroidMerge::from_runs(&runs);
        let centroids = compress_centroids(stream, budget, self.scale);

        let (min, max) = match (self.centroids.is_empty(), other.centroids.is_empty()) {
            (true, true) => (OrderedFloat::from(f64::NAN), OrderedFloat::from(f64::NAN)),
            (true, false) => (other.min, other.max),
            (false, true) => (self.min, self.max),
            (false, false) => (
                std::cmp::min(self.min, other.min),
                std::cmp::max(self.max, other.max),
            ),
        };

        TDigest {
            centroids,
            max_centroids: budget,
            scale: self.scale,
            sum: OrderedFloat::from(self.sum.into_inner() + other.sum.into_inner()),
            count: OrderedFloat::from(self.count.into_inner() + other.count.into_inner()),
            min,
            max,
        }
    }

    /* ===========================
     * Management
     * =========================== */

    /// Run one compression pass targeting `k` centroids.
    ///
    /// The effective bound is `max(k, min(n_values, 3))`: quantile
    /// interpolation needs at least three anchor points for non-trivial
    /// digests. The configured budget is left unchanged.
    pub fn compress(&mut self, k: u32) {
        if self.centroids.is_empty() {
            return;
        }
        let floor = self.count.into_inner().min(3.0) as u32;
        let effective = k.max(floor).max(1);
        let drained = std::mem::take(&mut self.centroids);
        self.centroids = compress_centroids(drained, Budget::Bounded(effective), self.scale);
    }
}

/// Fold an iterable of digests into one with a single batched compression
/// pass over the concatenation of all centroid lists.
///
/// When `max_centroids` is omitted the result uses the maximum over all
/// source budgets, `Unbounded` dominating. An empty iterable yields an empty
/// digest with the supplied budget (or unbounded if none was supplied).
pub fn merge_all<'a, I>(digests: I, max_centroids: Option<Budget>) -> TDigest
where
    I: IntoIterator<Item = &'a TDigest>,
{
    let sources: Vec<&TDigest> = digests.into_iter().collect();

    let budget = max_centroids.unwrap_or_else(|| {
        sources
            .iter()
            .map(|d| d.max_centroids)
            .reduce(Budget::combine)
            .unwrap_or(Budget::Unbounded)
    });
    let scale = sources.first().map(|d| d.scale).unwrap_or_default();

    let mut runs: Vec<&[Centroid]> = Vec::with_capacity(sources.len());
    let mut sum = 0.0;
    let mut count = 0.0;
    let mut min = OrderedFloat::from(f64::INFINITY);
    let mut max = OrderedFloat::from(f64::NEG_INFINITY);

    for d in &sources {
        if d.centroids.is_empty() {
            continue;
        }
        sum += d.sum.into_inner();
        count += d.count.into_inner();
        min = std::cmp::min(min, d.min);
        max = std::cmp::max(max, d.max);
        runs.push(&d.centroids);
    }

    if runs.is_empty() {
        return TDigest {
            max_centroids: budget,
            scale,
            ..TDigest::default()
        };
    }

    let stream = KWayCentroidMerge::from_runs(&runs);
    let centroids = compress_centroids(stream, budget, scale);

    TDigest {
        centroids,
        max_centroids: budget,
        scale,
        sum: OrderedFloat::from(sum),
        count: OrderedFloat::from(count),
        min,
        max,
    }
}

impl fmt::Display for TDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TDigest(n_values={}, n_centroids={})",
            self.n_values(),
            self.n_centroids()
        )
    }
}

impl Add<&TDigest> for &TDigest {
    type Output = TDigest;
    fn add(self, rhs: &TDigest) -> TDigest {
        self.merge(rhs)
    }
}

impl AddAssign<&TDigest> for TDigest {
    fn add_assign(&mut self, rhs: &TDigest) {
        self.merge_inplace(rhs);
    }
}
