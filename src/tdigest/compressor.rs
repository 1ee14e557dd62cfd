//! The merging engine: compress an ordered centroid stream under a budget.
//!
//! Contract:
//! - INPUT MUST BE NON-DECREASING BY MEAN. Adjacent equal means are coalesced
//!   in one pass; a decrease (mean[i] < mean[i-1]) is a producer bug and
//!   panics.
//! - First/last centroids are dedicated edges when shrinking, so extremal
//!   singletons survive compression and min/max stay exact.
//! - Interior merged by k-limit: Δk(q_lo→q_hi) ≤ 1 with the digest's scale
//!   family, `q_lo` frozen at the pending cluster's start.
//! - If the interior still exceeds capacity, equal-weight bucket the interior
//!   only (never pad).
//! - Under [`Budget::Unbounded`] only exactly-equal means are fused; no
//!   interpolation loss occurs.
//! - Total weight is preserved by every stage.

use crate::tdigest::budget::Budget;
use crate::tdigest::centroids::{is_sorted_by_mean, Centroid};
use crate::tdigest::scale::{can_combine, ScaleFamily};

/* ---------- small helpers ---------- */

/// Collapse a slice to a single centroid at the weighted mean.
#[inline]
fn weighted_collapse(slice: &[Centroid]) -> Centroid {
    let mut acc = slice[0];
    for c in &slice[1..] {
        acc.absorb(c.mean(), c.weight());
    }
    acc
}

/// Equal-weight bucketing of the already-merged interior clusters; returns
/// at most `buckets` groups, order-preserving. We intentionally allow fewer
/// than `buckets` when the trailing mass is small: fewer very small centroids
/// means less quantile jitter in the tails.
#[inline]
fn bucketize_equal_weight(interior: &[Centroid], buckets: usize) -> Vec<Centroid> {
    debug_assert!(buckets > 0);
    if interior.is_empty() {
        return Vec::new();
    }
    if buckets == 1 {
        return vec![weighted_collapse(interior)];
    }

    let total_w: f64 = interior.iter().map(|c| c.weight()).sum();
    let target = total_w / buckets as f64;

    let mut out = Vec::with_capacity(buckets);
    let mut acc: Option<Centroid> = None;
    for c in interior {
        match acc {
            Some(ref mut cur) => cur.absorb(c.mean(), c.weight()),
            None => acc = Some(*c),
        }
        // Keep the final slot open for the remainder so no mass is dropped.
        if out.len() + 1 < buckets {
            if let Some(cur) = acc {
                if cur.weight() >= target {
                    out.push(cur);
                    acc = None;
                }
            }
        }
    }
    if let Some(cur) = acc {
        out.push(cur);
    }
    out
}

/* ---------- the compression pass ---------- */

/// Compress a mean-ordered centroid stream into at most `budget` centroids.
///
/// Stages: normalize (order check + exact-tie coalescing) → fast path →
/// edges → k-limit interior merge → equal-weight cap → assemble.
pub(crate) fn compress_centroids<I>(items: I, budget: Budget, scale: ScaleFamily) -> Vec<Centroid>
where
    I: IntoIterator<Item = Centroid>,
{
    // (A) Single pass: verify non-decreasing order AND coalesce adjacent
    //     exactly-equal means.
    let mut out: Vec<Centroid> = Vec::new();
    let mut prev_mean = f64::NEG_INFINITY;

    for c in items {
        let m = c.mean();
        if m < prev_mean {
            panic!(
                "compress_centroids requires non-decreasing means; saw {} after {}",
                m, prev_mean
            );
        }
        if let Some(last) = out.last_mut() {
            if last.mean() == m {
                last.fuse(c.weight());
                prev_mean = m;
                continue;
            }
        }
        out.push(c);
        prev_mean = m;
    }

    // (B) Fast paths. Unbounded digests only ever coalesce exact ties.
    let limit = match budget.limit() {
        None => return out,
        // A zero bound would silently drop data; treat it as 1.
        Some(k) => k.max(1),
    };
    let n = out.len();
    if n <= limit {
        debug_assert!(is_sorted_by_mean(&out));
        return out;
    }
    if limit == 1 {
        return vec![weighted_collapse(&out)];
    }
    if limit == 2 {
        // Keep the extremal means as anchors; fold interior mass into them.
        let left = out[0];
        let right = out[n - 1];
        let interior_w: f64 = out[1..n - 1].iter().map(|c| c.weight()).sum();
        return vec![
            Centroid::new(left.mean(), left.weight() + interior_w * 0.5),
            Centroid::new(right.mean(), right.weight() + (interior_w - interior_w * 0.5)),
        ];
    }

    // (C) Dedicated edges + k-limit interior.
    let left_edge = out[0];
    let right_edge = out[n - 1];
    let interior = &out[1..n - 1];

    let delta = limit as f64;
    let total_w: f64 = out.iter().map(|c| c.weight()).sum();

    let mut clusters: Vec<Centroid> = Vec::with_capacity(interior.len());
    let mut consumed = left_edge.weight(); // weight left of the pending cluster
    let mut pending = interior[0];
    let mut q_lo = consumed / total_w;

    for c in &interior[1..] {
        let q_hi = (consumed + pending.weight() + c.weight()) / total_w;
        if can_combine(q_lo, q_hi, delta, scale) {
            pending.absorb(c.mean(), c.weight());
        } else {
            consumed += pending.weight();
            clusters.push(pending);
            pending = *c;
            q_lo = consumed / total_w;
        }
    }
    clusters.push(pending);

    // (D) Enforce interior capacity (never pad).
    let interior_budget = limit - 2;
    let interior_final = if clusters.len() <= interior_budget {
        clusters
    } else {
        bucketize_equal_weight(&clusters, interior_budget)
    };

    // (E) Assemble.
    let mut compressed = Vec::with_capacity(2 + interior_final.len());
    compressed.push(left_edge);
    compressed.extend(interior_final);
    compressed.push(right_edge);

    debug_assert!(is_sorted_by_mean(&compressed));
    #[cfg(debug_assertions)]
    {
        let w_in: f64 = out.iter().map(|c| c.weight()).sum();
        let w_out: f64 = compressed.iter().map(|c| c.weight()).sum();
        debug_assert!(
            (w_in - w_out).abs() <= 1e-9 * w_in.abs().max(1.0),
            "total weight changed: {} -> {}",
            w_in,
            w_out
        );
    }

    compressed
}

/* ------------------------------ TESTS ------------------------------ */
