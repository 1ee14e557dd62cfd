//! Probability-side queries: cdf and interval probability.
//!
//! `cdf` is the inverse of `quantile` over the same knots: the exact min at
//! cumulative weight 0, each centroid mean at its midpoint, and the exact
//! max at the total weight. A run of exactly-tied means is treated as one
//! step at the run's combined midpoint, which keeps the function
//! non-decreasing in x.

use crate::error::{DigestError, DigestResult};
use crate::tdigest::TDigest;

/// Exact ECDF at each sorted sample (midpoint convention on ties).
/// Public so accuracy tests can compare against it.
pub fn exact_ecdf_for_sorted(sorted: &[f64]) -> Vec<f64> {
    let n = sorted.len();
    if n == 0 {
        return Vec::new();
    }

    let nf = n as f64;
    let mut out = Vec::with_capacity(n);

    let mut i = 0usize;
    while i < n {
        // advance to end of the run of equal values
        let mut j = i + 1;
        while j < n && sorted[j] == sorted[i] {
            j += 1;
        }

        // midpoint convention on ties
        let mid = (i + j) as f64 / 2.0;
        let val = mid / nf;
        out.extend(std::iter::repeat(val).take(j - i));

        i = j;
    }

    out
}

impl TDigest {
    /// Estimate the cumulative probability P(X ≤ x).
    ///
    /// Returns 0 for `x ≤ min` and 1 for `x ≥ max`; in between, the estimate
    /// is non-decreasing in x.
    pub fn cdf(&self, x: f64) -> DigestResult<f64> {
        if x.is_nan() {
            return Err(DigestError::Domain {
                context: "x must not be NaN",
            });
        }
        self.require_data("cdf")?;

        let min = self.min_value();
        let max = self.max_value();
        if x <= min {
            return Ok(0.0);
        }
        if x >= max {
            return Ok(1.0);
        }

        let cs = self.centroids();
        let n = cs.len();
        let total = self.total_weight();

        // min < x < first mean: interpolate up from the exact minimum.
        if x < cs[0].mean() {
            let first_mid = cs[0].weight() / 2.0;
            let frac = (x - min) / (cs[0].mean() - min);
            return Ok((frac * first_mid) / total);
        }

        let mut cum = 0.0;
        let mut i = 0usize;
        while i < n {
            let mean_i = cs[i].mean();

            // Exactly at a centroid mean: step at the midpoint of the whole
            // run of tied means.
            if x == mean_i {
                let mut run_w = cs[i].weight();
                let mut j = i + 1;
                while j < n && cs[j].mean() == x {
                    run_w += cs[j].weight();
                    j += 1;
                }
                return Ok((cum + run_w / 2.0) / total);
            }

            // Strictly between this mean and the next: linear segment
            // between their midpoints.
            if i + 1 < n && x < cs[i + 1].mean() {
                let mid_i = cum + cs[i].weight() / 2.0;
                let mid_next = cum + cs[i].weight() + cs[i + 1].weight() / 2.0;
                let frac = (x - mean_i) / (cs[i + 1].mean() - mean_i);
                return Ok((mid_i + frac * (mid_next - mid_i)) / total);
            }

            cum += cs[i].weight();
            i += 1;
        }

        // last mean < x < max: interpolate toward the exact maximum.
        let last = cs[n - 1];
        let last_mid = cum - last.weight() / 2.0;
        let frac = (x - last.mean()) / (max - last.mean());
        Ok((last_mid + frac * (total - last_mid)) / total)
    }

    /// Probability mass of the interval `[x1, x2]`, i.e.
    /// `cdf(x2) − cdf(x1)`. No ordering is required; `x2 < x1` yields a
    /// negative result.
    pub fn probability(&self, x1: f64, x2: f64) -> DigestResult<f64> {
        Ok(self.cdf(x2)? - self.cdf(x1)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tdigest::test_helpers::{
        assert_all_in_unit_interval, assert_monotone_chain, assert_rel_close, ks_mae,
    };
    use crate::tdigest::Budget;

    fn cdf_grid(d: &TDigest, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| d.cdf(x).expect("cdf")).collect()
    }

    #[test]
    fn cdf_validates_and_clamps() {
        let d = TDigest::from_values(&[1.0, 2.0, 3.0], Budget::default()).expect("build");
        assert!(d.cdf(f64::NAN).is_err());
        assert!(matches!(
            TDigest::new().cdf(0.5),
            Err(DigestError::Empty { .. })
        ));

        assert_eq!(d.cdf(0.0).expect("below"), 0.0);
        assert_eq!(d.cdf(1.0).expect("at min"), 0.0);
        assert_eq!(d.cdf(3.0).expect("at max"), 1.0);
        assert_eq!(d.cdf(99.0).expect("above"), 1.0);
        assert_eq!(d.cdf(f64::NEG_INFINITY).expect("-inf"), 0.0);
        assert_eq!(d.cdf(f64::INFINITY).expect("+inf"), 1.0);
    }

    #[test]
    fn cdf_at_a_mean_uses_the_midpoint() {
        let values: Vec<f64> = (1..=100).map(f64::from).collect();
        let d = TDigest::from_values(&values, Budget::Unbounded).expect("build");

        // 49 values below, half of the singleton at 50 → 49.5/100.
        assert_rel_close("cdf(50)", 0.495, d.cdf(50.0).expect("cdf"), 1e-12);
    }

    #[test]
    fn cdf_is_monotone_with_duplicates_and_extremes() {
        let mut values: Vec<f64> = vec![-1e9, -5.0, -2.0, 0.0, 2.0, 5.0, 1e-10, 2e-10, 2e-10, 1e9];
        values.sort_by(|a, b| a.total_cmp(b));
        let d = TDigest::from_values(&values, Budget::Bounded(10)).expect("build");

        let trio = cdf_grid(&d, &[1e-10, 2e-10, 5.0]);
        assert_monotone_chain("cdf trio", &trio);
        assert_all_in_unit_interval("cdf trio bounds", &trio);
        assert!(trio[0] < trio[1] && trio[1] < trio[2]);
    }

    #[test]
    fn cdf_tracks_the_exact_ecdf() {
        // 100 points with duplicates at both ends, heavily compressed.
        let mut values: Vec<f64> = (-30..=69).map(f64::from).collect();
        values[1] = -30.0;
        values[98] = 1e-10;
        values.sort_by(|a, b| a.total_cmp(b));

        let exact = exact_ecdf_for_sorted(&values);
        let d = TDigest::from_values(&values, Budget::Bounded(10)).expect("build");
        let approx = cdf_grid(&d, &values);

        let (ks, mae) = ks_mae(&exact, &approx);
        assert!(ks < 0.05, "CDF KS too large: {:.6e}", ks);
        assert!(mae < 0.02, "CDF MAE too large: {:.6e}", mae);

        assert_all_in_unit_interval("cdf(100) bounds", &approx);
        assert_monotone_chain("cdf(100) monotone", &approx);
    }

    #[test]
    fn probability_is_a_cdf_difference() {
        let values: Vec<f64> = (1..=100).map(f64::from).collect();
        let d = TDigest::from_values(&values, Budget::default()).expect("build");

        let p = d.probability(80.0, 100.0).expect("prob");
        assert_rel_close("P[80,100]", 0.205, p, 1e-9);

        // Reversed bounds flip the sign.
        let neg = d.probability(100.0, 80.0).expect("prob rev");
        assert_rel_close("P[100,80]", -0.205, neg, 1e-9);

        assert!(matches!(
            TDigest::new().probability(0.0, 1.0),
            Err(DigestError::Empty { .. })
        ));
    }

    #[test]
    fn quantile_and_cdf_are_mutual_inverses() {
        let values: Vec<f64> = (0..1000).map(|i| (i as f64).sqrt()).collect();
        let d = TDigest::from_values(&values, Budget::Bounded(100)).expect("build");

        for i in 1..20 {
            let q = i as f64 / 20.0;
            let x = d.quantile(q).expect("quantile");
            let q_back = d.cdf(x).expect("cdf");
            assert_rel_close("cdf(quantile(q))", q, q_back, 0.05);
        }
    }
}
