//! Quantile-side queries: quantile, percentile, median, iqr, trimmed mean.
//!
//! The quantile estimate is a monotone piecewise-linear interpolation over
//! the centroid midpoints, anchored at the exact min/max endpoints: the i-th
//! centroid's mean sits at cumulative weight `Σ_{j<i} c_j + c_i/2`, and
//! q=0 / q=1 return the exact extremes. Every interpolation interval has a
//! strictly positive cumulative-weight width, so no division can blow up;
//! singleton endpoints collapse their interval to the singleton's mean.

use crate::error::{DigestError, DigestResult};
use crate::tdigest::TDigest;

impl TDigest {
    /// Estimate the value located at quantile `q ∈ [0,1]`.
    pub fn quantile(&self, q: f64) -> DigestResult<f64> {
        if q.is_nan() || !(0.0..=1.0).contains(&q) {
            return Err(DigestError::Domain {
                context: "q must be in [0,1]",
            });
        }
        self.require_data("quantile")?;

        let min = self.min_value();
        let max = self.max_value();
        if q == 0.0 {
            return Ok(min);
        }
        if q == 1.0 {
            return Ok(max);
        }

        let cs = self.centroids();
        if cs.len() == 1 {
            return Ok(cs[0].mean());
        }

        let total = self.total_weight();
        let target = q * total;

        // Before the first midpoint: interpolate from the exact minimum.
        let first_mid = cs[0].weight() / 2.0;
        if target <= first_mid {
            let v = min + (target / first_mid) * (cs[0].mean() - min);
            return Ok(clamp(v, min, max));
        }

        // Interior: bracket `target` between adjacent midpoints.
        let mut cum = cs[0].weight();
        let mut prev_mid = first_mid;
        let mut prev_mean = cs[0].mean();
        for c in &cs[1..] {
            let mid = cum + c.weight() / 2.0;
            if target <= mid {
                let frac = (target - prev_mid) / (mid - prev_mid);
                let v = prev_mean + frac * (c.mean() - prev_mean);
                return Ok(clamp(v, min, max));
            }
            cum += c.weight();
            prev_mid = mid;
            prev_mean = c.mean();
        }

        // After the last midpoint: interpolate toward the exact maximum.
        let frac = (target - prev_mid) / (total - prev_mid);
        let v = prev_mean + frac * (max - prev_mean);
        Ok(clamp(v, min, max))
    }

    /// Estimate the value at percentile `p ∈ [0,100]`.
    pub fn percentile(&self, p: f64) -> DigestResult<f64> {
        if p.is_nan() || !(0.0..=100.0).contains(&p) {
            return Err(DigestError::Domain {
                context: "p must be in [0,100]",
            });
        }
        self.quantile(p / 100.0)
    }

    /// The median, `quantile(0.5)`.
    pub fn median(&self) -> DigestResult<f64> {
        self.require_data("median")?;
        self.quantile(0.5)
    }

    /// Interquartile range, `quantile(0.75) − quantile(0.25)`.
    pub fn iqr(&self) -> DigestResult<f64> {
        self.require_data("iqr")?;
        Ok(self.quantile(0.75)? - self.quantile(0.25)?)
    }

    /// Mean of the values whose cumulative rank lies in `[q1, q2]`,
    /// approximated by integrating the piecewise-linear inverse CDF.
    ///
    /// Each centroid contributes its mean weighted by the overlap of its
    /// cumulative-weight interval with `[q1·W, q2·W]`; boundary centroids
    /// contribute fractionally.
    pub fn trimmed_mean(&self, q1: f64, q2: f64) -> DigestResult<f64> {
        if q1.is_nan() || q2.is_nan() || q1 < 0.0 || q2 > 1.0 || q1 >= q2 {
            return Err(DigestError::Domain {
                context: "trimmed_mean requires 0 <= q1 < q2 <= 1",
            });
        }
        self.require_data("trimmed_mean")?;

        let total = self.total_weight();
        let lower = q1 * total;
        let upper = q2 * total;

        let mut cum = 0.0;
        let mut trimmed_sum = 0.0;
        let mut trimmed_weight = 0.0;
        for c in self.centroids() {
            let start = cum;
            let end = cum + c.weight();
            cum = end;

            if end <= lower {
                continue;
            }
            if start >= upper {
                break;
            }

            let overlap = (end.min(upper) - start.max(lower)).max(0.0);
            trimmed_sum += overlap * c.mean();
            trimmed_weight += overlap;
        }

        if trimmed_weight <= 0.0 {
            return Err(DigestError::Empty { op: "trimmed_mean" });
        }
        Ok(trimmed_sum / trimmed_weight)
    }
}

#[inline]
fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tdigest::test_helpers::{
        assert_exact, assert_in_bracket, assert_monotone_chain, assert_rel_close, bracket,
    };
    use crate::tdigest::Budget;

    #[test]
    fn quantile_validates_its_argument() {
        let d = TDigest::from_values(&[1.0, 2.0, 3.0], Budget::default()).expect("build");
        for bad in [-0.1, 1.1, f64::NAN] {
            assert!(matches!(
                d.quantile(bad),
                Err(DigestError::Domain { .. })
            ));
        }
        assert!(matches!(
            TDigest::new().quantile(0.5),
            Err(DigestError::Empty { .. })
        ));
    }

    #[test]
    fn singletons_interpolate_between_midpoints() {
        // Ten singletons: the median interpolates halfway between the
        // midpoints of centroids 5 and 6.
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let d = TDigest::from_values(&values, Budget::Unbounded).expect("build");

        assert_eq!(d.n_centroids(), 10);
        assert_rel_close("median", 5.5, d.quantile(0.5).expect("q"), 1e-12);
        assert_exact("Q(0)", 1.0, d.quantile(0.0).expect("q0"));
        assert_exact("Q(1)", 10.0, d.quantile(1.0).expect("q1"));
    }

    #[test]
    fn compressed_uniform_hits_known_anchors() {
        // 0..=100 under budget 3 becomes (0,1), (50,99), (100,1).
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let d = TDigest::from_values(&values, Budget::Bounded(3)).expect("build");

        assert_eq!(d.n_centroids(), 3);
        assert_rel_close("median", 50.0, d.median().expect("median"), 1e-9);
        assert_exact("min", 0.0, d.min().expect("min"));
        assert_exact("max", 100.0, d.max().expect("max"));
        assert_rel_close("mean", 50.0, d.mean().expect("mean"), 1e-12);
    }

    #[test]
    fn quantile_grid_is_monotone_and_bracketed() {
        let mut values: Vec<f64> = vec![-10.0, -1.0, 0.0, 0.0, 2e-10, 1.0, 2.0, 10.0, 1e9, -1e9];
        values.sort_by(|a, b| a.total_cmp(b));
        let d = TDigest::from_values(&values, Budget::Bounded(10)).expect("build");

        assert_exact("Q(0)", values[0], d.quantile(0.0).expect("q0"));
        assert_exact("Q(1)", values[9], d.quantile(1.0).expect("q1"));

        let grid: Vec<f64> = [0.01, 0.1, 0.25, 0.5, 0.75, 0.9, 0.99]
            .iter()
            .map(|&q| d.quantile(q).expect("grid"))
            .collect();
        assert_monotone_chain("quantile grid", &grid);

        let (lo, hi, i_lo, i_hi) = bracket(&values, 0.5);
        assert_in_bracket("median", d.quantile(0.5).expect("median"), lo, hi, i_lo, i_hi);
    }

    #[test]
    fn quantiles_stay_bracketed_under_compression() {
        let values: Vec<f64> = (-30..=69).map(f64::from).collect();
        let d = TDigest::from_values(&values, Budget::Bounded(10)).expect("build");

        for &(q, label) in &[
            (0.01_f64, "Q(0.01)"),
            (0.10_f64, "Q(0.10)"),
            (0.25_f64, "Q(0.25)"),
            (0.50_f64, "Q(0.50)"),
            (0.75_f64, "Q(0.75)"),
            (0.90_f64, "Q(0.90)"),
            (0.99_f64, "Q(0.99)"),
        ] {
            let (lo, hi, i_lo, i_hi) = bracket(&values, q);
            let x = d.quantile(q).expect(label);
            assert_in_bracket(label, x, lo, hi, i_lo, i_hi);
        }
    }

    #[test]
    fn iqr_of_uniform_run() {
        let values: Vec<f64> = (2..=198).map(f64::from).collect();
        let d = TDigest::from_values(&values, Budget::default()).expect("build");
        assert_rel_close("median", 100.0, d.median().expect("median"), 1e-2);
        assert_rel_close("iqr", 98.0, d.iqr().expect("iqr"), 1e-2);
        assert_rel_close("p50", 100.0, d.percentile(50.0).expect("p"), 1e-2);
        assert!(d.percentile(101.0).is_err());
    }

    #[test]
    fn trimmed_mean_shrugs_off_outliers() {
        // 0..9 plus one huge outlier: the 10-90% trimmed mean stays at 5
        // while the plain mean explodes.
        let mut values: Vec<f64> = (0..10).map(f64::from).collect();
        values.push(100_000.0);
        let d = TDigest::from_values(&values, Budget::Unbounded).expect("build");

        assert_rel_close("trimmed", 5.0, d.trimmed_mean(0.1, 0.9).expect("tm"), 1e-12);
        assert_rel_close("mean", 9095.0, d.mean().expect("mean"), 1e-3);
    }

    #[test]
    fn trimmed_mean_validates_bounds() {
        let d = TDigest::from_values(&[1.0, 2.0, 3.0], Budget::default()).expect("build");
        for (a, b) in [(0.9, 0.1), (0.5, 0.5), (-0.1, 0.5), (0.5, 1.1)] {
            assert!(matches!(
                d.trimmed_mean(a, b),
                Err(DigestError::Domain { .. })
            ));
        }
        assert!(matches!(
            TDigest::new().trimmed_mean(0.1, 0.9),
            Err(DigestError::Empty { .. })
        ));
    }
}
