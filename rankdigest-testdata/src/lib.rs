//! rankdigest-testdata
//! Deterministic sample generators with known quantile structure, shared by
//! the rankdigest benches and accuracy tests.
//!
//! Each dataset pairs a sampler with the analytic structure needed to judge
//! a digest's estimates: distributions with a closed-form quantile function
//! expose it via [`Dataset::true_quantile`], and [`empirical_quantile`]
//! gives the order-statistic ground truth for the drawn sample itself.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, LogNormal, Pareto};

/// A source distribution for digest accuracy and throughput runs.
#[derive(Clone, Copy, Debug)]
pub enum Dataset {
    /// Uniform on `[lo, hi)`; quantiles are linear, the easiest case.
    Uniform { lo: f64, hi: f64 },
    /// Exponential with the given rate; a long right tail.
    Exponential { rate: f64 },
    /// Pareto with the given scale and shape; an extreme right tail that
    /// stresses the tail-tight side of the scale function.
    Pareto { scale: f64, shape: f64 },
    /// Log-normal service times (exp of N(mu, sigma²)), the typical
    /// latency-tracking workload. No closed-form quantile here; compare
    /// against [`empirical_quantile`] of the sample.
    ServiceTimes { mu: f64, sigma: f64 },
    /// Integers drawn from `0..levels`, heavily duplicated; exercises
    /// exact-tie coalescing and step behavior.
    Ticks { levels: u32 },
}

impl Dataset {
    /// Draw `n` samples. The same seed always yields the same sample.
    pub fn sample(self, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut out = Vec::with_capacity(n);

        match self {
            Dataset::Uniform { lo, hi } => {
                for _ in 0..n {
                    out.push(lo + (hi - lo) * rng.random::<f64>());
                }
            }
            Dataset::Exponential { rate } => {
                let exp = Exp::new(rate).expect("rate must be > 0");
                for _ in 0..n {
                    out.push(exp.sample(&mut rng));
                }
            }
            Dataset::Pareto { scale, shape } => {
                let pareto = Pareto::new(scale, shape).expect("scale and shape must be > 0");
                for _ in 0..n {
                    out.push(pareto.sample(&mut rng));
                }
            }
            Dataset::ServiceTimes { mu, sigma } => {
                let lognormal = LogNormal::new(mu, sigma).expect("sigma must be finite");
                for _ in 0..n {
                    out.push(lognormal.sample(&mut rng));
                }
            }
            Dataset::Ticks { levels } => {
                for _ in 0..n {
                    out.push(f64::from(rng.random_range(0..levels)));
                }
            }
        }
        out
    }

    /// The distribution's quantile function, where it has a closed form.
    pub fn true_quantile(self, q: f64) -> Option<f64> {
        if !(0.0..=1.0).contains(&q) {
            return None;
        }
        match self {
            Dataset::Uniform { lo, hi } => Some(lo + (hi - lo) * q),
            Dataset::Exponential { rate } => Some(-(1.0 - q).ln() / rate),
            Dataset::Pareto { scale, shape } => Some(scale / (1.0 - q).powf(1.0 / shape)),
            Dataset::ServiceTimes { .. } | Dataset::Ticks { .. } => None,
        }
    }
}

/// Order-statistic quantile of a sorted sample (type-7 interpolation at
/// rank `q·(n−1)`), the per-sample ground truth for accuracy checks.
pub fn empirical_quantile(sorted: &[f64], q: f64) -> f64 {
    assert!(!sorted.is_empty(), "empirical_quantile requires samples");
    let q = q.clamp(0.0, 1.0);
    let r = q * (sorted.len() - 1) as f64;
    let lo = r.floor() as usize;
    let hi = r.ceil() as usize;
    let frac = r - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_is_deterministic_per_seed() {
        let ds = Dataset::Exponential { rate: 1.0 };
        assert_eq!(ds.sample(1000, 7), ds.sample(1000, 7));
        assert_ne!(ds.sample(1000, 7), ds.sample(1000, 8));
    }

    #[test]
    fn samples_match_closed_form_quantiles() {
        for ds in [
            Dataset::Uniform { lo: -2.0, hi: 5.0 },
            Dataset::Exponential { rate: 0.5 },
            Dataset::Pareto { scale: 1.0, shape: 3.0 },
        ] {
            let mut xs = ds.sample(100_000, 42);
            xs.sort_by(|a, b| a.total_cmp(b));
            for q in [0.1, 0.5, 0.9] {
                let truth = ds.true_quantile(q).expect("closed form");
                let got = empirical_quantile(&xs, q);
                let rel = (got - truth).abs() / truth.abs().max(1e-12);
                assert!(rel < 0.05, "{ds:?} q={q}: {got} vs {truth}");
            }
        }
    }

    #[test]
    fn service_times_are_positive_and_ticks_duplicate() {
        let lat = Dataset::ServiceTimes { mu: 3.0, sigma: 0.7 }.sample(10_000, 5);
        assert!(lat.iter().all(|&x| x > 0.0));

        let ticks = Dataset::Ticks { levels: 8 }.sample(10_000, 3);
        assert!(ticks.iter().all(|&x| (0.0..8.0).contains(&x) && x.fract() == 0.0));
    }
}
