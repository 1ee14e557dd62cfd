//! Approximate rank/quantile statistics over unbounded streams.
//!
//! The crate maintains a compact [t-digest](https://arxiv.org/abs/1902.04023)
//! summary that supports online ingestion, lossless merging of independently
//! built summaries, and estimation of quantiles, cumulative probabilities,
//! and trimmed means. Memory is bounded by a configurable centroid budget;
//! accuracy is biased toward the distribution tails.
//!
//! ```
//! use rankdigest::{Budget, TDigest};
//!
//! let mut d = TDigest::from_values(&(0..=100).map(f64::from).collect::<Vec<_>>(),
//!                                  Budget::Bounded(100)).unwrap();
//! d.update(250.0).unwrap();
//! assert_eq!(d.min().unwrap(), 0.0);
//! assert_eq!(d.max().unwrap(), 250.0);
//! let p99 = d.quantile(0.99).unwrap();
//! assert!(p99 >= d.quantile(0.5).unwrap());
//! ```

pub mod error;
pub mod tdigest;

pub use error::{DigestError, DigestResult};
pub use tdigest::codecs::DigestDict;
pub use tdigest::{merge_all, Budget, Centroid, ScaleFamily, TDigest, TDigestBuilder};
