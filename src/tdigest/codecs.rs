//! Dict/JSON interchange codec.
//!
//! The compatibility contract is a small document:
//!
//! ```json
//! {
//!   "max_centroids": 100,          // or null for unbounded; optional on input
//!   "centroids": [ { "m": 1.5, "c": 2.0 }, ... ]
//! }
//! ```
//!
//! The input centroid list need not be sorted; reconstruction sorts it and
//! validates weights. Aggregates are rebuilt from the lossy representation
//! (min/max of means, Σm·c, Σc), so `mean()` on a reconstructed digest is an
//! estimate unless all centroids are singletons.

use serde::{Deserialize, Serialize};

use crate::error::{DigestError, DigestResult};
use crate::tdigest::budget::Budget;
use crate::tdigest::centroids::Centroid;
use crate::tdigest::scale::ScaleFamily;
use crate::tdigest::TDigest;

/// Interchange form of a digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestDict {
    /// `None` means unbounded. Missing on input means unbounded too.
    #[serde(default)]
    pub max_centroids: Option<u32>,
    pub centroids: Vec<Centroid>,
}

impl TDigest {
    /// Export the digest as its interchange form.
    pub fn to_dict(&self) -> DigestDict {
        DigestDict {
            max_centroids: self.max_centroids().to_option(),
            centroids: self.centroids().to_vec(),
        }
    }

    /// Reconstruct a digest from its interchange form.
    ///
    /// The centroid list is sorted and validated (weights finite and > 0,
    /// means not NaN). Aggregates are the best possible reconstruction from
    /// the lossy representation: `min`/`max` from the extremal means, the
    /// sum as Σm·c, the total weight as Σc — so `mean()` becomes an estimate
    /// unless every centroid is a singleton. If the list exceeds the decoded
    /// budget, one compression pass restores the budget invariant.
    pub fn from_dict(dict: DigestDict) -> DigestResult<TDigest> {
        if dict.max_centroids == Some(0) {
            return Err(DigestError::Malformed {
                context: "max_centroids must be positive",
            });
        }
        let budget = Budget::from_option(dict.max_centroids);

        let mut centroids = dict.centroids;
        for c in &centroids {
            if c.mean().is_nan() {
                return Err(DigestError::Malformed {
                    context: "centroid mean is NaN",
                });
            }
            if !c.weight().is_finite() || c.weight() <= 0.0 {
                return Err(DigestError::Malformed {
                    context: "centroid weight must be finite and > 0",
                });
            }
        }
        centroids.sort_by(|a, b| a.mean().total_cmp(&b.mean()));

        if centroids.is_empty() {
            return Ok(TDigest::with_budget(budget));
        }

        let min = centroids[0].mean();
        let max = centroids[centroids.len() - 1].mean();
        let mut sum = 0.0;
        let mut count = 0.0;
        for c in &centroids {
            sum += c.mean() * c.weight();
            count += c.weight();
        }

        Ok(TDigest::from_parts(
            centroids,
            budget,
            ScaleFamily::default(),
            sum,
            count,
            min,
            max,
        ))
    }

    /// Render the interchange form as a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.to_dict()).expect("digest dict serialization cannot fail")
    }

    /// Parse a digest from its JSON interchange form.
    ///
    /// Structurally wrong documents (not an object, missing `centroids`,
    /// wrong field types) report a type mismatch; syntactically broken JSON
    /// and illegal values report malformed input.
    pub fn from_json(json: &str) -> DigestResult<TDigest> {
        let dict: DigestDict = serde_json::from_str(json).map_err(|e| {
            if e.is_data() {
                DigestError::TypeMismatch {
                    context: "expected {\"max_centroids\": int|null, \"centroids\": [{\"m\", \"c\"}]}",
                }
            } else {
                DigestError::Malformed {
                    context: "invalid JSON document",
                }
            }
        })?;
        TDigest::from_dict(dict)
    }
}
