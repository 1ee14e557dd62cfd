//! Ordered centroid-stream producers feeding the compressor.
//!
//! - [`MergeByMean`]: merges the digest's centroids with a sorted slice of
//!   raw values into a single stream ordered by mean.
//! - [`KWayCentroidMerge`]: combines multiple centroid runs (one per source
//!   digest) into one ordered stream.
//!
//! Producers never fuse equal means; coalescing is owned by the normalize
//! stage of the compressor.

use crate::tdigest::centroids::Centroid;

pub(crate) struct MergeByMean {
    data: Vec<Centroid>,
}

impl MergeByMean {
    /// Merge two sorted sources by mean:
    /// - `centroids`: already sorted by mean (digest invariant)
    /// - `values_sorted`: raw scalar values sorted ascending, each a singleton
    pub fn from_centroids_and_values(centroids: &[Centroid], values_sorted: &[f64]) -> Self {
        // Fast paths
        if values_sorted.is_empty() {
            return Self {
                data: centroids.to_vec(),
            };
        }
        if centroids.is_empty() {
            return Self {
                data: values_sorted.iter().map(|&v| Centroid::singleton(v)).collect(),
            };
        }

        // General case: two-way merge.
        let mut out: Vec<Centroid> = Vec::with_capacity(centroids.len() + values_sorted.len());
        let mut i = 0usize;
        let mut j = 0usize;

        while i < centroids.len() && j < values_sorted.len() {
            if centroids[i].mean() <= values_sorted[j] {
                out.push(centroids[i]);
                i += 1;
            } else {
                out.push(Centroid::singleton(values_sorted[j]));
                j += 1;
            }
        }
        out.extend_from_slice(&centroids[i..]);
        out.extend(values_sorted[j..].iter().map(|&v| Centroid::singleton(v)));

        Self { data: out }
    }
}

impl IntoIterator for MergeByMean {
    type Item = Centroid;
    type IntoIter = std::vec::IntoIter<Centroid>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

pub(crate) struct KWayCentroidMerge {
    data: Vec<Centroid>,
}

impl KWayCentroidMerge {
    /// Build a single sorted stream by concatenating + sorting the runs.
    /// Run counts are tiny in practice; a heap buys nothing here.
    pub fn from_runs(runs: &[&[Centroid]]) -> Self {
        let mut all: Vec<Centroid> = Vec::with_capacity(runs.iter().map(|r| r.len()).sum());
        for r in runs {
            all.extend_from_slice(r);
        }
        all.sort_by(|a, b| a.mean().total_cmp(&b.mean()));
        Self { data: all }
    }
}

impl IntoIterator for KWayCentroidMerge {
    type Item = Centroid;
    type IntoIter = std::vec::IntoIter<Centroid>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}
