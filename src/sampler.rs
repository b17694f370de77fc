// Cluster sampler.
//
// Picks one eligible topic cluster uniformly at random, draws a fixed number
// of its records without replacement, and highlights the keywords all drawn
// records share. Randomness comes from the caller so results are repeatable
// under a fixed seed.

use rand::seq::{index, IndexedRandom};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::dataset::{ClusterSize, Dataset, Record, TopicId};
use crate::errors::SampleError;
use crate::keywords::{common_keywords, Highlighter, KeywordExtractor, KeywordSet, Marker};

pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 5;
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// Knobs for [`sample_cluster`].
#[derive(Debug, Clone)]
pub struct SampleParams {
    /// Clusters smaller than this are never chosen
    pub min_cluster_size: usize,
    /// Records drawn from the chosen cluster
    pub sample_size: usize,
    pub extractor: KeywordExtractor,
    pub marker: Marker,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            sample_size: DEFAULT_SAMPLE_SIZE,
            extractor: KeywordExtractor::default(),
            marker: Marker::default(),
        }
    }
}

impl SampleParams {
    /// Reject parameter combinations that could not always produce a full
    /// sample.
    pub fn validate(&self) -> Result<(), SampleError> {
        if self.sample_size == 0 {
            return Err(SampleError::InvalidParams(
                "sample size must be at least 1".to_string(),
            ));
        }
        if self.sample_size > self.min_cluster_size {
            return Err(SampleError::InvalidParams(format!(
                "sample size {} exceeds minimum cluster size {}",
                self.sample_size, self.min_cluster_size
            )));
        }
        Ok(())
    }
}

/// A drawn record and its highlighted text.
#[derive(Debug, Clone, Serialize)]
pub struct SampledRecord {
    #[serde(flatten)]
    pub record: Record,
    pub highlighted: String,
}

/// Result of one sampling round.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSample {
    pub topic: TopicId,
    /// Size of the chosen cluster before the draw
    pub cluster_size: usize,
    /// Keywords shared by every sampled record, sorted
    pub common_keywords: Vec<String>,
    /// Sampled records in draw order
    pub records: Vec<SampledRecord>,
}

/// Clusters with at least `min_cluster_size` records, in first-appearance
/// order.
pub fn eligible_clusters(dataset: &Dataset, min_cluster_size: usize) -> Vec<ClusterSize> {
    dataset
        .clusters()
        .into_iter()
        .filter(|c| c.size >= min_cluster_size)
        .collect()
}

/// Draw a random sample from a random eligible cluster.
///
/// Fails with [`SampleError::NoEligibleCluster`] when no cluster has at least
/// `params.min_cluster_size` records.
pub fn sample_cluster<R>(
    dataset: &Dataset,
    params: &SampleParams,
    rng: &mut R,
) -> Result<ClusterSample, SampleError>
where
    R: Rng + ?Sized,
{
    params.validate()?;

    let clusters = dataset.clusters();
    let largest = clusters.iter().map(|c| c.size).max().unwrap_or(0);
    let eligible: Vec<&ClusterSize> = clusters
        .iter()
        .filter(|c| c.size >= params.min_cluster_size)
        .collect();

    let chosen = *eligible.choose(rng).ok_or(SampleError::NoEligibleCluster {
        min_cluster_size: params.min_cluster_size,
        largest,
    })?;

    let members = dataset.members(&chosen.topic);
    let drawn: Vec<&Record> = index::sample(rng, members.len(), params.sample_size)
        .into_iter()
        .map(|i| members[i])
        .collect();

    let keyword_sets: Vec<KeywordSet> = drawn
        .iter()
        .map(|r| params.extractor.extract(r.combined_text()))
        .collect();
    let common = common_keywords(&keyword_sets);

    let highlighter = Highlighter::new(&common, params.marker.clone())?;
    let records = drawn
        .into_iter()
        .map(|record| SampledRecord {
            highlighted: highlighter.highlight(record.combined_text()),
            record: record.clone(),
        })
        .collect();

    debug!(
        topic = %chosen.topic,
        cluster_size = chosen.size,
        eligible = eligible.len(),
        common_keywords = common.len(),
        "Sampled cluster"
    );

    Ok(ClusterSample {
        topic: chosen.topic.clone(),
        cluster_size: chosen.size,
        common_keywords: common.into_iter().collect(),
        records,
    })
}
