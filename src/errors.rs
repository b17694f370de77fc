use thiserror::Error;

/// Errors returned by the cluster sampler.
#[derive(Debug, Error)]
pub enum SampleError {
    /// No cluster has enough records. `largest` is the size of the biggest
    /// cluster, or 0 for an empty dataset.
    #[error("no eligible cluster: none has at least {min_cluster_size} records (largest has {largest})")]
    NoEligibleCluster {
        min_cluster_size: usize,
        largest: usize,
    },
    #[error("invalid sampling parameters: {0}")]
    InvalidParams(String),
    #[error("failed to build keyword pattern: {0}")]
    Pattern(#[from] regex::Error),
}
