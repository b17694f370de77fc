// Explorer session — the caller-side state around the sampler.
//
// The sampler itself is stateless. A session holds the shared dataset, the
// RNG and the sample currently on screen; reading the current sample never
// resamples, only `refresh` does.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::dataset::Dataset;
use crate::errors::SampleError;
use crate::sampler::{sample_cluster, ClusterSample, SampleParams};

pub struct ExplorerSession<R = StdRng> {
    dataset: Arc<Dataset>,
    params: SampleParams,
    rng: R,
    current: ClusterSample,
    /// Samples drawn so far, including the initial one
    rounds: u64,
}

impl ExplorerSession<StdRng> {
    /// Session with a fixed seed; the sequence of samples is repeatable.
    pub fn seeded(
        dataset: Arc<Dataset>,
        params: SampleParams,
        seed: u64,
    ) -> Result<Self, SampleError> {
        Self::with_rng(dataset, params, StdRng::seed_from_u64(seed))
    }

    /// Session seeded from the operating system.
    pub fn from_os_rng(dataset: Arc<Dataset>, params: SampleParams) -> Result<Self, SampleError> {
        Self::with_rng(dataset, params, StdRng::from_os_rng())
    }
}

impl<R: Rng> ExplorerSession<R> {
    /// Build a session and draw its first sample.
    pub fn with_rng(
        dataset: Arc<Dataset>,
        params: SampleParams,
        mut rng: R,
    ) -> Result<Self, SampleError> {
        let current = sample_cluster(&dataset, &params, &mut rng)?;
        info!(
            topic = %current.topic,
            records = dataset.len(),
            "Explorer session started"
        );
        Ok(Self {
            dataset,
            params,
            rng,
            current,
            rounds: 1,
        })
    }

    /// The sample currently shown.
    pub fn current(&self) -> &ClusterSample {
        &self.current
    }

    /// Draw a new sample and make it current.
    ///
    /// On error the previous sample stays current.
    pub fn refresh(&mut self) -> Result<&ClusterSample, SampleError> {
        let next = sample_cluster(&self.dataset, &self.params, &mut self.rng)?;
        self.current = next;
        self.rounds += 1;
        info!(topic = %self.current.topic, round = self.rounds, "Refreshed sample");
        Ok(&self.current)
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn params(&self) -> &SampleParams {
        &self.params
    }
}
