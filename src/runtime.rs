//! Adapters between the pipeline core and a hosting runtime.
//!
//! A distributed runtime sees three roles and moves only opaque byte
//! strings between them: a task source that emits encoded partition
//! descriptors, workers that turn a descriptor payload into a result
//! payload, and a committer that folds result payloads and finally
//! writes the artifact. Each adapter wraps one core component plus the
//! wire codec; the runtime owns lifecycles, transport, and the decision
//! of when to call [`Committer::finish`].

use crate::aggregate::Aggregator;
use crate::codec;
use crate::config::Config;
use crate::partition::Partitioner;
use crate::processor::RegionProcessor;
use crate::sampler::{Sampler, SceneSampler};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Runtime-facing wrapper around the partitioner: emits each partition
/// as an encoded payload, then signals exhaustion with `None`.
pub struct TaskSource {
    partitioner: Partitioner,
    tasks_emitted: u64,
}

impl TaskSource {
    /// Build a task source for the configured job.
    pub fn new(config: &Config) -> Self {
        Self {
            partitioner: Partitioner::new(config),
            tasks_emitted: 0,
        }
    }

    /// Produce the next task payload, or `None` once the domain is
    /// fully tiled.
    pub fn next_task(&mut self) -> Option<Vec<u8>> {
        let descriptor = self.partitioner.next_partition()?;
        self.tasks_emitted += 1;
        Some(codec::encode_descriptor(&descriptor))
    }

    /// Total number of tasks this source will emit over its lifetime.
    pub fn total_tasks(&self) -> u64 {
        self.partitioner.num_partitions()
    }

    /// Number of tasks emitted so far.
    pub fn tasks_emitted(&self) -> u64 {
        self.tasks_emitted
    }
}

/// Runtime-facing wrapper around a region processor: decodes a task
/// payload, processes it, and encodes the result payload.
pub struct TileWorker {
    processor: RegionProcessor,
}

impl TileWorker {
    /// Build a worker from configuration, loading the scene once.
    ///
    /// Scene load failure is fatal: the worker process cannot produce
    /// any valid result without its setup input.
    pub fn from_config(config: &Config) -> Result<Self> {
        let sampler = Arc::new(SceneSampler::load(
            &config.scene.path,
            config.domain.height,
            config.sampling,
        )?);
        Ok(Self::with_sampler(sampler, config))
    }

    /// Build a worker over an already-constructed sampler.
    pub fn with_sampler(sampler: Arc<dyn Sampler>, config: &Config) -> Self {
        Self {
            processor: RegionProcessor::new(sampler, config),
        }
    }

    /// Execute one task payload and return the result payload.
    pub fn run_task(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let descriptor =
            codec::decode_descriptor(payload).context("Malformed task payload")?;
        let result = self.processor.process(&descriptor)?;
        Ok(codec::encode_result(&result))
    }
}

/// Runtime-facing wrapper around the aggregator: decodes result
/// payloads, commits them, and writes the artifact on `finish`.
pub struct Committer {
    aggregator: Aggregator,
}

impl Committer {
    /// Build a committer for the configured job.
    pub fn new(config: &Config) -> Self {
        Self {
            aggregator: Aggregator::new(config),
        }
    }

    /// Fold one result payload into the accumulated image.
    pub fn commit_payload(&mut self, payload: &[u8]) -> Result<()> {
        let result = codec::decode_result(payload).context("Malformed result payload")?;
        self.aggregator.commit(&result)?;
        Ok(())
    }

    /// Number of results committed so far.
    pub fn results_committed(&self) -> u64 {
        self.aggregator.results_committed()
    }

    /// Number of domain coordinates written so far.
    pub fn covered_pixels(&self) -> u64 {
        self.aggregator.covered_pixels()
    }

    /// Whether every domain coordinate has been covered.
    pub fn is_complete(&self) -> bool {
        self.aggregator.is_complete()
    }

    /// Terminal signal from the runtime: finalize and write the
    /// artifact. Consumes the committer.
    pub fn finish(self) -> Result<PathBuf> {
        self.aggregator.finalize()
    }
}
