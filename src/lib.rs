//! Tile Render Pipeline
//!
//! Partitions a 2-D render domain into rectangular tiles, dispatches
//! each tile to a stateless worker, and folds the partial results into
//! one final image.
//!
//! # Architecture
//!
//! - **Partition**: deterministic row-major tile enumeration
//! - **Processor**: per-tile sampling through an injected [`Sampler`]
//! - **Aggregate**: order-independent merge with overlap rejection
//! - **Codec**: versioned binary payloads for cross-process transport
//! - **Runtime**: task-source / worker / committer adapters for a
//!   hosting runtime that moves opaque payloads between processes
//!
//! The ray tracer itself is an external collaborator behind the
//! [`Sampler`] trait; a small scene-file sampler ships for tests and
//! the demo CLI.
//!
//! # Usage
//!
//! ```no_run
//! use render_tiles::{run_job, Config};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_file("config.yaml".as_ref())?;
//!     run_job(config)?;
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod codec;
pub mod config;
pub mod partition;
pub mod processor;
pub mod runtime;
pub mod sampler;

pub use aggregate::{Aggregator, CommitError};
pub use codec::CodecError;
pub use config::Config;
pub use partition::{PartitionCursor, PartitionDescriptor, Partitioner, TileExtent};
pub use processor::{PartialResult, PixelSample, RegionProcessor};
pub use runtime::{Committer, TaskSource, TileWorker};
pub use sampler::{Color, Sampler, SceneSampler};

use anyhow::Result;
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Statistics from a completed render job.
#[derive(Debug)]
pub struct JobStats {
    /// Number of tiles processed
    pub tiles: u64,

    /// Number of pixels committed
    pub pixels: u64,

    /// Where the artifact was written
    pub artifact: PathBuf,

    /// Wall-clock duration of the job
    pub elapsed: Duration,
}

impl std::fmt::Display for JobStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tiles: {}, Pixels: {}, Artifact: {}, Elapsed: {:.2}s",
            self.tiles,
            self.pixels,
            self.artifact.display(),
            self.elapsed.as_secs_f64()
        )
    }
}

/// Run a full render job in-process.
///
/// This is a host of the pipeline, not part of its core: it plays the
/// role a distributed runtime would, driving the same payload-level
/// endpoints. Region processing runs in parallel on the rayon pool;
/// commits are serialized, which is the mutual exclusion the
/// aggregator's contract requires.
pub fn run_job(config: Config) -> Result<JobStats> {
    config.validate()?;
    let start = Instant::now();

    tracing::info!(
        "Starting render job: domain {}x{}, tiles {}x{}",
        config.domain.width,
        config.domain.height,
        config.tiling.width,
        config.tiling.height
    );

    let mut source = TaskSource::new(&config);
    let worker = TileWorker::from_config(&config)?;
    let mut committer = Committer::new(&config);

    let total = source.total_tasks();
    let mut tasks = Vec::with_capacity(total as usize);
    while let Some(task) = source.next_task() {
        tasks.push(task);
    }

    tracing::info!("Partitioning complete: {} tiles", tasks.len());

    let results: Vec<Result<Vec<u8>>> = tasks
        .par_iter()
        .map(|task| worker.run_task(task))
        .collect();

    for result in results {
        let payload = result?;
        committer.commit_payload(&payload)?;
    }
    let tiles = committer.results_committed();
    let pixels = committer.covered_pixels();

    let artifact = committer.finish()?;
    let stats = JobStats {
        tiles,
        pixels,
        artifact,
        elapsed: start.elapsed(),
    };

    tracing::info!("Render job complete: {}", stats);
    Ok(stats)
}

/// Initialize the rayon thread pool.
pub fn init_rayon(threads: Option<usize>) -> Result<()> {
    if let Some(threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }
    Ok(())
}
