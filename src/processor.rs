//! Per-partition sample computation.
//!
//! A region processor consumes one partition descriptor and produces a
//! partial result covering the descriptor's clamped extent. Processors
//! hold only read-only state (the sampler and the job's domain
//! constants), so repeated `process` calls with the same descriptor are
//! bit-identical — the hosting runtime may redeliver a task and the
//! aggregator must not be able to tell.

use crate::config::Config;
use crate::partition::PartitionDescriptor;
use crate::sampler::{Color, Sampler};
use anyhow::Result;
use std::sync::Arc;

/// One computed sample, keyed by its domain coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSample {
    pub x: u32,
    pub y: u32,
    pub color: Color,
}

/// The set of samples for one partition, prior to merging.
///
/// Ownership transfers to the aggregator; it is read once and dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartialResult {
    /// Flat sequence of coordinate/sample records covering the
    /// partition's clamped extent.
    pub samples: Vec<PixelSample>,
}

impl PartialResult {
    /// Number of sample records.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the result carries no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Stateless-per-task processor for partition descriptors.
pub struct RegionProcessor {
    /// Injected sampling function; read-only after construction
    sampler: Arc<dyn Sampler>,

    /// Domain constants this processor was configured for. Descriptors
    /// that disagree indicate a partitioner/processor mismatch and are
    /// rejected.
    domain_width: u32,
    domain_height: u32,
    tile_width: u32,
    tile_height: u32,
}

impl RegionProcessor {
    /// Create a processor over an already-constructed sampler.
    pub fn new(sampler: Arc<dyn Sampler>, config: &Config) -> Self {
        Self {
            sampler,
            domain_width: config.domain.width,
            domain_height: config.domain.height,
            tile_width: config.tiling.width,
            tile_height: config.tiling.height,
        }
    }

    /// Compute every sample in the descriptor's clamped extent.
    ///
    /// Coordinates outside the domain are never sampled: the extent is
    /// clamped to the domain bound, and a descriptor whose origin or
    /// constants are inconsistent with this processor's configuration
    /// is rejected outright rather than clamped into shape.
    pub fn process(&self, descriptor: &PartitionDescriptor) -> Result<PartialResult> {
        self.check_descriptor(descriptor)?;

        let extent = descriptor.extent();
        let mut samples = Vec::with_capacity(extent.pixel_count() as usize);

        for y in extent.y_start..extent.y_end {
            for x in extent.x_start..extent.x_end {
                samples.push(PixelSample {
                    x,
                    y,
                    color: self.sampler.sample(x, y),
                });
            }
        }

        tracing::debug!(
            "Processed partition ({}, {}): {} samples",
            descriptor.x,
            descriptor.y,
            samples.len()
        );

        Ok(PartialResult { samples })
    }

    fn check_descriptor(&self, descriptor: &PartitionDescriptor) -> Result<()> {
        if descriptor.domain_width != self.domain_width
            || descriptor.domain_height != self.domain_height
            || descriptor.tile_width != self.tile_width
            || descriptor.tile_height != self.tile_height
        {
            anyhow::bail!(
                "Descriptor constants {}x{} tiles {}x{} disagree with processor \
                 configuration {}x{} tiles {}x{}",
                descriptor.domain_width,
                descriptor.domain_height,
                descriptor.tile_width,
                descriptor.tile_height,
                self.domain_width,
                self.domain_height,
                self.tile_width,
                self.tile_height,
            );
        }
        if !descriptor.origin_in_bounds() {
            anyhow::bail!(
                "Partition origin ({}, {}) outside domain {}x{}",
                descriptor.x,
                descriptor.y,
                self.domain_width,
                self.domain_height
            );
        }
        Ok(())
    }
}
