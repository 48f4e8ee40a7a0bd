//! Folding partial results into the final image.
//!
//! The aggregator owns the only full-domain pixel grid in the job. It
//! accepts partial results in any order and applies overwrite-by-
//! coordinate semantics, with a coverage mask enforcing the invariant
//! that makes overwrite order-independent: no coordinate may be
//! delivered twice. A doubly-covered coordinate means the partitioner
//! and a processor disagree on tiling, so the commit is rejected as a
//! protocol violation instead of silently double-counting.
//!
//! All `commit` calls for one job must be serialized by the host; the
//! aggregator itself performs no locking.

use crate::config::Config;
use crate::processor::PartialResult;
use crate::sampler::Color;
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::PathBuf;

/// A commit that violated the aggregation protocol. The offending
/// result is rejected as a unit; the accumulated image is unchanged.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    #[error("sample at ({x}, {y}) outside domain {width}x{height}")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },

    #[error("coordinate ({x}, {y}) covered by more than one result")]
    DoubleCoverage { x: u32, y: u32 },
}

/// Accumulates partial results into one full-domain image and emits
/// the final artifact.
pub struct Aggregator {
    width: u32,
    height: u32,

    /// Row-major sample grid, initialized to black
    pixels: Vec<Color>,

    /// Which coordinates have been written, for overlap detection
    covered: Vec<bool>,

    covered_count: u64,
    results_committed: u64,
    output_path: PathBuf,
}

impl Aggregator {
    /// Create an aggregator for the configured domain and output path.
    pub fn new(config: &Config) -> Self {
        Self::with_dimensions(
            config.domain.width,
            config.domain.height,
            config.output.path.clone(),
        )
    }

    /// Create an aggregator from raw dimensions.
    pub fn with_dimensions(width: u32, height: u32, output_path: PathBuf) -> Self {
        let cells = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; cells],
            covered: vec![false; cells],
            covered_count: 0,
            results_committed: 0,
            output_path,
        }
    }

    /// Fold one partial result into the accumulated image.
    ///
    /// Validates the whole result before writing anything, so a
    /// rejected result leaves the image untouched.
    pub fn commit(&mut self, result: &PartialResult) -> Result<(), CommitError> {
        // Validation pass: bounds, cross-result overlap, and duplicate
        // coordinates within this result itself.
        let mut seen = std::collections::HashSet::with_capacity(result.len());
        for sample in &result.samples {
            if sample.x >= self.width || sample.y >= self.height {
                return Err(CommitError::OutOfBounds {
                    x: sample.x,
                    y: sample.y,
                    width: self.width,
                    height: self.height,
                });
            }
            let index = self.cell_index(sample.x, sample.y);
            if self.covered[index] || !seen.insert(index) {
                return Err(CommitError::DoubleCoverage {
                    x: sample.x,
                    y: sample.y,
                });
            }
        }

        // Write pass: overwrite semantics, each cell exactly once.
        for sample in &result.samples {
            let index = self.cell_index(sample.x, sample.y);
            self.pixels[index] = sample.color;
            self.covered[index] = true;
        }

        self.covered_count += result.len() as u64;
        self.results_committed += 1;

        tracing::debug!(
            "Committed result with {} samples ({} pixels covered)",
            result.len(),
            self.covered_count
        );

        Ok(())
    }

    /// Number of partial results committed so far.
    pub fn results_committed(&self) -> u64 {
        self.results_committed
    }

    /// Number of domain coordinates written so far.
    pub fn covered_pixels(&self) -> u64 {
        self.covered_count
    }

    /// Whether every domain coordinate has been covered.
    ///
    /// The aggregator is never told how many results to expect; the
    /// hosting runtime decides when to finalize. This is a hint for
    /// hosts that do know, such as the bundled local driver.
    pub fn is_complete(&self) -> bool {
        self.covered_count == self.width as u64 * self.height as u64
    }

    /// Convert the accumulated samples to an 8-bit RGB image.
    pub fn into_image(self) -> RgbImage {
        let mut image = RgbImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let color = self.pixels[(y as usize * self.width as usize) + x as usize];
                image.put_pixel(x, y, image::Rgb(color.to_rgb8()));
            }
        }
        image
    }

    /// One-time post-processing: encode the image and write it to the
    /// configured output path. Consumes the aggregator, so it cannot
    /// run twice for one job.
    pub fn finalize(self) -> Result<PathBuf> {
        if !self.is_complete() {
            tracing::warn!(
                "Finalizing with {} of {} pixels covered",
                self.covered_count,
                self.width as u64 * self.height as u64
            );
        }

        let path = self.output_path.clone();
        let image = self.into_image();
        image
            .save(&path)
            .with_context(|| format!("Failed to write artifact {}", path.display()))?;

        tracing::info!("Artifact written to {}", path.display());
        Ok(path)
    }

    fn cell_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
