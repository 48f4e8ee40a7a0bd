//! Per-coordinate sampling: the seam where a real renderer plugs in.
//!
//! The pipeline treats sampling as an opaque function of (x, y) and the
//! sampler's own configuration. The bundled [`SceneSampler`] is a small
//! flat-shaded renderer over a declarative scene file; it exists so the
//! pipeline can run end to end without an external engine, and so tests
//! have a deterministic sampling function.

use crate::config::SamplingConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Linear RGB color with f32 channels, nominally in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Convert to an 8-bit RGB pixel, clamping each channel.
    pub fn to_rgb8(self) -> [u8; 3] {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }
}

impl From<[f32; 3]> for Color {
    fn from(c: [f32; 3]) -> Self {
        Color::new(c[0], c[1], c[2])
    }
}

/// External per-coordinate computation.
///
/// Implementations must be deterministic in (x, y) and construction
/// state: the processor relies on this for idempotent task execution.
/// Any stateful resource (scene data, acceleration structures) is built
/// once at construction and read-only afterwards.
pub trait Sampler: Send + Sync {
    /// Compute the sample for one domain coordinate.
    fn sample(&self, x: u32, y: u32) -> Color;
}

/// Declarative scene description consumed by [`SceneSampler`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Vertical background gradient
    #[serde(default)]
    pub background: BackgroundGradient,

    /// Flat-shaded circles, painted in order (later entries on top)
    #[serde(default)]
    pub circles: Vec<Circle>,
}

/// Vertical gradient from `top` at y = 0 to `bottom` at the domain floor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BackgroundGradient {
    pub top: [f32; 3],
    pub bottom: [f32; 3],
}

impl Default for BackgroundGradient {
    fn default() -> Self {
        Self {
            top: [0.2, 0.3, 0.6],
            bottom: [0.9, 0.9, 1.0],
        }
    }
}

/// A flat-shaded circle in pixel coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Circle {
    pub center: [f32; 2],
    pub radius: f32,
    pub color: [f32; 3],
}

impl Circle {
    fn contains(&self, px: f32, py: f32) -> bool {
        let dx = px - self.center[0];
        let dy = py - self.center[1];
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Reference sampler: shades a [`SceneDescription`] with optional
/// supersampling and background banding.
///
/// Quality parameters (see [`SamplingConfig`]): `quality_primary` is
/// the supersample count per pixel axis (0 and 1 both mean one centered
/// sample), `quality_secondary` posterizes the background into that
/// many bands (0 means smooth).
pub struct SceneSampler {
    scene: SceneDescription,
    domain_height: u32,
    samples_per_axis: u32,
    background_bands: u32,
}

impl SceneSampler {
    /// Load a scene file and build the sampler.
    ///
    /// An unreadable or unparsable scene is a fatal initialization
    /// error: the owning worker cannot produce any valid result.
    pub fn load(path: &Path, domain_height: u32, sampling: SamplingConfig) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file {}", path.display()))?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let scene: SceneDescription = match ext {
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Malformed JSON scene {}", path.display()))?,
            _ => serde_yaml::from_str(&contents)
                .with_context(|| format!("Malformed YAML scene {}", path.display()))?,
        };

        tracing::info!(
            "Loaded scene {} ({} circles)",
            path.display(),
            scene.circles.len()
        );

        Ok(Self::from_scene(scene, domain_height, sampling))
    }

    /// Build a sampler from an in-memory scene description.
    pub fn from_scene(
        scene: SceneDescription,
        domain_height: u32,
        sampling: SamplingConfig,
    ) -> Self {
        Self {
            scene,
            domain_height: domain_height.max(1),
            samples_per_axis: sampling.quality_primary.max(1),
            background_bands: sampling.quality_secondary,
        }
    }

    fn background_at(&self, y: f32) -> Color {
        let mut t = (y / self.domain_height as f32).clamp(0.0, 1.0);
        if self.background_bands > 0 {
            let bands = self.background_bands as f32;
            t = (t * bands).floor() / bands;
        }
        let bg = &self.scene.background;
        Color::new(
            bg.top[0] + (bg.bottom[0] - bg.top[0]) * t,
            bg.top[1] + (bg.bottom[1] - bg.top[1]) * t,
            bg.top[2] + (bg.bottom[2] - bg.top[2]) * t,
        )
    }

    fn shade(&self, px: f32, py: f32) -> Color {
        // Later circles paint over earlier ones.
        for circle in self.scene.circles.iter().rev() {
            if circle.contains(px, py) {
                return Color::from(circle.color);
            }
        }
        self.background_at(py)
    }
}

impl Sampler for SceneSampler {
    fn sample(&self, x: u32, y: u32) -> Color {
        let n = self.samples_per_axis;
        if n == 1 {
            return self.shade(x as f32 + 0.5, y as f32 + 0.5);
        }

        // Regular n x n subsample grid, averaged.
        let step = 1.0 / n as f32;
        let mut acc = [0.0f32; 3];
        for sy in 0..n {
            for sx in 0..n {
                let px = x as f32 + (sx as f32 + 0.5) * step;
                let py = y as f32 + (sy as f32 + 0.5) * step;
                let c = self.shade(px, py);
                acc[0] += c.r;
                acc[1] += c.g;
                acc[2] += c.b;
            }
        }
        let total = (n * n) as f32;
        Color::new(acc[0] / total, acc[1] / total, acc[2] / total)
    }
}

/// Sampler that returns one constant color for every coordinate.
/// Only useful for exercising the pipeline.
pub struct ConstantSampler(pub Color);

impl Sampler for ConstantSampler {
    fn sample(&self, _x: u32, _y: u32) -> Color {
        self.0
    }
}
