//! Configuration for the tile render pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for a render job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Scene input configuration
    pub scene: SceneConfig,

    /// Render domain (output image) dimensions
    pub domain: DomainConfig,

    /// Tiling granularity
    #[serde(default)]
    pub tiling: TileConfig,

    /// Sampling quality parameters, forwarded opaquely to the sampler
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Output artifact configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Scene input configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Path to the scene description file (YAML or JSON).
    /// Loaded once at worker construction; unreadable scenes are fatal.
    pub path: PathBuf,
}

/// Render domain dimensions in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Total width in pixels
    pub width: u32,

    /// Total height in pixels
    pub height: u32,
}

/// Tile dimensions in pixels.
///
/// Edge tiles are clamped to the domain bound, so the domain does not
/// need to be a multiple of the tile size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TileConfig {
    /// Tile width in pixels
    #[serde(default = "default_tile_size")]
    pub width: u32,

    /// Tile height in pixels
    #[serde(default = "default_tile_size")]
    pub height: u32,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            width: default_tile_size(),
            height: default_tile_size(),
        }
    }
}

/// Sampling quality parameters.
///
/// These are opaque to the pipeline: they are handed to the sampler at
/// construction and the sampler decides what they mean. The bundled
/// scene sampler reads `primary` as supersamples per pixel axis and
/// `secondary` as the background banding level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Primary quality knob
    #[serde(default = "default_quality_primary")]
    pub quality_primary: u32,

    /// Secondary quality knob
    #[serde(default)]
    pub quality_secondary: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            quality_primary: default_quality_primary(),
            quality_secondary: 0,
        }
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination path for the final image. The encoding is chosen
    /// from the file extension (png, bmp, tga, ...).
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML or JSON file.
    /// Format is auto-detected from file extension (.yaml, .yml, or .json).
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config: Config = match ext {
            "json" => serde_json::from_str(&contents)?,
            // YAML is a superset of JSON, so it is also the fallback
            _ => serde_yaml::from_str(&contents)?,
        };
        Ok(config)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the configuration.
    ///
    /// Positive tile sizes are what make partitioner termination
    /// provable, so they are enforced here rather than trusted.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.domain.width == 0 || self.domain.height == 0 {
            anyhow::bail!("Domain dimensions must be > 0");
        }
        if self.tiling.width == 0 || self.tiling.height == 0 {
            anyhow::bail!("Tile dimensions must be > 0");
        }
        if self.scene.path.as_os_str().is_empty() {
            anyhow::bail!("Scene path must not be empty");
        }
        if self.output.path.as_os_str().is_empty() {
            anyhow::bail!("Output path must not be empty");
        }
        if self.output.path.extension().is_none() {
            anyhow::bail!(
                "Output path {} has no extension to choose an image format from",
                self.output.path.display()
            );
        }
        Ok(())
    }
}

// Default value functions for serde
fn default_tile_size() -> u32 {
    64
}
fn default_quality_primary() -> u32 {
    1
}
fn default_output_path() -> PathBuf {
    PathBuf::from("out.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            scene: SceneConfig {
                path: PathBuf::from("scene.yaml"),
            },
            domain: DomainConfig {
                width: 1920,
                height: 1080,
            },
            tiling: TileConfig::default(),
            sampling: SamplingConfig::default(),
            output: OutputConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_zero_tile_size_rejected() {
        let mut config = base_config();
        config.tiling.width = 0;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.tiling.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_domain_rejected() {
        let mut config = base_config();
        config.domain.width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_scene_path_rejected() {
        let mut config = base_config();
        config.scene.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_without_extension_rejected() {
        let mut config = base_config();
        config.output.path = PathBuf::from("artifact");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_yaml_defaults() {
        let config = Config::from_yaml(
            r#"
scene:
  path: scene.yaml
domain:
  width: 640
  height: 480
"#,
        )
        .unwrap();

        assert_eq!(config.tiling.width, 64);
        assert_eq!(config.tiling.height, 64);
        assert_eq!(config.sampling.quality_primary, 1);
        assert_eq!(config.output.path, PathBuf::from("out.png"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = base_config();
        let yaml = config.to_yaml().unwrap();
        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.domain.width, config.domain.width);
        assert_eq!(parsed.tiling.width, config.tiling.width);
    }
}
