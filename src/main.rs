//! Tile render pipeline CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use render_tiles::{init_rayon, run_job, Config, Partitioner};

#[derive(Parser)]
#[command(name = "render-tiles")]
#[command(about = "Partition, render, and merge a tiled raster image", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    /// Override rayon thread count for local rendering
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the render job (default if no command specified)
    Run,

    /// Show the tiling plan without rendering
    Plan,

    /// Validate configuration
    Validate,

    /// Generate a sample configuration and scene file
    GenerateConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Run) => run_command(cli.config, cli.threads)?,
        Some(Commands::Plan) => plan_command(cli.config)?,
        Some(Commands::Validate) => validate_command(cli.config)?,
        Some(Commands::GenerateConfig { output }) => generate_config_command(output)?,
    }

    Ok(())
}

fn run_command(config_path: PathBuf, threads: Option<usize>) -> Result<()> {
    let config = Config::from_file(&config_path)?;
    config.validate()?;

    init_rayon(threads)?;

    let stats = run_job(config)?;
    println!("{stats}");
    Ok(())
}

fn plan_command(config_path: PathBuf) -> Result<()> {
    let config = Config::from_file(&config_path)?;
    config.validate()?;

    let mut partitioner = Partitioner::new(&config);
    let total = partitioner.num_partitions();

    let mut full_tiles = 0u64;
    let mut edge_tiles = 0u64;
    let mut pixels = 0u64;
    while let Some(descriptor) = partitioner.next_partition() {
        let extent = descriptor.extent();
        pixels += extent.pixel_count();
        if extent.width() == config.tiling.width && extent.height() == config.tiling.height {
            full_tiles += 1;
        } else {
            edge_tiles += 1;
        }
    }

    println!("=== Tiling Plan ===");
    println!(
        "Domain: {}x{} pixels",
        config.domain.width, config.domain.height
    );
    println!(
        "Tile size: {}x{} pixels",
        config.tiling.width, config.tiling.height
    );
    println!("Tiles: {total} ({full_tiles} full, {edge_tiles} clamped at the edge)");
    println!("Pixels: {pixels}");
    println!(
        "Result payload per full tile: {} bytes",
        10 + config.tiling.width as u64 * config.tiling.height as u64 * 20
    );
    println!("Output: {}", config.output.path.display());

    Ok(())
}

fn validate_command(config_path: PathBuf) -> Result<()> {
    let config = Config::from_file(&config_path)?;
    config.validate()?;
    println!("Configuration is valid");
    Ok(())
}

fn generate_config_command(output: PathBuf) -> Result<()> {
    let yaml = r#"# Tile render pipeline configuration

# === SCENE: setup input loaded once per worker ===
scene:
  path: "scene.yaml"

# === DOMAIN: final image dimensions in pixels ===
domain:
  width: 1920
  height: 1080

# === TILING: work unit granularity ===
# Edge tiles are clamped to the domain bound, so the domain does not
# need to be a multiple of the tile size.
tiling:
  width: 64
  height: 64

# === SAMPLING: quality knobs forwarded to the sampler ===
# The bundled scene sampler reads quality_primary as supersamples per
# pixel axis and quality_secondary as background banding (0 = smooth).
sampling:
  quality_primary: 2
  quality_secondary: 0

# === OUTPUT: the job's only durable artifact ===
# Encoding is chosen from the file extension (png, bmp, tga, ...).
output:
  path: "out.png"
"#;

    std::fs::write(&output, yaml)?;
    println!("Generated sample configuration at: {}", output.display());

    let scene_path = output
        .parent()
        .map(|p| p.join("scene.yaml"))
        .unwrap_or_else(|| PathBuf::from("scene.yaml"));
    if !scene_path.exists() {
        let scene = r#"# Sample scene for the bundled flat-shaded sampler
background:
  top: [0.2, 0.3, 0.6]
  bottom: [0.9, 0.9, 1.0]
circles:
  - center: [960.0, 540.0]
    radius: 300.0
    color: [0.9, 0.3, 0.2]
  - center: [1200.0, 400.0]
    radius: 120.0
    color: [1.0, 0.8, 0.2]
"#;
        std::fs::write(&scene_path, scene)?;
        println!("Generated sample scene at: {}", scene_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_default() {
        // No subcommand - should default to Run
        let cli = Cli::try_parse_from(["render-tiles"]);
        assert!(cli.is_ok());
        assert!(cli.unwrap().command.is_none());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::try_parse_from(["render-tiles", "-c", "other.yaml"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_parse_plan() {
        let cli = Cli::try_parse_from(["render-tiles", "plan", "-c", "test.json"]);
        assert!(cli.is_ok());
    }
}
