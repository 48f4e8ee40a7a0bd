//! End-to-end job tests: partition, render, merge, and write the
//! artifact through the public driver.

use render_tiles::config::{
    Config, DomainConfig, OutputConfig, SamplingConfig, SceneConfig, TileConfig,
};
use render_tiles::{run_job, Sampler, SceneSampler};
use std::path::PathBuf;

fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("render_tiles_it").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_scene(dir: &PathBuf, contents: &str) -> PathBuf {
    let path = dir.join("scene.yaml");
    std::fs::write(&path, contents).unwrap();
    path
}

const FLAT_WHITE_SCENE: &str = r#"
background:
  top: [1.0, 1.0, 1.0]
  bottom: [1.0, 1.0, 1.0]
circles: []
"#;

const GRADIENT_SCENE: &str = r#"
background:
  top: [0.0, 0.0, 0.0]
  bottom: [1.0, 1.0, 1.0]
circles:
  - center: [8.0, 8.0]
    radius: 4.0
    color: [1.0, 0.0, 0.0]
"#;

fn config(dir: &PathBuf, scene: PathBuf, domain: (u32, u32), tile: (u32, u32)) -> Config {
    Config {
        scene: SceneConfig { path: scene },
        domain: DomainConfig {
            width: domain.0,
            height: domain.1,
        },
        tiling: TileConfig {
            width: tile.0,
            height: tile.1,
        },
        sampling: SamplingConfig::default(),
        output: OutputConfig {
            path: dir.join("out.png"),
        },
    }
}

#[test]
fn flat_scene_renders_uniform_image() {
    let dir = test_dir("flat");
    let scene = write_scene(&dir, FLAT_WHITE_SCENE);
    let config = config(&dir, scene, (4, 4), (2, 2));

    let stats = run_job(config).unwrap();
    assert_eq!(stats.tiles, 4);
    assert_eq!(stats.pixels, 16);

    let artifact = image::open(&stats.artifact).unwrap().to_rgb8();
    assert_eq!(artifact.dimensions(), (4, 4));
    assert!(artifact.pixels().all(|p| p.0 == [255, 255, 255]));
}

#[test]
fn tiled_render_matches_direct_sampling() {
    // The merged artifact must be identical to sampling every pixel
    // directly, whatever the tiling.
    let dir = test_dir("match");
    let scene_path = write_scene(&dir, GRADIENT_SCENE);
    let config = config(&dir, scene_path.clone(), (16, 16), (5, 3));

    let sampler =
        SceneSampler::load(&scene_path, config.domain.height, config.sampling).unwrap();

    let stats = run_job(config).unwrap();
    assert_eq!(stats.pixels, 256);

    let artifact = image::open(&stats.artifact).unwrap().to_rgb8();
    for y in 0..16u32 {
        for x in 0..16u32 {
            let expected = sampler.sample(x, y).to_rgb8();
            assert_eq!(
                artifact.get_pixel(x, y).0,
                expected,
                "pixel ({x}, {y}) diverged from direct sampling"
            );
        }
    }
}

#[test]
fn domain_not_multiple_of_tile_still_covers_everything() {
    let dir = test_dir("clamp");
    let scene = write_scene(&dir, FLAT_WHITE_SCENE);
    let config = config(&dir, scene, (100, 30), (30, 30));

    let stats = run_job(config).unwrap();
    assert_eq!(stats.tiles, 4);
    assert_eq!(stats.pixels, 3000);

    let artifact = image::open(&stats.artifact).unwrap().to_rgb8();
    assert_eq!(artifact.dimensions(), (100, 30));
    // The clamped edge tile (90..100) must be rendered, not dropped.
    assert_eq!(artifact.get_pixel(99, 29).0, [255, 255, 255]);
}

#[test]
fn missing_scene_fails_before_any_work() {
    let dir = test_dir("missing");
    let config = config(&dir, dir.join("no_such_scene.yaml"), (4, 4), (2, 2));

    assert!(run_job(config).is_err());
    assert!(!dir.join("out.png").exists());
}

#[test]
fn invalid_config_rejected() {
    let dir = test_dir("invalid");
    let scene = write_scene(&dir, FLAT_WHITE_SCENE);
    let mut config = config(&dir, scene, (4, 4), (2, 2));
    config.tiling.width = 0;

    assert!(run_job(config).is_err());
}
