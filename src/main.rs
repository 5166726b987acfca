//! Epicycler - Fourier epicycle animations from closed polygons
//!
//! CLI commands:
//! - gui: Launch native viewer
//! - render: Export an animation as a PNG frame sequence
//! - still: Export one frozen chain pose
//! - spectrum: Print the ranked component table for a scene
//! - scenes: List configured scenes

mod config;
mod fourier;
mod gui;
mod logging;
mod render;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use fourier::spectrum::residual_energy;

#[derive(Parser)]
#[command(name = "epicycler")]
#[command(about = "Fourier epicycle animations from closed polygons")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to scenes.yaml config
    #[arg(short, long, default_value = "scenes.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch native GUI viewer
    Gui {
        /// Scene to open at startup
        #[arg(short, long)]
        scene: Option<String>,
    },

    /// Export an animation as a PNG frame sequence plus manifest
    Render {
        /// Scene ID
        #[arg(short, long)]
        scene: String,

        /// Output directory
        #[arg(short, long, default_value = "frames")]
        output: PathBuf,

        /// Square frame size in pixels
        #[arg(long, default_value = "720")]
        size: u32,

        /// Frame rate recorded in the manifest
        #[arg(long)]
        fps: Option<u32>,

        /// Stop after this many frames even without loop closure
        #[arg(long)]
        frames: Option<usize>,
    },

    /// Export one frozen chain pose as a single PNG
    Still {
        /// Scene ID
        #[arg(short, long)]
        scene: String,

        /// Output file
        #[arg(short, long, default_value = "chain.png")]
        output: PathBuf,

        /// Frame index to freeze at
        #[arg(long, default_value = "0")]
        frame: usize,

        /// Square image size in pixels
        #[arg(long, default_value = "900")]
        size: u32,
    },

    /// Print the ranked spectral components for a scene
    Spectrum {
        /// Scene ID
        #[arg(short, long)]
        scene: String,

        /// Also write the components as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// List configured scenes
    Scenes,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging first
    logging::init_logging("logs");
    tracing::info!("Epicycler starting up");

    let cli = Cli::parse();
    tracing::debug!("CLI args parsed: config={:?}", cli.config);

    // Load config
    let config = if cli.config.exists() {
        tracing::info!("Loading config from {:?}", cli.config);
        config::Config::load(&cli.config)?
    } else {
        tracing::warn!("Config file not found: {:?}, using defaults", cli.config);
        default_config()
    };
    tracing::info!("Config loaded: {} scenes", config.scenes.len());

    match cli.command {
        Commands::Gui { scene } => {
            tracing::info!("Launching native GUI viewer");
            gui::run_viewer(config, scene)?;
        }

        Commands::Render {
            scene,
            output,
            size,
            fps,
            frames,
        } => {
            let scene = get_scene(&config, &scene)?;
            let data = scene.realize()?;
            let options = render::RenderOptions {
                size,
                fps: fps.or(scene.fps).unwrap_or(60),
                max_frames: frames.or(scene.frames).unwrap_or(10_000),
            };
            render::render_animation(scene, &data, &output, &options)?;
        }

        Commands::Still {
            scene,
            output,
            frame,
            size,
        } => {
            let scene = get_scene(&config, &scene)?;
            let data = scene.realize()?;
            render::render_still(&data, frame, &output, size)?;
            println!("Saved {:?}", output);
        }

        Commands::Spectrum { scene, json } => {
            let scene = get_scene(&config, &scene)?;
            print_spectrum(scene, json.as_deref())?;
        }

        Commands::Scenes => {
            list_scenes(&config);
        }
    }

    Ok(())
}

fn get_scene<'a>(config: &'a config::Config, id: &str) -> anyhow::Result<&'a config::Scene> {
    config
        .get_scene(id)
        .ok_or_else(|| anyhow::anyhow!("Scene not found: {}", id))
}

/// Print the ranked component table, optionally dumping it as JSON
fn print_spectrum(scene: &config::Scene, json: Option<&std::path::Path>) -> anyhow::Result<()> {
    let data = scene.realize()?;
    let chain = &data.chain;

    if chain.sample_count() > 0 {
        println!(
            "{}: {} components from {} samples (seed {})",
            scene.name,
            chain.len(),
            chain.sample_count(),
            data.seed
        );
    } else {
        println!("{}: {} hand-built components", scene.name, chain.len());
    }
    println!();
    println!(
        "{:>4}  {:>5}  {:>12}  {:>12}  {:>12}",
        "rank", "freq", "radius", "phase", "speed"
    );
    for (rank, c) in chain.components().iter().enumerate() {
        println!(
            "{:>4}  {:>5}  {:>12.6}  {:>12.6}  {:>12.6}",
            rank + 1,
            c.frequency,
            c.radius,
            c.phase,
            c.speed
        );
    }

    if !data.samples.is_empty() {
        println!();
        println!(
            "Residual energy: {:.6e}",
            residual_energy(&data.samples, chain)
        );
    }

    if let Some(path) = json {
        let artifact = serde_json::json!({
            "generated": chrono::Local::now().to_rfc3339(),
            "scene": scene.id,
            "name": scene.name,
            "seed": data.seed,
            "sample_count": chain.sample_count(),
            "components": chain.components(),
        });
        std::fs::write(path, serde_json::to_string_pretty(&artifact)?)?;
        println!("\nWrote {:?}", path);
    }

    Ok(())
}

/// List configured scenes
fn list_scenes(config: &config::Config) {
    println!("Available scenes ({}):", config.scenes.len());
    println!();

    for scene in &config.scenes {
        let kind = match &scene.source {
            config::SceneSource::RandomPolygon {
                points,
                samples,
                components,
                ..
            } => format!("random polygon, {points} pts -> {samples} samples -> {components} circles"),
            config::SceneSource::Polygon {
                vertices,
                samples,
                components,
            } => format!(
                "polygon, {} pts -> {samples} samples -> {components} circles",
                vertices.len()
            ),
            config::SceneSource::Chain { components } => {
                format!("chain, {} circles", components.len())
            }
            config::SceneSource::RandomChain { count } => {
                format!("random chain, {count} circles")
            }
        };
        println!("  - {} [{}] ({})", scene.name, scene.id, kind);
    }
}

/// Default config when no file exists
fn default_config() -> config::Config {
    use config::{ComponentConfig, Scene, SceneSource};

    config::Config {
        scenes: vec![
            Scene {
                id: "star".to_string(),
                name: "Random Star Polygon".to_string(),
                seed: None,
                frames: None,
                fps: None,
                source: SceneSource::RandomPolygon {
                    points: 12,
                    bound: 10,
                    samples: 256,
                    components: 24,
                },
            },
            Scene {
                id: "diamond".to_string(),
                name: "Diamond".to_string(),
                seed: None,
                frames: None,
                fps: None,
                source: SceneSource::Polygon {
                    vertices: vec![[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]],
                    samples: 128,
                    components: 16,
                },
            },
            Scene {
                id: "rosette".to_string(),
                name: "Two-Circle Rosette".to_string(),
                seed: None,
                frames: Some(2000),
                fps: None,
                source: SceneSource::Chain {
                    components: vec![
                        ComponentConfig {
                            radius: 1.0,
                            phase: 0.0,
                            speed: 0.02,
                        },
                        ComponentConfig {
                            radius: 0.5,
                            phase: 0.0,
                            speed: -0.06,
                        },
                    ],
                },
            },
            Scene {
                id: "doodle".to_string(),
                name: "Random Doodle".to_string(),
                seed: None,
                frames: Some(10_000),
                fps: None,
                source: SceneSource::RandomChain { count: 10 },
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::config::SceneSource;

    #[test]
    fn test_default_config_covers_every_scene_kind() {
        let scenes = default_config().scenes;

        assert!(scenes
            .iter()
            .any(|s| matches!(s.source, SceneSource::RandomPolygon { .. })));
        assert!(scenes
            .iter()
            .any(|s| matches!(s.source, SceneSource::Polygon { .. })));
        assert!(scenes
            .iter()
            .any(|s| matches!(s.source, SceneSource::Chain { .. })));
        assert!(scenes
            .iter()
            .any(|s| matches!(s.source, SceneSource::RandomChain { .. })));
    }

    #[test]
    fn test_default_scenes_realize() {
        for scene in default_config().scenes {
            let data = scene.realize().unwrap();
            assert!(!data.chain.is_empty(), "scene {} built no chain", scene.id);
        }
    }
}
