//! Scene configuration - YAML presets for polygons and chains

use anyhow::Result;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::fourier::polygon::Polygon;
use crate::fourier::resample::resample;
use crate::fourier::spectrum::{decompose, EpicycleChain, SpectralComponent};
use crate::fourier::{EpicycleError, Point};

/// Main configuration loaded from scenes.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub scenes: Vec<Scene>,
}

/// A single named animation setup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub name: String,
    /// Seed for the random stages; drawn fresh when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Hard frame cap for exports; loop closure can stop earlier.
    #[serde(default)]
    pub frames: Option<usize>,
    /// Frame rate recorded in export manifests.
    #[serde(default)]
    pub fps: Option<u32>,
    pub source: SceneSource,
}

/// Where a scene's chain comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneSource {
    /// Random integer polygon run through the full pipeline.
    RandomPolygon {
        points: usize,
        bound: i32,
        samples: usize,
        components: usize,
    },
    /// Explicit polygon vertices run through the full pipeline.
    Polygon {
        vertices: Vec<[f64; 2]>,
        samples: usize,
        components: usize,
    },
    /// Hand-built chain, no decomposition.
    Chain { components: Vec<ComponentConfig> },
    /// Random freehand chain.
    RandomChain { count: usize },
}

/// One hand-built chain entry: radius, initial angle, radians per frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub radius: f64,
    pub phase: f64,
    pub speed: f64,
}

/// Everything a viewer or exporter needs for one scene
#[derive(Debug, Clone)]
pub struct SceneData {
    /// Present for polygon-backed scenes, drawn as the target shape.
    pub polygon: Option<Polygon>,
    /// Resampled boundary; empty for hand-built and random chains.
    pub samples: Vec<Point>,
    pub chain: EpicycleChain,
    /// Seed actually used, so a fresh draw can be reproduced.
    pub seed: u64,
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Get scene by ID
    pub fn get_scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }
}

impl Scene {
    /// Run the pipeline (or build the chain directly) for this scene.
    pub fn realize(&self) -> Result<SceneData, EpicycleError> {
        let seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = StdRng::seed_from_u64(seed);

        match &self.source {
            SceneSource::RandomPolygon {
                points,
                bound,
                samples,
                components,
            } => {
                let polygon = Polygon::random(*points, *bound, &mut rng)?;
                let path = resample(&polygon, *samples)?;
                let chain = decompose(&path, *components)?;
                info!(
                    "scene '{}': {} vertices -> {} samples -> {} components (seed {seed})",
                    self.id,
                    polygon.len(),
                    path.len(),
                    chain.len()
                );
                Ok(SceneData {
                    polygon: Some(polygon),
                    samples: path,
                    chain,
                    seed,
                })
            }
            SceneSource::Polygon {
                vertices,
                samples,
                components,
            } => {
                let points = vertices
                    .iter()
                    .map(|&[x, y]| Complex64::new(x, y))
                    .collect();
                let polygon = Polygon::from_points(points)?;
                let path = resample(&polygon, *samples)?;
                let chain = decompose(&path, *components)?;
                Ok(SceneData {
                    polygon: Some(polygon),
                    samples: path,
                    chain,
                    seed,
                })
            }
            SceneSource::Chain { components } => {
                let chain = EpicycleChain::from_components(
                    components
                        .iter()
                        .map(|c| SpectralComponent {
                            radius: c.radius,
                            phase: c.phase,
                            frequency: 0,
                            speed: c.speed,
                        })
                        .collect(),
                );
                Ok(SceneData {
                    polygon: None,
                    samples: Vec::new(),
                    chain,
                    seed,
                })
            }
            SceneSource::RandomChain { count } => {
                let chain = EpicycleChain::random(*count, &mut rng);
                info!("scene '{}': {count} random circles (seed {seed})", self.id);
                Ok(SceneData {
                    polygon: None,
                    samples: Vec::new(),
                    chain,
                    seed,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENES_YAML: &str = r#"
scenes:
  - id: star
    name: Random Star
    seed: 7
    source:
      type: random_polygon
      points: 12
      bound: 10
      samples: 128
      components: 16
  - id: diamond
    name: Diamond
    source:
      type: polygon
      vertices: [[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]]
      samples: 64
      components: 8
  - id: pair
    name: Two Circles
    frames: 500
    source:
      type: chain
      components:
        - { radius: 1.0, phase: 0.0, speed: 0.02 }
        - { radius: 0.5, phase: 0.0, speed: -0.06 }
  - id: doodle
    name: Doodle
    source:
      type: random_chain
      count: 10
"#;

    #[test]
    fn test_parse_scene_kinds() {
        let config: Config = serde_yaml::from_str(SCENES_YAML).unwrap();
        assert_eq!(config.scenes.len(), 4);
        assert!(matches!(
            config.scenes[0].source,
            SceneSource::RandomPolygon { points: 12, .. }
        ));
        assert!(matches!(config.scenes[1].source, SceneSource::Polygon { .. }));
        assert!(matches!(config.scenes[2].source, SceneSource::Chain { .. }));
        assert!(matches!(
            config.scenes[3].source,
            SceneSource::RandomChain { count: 10 }
        ));
        assert_eq!(config.scenes[2].frames, Some(500));
    }

    #[test]
    fn test_get_scene() {
        let config: Config = serde_yaml::from_str(SCENES_YAML).unwrap();
        assert_eq!(config.get_scene("diamond").unwrap().name, "Diamond");
        assert!(config.get_scene("missing").is_none());
    }

    #[test]
    fn test_realize_seeded_polygon_scene() {
        let config: Config = serde_yaml::from_str(SCENES_YAML).unwrap();
        let scene = config.get_scene("star").unwrap();

        let data = scene.realize().unwrap();
        assert_eq!(data.seed, 7);
        assert_eq!(data.polygon.as_ref().unwrap().len(), 12);
        assert_eq!(data.samples.len(), 128);
        assert_eq!(data.chain.len(), 16);

        // Same seed, same pipeline output.
        let again = scene.realize().unwrap();
        assert_eq!(data.chain, again.chain);
    }

    #[test]
    fn test_realize_manual_chain() {
        let config: Config = serde_yaml::from_str(SCENES_YAML).unwrap();
        let data = config.get_scene("pair").unwrap().realize().unwrap();
        assert!(data.polygon.is_none());
        assert!(data.samples.is_empty());
        assert_eq!(data.chain.len(), 2);
        assert_eq!(data.chain.sample_count(), 0);
    }

    #[test]
    fn test_realize_rejects_oversized_k() {
        let scene = Scene {
            id: "bad".into(),
            name: "Bad".into(),
            seed: Some(1),
            frames: None,
            fps: None,
            source: SceneSource::RandomPolygon {
                points: 5,
                bound: 10,
                samples: 16,
                components: 17,
            },
        };
        assert!(matches!(
            scene.realize(),
            Err(EpicycleError::InvalidInput(_))
        ));
    }
}
