//! Runtime configuration with TOML support.
//!
//! All tweakable settings (window geometry, simulation parameters, scene
//! assets, camera projection) are consolidated here. The defaults reproduce
//! the viewer's reference setup, so running without a config file is always
//! valid; a partial TOML file overrides just the sections it names.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DriftError;

/// Top-level configuration container. All sub-structs use `#[serde(default)]`
/// so partial TOML files (e.g. only overriding `[simulation]`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Window title and initial size.
    pub window: WindowConfig,
    /// Particle cloud parameters.
    pub simulation: SimulationConfig,
    /// Mesh asset and per-frame spin parameters.
    pub scene: SceneConfig,
    /// Camera placement and projection parameters.
    pub camera: CameraConfig,
}

impl Config {
    /// Load configuration from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, DriftError> {
        let content = std::fs::read_to_string(path).map_err(DriftError::Io)?;
        toml::from_str(&content)
            .map_err(|e| DriftError::ConfigParse(e.to_string()))
    }

    /// Save configuration to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), DriftError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DriftError::ConfigParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(DriftError::Io)?;
        }
        std::fs::write(path, content).map_err(DriftError::Io)
    }
}

/// Window title and initial framebuffer size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Title shown in the window decoration.
    pub title: String,
    /// Initial logical width in pixels.
    pub width: u32,
    /// Initial logical height in pixels.
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "driftview".to_owned(),
            width: 640,
            height: 480,
        }
    }
}

/// Particle cloud size and motion parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of particles spawned at startup.
    pub particle_count: usize,
    /// Half-width of the uniform per-axis displacement applied each frame.
    pub jitter: f32,
    /// Optional RNG seed. `None` seeds from the OS for a different cloud
    /// every run; `Some` makes spawn and jitter reproducible.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: 10_000,
            jitter: 0.01,
            seed: None,
        }
    }
}

/// Mesh asset paths and per-frame spin parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Path to the triangulated mesh, in STL format (binary or ASCII).
    pub mesh_path: String,
    /// Directory holding the WGSL shader stages.
    pub shader_dir: String,
    /// Degrees of rotation accumulated per rendered frame.
    pub rotation_step_deg: f32,
    /// Spin axis, normalized before use.
    pub rotation_axis: [f32; 3],
    /// Uniform scale applied to the mesh before rotation.
    pub mesh_scale: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            mesh_path: "assets/models/cube.stl".to_owned(),
            shader_dir: "assets/shaders".to_owned(),
            rotation_step_deg: 1.0,
            rotation_axis: [0.0, 0.5, 1.0],
            mesh_scale: 0.01,
        }
    }
}

/// Camera placement and perspective projection parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position in world space.
    pub eye: [f32; 3],
    /// Point the camera looks at.
    pub target: [f32; 3],
    /// Up direction.
    pub up: [f32; 3],
    /// Vertical field of view in degrees.
    pub fovy_deg: f32,
    /// Near clip plane distance.
    pub znear: f32,
    /// Far clip plane distance.
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, -1.0, 0.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 0.0, 1.0],
            fovy_deg: 45.0,
            znear: 0.01,
            zfar: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[simulation]
particle_count = 500
";
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.simulation.particle_count, 500);
        // Everything else should be default
        assert_eq!(config.simulation.jitter, 0.01);
        assert_eq!(config.window.width, 640);
        assert_eq!(config.scene.rotation_step_deg, 1.0);
    }

    #[test]
    fn defaults_match_reference_setup() {
        let config = Config::default();
        assert_eq!(config.simulation.particle_count, 10_000);
        assert_eq!(config.simulation.seed, None);
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 480);
        assert_eq!(config.scene.mesh_scale, 0.01);
        assert_eq!(config.scene.rotation_axis, [0.0, 0.5, 1.0]);
        assert_eq!(config.camera.eye, [0.0, -1.0, 0.0]);
        assert_eq!(config.camera.up, [0.0, 0.0, 1.0]);
        assert_eq!(config.camera.fovy_deg, 45.0);
        assert_eq!(config.camera.znear, 0.01);
        assert_eq!(config.camera.zfar, 100.0);
    }

    #[test]
    fn seed_parses_from_toml() {
        let toml_str = r"
[simulation]
seed = 42
";
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.simulation.seed, Some(42));
    }
}
