// config.rs - Viewer configuration, loadable from JSON
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::{Path, PathBuf};

use crate::math::Rgb;

pub const DEFAULT_MODEL_PATH: &str = "assets/models/scene.gltf";

/// Largest accepted particle half extent; keeps `2 * half_extent` finite
pub const MAX_PARTICLE_HALF_EXTENT: f32 = 1.0e6;

/// Everything the viewport needs to compose the hero scene.
/// Defaults follow the landing page's hero canvas, except the particle
/// spread: the page scatters points over ±5, the viewer uses ±7.5 so the
/// cloud reaches past the fog start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub model: ModelConfig,
    pub particles: ParticleConfig,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub lighting: LightingConfig,
    pub background: Rgb,
    pub fog: FogConfig,
    /// Offset shared by the model and the particle cloud
    pub group_offset: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub scale: f32,
    pub animation: PoseAnimation,
}

/// Idle animation applied to the model while it is mounted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseAnimation {
    /// Spin about the vertical axis, rad/s
    pub angular_rate: f32,
    pub bob_amplitude: f32,
    /// rad/s
    pub bob_frequency: f32,
    pub sway: Option<SwayAnimation>,
}

/// Secondary tilt about the Z axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwayAnimation {
    pub amplitude: f32,
    pub frequency: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    /// Positions are drawn from [-half_extent, half_extent] on each axis
    pub half_extent: f32,
    /// Cloud rotation about X and Y, rad/s
    pub rotation_rate: f32,
    pub color: Rgb,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

/// Orbit interaction limits and toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub auto_rotate: bool,
    /// rad/s while no drag is active
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    /// `None` leaves azimuth unbounded
    pub min_azimuth_angle: Option<f32>,
    pub max_azimuth_angle: Option<f32>,
    pub min_distance: f32,
    pub max_distance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_intensity: f32,
    pub point_position: [f32; 3],
    pub point_intensity: f32,
    pub point_color: Rgb,
}

/// Linear fog between `near` and `far`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    pub color: Rgb,
    pub near: f32,
    pub far: f32,
}

const HERO_GREEN: Rgb = Rgb::from_u8(0x00, 0x1a, 0x0a);

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            model: ModelConfig::default(),
            particles: ParticleConfig::default(),
            camera: CameraConfig::default(),
            orbit: OrbitConfig::default(),
            lighting: LightingConfig::default(),
            background: HERO_GREEN,
            fog: FogConfig::default(),
            group_offset: [0.0, -1.0, 0.0],
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Xylo".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
            scale: 0.5,
            animation: PoseAnimation::default(),
        }
    }
}

impl Default for PoseAnimation {
    fn default() -> Self {
        Self {
            // 0.003 rad per tick at 60 Hz
            angular_rate: 0.18,
            bob_amplitude: 0.2,
            bob_frequency: 0.5,
            sway: None,
        }
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 200,
            half_extent: 7.5,
            rotation_rate: 0.1,
            color: Rgb::from_u8(0x88, 0xff, 0x88),
            size: 0.05,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 8.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 50.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            enable_zoom: false,
            enable_pan: false,
            auto_rotate: false,
            auto_rotate_speed: 2.0 * PI / 30.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_polar_angle: PI / 2.5,
            max_polar_angle: PI / 1.5,
            min_azimuth_angle: None,
            max_azimuth_angle: None,
            min_distance: 2.0,
            max_distance: 20.0,
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_intensity: 0.5,
            point_position: [10.0, 10.0, 10.0],
            point_intensity: 1.5,
            point_color: Rgb::new(1.0, 1.0, 1.0),
        }
    }
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            color: HERO_GREEN,
            near: 8.0,
            far: 20.0,
        }
    }
}

impl ViewerConfig {
    /// Read a JSON config file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: ViewerConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the viewport cannot honour
    pub fn validate(&self) -> Result<()> {
        let orbit = &self.orbit;
        ensure!(
            orbit.min_polar_angle <= orbit.max_polar_angle,
            "orbit.min_polar_angle must not exceed orbit.max_polar_angle"
        );
        ensure!(
            orbit.min_polar_angle >= 0.0 && orbit.max_polar_angle <= PI,
            "orbit polar angles must lie within [0, π]"
        );
        if let (Some(min), Some(max)) = (orbit.min_azimuth_angle, orbit.max_azimuth_angle) {
            ensure!(min <= max, "orbit.min_azimuth_angle must not exceed orbit.max_azimuth_angle");
        }
        ensure!(
            orbit.min_distance > 0.0 && orbit.min_distance <= orbit.max_distance,
            "orbit distances must satisfy 0 < min_distance <= max_distance"
        );
        ensure!(
            (0.0..=MAX_PARTICLE_HALF_EXTENT).contains(&self.particles.half_extent),
            "particles.half_extent must lie in [0, {}]",
            MAX_PARTICLE_HALF_EXTENT
        );

        let animation = &self.model.animation;
        let mut rates = vec![
            ("model.animation.angular_rate", animation.angular_rate),
            ("model.animation.bob_amplitude", animation.bob_amplitude),
            ("model.animation.bob_frequency", animation.bob_frequency),
            ("model.scale", self.model.scale),
            ("particles.rotation_rate", self.particles.rotation_rate),
            ("particles.size", self.particles.size),
            ("orbit.auto_rotate_speed", orbit.auto_rotate_speed),
            ("orbit.rotate_speed", orbit.rotate_speed),
            ("orbit.zoom_speed", orbit.zoom_speed),
            ("orbit.pan_speed", orbit.pan_speed),
        ];
        if let Some(sway) = animation.sway {
            rates.push(("model.animation.sway.amplitude", sway.amplitude));
            rates.push(("model.animation.sway.frequency", sway.frequency));
        }
        for (name, value) in rates {
            ensure!(value.is_finite(), "{} must be a finite number", name);
        }

        ensure!(
            self.camera.near > 0.0 && self.camera.near < self.camera.far,
            "camera planes must satisfy 0 < near < far"
        );
        ensure!(
            self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0,
            "camera.fov_degrees must lie in (0, 180)"
        );
        ensure!(self.model.scale > 0.0, "model.scale must be positive");
        Ok(())
    }
}
