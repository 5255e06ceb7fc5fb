use glam::{Mat4, Vec3};

use crate::config::{CameraConfig, OrbitConfig};
use crate::math::wrap_angle;
use crate::traits::CameraController;

/// Smallest polar angle kept away from the poles so `look_at` stays defined
const POLAR_EPSILON: f32 = 1e-4;

/// Limits the orbit camera may never leave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitBounds {
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_azimuth: Option<f32>,
    pub max_azimuth: Option<f32>,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitBounds {
    pub fn from_config(config: &OrbitConfig) -> Self {
        Self {
            min_polar: config.min_polar_angle,
            max_polar: config.max_polar_angle,
            min_azimuth: config.min_azimuth_angle,
            max_azimuth: config.max_azimuth_angle,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
        }
    }

    pub fn clamp_polar(&self, polar: f32) -> f32 {
        polar
            .clamp(self.min_polar, self.max_polar)
            .clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON)
    }

    /// Clamps when bounded, wraps into [0, 2π) otherwise
    pub fn clamp_azimuth(&self, azimuth: f32) -> f32 {
        match (self.min_azimuth, self.max_azimuth) {
            (None, None) => wrap_angle(azimuth),
            (min, max) => azimuth
                .max(min.unwrap_or(f32::NEG_INFINITY))
                .min(max.unwrap_or(f32::INFINITY)),
        }
    }

    pub fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance, self.max_distance)
    }

    pub fn is_azimuth_bounded(&self) -> bool {
        self.min_azimuth.is_some() || self.max_azimuth.is_some()
    }
}

/// Orbit camera: spherical coordinates around a target.
///
/// Azimuth is measured about +Y from +Z, polar angle from +Y, matching the
/// usual orbit-control convention.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    target: Vec3,
    azimuth: f32,
    polar: f32,
    distance: f32,
    bounds: OrbitBounds,
    pub auto_rotate: bool,
    fov_y: f32,
    near: f32,
    far: f32,
    aspect: f32,
}

impl CameraState {
    pub fn from_config(camera: &CameraConfig, orbit: &OrbitConfig) -> Self {
        let target = Vec3::from_array(camera.target);
        let offset = Vec3::from_array(camera.position) - target;
        let bounds = OrbitBounds::from_config(orbit);

        let distance = offset.length();
        let (azimuth, polar) = if distance > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / distance).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, std::f32::consts::FRAC_PI_2)
        };

        Self {
            target,
            azimuth: bounds.clamp_azimuth(azimuth),
            polar: bounds.clamp_polar(polar),
            distance: bounds.clamp_distance(distance),
            bounds,
            auto_rotate: orbit.auto_rotate,
            fov_y: camera.fov_degrees.to_radians(),
            near: camera.near,
            far: camera.far,
            aspect: 16.0 / 9.0,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn bounds(&self) -> &OrbitBounds {
        &self.bounds
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Rotate around the target; the result is clamped to the bounds
    pub fn rotate_by(&mut self, delta_azimuth: f32, delta_polar: f32) {
        if !delta_azimuth.is_finite() || !delta_polar.is_finite() {
            return;
        }
        self.azimuth = self.bounds.clamp_azimuth(self.azimuth + delta_azimuth);
        self.polar = self.bounds.clamp_polar(self.polar + delta_polar);
    }

    /// Multiply the orbit distance, clamped to the bounds
    pub fn zoom_by(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.distance = self.bounds.clamp_distance(self.distance * scale);
        }
    }

    pub fn pan_by(&mut self, offset: Vec3) {
        self.target += offset;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Unit vector from the target towards the camera
    pub fn direction(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        Vec3::new(
            sin_polar * self.azimuth.sin(),
            self.polar.cos(),
            sin_polar * self.azimuth.cos(),
        )
    }

    /// Whether every orbit parameter sits inside its bounds
    pub fn within_bounds(&self) -> bool {
        let b = &self.bounds;
        let polar_ok = self.polar >= b.min_polar && self.polar <= b.max_polar;
        let distance_ok = self.distance >= b.min_distance && self.distance <= b.max_distance;
        let azimuth_ok = self.azimuth >= b.min_azimuth.unwrap_or(f32::NEG_INFINITY)
            && self.azimuth <= b.max_azimuth.unwrap_or(f32::INFINITY);
        polar_ok && distance_ok && azimuth_ok
    }
}

impl CameraController for CameraState {
    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    fn position(&self) -> Vec3 {
        self.target + self.direction() * self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn unbounded_orbit() -> OrbitConfig {
        OrbitConfig {
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            min_distance: 0.5,
            max_distance: 100.0,
            ..OrbitConfig::default()
        }
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = CameraState::from_config(&CameraConfig::default(), &unbounded_orbit());

        assert!((camera.distance() - 8.0).abs() < 1e-5);
        assert!((camera.polar() - FRAC_PI_2).abs() < 1e-5);
        assert!((camera.position() - Vec3::new(0.0, 0.0, 8.0)).length() < 1e-4);
    }

    #[test]
    fn rotate_by_ignores_non_finite_deltas() {
        let mut camera = CameraState::from_config(&CameraConfig::default(), &OrbitConfig::default());
        let before = camera.clone();

        camera.rotate_by(f32::NAN, 0.1);
        camera.rotate_by(0.1, f32::INFINITY);

        assert_eq!(camera, before);
        assert!(camera.within_bounds());
    }

    #[test]
    fn start_position_is_clamped_into_bounds() {
        let config = CameraConfig {
            position: [0.0, 8.0, 0.1],
            ..CameraConfig::default()
        };
        let camera = CameraState::from_config(&config, &OrbitConfig::default());

        assert!((camera.polar() - PI / 2.5).abs() < 1e-5);
        assert!(camera.within_bounds());
    }

    #[test]
    fn rotate_clamps_polar_angle() {
        let mut camera = CameraState::from_config(&CameraConfig::default(), &OrbitConfig::default());

        camera.rotate_by(0.0, 10.0);
        assert!((camera.polar() - PI / 1.5).abs() < 1e-5);

        camera.rotate_by(0.0, -10.0);
        assert!((camera.polar() - PI / 2.5).abs() < 1e-5);
    }

    #[test]
    fn unbounded_azimuth_wraps() {
        let mut camera = CameraState::from_config(&CameraConfig::default(), &unbounded_orbit());
        camera.rotate_by(3.0 * PI, 0.0);

        assert!(camera.azimuth() >= 0.0 && camera.azimuth() < 2.0 * PI);
        assert!((camera.azimuth() - PI).abs() < 1e-4);
    }

    #[test]
    fn bounded_azimuth_clamps() {
        let orbit = OrbitConfig {
            min_azimuth_angle: Some(-0.5),
            max_azimuth_angle: Some(0.5),
            ..OrbitConfig::default()
        };
        let mut camera = CameraState::from_config(&CameraConfig::default(), &orbit);

        camera.rotate_by(2.0, 0.0);
        assert_eq!(camera.azimuth(), 0.5);
        camera.rotate_by(-5.0, 0.0);
        assert_eq!(camera.azimuth(), -0.5);
    }

    #[test]
    fn zoom_clamps_distance() {
        let mut camera = CameraState::from_config(&CameraConfig::default(), &OrbitConfig::default());

        camera.zoom_by(100.0);
        assert_eq!(camera.distance(), 20.0);
        camera.zoom_by(0.0001);
        assert_eq!(camera.distance(), 2.0);
        camera.zoom_by(f32::NAN);
        assert_eq!(camera.distance(), 2.0);
    }

    #[test]
    fn billboard_axes_are_orthonormal() {
        let mut camera = CameraState::from_config(&CameraConfig::default(), &unbounded_orbit());
        camera.rotate_by(0.7, -0.3);

        let (right, up) = camera.billboard_axes();
        assert!((right.length() - 1.0).abs() < 1e-4);
        assert!((up.length() - 1.0).abs() < 1e-4);
        assert!(right.dot(up).abs() < 1e-4);
    }
}
