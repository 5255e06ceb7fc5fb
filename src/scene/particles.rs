use glam::{EulerRot, Mat4, Vec2, Vec3};
use rand::Rng;

use crate::config::{ParticleConfig, MAX_PARTICLE_HALF_EXTENT};
use crate::math::wrap_angle;

/// Decorative point cloud that spins as a rigid body.
///
/// Positions are drawn once at construction and never change afterwards;
/// only the cloud's orientation advances.
#[derive(Debug, Clone)]
pub struct ParticleField {
    positions: Box<[Vec3]>,
    half_extent: f32,
    /// Euler angles about X and Y
    rotation: Vec2,
    rotation_rate: f32,
}

impl ParticleField {
    /// Generate a new cloud from thread-local randomness
    pub fn new(config: &ParticleConfig) -> Self {
        Self::with_rng(config, &mut rand::thread_rng())
    }

    /// Generate a cloud from the given random source.
    /// Out-of-range extents are clamped and non-finite rates fall back to 0.
    pub fn with_rng<R: Rng + ?Sized>(config: &ParticleConfig, rng: &mut R) -> Self {
        let half_extent = if config.half_extent.is_nan() {
            0.0
        } else {
            config.half_extent.clamp(0.0, MAX_PARTICLE_HALF_EXTENT)
        };
        let rotation_rate = if config.rotation_rate.is_finite() {
            config.rotation_rate
        } else {
            0.0
        };
        let mut coordinate = || {
            if half_extent > 0.0 {
                rng.gen_range(-half_extent..=half_extent)
            } else {
                0.0
            }
        };

        let positions = (0..config.count)
            .map(|_| Vec3::new(coordinate(), coordinate(), coordinate()))
            .collect();

        Self {
            positions,
            half_extent,
            rotation: Vec2::ZERO,
            rotation_rate,
        }
    }

    /// Spin the whole cloud by `rotation_rate * delta` on X and Y
    pub fn update(&mut self, delta: f32) {
        let step = self.rotation_rate * delta.max(0.0);
        self.rotation = Vec2::new(
            wrap_angle(self.rotation.x + step),
            wrap_angle(self.rotation.y + step),
        );
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    /// Current orientation (X, Y), each in [0, 2π)
    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    /// World transform with the cloud centred at `offset`
    pub fn model_matrix(&self, offset: Vec3) -> Mat4 {
        Mat4::from_translation(offset)
            * Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(count: usize) -> ParticleConfig {
        ParticleConfig {
            count,
            ..ParticleConfig::default()
        }
    }

    #[test]
    fn generates_requested_count_within_bounds() {
        let field = ParticleField::with_rng(&config(200), &mut StdRng::seed_from_u64(7));

        assert_eq!(field.len(), 200);
        for p in field.positions() {
            assert!(p.abs().max_element() <= 7.5, "{:?} out of bounds", p);
        }
    }

    #[test]
    fn zero_extent_collapses_to_origin() {
        let config = ParticleConfig {
            count: 5,
            half_extent: 0.0,
            ..ParticleConfig::default()
        };
        let field = ParticleField::new(&config);
        assert!(field.positions().iter().all(|&p| p == Vec3::ZERO));
    }

    #[test]
    fn unvalidated_config_does_not_panic() {
        let config = ParticleConfig {
            count: 20,
            half_extent: f32::INFINITY,
            rotation_rate: f32::NAN,
            ..ParticleConfig::default()
        };
        let mut field = ParticleField::with_rng(&config, &mut StdRng::seed_from_u64(5));
        field.update(0.5);

        assert_eq!(field.half_extent(), MAX_PARTICLE_HALF_EXTENT);
        assert!(field.positions().iter().all(|p| p.is_finite()));
        assert_eq!(field.rotation(), Vec2::ZERO);

        let nan_extent = ParticleConfig {
            half_extent: f32::NAN,
            ..config
        };
        let field = ParticleField::with_rng(&nan_extent, &mut StdRng::seed_from_u64(5));
        assert_eq!(field.half_extent(), 0.0);
    }

    #[test]
    fn update_leaves_positions_untouched() {
        let mut field = ParticleField::with_rng(&config(10), &mut StdRng::seed_from_u64(1));
        let before = field.positions().to_vec();

        for _ in 0..100 {
            field.update(0.016);
        }

        assert_eq!(field.positions(), &before[..]);
        assert!(field.rotation().x > 0.0);
        assert_eq!(field.rotation().x, field.rotation().y);
    }

    #[test]
    fn rotation_is_rigid() {
        let mut field = ParticleField::with_rng(&config(2), &mut StdRng::seed_from_u64(3));
        field.update(4.0);

        let matrix = field.model_matrix(Vec3::ZERO);
        let [a, b] = [field.positions()[0], field.positions()[1]];
        let before = a.distance(b);
        let after = matrix.transform_point3(a).distance(matrix.transform_point3(b));

        assert!((before - after).abs() < 1e-4);
    }
}
