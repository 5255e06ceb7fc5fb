use glam::{Mat4, Vec3};
use std::sync::Arc;

use crate::config::{ModelConfig, PoseAnimation};
use crate::frame::FrameInfo;
use crate::loaders::{AssetHandle, AssetLoadError, LoadState, SceneAsset};
use crate::math::{wrap_angle, AABB};

/// Per-frame pose of the mounted model
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModelPose {
    /// Spin about Y, always in [0, 2π)
    pub rotation_y: f32,
    /// Vertical bob offset
    pub position_y: f32,
    /// Secondary sway about Z
    pub rotation_z: f32,
}

impl ModelPose {
    /// Advance the spin by `angular_rate * delta` and resample the periodic terms
    pub fn advance(&mut self, animation: &PoseAnimation, frame: &FrameInfo) {
        let delta = frame.delta.max(0.0);
        self.rotation_y = wrap_angle(self.rotation_y + animation.angular_rate * delta);
        self.sample(animation, frame.time);
    }

    fn sample(&mut self, animation: &PoseAnimation, elapsed: f32) {
        self.position_y = animation.bob_amplitude * (elapsed * animation.bob_frequency).sin();
        self.rotation_z = animation
            .sway
            .map(|sway| sway.amplitude * (elapsed * sway.frequency).sin())
            .unwrap_or(0.0);
    }

    /// World transform with the model placed at `offset`
    pub fn matrix(&self, offset: Vec3, scale: f32) -> Mat4 {
        Mat4::from_translation(offset + Vec3::Y * self.position_y)
            * Mat4::from_rotation_y(self.rotation_y)
            * Mat4::from_rotation_z(self.rotation_z)
            * Mat4::from_scale(Vec3::splat(scale))
    }
}

/// Observable lifecycle phase of a viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerPhase {
    Unloaded,
    Animating,
    Failed,
    Detached,
}

/// Reported once, on the frame the load resolves
#[derive(Debug, Clone)]
pub enum ViewerTransition {
    Mounted(Arc<SceneAsset>),
    Failed(AssetLoadError),
}

#[derive(Debug)]
enum ViewerState {
    Unloaded(AssetHandle),
    Animating {
        asset: Arc<SceneAsset>,
        pose: ModelPose,
    },
    Failed(AssetLoadError),
    Detached,
}

/// Holds one model slot: waits for its asset, then animates it.
///
/// A failed load is contained here: it is logged and the slot renders
/// nothing. There is no automatic retry.
#[derive(Debug)]
pub struct ModelViewer {
    state: ViewerState,
    animation: PoseAnimation,
    scale: f32,
}

impl ModelViewer {
    pub fn new(handle: AssetHandle, config: &ModelConfig) -> Self {
        Self {
            state: ViewerState::Unloaded(handle),
            animation: config.animation,
            scale: config.scale,
        }
    }

    /// Run once per rendered frame. Never blocks.
    pub fn update(&mut self, frame: &FrameInfo) -> Option<ViewerTransition> {
        let resolved = match &mut self.state {
            ViewerState::Unloaded(handle) => handle.poll(),
            ViewerState::Animating { pose, .. } => {
                pose.advance(&self.animation, frame);
                return None;
            }
            ViewerState::Failed(_) | ViewerState::Detached => return None,
        };

        match resolved {
            LoadState::Pending => None,
            LoadState::Ready(asset) => {
                log::info!("Model {:?} ready, starting idle animation", asset.source());
                let mut pose = ModelPose::default();
                pose.sample(&self.animation, frame.time);
                self.state = ViewerState::Animating {
                    asset: Arc::clone(&asset),
                    pose,
                };
                Some(ViewerTransition::Mounted(asset))
            }
            LoadState::Failed(err) => {
                log::error!("{}", err);
                self.state = ViewerState::Failed(err.clone());
                Some(ViewerTransition::Failed(err))
            }
        }
    }

    /// Detach from the scene; a load still in flight is discarded
    pub fn unmount(&mut self) {
        if let ViewerState::Unloaded(handle) = &self.state {
            log::debug!("Discarding pending load of {:?}", handle.path());
        }
        self.state = ViewerState::Detached;
    }

    pub fn phase(&self) -> ViewerPhase {
        match self.state {
            ViewerState::Unloaded(_) => ViewerPhase::Unloaded,
            ViewerState::Animating { .. } => ViewerPhase::Animating,
            ViewerState::Failed(_) => ViewerPhase::Failed,
            ViewerState::Detached => ViewerPhase::Detached,
        }
    }

    pub fn pose(&self) -> Option<ModelPose> {
        match &self.state {
            ViewerState::Animating { pose, .. } => Some(*pose),
            _ => None,
        }
    }

    pub fn asset(&self) -> Option<&Arc<SceneAsset>> {
        match &self.state {
            ViewerState::Animating { asset, .. } => Some(asset),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AssetLoadError> {
        match &self.state {
            ViewerState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// World transform, `None` while nothing is drawable
    pub fn model_matrix(&self, offset: Vec3) -> Option<Mat4> {
        self.pose().map(|pose| pose.matrix(offset, self.scale))
    }

    /// World-space box around the posed model
    pub fn world_bounds(&self, offset: Vec3) -> Option<AABB> {
        let matrix = self.model_matrix(offset)?;
        self.asset().map(|asset| asset.bounds().transformed(&matrix))
    }
}
