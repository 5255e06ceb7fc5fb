use glam::{Mat4, Vec3};
use std::sync::Arc;

use super::model_viewer::{ModelViewer, ViewerPhase, ViewerTransition};
use super::particles::ParticleField;
use crate::camera::CameraState;
use crate::config::ViewerConfig;
use crate::core::orbit::{OrbitControls, OrbitInput};
use crate::frame::FrameInfo;
use crate::loaders::{AssetCache, AssetLoadError, SceneAsset};
use crate::math::AABB;
use crate::traits::CameraController;

/// What the UI layer should draw over the 3D view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    /// Model still streaming in
    Loading,
    Hidden,
}

/// Changes the render surface has to act on
#[derive(Debug, Clone)]
pub enum ViewportEvent {
    /// The loading placeholder goes away; emitted exactly once per mount
    PlaceholderRemoved,
    ModelReady(Arc<SceneAsset>),
    /// The model slot stays empty; the rest of the scene keeps running
    ModelFailed(AssetLoadError),
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSnapshot {
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub camera_right: Vec3,
    pub camera_up: Vec3,
    /// `None` while the model is loading, failed or unmounted
    pub model: Option<Mat4>,
    pub particles: Mat4,
    pub particle_count: usize,
}

/// Owns the camera and composes the model slot with the particle cloud
pub struct ViewportHost {
    config: ViewerConfig,
    controls: OrbitControls,
    model: Option<ModelViewer>,
    particles: Option<ParticleField>,
    placeholder: bool,
    group_offset: Vec3,
}

impl ViewportHost {
    pub fn new(config: ViewerConfig) -> Self {
        let camera = CameraState::from_config(&config.camera, &config.orbit);
        let controls = OrbitControls::new(camera, &config.orbit);
        let group_offset = Vec3::from_array(config.group_offset);

        Self {
            config,
            controls,
            model: None,
            particles: None,
            placeholder: false,
            group_offset,
        }
    }

    /// Build the particle cloud and start (or join) the model load
    pub fn mount(&mut self, cache: &AssetCache) {
        self.mount_with(cache, ParticleField::new(&self.config.particles));
    }

    /// Mount with a prebuilt particle field
    pub fn mount_with(&mut self, cache: &AssetCache, particles: ParticleField) {
        if self.is_mounted() {
            self.unmount();
        }

        let handle = cache.request(&self.config.model.path);
        log::info!(
            "Mounting viewport: {} particles, model {:?}",
            particles.len(),
            handle.path()
        );

        self.model = Some(ModelViewer::new(handle, &self.config.model));
        self.particles = Some(particles);
        self.placeholder = true;
    }

    /// Tear down the scene; a pending model load is discarded
    pub fn unmount(&mut self) {
        if let Some(model) = self.model.as_mut() {
            model.unmount();
        }
        self.model = None;
        self.particles = None;
        self.placeholder = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.particles.is_some()
    }

    /// Per-frame update, called from the render loop
    pub fn frame(&mut self, frame: &FrameInfo) -> Vec<ViewportEvent> {
        let mut events = Vec::new();

        self.controls.update(frame.delta);

        if let Some(particles) = self.particles.as_mut() {
            particles.update(frame.delta);
        }

        let transition = self.model.as_mut().and_then(|model| model.update(frame));
        if let Some(ViewerTransition::Mounted(_)) = &transition {
            self.check_framing();
        }
        if let Some(transition) = transition {
            if self.placeholder {
                self.placeholder = false;
                events.push(ViewportEvent::PlaceholderRemoved);
            }
            events.push(match transition {
                ViewerTransition::Mounted(asset) => ViewportEvent::ModelReady(asset),
                ViewerTransition::Failed(err) => ViewportEvent::ModelFailed(err),
            });
        }

        events
    }

    /// Log the model's world extent and flag a camera that starts inside it
    fn check_framing(&self) {
        let Some(bounds) = self.model_bounds() else {
            return;
        };
        let size = bounds.size();
        log::info!(
            "Model extent {:.2} x {:.2} x {:.2} around {:?}",
            size.x,
            size.y,
            size.z,
            bounds.center()
        );
        if bounds.contains(self.camera().position()) {
            log::warn!("Camera starts inside the model; raise camera.position or lower model.scale");
        }
    }

    /// World-space bounds of the mounted model, `None` until it is animating
    pub fn model_bounds(&self) -> Option<AABB> {
        self.model
            .as_ref()
            .and_then(|model| model.world_bounds(self.group_offset))
    }

    /// Feed one pointer/wheel/resize event to the orbit controls
    pub fn handle_input(&mut self, input: OrbitInput) -> bool {
        self.controls.handle_input(input)
    }

    pub fn overlay(&self) -> Overlay {
        if self.placeholder {
            Overlay::Loading
        } else {
            Overlay::Hidden
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let camera = self.controls.camera();
        let (camera_right, camera_up) = camera.billboard_axes();

        FrameSnapshot {
            view_proj: camera.view_projection(),
            camera_position: camera.position(),
            camera_right,
            camera_up,
            model: self
                .model
                .as_ref()
                .and_then(|model| model.model_matrix(self.group_offset)),
            particles: self
                .particles
                .as_ref()
                .map(|particles| particles.model_matrix(self.group_offset))
                .unwrap_or(Mat4::from_translation(self.group_offset)),
            particle_count: self.particles.as_ref().map_or(0, ParticleField::len),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn camera(&self) -> &CameraState {
        self.controls.camera()
    }

    pub fn model_phase(&self) -> Option<ViewerPhase> {
        self.model.as_ref().map(ModelViewer::phase)
    }

    pub fn model_viewer(&self) -> Option<&ModelViewer> {
        self.model.as_ref()
    }

    pub fn particles(&self) -> Option<&ParticleField> {
        self.particles.as_ref()
    }
}
