use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

use crate::camera::CameraState;
use crate::config::OrbitConfig;
use crate::traits::CameraController;

/// Per-notch zoom factor at `zoom_speed == 1`
const ZOOM_BASE: f32 = 0.95;

/// Pointer button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// The single input stream the orbit controls consume
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitInput {
    PointerDown { button: PointerButton, x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { button: PointerButton },
    /// Positive values zoom in, in wheel notches
    Wheel { delta: f32 },
    Resize { width: u32, height: u32 },
}

impl OrbitInput {
    /// True for inputs that can end a drag in progress
    pub fn ends_drag(&self) -> bool {
        matches!(self, OrbitInput::PointerUp { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Rotate,
    Pan,
}

/// Auto-rotation runs only while no drag is in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlState {
    AutoRotating,
    UserDragging {
        button: PointerButton,
        mode: DragMode,
        last: Vec2,
    },
}

/// Orbit/zoom/pan controls driving a `CameraState`.
///
/// Releasing the drag button resumes auto-rotation immediately.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    camera: CameraState,
    state: ControlState,
    enable_zoom: bool,
    enable_pan: bool,
    auto_rotate_speed: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    pan_speed: f32,
    viewport: (u32, u32),
}

impl OrbitControls {
    pub fn new(camera: CameraState, config: &OrbitConfig) -> Self {
        Self {
            camera,
            state: ControlState::AutoRotating,
            enable_zoom: config.enable_zoom,
            enable_pan: config.enable_pan,
            auto_rotate_speed: config.auto_rotate_speed,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            viewport: (1280, 720),
        }
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, ControlState::UserDragging { .. })
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.camera.auto_rotate = enabled;
    }

    /// Apply one input event. Returns true when the camera moved.
    pub fn handle_input(&mut self, input: OrbitInput) -> bool {
        if let OrbitInput::PointerDown { x, y, .. } | OrbitInput::PointerMove { x, y } = input {
            if !x.is_finite() || !y.is_finite() {
                return false;
            }
        }
        match input {
            OrbitInput::PointerDown { button, x, y } => {
                if self.is_dragging() {
                    return false;
                }
                let mode = match button {
                    PointerButton::Primary => DragMode::Rotate,
                    PointerButton::Secondary if self.enable_pan => DragMode::Pan,
                    _ => return false,
                };
                self.state = ControlState::UserDragging {
                    button,
                    mode,
                    last: Vec2::new(x, y),
                };
                false
            }
            OrbitInput::PointerMove { x, y } => {
                let ControlState::UserDragging { button, mode, last } = self.state else {
                    return false;
                };
                let position = Vec2::new(x, y);
                let delta = position - last;
                self.state = ControlState::UserDragging {
                    button,
                    mode,
                    last: position,
                };
                match mode {
                    DragMode::Rotate => self.rotate(delta),
                    DragMode::Pan => self.pan(delta),
                }
            }
            OrbitInput::PointerUp { button } => {
                if let ControlState::UserDragging { button: held, .. } = self.state {
                    if held == button {
                        self.state = ControlState::AutoRotating;
                    }
                }
                false
            }
            OrbitInput::Wheel { delta } => {
                if !self.enable_zoom || delta == 0.0 || !delta.is_finite() {
                    return false;
                }
                let before = self.camera.distance();
                self.camera.zoom_by(ZOOM_BASE.powf(self.zoom_speed * delta));
                self.camera.distance() != before
            }
            OrbitInput::Resize { width, height } => {
                if width > 0 && height > 0 {
                    self.viewport = (width, height);
                    self.camera.set_viewport(width, height);
                }
                false
            }
        }
    }

    /// Advance time-driven motion; called once per frame
    pub fn update(&mut self, delta: f32) {
        if self.camera.auto_rotate && self.state == ControlState::AutoRotating {
            self.camera
                .rotate_by(self.auto_rotate_speed * delta.max(0.0), 0.0);
        }
    }

    fn rotate(&mut self, delta: Vec2) -> bool {
        let height = self.viewport.1 as f32;
        let scale = TAU * self.rotate_speed / height;
        let (azimuth, polar) = (self.camera.azimuth(), self.camera.polar());
        self.camera.rotate_by(-delta.x * scale, -delta.y * scale);
        azimuth != self.camera.azimuth() || polar != self.camera.polar()
    }

    fn pan(&mut self, delta: Vec2) -> bool {
        let height = self.viewport.1 as f32;
        // World units covered by one pixel at the target's depth
        let target_extent = self.camera.distance() * (self.camera.fov_y() * 0.5).tan();
        let per_pixel = 2.0 * target_extent / height * self.pan_speed;
        let (right, up) = self.camera.billboard_axes();
        let offset: Vec3 = -right * delta.x * per_pixel + up * delta.y * per_pixel;
        self.camera.pan_by(offset);
        offset != Vec3::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    fn controls(config: &OrbitConfig) -> OrbitControls {
        let camera = CameraState::from_config(&CameraConfig::default(), config);
        OrbitControls::new(camera, config)
    }

    #[test]
    fn drag_enters_and_leaves_dragging() {
        let mut c = controls(&OrbitConfig::default());
        assert_eq!(c.state(), ControlState::AutoRotating);

        c.handle_input(OrbitInput::PointerDown {
            button: PointerButton::Primary,
            x: 10.0,
            y: 10.0,
        });
        assert!(c.is_dragging());

        c.handle_input(OrbitInput::PointerUp {
            button: PointerButton::Primary,
        });
        assert_eq!(c.state(), ControlState::AutoRotating);
    }

    #[test]
    fn horizontal_drag_changes_azimuth() {
        let mut c = controls(&OrbitConfig::default());
        let before = c.camera().azimuth();

        c.handle_input(OrbitInput::PointerDown {
            button: PointerButton::Primary,
            x: 100.0,
            y: 100.0,
        });
        let moved = c.handle_input(OrbitInput::PointerMove { x: 50.0, y: 100.0 });

        assert!(moved);
        assert_ne!(c.camera().azimuth(), before);
    }

    #[test]
    fn move_without_drag_is_ignored() {
        let mut c = controls(&OrbitConfig::default());
        let before = c.camera().clone();

        assert!(!c.handle_input(OrbitInput::PointerMove { x: 500.0, y: 500.0 }));
        assert_eq!(c.camera(), &before);
    }

    #[test]
    fn wheel_ignored_when_zoom_disabled() {
        let mut c = controls(&OrbitConfig::default());
        let before = c.camera().distance();

        assert!(!c.handle_input(OrbitInput::Wheel { delta: 3.0 }));
        assert_eq!(c.camera().distance(), before);
    }

    #[test]
    fn wheel_zooms_in_when_enabled() {
        let config = OrbitConfig {
            enable_zoom: true,
            ..OrbitConfig::default()
        };
        let mut c = controls(&config);
        let before = c.camera().distance();

        assert!(c.handle_input(OrbitInput::Wheel { delta: 1.0 }));
        assert!(c.camera().distance() < before);
    }

    #[test]
    fn secondary_drag_ignored_when_pan_disabled() {
        let mut c = controls(&OrbitConfig::default());

        c.handle_input(OrbitInput::PointerDown {
            button: PointerButton::Secondary,
            x: 0.0,
            y: 0.0,
        });
        assert!(!c.is_dragging());
    }

    #[test]
    fn secondary_drag_pans_target_when_enabled() {
        let config = OrbitConfig {
            enable_pan: true,
            ..OrbitConfig::default()
        };
        let mut c = controls(&config);

        c.handle_input(OrbitInput::PointerDown {
            button: PointerButton::Secondary,
            x: 0.0,
            y: 0.0,
        });
        c.handle_input(OrbitInput::PointerMove { x: 40.0, y: 0.0 });

        // Dragging right moves the target left
        assert!(c.camera().target().x < 0.0);
    }

    #[test]
    fn auto_rotate_pauses_during_drag() {
        let config = OrbitConfig {
            auto_rotate: true,
            ..OrbitConfig::default()
        };
        let mut c = controls(&config);

        c.update(1.0);
        let rotated = c.camera().azimuth();
        assert!(rotated > 0.0);

        c.handle_input(OrbitInput::PointerDown {
            button: PointerButton::Primary,
            x: 0.0,
            y: 0.0,
        });
        c.update(1.0);
        assert_eq!(c.camera().azimuth(), rotated);

        c.handle_input(OrbitInput::PointerUp {
            button: PointerButton::Primary,
        });
        c.update(1.0);
        assert!(c.camera().azimuth() > rotated);
    }

    #[test]
    fn release_of_other_button_keeps_drag() {
        let mut c = controls(&OrbitConfig::default());
        c.handle_input(OrbitInput::PointerDown {
            button: PointerButton::Primary,
            x: 0.0,
            y: 0.0,
        });
        c.handle_input(OrbitInput::PointerUp {
            button: PointerButton::Secondary,
        });
        assert!(c.is_dragging());
    }

    #[test]
    fn resize_updates_aspect() {
        let mut c = controls(&OrbitConfig::default());
        c.handle_input(OrbitInput::Resize {
            width: 800,
            height: 400,
        });
        assert_eq!(c.camera().aspect(), 2.0);

        // Zero-sized windows (minimised) are ignored
        c.handle_input(OrbitInput::Resize { width: 0, height: 0 });
        assert_eq!(c.camera().aspect(), 2.0);
    }
}
