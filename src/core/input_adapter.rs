use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use super::orbit::{OrbitInput, PointerButton};

/// Pixels of touchpad scroll treated as one wheel notch
const PIXELS_PER_NOTCH: f32 = 100.0;

/// Adapter that turns winit window events into orbit inputs
#[derive(Debug, Clone, Default)]
pub struct WinitInputAdapter {
    /// Current cursor position (relative to window)
    cursor: Option<(f32, f32)>,
}

impl WinitInputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one window event, `None` if the controls don't care about it
    pub fn translate(&mut self, event: &WindowEvent) -> Option<OrbitInput> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.cursor_moved(position.x as f32, position.y as f32))
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor_left();
                None
            }
            WindowEvent::MouseInput { state, button, .. } => self.mouse_input(*state, *button),
            WindowEvent::MouseWheel { delta, .. } => Some(OrbitInput::Wheel {
                delta: Self::wheel_notches(*delta),
            }),
            WindowEvent::Resized(size) => Some(OrbitInput::Resize {
                width: size.width,
                height: size.height,
            }),
            _ => None,
        }
    }

    /// Translate an event the UI overlay may already have handled.
    ///
    /// Cursor tracking always runs. When the overlay consumed the event only
    /// a drag release gets through, so a drag that ends over the overlay
    /// still finishes.
    pub fn route(&mut self, event: &WindowEvent, consumed_by_ui: bool) -> Option<OrbitInput> {
        let input = self.translate(event)?;
        Self::admit(input, consumed_by_ui)
    }

    /// Whether `input` still reaches the controls after the UI saw it
    pub fn admit(input: OrbitInput, consumed_by_ui: bool) -> Option<OrbitInput> {
        (!consumed_by_ui || input.ends_drag()).then_some(input)
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) -> OrbitInput {
        self.cursor = Some((x, y));
        OrbitInput::PointerMove { x, y }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = None;
    }

    /// A press is dropped until the cursor position is known
    pub fn mouse_input(&mut self, state: ElementState, button: MouseButton) -> Option<OrbitInput> {
        let button = Self::mouse_button(button)?;
        match state {
            ElementState::Pressed => {
                let (x, y) = self.cursor?;
                Some(OrbitInput::PointerDown { button, x, y })
            }
            ElementState::Released => Some(OrbitInput::PointerUp { button }),
        }
    }

    pub fn cursor(&self) -> Option<(f32, f32)> {
        self.cursor
    }

    /// Map winit mouse buttons onto pointer buttons
    pub fn mouse_button(button: MouseButton) -> Option<PointerButton> {
        match button {
            MouseButton::Left => Some(PointerButton::Primary),
            MouseButton::Right => Some(PointerButton::Secondary),
            MouseButton::Middle => Some(PointerButton::Middle),
            _ => None,
        }
    }

    /// Scroll amount in notches; positive scrolls away from the user
    pub fn wheel_notches(delta: MouseScrollDelta) -> f32 {
        match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_NOTCH,
        }
    }
}
