//! Translation from winit window events to [`SceneInput`].

use orrery_space::SceneInput;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Pixels of touchpad scroll that count as one wheel notch.
const PIXELS_PER_LINE: f32 = 40.0;

/// Tracks the cursor so button and wheel events, which carry no position,
/// can be reported where the pointer is.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputAdapter {
    cursor: (f32, f32),
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> (f32, f32) {
        self.cursor
    }

    pub fn translate(&mut self, event: &WindowEvent) -> Option<SceneInput> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.cursor_moved(position.x as f32, position.y as f32))
            }
            WindowEvent::MouseInput { state, button, .. } => self.mouse_button(*button, *state),
            WindowEvent::MouseWheel { delta, .. } => self.wheel(*delta),
            WindowEvent::CursorLeft { .. } => Some(SceneInput::PointerUp),
            WindowEvent::Resized(size) => Some(Self::resized(*size)),
            _ => None,
        }
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) -> SceneInput {
        self.cursor = (x, y);
        SceneInput::PointerMove { x, y }
    }

    /// Only the left button drags.
    pub fn mouse_button(&self, button: MouseButton, state: ElementState) -> Option<SceneInput> {
        if button != MouseButton::Left {
            return None;
        }
        let (x, y) = self.cursor;
        Some(match state {
            ElementState::Pressed => SceneInput::PointerDown { x, y },
            ElementState::Released => SceneInput::PointerUp,
        })
    }

    /// winit reports scrolling up as positive; the scene zooms in on negative.
    pub fn wheel(&self, delta: MouseScrollDelta) -> Option<SceneInput> {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
        };
        if lines == 0.0 {
            return None;
        }
        let (x, y) = self.cursor;
        Some(SceneInput::Wheel { x, y, delta: -lines })
    }

    pub fn resized(size: PhysicalSize<u32>) -> SceneInput {
        SceneInput::Resize {
            width: size.width as f32,
            height: size.height as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_press_uses_last_cursor() {
        let mut adapter = InputAdapter::new();
        adapter.cursor_moved(120.0, 45.0);
        assert_eq!(
            adapter.mouse_button(MouseButton::Left, ElementState::Pressed),
            Some(SceneInput::PointerDown { x: 120.0, y: 45.0 })
        );
        assert_eq!(
            adapter.mouse_button(MouseButton::Left, ElementState::Released),
            Some(SceneInput::PointerUp)
        );
    }

    #[test]
    fn test_other_buttons_ignored() {
        let adapter = InputAdapter::new();
        assert_eq!(adapter.mouse_button(MouseButton::Right, ElementState::Pressed), None);
        assert_eq!(adapter.mouse_button(MouseButton::Middle, ElementState::Pressed), None);
    }

    #[test]
    fn test_scroll_up_zooms_in() {
        let mut adapter = InputAdapter::new();
        adapter.cursor_moved(10.0, 20.0);
        let Some(SceneInput::Wheel { x, y, delta }) = adapter.wheel(MouseScrollDelta::LineDelta(0.0, 1.0))
        else {
            panic!("expected wheel input");
        };
        assert_eq!((x, y), (10.0, 20.0));
        assert!(delta < 0.0);

        let Some(SceneInput::Wheel { delta, .. }) =
            adapter.wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -80.0)))
        else {
            panic!("expected wheel input");
        };
        assert_eq!(delta, 2.0);
    }

    #[test]
    fn test_horizontal_scroll_ignored() {
        let adapter = InputAdapter::new();
        assert_eq!(adapter.wheel(MouseScrollDelta::LineDelta(3.0, 0.0)), None);
    }

    #[test]
    fn test_resize_is_physical() {
        assert_eq!(
            InputAdapter::resized(PhysicalSize::new(800, 600)),
            SceneInput::Resize {
                width: 800.0,
                height: 600.0
            }
        );
    }
}
