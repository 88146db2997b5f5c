//! Mouse and keyboard handling.
//!
//! Alt + left drag orbits the camera, Alt + right drag zooms. Any other
//! button press, and every release, drops back to idle.

use winit::event::{ElementState, MouseButton};
use winit::keyboard::{Key, ModifiersState, NamedKey};

use crate::scene::SceneState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    #[default]
    Idle,
    Rotating,
    Zooming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    AltPressed,
    OtherKey,
}

pub struct InputController {
    pub mode: DragMode,
    pub modifiers: ModifiersState,
    last_cursor: (f64, f64),
}

impl InputController {
    /// The cursor is assumed to start at the window center.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            mode: DragMode::Idle,
            modifiers: ModifiersState::empty(),
            last_cursor: (width as f64 / 2.0, height as f64 / 2.0),
        }
    }

    pub fn last_cursor(&self) -> (f64, f64) {
        self.last_cursor
    }

    pub fn modifiers_changed(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    pub fn mouse_button(&mut self, button: MouseButton, state: ElementState) -> DragMode {
        let alt = self.modifiers.alt_key();
        self.mode = match (button, state, alt) {
            (MouseButton::Left, ElementState::Pressed, true) => DragMode::Rotating,
            (MouseButton::Right, ElementState::Pressed, true) => DragMode::Zooming,
            _ => DragMode::Idle,
        };
        log::trace!("{:?} {:?} (alt: {}) -> {:?}", button, state, alt, self.mode);
        self.mode
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64, scene: &mut SceneState) {
        let (last_x, last_y) = self.last_cursor;

        match self.mode {
            DragMode::Rotating => {
                let dx = (x - last_x) as f32;
                let dy = (last_y - y) as f32;
                scene.camera.process_mouse(dx, dy);
            }
            DragMode::Zooming => {
                if y < last_y {
                    scene.zoom.grow();
                } else if y > last_y {
                    scene.zoom.shrink();
                }
            }
            DragMode::Idle => scene.camera.refresh_forward(),
        }

        self.last_cursor = (x, y);
    }

    pub fn key_pressed(&mut self, key: &Key) -> KeyAction {
        match key {
            Key::Named(NamedKey::Alt) => {
                log::info!("You pressed ALT!");
                KeyAction::AltPressed
            }
            _ if self.modifiers.alt_key() => {
                log::info!("You pressed ALT!");
                KeyAction::AltPressed
            }
            _ => {
                log::info!("Press a key!");
                KeyAction::OtherKey
            }
        }
    }
}
