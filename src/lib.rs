use std::sync::Arc;

use winit::event::{ElementState, MouseButton};
use winit::keyboard::{Key, ModifiersState};
use winit::window::Window;

pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod renderer;
pub mod scene;
pub mod shader;

pub use config::{ViewerConfig, ZoomTarget};
pub use error::{ShaderError, TextureError, ViewerError};

use input::{InputController, KeyAction};
use model::TextureImage;
use renderer::Renderer;
use scene::SceneState;

/// Scene and input state for a window whose drawable area is
/// `width` x `height` physical pixels, which may differ from the size
/// asked for in `config`.
fn initial_state(config: &ViewerConfig, width: u32, height: u32) -> (SceneState, InputController) {
    let mut scene = SceneState::from_config(config);
    scene.resize(width, height);
    (scene, InputController::new(width, height))
}

/// The window, what is shown in it and how input drives it.
pub struct State {
    window: Arc<Window>,
    pub scene: SceneState,
    pub input: InputController,
    renderer: Renderer,
}

impl State {
    pub fn new(window: Window, config: &ViewerConfig) -> Result<Self, ViewerError> {
        let window = Arc::new(window);
        let size = window.inner_size();
        log::info!("Window size: {}x{}", size.width, size.height);

        let texture = TextureImage::load_or_placeholder(&config.texture_path);
        let renderer = Renderer::new(window.clone(), &texture)?;

        let (scene, input) = initial_state(config, size.width, size.height);

        Ok(Self {
            window,
            scene,
            input,
            renderer,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.scene.resize(width, height) {
            self.renderer.resize(width, height);
        }
    }

    pub fn modifiers_changed(&mut self, modifiers: ModifiersState) {
        self.input.modifiers_changed(modifiers);
    }

    pub fn mouse_button(&mut self, button: MouseButton, state: ElementState) {
        self.input.mouse_button(button, state);
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        self.input.cursor_moved(x, y, &mut self.scene);
    }

    pub fn key_pressed(&mut self, key: &Key) -> KeyAction {
        self.input.key_pressed(key)
    }

    /// Draws one frame. A lost or outdated surface is reconfigured and the
    /// frame skipped; only running out of memory is fatal.
    pub fn render(&mut self) -> Result<(), ViewerError> {
        let plan = self.scene.frame();
        match self.renderer.render(&plan) {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost, reconfiguring");
                self.renderer.reconfigure();
                Ok(())
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                Ok(())
            }
            Err(e) => Err(ViewerError::render(e)),
        }
    }
}
