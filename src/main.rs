use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use winit::{
    dpi::PhysicalSize,
    event::*,
    event_loop::EventLoop,
    window::WindowBuilder,
};

use chair_viewer::{
    config::{DEFAULT_HEIGHT, DEFAULT_TEXTURE, DEFAULT_WIDTH, WINDOW_TITLE},
    State, ViewerConfig, ViewerError, ZoomTarget,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image used as the chair's diffuse texture
    #[arg(long, default_value = DEFAULT_TEXTURE)]
    texture: PathBuf,

    /// Initial window width in pixels
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,

    /// What Alt + right drag scales
    #[arg(long, value_enum, default_value_t = ZoomTarget::Detached)]
    zoom_target: ZoomTarget,
}

impl Args {
    fn into_config(self) -> ViewerConfig {
        ViewerConfig {
            title: WINDOW_TITLE.to_string(),
            width: self.width.max(1),
            height: self.height.max(1),
            texture_path: self.texture,
            zoom_target: self.zoom_target,
        }
    }
}

fn run(config: ViewerConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()
        .map_err(ViewerError::graphics_init)
        .context("failed to create event loop")?;

    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .with_visible(true)
        .build(&event_loop)
        .map_err(ViewerError::graphics_init)
        .context("failed to create window")?;

    let mut state = State::new(window, &config)?;
    let mut failure: Option<ViewerError> = None;

    event_loop
        .run(|event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                match event {
                    WindowEvent::ModifiersChanged(modifiers) => {
                        state.modifiers_changed(modifiers.state());
                    }
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                logical_key,
                                state: ElementState::Pressed,
                                ..
                            },
                        ..
                    } => {
                        state.key_pressed(&logical_key);
                    }
                    WindowEvent::MouseInput { state: button_state, button, .. } => {
                        state.mouse_button(button, button_state);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        state.cursor_moved(position.x, position.y);
                    }
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        state.resize(new_size.width, new_size.height);
                    }
                    WindowEvent::RedrawRequested => {
                        if let Err(e) = state.render() {
                            failure = Some(e);
                            window_target.exit();
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                state.window().request_redraw();
            }
            _ => {}
        })
        .map_err(ViewerError::render)
        .context("event loop terminated abnormally")?;

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let config = Args::parse().into_config();
    log::debug!("{:?}", config);

    if let Err(err) = run(config) {
        log::error!("{:#}", err);
        let code = err
            .downcast_ref::<ViewerError>()
            .map_or(1, ViewerError::exit_code);
        std::process::exit(code);
    }
}
