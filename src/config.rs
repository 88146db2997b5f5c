use std::path::PathBuf;

pub const WINDOW_TITLE: &str = "3D Chair";
pub const DEFAULT_TEXTURE: &str = "wood_texture.jpg";
pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// What the Alt + right-drag zoom gesture acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ZoomTarget {
    /// The zoom factor is tracked but not applied to anything.
    #[default]
    Detached,
    /// The zoom factor multiplies the chair's scale.
    Chair,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub texture_path: PathBuf,
    pub zoom_target: ZoomTarget,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: WINDOW_TITLE.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            texture_path: PathBuf::from(DEFAULT_TEXTURE),
            zoom_target: ZoomTarget::default(),
        }
    }
}
