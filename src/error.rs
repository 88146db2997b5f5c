use std::fmt;
use std::path::PathBuf;

/// Pipeline stage a piece of shader text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Vertex => write!(f, "vertex"),
            StageKind::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ShaderError {
    #[error("failed to compile {stage} stage of `{label}`:\n{log}")]
    Compile {
        label: String,
        stage: StageKind,
        log: String,
    },

    #[error("failed to link `{label}`: {reason}")]
    Link { label: String, reason: String },

    #[error("vertex layout `{layout}` does not match program `{label}`: {reason}")]
    LayoutMismatch {
        label: String,
        layout: String,
        reason: String,
    },
}

impl ShaderError {
    /// Diagnostic text suitable for printing to the user.
    pub fn log(&self) -> &str {
        match self {
            ShaderError::Compile { log, .. } => log,
            ShaderError::Link { reason, .. } => reason,
            ShaderError::LayoutMismatch { reason, .. } => reason,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TextureError {
    #[error("failed to open texture {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture {path} has zero size ({width}x{height})")]
    Empty {
        path: PathBuf,
        width: u32,
        height: u32,
    },
}

/// Top level failure of the viewer.
#[derive(thiserror::Error, Debug)]
pub enum ViewerError {
    #[error("graphics initialization failed: {0}")]
    GraphicsInit(String),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("render error: {0}")]
    Render(String),
}

impl ViewerError {
    pub fn graphics_init<T: ToString>(msg: T) -> Self {
        ViewerError::GraphicsInit(msg.to_string())
    }

    pub fn render<T: ToString>(msg: T) -> Self {
        ViewerError::Render(msg.to_string())
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            ViewerError::GraphicsInit(_) => -1,
            ViewerError::Shader(_) => 1,
            ViewerError::Render(_) => 1,
        }
    }
}
