use std::path::PathBuf;

/// Image decode failures. For cubemap faces these are downgraded to warnings.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("face {path} is {actual:?}, expected {expected:?}")]
    SizeMismatch {
        path: PathBuf,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("face {path} is {width}x{height}, cube faces must be square")]
    NotSquare { path: PathBuf, width: u32, height: u32 },
}

/// Errors from parsing a model file into mesh batches.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to load model {path}: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("mesh {0:?} has no position data")]
    MissingPositions(String),

    #[error("model {0} contains no drawable meshes")]
    Empty(PathBuf),
}

/// Errors from the named-uniform interface of a shader program.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniformError {
    #[error("unknown uniform {0:?}")]
    Unknown(String),

    #[error("uniform {name:?} is {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("uniform buffer holds {capacity} draws per frame")]
    SlotsExhausted { capacity: usize },
}

/// Unrecoverable startup failures. The process exits with a non-zero status.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("shader {label} failed to compile: {message}")]
    Shader { label: &'static str, message: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Uniform(#[from] UniformError),
}

/// Per-frame failures; the caller decides whether the loop survives them.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("surface unavailable: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error(transparent)]
    Uniform(#[from] UniformError),
}

#[derive(Debug, thiserror::Error)]
pub enum SkyviewError {
    #[error(transparent)]
    Init(#[from] InitError),

    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
