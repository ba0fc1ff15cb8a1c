// VIEW: GPU setup, shaders, assets and rendering
pub mod gpu_init;
pub mod shader;
pub mod texture;
pub mod model_loader;
pub mod render;

pub use gpu_init::GpuContext;
pub use shader::{ShaderProgram, UniformBlock, UniformKind, UniformLayout};
pub use texture::{CubemapFaces, CubemapTexture, Texture2d};
pub use model_loader::{Model, ModelData};
pub use render::{DepthTarget, Renderer};
