// MODEL: camera, pointer, timing and scene state
pub mod camera;
pub mod pointer;
pub mod timing;
pub mod scene;

pub use camera::{Camera, Projection};
pub use pointer::PointerTracker;
pub use timing::FrameTiming;
pub use scene::{DrawCall, DrawPass, Material, PointLight, Scene, SceneSubmission, Transforms};
