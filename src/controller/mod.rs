// CONTROLLER: input sampling, camera control and the frame loop
pub mod input;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{Action, EventQueue, FrameInput, InputEvent, InputSampler, InputState, KeyBindings, VirtualCursor};
pub use camera_controller::{CameraController, MovementIntent};
pub use frame_loop::{AppState, FpsCounter, FrameOutcome, LoopState};
