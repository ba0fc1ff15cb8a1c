/// Typed input events and the per-frame sampler that drains them
use std::collections::{HashSet, VecDeque};

use winit::keyboard::KeyCode;

use crate::controller::camera_controller::{CameraController, MovementIntent};
use crate::model::{Camera, PointerTracker};

/// Events emitted by the windowing layer, consumed once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key { code: KeyCode, pressed: bool },
    /// Absolute pointer position in window coordinates
    PointerMoved { x: f32, y: f32 },
    Resized { width: u32, height: u32 },
    FocusChanged(bool),
    CloseRequested,
}

impl InputEvent {
    /// Whether the event still reaches the camera when the overlay consumed it.
    /// Key releases always do, otherwise a key let go over the overlay stays held.
    pub fn survives_overlay(&self) -> bool {
        matches!(self, InputEvent::Key { pressed: false, .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    Ascend,
    Descend,
    Exit,
    ToggleLightMarker,
    ToggleHud,
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: KeyCode,
    pub back: KeyCode,
    pub strafe_left: KeyCode,
    pub strafe_right: KeyCode,
    pub ascend: KeyCode,
    pub descend: KeyCode,
    pub exit: KeyCode,
    pub toggle_light_marker: KeyCode,
    pub toggle_hud: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            back: KeyCode::KeyS,
            strafe_left: KeyCode::KeyA,
            strafe_right: KeyCode::KeyD,
            ascend: KeyCode::Space,
            descend: KeyCode::ShiftLeft,
            exit: KeyCode::Escape,
            toggle_light_marker: KeyCode::KeyL,
            toggle_hud: KeyCode::F1,
        }
    }
}

impl KeyBindings {
    pub fn key_for(&self, action: Action) -> KeyCode {
        match action {
            Action::Forward => self.forward,
            Action::Back => self.back,
            Action::StrafeLeft => self.strafe_left,
            Action::StrafeRight => self.strafe_right,
            Action::Ascend => self.ascend,
            Action::Descend => self.descend,
            Action::Exit => self.exit,
            Action::ToggleLightMarker => self.toggle_light_marker,
            Action::ToggleHud => self.toggle_hud,
        }
    }

    pub fn action_for(&self, code: KeyCode) -> Option<Action> {
        [
            Action::Forward,
            Action::Back,
            Action::StrafeLeft,
            Action::StrafeRight,
            Action::Ascend,
            Action::Descend,
            Action::Exit,
            Action::ToggleLightMarker,
            Action::ToggleHud,
        ]
        .into_iter()
        .find(|action| self.key_for(*action) == code)
    }
}

/// FIFO of events collected between two frames
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<InputEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }
}

/// Unbounded pointer position built from raw motion deltas while the cursor is grabbed.
/// Kept in f64 so long spins don't swallow sub-pixel deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualCursor {
    pub x: f64,
    pub y: f64,
}

impl VirtualCursor {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn moved_by(&mut self, dx: f64, dy: f64) -> InputEvent {
        self.x += dx;
        self.y += dy;
        InputEvent::PointerMoved { x: self.x as f32, y: self.y as f32 }
    }
}

/// Held keys, sampled level-triggered every frame
#[derive(Debug, Default)]
pub struct InputState {
    pub pressed_keys: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_key_pressed(&self, code: KeyCode) -> bool {
        self.pressed_keys.contains(&code)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }

    pub fn movement(&self, bindings: &KeyBindings) -> MovementIntent {
        MovementIntent {
            forward: self.is_key_pressed(bindings.forward),
            back: self.is_key_pressed(bindings.back),
            strafe_left: self.is_key_pressed(bindings.strafe_left),
            strafe_right: self.is_key_pressed(bindings.strafe_right),
            ascend: self.is_key_pressed(bindings.ascend),
            descend: self.is_key_pressed(bindings.descend),
        }
    }
}

/// What one drain of the event queue produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub movement: MovementIntent,
    pub exit_requested: bool,
    pub resized: Option<(u32, u32)>,
    pub toggle_light_marker: bool,
    pub toggle_hud: bool,
    pub pointer_samples: usize,
}

/// Drains queued events into key state and camera orientation
#[derive(Debug, Clone, Default)]
pub struct InputSampler {
    pub bindings: KeyBindings,
}

impl InputSampler {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    /// Process events in arrival order. Pointer samples hit the camera one by
    /// one; an exit key or close request stops the drain immediately.
    pub fn drain(
        &self,
        queue: &mut EventQueue,
        state: &mut InputState,
        camera: &mut Camera,
        tracker: &mut PointerTracker,
        controller: &CameraController,
    ) -> FrameInput {
        let mut frame = FrameInput::default();

        for event in queue.drain() {
            match event {
                InputEvent::Key { code, pressed: true } => {
                    // Toggles fire on the press edge only, not on key repeat.
                    let fresh = state.pressed_keys.insert(code);
                    match self.bindings.action_for(code) {
                        Some(Action::Exit) => {
                            frame.exit_requested = true;
                            break;
                        }
                        Some(Action::ToggleLightMarker) if fresh => {
                            frame.toggle_light_marker = !frame.toggle_light_marker;
                        }
                        Some(Action::ToggleHud) if fresh => {
                            frame.toggle_hud = !frame.toggle_hud;
                        }
                        _ => {}
                    }
                }
                InputEvent::Key { code, pressed: false } => {
                    state.pressed_keys.remove(&code);
                }
                InputEvent::PointerMoved { x, y } => {
                    controller.apply_pointer(camera, tracker, x, y);
                    frame.pointer_samples += 1;
                }
                InputEvent::Resized { width, height } => {
                    frame.resized = Some((width, height));
                }
                InputEvent::FocusChanged(focused) => {
                    if !focused {
                        state.clear_keys();
                    }
                    tracker.reset();
                }
                InputEvent::CloseRequested => {
                    frame.exit_requested = true;
                    break;
                }
            }
        }

        frame.movement = state.movement(&self.bindings);
        frame
    }
}
