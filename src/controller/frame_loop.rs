use crate::config::Config;
use crate::controller::camera_controller::CameraController;
use crate::controller::input::{EventQueue, FrameInput, InputEvent, InputSampler, InputState, KeyBindings};
use crate::model::{Camera, FrameTiming, PointerTracker, Projection, Scene, SceneSubmission};

/// Running until a close is observed; Terminated never goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// Everything the renderer needs from one iteration of the loop
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub submission: SceneSubmission,
    pub resized: Option<(u32, u32)>,
    pub delta: f32,
}

/// Smoothed frames-per-second for the overlay
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    pub fps: f32,
    frame_count: u32,
    timer: f32,
}

impl FpsCounter {
    pub fn record(&mut self, dt: f32) {
        self.frame_count += 1;
        self.timer += dt;
        if self.timer >= 1.0 {
            self.fps = self.frame_count as f32 / self.timer;
            self.frame_count = 0;
            self.timer = 0.0;
        }
    }
}

/// Application state owned by the main loop and handed out by reference
pub struct AppState {
    pub camera: Camera,
    pub projection: Projection,
    pub pointer: PointerTracker,
    pub timing: FrameTiming,
    pub input_state: InputState,
    pub events: EventQueue,
    pub camera_controller: CameraController,
    pub sampler: InputSampler,
    pub scene: Scene,
    pub fps: FpsCounter,
    pub show_hud: bool,
    state: LoopState,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let scene = Scene {
            show_light_marker: config.show_light_marker,
            ..Scene::default()
        };
        Self {
            camera: Camera::new(config.camera_start, -90.0, 0.0),
            projection: Projection::new(
                config.width,
                config.height,
                config.fov_y_degrees,
                config.z_near,
                config.z_far,
            ),
            pointer: PointerTracker::new(config.width as f32 / 2.0, config.height as f32 / 2.0),
            timing: FrameTiming::new(),
            input_state: InputState::new(),
            events: EventQueue::new(),
            camera_controller: CameraController::new(config.move_speed, config.mouse_sensitivity),
            sampler: InputSampler::new(KeyBindings::default()),
            scene,
            fps: FpsCounter::default(),
            show_hud: config.show_hud,
            state: LoopState::Running,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn push_event(&mut self, event: InputEvent) {
        if self.is_running() {
            self.events.push(event);
        }
    }

    pub fn terminate(&mut self) {
        if self.state != LoopState::Terminated {
            tracing::info!("loop terminated");
            self.state = LoopState::Terminated;
        }
    }

    /// One loop iteration against the real clock.
    pub fn step(&mut self) -> Option<FrameOutcome> {
        let now = self.timing.elapsed();
        self.step_at(now)
    }

    /// Advance timing, apply pending input and compose the frame's draw list.
    /// Returns `None` once the loop has terminated.
    pub fn step_at(&mut self, now: f32) -> Option<FrameOutcome> {
        if !self.is_running() {
            return None;
        }

        let dt = self.timing.advance_to(now);

        let input: FrameInput = self.sampler.drain(
            &mut self.events,
            &mut self.input_state,
            &mut self.camera,
            &mut self.pointer,
            &self.camera_controller,
        );

        if input.exit_requested {
            self.terminate();
            return None;
        }

        if let Some((width, height)) = input.resized {
            self.projection.set_aspect(width, height);
        }
        if input.toggle_light_marker {
            self.scene.toggle_light_marker();
            tracing::debug!(shown = self.scene.show_light_marker, "light marker toggled");
        }
        if input.toggle_hud {
            self.show_hud = !self.show_hud;
        }

        self.camera_controller.apply_movement(&mut self.camera, input.movement, dt);
        self.fps.record(dt);

        let submission = self.scene.compose(&self.camera, &self.projection, now);
        Some(FrameOutcome { submission, resized: input.resized, delta: dt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DrawPass;
    use glam::Vec3;
    use winit::keyboard::KeyCode;

    fn app() -> AppState {
        AppState::new(&Config::default())
    }

    #[test]
    fn starts_running_at_reference_pose() {
        let app = app();
        assert_eq!(app.state(), LoopState::Running);
        assert_eq!(app.camera.position, Vec3::new(0.0, 3.0, 0.0));
        assert!(app.camera.front().abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn escape_terminates_and_state_is_absorbing() {
        let mut app = app();
        app.push_event(InputEvent::Key { code: KeyCode::Escape, pressed: true });
        assert!(app.step_at(0.1).is_none());
        assert_eq!(app.state(), LoopState::Terminated);

        app.push_event(InputEvent::Key { code: KeyCode::KeyW, pressed: true });
        assert!(app.events.is_empty());
        assert!(app.step_at(0.2).is_none());
        assert_eq!(app.state(), LoopState::Terminated);
    }

    #[test]
    fn held_forward_moves_by_speed_times_delta() {
        let mut app = app();
        app.step_at(0.0);
        app.push_event(InputEvent::Key { code: KeyCode::KeyW, pressed: true });
        let outcome = app.step_at(0.5).unwrap();
        assert!((outcome.delta - 0.5).abs() < 1e-6);
        assert!(app.camera.position.abs_diff_eq(Vec3::new(0.0, 3.0, -4.0), 1e-4));
    }

    #[test]
    fn zero_delta_frame_does_not_move() {
        let mut app = app();
        app.push_event(InputEvent::Key { code: KeyCode::KeyW, pressed: true });
        app.step_at(1.0);
        let before = app.camera.position;
        app.step_at(1.0);
        assert_eq!(app.camera.position, before);
    }

    #[test]
    fn resize_updates_projection_aspect() {
        let mut app = app();
        app.push_event(InputEvent::Resized { width: 1600, height: 900 });
        let outcome = app.step_at(0.016).unwrap();
        assert_eq!(outcome.resized, Some((1600, 900)));
        assert!((app.projection.aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn light_marker_toggle_reaches_submission() {
        let mut app = app();
        let outcome = app.step_at(0.0).unwrap();
        assert!(!outcome.submission.passes().any(|p| p == DrawPass::LightMarker));

        app.push_event(InputEvent::Key { code: KeyCode::KeyL, pressed: true });
        let outcome = app.step_at(0.016).unwrap();
        assert!(outcome.submission.passes().any(|p| p == DrawPass::LightMarker));
        assert_eq!(outcome.submission.passes().last(), Some(DrawPass::Skybox));
    }

    #[test]
    fn pointer_then_move_uses_new_heading() {
        let mut app = app();
        app.push_event(InputEvent::PointerMoved { x: 400.0, y: 300.0 });
        app.push_event(InputEvent::PointerMoved { x: 1300.0, y: 300.0 });
        app.push_event(InputEvent::Key { code: KeyCode::KeyW, pressed: true });
        app.step_at(0.0);
        // yaw -90 + 90 = 0 => facing +X
        assert!(app.camera.front().abs_diff_eq(Vec3::X, 1e-5));
        app.step_at(1.0);
        assert!(app.camera.position.abs_diff_eq(Vec3::new(8.0, 3.0, 0.0), 1e-3));
    }

    #[test]
    fn fps_counter_averages_over_a_second() {
        let mut fps = FpsCounter::default();
        for _ in 0..60 {
            fps.record(0.02);
        }
        assert!((fps.fps - 50.0).abs() < 1.0);
    }
}
