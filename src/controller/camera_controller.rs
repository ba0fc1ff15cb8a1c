use glam::Vec3;
use crate::model::{Camera, PointerTracker};

/// Which movement keys are held this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntent {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub ascend: bool,
    pub descend: bool,
}

impl MovementIntent {
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Handles camera movement and orientation
#[derive(Debug, Clone)]
pub struct CameraController {
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(8.0, 0.1)
    }
}

impl CameraController {
    pub fn new(move_speed: f32, mouse_sensitivity: f32) -> Self {
        Self { move_speed, mouse_sensitivity }
    }

    /// Feed one absolute pointer sample into the camera orientation.
    pub fn apply_pointer(&self, camera: &mut Camera, tracker: &mut PointerTracker, x: f32, y: f32) {
        let (dx, dy) = tracker.sample(x, y);
        self.apply_look(camera, dx, dy);
    }

    /// Apply a look delta in pointer units (`dy` positive = up).
    pub fn apply_look(&self, camera: &mut Camera, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let yaw = camera.yaw() + dx * self.mouse_sensitivity;
        let pitch = camera.pitch() + dy * self.mouse_sensitivity;
        camera.set_orientation(yaw, pitch);
    }

    /// Each held key adds its own displacement; diagonals are not normalized.
    pub fn apply_movement(&self, camera: &mut Camera, intent: MovementIntent, dt: f32) {
        let step = self.move_speed * dt;
        if step == 0.0 || intent.is_idle() {
            return;
        }

        let front = camera.front();
        let right = camera.right();

        if intent.forward {
            camera.position += front * step;
        }
        if intent.back {
            camera.position -= front * step;
        }
        if intent.strafe_left {
            camera.position -= right * step;
        }
        if intent.strafe_right {
            camera.position += right * step;
        }
        if intent.ascend {
            camera.position += Vec3::Y * step;
        }
        if intent.descend {
            camera.position -= Vec3::Y * step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::camera::PITCH_LIMIT;

    fn forward() -> MovementIntent {
        MovementIntent { forward: true, ..Default::default() }
    }

    #[test]
    fn zero_dt_leaves_position_untouched() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        let before = camera.position;
        let all = MovementIntent {
            forward: true,
            back: false,
            strafe_left: true,
            strafe_right: false,
            ascend: true,
            descend: false,
        };
        controller.apply_movement(&mut camera, all, 0.0);
        assert_eq!(camera.position, before);
    }

    #[test]
    fn forward_distance_is_frame_rate_independent() {
        let controller = CameraController::default();
        let total = 1.2_f32;

        for steps in [1usize, 3, 60, 144, 1000] {
            let mut camera = Camera::new(Vec3::ZERO, 25.0, 10.0);
            let front = camera.front();
            let dt = total / steps as f32;
            for _ in 0..steps {
                controller.apply_movement(&mut camera, forward(), dt);
            }
            let expected = front * controller.move_speed * total;
            assert!(
                camera.position.abs_diff_eq(expected, 2e-3),
                "{steps} steps: {:?} vs {:?}",
                camera.position,
                expected
            );
        }
    }

    #[test]
    fn opposite_keys_cancel() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        let start = camera.position;
        let intent = MovementIntent {
            forward: true,
            back: true,
            strafe_left: true,
            strafe_right: true,
            ascend: true,
            descend: true,
        };
        controller.apply_movement(&mut camera, intent, 0.5);
        assert!(camera.position.abs_diff_eq(start, 1e-5));
    }

    #[test]
    fn diagonal_is_not_normalized() {
        let controller = CameraController::default();
        let mut camera = Camera::new(Vec3::ZERO, -90.0, 0.0);
        let intent = MovementIntent { forward: true, strafe_right: true, ..Default::default() };
        controller.apply_movement(&mut camera, intent, 1.0);
        let expected = 8.0 * std::f32::consts::SQRT_2;
        assert!((camera.position.length() - expected).abs() < 1e-4);
    }

    #[test]
    fn vertical_fly_uses_world_up() {
        let controller = CameraController::default();
        let mut camera = Camera::new(Vec3::ZERO, 0.0, 60.0);
        controller.apply_movement(&mut camera, MovementIntent { ascend: true, ..Default::default() }, 0.25);
        assert!(camera.position.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-6));
    }

    #[test]
    fn first_pointer_sample_does_not_rotate() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        let mut tracker = PointerTracker::default();
        controller.apply_pointer(&mut camera, &mut tracker, 1234.0, -77.0);
        assert_eq!(camera.yaw(), -90.0);
        assert_eq!(camera.pitch(), 0.0);
    }

    #[test]
    fn pointer_delta_turns_yaw_by_sensitivity() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        let mut tracker = PointerTracker::default();
        assert!(camera.front().abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));

        controller.apply_pointer(&mut camera, &mut tracker, 400.0, 300.0);
        controller.apply_pointer(&mut camera, &mut tracker, 500.0, 300.0);

        assert!((camera.yaw() - (-80.0)).abs() < 1e-4);
        assert_eq!(camera.pitch(), 0.0);
        let expected = Camera::direction_from(-80.0, 0.0);
        assert!(camera.front().abs_diff_eq(expected, 1e-6));
        assert!((camera.front().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn pitch_stays_clamped_under_any_pointer_sequence() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        let mut tracker = PointerTracker::default();
        let mut y = 0.0;
        let moves = [-5000.0, 120.0, 9000.0, -3.0, -20000.0, 15000.0, 1.0];
        for dy in moves {
            y += dy;
            controller.apply_pointer(&mut camera, &mut tracker, 0.0, y);
            assert!(camera.pitch() >= -PITCH_LIMIT && camera.pitch() <= PITCH_LIMIT);
            assert!((camera.front().length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn moving_pointer_up_pitches_up() {
        let controller = CameraController::default();
        let mut camera = Camera::default();
        let mut tracker = PointerTracker::default();
        controller.apply_pointer(&mut camera, &mut tracker, 0.0, 100.0);
        controller.apply_pointer(&mut camera, &mut tracker, 0.0, 50.0);
        assert!((camera.pitch() - 5.0).abs() < 1e-5);
        assert!(camera.front().y > 0.0);
    }
}
