use glam::{Mat3, Mat4, Vec3};

/// Pitch limit in degrees; keeps `front` away from the up axis.
pub const PITCH_LIMIT: f32 = 89.0;

/// First-person camera. Angles are in degrees.
///
/// `front` is cached and only rebuilt through [`Camera::set_orientation`], so it
/// always matches `(yaw, pitch)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    front: Vec3,
    pub up: Vec3,
    yaw: f32,
    pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 3.0, 0.0), -90.0, 0.0)
    }
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            yaw: 0.0,
            pitch: 0.0,
        };
        camera.set_orientation(yaw, pitch);
        camera
    }

    /// Spherical to cartesian: unit look direction for `(yaw, pitch)` in degrees.
    pub fn direction_from(yaw: f32, pitch: f32) -> Vec3 {
        let (y, p) = (yaw.to_radians(), pitch.to_radians());
        Vec3::new(y.cos() * p.cos(), p.sin(), y.sin() * p.cos()).normalize()
    }

    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.front = Self::direction_from(self.yaw, self.pitch);
    }

    pub fn yaw(&self) -> f32 { self.yaw }

    pub fn pitch(&self) -> f32 { self.pitch }

    pub fn front(&self) -> Vec3 { self.front }

    pub fn target(&self) -> Vec3 { self.position + self.front }

    /// Strafe axis.
    pub fn right(&self) -> Vec3 { self.front.cross(self.up).normalize() }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target(), self.up)
    }

    /// View matrix with the translation dropped, so the skybox follows the camera.
    pub fn skybox_view(&self) -> Mat4 {
        strip_translation(self.view())
    }
}

pub fn strip_translation(view: Mat4) -> Mat4 {
    Mat4::from_mat3(Mat3::from_mat4(view))
}

/// Perspective parameters. The aspect ratio follows the surface size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, fov_y_degrees: f32, z_near: f32, z_far: f32) -> Self {
        let mut projection = Self { fov_y_degrees, aspect: 1.0, z_near, z_far };
        projection.set_aspect(width, height);
        projection
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        // A minimized window reports 0x0; keep the last usable ratio.
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.z_near, self.z_far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_front_looks_down_negative_z() {
        let camera = Camera::default();
        assert!(camera.front().abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));
        assert_eq!(camera.up, Vec3::Y);
    }

    #[test]
    fn front_is_unit_length_across_orientations() {
        let mut yaw = -1080.0;
        while yaw <= 1080.0 {
            let mut pitch = -89.0;
            while pitch <= 89.0 {
                let len = Camera::direction_from(yaw, pitch).length();
                assert!((len - 1.0).abs() < 1e-5, "yaw {yaw} pitch {pitch} len {len}");
                pitch += 7.25;
            }
            yaw += 13.5;
        }
    }

    #[test]
    fn set_orientation_clamps_pitch() {
        let mut camera = Camera::default();
        camera.set_orientation(0.0, 135.0);
        assert_eq!(camera.pitch(), PITCH_LIMIT);
        camera.set_orientation(0.0, -400.0);
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
        assert!(camera.front().cross(camera.up).length() > 0.0);
    }

    #[test]
    fn right_is_perpendicular_to_front_and_up() {
        let camera = Camera::new(Vec3::ZERO, 33.0, 20.0);
        let right = camera.right();
        assert!((right.length() - 1.0).abs() < 1e-5);
        assert!(right.dot(camera.front()).abs() < 1e-5);
        assert!(right.dot(camera.up).abs() < 1e-5);
    }

    #[test]
    fn skybox_view_has_no_translation() {
        for position in [Vec3::ZERO, Vec3::new(12.0, -4.0, 300.0), Vec3::splat(-1e4)] {
            let camera = Camera::new(position, 47.0, -12.0);
            let sky = camera.skybox_view();
            assert_eq!(sky.w_axis.truncate(), Vec3::ZERO);
            assert_eq!(sky.w_axis.w, 1.0);
        }
    }

    #[test]
    fn skybox_view_keeps_rotation() {
        let a = Camera::new(Vec3::ZERO, 10.0, 5.0).skybox_view();
        let b = Camera::new(Vec3::new(50.0, 2.0, -9.0), 10.0, 5.0).skybox_view();
        assert!(a.abs_diff_eq(b, 1e-5));
    }

    #[test]
    fn projection_ignores_degenerate_size() {
        let mut projection = Projection::new(800, 600, 90.0, 0.1, 1000.0);
        projection.set_aspect(0, 0);
        assert!((projection.aspect - 800.0 / 600.0).abs() < 1e-6);
        projection.set_aspect(1920, 1080);
        assert!((projection.aspect - 16.0 / 9.0).abs() < 1e-6);
    }
}
