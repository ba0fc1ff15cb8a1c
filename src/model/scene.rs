use glam::{Mat4, Vec3};

use crate::model::camera::{Camera, Projection};

/// Static point light, uploaded once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(-3.0, 2.0, -1.0),
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::splat(0.1),
            specular: Vec3::new(1.0, 1.0, 0.8),
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

/// Texture units for the diffuse and specular maps plus the specular exponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub diffuse_unit: i32,
    pub specular_unit: i32,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self { diffuse_unit: 0, specular_unit: 1, shininess: 64.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPass {
    Scene,
    LightMarker,
    Skybox,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub pass: DrawPass,
    pub transforms: Transforms,
    pub depth_write: bool,
}

/// Ordered draw list for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneSubmission {
    pub view_position: Vec3,
    pub time: f32,
    pub draws: Vec<DrawCall>,
}

impl SceneSubmission {
    pub fn passes(&self) -> impl Iterator<Item = DrawPass> + '_ {
        self.draws.iter().map(|d| d.pass)
    }
}

/// What gets drawn: model instances, the light, and whether the light marker is shown.
#[derive(Debug, Clone)]
pub struct Scene {
    pub instances: Vec<Mat4>,
    pub light: PointLight,
    pub material: Material,
    pub show_light_marker: bool,
    pub light_marker_scale: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            instances: vec![Mat4::IDENTITY],
            light: PointLight::default(),
            material: Material::default(),
            show_light_marker: false,
            light_marker_scale: 0.2,
        }
    }
}

impl Scene {
    pub fn toggle_light_marker(&mut self) {
        self.show_light_marker = !self.show_light_marker;
    }

    pub fn light_marker_transform(&self) -> Mat4 {
        Mat4::from_translation(self.light.position) * Mat4::from_scale(Vec3::splat(self.light_marker_scale))
    }

    /// Build this frame's draw list: opaque instances, the optional light
    /// marker, then the skybox last with depth writes off.
    pub fn compose(&self, camera: &Camera, projection: &Projection, time: f32) -> SceneSubmission {
        let view = camera.view();
        let proj = projection.matrix();

        let mut draws: Vec<DrawCall> = self
            .instances
            .iter()
            .map(|model| DrawCall {
                pass: DrawPass::Scene,
                transforms: Transforms { model: *model, view, projection: proj },
                depth_write: true,
            })
            .collect();

        if self.show_light_marker {
            draws.push(DrawCall {
                pass: DrawPass::LightMarker,
                transforms: Transforms { model: self.light_marker_transform(), view, projection: proj },
                depth_write: true,
            });
        }

        draws.push(DrawCall {
            pass: DrawPass::Skybox,
            transforms: Transforms {
                model: Mat4::IDENTITY,
                view: camera.skybox_view(),
                projection: proj,
            },
            depth_write: false,
        });

        SceneSubmission { view_position: camera.position, time, draws }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection() -> Projection {
        Projection::new(800, 600, 90.0, 0.1, 1000.0)
    }

    #[test]
    fn skybox_is_drawn_last_without_depth_writes() {
        let scene = Scene::default();
        let submission = scene.compose(&Camera::default(), &projection(), 0.0);
        let passes: Vec<_> = submission.passes().collect();
        assert_eq!(passes, vec![DrawPass::Scene, DrawPass::Skybox]);

        let (last, rest) = submission.draws.split_last().unwrap();
        assert!(!last.depth_write);
        assert!(rest.iter().all(|d| d.depth_write));
    }

    #[test]
    fn light_marker_sits_between_scene_and_skybox() {
        let scene = Scene { show_light_marker: true, ..Scene::default() };
        let submission = scene.compose(&Camera::default(), &projection(), 1.5);
        let passes: Vec<_> = submission.passes().collect();
        assert_eq!(passes, vec![DrawPass::Scene, DrawPass::LightMarker, DrawPass::Skybox]);

        let marker = submission.draws[1].transforms.model;
        assert!(marker.transform_point3(Vec3::ZERO).abs_diff_eq(scene.light.position, 1e-6));
        assert!(marker.transform_vector3(Vec3::X).abs_diff_eq(Vec3::new(0.2, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn main_model_uses_identity_and_camera_view() {
        let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), 10.0, -20.0);
        let submission = Scene::default().compose(&camera, &projection(), 4.0);
        let first = submission.draws[0];
        assert_eq!(first.transforms.model, Mat4::IDENTITY);
        assert_eq!(first.transforms.view, camera.view());
        assert_eq!(first.transforms.projection, projection().matrix());
        assert_eq!(submission.view_position, camera.position);
        assert_eq!(submission.time, 4.0);
    }

    #[test]
    fn every_instance_gets_a_draw() {
        let scene = Scene {
            instances: vec![Mat4::IDENTITY, Mat4::from_translation(Vec3::X * 5.0)],
            ..Scene::default()
        };
        let submission = scene.compose(&Camera::default(), &projection(), 0.0);
        let models: Vec<_> = submission
            .draws
            .iter()
            .filter(|d| d.pass == DrawPass::Scene)
            .map(|d| d.transforms.model)
            .collect();
        assert_eq!(models, scene.instances);
    }

    #[test]
    fn skybox_view_ignores_camera_position() {
        let near = Camera::new(Vec3::ZERO, 0.0, 0.0);
        let far = Camera::new(Vec3::new(-400.0, 90.0, 17.0), 0.0, 0.0);
        let a = Scene::default().compose(&near, &projection(), 0.0);
        let b = Scene::default().compose(&far, &projection(), 0.0);
        let sky_a = a.draws.last().unwrap().transforms.view;
        let sky_b = b.draws.last().unwrap().transforms.view;
        assert_eq!(sky_b.w_axis.truncate(), Vec3::ZERO);
        assert!(sky_a.abs_diff_eq(sky_b, 1e-6));
    }

    #[test]
    fn toggle_flips_marker() {
        let mut scene = Scene::default();
        scene.toggle_light_marker();
        assert!(scene.show_light_marker);
        scene.toggle_light_marker();
        assert!(!scene.show_light_marker);
    }
}
