// config.rs - Command-line interface and runtime configuration
use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;

/// Cubemap face files in layer order: +X, -X, +Y, -Y, +Z, -Z.
pub const SKYBOX_FACES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

#[derive(Parser, Debug, Clone)]
#[command(name = "skyview")]
#[command(about = "Free-fly camera over a textured model inside a cubemap skybox", long_about = None)]
pub struct Cli {
    /// Root directory holding models/ and textures/
    #[arg(long, default_value = "assets")]
    pub assets: PathBuf,

    /// Model file, relative to the asset root unless absolute
    #[arg(long, default_value = "models/scene.glb")]
    pub model: PathBuf,

    /// Initial window width
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Camera movement speed in units per second
    #[arg(long, default_value_t = 8.0)]
    pub speed: f32,

    /// Degrees of rotation per pixel of pointer movement
    #[arg(long, default_value_t = 0.1)]
    pub sensitivity: f32,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 90.0)]
    pub fov: f32,

    /// Draw a small cube at the point light position
    #[arg(long = "show-light-marker", default_value = "false")]
    pub show_light_marker: bool,

    /// Start with the debug overlay hidden
    #[arg(long = "no-hud", default_value = "false")]
    pub no_hud: bool,

    /// Present without waiting for vertical sync
    #[arg(long = "no-vsync", default_value = "false")]
    pub no_vsync: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub title: String,
    pub asset_root: PathBuf,
    pub model_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub camera_start: Vec3,
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub clear_color: [f64; 4],
    pub show_light_marker: bool,
    pub show_hud: bool,
    pub vsync: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "skyview".to_string(),
            asset_root: PathBuf::from("assets"),
            model_path: PathBuf::from("models/scene.glb"),
            width: 800,
            height: 600,
            camera_start: Vec3::new(0.0, 3.0, 0.0),
            move_speed: 8.0,
            mouse_sensitivity: 0.1,
            fov_y_degrees: 90.0,
            z_near: 0.1,
            z_far: 1000.0,
            clear_color: [0.2, 0.4, 0.6, 1.0],
            show_light_marker: false,
            show_hud: true,
            vsync: true,
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            asset_root: cli.assets,
            model_path: cli.model,
            width: cli.width.max(1),
            height: cli.height.max(1),
            move_speed: cli.speed,
            mouse_sensitivity: cli.sensitivity,
            fov_y_degrees: cli.fov.clamp(1.0, 179.0),
            show_light_marker: cli.show_light_marker,
            show_hud: !cli.no_hud,
            vsync: !cli.no_vsync,
            ..Self::default()
        }
    }
}

impl Config {
    pub fn model_file(&self) -> PathBuf {
        self.resolve(&self.model_path)
    }

    pub fn skybox_faces(&self) -> [PathBuf; 6] {
        SKYBOX_FACES.map(|face| {
            self.asset_root
                .join("textures")
                .join("skybox")
                .join(format!("{face}.jpg"))
        })
    }

    fn resolve(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.asset_root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let cli = Cli::parse_from(["skyview"]);
        let config = Config::from(cli);
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.move_speed, 8.0);
        assert_eq!(config.mouse_sensitivity, 0.1);
        assert_eq!(config.fov_y_degrees, 90.0);
        assert!(!config.show_light_marker);
        assert!(config.show_hud);
        assert!(config.vsync);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "skyview",
            "--speed",
            "2.5",
            "--show-light-marker",
            "--no-hud",
            "--width",
            "0",
        ]);
        let config = Config::from(cli);
        assert_eq!(config.move_speed, 2.5);
        assert!(config.show_light_marker);
        assert!(!config.show_hud);
        assert_eq!(config.width, 1);
    }

    #[test]
    fn skybox_faces_are_in_layer_order() {
        let config = Config {
            asset_root: PathBuf::from("data"),
            ..Config::default()
        };
        let faces = config.skybox_faces();
        assert_eq!(faces[0], PathBuf::from("data/textures/skybox/right.jpg"));
        assert_eq!(faces[3], PathBuf::from("data/textures/skybox/bottom.jpg"));
        assert_eq!(faces[5], PathBuf::from("data/textures/skybox/back.jpg"));
    }

    #[test]
    fn relative_model_path_is_joined_to_asset_root() {
        let config = Config {
            asset_root: PathBuf::from("data"),
            model_path: PathBuf::from("models/water.glb"),
            ..Config::default()
        };
        assert_eq!(config.model_file(), PathBuf::from("data/models/water.glb"));
    }
}
