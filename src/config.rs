use crate::color::Color;
use crate::geometry::TorusParams;
use crate::math::Vec3;
use crate::renderer::RendererOptions;
use clap::Parser;
use glam::DVec3;
use log::*;

/// User-specified command line parameters
#[derive(Debug, Parser)]
#[command(name = "torus3d", version, about)]
pub struct Args {
    /// Display refreshes per second
    #[arg(long, default_value_t = 60.0, value_parser = parse_fps)]
    pub fps: f64,

    /// Rotation added to the torus around X, Y and Z every frame, in radians
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [0.01, 0.005, 0.01],
        allow_hyphen_values = true
    )]
    pub rotation_delta: Vec<f64>,

    /// Degrees added to the background hue every frame
    #[arg(
        long,
        default_value_t = 0.005,
        allow_negative_numbers = true,
        value_parser = parse_finite
    )]
    pub hue_delta: f64,

    /// Torus color: a name, `#rrggbb` or `hsl(h, s%, l%)`
    #[arg(long, default_value = "orange")]
    pub color: Color,

    /// Fraction of pending camera motion applied per frame
    #[arg(long, default_value_t = 0.1, value_parser = parse_fraction)]
    pub damping_factor: f64,

    /// Apply camera motion immediately instead of easing it out
    #[arg(long)]
    pub no_damping: bool,

    /// Slowly orbit the camera around the torus
    #[arg(long)]
    pub auto_rotate: bool,

    /// Render at native resolution without supersampling
    #[arg(long)]
    pub no_antialias: bool,

    /// Hide the wireframe marker around the point light
    #[arg(long)]
    pub no_light_helper: bool,

    /// Exit after rendering this many frames
    #[arg(long)]
    pub frames: Option<u64>,

    /// Increase log verbosity. Logs are written to stderr.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub fn scene_config(&self) -> SceneConfig {
        let mut config = SceneConfig::default();

        match self.rotation_delta[..] {
            [x, y, z] => config.rotation_delta = [x, y, z],
            _ => warn!(
                "Expected 3 rotation deltas, got {}; using the defaults",
                self.rotation_delta.len()
            ),
        }
        config.hue_delta = self.hue_delta;
        config.torus_color = self.color;
        config.enable_damping = !self.no_damping;
        config.damping_factor = self.damping_factor;
        config.auto_rotate = self.auto_rotate;
        config.renderer.antialias = !self.no_antialias;
        config.light_helper = !self.no_light_helper;

        config
    }
}

fn parse_finite(arg: &str) -> Result<f64, String> {
    let value: f64 = arg.parse().map_err(|err| format!("{err}"))?;
    if !value.is_finite() {
        return Err(format!("`{arg}` isn't a finite number"));
    }
    Ok(value)
}

fn parse_fps(arg: &str) -> Result<f64, String> {
    let value = parse_finite(arg)?;
    if !(1.0..=1000.0).contains(&value) {
        return Err(format!("{value} is outside 1..=1000"));
    }
    Ok(value)
}

fn parse_fraction(arg: &str) -> Result<f64, String> {
    let value = parse_finite(arg)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("{value} is outside 0..=1"));
    }
    Ok(value)
}

/// Everything needed to build and animate the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Vertical field of view, in degrees
    pub fov: f64,
    pub near: f64,
    pub far: f64,
    pub camera_position: DVec3,

    pub torus: TorusParams,
    pub torus_color: Color,
    pub metalness: f64,
    pub roughness: f64,

    pub point_light_color: Color,
    pub point_light_intensity: f64,
    pub point_light_position: Vec3,
    pub ambient_light_color: Color,
    pub ambient_light_intensity: f64,
    pub light_helper: bool,

    pub enable_damping: bool,
    pub damping_factor: f64,
    pub auto_rotate: bool,

    pub renderer: RendererOptions,

    /// Radians added to the torus rotation every frame
    pub rotation_delta: Vec3,
    /// Degrees added to the background hue every frame
    pub hue_delta: f64,
    pub background_saturation: f64,
    pub background_lightness: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            camera_position: DVec3::new(0.0, 0.0, 30.0),

            torus: TorusParams::default(),
            torus_color: Color::from_hex(0xffa500),
            metalness: 0.6,
            roughness: 0.2,

            point_light_color: Color::from_hex(0xffffff),
            point_light_intensity: 1.0,
            point_light_position: [10.0, 10.0, 10.0],
            ambient_light_color: Color::from_hex(0x404040),
            ambient_light_intensity: 2.0,
            light_helper: true,

            enable_damping: true,
            damping_factor: 0.1,
            auto_rotate: false,

            renderer: RendererOptions::default(),

            rotation_delta: [0.01, 0.005, 0.01],
            hue_delta: 0.005,
            background_saturation: 1.0,
            background_lightness: 0.1,
        }
    }
}
