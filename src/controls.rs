use crate::camera::PerspectiveCamera;
use glam::DVec3;
use std::f64::consts::{PI, TAU};

const EPS: f64 = 1e-6;

/// Offset of the camera from its target in spherical coordinates, Y up
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Spherical {
    radius: f64,
    /// Polar angle from the +Y axis
    phi: f64,
    /// Azimuth around the Y axis, measured from +Z
    theta: f64,
}

impl Spherical {
    fn from_offset(offset: DVec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Spherical::default();
        }
        Spherical {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> DVec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        self.radius * DVec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta)
    }
}

/// Orbits a camera around a target point.
///
/// Input only accumulates deltas; nothing moves until [`OrbitControls::update`] is
/// called, once per frame. With damping enabled each update applies a fraction of the
/// pending delta and lets the rest decay, so motion eases out over several frames.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: DVec3,
    pub enable_damping: bool,
    /// Fraction of the pending motion applied per update when damping
    pub damping_factor: f64,
    pub auto_rotate: bool,
    /// 2.0 is one orbit every 30 seconds at 60 updates per second
    pub auto_rotate_speed: f64,
    pub rotate_speed: f64,
    pub zoom_speed: f64,
    pub pan_speed: f64,
    pub min_distance: f64,
    pub max_distance: f64,

    spherical_delta: Spherical,
    pan_offset: DVec3,
    scale: f64,

    saved_target: DVec3,
    saved_position: DVec3,
}

impl OrbitControls {
    /// Binds controls to a camera, orbiting around the point it currently looks at
    pub fn new(camera: &PerspectiveCamera) -> Self {
        let target = camera.target();
        OrbitControls {
            target,
            enable_damping: false,
            damping_factor: 0.05,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f64::INFINITY,
            spherical_delta: Spherical::default(),
            pan_offset: DVec3::ZERO,
            scale: 1.0,
            saved_target: target,
            saved_position: camera.position,
        }
    }

    /// Queues a rotation around the vertical axis
    pub fn rotate_left(&mut self, angle: f64) {
        self.spherical_delta.theta -= angle;
    }

    /// Queues a rotation over the target, towards the top pole
    pub fn rotate_up(&mut self, angle: f64) {
        self.spherical_delta.phi -= angle;
    }

    /// Multiplier applied by a single zoom step
    pub fn zoom_scale(&self) -> f64 {
        0.95f64.powf(self.zoom_speed)
    }

    /// Moves the camera towards the target by one zoom step
    pub fn dolly_in(&mut self) {
        self.scale *= self.zoom_scale();
    }

    /// Moves the camera away from the target by one zoom step
    pub fn dolly_out(&mut self) {
        self.scale /= self.zoom_scale();
    }

    /// Converts a pointer drag, in viewport pixels, into an orbit
    pub fn drag_rotate(&mut self, dx: f64, dy: f64, viewport_height: f64) {
        if viewport_height <= 0.0 {
            return;
        }
        self.rotate_left(TAU * dx / viewport_height * self.rotate_speed);
        self.rotate_up(TAU * dy / viewport_height * self.rotate_speed);
    }

    /// Converts a pointer drag, in viewport pixels, into a pan that keeps whatever is
    /// under the pointer at the target distance under the pointer
    pub fn drag_pan(
        &mut self,
        dx: f64,
        dy: f64,
        viewport_height: f64,
        camera: &PerspectiveCamera,
    ) {
        if viewport_height <= 0.0 {
            return;
        }
        let distance = camera.position.distance(self.target);
        let target_distance = distance * (camera.fov.to_radians() * 0.5).tan();

        let [right, up, _] = camera.axes();
        let left = -2.0 * dx * target_distance / viewport_height * self.pan_speed;
        let upward = 2.0 * dy * target_distance / viewport_height * self.pan_speed;

        self.pan_offset += right * left + up * upward;
    }

    fn auto_rotation_angle(&self) -> f64 {
        TAU / 60.0 / 60.0 * self.auto_rotate_speed
    }

    /// Applies pending motion to the camera. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let mut spherical = Spherical::from_offset(camera.position - self.target);

        if self.auto_rotate {
            self.rotate_left(self.auto_rotation_angle());
        }

        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        spherical.theta += self.spherical_delta.theta * step;
        spherical.phi += self.spherical_delta.phi * step;
        spherical.phi = spherical.phi.clamp(EPS, PI - EPS);
        spherical.radius =
            (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * step;

        let previous = camera.position;
        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = DVec3::ZERO;
        }
        self.scale = 1.0;

        camera.position.distance(previous) > EPS
    }

    /// Returns the camera to where it was when the controls were created and drops
    /// pending motion
    pub fn reset(&mut self, camera: &mut PerspectiveCamera) {
        self.target = self.saved_target;
        camera.position = self.saved_position;
        camera.look_at(self.target);

        self.spherical_delta = Spherical::default();
        self.pan_offset = DVec3::ZERO;
        self.scale = 1.0;
    }

    /// Current distance between the camera and the target
    pub fn distance(&self, camera: &PerspectiveCamera) -> f64 {
        camera.position.distance(self.target)
    }
}
