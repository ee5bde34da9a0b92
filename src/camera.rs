use glam::{DMat4, DVec3};

/// Perspective camera looking at a target point
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view, in degrees
    pub fov: f64,
    /// Viewport width divided by height
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub position: DVec3,
    pub up: DVec3,
    target: DVec3,
    view: DMat4,
    projection: DMat4,
}

/// Vertex position after projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Normalized device coordinates, both in `-1.0..=1.0` when on screen
    pub ndc: [f64; 2],
    /// Depth in `-1.0..=1.0`, smaller is closer
    pub depth: f64,
}

impl PerspectiveCamera {
    pub fn new(fov: f64, aspect: f64, near: f64, far: f64) -> Self {
        let mut camera = PerspectiveCamera {
            fov,
            aspect,
            near,
            far,
            position: DVec3::ZERO,
            up: DVec3::Y,
            target: DVec3::NEG_Z,
            view: DMat4::IDENTITY,
            projection: DMat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recomputes the projection matrix. Must be called after changing `fov`,
    /// `aspect`, `near` or `far`.
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            DMat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn target(&self) -> DVec3 {
        self.target
    }

    /// Camera axes in world space: right, up and backwards
    pub fn axes(&self) -> [DVec3; 3] {
        [0, 1, 2].map(|row| self.view.row(row).truncate())
    }

    /// Orients the camera so that it faces `target`
    pub fn look_at(&mut self, target: DVec3) {
        self.target = target;

        let forward = target - self.position;
        if forward.length_squared() == 0.0 {
            return;
        }
        let mut up = self.up;
        if forward.cross(up).length_squared() < 1e-12 {
            // Looking straight along `up`, nudge to get a usable basis
            up = (up + DVec3::new(1e-4, 0.0, 1e-4)).normalize();
        }

        self.view = DMat4::look_at_rh(self.position, target, up);
    }

    /// Transforms a world-space point into camera space
    pub fn world_to_view(&self, point: DVec3) -> DVec3 {
        self.view.transform_point3(point)
    }

    /// Projects a world-space point. Returns `None` for points in front of the near
    /// plane or behind the camera.
    pub fn project(&self, point: DVec3) -> Option<Projected> {
        let clip = self.projection * self.world_to_view(point).extend(1.0);
        if clip.w < self.near {
            return None;
        }

        Some(Projected {
            ndc: [clip.x / clip.w, clip.y / clip.w],
            depth: clip.z / clip.w,
        })
    }
}
