use crate::camera::PerspectiveCamera;
use crate::config::SceneConfig;
use crate::controls::OrbitControls;
use crate::error::Error;
use crate::geometry::Geometry;
use crate::renderer::{Renderer, Viewport};
use crate::scene::{
    AmbientLight, Mesh, NodeId, PointLight, PointLightHelper, Scene, StandardMaterial,
};
use glam::DVec3;
use log::*;

/// Everything one running scene owns: the scene graph, the camera looking at it, the
/// renderer drawing it and the controls moving the camera.
pub struct SceneContext {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub renderer: Renderer,
    pub controls: OrbitControls,
    /// The animated torus
    pub torus: NodeId,
    /// The point light lighting the torus
    pub light: NodeId,
}

impl SceneContext {
    /// Builds the torus scene for a viewport. The torus, both lights and the light
    /// helper (if enabled) are attached to the scene before this returns.
    pub fn bootstrap(viewport: Viewport, config: &SceneConfig) -> Result<Self, Error> {
        if viewport.is_empty() {
            return Err(Error::EmptyViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let mut camera =
            PerspectiveCamera::new(config.fov, viewport.aspect(), config.near, config.far);
        camera.position = config.camera_position;
        camera.look_at(DVec3::ZERO);

        let renderer = Renderer::new(viewport, config.renderer);

        let geometry = Geometry::torus(&config.torus);
        debug!(
            "Torus geometry: {} vertices, {} triangles",
            geometry.vertex_count(),
            geometry.triangle_count()
        );

        let mut scene = Scene::new();
        let torus = scene.add(Mesh::new(
            geometry,
            StandardMaterial {
                color: config.torus_color,
                metalness: config.metalness,
                roughness: config.roughness,
            },
        ));
        let light = scene.add(PointLight {
            color: config.point_light_color,
            intensity: config.point_light_intensity,
            position: config.point_light_position,
        });
        scene.add(AmbientLight {
            color: config.ambient_light_color,
            intensity: config.ambient_light_intensity,
        });
        if config.light_helper {
            scene.add(PointLightHelper { light, size: 1.0 });
        }

        let mut controls = OrbitControls::new(&camera);
        controls.enable_damping = config.enable_damping;
        controls.damping_factor = config.damping_factor;
        controls.auto_rotate = config.auto_rotate;

        info!(
            "Scene ready: {} mesh(es), {} light(s), {} nodes in total",
            scene.meshes().count(),
            scene.lights().count(),
            scene.len()
        );

        Ok(SceneContext {
            scene,
            camera,
            renderer,
            controls,
            torus,
            light,
        })
    }

    /// Brings the camera and renderer in line with a new viewport size. Viewports
    /// without area are ignored.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            debug!(
                "Ignoring resize to empty viewport {}x{}",
                viewport.width, viewport.height
            );
            return;
        }

        self.camera.aspect = viewport.aspect();
        self.camera.update_projection_matrix();
        self.renderer.set_size(viewport.width, viewport.height);
    }

    /// Current rotation of the torus, in radians
    pub fn torus_rotation(&self) -> [f64; 3] {
        self.scene
            .mesh(self.torus)
            .map(|mesh| mesh.rotation)
            .unwrap_or_default()
    }
}
