//! Software renderer drawing a [`Scene`] through a [`PerspectiveCamera`] into an RGB
//! framebuffer.

use crate::camera::PerspectiveCamera;
use crate::color::Color;
use crate::graphics::{draw_line, draw_triangle, Lighting};
use crate::math::Vec3;
use crate::scene::{Node, PointLightHelper, Scene};
use crate::vertex::Vertex;
use glam::{DMat3, DVec3, EulerRot};
use log::*;

/// Size of the drawable area, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Self {
        Viewport { width, height }
    }

    /// Viewport of a terminal, where every character cell holds two pixels stacked
    /// vertically
    pub fn from_cells(columns: u16, rows: u16) -> Self {
        Viewport::new(columns as usize, rows as usize * 2)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererOptions {
    /// Render at twice the resolution on both axes and average down
    pub antialias: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        RendererOptions { antialias: true }
    }
}

/// Final 8-bit image produced by a render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<(u8, u8, u8)>,
}

impl Framebuffer {
    fn new(width: usize, height: usize) -> Self {
        Framebuffer {
            width,
            height,
            pixels: vec![(0, 0, 0); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<(u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }
}

pub struct Renderer {
    width: usize,
    height: usize,
    samples: usize,
    pixel_data: Vec<Color>,
    z_buffer: Vec<f64>,
    output: Framebuffer,
}

impl Renderer {
    pub fn new(viewport: Viewport, options: RendererOptions) -> Self {
        let mut renderer = Renderer {
            width: 0,
            height: 0,
            samples: if options.antialias { 2 } else { 1 },
            pixel_data: Vec::new(),
            z_buffer: Vec::new(),
            output: Framebuffer::new(0, 0),
        };
        renderer.set_size(viewport.width, viewport.height);
        renderer
    }

    /// Resizes the output buffer. Calling it with the current size does nothing.
    pub fn set_size(&mut self, width: usize, height: usize) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        debug!("Resizing renderer to {width}x{height}");

        self.width = width;
        self.height = height;

        let samples = width * self.samples * height * self.samples;
        self.pixel_data = vec![Color::BLACK; samples];
        self.z_buffer = vec![f64::INFINITY; samples];
        self.output = Framebuffer::new(width, height);
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn antialias(&self) -> bool {
        self.samples > 1
    }

    pub fn output(&self) -> &Framebuffer {
        &self.output
    }

    /// Draws the scene from the point of view of the camera into the output buffer
    pub fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        let width = self.width * self.samples;
        let height = self.height * self.samples;
        if width == 0 || height == 0 {
            return;
        }

        let background = scene.background.unwrap_or(Color::BLACK);
        self.pixel_data.fill(background);
        self.z_buffer.fill(f64::INFINITY);

        let lighting = Lighting::from_scene(scene, camera);

        for node in scene.nodes() {
            match node {
                Node::Mesh(mesh) => {
                    let rotation = model_rotation(&mesh.rotation);
                    let translation = DVec3::from_array(mesh.position);

                    // Transform and project vertices
                    let vertices: Vec<Option<Vertex>> = mesh
                        .geometry
                        .positions
                        .iter()
                        .zip(&mesh.geometry.normals)
                        .map(|(position, normal)| {
                            let position = rotation * DVec3::from_array(*position) + translation;
                            let normal = rotation * DVec3::from_array(*normal);
                            let projected = camera.project(position)?;
                            Some(Vertex {
                                position: position.to_array(),
                                screen_position: to_screen(projected.ndc, width, height),
                                depth: projected.depth,
                                normal: normal.to_array(),
                            })
                        })
                        .collect();

                    for &[a, b, c] in &mesh.geometry.indices {
                        // Triangles crossing the near plane are dropped whole
                        let (Some(v0), Some(v1), Some(v2)) =
                            (&vertices[a], &vertices[b], &vertices[c])
                        else {
                            continue;
                        };
                        draw_triangle(
                            v0,
                            v1,
                            v2,
                            &mut self.pixel_data,
                            &mut self.z_buffer,
                            width,
                            height,
                            &lighting,
                            &mesh.material,
                        );
                    }
                }
                Node::PointLightHelper(helper) => {
                    self.draw_helper(scene, camera, helper, width, height);
                }
                Node::PointLight(_) | Node::AmbientLight(_) => {}
            }
        }

        self.resolve();
        trace!("Rendered {}x{} frame", self.width, self.height);
    }

    /// Draws a wireframe octahedron around the helper's light, in the light's color
    fn draw_helper(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
        helper: &PointLightHelper,
        width: usize,
        height: usize,
    ) {
        let Some(light) = scene.point_light(helper.light) else {
            warn!("Light helper points at a node that isn't a point light");
            return;
        };

        let center = DVec3::from_array(light.position);
        let offsets = [
            DVec3::Y,
            DVec3::X,
            DVec3::Z,
            DVec3::NEG_X,
            DVec3::NEG_Z,
            DVec3::NEG_Y,
        ];
        let corners: Vec<Option<[f64; 2]>> = offsets
            .iter()
            .map(|&offset| {
                let projected = camera.project(center + offset * helper.size)?;
                Some(to_screen(projected.ndc, width, height))
            })
            .collect();

        let edges = [
            (0, 1),
            (0, 2),
            (0, 3),
            (0, 4), // Top pyramid
            (5, 1),
            (5, 2),
            (5, 3),
            (5, 4), // Bottom pyramid
            (1, 2),
            (2, 3),
            (3, 4),
            (4, 1), // Equator
        ];

        for (start, end) in edges {
            if let (Some(p0), Some(p1)) = (corners[start], corners[end]) {
                draw_line(
                    p0[0],
                    p0[1],
                    p1[0],
                    p1[1],
                    &mut self.pixel_data,
                    width,
                    height,
                    light.color,
                );
            }
        }
    }

    /// Averages every block of samples into one output pixel
    fn resolve(&mut self) {
        let samples = self.samples;
        let row_stride = self.width * samples;
        let weight = 1.0 / (samples * samples) as f64;

        for y in 0..self.height {
            for x in 0..self.width {
                let mut sum = Color::BLACK;
                for sy in 0..samples {
                    for sx in 0..samples {
                        let offset = (y * samples + sy) * row_stride + x * samples + sx;
                        sum = sum.add(self.pixel_data[offset]);
                    }
                }
                self.output.pixels[y * self.width + x] = sum.scale(weight).to_rgb8();
            }
        }
    }
}

/// Rotation matrix for Euler angles applied in XYZ order (`Rx * Ry * Rz`)
fn model_rotation(angles: &Vec3) -> DMat3 {
    DMat3::from_euler(EulerRot::XYZ, angles[0], angles[1], angles[2])
}

/// Maps normalized device coordinates to pixel coordinates, Y pointing down
fn to_screen(ndc: [f64; 2], width: usize, height: usize) -> [f64; 2] {
    [
        (ndc[0] + 1.0) * 0.5 * width as f64,
        (1.0 - ndc[1]) * 0.5 * height as f64,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, TorusParams};
    use crate::scene::{AmbientLight, Mesh, PointLight, StandardMaterial};

    fn torus_scene() -> Scene {
        let mut scene = Scene::new();
        scene.background = Some(Color::from_rgb8(0, 0, 40));
        scene.add(Mesh::new(
            Geometry::torus(&TorusParams::default()),
            StandardMaterial {
                color: Color::from_hex(0xffa500),
                metalness: 0.6,
                roughness: 0.2,
            },
        ));
        scene.add(AmbientLight {
            color: Color::from_hex(0x404040),
            intensity: 2.0,
        });
        scene
    }

    fn camera(aspect: f64) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(75.0, aspect, 0.1, 1000.0);
        camera.position = DVec3::new(0.0, 0.0, 30.0);
        camera.look_at(DVec3::ZERO);
        camera
    }

    #[test]
    fn set_size_reallocates_output() {
        let mut renderer = Renderer::new(Viewport::new(800, 600), RendererOptions::default());
        assert_eq!(renderer.size(), (800, 600));

        renderer.set_size(1024, 768);
        assert_eq!(renderer.size(), (1024, 768));
        assert_eq!(renderer.output().width(), 1024);
        assert_eq!(renderer.output().height(), 768);
        assert!(renderer.output().pixel(1023, 767).is_some());
        assert!(renderer.output().pixel(1024, 767).is_none());
    }

    #[test]
    fn torus_hole_shows_background() {
        let mut renderer = Renderer::new(Viewport::new(200, 200), RendererOptions::default());
        let scene = torus_scene();
        renderer.render(&scene, &camera(1.0));

        let output = renderer.output();
        let background = (0, 0, 40);
        assert_eq!(output.pixel(100, 100), Some(background));
        assert_eq!(output.pixel(0, 0), Some(background));
        assert_eq!(output.pixel(199, 199), Some(background));

        // The ring crosses the horizontal center line about 43 pixels from the middle
        let (r, g, b) = output.pixel(143, 100).unwrap();
        assert!(r > g && g > b, "expected an orange tint, got {:?}", (r, g, b));
        assert_ne!((r, g, b), background);
    }

    #[test]
    fn rendering_without_antialias_matches_layout() {
        let mut renderer = Renderer::new(
            Viewport::new(100, 50),
            RendererOptions { antialias: false },
        );
        assert!(!renderer.antialias());
        renderer.render(&torus_scene(), &camera(2.0));

        let output = renderer.output();
        assert_eq!(output.pixel(50, 25), Some((0, 0, 40)));
        assert_ne!(output.pixel(61, 25), Some((0, 0, 40)));
    }

    #[test]
    fn missing_background_clears_to_black() {
        let mut renderer = Renderer::new(Viewport::new(20, 20), RendererOptions::default());
        renderer.render(&Scene::new(), &camera(1.0));
        assert_eq!(renderer.output().pixel(10, 10), Some((0, 0, 0)));
    }

    #[test]
    fn helper_is_drawn_in_light_color() {
        let mut scene = Scene::new();
        let light = scene.add(PointLight {
            color: Color::from_rgb8(255, 0, 0),
            intensity: 1.0,
            position: [0.0; 3],
        });
        scene.add(PointLightHelper { light, size: 5.0 });

        let options = RendererOptions { antialias: false };
        let mut renderer = Renderer::new(Viewport::new(100, 100), options);
        renderer.render(&scene, &camera(1.0));

        let output = renderer.output();
        let red = (0..100).any(|x| output.pixel(x, 50) == Some((255, 0, 0)));
        assert!(red);
        assert_eq!(output.pixel(0, 0), Some((0, 0, 0)));
    }

    #[test]
    fn model_rotation_applies_z_before_x() {
        let point = DVec3::new(1.0, 2.0, 3.0);
        let composed = model_rotation(&[0.3, 0.0, 0.7]) * point;
        let about_z = model_rotation(&[0.0, 0.0, 0.7]) * point;
        let stepwise = model_rotation(&[0.3, 0.0, 0.0]) * about_z;
        assert!(composed.abs_diff_eq(stepwise, 1e-12));

        let quarter = model_rotation(&[0.0, 0.0, std::f64::consts::FRAC_PI_2]) * DVec3::X;
        assert!(quarter.abs_diff_eq(DVec3::Y, 1e-12));
    }
}
