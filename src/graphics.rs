use crate::camera::PerspectiveCamera;
use crate::color::Color;
use crate::math::{add, dot, edge_function, normalize, sub, Vec3};
use crate::scene::{Node, Scene, StandardMaterial};
use crate::vertex::Vertex;

/// Reflectance of non-metals at normal incidence
const DIELECTRIC_SPECULAR: Color = Color::new(0.04, 0.04, 0.04);

/// Light sources of a scene, gathered once per frame
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    /// Sum of all ambient lights, intensity included
    pub ambient: Color,
    /// World position and radiance of every point light
    pub point_lights: Vec<(Vec3, Color)>,
    /// Camera position, for specular highlights
    pub eye: Vec3,
}

impl Lighting {
    pub fn from_scene(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let mut lighting = Lighting {
            ambient: Color::BLACK,
            point_lights: Vec::new(),
            eye: camera.position.to_array(),
        };

        for node in scene.lights() {
            match node {
                Node::AmbientLight(light) => {
                    lighting.ambient = lighting.ambient.add(light.color.scale(light.intensity));
                }
                Node::PointLight(light) => {
                    lighting
                        .point_lights
                        .push((light.position, light.color.scale(light.intensity)));
                }
                _ => {}
            }
        }

        lighting
    }

    /// Shades a surface point. Metalness moves energy from the diffuse term into a
    /// tinted specular term; roughness widens the highlight.
    pub fn shade(&self, material: &StandardMaterial, position: &Vec3, normal: &Vec3) -> Color {
        let diffuse = material.color.scale(1.0 - material.metalness);
        let specular = DIELECTRIC_SPECULAR.lerp(material.color, material.metalness);
        let shininess = shininess(material.roughness);
        let view = normalize(&sub(&self.eye, position));

        let mut color = self.ambient.multiply(diffuse);
        for (light_position, radiance) in &self.point_lights {
            let light_dir = normalize(&sub(light_position, position));
            let n_dot_l = dot(normal, &light_dir);
            if n_dot_l <= 0.0 {
                continue;
            }

            let half = normalize(&add(&light_dir, &view));
            let n_dot_h = dot(normal, &half).max(0.0);
            let highlight = n_dot_h.powf(shininess) * (shininess + 2.0) / 8.0;

            let reflected = diffuse.add(specular.scale(highlight));
            color = color.add(radiance.multiply(reflected).scale(n_dot_l));
        }
        color
    }
}

/// Blinn-Phong exponent matching the lobe width of a given roughness
fn shininess(roughness: f64) -> f64 {
    let alpha = (roughness * roughness).max(1e-3);
    (2.0 / (alpha * alpha) - 2.0).max(1.0)
}

/// Draws a triangle with per-pixel lighting
#[allow(clippy::too_many_arguments)]
pub fn draw_triangle(
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    pixel_data: &mut [Color],
    z_buffer: &mut [f64],
    width: usize,
    height: usize,
    lighting: &Lighting,
    material: &StandardMaterial,
) {
    if width == 0 || height == 0 {
        return;
    }

    // Compute bounding box of the triangle
    let min_x = v0.screen_position[0]
        .min(v1.screen_position[0])
        .min(v2.screen_position[0])
        .floor()
        .max(0.0) as usize;
    let max_x = v0.screen_position[0]
        .max(v1.screen_position[0])
        .max(v2.screen_position[0])
        .ceil()
        .min(width as f64 - 1.0);
    let min_y = v0.screen_position[1]
        .min(v1.screen_position[1])
        .min(v2.screen_position[1])
        .floor()
        .max(0.0) as usize;
    let max_y = v0.screen_position[1]
        .max(v1.screen_position[1])
        .max(v2.screen_position[1])
        .ceil()
        .min(height as f64 - 1.0);

    // Entirely off screen
    if max_x < 0.0 || max_y < 0.0 {
        return;
    }
    let (max_x, max_y) = (max_x as usize, max_y as usize);

    // Precompute area of the triangle
    let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
    if area == 0.0 {
        return;
    }

    // For each pixel in the bounding box
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = [x as f64 + 0.5, y as f64 + 0.5];

            // Dividing by the signed area accepts either winding
            let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p) / area;
            let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p) / area;
            let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            // Depth test
            let depth = v0.depth * w0 + v1.depth * w1 + v2.depth * w2;
            let offset = y * width + x;
            if depth >= z_buffer[offset] {
                continue;
            }
            z_buffer[offset] = depth;

            // Interpolate position and normal
            let position = [
                v0.position[0] * w0 + v1.position[0] * w1 + v2.position[0] * w2,
                v0.position[1] * w0 + v1.position[1] * w1 + v2.position[1] * w2,
                v0.position[2] * w0 + v1.position[2] * w1 + v2.position[2] * w2,
            ];
            let normal = normalize(&[
                v0.normal[0] * w0 + v1.normal[0] * w1 + v2.normal[0] * w2,
                v0.normal[1] * w0 + v1.normal[1] * w1 + v2.normal[1] * w2,
                v0.normal[2] * w0 + v1.normal[2] * w1 + v2.normal[2] * w2,
            ]);

            pixel_data[offset] = lighting.shade(material, &position, &normal);
        }
    }
}

/// Draws a line between two points in the pixel buffer using Bresenham's algorithm
#[allow(clippy::too_many_arguments)]
pub fn draw_line(
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    pixel_data: &mut [Color],
    width: usize,
    height: usize,
    color: Color,
) {
    let (mut x0, mut y0, x1, y1) = (
        x0.round() as isize,
        y0.round() as isize,
        x1.round() as isize,
        y1.round() as isize,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy

    loop {
        if x0 >= 0 && x0 < width as isize && y0 >= 0 && y0 < height as isize {
            pixel_data[y0 as usize * width + x0 as usize] = color;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{AmbientLight, PointLight};
    use assert_approx_eq::assert_approx_eq;

    fn vertex(x: f64, y: f64, depth: f64) -> Vertex {
        Vertex {
            position: [x, y, 0.0],
            screen_position: [x, y],
            depth,
            normal: [0.0, 0.0, 1.0],
        }
    }

    fn ambient_only(intensity: f64) -> Lighting {
        Lighting {
            ambient: Color::WHITE.scale(intensity),
            point_lights: Vec::new(),
            eye: [0.0, 0.0, 10.0],
        }
    }

    #[test]
    fn triangle_fills_inside_only() {
        let (width, height) = (8, 8);
        let mut pixels = vec![Color::BLACK; width * height];
        let mut depth = vec![f64::INFINITY; width * height];
        let material = StandardMaterial::default();

        // Clockwise and counter-clockwise halves of the same square
        draw_triangle(
            &vertex(0.0, 0.0, 0.0),
            &vertex(4.0, 0.0, 0.0),
            &vertex(0.0, 4.0, 0.0),
            &mut pixels,
            &mut depth,
            width,
            height,
            &ambient_only(1.0),
            &material,
        );
        draw_triangle(
            &vertex(4.0, 0.0, 0.0),
            &vertex(0.0, 4.0, 0.0),
            &vertex(4.0, 4.0, 0.0),
            &mut pixels,
            &mut depth,
            width,
            height,
            &ambient_only(1.0),
            &material,
        );

        assert_eq!(pixels[0], Color::WHITE);
        assert_eq!(pixels[3 * width + 3], Color::WHITE);
        assert_eq!(pixels[5 * width + 5], Color::BLACK);
        assert_eq!(pixels[7], Color::BLACK);
    }

    #[test]
    fn closer_triangle_wins_depth_test() {
        let (width, height) = (4, 4);
        let mut pixels = vec![Color::BLACK; width * height];
        let mut depth = vec![f64::INFINITY; width * height];
        let material = StandardMaterial::default();

        let triangle = |pixels: &mut [Color], depth: &mut [f64], z: f64, intensity: f64| {
            draw_triangle(
                &vertex(0.0, 0.0, z),
                &vertex(8.0, 0.0, z),
                &vertex(0.0, 8.0, z),
                pixels,
                depth,
                width,
                height,
                &ambient_only(intensity),
                &material,
            );
        };

        triangle(&mut pixels, &mut depth, 0.2, 0.5);
        triangle(&mut pixels, &mut depth, 0.5, 1.0);
        assert_approx_eq!(pixels[0].r, 0.5);

        triangle(&mut pixels, &mut depth, -0.1, 1.0);
        assert_approx_eq!(pixels[0].r, 1.0);
    }

    #[test]
    fn offscreen_triangle_is_ignored() {
        let (width, height) = (4, 4);
        let mut pixels = vec![Color::BLACK; width * height];
        let mut depth = vec![f64::INFINITY; width * height];

        draw_triangle(
            &vertex(-10.0, -10.0, 0.0),
            &vertex(-5.0, -10.0, 0.0),
            &vertex(-10.0, -5.0, 0.0),
            &mut pixels,
            &mut depth,
            width,
            height,
            &ambient_only(1.0),
            &StandardMaterial::default(),
        );
        assert!(pixels.iter().all(|&p| p == Color::BLACK));
    }

    #[test]
    fn line_is_clipped_to_buffer() {
        let (width, height) = (4, 4);
        let mut pixels = vec![Color::BLACK; width * height];
        draw_line(-2.0, -2.0, 6.0, 6.0, &mut pixels, width, height, Color::WHITE);

        for i in 0..4 {
            assert_eq!(pixels[i * width + i], Color::WHITE);
        }
        assert_eq!(pixels[1], Color::BLACK);
    }

    #[test]
    fn lighting_gathers_scene_lights() {
        let mut scene = Scene::new();
        scene.add(AmbientLight {
            color: Color::from_hex(0x404040),
            intensity: 2.0,
        });
        scene.add(PointLight {
            color: Color::WHITE,
            intensity: 1.0,
            position: [10.0, 10.0, 10.0],
        });
        let camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0);

        let lighting = Lighting::from_scene(&scene, &camera);
        assert_approx_eq!(lighting.ambient.r, 128.0 / 255.0);
        assert_eq!(lighting.point_lights.len(), 1);
    }

    #[test]
    fn surfaces_facing_the_light_are_brighter() {
        let lighting = Lighting {
            ambient: Color::WHITE.scale(0.2),
            point_lights: vec![([0.0, 0.0, 10.0], Color::WHITE)],
            eye: [0.0, 10.0, 0.0],
        };
        let material = StandardMaterial {
            color: Color::WHITE,
            metalness: 0.0,
            roughness: 1.0,
        };

        let lit = lighting.shade(&material, &[0.0; 3], &[0.0, 0.0, 1.0]);
        let unlit = lighting.shade(&material, &[0.0; 3], &[0.0, 0.0, -1.0]);
        assert!(lit.r > unlit.r);
        assert_approx_eq!(unlit.r, 0.2);
    }
}
