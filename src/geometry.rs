use crate::math::{normalize, sub, Vec3};
use std::f64::consts::TAU;

/// Shape parameters of a torus lying in the XY plane, centered on the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusParams {
    /// Distance from the center of the torus to the center of the tube
    pub radius: f64,
    /// Radius of the tube
    pub tube: f64,
    pub radial_segments: usize,
    pub tubular_segments: usize,
    /// Central angle swept by the torus, in radians
    pub arc: f64,
}

impl Default for TorusParams {
    fn default() -> Self {
        TorusParams {
            radius: 10.0,
            tube: 3.0,
            radial_segments: 16,
            tubular_segments: 100,
            arc: TAU,
        }
    }
}

/// Indexed triangle geometry with per-vertex normals
#[derive(Debug, Clone)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<[usize; 3]>,
}

impl Geometry {
    pub fn torus(params: &TorusParams) -> Self {
        let radial = params.radial_segments.max(2);
        let tubular = params.tubular_segments.max(3);

        let mut positions = Vec::with_capacity((radial + 1) * (tubular + 1));
        let mut normals = Vec::with_capacity(positions.capacity());

        for j in 0..=radial {
            for i in 0..=tubular {
                let u = i as f64 / tubular as f64 * params.arc;
                let v = j as f64 / radial as f64 * TAU;

                let ring = params.radius + params.tube * v.cos();
                let position = [ring * u.cos(), ring * u.sin(), params.tube * v.sin()];
                let center = [params.radius * u.cos(), params.radius * u.sin(), 0.0];

                normals.push(normalize(&sub(&position, &center)));
                positions.push(position);
            }
        }

        let mut indices = Vec::with_capacity(radial * tubular * 2);
        for j in 1..=radial {
            for i in 1..=tubular {
                let a = (tubular + 1) * j + i - 1;
                let b = (tubular + 1) * (j - 1) + i - 1;
                let c = (tubular + 1) * (j - 1) + i;
                let d = (tubular + 1) * j + i;

                indices.push([a, b, d]);
                indices.push([b, c, d]);
            }
        }

        Geometry {
            positions,
            normals,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }
}
