//! Scene graph for the torus: a flat list of nodes plus the background color.
//!
//! The scene is populated once at startup. Afterwards only node transforms and the
//! background are changed, by the animation loops.

use crate::color::Color;
use crate::geometry::Geometry;
use crate::math::Vec3;

/// Index of a node within its [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Physically-inspired surface description
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardMaterial {
    pub color: Color,
    /// 0 is a dielectric, 1 is a metal
    pub metalness: f64,
    /// 0 is a mirror, 1 is fully rough
    pub roughness: f64,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        StandardMaterial {
            color: Color::WHITE,
            metalness: 0.0,
            roughness: 1.0,
        }
    }
}

pub struct Mesh {
    pub geometry: Geometry,
    pub material: StandardMaterial,
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order
    pub rotation: Vec3,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: StandardMaterial) -> Self {
        Mesh {
            geometry,
            material,
            position: [0.0; 3],
            rotation: [0.0; 3],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f64,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f64,
}

/// Wireframe marker drawn around a point light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightHelper {
    pub light: NodeId,
    pub size: f64,
}

pub enum Node {
    Mesh(Mesh),
    PointLight(PointLight),
    AmbientLight(AmbientLight),
    PointLightHelper(PointLightHelper),
}

impl Node {
    pub fn is_light(&self) -> bool {
        matches!(self, Node::PointLight(_) | Node::AmbientLight(_))
    }
}

#[derive(Default)]
pub struct Scene {
    /// Color the frame is cleared to. `None` clears to black.
    pub background: Option<Color>,
    nodes: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a node to the scene, returning its handle
    pub fn add(&mut self, node: impl Into<Node>) -> NodeId {
        self.nodes.push(node.into());
        NodeId(self.nodes.len() - 1)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn mesh(&self, id: NodeId) -> Option<&Mesh> {
        match self.nodes.get(id.0) {
            Some(Node::Mesh(mesh)) => Some(mesh),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self, id: NodeId) -> Option<&mut Mesh> {
        match self.nodes.get_mut(id.0) {
            Some(Node::Mesh(mesh)) => Some(mesh),
            _ => None,
        }
    }

    pub fn point_light(&self, id: NodeId) -> Option<&PointLight> {
        match self.nodes.get(id.0) {
            Some(Node::PointLight(light)) => Some(light),
            _ => None,
        }
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Mesh(mesh) => Some(mesh),
            _ => None,
        })
    }

    pub fn lights(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.is_light())
    }
}

impl From<Mesh> for Node {
    fn from(mesh: Mesh) -> Self {
        Node::Mesh(mesh)
    }
}

impl From<PointLight> for Node {
    fn from(light: PointLight) -> Self {
        Node::PointLight(light)
    }
}

impl From<AmbientLight> for Node {
    fn from(light: AmbientLight) -> Self {
        Node::AmbientLight(light)
    }
}

impl From<PointLightHelper> for Node {
    fn from(helper: PointLightHelper) -> Self {
        Node::PointLightHelper(helper)
    }
}
