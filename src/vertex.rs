/// Vertex structure with world position, screen position, depth and normal
pub struct Vertex {
    pub position: [f64; 3],
    pub screen_position: [f64; 2],
    /// Normalized device depth, smaller is closer
    pub depth: f64,
    pub normal: [f64; 3],
}
