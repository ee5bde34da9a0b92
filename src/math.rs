pub type Vec3 = [f64; 3];

pub fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn length(v: &Vec3) -> f64 {
    dot(v, v).sqrt()
}

/// Returns the unit vector pointing along `v`, or `v` itself if it has no length
pub fn normalize(v: &Vec3) -> Vec3 {
    let length = length(v);
    if length == 0.0 {
        return *v;
    }
    [v[0] / length, v[1] / length, v[2] / length]
}

/// Edge function used in rasterization
pub fn edge_function(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
