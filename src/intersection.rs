use crate::vec3::Vec3;

/// Where a ray struck a surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    /// Ray parameter of the hit.
    pub t: f64,
    pub point: Vec3<f64>,
    /// Unit face normal.
    pub normal: Vec3<f64>,
    /// Barycentric weights of `v1` and `v2`.
    pub uv: (f64, f64),
}

impl Intersection {
    pub fn new(t: f64, point: Vec3<f64>, normal: Vec3<f64>, uv: (f64, f64)) -> Self {
        Self { t, point, normal, uv }
    }
}
