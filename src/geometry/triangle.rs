//! Flat triangle and the Möller–Trumbore ray test.

use serde::{Deserialize, Serialize};

use crate::{
    geometry::Geometry, intersection::Intersection, matrix::Matrix4x4, ray::Ray, transform::Transform, vec3::Vec3,
};

/// Tolerance for the parallel-ray test and the minimum accepted `t`.
pub const EPSILON: f64 = 1e-6;

/// Three ordered points defining a planar facet.
///
/// Serialized as `[[x, y, z], [x, y, z], [x, y, z]]`.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Triangle {
    vertices: [Vec3<f64>; 3],
}

impl Triangle {
    pub fn new(v0: Vec3<f64>, v1: Vec3<f64>, v2: Vec3<f64>) -> Self {
        Self { vertices: [v0, v1, v2] }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec3<f64>; 3] {
        &self.vertices
    }

    /// Unit normal following the `v0, v1, v2` winding. Zero for degenerate
    /// triangles.
    pub fn normal(&self) -> Vec3<f64> {
        let [v0, v1, v2] = self.vertices;
        (v1 - v0).cross(&(v2 - v0)).unit()
    }

    /// Returns `(t, u, v)` of the hit, if any.
    fn moller_trumbore(&self, ray: &Ray<f64>) -> Option<(f64, f64, f64)> {
        let [v0, v1, v2] = self.vertices;
        let direction = ray.direction();

        let e1 = v1 - v0;
        let e2 = v2 - v0;

        let p = direction.cross(&e2);
        let det = e1.dot(&p);
        // Ray lies in, or runs parallel to, the triangle's plane.
        if det.abs() < EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let s = ray.origin() - v0;
        let u = s.dot(&p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&e1);
        let v = direction.dot(&q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(&q) * inv_det;
        if t > EPSILON {
            Some((t, u, v))
        } else {
            None
        }
    }
}

/// Ray parameter at which `ray` strikes `triangle`, or `None`.
///
/// Hits at or behind the ray origin are rejected, as are rays parallel to
/// the triangle's plane and degenerate (zero-area) triangles.
pub fn intersect_ray_triangle(ray: &Ray<f64>, triangle: &Triangle) -> Option<f64> {
    triangle.moller_trumbore(ray).map(|(t, _, _)| t)
}

impl Geometry for Triangle {
    fn intersection(&self, ray: &Ray<f64>) -> Option<Intersection> {
        self.moller_trumbore(ray)
            .map(|(t, u, v)| Intersection::new(t, ray.offset(t), self.normal(), (u, v)))
    }
}

/// Vertices the matrix sends to `w = 0` are left in place; scene loading
/// rejects such transforms up front.
impl Transform<f64> for Triangle {
    fn transform(&mut self, transformation: &Matrix4x4<f64>) {
        for vertex in &mut self.vertices {
            if let Some(v) = transformation.transform_point(*vertex) {
                *vertex = v;
            }
        }
    }
}

#[cfg(test)]
fn unit_triangle(z: f64) -> Triangle {
    Triangle::new(Vec3::new(0.5, -0.5, z), Vec3::new(-0.5, -0.5, z), Vec3::new(0.0, 0.5, z))
}

#[test]
fn hit_through_center() {
    let ray = Ray::forward(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
    let t = intersect_ray_triangle(&ray, &unit_triangle(0.0)).unwrap();

    assert!((t - 5.0).abs() < 1e-12);
}

#[test]
fn hit_is_deterministic() {
    let ray = Ray::forward(Vec3::new(0.1, -0.2, -3.0), Vec3::new(0.01, 0.02, 1.0));
    let triangle = unit_triangle(0.5);

    let first = intersect_ray_triangle(&ray, &triangle);
    for _ in 0..16 {
        assert_eq!(first, intersect_ray_triangle(&ray, &triangle));
    }
}

#[test]
fn winding_does_not_matter() {
    let ray = Ray::forward(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
    let [v0, v1, v2] = *unit_triangle(0.0).vertices();

    assert_eq!(
        intersect_ray_triangle(&ray, &Triangle::new(v0, v1, v2)),
        intersect_ray_triangle(&ray, &Triangle::new(v0, v2, v1)),
    );
}

#[test]
fn parallel_ray_misses() {
    let triangle = unit_triangle(0.0);
    // In the plane.
    let inside = Ray::forward(Vec3::new(-2.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
    // Above the plane.
    let above = Ray::forward(Vec3::new(-2.0, 0.0, 1.0), Vec3::new(1.0, 0.1, 0.0));

    assert_eq!(None, intersect_ray_triangle(&inside, &triangle));
    assert_eq!(None, intersect_ray_triangle(&above, &triangle));
}

#[test]
fn behind_origin_misses() {
    let ray = Ray::forward(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(None, intersect_ray_triangle(&ray, &unit_triangle(0.0)));
}

#[test]
fn hit_at_origin_misses() {
    let ray = Ray::forward(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(None, intersect_ray_triangle(&ray, &unit_triangle(0.0)));
}

#[test]
fn outside_edges_misses() {
    let ray = Ray::forward(Vec3::new(0.6, 0.4, -5.0), Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(None, intersect_ray_triangle(&ray, &unit_triangle(0.0)));
}

#[test]
fn degenerate_triangle_misses() {
    let p = Vec3::new(0.0, 0.0, 0.0);
    let q = Vec3::new(1.0, 1.0, 0.0);
    let ray = Ray::forward(Vec3::new(0.5, 0.5, -1.0), Vec3::new(0.0, 0.0, 1.0));

    assert_eq!(None, intersect_ray_triangle(&ray, &Triangle::new(p, q, q.scale(2.0))));
}

#[test]
fn intersection_reports_point_and_barycentrics() {
    let ray = Ray::forward(Vec3::new(0.5, -0.5, -2.0), Vec3::new(0.0, 0.0, 1.0));
    let hit = unit_triangle(1.0).intersection(&ray).unwrap();

    assert!((hit.t - 3.0).abs() < 1e-12);
    assert!((hit.point.z - 1.0).abs() < 1e-12);
    assert!(hit.uv.0.abs() < 1e-12 && hit.uv.1.abs() < 1e-12);
    assert!((hit.normal.z.abs() - 1.0).abs() < 1e-12);
}
