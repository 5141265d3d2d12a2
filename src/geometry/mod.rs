use crate::{intersection::Intersection, ray::Ray};

mod mesh;
mod triangle;

pub use self::mesh::Mesh;
pub use self::triangle::{intersect_ray_triangle, Triangle, EPSILON};

pub trait Geometry {
    fn intersection(&self, ray: &Ray<f64>) -> Option<Intersection>;
}
