use std::ops::Range;

use crate::vec3::Vec3;

/// Half-open `t` interval accepted by picking rays: everything in front of
/// the origin.
pub const FORWARD: Range<f64> = 0.0..f64::INFINITY;

#[derive(Clone, Debug, PartialEq)]
pub struct Ray<T: Copy> {
    origin: Vec3<T>,
    direction: Vec3<T>,
    range: Range<T>,
}

impl Ray<f64> {
    /// Creates a ray; `direction` is normalized.
    pub fn new(origin: Vec3<f64>, direction: Vec3<f64>, range: Range<f64>) -> Self {
        Self {
            origin,
            direction: direction.unit(),
            range,
        }
    }

    /// A ray accepting every hit in front of its origin.
    pub fn forward(origin: Vec3<f64>, direction: Vec3<f64>) -> Self {
        Self::new(origin, direction, FORWARD)
    }

    #[inline]
    pub fn origin(&self) -> Vec3<f64> {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> &Vec3<f64> {
        &self.direction
    }

    #[inline]
    pub fn offset(&self, t: f64) -> Vec3<f64> {
        self.origin + self.direction.scale(t)
    }
}

impl<T: Copy + PartialOrd> Ray<T> {
    #[inline]
    pub fn contains(&self, t: T) -> bool {
        self.range.contains(&t)
    }
}

#[test]
fn direction_is_normalized() {
    let ray = Ray::forward(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 10.0));
    assert_eq!(&Vec3::new(0.0, 0.0, 1.0), ray.direction());
    assert_eq!(Vec3::new(0.0, 0.0, 2.5), ray.offset(2.5));
}

#[test]
fn forward_range_excludes_behind() {
    let ray = Ray::forward(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
    assert!(ray.contains(1.0));
    assert!(!ray.contains(-1.0));
}
