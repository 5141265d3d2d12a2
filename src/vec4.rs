use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::vec3::Vec3;

/// Homogeneous 4-component vector.
#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Vec4<T>([T; 4]);

impl<T> Vec4<T> {
    #[inline]
    pub fn new(x: T, y: T, z: T, w: T) -> Self {
        Vec4([x, y, z, w])
    }

    #[inline]
    pub fn x(&self) -> &T {
        self.index(0)
    }

    #[inline]
    pub fn y(&self) -> &T {
        self.index(1)
    }

    #[inline]
    pub fn z(&self) -> &T {
        self.index(2)
    }

    #[inline]
    pub fn w(&self) -> &T {
        self.index(3)
    }
}

impl Vec4<f64> {
    /// Perspective divide.
    ///
    /// Returns `None` when `w` is too close to zero to divide by.
    #[inline]
    pub fn project(&self) -> Option<Vec3<f64>> {
        let w = *self.w();
        if w.abs() < f64::EPSILON {
            return None;
        }

        Some(Vec3::new(self.x() / w, self.y() / w, self.z() / w))
    }
}

impl<T: Copy> From<[T; 4]> for Vec4<T> {
    #[inline]
    fn from(v: [T; 4]) -> Self {
        Vec4::new(v[0], v[1], v[2], v[3])
    }
}

/// A point: `w = 1`.
impl From<Vec3<f64>> for Vec4<f64> {
    #[inline]
    fn from(v: Vec3<f64>) -> Self {
        Vec4::new(v.x, v.y, v.z, 1.0)
    }
}

/// Drops `w` without dividing.
impl From<Vec4<f64>> for Vec3<f64> {
    #[inline]
    fn from(v: Vec4<f64>) -> Self {
        Vec3::new(*v.x(), *v.y(), *v.z())
    }
}

impl<T> Index<usize> for Vec4<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<T> IndexMut<usize> for Vec4<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

#[test]
fn project_divides_by_w() {
    let v = Vec4::new(2.0, 4.0, 6.0, 2.0);
    assert_eq!(Some(Vec3::new(1.0, 2.0, 3.0)), v.project());
}

#[test]
fn project_rejects_zero_w() {
    let v = Vec4::new(1.0, 1.0, 1.0, 0.0);
    assert_eq!(None, v.project());
}
