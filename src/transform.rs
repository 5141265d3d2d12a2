use crate::matrix::Matrix4x4;

/// Geometry that can be moved in place by a 4x4 matrix.
pub trait Transform<T> {
    fn transform(&mut self, transformation: &Matrix4x4<T>);
}
