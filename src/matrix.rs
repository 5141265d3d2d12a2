use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

use crate::{vec3::Vec3, vec4::Vec4};

/// Relative singularity threshold: a determinant at or below this fraction of
/// the product of the row lengths (its largest possible magnitude) is singular.
pub const DETERMINANT_EPSILON: f64 = 1e-12;

/// 4x4 matrix applied to column vectors (`M * v`).
///
/// Index notation is: i, j - row, column. Serialized row by row, so a JSON
/// matrix reads the same way it is written on paper.
#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Matrix4x4<T>([Vec4<T>; 4]);

impl<T: Copy> Matrix4x4<T> {
    pub fn new(v: [[T; 4]; 4]) -> Self {
        Matrix4x4([Vec4::from(v[0]), Vec4::from(v[1]), Vec4::from(v[2]), Vec4::from(v[3])])
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.0[i][j]
    }
}

impl Matrix4x4<f64> {
    pub fn identity() -> Self {
        Matrix4x4::new([[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]])
    }

    pub fn translation(v: Vec3<f64>) -> Self {
        Matrix4x4::new([[1.0, 0.0, 0.0, v.x], [0.0, 1.0, 0.0, v.y], [0.0, 0.0, 1.0, v.z], [0.0, 0.0, 0.0, 1.0]])
    }

    pub fn scaling(v: Vec3<f64>) -> Self {
        Matrix4x4::new([[v.x, 0.0, 0.0, 0.0], [0.0, v.y, 0.0, 0.0], [0.0, 0.0, v.z, 0.0], [0.0, 0.0, 0.0, 1.0]])
    }

    /// Counter-clockwise rotation about the x axis, `angle` in radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Matrix4x4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0,   c,  -s, 0.0],
            [0.0,   s,   c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Matrix4x4::new([
            [  c, 0.0,   s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [ -s, 0.0,   c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Matrix4x4::new([
            [  c,  -s, 0.0, 0.0],
            [  s,   c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed perspective projection mapping depth to `[-1, 1]`.
    ///
    /// `fovy` is the vertical field of view in radians.
    pub fn perspective(fovy: f64, aspect: f64, near: f64, far: f64) -> Self {
        let f = 1.0 / (fovy / 2.0).tan();
        Matrix4x4::new([
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, (far + near) / (near - far), 2.0 * far * near / (near - far)],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// Right-handed orthographic projection mapping depth to `[-1, 1]`.
    pub fn orthographic(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Self {
        Matrix4x4::new([
            [2.0 / (right - left), 0.0, 0.0, -(right + left) / (right - left)],
            [0.0, 2.0 / (top - bottom), 0.0, -(top + bottom) / (top - bottom)],
            [0.0, 0.0, -2.0 / (far - near), -(far + near) / (far - near)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed view matrix: the eye looks at `target` along `-z` in eye space.
    pub fn look_at(eye: Vec3<f64>, target: Vec3<f64>, up: Vec3<f64>) -> Self {
        let f = (target - eye).unit();
        let s = f.cross(&up).unit();
        let u = s.cross(&f);

        Matrix4x4::new([
            [s.x, s.y, s.z, -s.dot(&eye)],
            [u.x, u.y, u.z, -u.dot(&eye)],
            [-f.x, -f.y, -f.z, f.dot(&eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Returns the 2x2 sub-determinants shared by `determinant` and `inverse`.
    fn minors(&self) -> ([f64; 6], [f64; 6]) {
        let a = &self.0;

        let s = [
            a[0][0] * a[1][1] - a[1][0] * a[0][1],
            a[0][0] * a[1][2] - a[1][0] * a[0][2],
            a[0][0] * a[1][3] - a[1][0] * a[0][3],
            a[0][1] * a[1][2] - a[1][1] * a[0][2],
            a[0][1] * a[1][3] - a[1][1] * a[0][3],
            a[0][2] * a[1][3] - a[1][2] * a[0][3],
        ];

        let c = [
            a[2][0] * a[3][1] - a[3][0] * a[2][1],
            a[2][0] * a[3][2] - a[3][0] * a[2][2],
            a[2][0] * a[3][3] - a[3][0] * a[2][3],
            a[2][1] * a[3][2] - a[3][1] * a[2][2],
            a[2][1] * a[3][3] - a[3][1] * a[2][3],
            a[2][2] * a[3][3] - a[3][2] * a[2][3],
        ];

        (s, c)
    }

    pub fn determinant(&self) -> f64 {
        let (s, c) = self.minors();
        s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0]
    }

    /// Product of the row lengths, an upper bound on `|det|`.
    fn hadamard_bound(&self) -> f64 {
        self.0
            .iter()
            .map(|row| (0..4).map(|j| row[j] * row[j]).sum::<f64>().sqrt())
            .product()
    }

    /// Returns the inverse, or `None` when the matrix is singular.
    ///
    /// Singularity is judged relative to the matrix's scale, so tiny but
    /// well-conditioned matrices (wide orthographic volumes) still invert.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() <= DETERMINANT_EPSILON * self.hadamard_bound() {
            return None;
        }

        let (s, c) = self.minors();
        let inv_det = 1.0 / det;
        let a = self.0;

        let mut m = [[0.0; 4]; 4];

        m[0][0] = ( a[1][1] * c[5] - a[1][2] * c[4] + a[1][3] * c[3]) * inv_det;
        m[0][1] = (-a[0][1] * c[5] + a[0][2] * c[4] - a[0][3] * c[3]) * inv_det;
        m[0][2] = ( a[3][1] * s[5] - a[3][2] * s[4] + a[3][3] * s[3]) * inv_det;
        m[0][3] = (-a[2][1] * s[5] + a[2][2] * s[4] - a[2][3] * s[3]) * inv_det;

        m[1][0] = (-a[1][0] * c[5] + a[1][2] * c[2] - a[1][3] * c[1]) * inv_det;
        m[1][1] = ( a[0][0] * c[5] - a[0][2] * c[2] + a[0][3] * c[1]) * inv_det;
        m[1][2] = (-a[3][0] * s[5] + a[3][2] * s[2] - a[3][3] * s[1]) * inv_det;
        m[1][3] = ( a[2][0] * s[5] - a[2][2] * s[2] + a[2][3] * s[1]) * inv_det;

        m[2][0] = ( a[1][0] * c[4] - a[1][1] * c[2] + a[1][3] * c[0]) * inv_det;
        m[2][1] = (-a[0][0] * c[4] + a[0][1] * c[2] - a[0][3] * c[0]) * inv_det;
        m[2][2] = ( a[3][0] * s[4] - a[3][1] * s[2] + a[3][3] * s[0]) * inv_det;
        m[2][3] = (-a[2][0] * s[4] + a[2][1] * s[2] - a[2][3] * s[0]) * inv_det;

        m[3][0] = (-a[1][0] * c[3] + a[1][1] * c[1] - a[1][2] * c[0]) * inv_det;
        m[3][1] = ( a[0][0] * c[3] - a[0][1] * c[1] + a[0][2] * c[0]) * inv_det;
        m[3][2] = (-a[3][0] * s[3] + a[3][1] * s[1] - a[3][2] * s[0]) * inv_det;
        m[3][3] = ( a[2][0] * s[3] - a[2][1] * s[1] + a[2][2] * s[0]) * inv_det;

        Some(Matrix4x4::new(m))
    }

    /// Maps a point through the matrix, including the perspective divide.
    #[inline]
    pub fn transform_point(&self, p: Vec3<f64>) -> Option<Vec3<f64>> {
        (self * Vec4::from(p)).project()
    }
}

impl<'a, T: Copy + Add<Output = T> + Mul<Output = T>> Mul<Vec4<T>> for &'a Matrix4x4<T> {
    type Output = Vec4<T>;

    fn mul(self, vec: Vec4<T>) -> Self::Output {
        let row = |i: usize| {
            let r = &self.0[i];
            vec[0] * r[0] + vec[1] * r[1] + vec[2] * r[2] + vec[3] * r[3]
        };

        Vec4::new(row(0), row(1), row(2), row(3))
    }
}

impl Mul<Matrix4x4<f64>> for Matrix4x4<f64> {
    type Output = Matrix4x4<f64>;

    fn mul(self, o: Matrix4x4<f64>) -> Self::Output {
        let mut out = Matrix4x4::<f64>::default();

        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    out.0[i][j] += self.0[i][k] * o.0[k][j];
                }
            }
        }

        out
    }
}

#[cfg(test)]
fn assert_near(a: &Matrix4x4<f64>, b: &Matrix4x4<f64>) {
    for i in 0..4 {
        for j in 0..4 {
            assert!((a.get(i, j) - b.get(i, j)).abs() < 1e-9, "{:?} != {:?}", a, b);
        }
    }
}

#[test]
fn mul_matrix_vec() {
    let matrix = &Matrix4x4::new([[1, 0, 0, 10], [0, 1, 0, 0], [0, 0, 1, 0], [0, 0, 0, 1]]);
    let vec = Vec4::new(10, 10, 10, 1);

    assert_eq!(Vec4::new(20, 10, 10, 1), matrix * vec);
}

#[test]
fn mul_matrix_vec_uses_every_column() {
    let matrix = &Matrix4x4::new([[1, 2, 3, 4], [5, 6, 7, 8], [9, 10, 11, 12], [13, 14, 15, 16]]);
    let vec = Vec4::new(1, 1, 1, 1);

    assert_eq!(Vec4::new(10, 26, 42, 58), matrix * vec);
}

#[test]
fn inverse_identity() {
    let i = Matrix4x4::identity();
    assert_eq!(Some(i), i.inverse());
}

#[test]
fn inverse_of_projection_view() {
    let m = Matrix4x4::perspective(60f64.to_radians(), 16.0 / 9.0, 0.1, 256.0)
        * Matrix4x4::translation(Vec3::new(0.0, 0.0, -2.0))
        * Matrix4x4::rotation_y(0.7);

    let inv = m.inverse().unwrap();
    assert_near(&Matrix4x4::identity(), &(m * inv));
    assert_near(&Matrix4x4::identity(), &(inv * m));
}

#[test]
fn singular_has_no_inverse() {
    let m = Matrix4x4::scaling(Vec3::new(1.0, 0.0, 1.0));

    assert_eq!(0.0, m.determinant());
    assert_eq!(None, m.inverse());
}

#[test]
fn look_at_down_positive_z() {
    let view = Matrix4x4::look_at(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0));

    let p = view.transform_point(Vec3::new(0.0, 0.0, -0.5)).unwrap();
    assert!((p.z + 4.5).abs() < 1e-12);
    assert!(p.x.abs() < 1e-12 && p.y.abs() < 1e-12);
}

#[test]
fn rotation_about_translated_point() {
    let m = Matrix4x4::translation(Vec3::new(5.0, 5.0, 5.0)) * Matrix4x4::rotation_z(std::f64::consts::FRAC_PI_2);
    let p = m.transform_point(Vec3::new(1.0, 0.0, 0.0)).unwrap();

    assert!((p.x - 5.0).abs() < 1e-12);
    assert!((p.y - 6.0).abs() < 1e-12);
    assert!((p.z - 5.0).abs() < 1e-12);
}

#[test]
fn wide_orthographic_volume_is_invertible() {
    let m = Matrix4x4::orthographic(-5000.0, 5000.0, -5000.0, 5000.0, 0.1, 1e5);
    assert!(m.determinant().abs() < 1e-12);

    let inv = m.inverse().unwrap();
    assert_near(&Matrix4x4::identity(), &(m * inv));
}

#[test]
fn nearly_singular_has_no_inverse() {
    let m = Matrix4x4::new([[1.0, 0.0, 0.0, 0.0], [1.0, 1e-14, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]]);
    assert!(m.determinant() != 0.0);
    assert_eq!(None, m.inverse());
}

#[test]
fn deserialize_rows() {
    let m: Matrix4x4<f64> =
        serde_json::from_str("[[1, 0, 0, 3], [0, 1, 0, 0], [0, 0, 1, 0], [0, 0, 0, 1]]").unwrap();

    assert_eq!(Matrix4x4::translation(Vec3::new(3.0, 0.0, 0.0)), m);
}
