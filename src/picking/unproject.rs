use crate::{
    camera::FrameTransform,
    geometry::Triangle,
    picking::{pick_nearest, PickError, PickResult, PickStrategy, Pointer, Viewport},
    ray::Ray,
    vec3::Vec3,
};

/// Casts a ray from the pointer through the inverse transform.
///
/// The pointer is mapped to NDC (with `y` flipped against the viewport
/// height), placed on the near (`z = -1`) and far (`z = 1`) clip planes and
/// carried back into object space. The ray starts at the near point and
/// points at the far one.
pub fn unproject_ray(pointer: Pointer, viewport: Viewport, frame: &FrameTransform) -> Result<Ray<f64>, PickError> {
    viewport.validate()?;

    let inverse = frame.combined().inverse().ok_or(PickError::DegenerateTransform)?;

    let width = f64::from(viewport.width);
    let height = f64::from(viewport.height);
    let x = 2.0 * pointer.x / width - 1.0;
    let y = 2.0 * (height - pointer.y) / height - 1.0;

    let near = inverse
        .transform_point(Vec3::new(x, y, -1.0))
        .ok_or(PickError::DegenerateTransform)?;
    let far = inverse
        .transform_point(Vec3::new(x, y, 1.0))
        .ok_or(PickError::DegenerateTransform)?;

    let direction = far - near;
    if !near.is_finite() || !direction.is_finite() || direction.len() == 0.0 {
        return Err(PickError::DegenerateTransform);
    }

    Ok(Ray::forward(near, direction))
}

/// One unprojection per pick; triangles stay in object space.
#[derive(Copy, Clone, Debug, Default)]
pub struct Unproject;

impl PickStrategy for Unproject {
    fn name(&self) -> &'static str {
        "unproject"
    }

    fn pick(
        &self,
        pointer: Pointer,
        viewport: Viewport,
        frame: &FrameTransform,
        triangles: &[Triangle],
    ) -> Result<PickResult, PickError> {
        let ray = unproject_ray(pointer, viewport, frame)?;
        Ok(pick_nearest(&ray, triangles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix4x4;

    fn perspective_frame() -> FrameTransform {
        FrameTransform::new(
            Matrix4x4::perspective(60f64.to_radians(), 1280.0 / 720.0, 0.1, 256.0),
            Matrix4x4::translation(Vec3::new(0.0, 0.0, -2.0)) * Matrix4x4::rotation_y(0.4),
        )
    }

    #[test]
    fn round_trip_through_projection() {
        let frame = perspective_frame();
        let viewport = Viewport::new(1280, 720);
        let combined = frame.combined();

        for &(px, py) in &[(640.0, 360.0), (10.0, 20.0), (1200.0, 700.0), (333.3, 99.9)] {
            let ray = unproject_ray(Pointer::new(px, py), viewport, &frame).unwrap();
            let expected_x = 2.0 * px / 1280.0 - 1.0;
            let expected_y = 1.0 - 2.0 * py / 720.0;

            for &t in &[0.5, 2.0, 10.0] {
                let ndc = combined.transform_point(ray.offset(t)).unwrap();
                assert!((ndc.x - expected_x).abs() < 1e-4, "x: {} vs {}", ndc.x, expected_x);
                assert!((ndc.y - expected_y).abs() < 1e-4, "y: {} vs {}", ndc.y, expected_y);
            }
        }
    }

    #[test]
    fn center_ray_looks_down_the_view_axis() {
        let frame = FrameTransform::new(
            Matrix4x4::perspective(60f64.to_radians(), 1.0, 0.1, 100.0),
            Matrix4x4::translation(Vec3::new(0.0, 0.0, -2.0)),
        );
        let ray = unproject_ray(Pointer::new(50.0, 50.0), Viewport::new(100, 100), &frame).unwrap();

        assert!((ray.origin().z - 1.9).abs() < 1e-9);
        assert!((ray.direction().z + 1.0).abs() < 1e-9);
    }

    #[test]
    fn singular_transform_is_degenerate() {
        let frame = FrameTransform::new(Matrix4x4::scaling(Vec3::new(1.0, 1.0, 0.0)), Matrix4x4::identity());
        let result = unproject_ray(Pointer::new(1.0, 1.0), Viewport::new(2, 2), &frame);

        assert_eq!(Err(PickError::DegenerateTransform), result);
    }

    #[test]
    fn zero_viewport_is_rejected() {
        let result = unproject_ray(Pointer::new(0.0, 0.0), Viewport::new(0, 10), &perspective_frame());
        assert_eq!(Err(PickError::InvalidViewport { width: 0, height: 10 }), result);
    }
}
