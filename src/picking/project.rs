use crate::{
    camera::FrameTransform,
    geometry::{Triangle, EPSILON},
    matrix::Matrix4x4,
    picking::{nearest, PickError, PickResult, PickStrategy, Pointer, Viewport},
    ray::Ray,
    vec3::Vec3,
    vec4::Vec4,
};

/// Projects every triangle into window space and shoots a ray along `+z`
/// from the pointer.
///
/// Window space is pixels on `x` and `y` (origin bottom-left) and `[0, 1]`
/// depth between the near and far planes. Distances are those depths, not
/// object-space lengths. Triangles are clipped against the near plane before
/// the divide, so one crossing the eye keeps its visible part.
#[derive(Copy, Clone, Debug, Default)]
pub struct ProjectVertices;

impl PickStrategy for ProjectVertices {
    fn name(&self) -> &'static str {
        "project_vertices"
    }

    fn pick(
        &self,
        pointer: Pointer,
        viewport: Viewport,
        frame: &FrameTransform,
        triangles: &[Triangle],
    ) -> Result<PickResult, PickError> {
        viewport.validate()?;

        let mvp = frame.combined();
        // A singular transform flattens the scene; refuse it like unprojection does.
        if mvp.inverse().is_none() {
            return Err(PickError::DegenerateTransform);
        }

        let origin = Vec3::new(pointer.x, f64::from(viewport.height) - pointer.y, 0.0);
        let ray = Ray::forward(origin, Vec3::new(0.0, 0.0, 1.0));

        let mut culled = 0usize;
        let projected = triangles.iter().enumerate().flat_map(|(index, triangle)| {
            let parts = project_triangle(&mvp, viewport, triangle);
            if parts.is_empty() {
                culled += 1;
            }
            parts.into_iter().map(move |part| (index, part))
        });

        let result = nearest(&ray, projected);
        if culled > 0 {
            log::debug!("{} triangles lie entirely behind the near plane", culled);
        }

        Ok(result)
    }
}

/// Window-space pieces of `triangle` in front of the near plane, fanned from
/// the first clipped vertex. Empty when nothing is visible in depth.
fn project_triangle(mvp: &Matrix4x4<f64>, viewport: Viewport, triangle: &Triangle) -> Vec<Triangle> {
    let clip: Vec<Vec4<f64>> = triangle.vertices().iter().map(|v| mvp * Vec4::from(*v)).collect();

    let clip = clip_polygon(&clip, |p| p.z() + p.w());
    let clip = clip_polygon(&clip, |p| p.w() - EPSILON);

    let window: Option<Vec<Vec3<f64>>> = clip.iter().map(|p| to_window(p, viewport)).collect();
    let window = match window {
        Some(window) => window,
        None => return Vec::new(),
    };

    (1..window.len().saturating_sub(1))
        .map(|i| Triangle::new(window[0], window[i], window[i + 1]))
        .collect()
}

/// Sutherland–Hodgman against one plane: keeps the part of the convex
/// polygon where `distance` is non-negative.
fn clip_polygon<F>(polygon: &[Vec4<f64>], distance: F) -> Vec<Vec4<f64>>
where
    F: Fn(&Vec4<f64>) -> f64,
{
    let mut clipped = Vec::with_capacity(polygon.len() + 1);

    for (i, current) in polygon.iter().enumerate() {
        let next = &polygon[(i + 1) % polygon.len()];
        let (dc, dn) = (distance(current), distance(next));

        if dc >= 0.0 {
            clipped.push(*current);
        }
        if (dc > 0.0 && dn < 0.0) || (dc < 0.0 && dn > 0.0) {
            clipped.push(lerp(current, next, dc / (dc - dn)));
        }
    }

    clipped
}

#[inline]
fn lerp(a: &Vec4<f64>, b: &Vec4<f64>, t: f64) -> Vec4<f64> {
    let at = |i: usize| a[i] + (b[i] - a[i]) * t;
    Vec4::new(at(0), at(1), at(2), at(3))
}

fn to_window(clip: &Vec4<f64>, viewport: Viewport) -> Option<Vec3<f64>> {
    let ndc = clip.project()?;

    Some(Vec3::new(
        (ndc.x * 0.5 + 0.5) * f64::from(viewport.width),
        (ndc.y * 0.5 + 0.5) * f64::from(viewport.height),
        ndc.z * 0.5 + 0.5,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Triangle {
        Triangle::new(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(10.0, -1.0, -10.0), Vec3::new(0.0, -1.0, 10.0))
    }

    #[test]
    fn vertices_land_in_window_pixels() {
        let mvp = Matrix4x4::orthographic(-1.0, 1.0, -1.0, 1.0, 0.1, 10.0);
        let p = to_window(&(&mvp * Vec4::from(Vec3::new(1.0, -1.0, -0.1))), Viewport::new(200, 100)).unwrap();

        assert!((p.x - 200.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn triangle_behind_eye_is_culled() {
        let mvp = Matrix4x4::perspective(1.0, 1.0, 0.1, 10.0);
        let behind = Triangle::new(Vec3::new(-1.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 2.0));

        assert!(project_triangle(&mvp, Viewport::new(100, 100), &behind).is_empty());
    }

    #[test]
    fn crossing_triangle_is_clipped_to_a_quad() {
        let mvp = Matrix4x4::perspective(60f64.to_radians(), 1.0, 0.1, 100.0);
        let parts = project_triangle(&mvp, Viewport::new(100, 100), &floor());

        assert_eq!(2, parts.len());
        for part in &parts {
            for p in part.vertices() {
                assert!(p.z >= -1e-9 && p.z.is_finite());
            }
        }
    }

    #[test]
    fn floor_crossing_eye_is_picked() {
        let frame = FrameTransform::new(Matrix4x4::perspective(60f64.to_radians(), 1.0, 0.1, 100.0), Matrix4x4::identity());

        let result = ProjectVertices
            .pick(Pointer::new(50.0, 80.0), Viewport::new(100, 100), &frame, &[floor()])
            .unwrap();
        assert_eq!(Some(0), result.selected);
        assert!(result.distance > 0.0 && result.distance < 1.0);
    }

    #[test]
    fn clip_keeps_polygon_in_front() {
        let square = [
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            Vec4::new(1.0, 1.0, 0.0, 1.0),
            Vec4::new(0.0, 1.0, 0.0, 1.0),
        ];

        assert_eq!(4, clip_polygon(&square, |p| *p.x() + 1.0).len());
        assert!(clip_polygon(&square, |p| *p.x() - 2.0).is_empty());

        let half = clip_polygon(&square, |p| 0.5 - p.x());
        assert_eq!(4, half.len());
        assert!(half.iter().all(|p| *p.x() <= 0.5));
    }
}
