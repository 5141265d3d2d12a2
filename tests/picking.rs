use raypick::{
    camera::{Camera, FrameTransform, Projection, View},
    geometry::Triangle,
    matrix::Matrix4x4,
    picking::{intersect_ray_triangle, pick, unproject_ray, PickError, PickMode, Pointer, Viewport},
    scene::Scene,
    vec3::Vec3,
};

const MODES: [PickMode; 2] = [PickMode::Unproject, PickMode::ProjectVertices];

fn stacked() -> Vec<Triangle> {
    [-0.5, 0.0, 0.5]
        .iter()
        .map(|&z| Triangle::new(Vec3::new(0.5, -0.5, z), Vec3::new(-0.5, -0.5, z), Vec3::new(0.0, 0.5, z)))
        .collect()
}

/// Orthographic camera at `z = -5` looking down `+z`.
fn orthographic_camera() -> Camera {
    Camera {
        projection: Projection::Orthographic {
            left: -1.0,
            right: 1.0,
            bottom: -1.0,
            top: 1.0,
            near: 0.1,
            far: 100.0,
        },
        view: View::LookAt {
            eye: Vec3::new(0.0, 0.0, -5.0),
            target: Vec3::new(0.0, 0.0, 0.0),
            up: Vec3::new(0.0, 1.0, 0.0),
        },
        rotation: Vec3::default(),
    }
}

#[test]
fn centered_pointer_selects_nearest_of_stack() {
    let viewport = Viewport::new(800, 600);
    let frame = orthographic_camera().frame(viewport);
    let triangles = stacked();
    let pointer = viewport.center();

    for mode in MODES {
        let result = pick(pointer, viewport, &frame, &triangles, mode).unwrap();
        assert_eq!(Some(0), result.selected, "{}", mode);
    }

    let result = pick(pointer, viewport, &frame, &triangles, PickMode::Unproject).unwrap();
    assert!((result.distance - 4.4).abs() < 1e-9, "distance {}", result.distance);

    let ray = unproject_ray(pointer, viewport, &frame).unwrap();
    for triangle in &triangles[1..] {
        let t = intersect_ray_triangle(&ray, triangle).unwrap();
        assert!(result.distance < t);
    }
}

#[test]
fn pointer_outside_footprint_selects_nothing() {
    let viewport = Viewport::new(800, 600);
    let frame = orthographic_camera().frame(viewport);

    for mode in MODES {
        for &(x, y) in &[(5.0, 5.0), (795.0, 300.0), (400.0, 590.0)] {
            let result = pick(Pointer::new(x, y), viewport, &frame, &stacked(), mode).unwrap();
            assert_eq!(None, result.selected, "{} at ({}, {})", mode, x, y);
        }
    }
}

#[test]
fn empty_geometry_is_not_an_error() {
    let viewport = Viewport::new(800, 600);
    let frame = orthographic_camera().frame(viewport);

    for mode in MODES {
        let result = pick(viewport.center(), viewport, &frame, &[], mode).unwrap();
        assert_eq!(None, result.selected);
    }
}

#[test]
fn strategies_agree_on_builtin_scenes() {
    for scene in [Scene::overlapping(), Scene::pyramid()] {
        let mut hits = 0;

        for x in (0..scene.viewport.width).step_by(37) {
            for y in (0..scene.viewport.height).step_by(23) {
                let pointer = Pointer::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let unproject = scene.pick(pointer, PickMode::Unproject).unwrap();
                let project = scene.pick(pointer, PickMode::ProjectVertices).unwrap();

                assert_eq!(unproject.selected, project.selected, "at ({}, {})", x, y);
                hits += usize::from(unproject.selected.is_some());
            }
        }

        assert!(hits > 0);
    }
}

#[test]
fn strategies_agree_under_rotation() {
    let mut scene = Scene::overlapping();
    scene.camera.rotate(Vec3::new(20.0, 35.0, 10.0));

    for x in (0..scene.viewport.width).step_by(41) {
        for y in (0..scene.viewport.height).step_by(29) {
            let pointer = Pointer::new(f64::from(x) + 0.5, f64::from(y) + 0.5);

            assert_eq!(
                scene.pick(pointer, PickMode::Unproject).unwrap().selected,
                scene.pick(pointer, PickMode::ProjectVertices).unwrap().selected,
            );
        }
    }
}

#[test]
fn strategies_agree_on_triangle_crossing_eye_plane() {
    let frame = FrameTransform::new(Matrix4x4::perspective(60f64.to_radians(), 1.0, 0.1, 100.0), Matrix4x4::identity());
    let viewport = Viewport::new(100, 100);
    let floor = [Triangle::new(
        Vec3::new(-10.0, -1.0, -10.0),
        Vec3::new(10.0, -1.0, -10.0),
        Vec3::new(0.0, -1.0, 10.0),
    )];

    for &(x, y) in &[(50.0, 80.0), (20.0, 95.0), (50.0, 55.0), (50.0, 20.0)] {
        let unproject = pick(Pointer::new(x, y), viewport, &frame, &floor, PickMode::Unproject).unwrap();
        let project = pick(Pointer::new(x, y), viewport, &frame, &floor, PickMode::ProjectVertices).unwrap();

        assert_eq!(unproject.selected, project.selected, "at ({}, {})", x, y);
    }

    let result = pick(Pointer::new(50.0, 80.0), viewport, &frame, &floor, PickMode::ProjectVertices).unwrap();
    assert_eq!(Some(0), result.selected);
}

#[test]
fn strategies_agree_on_pixel_sized_facet() {
    let h = 0.0015;
    let tiny = Triangle::new(Vec3::new(h, -h, 0.0), Vec3::new(-h, -h, 0.0), Vec3::new(0.0, h, 0.0));
    let scene = Scene::new(Viewport::default(), Camera::default(), vec![tiny]);

    for mode in MODES {
        let result = scene.pick(scene.viewport.center(), mode).unwrap();
        assert_eq!(Some(0), result.selected, "{}", mode);
    }
}

#[test]
fn wide_orthographic_camera_is_not_degenerate() {
    let camera = Camera {
        projection: Projection::Orthographic {
            left: -5000.0,
            right: 5000.0,
            bottom: -5000.0,
            top: 5000.0,
            near: 0.1,
            far: 1e5,
        },
        view: View::LookAt {
            eye: Vec3::new(0.0, 0.0, -5.0),
            target: Vec3::new(0.0, 0.0, 0.0),
            up: Vec3::new(0.0, 1.0, 0.0),
        },
        rotation: Vec3::default(),
    };
    let viewport = Viewport::new(800, 600);
    let frame = camera.frame(viewport);
    let big: Vec<Triangle> = [100.0, 200.0, 300.0]
        .iter()
        .map(|&z| Triangle::new(Vec3::new(2000.0, -2000.0, z), Vec3::new(-2000.0, -2000.0, z), Vec3::new(0.0, 2000.0, z)))
        .collect();

    for mode in MODES {
        let result = pick(viewport.center(), viewport, &frame, &big, mode).unwrap();
        assert_eq!(Some(0), result.selected, "{}", mode);
    }
}

#[test]
fn front_triangle_of_default_scene() {
    let scene = Scene::overlapping();

    for mode in MODES {
        let result = scene.pick(scene.viewport.center(), mode).unwrap();
        assert_eq!(Some(2), result.selected, "{}", mode);
    }
}

#[test]
fn degenerate_transform_aborts_both_strategies() {
    let frame = FrameTransform::new(
        Matrix4x4::perspective(1.0, 1.0, 0.1, 10.0),
        Matrix4x4::scaling(Vec3::new(1.0, 0.0, 1.0)),
    );

    for mode in MODES {
        let result = pick(Pointer::new(1.0, 1.0), Viewport::new(4, 4), &frame, &stacked(), mode);
        assert_eq!(Err(PickError::DegenerateTransform), result);
    }
}

#[test]
fn zero_viewport_aborts_both_strategies() {
    let frame = orthographic_camera().frame(Viewport::new(800, 600));

    for mode in MODES {
        let result = pick(Pointer::new(1.0, 1.0), Viewport::new(800, 0), &frame, &stacked(), mode);
        assert_eq!(Err(PickError::InvalidViewport { width: 800, height: 0 }), result);
    }
}

#[test]
fn unprojected_points_project_back_to_pointer() {
    let viewport = Viewport::new(1024, 768);
    let mut camera = Camera::default();
    camera.rotate(Vec3::new(-15.0, 60.0, 5.0));
    let frame = camera.frame(viewport);
    let combined = frame.combined();

    for &(x, y) in &[(0.0, 0.0), (512.0, 384.0), (1000.0, 12.0), (77.7, 700.1)] {
        let ray = unproject_ray(Pointer::new(x, y), viewport, &frame).unwrap();
        let ndc = combined.transform_point(ray.offset(1.5)).unwrap();

        assert!((ndc.x - (2.0 * x / 1024.0 - 1.0)).abs() < 1e-4);
        assert!((ndc.y - (1.0 - 2.0 * y / 768.0)).abs() < 1e-4);
    }
}
