//! Camera state and the per-frame matrices derived from it.

use serde::{Deserialize, Serialize};

use crate::{matrix::Matrix4x4, picking::Viewport, vec3::Vec3};

/// Projection and combined model-view matrices for one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameTransform {
    pub projection: Matrix4x4<f64>,
    pub model_view: Matrix4x4<f64>,
}

impl FrameTransform {
    pub fn new(projection: Matrix4x4<f64>, model_view: Matrix4x4<f64>) -> Self {
        Self { projection, model_view }
    }

    /// `projection * model_view`, object space to clip space.
    #[inline]
    pub fn combined(&self) -> Matrix4x4<f64> {
        self.projection * self.model_view
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Projection {
    /// `fovy` in degrees; the aspect ratio comes from the viewport.
    Perspective { fovy: f64, near: f64, far: f64 },
    Orthographic {
        left: f64,
        right: f64,
        bottom: f64,
        top: f64,
        near: f64,
        far: f64,
    },
}

impl Projection {
    pub fn matrix(&self, aspect: f64) -> Matrix4x4<f64> {
        match *self {
            Projection::Perspective { fovy, near, far } => Matrix4x4::perspective(fovy.to_radians(), aspect, near, far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Matrix4x4::orthographic(left, right, bottom, top, near, far),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum View {
    /// Scene pushed along `z` by `zoom`; negative values move it away.
    Orbit { zoom: f64 },
    LookAt {
        eye: Vec3<f64>,
        target: Vec3<f64>,
        #[serde(default = "default_up")]
        up: Vec3<f64>,
    },
}

fn default_up() -> Vec3<f64> {
    Vec3::new(0.0, 1.0, 0.0)
}

impl View {
    pub fn matrix(&self) -> Matrix4x4<f64> {
        match *self {
            View::Orbit { zoom } => Matrix4x4::translation(Vec3::new(0.0, 0.0, zoom)),
            View::LookAt { eye, target, up } => Matrix4x4::look_at(eye, target, up),
        }
    }
}

/// Everything needed to rebuild the frame matrices. The host owns it and
/// hands a [`FrameTransform`] to the renderer and the picker each frame.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Camera {
    pub projection: Projection,
    pub view: View,
    /// Model rotation in degrees, applied about x, then y, then z.
    #[serde(default)]
    pub rotation: Vec3<f64>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Projection::Perspective {
                fovy: 60.0,
                near: 0.1,
                far: 256.0,
            },
            view: View::Orbit { zoom: -2.0 },
            rotation: Vec3::default(),
        }
    }
}

impl Camera {
    pub fn model(&self) -> Matrix4x4<f64> {
        Matrix4x4::rotation_x(self.rotation.x.to_radians())
            * Matrix4x4::rotation_y(self.rotation.y.to_radians())
            * Matrix4x4::rotation_z(self.rotation.z.to_radians())
    }

    pub fn frame(&self, viewport: Viewport) -> FrameTransform {
        FrameTransform::new(self.projection.matrix(viewport.aspect()), self.view.matrix() * self.model())
    }

    /// Adds `delta` degrees to the model rotation.
    pub fn rotate(&mut self, delta: Vec3<f64>) {
        self.rotation = self.rotation + delta;
    }

    /// Moves the eye towards (positive `delta`) or away from the scene.
    pub fn zoom(&mut self, delta: f64) {
        match &mut self.view {
            View::Orbit { zoom } => *zoom += delta,
            View::LookAt { eye, target, .. } => {
                let towards = (*target - *eye).unit();
                *eye = *eye + towards.scale(delta);
            }
        }
    }
}

#[test]
fn default_camera_sits_two_units_back() {
    let frame = Camera::default().frame(Viewport::new(1280, 720));
    let eye_space = frame.model_view.transform_point(Vec3::new(0.0, 0.0, 0.0)).unwrap();

    assert_eq!(Vec3::new(0.0, 0.0, -2.0), eye_space);
}

#[test]
fn zoom_moves_orbit_and_look_at() {
    let mut orbit = Camera::default();
    orbit.zoom(0.5);
    assert_eq!(View::Orbit { zoom: -1.5 }, orbit.view);

    let mut look = Camera {
        view: View::LookAt {
            eye: Vec3::new(0.0, 0.0, -5.0),
            target: Vec3::new(0.0, 0.0, 0.0),
            up: default_up(),
        },
        ..Camera::default()
    };
    look.zoom(1.0);
    match look.view {
        View::LookAt { eye, .. } => assert_eq!(Vec3::new(0.0, 0.0, -4.0), eye),
        View::Orbit { .. } => unreachable!(),
    }
}

#[test]
fn deserialize_camera() {
    let json = r#"{
        "projection": { "type": "orthographic", "left": -1, "right": 1, "bottom": -1, "top": 1, "near": 0.1, "far": 100 },
        "view": { "type": "look_at", "eye": [0, 0, -5], "target": [0, 0, 0] }
    }"#;
    let camera: Camera = serde_json::from_str(json).unwrap();

    assert_eq!(Vec3::default(), camera.rotation);
    assert_eq!(
        View::LookAt {
            eye: Vec3::new(0.0, 0.0, -5.0),
            target: Vec3::new(0.0, 0.0, 0.0),
            up: default_up(),
        },
        camera.view
    );
}
