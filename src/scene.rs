//! Scene files: viewport, camera and the triangles to pick from.
//!
//! ```json
//! {
//!   "viewport": { "width": 1280, "height": 720 },
//!   "camera": { "projection": { "type": "perspective", "fovy": 60, "near": 0.1, "far": 256 },
//!               "view": { "type": "orbit", "zoom": -2 } },
//!   "models": [
//!     { "geometry": { "type": "triangle", "vertices": [[0.5, -0.5, 0], [-0.5, -0.5, 0], [0, 0.5, 0]] } },
//!     { "geometry": { "type": "mesh", "path": "tentacle.stl", "centered": true },
//!       "transform": [[0.025, 0, 0, 0], [0, 0.025, 0, 0], [0, 0, 0.025, 0], [0, 0, 0, 1]] }
//!   ]
//! }
//! ```
//!
//! Models are flattened in file order; that order fixes triangle indices.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{de::Error as _, Deserialize, Serialize};

use crate::{
    camera::{Camera, FrameTransform},
    error::Error,
    geometry::{Mesh, Triangle},
    matrix::Matrix4x4,
    picking::{self, PickError, PickMode, PickResult, Pointer, Viewport},
    transform::Transform,
    vec3::Vec3,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeometryDescription {
    Triangle {
        vertices: Triangle,
    },
    /// STL file, relative to the scene file.
    Mesh {
        path: PathBuf,
        #[serde(default)]
        centered: bool,
    },
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ModelDescription {
    pub geometry: GeometryDescription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Matrix4x4<f64>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub camera: Camera,
    #[serde(default)]
    pub models: Vec<ModelDescription>,
}

/// Loaded, read-only pick input.
#[derive(Clone, Debug)]
pub struct Scene {
    pub viewport: Viewport,
    pub camera: Camera,
    triangles: Vec<Triangle>,
}

impl Scene {
    pub fn new(viewport: Viewport, camera: Camera, triangles: Vec<Triangle>) -> Self {
        Self {
            viewport,
            camera,
            triangles,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));

        let scene = Self::from_json(&text, base)?;
        log::info!("loaded scene {} with {} triangles", path.display(), scene.triangles.len());

        Ok(scene)
    }

    /// Parses a scene; mesh paths resolve against `base`.
    pub fn from_json(text: &str, base: &Path) -> Result<Self, Error> {
        let description: SceneDescription = serde_json::from_str(text)?;
        Self::from_description(description, base)
    }

    pub fn from_description(description: SceneDescription, base: &Path) -> Result<Self, Error> {
        let mut triangles = Vec::new();

        for model in description.models {
            let mut mesh = match model.geometry {
                GeometryDescription::Triangle { vertices } => Mesh::new(vec![vertices]),
                GeometryDescription::Mesh { path, centered } => {
                    let mesh = Mesh::load(base.join(path))?;
                    if centered {
                        mesh.centered()
                    } else {
                        mesh
                    }
                }
            };

            if let Some(transformation) = model.transform {
                let mut vertices = mesh.triangles().iter().flat_map(|t| t.vertices().iter());
                if vertices.any(|v| transformation.transform_point(*v).is_none()) {
                    return Err(Error::Scene(serde_json::Error::custom(
                        "model transform sends a vertex to infinity (w = 0)",
                    )));
                }
                mesh.transform(&transformation);
            }

            triangles.extend(mesh.into_triangles());
        }

        Ok(Self::new(description.viewport, description.camera, triangles))
    }

    /// Three triangles stacked along the view axis at `z = -0.5, 0, 0.5`.
    pub fn overlapping() -> Self {
        let triangles = (-1..2)
            .map(|i| {
                let z = f64::from(i) * 0.5;
                Triangle::new(Vec3::new(0.5, -0.5, z), Vec3::new(-0.5, -0.5, z), Vec3::new(0.0, 0.5, z))
            })
            .collect();

        Self::new(Viewport::default(), Camera::default(), triangles)
    }

    /// Three triangles arranged as the corners of a larger one.
    pub fn pyramid() -> Self {
        let v = |x, y| Vec3::new(x, y, 0.0);
        let triangles = vec![
            Triangle::new(v(0.5, 0.0), v(-0.5, 0.0), v(0.0, 1.0)),
            Triangle::new(v(0.0, -1.0), v(-1.0, -1.0), v(-0.5, 0.0)),
            Triangle::new(v(1.0, -1.0), v(0.0, -1.0), v(0.5, 0.0)),
        ];

        Self::new(Viewport::default(), Camera::default(), triangles)
    }

    /// Built-in scene by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "overlapping" => Some(Self::overlapping()),
            "pyramid" => Some(Self::pyramid()),
            _ => None,
        }
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn frame(&self) -> FrameTransform {
        self.camera.frame(self.viewport)
    }

    /// Picks with the scene's own camera and viewport.
    pub fn pick(&self, pointer: Pointer, mode: PickMode) -> Result<PickResult, PickError> {
        picking::pick(pointer, self.viewport, &self.frame(), &self.triangles, mode)
    }
}

#[test]
fn presets_have_three_triangles() {
    assert_eq!(3, Scene::overlapping().triangles().len());
    assert_eq!(3, Scene::pyramid().triangles().len());
    assert!(Scene::preset("teapot").is_none());
}

#[test]
fn model_transform_applies_to_triangles() {
    let json = r#"{
        "viewport": { "width": 640, "height": 480 },
        "models": [
            { "geometry": { "type": "triangle", "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]] } },
            { "geometry": { "type": "triangle", "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]] },
              "transform": [[1, 0, 0, 0], [0, 1, 0, 0], [0, 0, 1, 3], [0, 0, 0, 1]] }
        ]
    }"#;
    let scene = Scene::from_json(json, Path::new(".")).unwrap();

    assert_eq!(Viewport::new(640, 480), scene.viewport);
    assert_eq!(Camera::default(), scene.camera);
    assert_eq!(2, scene.triangles().len());
    assert_eq!(0.0, scene.triangles()[0].vertices()[0].z);
    assert_eq!(3.0, scene.triangles()[1].vertices()[0].z);
}

#[test]
fn projective_transform_to_infinity_is_rejected() {
    // The last row zeroes `w` for the vertex at the origin.
    let json = r#"{
        "models": [
            { "geometry": { "type": "triangle", "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]] },
              "transform": [[1, 0, 0, 0], [0, 1, 0, 0], [0, 0, 1, 0], [1, 0, 0, 0]] }
        ]
    }"#;

    assert!(matches!(Scene::from_json(json, Path::new(".")), Err(Error::Scene(..))));
}

#[test]
fn missing_mesh_is_an_io_error() {
    let json = r#"{ "models": [ { "geometry": { "type": "mesh", "path": "does-not-exist.stl" } } ] }"#;

    assert!(matches!(Scene::from_json(json, Path::new(".")), Err(Error::Io(..))));
}

#[test]
fn unknown_geometry_is_a_scene_error() {
    let json = r#"{ "models": [ { "geometry": { "type": "sphere", "radius": 1 } } ] }"#;

    assert!(matches!(Scene::from_json(json, Path::new(".")), Err(Error::Scene(..))));
}
