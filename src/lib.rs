//! CPU ray picking.
//!
//! Given a pointer press, the current camera matrices and an ordered list of
//! triangles, find the nearest triangle under the pointer:
//!
//! ```
//! use raypick::{picking::PickMode, scene::Scene};
//!
//! let scene = Scene::overlapping();
//! let result = scene.pick(scene.viewport.center(), PickMode::Unproject).unwrap();
//! assert_eq!(Some(2), result.selected);
//! ```

pub mod camera;
pub mod error;
pub mod geometry;
pub mod intersection;
pub mod matrix;
pub mod pick_map;
pub mod picking;
pub mod ray;
pub mod scene;
pub mod transform;
pub mod vec3;
pub mod vec4;

pub use crate::error::Error;
pub use crate::intersection::Intersection;
