//! Resolves a pointer press into the triangle under it.
//!
//! Two strategies share the same Möller–Trumbore test:
//!
//! * [`Unproject`] maps the pointer back through the inverse transform once
//!   and casts a world-space ray against the untouched triangles.
//! * [`ProjectVertices`] maps every vertex into normalized window space and
//!   casts a ray straight along `+z` from the pointer.
//!
//! Both select the same triangle for well-formed input; they differ in cost
//! (one unprojection against one projection per vertex). Picking is a linear
//! scan without any spatial index.

use std::{fmt, str::FromStr, time::Instant};

use serde::{Deserialize, Serialize};

use crate::{camera::FrameTransform, geometry::Triangle, ray::Ray};

mod project;
mod unproject;

pub use self::project::ProjectVertices;
pub use self::unproject::{unproject_ray, Unproject};
pub use crate::geometry::intersect_ray_triangle;

/// Pointer position in pixels, origin top-left, `y` growing downward.
#[derive(Copy, Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
}

impl Pointer {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport size in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }

    /// Pixel center of the viewport.
    pub fn center(&self) -> Pointer {
        Pointer::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    pub(crate) fn validate(&self) -> Result<(), PickError> {
        if self.width == 0 || self.height == 0 {
            return Err(PickError::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }

        Ok(())
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Outcome of one pick. Superseded by the next one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PickResult {
    /// Index of the nearest struck triangle.
    pub selected: Option<usize>,
    /// Ray parameter of the hit, in the space of the strategy that produced
    /// it. Infinite when nothing was selected.
    pub distance: f64,
}

impl PickResult {
    pub fn none() -> Self {
        Self {
            selected: None,
            distance: f64::INFINITY,
        }
    }

    pub fn hit(index: usize, distance: f64) -> Self {
        Self {
            selected: Some(index),
            distance,
        }
    }

    /// Selection as a signed index, `-1` for none, the form shaders consume.
    pub fn selected_or_sentinel(&self) -> i32 {
        self.selected.and_then(|i| i32::try_from(i).ok()).unwrap_or(-1)
    }
}

impl Default for PickResult {
    fn default() -> Self {
        Self::none()
    }
}

/// Why a pick produced no result for this frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PickError {
    /// `projection * model_view` cannot be inverted.
    DegenerateTransform,
    /// A viewport dimension is zero.
    InvalidViewport { width: u32, height: u32 },
}

impl fmt::Display for PickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateTransform => write!(f, "projection * model-view is not invertible"),
            Self::InvalidViewport { width, height } => {
                write!(f, "invalid viewport {width}x{height}")
            }
        }
    }
}

impl std::error::Error for PickError {}

/// A way of turning a pointer press into a ray test over the triangles.
pub trait PickStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn pick(
        &self,
        pointer: Pointer,
        viewport: Viewport,
        frame: &FrameTransform,
        triangles: &[Triangle],
    ) -> Result<PickResult, PickError>;
}

/// Selects which [`PickStrategy`] handles a press.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickMode {
    #[default]
    Unproject,
    #[serde(alias = "project")]
    ProjectVertices,
}

impl PickMode {
    pub fn strategy(self) -> &'static dyn PickStrategy {
        match self {
            PickMode::Unproject => &Unproject,
            PickMode::ProjectVertices => &ProjectVertices,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            PickMode::Unproject => PickMode::ProjectVertices,
            PickMode::ProjectVertices => PickMode::Unproject,
        }
    }
}

impl fmt::Display for PickMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.strategy().name())
    }
}

impl FromStr for PickMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unproject" => Ok(PickMode::Unproject),
            "project" | "project_vertices" => Ok(PickMode::ProjectVertices),
            _ => Err(format!("unknown pick mode {s:?}, expected \"unproject\" or \"project\"")),
        }
    }
}

/// Nearest triangle struck by `ray`.
///
/// Triangles are tested in index order and a later hit replaces the current
/// one only when strictly closer, so equal distances keep the lowest index.
pub fn pick_nearest(ray: &Ray<f64>, triangles: &[Triangle]) -> PickResult {
    nearest(ray, triangles.iter().copied().enumerate())
}

pub(crate) fn nearest<I>(ray: &Ray<f64>, triangles: I) -> PickResult
where
    I: IntoIterator<Item = (usize, Triangle)>,
{
    let mut result = PickResult::none();

    for (index, triangle) in triangles {
        if let Some(t) = intersect_ray_triangle(ray, &triangle) {
            log::trace!("triangle {} intersected at ray pos {}", index, t);
            if t < result.distance && ray.contains(t) {
                result = PickResult::hit(index, t);
            }
        }
    }

    result
}

/// Runs one pick with the strategy chosen by `mode`.
///
/// Empty geometry is not an error: it selects nothing.
pub fn pick(
    pointer: Pointer,
    viewport: Viewport,
    frame: &FrameTransform,
    triangles: &[Triangle],
    mode: PickMode,
) -> Result<PickResult, PickError> {
    if triangles.is_empty() {
        log::debug!("nothing to pick: no triangles");
        return Ok(PickResult::none());
    }

    let strategy = mode.strategy();
    let started = Instant::now();
    let result = strategy.pick(pointer, viewport, frame, triangles)?;

    log::debug!(
        "{} pick at ({}, {}): {:?}, took {:.4} ms",
        strategy.name(),
        pointer.x,
        pointer.y,
        result.selected,
        started.elapsed().as_secs_f64() * 1000.0
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{matrix::Matrix4x4, vec3::Vec3};

    fn facing(z: f64) -> Triangle {
        Triangle::new(Vec3::new(0.5, -0.5, z), Vec3::new(-0.5, -0.5, z), Vec3::new(0.0, 0.5, z))
    }

    fn down_z() -> Ray<f64> {
        Ray::forward(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0))
    }

    #[test]
    fn nearest_hit_wins_regardless_of_order() {
        let result = pick_nearest(&down_z(), &[facing(1.0), facing(-1.0), facing(0.0)]);

        assert_eq!(Some(1), result.selected);
        assert!((result.distance - 4.0).abs() < 1e-12);
    }

    #[test]
    fn ties_keep_lowest_index() {
        let result = pick_nearest(&down_z(), &[facing(3.0), facing(0.0), facing(0.0)]);
        assert_eq!(Some(1), result.selected);
    }

    #[test]
    fn behind_origin_is_never_selected() {
        let ray = Ray::forward(Vec3::new(0.0, 0.0, 0.25), Vec3::new(0.0, 0.0, 1.0));
        let result = pick_nearest(&ray, &[facing(-0.5), facing(0.0), facing(0.5)]);

        assert_eq!(Some(2), result.selected);
        assert!((result.distance - 0.25).abs() < 1e-12);
    }

    #[test]
    fn miss_is_none() {
        let ray = Ray::forward(Vec3::new(3.0, 3.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let result = pick_nearest(&ray, &[facing(0.0)]);

        assert_eq!(PickResult::none(), result);
        assert_eq!(-1, result.selected_or_sentinel());
    }

    #[test]
    fn empty_geometry_selects_nothing() {
        let frame = FrameTransform::new(Matrix4x4::identity(), Matrix4x4::identity());

        for mode in [PickMode::Unproject, PickMode::ProjectVertices] {
            let result = pick(Pointer::new(1.0, 1.0), Viewport::new(2, 2), &frame, &[], mode);
            assert_eq!(Ok(PickResult::none()), result);
        }
    }

    #[test]
    fn mode_round_trips_through_strings() {
        for mode in [PickMode::Unproject, PickMode::ProjectVertices] {
            assert_eq!(Ok(mode), mode.to_string().parse());
            assert_eq!(mode, mode.toggle().toggle());
        }
        assert_eq!(Ok(PickMode::ProjectVertices), "project".parse());
        assert!("nearest".parse::<PickMode>().is_err());
    }
}
