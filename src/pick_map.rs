//! Picks every pixel of a viewport and paints the result.
//!
//! Useful for eyeballing what each strategy selects: each triangle gets a
//! color, unselected pixels get the background.

use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use rayon::prelude::*;

use crate::{
    camera::FrameTransform,
    error::Error,
    geometry::Triangle,
    picking::{PickError, PickMode, Pointer, Viewport},
};

pub const BACKGROUND: Rgb<u8> = Rgb([0, 0, 128]);

const PALETTE: [Rgb<u8>; 8] = [
    Rgb([230, 25, 75]),
    Rgb([60, 180, 75]),
    Rgb([255, 225, 25]),
    Rgb([245, 130, 48]),
    Rgb([145, 30, 180]),
    Rgb([70, 240, 240]),
    Rgb([240, 50, 230]),
    Rgb([250, 190, 190]),
];

/// Color used for triangle `index`; cycles after eight triangles.
pub fn color(index: usize) -> Rgb<u8> {
    PALETTE[index % PALETTE.len()]
}

pub struct PickMap {
    width: u32,
    height: u32,
    /// Row-major selection per pixel.
    selections: Vec<Option<usize>>,
}

impl PickMap {
    /// Picks at the center of every pixel, one rayon task per row.
    pub fn render(
        viewport: Viewport,
        frame: &FrameTransform,
        triangles: &[Triangle],
        mode: PickMode,
    ) -> Result<Self, PickError> {
        viewport.validate()?;

        let width = viewport.width as usize;
        let mut selections = vec![None; width * viewport.height as usize];

        if triangles.is_empty() {
            log::debug!("empty pick map: no triangles");
            return Ok(Self {
                width: viewport.width,
                height: viewport.height,
                selections,
            });
        }

        let strategy = mode.strategy();
        selections.par_chunks_mut(width).enumerate().try_for_each(|(y, row)| {
            for (x, selection) in row.iter_mut().enumerate() {
                let pointer = Pointer::new(x as f64 + 0.5, y as f64 + 0.5);
                *selection = strategy.pick(pointer, viewport, frame, triangles)?.selected;
            }
            Ok::<(), PickError>(())
        })?;

        log::debug!("{} pick map rendered at {}x{}", strategy.name(), viewport.width, viewport.height);

        Ok(Self {
            width: viewport.width,
            height: viewport.height,
            selections,
        })
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<usize> {
        self.selections[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Number of pixels selecting each triangle, indexed like the triangles.
    pub fn coverage(&self, triangle_count: usize) -> Vec<usize> {
        let mut coverage = vec![0; triangle_count];
        for index in self.selections.iter().flatten() {
            if let Some(count) = coverage.get_mut(*index) {
                *count += 1;
            }
        }

        coverage
    }

    pub fn to_image(&self) -> RgbImage {
        ImageBuffer::from_fn(self.width, self.height, |x, y| self.get(x, y).map_or(BACKGROUND, color))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        self.to_image().save(path)?;
        log::info!("wrote pick map to {}", path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{matrix::Matrix4x4, scene::Scene, vec3::Vec3};

    #[test]
    fn center_selects_front_triangle() {
        let scene = Scene::overlapping();
        let viewport = Viewport::new(64, 36);
        let frame = scene.camera.frame(viewport);

        for mode in [PickMode::Unproject, PickMode::ProjectVertices] {
            let map = PickMap::render(viewport, &frame, scene.triangles(), mode).unwrap();
            let image = map.to_image();

            assert_eq!(Some(2), map.get(32, 18));
            assert_eq!(&color(2), image.get_pixel(32, 18));
            assert_eq!(&BACKGROUND, image.get_pixel(0, 0));
            assert_eq!(&BACKGROUND, image.get_pixel(63, 35));

            let coverage = map.coverage(3);
            assert!(coverage[2] > 0);
        }
    }

    #[test]
    fn empty_geometry_maps_to_background() {
        let frame = FrameTransform::new(Matrix4x4::scaling(Vec3::new(0.0, 1.0, 1.0)), Matrix4x4::identity());

        for mode in [PickMode::Unproject, PickMode::ProjectVertices] {
            let map = PickMap::render(Viewport::new(8, 4), &frame, &[], mode).unwrap();

            assert_eq!(None, map.get(3, 2));
            assert_eq!(Vec::<usize>::new(), map.coverage(0));
            assert!(map.to_image().pixels().all(|p| *p == BACKGROUND));
        }
    }

    #[test]
    fn degenerate_transform_fails_the_whole_map() {
        let frame = FrameTransform::new(Matrix4x4::scaling(Vec3::new(0.0, 1.0, 1.0)), Matrix4x4::identity());
        let triangles = Scene::overlapping().triangles().to_vec();

        let result = PickMap::render(Viewport::new(4, 4), &frame, &triangles, PickMode::Unproject);
        assert!(matches!(result, Err(PickError::DegenerateTransform)));
    }
}
