//! Binary occupancy masks, built from raster images.
//!
//! Circles (or anything else) may only be placed on *allowed* pixels. By
//! default the bright parts of the source image are allowed; inverting the
//! mask swaps that so shapes land on the dark parts instead.
use std::path::Path;

use image::GrayImage;
use tracing::debug;

use crate::errors::MaskError;

pub mod otsu;
pub use otsu::otsu_threshold;

/// A 2D grid of allowed/forbidden pixels. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyMask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl OccupancyMask {
    pub fn from_fn<F>(width: u32, height: u32, mut allowed: F) -> OccupancyMask
    where
        F: FnMut(u32, u32) -> bool,
    {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(allowed(x, y));
            }
        }
        OccupancyMask {
            width,
            height,
            cells,
        }
    }

    /// A mask where every pixel has the same state.
    pub fn filled(width: u32, height: u32, allowed: bool) -> OccupancyMask {
        OccupancyMask {
            width,
            height,
            cells: vec![allowed; width as usize * height as usize],
        }
    }

    /// Binarizes a grayscale image with an automatically chosen (Otsu)
    /// threshold. Pixels brighter than the threshold are allowed, unless
    /// `invert` is set.
    pub fn from_luma(image: &GrayImage, invert: bool) -> Result<OccupancyMask, MaskError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(MaskError::Empty {
                width: image.width(),
                height: image.height(),
            });
        }
        let threshold = otsu_threshold(image);
        debug!(threshold, invert, "Binarizing mask");
        Ok(OccupancyMask::from_fn(image.width(), image.height(), |x, y| {
            (image.get_pixel(x, y).0[0] > threshold) != invert
        }))
    }

    /// Loads any image format the `image` crate understands and binarizes it.
    pub fn open<P: AsRef<Path>>(path: P, invert: bool) -> Result<OccupancyMask, MaskError> {
        let gray = image::open(path)?.to_luma8();
        OccupancyMask::from_luma(&gray, invert)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Anything outside the canvas is forbidden.
    pub fn is_allowed(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    pub fn allowed_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    /// All allowed coordinates, row-major.
    pub fn allowed_coords(&self) -> Vec<(u32, u32)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, allowed)| **allowed)
            .map(|(i, _)| {
                (
                    (i % self.width as usize) as u32,
                    (i / self.width as usize) as u32,
                )
            })
            .collect()
    }

    /// True when every pixel of the disk is allowed. Equivalent to drawing
    /// the disk into a scratch mask, AND-ing it with this mask and comparing
    /// the pixel counts, except that a disk poking over the canvas edge is
    /// never contained.
    pub fn contains_disk(&self, cx: i64, cy: i64, radius: u32) -> bool {
        disk_pixels(cx, cy, radius).all(|(x, y)| self.is_allowed(x, y))
    }
}

/// Pixels of a filled disk: every `(x, y)` with `(x-cx)² + (y-cy)² <= r²`.
pub fn disk_pixels(cx: i64, cy: i64, radius: u32) -> impl Iterator<Item = (i64, i64)> {
    let r = radius as i64;
    (-r..=r).flat_map(move |dy| {
        let half = ((r * r - dy * dy) as f64).sqrt().floor() as i64;
        (-half..=half).map(move |dx| (cx + dx, cy + dy))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use image::Luma;

    #[test]
    fn test_disk_pixel_count() {
        assert_eq!(disk_pixels(0, 0, 0).count(), 1);
        // r=1 is the 5 pixel plus sign.
        assert_eq!(disk_pixels(0, 0, 1).count(), 5);
        let r = 5i64;
        let brute = (-r..=r)
            .flat_map(|y| (-r..=r).map(move |x| (x, y)))
            .filter(|(x, y)| x * x + y * y <= r * r)
            .count();
        assert_eq!(disk_pixels(10, 10, 5).count(), brute);
    }

    #[test]
    fn test_from_luma_and_invert() {
        let img = GrayImage::from_fn(10, 4, |x, _y| if x < 5 { Luma([0]) } else { Luma([255]) });
        let mask = OccupancyMask::from_luma(&img, false).unwrap();
        assert_eq!(mask.allowed_count(), 20);
        assert!(mask.is_allowed(7, 1));
        assert!(!mask.is_allowed(2, 1));
        let inverted = OccupancyMask::from_luma(&img, true).unwrap();
        assert!(inverted.is_allowed(2, 1));
        assert!(!inverted.is_allowed(7, 1));
    }

    #[test]
    fn test_empty_image_rejected() {
        let img = GrayImage::new(0, 10);
        assert!(matches!(
            OccupancyMask::from_luma(&img, false),
            Err(MaskError::Empty { .. })
        ));
    }

    #[test]
    fn test_allowed_coords_row_major() {
        let mask = OccupancyMask::from_fn(3, 2, |x, y| x == y || x == 2);
        assert_eq!(mask.allowed_coords(), vec![(0, 0), (2, 0), (1, 1), (2, 1)]);
    }

    #[test]
    fn test_contains_disk() {
        let mask = OccupancyMask::filled(20, 20, true);
        assert!(mask.contains_disk(10, 10, 5));
        assert!(mask.contains_disk(5, 5, 5));
        // Pokes over the left edge.
        assert!(!mask.contains_disk(4, 10, 5));
        let holed = OccupancyMask::from_fn(20, 20, |x, y| !(x == 12 && y == 10));
        assert!(!holed.contains_disk(10, 10, 2));
        assert!(holed.contains_disk(10, 10, 1));
        // Same question, same answer.
        assert_eq!(holed.contains_disk(10, 10, 2), holed.contains_disk(10, 10, 2));
    }

    #[test]
    fn test_open_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.png");
        let img = GrayImage::from_fn(16, 16, |x, y| {
            if (x as i32 - 8).pow(2) + (y as i32 - 8).pow(2) < 25 {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        img.save(&path).unwrap();
        let mask = OccupancyMask::open(&path, false).unwrap();
        assert_eq!(mask.width(), 16);
        assert!(mask.is_allowed(8, 8));
        assert!(!mask.is_allowed(0, 0));
    }
}
