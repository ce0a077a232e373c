use geo_types::Point;

use crate::geo_types::PointDistance;
use crate::mask::OccupancyMask;

/// A placed (or candidate) circle in mask pixel space. Radius is whole
/// pixels; `offset` is extra clearance demanded from neighbours.
#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    pub id: usize,
    pub x: u32,
    pub y: u32,
    pub radius: u32,
    pub offset: f64,
}

impl Circle {
    pub fn new(id: usize, x: u32, y: u32, radius: u32, offset: f64) -> Circle {
        Circle {
            id,
            x,
            y,
            radius,
            offset,
        }
    }

    pub fn center(&self) -> Point<f64> {
        Point::new(self.x as f64, self.y as f64)
    }

    /// Minimum center distance two circles need to not overlap. The larger
    /// of the two offsets applies, so the relation is symmetric.
    pub fn clearance(&self, other: &Circle) -> f64 {
        self.radius as f64 + other.radius as f64 + self.offset.max(other.offset)
    }

    pub fn overlaps(&self, other: &Circle) -> bool {
        self.center().distance(&other.center()) < self.clearance(other)
    }

    /// Every pixel of the rasterized disk lands on an allowed mask pixel.
    pub fn is_inside(&self, mask: &OccupancyMask) -> bool {
        mask.contains_disk(self.x as i64, self.y as i64, self.radius)
    }
}
