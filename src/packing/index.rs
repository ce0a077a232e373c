use clap::ValueEnum;
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

use super::Circle;

/// How candidates are checked against already placed circles. Both give
/// identical answers; the R-tree only skips far away circles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapStrategy {
    /// Compare against every placed circle.
    #[default]
    BruteForce,
    /// Only compare against circles whose bounding boxes are within reach.
    Rtree,
}

/// Bounding box entry pointing back into the cloud's circle list.
#[derive(Clone, Debug, PartialEq)]
pub struct CircleRef {
    index: usize,
    x: f64,
    y: f64,
    radius: f64,
}

impl RTreeObject for CircleRef {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.x - self.radius, self.y - self.radius],
            [self.x + self.radius, self.y + self.radius],
        )
    }
}

#[derive(Debug)]
pub(crate) enum OverlapIndex {
    BruteForce,
    Rtree { tree: RTree<CircleRef>, max_offset: f64 },
}

impl OverlapIndex {
    pub(crate) fn new(strategy: OverlapStrategy) -> OverlapIndex {
        match strategy {
            OverlapStrategy::BruteForce => OverlapIndex::BruteForce,
            OverlapStrategy::Rtree => OverlapIndex::Rtree {
                tree: RTree::new(),
                max_offset: 0.,
            },
        }
    }

    /// `index` is the position of `circle` in the cloud's circle list.
    pub(crate) fn insert(&mut self, index: usize, circle: &Circle) {
        if let OverlapIndex::Rtree { tree, max_offset } = self {
            tree.insert(CircleRef {
                index,
                x: circle.x as f64,
                y: circle.y as f64,
                radius: circle.radius as f64,
            });
            *max_offset = max_offset.max(circle.offset);
        }
    }

    pub(crate) fn overlaps_any(&self, candidate: &Circle, circles: &[Circle]) -> bool {
        match self {
            OverlapIndex::BruteForce => circles.iter().any(|other| candidate.overlaps(other)),
            OverlapIndex::Rtree { tree, max_offset } => {
                let reach = candidate.radius as f64 + candidate.offset.max(*max_offset);
                let (x, y) = (candidate.x as f64, candidate.y as f64);
                let query = AABB::from_corners([x - reach, y - reach], [x + reach, y + reach]);
                tree.locate_in_envelope_intersecting(&query)
                    .any(|hit| candidate.overlaps(&circles[hit.index]))
            }
        }
    }
}
