//! Random circle packing inside a binary mask.
//!
//! Radii are drawn from a distribution that favours small circles and are
//! placed largest first. Each radius gets a fixed number of attempts at a
//! random allowed coordinate; a candidate is accepted when its disk sits
//! entirely on allowed pixels and it overlaps none of the circles placed so
//! far. When the attempts run out the radius is dropped and the next one is
//! tried, so a run can end with fewer circles than requested.
//!
//! ```no_run
//! use plotty_sketches::mask::OccupancyMask;
//! use plotty_sketches::packing::{CircleCloud, PackingConfig};
//! use rand::{rngs::SmallRng, SeedableRng};
//!
//! let mask = OccupancyMask::open("mask.png", false).unwrap();
//! let config = PackingConfig::default();
//! let mut cloud = CircleCloud::new(mask, config.overlap);
//! let report = cloud
//!     .place(&config, &mut SmallRng::seed_from_u64(12345))
//!     .unwrap();
//! println!("Placed {} of {}", report.placed, report.requested);
//! ```
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::errors::PackingError;
use crate::mask::{disk_pixels, OccupancyMask};

pub mod circle;
pub use circle::Circle;

pub mod index;
pub use index::OverlapStrategy;
use index::OverlapIndex;

pub mod radii;
pub use radii::RadiusDistribution;

/// Progress is logged every this many radius slots.
const PROGRESS_INTERVAL: usize = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingConfig {
    /// How many circles to attempt.
    pub count: usize,
    pub r_min: f64,
    pub r_max: f64,
    /// Attempts per radius before giving up on it.
    pub max_attempts: usize,
    /// Extra distance between circles, in pixels.
    pub offset: f64,
    /// Periodically drop covered pixels from the sampling pool.
    pub update_pool: bool,
    /// Accepted circles between pool updates.
    pub update_interval: usize,
    pub overlap: OverlapStrategy,
}

impl Default for PackingConfig {
    fn default() -> Self {
        PackingConfig {
            count: 300,
            r_min: 2.0,
            r_max: 15.0,
            max_attempts: 100,
            offset: 0.0,
            update_pool: false,
            update_interval: 100,
            overlap: OverlapStrategy::default(),
        }
    }
}

impl PackingConfig {
    pub fn validate(&self) -> Result<(), PackingError> {
        if !self.offset.is_finite() || self.offset < 0. {
            return Err(PackingError::InvalidOffset(self.offset));
        }
        RadiusDistribution::new(self.r_min, self.r_max).map(|_| ())
    }
}

/// A radius slot that ran out of attempts.
#[derive(Clone, Debug, PartialEq)]
pub struct AbandonedSlot {
    pub slot: usize,
    pub radius: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlacementReport {
    pub requested: usize,
    pub placed: usize,
    pub abandoned: Vec<AbandonedSlot>,
    /// Candidates tried over the whole run.
    pub attempts: usize,
}

impl PlacementReport {
    pub fn is_complete(&self) -> bool {
        self.placed == self.requested
    }
}

/// What happened to a single candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    Accepted,
    OutsideMask,
    Overlaps,
}

/// The mask, the pool of coordinates candidates are drawn from, and the
/// circles accepted so far (in placement order).
#[derive(Debug)]
pub struct CircleCloud {
    mask: OccupancyMask,
    pool: Vec<(u32, u32)>,
    circles: Vec<Circle>,
    index: OverlapIndex,
    next_id: usize,
}

impl CircleCloud {
    pub fn new(mask: OccupancyMask, overlap: OverlapStrategy) -> CircleCloud {
        let pool = mask.allowed_coords();
        CircleCloud {
            mask,
            pool,
            circles: vec![],
            index: OverlapIndex::new(overlap),
            next_id: 0,
        }
    }

    pub fn mask(&self) -> &OccupancyMask {
        &self.mask
    }

    pub fn width(&self) -> u32 {
        self.mask.width()
    }

    pub fn height(&self) -> u32 {
        self.mask.height()
    }

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn overlaps_any(&self, candidate: &Circle) -> bool {
        self.index.overlaps_any(candidate, &self.circles)
    }

    /// Containment is tested before overlap.
    pub fn check(&self, candidate: &Circle) -> AttemptOutcome {
        if !candidate.is_inside(&self.mask) {
            AttemptOutcome::OutsideMask
        } else if self.overlaps_any(candidate) {
            AttemptOutcome::Overlaps
        } else {
            AttemptOutcome::Accepted
        }
    }

    /// Validates and appends a circle, handing it the next id. Returns the
    /// id, or the reason it was refused.
    pub fn insert(&mut self, x: u32, y: u32, radius: u32, offset: f64) -> Result<usize, AttemptOutcome> {
        let candidate = Circle::new(self.next_id, x, y, radius, offset);
        match self.check(&candidate) {
            AttemptOutcome::Accepted => {
                let id = candidate.id;
                self.index.insert(self.circles.len(), &candidate);
                self.circles.push(candidate);
                self.next_id += 1;
                Ok(id)
            }
            refused => Err(refused),
        }
    }

    /// One candidate at a random pool coordinate. `None` when the pool is
    /// empty.
    pub fn attempt<R: Rng + ?Sized>(
        &mut self,
        radius: u32,
        offset: f64,
        rng: &mut R,
    ) -> Option<Result<usize, AttemptOutcome>> {
        if self.pool.is_empty() {
            return None;
        }
        let (x, y) = self.pool[rng.gen_range(0..self.pool.len())];
        Some(self.insert(x, y, radius, offset))
    }

    /// Rebuilds the sampling pool without the pixels already covered by
    /// circles. Containment is still tested against the full mask.
    pub fn update_pool(&mut self) {
        let width = self.mask.width() as usize;
        let mut covered = vec![false; width * self.mask.height() as usize];
        for circle in &self.circles {
            for (x, y) in disk_pixels(circle.x as i64, circle.y as i64, circle.radius) {
                if self.mask.is_allowed(x, y) {
                    covered[y as usize * width + x as usize] = true;
                }
            }
        }
        let before = self.pool.len();
        self.pool = self
            .mask
            .allowed_coords()
            .into_iter()
            .filter(|(x, y)| !covered[*y as usize * width + *x as usize])
            .collect();
        info!(before, after = self.pool.len(), "Updated mask coordinates");
    }

    /// Samples radii from the config and places them.
    pub fn place<R: Rng + ?Sized>(
        &mut self,
        config: &PackingConfig,
        rng: &mut R,
    ) -> Result<PlacementReport, PackingError> {
        config.validate()?;
        let radii = RadiusDistribution::new(config.r_min, config.r_max)?.sample(config.count, rng);
        Ok(self.place_radii(&radii, config, rng))
    }

    /// Places the given radii in order. Fractional radii are truncated.
    pub fn place_radii<R: Rng + ?Sized>(
        &mut self,
        radii: &[f64],
        config: &PackingConfig,
        rng: &mut R,
    ) -> PlacementReport {
        let mut report = PlacementReport {
            requested: radii.len(),
            ..Default::default()
        };
        let mut exhausted = false;

        for (slot, radius) in radii.iter().enumerate() {
            let radius = *radius as u32;
            if slot % PROGRESS_INTERVAL == 0 {
                info!("circle #{}", slot);
            }
            debug!(slot, radius, "Placing circle");

            let mut accepted = None;
            for attempt in 0..config.max_attempts {
                let outcome = match self.attempt(radius, config.offset, rng) {
                    Some(outcome) => outcome,
                    None => break,
                };
                report.attempts += 1;
                match outcome {
                    Ok(id) => {
                        accepted = Some(id);
                        break;
                    }
                    Err(AttemptOutcome::Overlaps) => trace!(slot, attempt, "Overlaps"),
                    Err(_) => trace!(slot, attempt, "Circle does not fit mask"),
                }
            }

            match accepted {
                Some(id) => {
                    report.placed += 1;
                    debug!(slot, id, "Circle added");
                    if config.update_pool
                        && config.update_interval > 0
                        && self.circles.len() % config.update_interval == 0
                    {
                        self.update_pool();
                    }
                }
                None => {
                    if self.pool.is_empty() {
                        if !exhausted {
                            warn!(slot, "No allowed coordinates left, skipping remaining circles");
                            exhausted = true;
                        }
                    } else {
                        info!("Giving up with circle {} (r={}). Trying next circle radius", slot, radius);
                    }
                    report.abandoned.push(AbandonedSlot { slot, radius });
                }
            }
        }

        info!(
            placed = report.placed,
            requested = report.requested,
            abandoned = report.abandoned.len(),
            attempts = report.attempts,
            "Placement finished"
        );
        report
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geo_types::PointDistance;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn assert_valid(cloud: &CircleCloud) {
        let circles = cloud.circles();
        for (i, a) in circles.iter().enumerate() {
            for (x, y) in disk_pixels(a.x as i64, a.y as i64, a.radius) {
                assert!(cloud.mask().is_allowed(x, y), "circle {} leaves the mask", a.id);
            }
            for b in circles.iter().skip(i + 1) {
                let d = a.center().distance(&b.center());
                assert!(
                    d >= a.radius as f64 + b.radius as f64 + a.offset.max(b.offset),
                    "circles {} and {} overlap",
                    a.id,
                    b.id
                );
            }
        }
    }

    #[test]
    fn test_ten_fixed_radius_circles() {
        let mut cloud = CircleCloud::new(OccupancyMask::filled(100, 100, true), OverlapStrategy::BruteForce);
        let config = PackingConfig {
            count: 10,
            r_min: 5.,
            r_max: 5.,
            max_attempts: 100,
            offset: 0.,
            ..Default::default()
        };
        let report = cloud.place(&config, &mut SmallRng::seed_from_u64(12345)).unwrap();
        assert_eq!(report.placed, 10);
        assert!(report.is_complete());
        assert!(cloud.circles().iter().all(|c| c.radius == 5));
        assert_valid(&cloud);
    }

    #[test]
    fn test_overcrowded_mask_terminates() {
        let mut cloud = CircleCloud::new(OccupancyMask::filled(10, 10, true), OverlapStrategy::BruteForce);
        let config = PackingConfig {
            count: 50,
            r_min: 5.,
            r_max: 5.,
            max_attempts: 100,
            ..Default::default()
        };
        let report = cloud.place(&config, &mut SmallRng::seed_from_u64(3)).unwrap();
        // A radius 5 disk is 11 pixels across, wider than the mask.
        assert!(report.placed < 50);
        assert_eq!(report.placed, 0);
        assert_eq!(report.placed + report.abandoned.len(), 50);
        assert!(report.attempts <= 50 * 100);
        assert_valid(&cloud);
    }

    #[test]
    fn test_forbidden_mask_places_nothing() {
        let mut cloud = CircleCloud::new(OccupancyMask::filled(64, 64, false), OverlapStrategy::BruteForce);
        assert_eq!(cloud.pool_len(), 0);
        let config = PackingConfig {
            count: 40,
            ..Default::default()
        };
        let report = cloud.place(&config, &mut SmallRng::seed_from_u64(1)).unwrap();
        assert_eq!(report.placed, 0);
        assert_eq!(report.attempts, 0);
        assert_eq!(report.abandoned.len(), 40);
        assert!(cloud.circles().is_empty());
    }

    #[test]
    fn test_default_run_respects_mask() {
        // Ring shaped allowed region.
        let mask = OccupancyMask::from_fn(160, 160, |x, y| {
            let d2 = (x as i64 - 80).pow(2) + (y as i64 - 80).pow(2);
            d2 < 70 * 70 && d2 > 25 * 25
        });
        let mut cloud = CircleCloud::new(mask, OverlapStrategy::BruteForce);
        let config = PackingConfig {
            count: 150,
            offset: 1.,
            ..Default::default()
        };
        let report = cloud.place(&config, &mut SmallRng::seed_from_u64(99)).unwrap();
        assert!(report.placed > 0);
        assert_eq!(cloud.circles().len(), report.placed);
        // Largest radii go first.
        assert!(cloud.circles().windows(2).all(|w| w[0].radius >= w[1].radius));
        assert_valid(&cloud);
    }

    #[test]
    fn test_pool_update_keeps_invariants() {
        let mut cloud = CircleCloud::new(OccupancyMask::filled(120, 120, true), OverlapStrategy::BruteForce);
        let config = PackingConfig {
            count: 120,
            r_min: 2.,
            r_max: 8.,
            update_pool: true,
            update_interval: 10,
            ..Default::default()
        };
        let before = cloud.pool_len();
        cloud.place(&config, &mut SmallRng::seed_from_u64(5)).unwrap();
        assert!(cloud.pool_len() < before);
        assert_valid(&cloud);
    }

    #[test]
    fn test_update_pool_drops_covered_pixels() {
        let mut cloud = CircleCloud::new(OccupancyMask::filled(30, 30, true), OverlapStrategy::BruteForce);
        cloud.insert(15, 15, 3, 0.).unwrap();
        cloud.update_pool();
        assert_eq!(cloud.pool_len(), 900 - disk_pixels(15, 15, 3).count());
    }

    #[test]
    fn test_rtree_strategy_same_result() {
        let mask = OccupancyMask::from_fn(100, 100, |x, y| (x / 20 + y / 20) % 2 == 0 || x > 60);
        let config = PackingConfig {
            count: 80,
            r_min: 1.,
            r_max: 9.,
            offset: 2.,
            ..Default::default()
        };
        let mut brute = CircleCloud::new(mask.clone(), OverlapStrategy::BruteForce);
        let mut rtree = CircleCloud::new(mask, OverlapStrategy::Rtree);
        brute.place(&config, &mut SmallRng::seed_from_u64(42)).unwrap();
        rtree.place(&config, &mut SmallRng::seed_from_u64(42)).unwrap();
        assert_eq!(brute.circles(), rtree.circles());
    }

    #[test]
    fn test_ids_come_from_the_cloud() {
        let mut a = CircleCloud::new(OccupancyMask::filled(50, 50, true), OverlapStrategy::BruteForce);
        let mut b = CircleCloud::new(OccupancyMask::filled(50, 50, true), OverlapStrategy::BruteForce);
        assert_eq!(a.insert(10, 10, 3, 0.), Ok(0));
        assert_eq!(a.insert(30, 30, 3, 0.), Ok(1));
        assert_eq!(a.insert(31, 30, 3, 0.), Err(AttemptOutcome::Overlaps));
        assert_eq!(a.insert(1, 1, 3, 0.), Err(AttemptOutcome::OutsideMask));
        // Independent counter per cloud.
        assert_eq!(b.insert(10, 10, 3, 0.), Ok(0));
    }

    #[test]
    fn test_invalid_config() {
        let mut cloud = CircleCloud::new(OccupancyMask::filled(10, 10, true), OverlapStrategy::BruteForce);
        let config = PackingConfig {
            r_min: 10.,
            r_max: 2.,
            ..Default::default()
        };
        assert!(matches!(
            cloud.place(&config, &mut SmallRng::seed_from_u64(0)),
            Err(PackingError::InvalidRadiusRange { .. })
        ));
        let config = PackingConfig {
            offset: -1.,
            ..Default::default()
        };
        assert!(cloud.place(&config, &mut SmallRng::seed_from_u64(0)).is_err());
    }
}
