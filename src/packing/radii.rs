use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::errors::PackingError;

/// Slope of the linear weighting. Bigger means stronger bias toward the
/// small end of the range.
pub const RADIUS_WEIGHT_SLOPE: f64 = 20.0;
/// Added on top of the shift so the largest radius still gets picked now
/// and then.
pub const RADIUS_WEIGHT_FLOOR: f64 = 5.0;
/// Pool entries per unit of radius range.
pub const RADIUS_POOL_DENSITY: f64 = 10.0;

/// Weighted pool of candidate radii, skewed toward small values.
#[derive(Clone, Debug)]
pub struct RadiusDistribution {
    pool: Vec<f64>,
    weights: Vec<f64>,
}

impl RadiusDistribution {
    pub fn new(r_min: f64, r_max: f64) -> Result<RadiusDistribution, PackingError> {
        if !r_min.is_finite() || !r_max.is_finite() || r_min < 0. || r_max < r_min {
            return Err(PackingError::InvalidRadiusRange { r_min, r_max });
        }
        let size = (((r_max - r_min) * RADIUS_POOL_DENSITY).floor() as usize).max(1);
        let pool: Vec<f64> = if size == 1 {
            vec![r_min]
        } else {
            let step = (r_max - r_min) / (size - 1) as f64;
            (0..size).map(|i| r_min + step * i as f64).collect()
        };

        let raw: Vec<f64> = pool.iter().map(|r| -RADIUS_WEIGHT_SLOPE * r).collect();
        let lowest = raw.iter().cloned().fold(f64::INFINITY, f64::min);
        let shifted: Vec<f64> = raw
            .iter()
            .map(|w| w + lowest.abs() + RADIUS_WEIGHT_FLOOR)
            .collect();
        let total: f64 = shifted.iter().sum();
        let weights = shifted.iter().map(|w| w / total).collect();
        Ok(RadiusDistribution { pool, weights })
    }

    pub fn pool(&self) -> &[f64] {
        &self.pool
    }

    /// Normalized: sums to one.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Draws `count` radii with replacement, largest first.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<f64> {
        // Weights are all strictly positive, so this can't fail.
        let index = match WeightedIndex::new(&self.weights) {
            Ok(index) => index,
            Err(_) => return vec![self.pool[0]; count],
        };
        let mut radii: Vec<f64> = (0..count).map(|_| self.pool[index.sample(rng)]).collect();
        radii.sort_by(|a, b| b.total_cmp(a));
        radii
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_rejects_inverted_range() {
        assert!(RadiusDistribution::new(15., 2.).is_err());
        assert!(RadiusDistribution::new(-1., 2.).is_err());
        assert!(RadiusDistribution::new(1., f64::NAN).is_err());
    }

    #[test]
    fn test_degenerate_range() {
        let dist = RadiusDistribution::new(5., 5.).unwrap();
        assert_eq!(dist.pool(), &[5.]);
        let mut rng = SmallRng::seed_from_u64(1);
        let radii = dist.sample(20, &mut rng);
        assert_eq!(radii.len(), 20);
        assert!(radii.iter().all(|r| *r == 5.));
    }

    #[test]
    fn test_pool_shape() {
        let dist = RadiusDistribution::new(2., 15.).unwrap();
        assert_eq!(dist.pool().len(), 130);
        assert_eq!(dist.pool()[0], 2.);
        assert!((dist.pool()[129] - 15.).abs() < 1e-9);
        assert!((dist.weights().iter().sum::<f64>() - 1.).abs() < 1e-9);
        // Monotonically decreasing with radius.
        assert!(dist.weights().windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_sorted_and_skewed() {
        let dist = RadiusDistribution::new(2., 15.).unwrap();
        let mut rng = SmallRng::seed_from_u64(12345);
        let radii = dist.sample(2000, &mut rng);
        assert!(radii.windows(2).all(|w| w[0] >= w[1]));
        assert!(radii.iter().all(|r| (2.0..=15.0).contains(r)));
        let small = radii.iter().filter(|r| **r < 8.5).count();
        assert!(small > 1000, "only {} small radii", small);
    }

    #[test]
    fn test_seeded_is_repeatable() {
        let dist = RadiusDistribution::new(3., 9.).unwrap();
        let a = dist.sample(50, &mut SmallRng::seed_from_u64(7));
        let b = dist.sample(50, &mut SmallRng::seed_from_u64(7));
        assert_eq!(a, b);
    }
}
