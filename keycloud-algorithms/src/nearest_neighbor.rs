//! CPU radius neighborhood backends

use keycloud_core::{Error, NeighborhoodIndex, Neighborhoods, Point3d, Result};
use rayon::prelude::*;
use rstar::{primitives::GeomWithData, RTree};

type IndexedPoint = GeomWithData<[f64; 3], usize>;

fn check_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "search radius must be positive and finite, got {}",
            radius
        )));
    }
    Ok(())
}

/// Spatial tree over a fixed point set, answering fixed-radius queries
pub struct RadiusTree {
    tree: RTree<IndexedPoint>,
}

impl RadiusTree {
    /// Bulk load a balanced R*-tree from the points
    pub fn new(points: &[Point3d]) -> Self {
        let entries: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(idx, p)| GeomWithData::new([p.x, p.y, p.z], idx))
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Indices of all points with `|p - query| <= radius`, ascending
    pub fn within(&self, query: &Point3d, radius: f64) -> Vec<usize> {
        let mut found: Vec<usize> = self
            .tree
            .locate_within_distance([query.x, query.y, query.z], radius * radius)
            .map(|entry| entry.data)
            .collect();
        found.sort_unstable();
        found
    }
}

/// Exact tree-based neighborhood search, O(N log N) on well spread data
#[derive(Debug, Clone, Copy, Default)]
pub struct RTreeIndex;

impl NeighborhoodIndex for RTreeIndex {
    fn name(&self) -> &str {
        "rtree"
    }

    fn radius_neighborhoods(&self, points: &[Point3d], radius: f64) -> Result<Neighborhoods> {
        check_radius(radius)?;

        let tree = RadiusTree::new(points);
        let lists: Vec<Vec<usize>> = points
            .par_iter()
            .map(|p| tree.within(p, radius))
            .collect();

        Ok(Neighborhoods::from_lists(lists))
    }
}

/// Simple brute force neighborhood search, O(N²); the reference for tests
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceIndex;

impl NeighborhoodIndex for BruteForceIndex {
    fn name(&self) -> &str {
        "brute-force"
    }

    fn radius_neighborhoods(&self, points: &[Point3d], radius: f64) -> Result<Neighborhoods> {
        check_radius(radius)?;

        let radius_squared = radius * radius;
        let lists: Vec<Vec<usize>> = points
            .par_iter()
            .map(|query| {
                points
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| (*p - query).norm_squared() <= radius_squared)
                    .map(|(idx, _)| idx)
                    .collect()
            })
            .collect();

        Ok(Neighborhoods::from_lists(lists))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_cloud(n: usize, seed: u64) -> Vec<Point3d> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| Point3d::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect()
    }

    #[test]
    fn test_radius_tree_within() {
        let points = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(0.5, 0.0, 0.0),
            Point3d::new(3.0, 0.0, 0.0),
        ];
        let tree = RadiusTree::new(&points);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.within(&points[0], 1.0), vec![0, 1]);
        assert_eq!(tree.within(&points[2], 1.0), vec![2]);
    }

    #[test]
    fn test_self_is_always_a_neighbor() {
        let points = random_cloud(200, 7);
        let neighborhoods = RTreeIndex.radius_neighborhoods(&points, 0.05).unwrap();
        for i in 0..points.len() {
            assert!(neighborhoods.contains(i, i), "point {} missing from its own neighborhood", i);
        }
    }

    #[test]
    fn test_rtree_matches_brute_force() {
        let points = random_cloud(500, 42);
        for radius in [0.1, 0.25, 0.6] {
            let tree = RTreeIndex.radius_neighborhoods(&points, radius).unwrap();
            let brute = BruteForceIndex.radius_neighborhoods(&points, radius).unwrap();
            assert_eq!(tree, brute, "backends disagree at radius {}", radius);
            assert!(tree.is_symmetric());
        }
    }

    #[test]
    fn test_planar_cloud() {
        // Many points share the same z; the tree must not degrade or panic
        let points: Vec<Point3d> = (0..40)
            .flat_map(|y| (0..40).map(move |x| Point3d::new(x as f64, y as f64, 0.0)))
            .collect();
        let tree = RTreeIndex.radius_neighborhoods(&points, 1.5).unwrap();
        let brute = BruteForceIndex.radius_neighborhoods(&points, 1.5).unwrap();
        assert_eq!(tree, brute);
        // Interior grid points see their 8-neighborhood plus themselves
        assert_eq!(tree.size(41), 9);
    }

    #[test]
    fn test_empty_cloud() {
        let neighborhoods = RTreeIndex.radius_neighborhoods(&[], 1.0).unwrap();
        assert!(neighborhoods.is_empty());
    }

    #[test]
    fn test_invalid_radius() {
        let points = random_cloud(3, 1);
        assert!(RTreeIndex.radius_neighborhoods(&points, 0.0).is_err());
        assert!(BruteForceIndex.radius_neighborhoods(&points, -1.0).is_err());
        assert!(RTreeIndex.radius_neighborhoods(&points, f64::NAN).is_err());
    }
}
