//! Radius neighborhoods in compressed sparse row form
//!
//! Row `i` lists, in ascending order, every point within the search radius of
//! point `i`, including `i` itself. Built once per run and read-only after.

use crate::error::{Error, Result};
use crate::point::Point3d;

/// Fixed-radius adjacency of a point cloud
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Neighborhoods {
    offsets: Vec<usize>,
    indices: Vec<usize>,
}

impl Neighborhoods {
    /// Build from one neighbor list per point. Lists are sorted and deduplicated.
    pub fn from_lists(lists: Vec<Vec<usize>>) -> Self {
        let total: usize = lists.iter().map(Vec::len).sum();
        let mut offsets = Vec::with_capacity(lists.len() + 1);
        let mut indices = Vec::with_capacity(total);
        offsets.push(0);

        for mut list in lists {
            list.sort_unstable();
            list.dedup();
            indices.extend_from_slice(&list);
            offsets.push(indices.len());
        }

        Self { offsets, indices }
    }

    /// Number of points (rows)
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted neighbor indices of point `i`
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.indices[self.offsets[i]..self.offsets[i + 1]]
    }

    /// |Neighborhood(i)|, counting `i` itself
    pub fn size(&self, i: usize) -> usize {
        self.offsets[i + 1] - self.offsets[i]
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.neighbors(i).binary_search(&j).is_ok()
    }

    /// Iterate over the rows in point order
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        (0..self.len()).map(move |i| self.neighbors(i))
    }

    /// Total number of stored (i, j) pairs
    pub fn pair_count(&self) -> usize {
        self.indices.len()
    }

    /// Average neighborhood size
    pub fn mean_size(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.pair_count() as f64 / self.len() as f64
        }
    }

    /// Check that this is a well-formed adjacency over `num_points` points:
    /// one row per point, every index in range, every point in its own row.
    pub fn check_consistency(&self, num_points: usize) -> Result<()> {
        if self.len() != num_points {
            return Err(Error::Algorithm(format!(
                "expected {} neighborhoods, got {}",
                num_points,
                self.len()
            )));
        }

        if let Some(&j) = self.indices.iter().find(|&&j| j >= num_points) {
            return Err(Error::Algorithm(format!(
                "neighbor index {} out of range for {} points",
                j, num_points
            )));
        }

        if let Some(i) = (0..num_points).find(|&i| !self.contains(i, i)) {
            return Err(Error::Algorithm(format!("point {} is missing from its own neighborhood", i)));
        }

        Ok(())
    }

    /// True when j ∈ N(i) implies i ∈ N(j) for every pair.
    pub fn is_symmetric(&self) -> bool {
        (0..self.len()).all(|i| self.neighbors(i).iter().all(|&j| j < self.len() && self.contains(j, i)))
    }

    /// Pairs on which two neighborhood sets disagree, ignoring pairs whose
    /// distance lies within `tolerance` of the search radius.
    ///
    /// Backends computing distances at different precision may legitimately
    /// classify boundary pairs differently; anything else is a real mismatch.
    pub fn disagreements(
        &self,
        other: &Neighborhoods,
        points: &[Point3d],
        radius: f64,
        tolerance: f64,
    ) -> Result<Vec<(usize, usize)>> {
        if self.len() != other.len() || self.len() != points.len() {
            return Err(Error::InvalidInput(format!(
                "cannot compare neighborhoods of {} and {} points over a cloud of {}",
                self.len(),
                other.len(),
                points.len()
            )));
        }

        let mut mismatches = Vec::new();
        for i in 0..self.len() {
            let (a, b) = (self.neighbors(i), other.neighbors(i));
            if a == b {
                continue;
            }

            let only_in_a = a.iter().filter(|j| b.binary_search(j).is_err());
            let only_in_b = b.iter().filter(|j| a.binary_search(j).is_err());

            for &j in only_in_a.chain(only_in_b) {
                let distance = (points[j] - points[i]).norm();
                if (distance - radius).abs() > tolerance {
                    mismatches.push((i, j));
                }
            }
        }

        Ok(mismatches)
    }
}
