//! ISS saliency scoring
//!
//! For every point, the weighted covariance of its radius neighborhood is
//! decomposed and the eigenvalue ratios decide whether the point is a keypoint
//! candidate. The smallest eigenvalue is kept as the point's saliency.

use keycloud_core::{Error, Matrix3, Neighborhoods, Point3d, Result};
use nalgebra::SymmetricEigen;
use rayon::prelude::*;

/// Eigenvalues at or below this are treated as zero in the ratio test
pub const EIGEN_EPSILON: f64 = 1e-12;

/// Eigenvalues of a local covariance, `l1 >= l2 >= l3 >= 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EigenTriple {
    pub l1: f64,
    pub l2: f64,
    pub l3: f64,
}

impl EigenTriple {
    /// Symmetric eigen-decomposition of a covariance matrix.
    ///
    /// Round-off can push the smallest eigenvalue of a positive semi-definite
    /// matrix slightly below zero; values are clamped at zero.
    pub fn from_covariance(cov: &Matrix3<f64>) -> Self {
        let mut values: Vec<f64> = SymmetricEigen::new(*cov)
            .eigenvalues
            .iter()
            .map(|v| v.max(0.0))
            .collect();
        values.sort_by(|a, b| b.total_cmp(a));

        Self {
            l1: values[0],
            l2: values[1],
            l3: values[2],
        }
    }

    /// `l2/l1 < gamma21 && l3/l2 < gamma32`, false whenever a ratio is undefined.
    ///
    /// `l1` is compared against [`EIGEN_EPSILON`] directly, `l2` relative to `l1`.
    pub fn is_salient(&self, gamma21: f64, gamma32: f64) -> bool {
        if self.l1 <= EIGEN_EPSILON || self.l2 <= self.l1 * EIGEN_EPSILON {
            return false;
        }
        self.l2 / self.l1 < gamma21 && self.l3 / self.l2 < gamma32
    }
}

/// Per-point output of the scoring stage
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SaliencyScores {
    /// Pre-suppression keypoint candidates
    pub is_candidate: Vec<bool>,
    /// Smallest covariance eigenvalue per point
    pub lambda3: Vec<f64>,
}

impl SaliencyScores {
    pub fn len(&self) -> usize {
        self.is_candidate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_candidate.is_empty()
    }

    pub fn candidate_count(&self) -> usize {
        self.is_candidate.iter().filter(|&&c| c).count()
    }
}

/// Weighted covariance of point `i`'s neighborhood.
///
/// Each neighbor `j` is weighted by `1 / |N(j)|`, so points in dense regions
/// contribute less. The weight belongs to the neighbor, never to `i`.
pub fn weighted_covariance(points: &[Point3d], neighborhoods: &Neighborhoods, i: usize) -> Matrix3<f64> {
    let center = points[i];
    let mut cov = Matrix3::zeros();
    let mut total_weight = 0.0;

    for &j in neighborhoods.neighbors(i) {
        let weight = 1.0 / neighborhoods.size(j) as f64;
        let diff = points[j] - center;
        cov += diff * diff.transpose() * weight;
        total_weight += weight;
    }

    if total_weight > 0.0 {
        cov / total_weight
    } else {
        cov
    }
}

/// Score one point. Neighborhoods with fewer than two members are never candidates.
pub fn score_point(
    points: &[Point3d],
    neighborhoods: &Neighborhoods,
    i: usize,
    gamma21: f64,
    gamma32: f64,
) -> (bool, f64) {
    if neighborhoods.size(i) < 2 {
        return (false, 0.0);
    }

    let eigen = EigenTriple::from_covariance(&weighted_covariance(points, neighborhoods, i));
    (eigen.is_salient(gamma21, gamma32), eigen.l3)
}

/// Score every point in parallel
pub fn score_saliency(
    points: &[Point3d],
    neighborhoods: &Neighborhoods,
    gamma21: f64,
    gamma32: f64,
) -> Result<SaliencyScores> {
    if neighborhoods.len() != points.len() {
        return Err(Error::Algorithm(format!(
            "neighborhoods cover {} points but the cloud has {}",
            neighborhoods.len(),
            points.len()
        )));
    }

    let (is_candidate, lambda3): (Vec<bool>, Vec<f64>) = (0..points.len())
        .into_par_iter()
        .map(|i| score_point(points, neighborhoods, i, gamma21, gamma32))
        .unzip();

    Ok(SaliencyScores { is_candidate, lambda3 })
}
