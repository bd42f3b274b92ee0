//! ISS keypoint detection pipeline
//!
//! Neighborhood search, saliency scoring and non-maximum suppression run as
//! three sequential stages; each stage is parallel across points.

use crate::nearest_neighbor::RTreeIndex;
use crate::nms::{retain_most_salient, suppress_non_maxima};
use crate::saliency::{score_saliency, SaliencyScores};
use keycloud_core::{validate_points, IssConfig, NeighborhoodIndex, Neighborhoods, Point3d, Result};
use log::{debug, info};
use std::time::Instant;

/// Result of a detection run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IssKeypoints {
    /// Final keypoint mask, one entry per input point
    pub mask: Vec<bool>,
    /// Candidates before suppression
    pub candidates: Vec<bool>,
    /// Smallest covariance eigenvalue per point
    pub saliency: Vec<f64>,
}

impl IssKeypoints {
    /// Number of detected keypoints
    pub fn count(&self) -> usize {
        self.mask.iter().filter(|&&k| k).count()
    }

    /// Number of candidates before suppression
    pub fn candidate_count(&self) -> usize {
        self.candidates.iter().filter(|&&c| c).count()
    }

    /// Indices of the detected keypoints, ascending
    pub fn indices(&self) -> Vec<usize> {
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, &k)| k)
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn into_mask(self) -> Vec<bool> {
        self.mask
    }
}

/// ISS keypoint detector parameterised by its neighborhood backend
pub struct IssDetector {
    index: Box<dyn NeighborhoodIndex>,
}

impl Default for IssDetector {
    fn default() -> Self {
        Self::new(RTreeIndex)
    }
}

impl IssDetector {
    /// Create a detector searching neighborhoods with `index`
    pub fn new(index: impl NeighborhoodIndex + 'static) -> Self {
        Self {
            index: Box::new(index),
        }
    }

    /// Name of the neighborhood backend
    pub fn backend(&self) -> &str {
        self.index.name()
    }

    /// Run the full pipeline.
    ///
    /// Inputs are validated up front; nothing is computed for an invalid
    /// configuration or cloud.
    pub fn detect(&self, points: &[Point3d], config: &IssConfig) -> Result<IssKeypoints> {
        config.validate()?;
        validate_points(points)?;

        info!(
            "ISS started on {} points with {} backend (radius {}, gamma21 {}, gamma32 {})",
            points.len(),
            self.backend(),
            config.radius,
            config.gamma21,
            config.gamma32
        );

        let start = Instant::now();
        let neighborhoods = self.index.radius_neighborhoods(points, config.radius)?;
        neighborhoods.check_consistency(points.len())?;
        info!(
            "Neighborhood search finished in {:.3}s, mean size {:.1}",
            start.elapsed().as_secs_f64(),
            neighborhoods.mean_size()
        );

        let start = Instant::now();
        let scores = score_saliency(points, &neighborhoods, config.gamma21, config.gamma32)?;
        info!(
            "Saliency scoring finished in {:.3}s, {} candidates",
            start.elapsed().as_secs_f64(),
            scores.candidate_count()
        );

        let start = Instant::now();
        let mut mask = self.suppress(points, config, &neighborhoods, &scores)?;
        if let Some(max_num) = config.max_num {
            retain_most_salient(&mut mask, &scores.lambda3, max_num);
        }

        let result = IssKeypoints {
            mask,
            candidates: scores.is_candidate,
            saliency: scores.lambda3,
        };
        info!(
            "Suppression finished in {:.3}s, {} keypoints",
            start.elapsed().as_secs_f64(),
            result.count()
        );

        Ok(result)
    }

    fn suppress(
        &self,
        points: &[Point3d],
        config: &IssConfig,
        neighborhoods: &Neighborhoods,
        scores: &SaliencyScores,
    ) -> Result<Vec<bool>> {
        if !config.has_distinct_nms_radius() {
            return suppress_non_maxima(scores, neighborhoods);
        }

        let nms_radius = config.suppression_radius();
        debug!("Computing separate suppression neighborhoods at radius {}", nms_radius);
        let nms_neighborhoods = self.index.radius_neighborhoods(points, nms_radius)?;
        nms_neighborhoods.check_consistency(points.len())?;
        suppress_non_maxima(scores, &nms_neighborhoods)
    }
}

/// Detect ISS keypoints with the default tree backend.
///
/// Returns one flag per input point; `max_num` caps the number of keypoints,
/// keeping the most salient.
pub fn find_keypoints(
    points: &[Point3d],
    gamma21: f64,
    gamma32: f64,
    radius: f64,
    max_num: Option<usize>,
) -> Result<Vec<bool>> {
    let config = IssConfig {
        gamma21,
        gamma32,
        radius,
        nms_radius: None,
        max_num,
    };
    IssDetector::default()
        .detect(points, &config)
        .map(IssKeypoints::into_mask)
}
