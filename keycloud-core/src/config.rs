//! Detector configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Parameters of an ISS keypoint detection run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssConfig {
    /// Upper bound on λ2/λ1, in (0, 1)
    pub gamma21: f64,
    /// Upper bound on λ3/λ2, in (0, 1)
    pub gamma32: f64,
    /// Neighborhood search radius used for weights and covariance
    pub radius: f64,
    /// Optional separate suppression radius. `None` reuses the search
    /// neighborhoods for non-maximum suppression.
    pub nms_radius: Option<f64>,
    /// Optional cap on the number of returned keypoints, highest saliency first
    pub max_num: Option<usize>,
}

impl Default for IssConfig {
    fn default() -> Self {
        Self {
            gamma21: 0.6,
            gamma32: 0.6,
            radius: 0.15,
            nms_radius: None,
            max_num: None,
        }
    }
}

impl IssConfig {
    pub fn new(gamma21: f64, gamma32: f64, radius: f64) -> Self {
        Self {
            gamma21,
            gamma32,
            radius,
            ..Default::default()
        }
    }

    pub fn with_nms_radius(mut self, nms_radius: f64) -> Self {
        self.nms_radius = Some(nms_radius);
        self
    }

    pub fn with_max_num(mut self, max_num: usize) -> Self {
        self.max_num = Some(max_num);
        self
    }

    /// Radius of the neighborhoods used by non-maximum suppression
    pub fn suppression_radius(&self) -> f64 {
        self.nms_radius.unwrap_or(self.radius)
    }

    /// True when suppression needs neighborhoods of its own
    pub fn has_distinct_nms_radius(&self) -> bool {
        matches!(self.nms_radius, Some(r) if r != self.radius)
    }

    /// Check every parameter range
    pub fn validate(&self) -> Result<()> {
        validate_gamma("gamma21", self.gamma21)?;
        validate_gamma("gamma32", self.gamma32)?;
        validate_radius("radius", self.radius)?;
        if let Some(nms_radius) = self.nms_radius {
            validate_radius("nms_radius", nms_radius)?;
        }
        Ok(())
    }
}

fn validate_gamma(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(Error::InvalidInput(format!(
            "{} must lie in the open interval (0, 1), got {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_radius(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "{} must be positive and finite, got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = IssConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.suppression_radius(), config.radius);
        assert!(!config.has_distinct_nms_radius());
    }

    #[test]
    fn test_builder() {
        let config = IssConfig::new(0.9, 0.8, 1.5).with_nms_radius(3.0).with_max_num(10);
        assert_eq!(config.gamma21, 0.9);
        assert_eq!(config.gamma32, 0.8);
        assert_eq!(config.suppression_radius(), 3.0);
        assert!(config.has_distinct_nms_radius());
        assert_eq!(config.max_num, Some(10));
    }

    #[test]
    fn test_equal_nms_radius_is_not_distinct() {
        let config = IssConfig::new(0.5, 0.5, 1.0).with_nms_radius(1.0);
        assert!(!config.has_distinct_nms_radius());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: IssConfig = serde_json::from_str(r#"{"radius": 0.5, "max_num": 20}"#).unwrap();
        assert_eq!(config.radius, 0.5);
        assert_eq!(config.max_num, Some(20));
        assert_eq!(config.gamma21, IssConfig::default().gamma21);
        assert_eq!(config.gamma32, IssConfig::default().gamma32);
        assert_eq!(config.nms_radius, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let config = IssConfig::new(0.7, 0.4, 1.25).with_nms_radius(2.5).with_max_num(3);
        let json = serde_json::to_string(&config).unwrap();
        let restored: IssConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config: IssConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, IssConfig::default());
    }

    #[test]
    fn test_gamma_bounds() {
        for bad in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(IssConfig::new(bad, 0.5, 1.0).validate().is_err(), "gamma21 = {}", bad);
            assert!(IssConfig::new(0.5, bad, 1.0).validate().is_err(), "gamma32 = {}", bad);
        }
    }

    #[test]
    fn test_radius_bounds() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(IssConfig::new(0.5, 0.5, bad).validate().is_err(), "radius = {}", bad);
            assert!(
                IssConfig::new(0.5, 0.5, 1.0).with_nms_radius(bad).validate().is_err(),
                "nms_radius = {}",
                bad
            );
        }
    }
}
