use serde::{Deserialize, Serialize};

/// Customer segmentation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Segment count used when the caller does not pass one.
    #[serde(default = "default_segments")]
    pub default_segments: usize,

    /// Seed for k-means initialisation; fixes the output for a given input.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Independent restarts; the lowest-inertia run is kept.
    #[serde(default = "default_n_init")]
    pub n_init: usize,

    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl SegmentationConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.default_segments == 0 {
            issues.push("segmentation.default_segments must be >= 1".to_string());
        }
        if self.n_init == 0 {
            issues.push("segmentation.n_init must be >= 1".to_string());
        }
        if self.max_iter == 0 {
            issues.push("segmentation.max_iter must be >= 1".to_string());
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            issues.push(format!(
                "segmentation.tolerance must be finite and >= 0 (got {})",
                self.tolerance
            ));
        }
        issues
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            default_segments: default_segments(),
            seed: default_seed(),
            n_init: default_n_init(),
            max_iter: default_max_iter(),
            tolerance: default_tolerance(),
        }
    }
}

fn default_segments() -> usize {
    3
}

fn default_seed() -> u64 {
    42
}

fn default_n_init() -> usize {
    10
}

fn default_max_iter() -> usize {
    300
}

fn default_tolerance() -> f64 {
    1e-4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SegmentationConfig::default().validate().is_empty());
    }

    #[test]
    fn every_problem_is_reported() {
        let cfg = SegmentationConfig {
            default_segments: 0,
            seed: 1,
            n_init: 0,
            max_iter: 0,
            tolerance: f64::NAN,
        };
        assert_eq!(cfg.validate().len(), 4);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: SegmentationConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.default_segments, 3);
        assert_eq!(cfg.n_init, 10);
    }
}
