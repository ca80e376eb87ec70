//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::types::EdgeParameters;

/// Configuration for engine construction.
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial Canny low threshold
    pub canny_low_threshold: f64,
    /// Initial Canny high threshold
    pub canny_high_threshold: f64,
    /// Sobel aperture size (3, 5 or 7)
    pub aperture_size: u32,
    /// Use the optimized backend when it probes successfully
    pub prefer_optimized: bool,
    /// Log a statistics line every N frames (0 disables)
    pub stats_log_interval: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canny_low_threshold: EdgeParameters::DEFAULT_LOW,
            canny_high_threshold: EdgeParameters::DEFAULT_HIGH,
            aperture_size: EdgeParameters::DEFAULT_APERTURE,
            prefer_optimized: true,
            stats_log_interval: 100,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration document and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        EdgeParameters::from(self)
            .validate()
            .map_err(|e| EngineError::Config(e.to_string()))?;

        if self.canny_low_threshold > self.canny_high_threshold {
            return Err(EngineError::Config(format!(
                "canny_low_threshold ({}) exceeds canny_high_threshold ({})",
                self.canny_low_threshold, self.canny_high_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{"canny_low_threshold": 30.0}"#).unwrap();
        assert_eq!(config.canny_low_threshold, 30.0);
        assert_eq!(config.canny_high_threshold, 150.0);
        assert_eq!(config.aperture_size, 3);
        assert!(config.prefer_optimized);
    }

    #[test]
    fn test_invalid_json_config() {
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(EngineError::Json(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"aperture_size": 4}"#),
            Err(EngineError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"canny_low_threshold": 200.0}"#),
            Err(EngineError::Config(_))
        ));
    }
}
