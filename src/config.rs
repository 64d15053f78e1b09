//! Configuration surface for the matching pipeline.
//!
//! Configs are versioned, serde-friendly, and cheap to clone. The extractor
//! is a pure function of `(pixels, ExtractorConfig)`: the same config must be
//! used for the query and every candidate in a session, otherwise descriptor
//! distances are not comparable.
//!
//! [`SessionConfig`] can be loaded from a YAML file:
//!
//! ```yaml
//! version: 1
//! use_parallel: false
//!
//! extractor:
//!   version: 1
//!   max_features: 500
//!   fast_threshold: 20
//!   patch_size: 31
//!   seed: 11400714819323198485
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the default FAST+BRIEF extractor.
///
/// Any algorithmic change that can affect descriptors must bump `version`,
/// so that stored or logged artifacts remain attributable to the settings
/// that produced them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Configuration schema version.
    pub version: u32,
    /// Upper bound on keypoints kept per image, ranked by detector response.
    pub max_features: usize,
    /// FAST segment-test contrast threshold. Higher values keep only
    /// stronger corners.
    pub fast_threshold: u8,
    /// Side length of the (odd, square) descriptor sampling patch.
    pub patch_size: usize,
    /// Seed for the descriptor sampling pattern.
    ///
    /// Two configs with the same seed, patch size, and version produce
    /// bit-identical descriptors for the same pixels.
    pub seed: u64,
}

impl ExtractorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the keypoint cap. Typical values: 200-1000.
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the FAST contrast threshold. Typical values: 10-40.
    /// Lower thresholds detect more (weaker) corners.
    pub fn with_fast_threshold(mut self, fast_threshold: u8) -> Self {
        self.fast_threshold = fast_threshold;
        self
    }

    /// Set the sampling patch side length. Must be odd and >= 9.
    pub fn with_patch_size(mut self, patch_size: usize) -> Self {
        self.patch_size = patch_size;
        self
    }

    /// Set the sampling-pattern seed for reproducible descriptors.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version < 1 {
            return Err(ConfigError::InvalidVersion {
                version: self.version,
            });
        }
        if self.max_features < 1 {
            return Err(ConfigError::InvalidMaxFeatures {
                max_features: self.max_features,
            });
        }
        if self.fast_threshold < 1 {
            return Err(ConfigError::InvalidFastThreshold {
                fast_threshold: self.fast_threshold,
            });
        }
        if self.patch_size < 9 || self.patch_size % 2 == 0 {
            return Err(ConfigError::InvalidPatchSize {
                patch_size: self.patch_size,
            });
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            max_features: 500,
            fast_threshold: 20,
            patch_size: 31,
            seed: 0x9E37_79B9_7F4A_7C15,
        }
    }
}

/// Configuration for one [`crate::session::MatchSession`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Configuration schema version.
    pub version: u32,
    /// Extractor settings shared by the query and every candidate.
    pub extractor: ExtractorConfig,
    /// Process candidates on a rayon worker pool.
    ///
    /// Ranking output is bit-identical either way: each score carries its
    /// caller-supplied position and the final sort happens once, after all
    /// workers complete.
    pub use_parallel: bool,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extractor(mut self, extractor: ExtractorConfig) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version < 1 {
            return Err(ConfigError::InvalidVersion {
                version: self.version,
            });
        }
        self.extractor.validate()
    }

    /// Load and validate a session config from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate a session config from a YAML string.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: SessionConfig = serde_yaml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            version: 1,
            extractor: ExtractorConfig::default(),
            use_parallel: false,
        }
    }
}

/// Errors produced when loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("invalid config version {version}; expected >= 1")]
    InvalidVersion { version: u32 },

    #[error("invalid config: max_features must be >= 1 (got {max_features})")]
    InvalidMaxFeatures { max_features: usize },

    #[error("invalid config: fast_threshold must be >= 1 (got {fast_threshold})")]
    InvalidFastThreshold { fast_threshold: u8 },

    #[error("invalid config: patch_size must be odd and >= 9 (got {patch_size})")]
    InvalidPatchSize { patch_size: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extractor_default_values() {
        let cfg = ExtractorConfig::default();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.max_features, 500);
        assert_eq!(cfg.fast_threshold, 20);
        assert_eq!(cfg.patch_size, 31);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn extractor_builder_chain() {
        let cfg = ExtractorConfig::new()
            .with_max_features(64)
            .with_fast_threshold(12)
            .with_patch_size(15)
            .with_seed(42);
        assert_eq!(cfg.max_features, 64);
        assert_eq!(cfg.fast_threshold, 12);
        assert_eq!(cfg.patch_size, 15);
        assert_eq!(cfg.seed, 42);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn extractor_rejects_zero_max_features() {
        let cfg = ExtractorConfig::new().with_max_features(0);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidMaxFeatures { max_features: 0 })
        ));
    }

    #[test]
    fn extractor_rejects_zero_threshold() {
        let cfg = ExtractorConfig::new().with_fast_threshold(0);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidFastThreshold { fast_threshold: 0 })
        ));
    }

    #[test]
    fn extractor_rejects_even_or_tiny_patch() {
        for patch_size in [0, 7, 8, 30] {
            let cfg = ExtractorConfig::new().with_patch_size(patch_size);
            assert!(
                matches!(cfg.validate(), Err(ConfigError::InvalidPatchSize { .. })),
                "patch_size {patch_size} should be rejected"
            );
        }
    }

    #[test]
    fn extractor_rejects_version_zero() {
        let cfg = ExtractorConfig {
            version: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidVersion { version: 0 })
        ));
    }

    #[test]
    fn session_default_is_valid_and_sequential() {
        let cfg = SessionConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(!cfg.use_parallel);
        assert_eq!(cfg.extractor, ExtractorConfig::default());
    }

    #[test]
    fn session_validate_rejects_bad_extractor() {
        let cfg = SessionConfig::new().with_extractor(ExtractorConfig::new().with_max_features(0));
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidMaxFeatures { .. })
        ));
    }

    #[test]
    fn session_yaml_roundtrip() {
        let cfg = SessionConfig::new()
            .with_parallel(true)
            .with_extractor(ExtractorConfig::new().with_max_features(128).with_seed(7));
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed = SessionConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(cfg, parsed);
    }

    #[test]
    fn session_yaml_partial_fills_defaults() {
        let parsed = SessionConfig::from_yaml_str("use_parallel: true\n").unwrap();
        assert!(parsed.use_parallel);
        assert_eq!(parsed.extractor, ExtractorConfig::default());
        assert_eq!(parsed.version, 1);
    }

    #[test]
    fn session_yaml_invalid_values_rejected() {
        let err = SessionConfig::from_yaml_str("extractor:\n  max_features: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMaxFeatures { .. }));
    }

    #[test]
    fn session_yaml_malformed_is_parse_error() {
        let err = SessionConfig::from_yaml_str(": not yaml :").unwrap_err();
        assert!(matches!(err, ConfigError::YamlParse(_)));
    }

    #[test]
    fn session_serde_json_roundtrip() {
        let cfg = SessionConfig::new().with_parallel(true);
        let serialized = serde_json::to_string(&cfg).unwrap();
        let deserialized: SessionConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(cfg, deserialized);
    }
}
