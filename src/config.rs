use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::model::{ENRICHMENT_VERSION, MAX_TAGS};

pub const DEFAULT_OUTPUT_PATH: &str = "public/manifest.json";
pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Where the asset listing comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Drive {
        api_key: String,
        folder_id: String,
        page_size: u32,
    },
    Local {
        root: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Minimum wall time between two remote scorer calls.
    pub min_interval: Duration,
    /// Attempts per asset, first call included.
    pub max_attempts: u32,
    /// Wait used when the service gives no retry hint.
    pub default_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(4000),
            max_attempts: 3,
            default_backoff: Duration::from_millis(10_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteScorerConfig {
    pub api_key: String,
    pub model: String,
}

/// Fully validated run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub source: SourceConfig,
    pub output_path: PathBuf,
    pub ai_disabled: bool,
    pub budget: Option<usize>,
    pub remote_scorer: Option<RemoteScorerConfig>,
    pub classifier_url: Option<String>,
    pub retry: RetryPolicy,
    pub policy: ScoringPolicy,
    pub version: String,
}

impl Config {
    pub fn new(source: SourceConfig) -> Self {
        Self {
            source,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            ai_disabled: false,
            budget: None,
            remote_scorer: None,
            classifier_url: None,
            retry: RetryPolicy::default(),
            policy: ScoringPolicy::default(),
            version: ENRICHMENT_VERSION.to_string(),
        }
    }

    pub fn source_root(&self) -> String {
        match &self.source {
            SourceConfig::Drive { folder_id, .. } => folder_id.clone(),
            SourceConfig::Local { root } => root.display().to_string(),
        }
    }
}

/// Tunables for the local classifier tier and the tag floor.
///
/// Every field may be overridden from a policy file; missing fields keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringPolicy {
    /// Labels at or above this confidence become tags.
    pub confidence_threshold: f32,
    /// Labels below this confidence are noise: never used for padding and
    /// counted toward the low-confidence difficulty bump.
    pub low_confidence_floor: f32,
    pub top_k: usize,
    pub min_tags: usize,
    pub max_tags: usize,
    /// Top-1 confidence cut-offs for difficulty 1, 2, 3 and 4; anything
    /// lower is 5.
    pub difficulty_bands: [f32; 4],
    pub complex_subjects: Vec<String>,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            low_confidence_floor: 0.05,
            top_k: 5,
            min_tags: 3,
            max_tags: MAX_TAGS,
            difficulty_bands: [0.8, 0.6, 0.4, 0.2],
            complex_subjects: [
                "people", "person", "crowd", "action", "sport", "wildlife", "animal", "bird",
                "night", "water", "wave", "reflection", "fireworks",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl ScoringPolicy {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading scoring policy");

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::policy_file_read_error(path, e.to_string()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let policy: ScoringPolicy = match extension {
            "json" => serde_json::from_str(&content)
                .map_err(|e| ConfigError::policy_parse_error(path, e.to_string()))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| ConfigError::policy_parse_error(path, e.to_string()))?,
            _ => return Err(ConfigError::unsupported_format(extension)),
        };

        trace!(?policy, "scoring policy loaded");
        policy.validate(path)
    }

    fn validate(mut self, path: &Path) -> Result<Self, ConfigError> {
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        if !in_unit(self.confidence_threshold) || !in_unit(self.low_confidence_floor) {
            return Err(ConfigError::policy_parse_error(
                path,
                "confidence values must be within 0.0..=1.0",
            ));
        }
        if self.top_k == 0 {
            return Err(ConfigError::policy_parse_error(path, "top_k must be positive"));
        }
        self.max_tags = self.max_tags.clamp(1, MAX_TAGS);
        self.min_tags = self.min_tags.min(self.max_tags);
        self.complex_subjects = self
            .complex_subjects
            .iter()
            .filter_map(|s| crate::model::normalize_tag(s))
            .collect();
        Ok(self)
    }

    pub fn is_complex_subject(&self, tag: &str) -> bool {
        self.complex_subjects
            .iter()
            .any(|subject| tag == subject || tag.split('-').any(|word| word == subject))
    }
}
