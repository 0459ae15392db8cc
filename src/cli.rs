use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{
    Config, RemoteScorerConfig, RetryPolicy, ScoringPolicy, SourceConfig, DEFAULT_GEMINI_MODEL,
    DEFAULT_OUTPUT_PATH, DEFAULT_PAGE_SIZE,
};
use crate::error::ConfigError;
use crate::model::PENDING_VERSION;

/// Every setting can come from the environment; flags override it.
#[derive(Parser, Debug)]
#[command(name = "gallery-manifest")]
#[command(about = "Gallery manifest builder - incremental, cache-aware image enrichment", long_about = None)]
pub struct Args {
    /// Google Drive API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Root Google Drive folder id
    #[arg(long, env = "GOOGLE_DRIVE_FOLDER_ID")]
    pub folder_id: Option<String>,

    /// List images from a local directory instead of Google Drive
    #[arg(long, env = "MANIFEST_LOCAL_ROOT", value_name = "DIR")]
    pub local_root: Option<PathBuf>,

    /// Drive listing page size (1-1000)
    #[arg(long, env = "DRIVE_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Manifest path, read as cache and replaced on success
    #[arg(short = 'O', long, env = "MANIFEST_PATH", default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Skip remote vision and local classifier tiers
    #[arg(long, env = "MANIFEST_AI_DISABLED")]
    pub ai_disabled: bool,

    /// Maximum number of stale images analyzed per run (0 = unlimited)
    #[arg(long, env = "MANIFEST_BUDGET", value_name = "N")]
    pub budget: Option<usize>,

    /// Gemini API key for the remote vision tier
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    /// Endpoint of the local image classifier
    #[arg(long, env = "LOCAL_CLASSIFIER_URL", value_name = "URL")]
    pub classifier_url: Option<String>,

    /// Minimum milliseconds between remote vision calls
    #[arg(long, env = "VISION_MIN_INTERVAL_MS", default_value_t = 4000)]
    pub min_interval_ms: u64,

    /// Attempts per image against the remote vision service
    #[arg(long, env = "VISION_MAX_ATTEMPTS", default_value_t = 3)]
    pub max_attempts: u32,

    /// Backoff in milliseconds when the service gives no retry hint
    #[arg(long, env = "VISION_DEFAULT_BACKOFF_MS", default_value_t = 10_000)]
    pub default_backoff_ms: u64,

    /// Scoring policy file (JSON or YAML)
    #[arg(long, env = "MANIFEST_POLICY_FILE", value_name = "FILE")]
    pub policy: Option<PathBuf>,

    /// Override the enrichment version stamp
    #[arg(long, env = "MANIFEST_VERSION_STAMP")]
    pub version_stamp: Option<String>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref root) = self.local_root {
            validate_dir(root)?;
        }
        if let Some(ref policy) = self.policy {
            if !policy.exists() {
                anyhow::bail!("Policy file does not exist: {}", policy.display());
            }
        }
        Ok(())
    }

    /// Builds the run configuration. Fails before any work is done when
    /// credentials are missing or a tunable is out of range.
    pub fn to_config(&self) -> Result<Config, ConfigError> {
        let source = self.source_config()?;

        if self.max_attempts == 0 {
            return Err(ConfigError::invalid_value(
                "VISION_MAX_ATTEMPTS",
                "must be at least 1",
            ));
        }

        let policy = match self.policy {
            Some(ref path) => ScoringPolicy::load(path)?,
            None => ScoringPolicy::default(),
        };

        let remote_scorer = non_empty(self.gemini_api_key.as_deref()).map(|api_key| {
            RemoteScorerConfig {
                api_key,
                model: self.gemini_model.clone(),
            }
        });

        let mut config = Config::new(source);
        config.output_path = self.output.clone();
        config.ai_disabled = self.ai_disabled;
        config.budget = self.budget;
        config.remote_scorer = remote_scorer;
        config.classifier_url = non_empty(self.classifier_url.as_deref());
        config.retry = RetryPolicy {
            min_interval: Duration::from_millis(self.min_interval_ms),
            max_attempts: self.max_attempts,
            default_backoff: Duration::from_millis(self.default_backoff_ms),
        };
        config.policy = policy;
        if let Some(stamp) = non_empty(self.version_stamp.as_deref()) {
            if stamp == PENDING_VERSION {
                return Err(ConfigError::invalid_value(
                    "MANIFEST_VERSION_STAMP",
                    format!("'{PENDING_VERSION}' is reserved for deferred entries"),
                ));
            }
            config.version = stamp;
        }
        Ok(config)
    }

    fn source_config(&self) -> Result<SourceConfig, ConfigError> {
        if let Some(ref root) = self.local_root {
            return Ok(SourceConfig::Local { root: root.clone() });
        }

        let api_key = non_empty(self.api_key.as_deref());
        let folder_id = non_empty(self.folder_id.as_deref());
        let (Some(api_key), Some(folder_id)) = (api_key, folder_id) else {
            return Err(ConfigError::missing_credentials(
                "set GOOGLE_API_KEY and GOOGLE_DRIVE_FOLDER_ID, or MANIFEST_LOCAL_ROOT",
            ));
        };

        if !(1..=DEFAULT_PAGE_SIZE).contains(&self.page_size) {
            return Err(ConfigError::invalid_value(
                "DRIVE_PAGE_SIZE",
                format!("{} is outside 1..={DEFAULT_PAGE_SIZE}", self.page_size),
            ));
        }

        Ok(SourceConfig::Drive {
            api_key,
            folder_id,
            page_size: self.page_size,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

pub fn validate_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }
    if !path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["gallery-manifest"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_drive_source_from_flags() {
        let args = parse(&["--api-key", "k", "--folder-id", "f", "--page-size", "200"]);
        let config = args.to_config().unwrap();
        assert_eq!(
            config.source,
            SourceConfig::Drive {
                api_key: "k".to_string(),
                folder_id: "f".to_string(),
                page_size: 200,
            }
        );
    }

    #[test]
    fn test_missing_credentials() {
        let args = parse(&["--api-key", "k", "--folder-id", "  "]);
        let err = args.to_config().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials { .. }));
    }

    #[test]
    fn test_local_root_needs_no_credentials() {
        let dir = TempDir::new().unwrap();
        let args = parse(&["--local-root", dir.path().to_str().unwrap()]);
        args.validate().unwrap();
        let config = args.to_config().unwrap();
        assert!(matches!(config.source, SourceConfig::Local { .. }));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let args = parse(&["--api-key", "k", "--folder-id", "f", "--max-attempts", "0"]);
        assert!(matches!(
            args.to_config().unwrap_err(),
            ConfigError::InvalidValue { .. }
        ));
    }

    #[test]
    fn test_page_size_out_of_range() {
        let args = parse(&["--api-key", "k", "--folder-id", "f", "--page-size", "5000"]);
        assert!(matches!(
            args.to_config().unwrap_err(),
            ConfigError::InvalidValue { .. }
        ));
    }

    #[test]
    fn test_tunables_and_optional_tiers() {
        let args = parse(&[
            "--api-key",
            "k",
            "--folder-id",
            "f",
            "--gemini-api-key",
            "g",
            "--budget",
            "25",
            "--min-interval-ms",
            "0",
            "--version-stamp",
            "enrich-test",
        ]);
        let config = args.to_config().unwrap();
        assert_eq!(config.budget, Some(25));
        assert_eq!(config.retry.min_interval, Duration::ZERO);
        assert_eq!(config.version, "enrich-test");
        let scorer = config.remote_scorer.unwrap();
        assert_eq!(scorer.model, DEFAULT_GEMINI_MODEL);
        assert!(config.classifier_url.is_none());
    }

    #[test]
    fn test_reserved_version_stamp_rejected() {
        let args = parse(&["--api-key", "k", "--folder-id", "f", "--version-stamp", "pending"]);
        let err = args.to_config().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref name, .. } if name == "MANIFEST_VERSION_STAMP"
        ));
    }

    #[test]
    fn test_validate_missing_local_root() {
        let args = parse(&["--local-root", "/nonexistent/gallery/root"]);
        assert!(args.validate().is_err());
    }
}
