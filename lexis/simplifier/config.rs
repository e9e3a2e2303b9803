use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use shared_logging::LogLevel;

use crate::{
    services::RetryPolicy,
    telemetry::{SimplifierTelemetry, SimplifierTelemetryBuilder},
    tier::Tier,
};

/// Engine configuration loaded from TOML.
#[derive(Debug, Clone)]
pub struct SimplifierConfig {
    /// Tier active after construction.
    pub default_tier: Tier,
    /// Longest accepted input, in characters.
    pub max_input_chars: usize,
    /// Replacement quota.
    pub quota: QuotaSettings,
    /// Candidate generation limits.
    pub generator: GeneratorSettings,
    /// Data files.
    pub corpora: CorpusPaths,
    /// External collaborators.
    pub services: ServiceSettings,
    /// Telemetry sink.
    pub logging: LoggingSettings,
    source_dir: PathBuf,
}

impl Default for SimplifierConfig {
    fn default() -> Self {
        Self {
            default_tier: Tier::Beginner,
            max_input_chars: default_max_input_chars(),
            quota: QuotaSettings::default(),
            generator: GeneratorSettings::default(),
            corpora: CorpusPaths::default(),
            services: ServiceSettings::default(),
            logging: LoggingSettings::default(),
            source_dir: PathBuf::from("."),
        }
    }
}

impl SimplifierConfig {
    /// Loads configuration from a TOML file. Relative paths resolve against
    /// the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading simplifier config {}", path.display()))?;
        let source_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_toml_str(&raw, source_dir).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parses TOML text, resolving relative paths against `source_dir`.
    pub fn from_toml_str(raw: &str, source_dir: impl Into<PathBuf>) -> Result<Self> {
        let document: SimplifierConfigSerde = toml::from_str(raw)?;
        let default_tier = document
            .default_tier
            .parse::<Tier>()
            .context("invalid default_tier")?;
        let config = Self {
            default_tier,
            max_input_chars: document.max_input_chars,
            quota: document.quota,
            generator: document.generator,
            corpora: document.corpora,
            services: document.services,
            logging: document.logging,
            source_dir: source_dir.into(),
        }
        .resolved();
        config.validate()?;
        Ok(config)
    }

    fn resolved(mut self) -> Self {
        self.corpora.beginner = self.corpora.beginner.take().map(|path| self.resolve_path(path));
        self.corpora.intermediate = self
            .corpora
            .intermediate
            .take()
            .map(|path| self.resolve_path(path));
        self.corpora.frequency_table = self
            .corpora
            .frequency_table
            .take()
            .map(|path| self.resolve_path(path));
        self.corpora.lexicon = self.corpora.lexicon.take().map(|path| self.resolve_path(path));
        self.logging.path = self.logging.path.take().map(|path| self.resolve_path(path));
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.quota.min_ratio > 0.0 && self.quota.min_ratio <= 1.0) {
            bail!(
                "quota.min_ratio must be in (0, 1], got {}",
                self.quota.min_ratio
            );
        }
        if self.generator.best_effort_top_k == 0 || self.generator.quota_top_k == 0 {
            bail!("generator top_k values must be positive");
        }
        if self.services.max_attempts == 0 {
            bail!("services.max_attempts must be at least 1");
        }
        if self.max_input_chars == 0 {
            bail!("max_input_chars must be positive");
        }
        Ok(())
    }

    /// Resolves a path relative to the configuration file.
    #[must_use]
    pub fn resolve_path(&self, candidate: impl AsRef<Path>) -> PathBuf {
        let candidate = candidate.as_ref();
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.source_dir.join(candidate)
        }
    }

    /// Corpus file backing `tier`, if any.
    #[must_use]
    pub fn corpus_for(&self, tier: Tier) -> Option<&Path> {
        match tier {
            Tier::Beginner => self.corpora.beginner.as_deref(),
            Tier::Intermediate => self.corpora.intermediate.as_deref(),
            Tier::Advanced => None,
        }
    }

    /// Retry policy for HTTP collaborators.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.services.max_attempts,
            timeout: Duration::from_millis(self.services.timeout_ms),
            backoff: Duration::from_millis(self.services.backoff_ms),
        }
    }

    /// Builds the configured telemetry handle, `None` when no sink is set.
    pub fn telemetry(&self, module: &str) -> Result<Option<SimplifierTelemetry>> {
        if self.logging.path.is_none() && !self.logging.stderr {
            return Ok(None);
        }
        let level = self
            .logging
            .level
            .parse::<LogLevel>()
            .context("invalid logging.level")?;
        let mut builder = SimplifierTelemetryBuilder::new(module)
            .stderr(self.logging.stderr)
            .min_level(level);
        if let Some(path) = &self.logging.path {
            builder = builder.log_path(path);
        }
        builder.build().map(Some)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SimplifierConfigSerde {
    #[serde(default = "default_tier")]
    default_tier: String,
    #[serde(default = "default_max_input_chars")]
    max_input_chars: usize,
    #[serde(default)]
    quota: QuotaSettings,
    #[serde(default)]
    generator: GeneratorSettings,
    #[serde(default)]
    corpora: CorpusPaths,
    #[serde(default)]
    services: ServiceSettings,
    #[serde(default)]
    logging: LoggingSettings,
}

/// Minimum replacement ratio settings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QuotaSettings {
    /// Fraction of checked words that should end up replaced.
    #[serde(default = "default_min_ratio")]
    pub min_ratio: f64,
    /// Checked-word count below which the quota is not enforced.
    #[serde(default = "default_min_checked")]
    pub min_checked: usize,
}

impl Default for QuotaSettings {
    fn default() -> Self {
        Self {
            min_ratio: default_min_ratio(),
            min_checked: default_min_checked(),
        }
    }
}

/// Prediction counts requested from the masked model.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeneratorSettings {
    /// K in the best-effort pass.
    #[serde(default = "default_best_effort_top_k")]
    pub best_effort_top_k: usize,
    /// K in the quota pass.
    #[serde(default = "default_quota_top_k")]
    pub quota_top_k: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            best_effort_top_k: default_best_effort_top_k(),
            quota_top_k: default_quota_top_k(),
        }
    }
}

/// Data file locations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorpusPaths {
    /// Parallel corpus for the beginner tier.
    #[serde(default)]
    pub beginner: Option<PathBuf>,
    /// Parallel corpus for the intermediate tier.
    #[serde(default)]
    pub intermediate: Option<PathBuf>,
    /// Word frequency table.
    #[serde(default)]
    pub frequency_table: Option<PathBuf>,
    /// JSON lexical knowledge base export.
    #[serde(default)]
    pub lexicon: Option<PathBuf>,
}

/// External service endpoints and call policy.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSettings {
    /// Fill-mask endpoint.
    #[serde(default)]
    pub model_url: Option<String>,
    /// Tagging endpoint.
    #[serde(default)]
    pub tagger_url: Option<String>,
    /// Mask placeholder expected by the model.
    #[serde(default = "default_mask_token")]
    pub mask_token: String,
    /// Per-attempt timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Attempts per call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Pause between attempts.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            model_url: None,
            tagger_url: None,
            mask_token: default_mask_token(),
            timeout_ms: default_timeout_ms(),
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

/// Telemetry sink settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// JSON-lines log file.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Minimum level name.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log to stderr when no path is set.
    #[serde(default)]
    pub stderr: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            path: None,
            level: default_log_level(),
            stderr: false,
        }
    }
}

fn default_tier() -> String {
    Tier::Beginner.as_str().to_string()
}

const fn default_max_input_chars() -> usize {
    100_000
}

const fn default_min_ratio() -> f64 {
    0.10
}

const fn default_min_checked() -> usize {
    10
}

const fn default_best_effort_top_k() -> usize {
    15
}

const fn default_quota_top_k() -> usize {
    5
}

fn default_mask_token() -> String {
    "<mask>".to_string()
}

const fn default_timeout_ms() -> u64 {
    4_000
}

const fn default_max_attempts() -> u32 {
    2
}

const fn default_backoff_ms() -> u64 {
    150
}

fn default_log_level() -> String {
    "info".to_string()
}
