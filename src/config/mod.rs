//! Run configuration: defaults, TOML loading and validation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::filter::{FilterOption, FilterParseError, SelectRule};
use crate::scan::{ScanError, ScanParams, WindowLimits};

/// Errors raised for unusable configuration, before any store is opened.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filter code outside `g`, `n`, `m`, `M`, `r`.
    #[error("unknown filter option '{0}'")]
    UnknownFilter(String),

    /// Any other filter or selection-rule parse failure.
    #[error(transparent)]
    Filter(FilterParseError),

    /// A numeric option is out of range.
    #[error("option '{name}' is out of range: {reason}")]
    OutOfRange {
        /// Option name.
        name: &'static str,
        /// Accepted range.
        reason: String,
    },

    /// Scanner geometry rejected.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// More than one random-retain option.
    #[error("random retain ('r') may be given at most once")]
    DuplicateDownsample,

    /// Reading the configuration file failed.
    #[error("failed to read configuration {path:?}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse configuration {path:?}: {source}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },
}

impl From<FilterParseError> for ConfigError {
    fn from(err: FilterParseError) -> Self {
        match err {
            FilterParseError::UnknownCode(code) => ConfigError::UnknownFilter(code),
            other => ConfigError::Filter(other),
        }
    }
}

/// Every tunable of a design run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesignConfig {
    /// Consensus majority fraction in `(0, 1]`.
    pub threshold: f64,
    /// Scanner window width.
    pub win_width: usize,
    /// Scanner window shift.
    pub win_shift: usize,
    /// Maximum variable sites per window.
    pub var_max: u32,
    /// Maximum missing bases per window.
    pub num_n: u32,
    /// Maximum gaps per window.
    pub num_g: u32,
    /// Minimum emitted region length.
    pub min_region_len: usize,
    /// Loci shorter than this are excluded before scanning.
    pub min_locus_len: usize,
    /// Loci with fewer aligned rows are excluded before scanning.
    pub min_coverage: usize,
    /// Keep several regions per locus.
    pub multi_region: bool,
    /// Rule used when only one region per locus is kept.
    pub select_rule: SelectRule,
    /// Region filters, in any order.
    pub filters: Vec<FilterOption>,
    /// Seed for random selection and downsampling.
    pub seed: Option<u64>,
    /// Worker threads for consensus building and scanning.
    pub threads: usize,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            win_width: 80,
            win_shift: 1,
            var_max: 0,
            num_n: 0,
            num_g: 0,
            min_region_len: 80,
            min_locus_len: 80,
            min_coverage: 1,
            multi_region: false,
            select_rule: SelectRule::First,
            filters: Vec::new(),
            seed: None,
            threads: 1,
        }
    }
}

impl DesignConfig {
    /// Load a configuration file; absent keys keep their defaults.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a list of compact filter codes (`g=2`, `m=1,50`, ...).
    pub fn parse_filters<S: AsRef<str>>(codes: &[S]) -> Result<Vec<FilterOption>, ConfigError> {
        codes
            .iter()
            .map(|code| code.as_ref().parse::<FilterOption>().map_err(ConfigError::from))
            .collect()
    }

    /// Check every option; the first violation is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(ConfigError::OutOfRange {
                name: "threshold",
                reason: format!("{} not in (0, 1]", self.threshold),
            });
        }
        if self.min_coverage == 0 {
            return Err(ConfigError::OutOfRange {
                name: "min_coverage",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.threads == 0 {
            return Err(ConfigError::OutOfRange {
                name: "threads",
                reason: "must be at least 1".to_string(),
            });
        }
        let downsamples = self
            .filters
            .iter()
            .filter(|f| matches!(f, FilterOption::Downsample(_)))
            .count();
        if downsamples > 1 {
            return Err(ConfigError::DuplicateDownsample);
        }
        self.scan_params()?;
        Ok(())
    }

    /// Window thresholds.
    pub fn window_limits(&self) -> WindowLimits {
        WindowLimits {
            max_variants: self.var_max,
            max_missing: self.num_n,
            max_gaps: self.num_g,
        }
    }

    /// Validated scanner parameters.
    pub fn scan_params(&self) -> Result<ScanParams, ConfigError> {
        Ok(ScanParams::new(
            self.win_width,
            self.win_shift,
            self.window_limits(),
            self.min_region_len,
        )?)
    }
}
