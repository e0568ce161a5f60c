//! Configuration schema

use serde::Deserialize;

use crate::walker::WalkOptions;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,
}

/// Defaults applied to every run; command line flags can only switch a
/// behavior on relative to these.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Name of the rule file looked up inside the target directory
    #[serde(default = "default_rule_file")]
    pub rule_file: String,

    /// Overwrite existing destination files
    #[serde(default)]
    pub overwrite: bool,

    /// Suppress per-file reports
    #[serde(default)]
    pub quiet: bool,

    /// Only report what would be copied
    #[serde(default)]
    pub pretend: bool,

    /// Abort the walk at the first failed copy
    #[serde(default = "default_true")]
    pub collapse_on_error: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            rule_file: default_rule_file(),
            overwrite: false,
            quiet: false,
            pretend: false,
            collapse_on_error: true,
        }
    }
}

impl GeneralConfig {
    /// Walk policy described by these settings
    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            overwrite: self.overwrite,
            verbose: !self.quiet,
            pretend: self.pretend,
            collapse_on_error: self.collapse_on_error,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rule_file() -> String {
    crate::DEFAULT_RULE_FILE.to_string()
}

fn default_true() -> bool {
    true
}
