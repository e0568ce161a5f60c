//! Coppee - rule-driven directory mirroring
//!
//! Walks a directory tree and copies every file whose relative path matches
//! a regex template to a destination computed from the template's capture
//! groups. Rules come from a small line-oriented rule file:
//!
//! ```text
//! // every C source gets a backup next to it
//! (.*)\.c
//! $1.c.bak
//!
//! // everything that is not a log file is mirrored into backup/
//! !.*\.log
//! backup/$0
//! ```

pub mod config;
pub mod copy;
pub mod rules;
pub mod walker;

pub use config::Config;
pub use copy::CopyError;
pub use rules::{Rule, RuleError, RuleSet};
pub use walker::{WalkError, WalkOptions, WalkSummary, Walker};

/// Current version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Rule file looked up inside the walked directory
pub const DEFAULT_RULE_FILE: &str = ".coppee";
