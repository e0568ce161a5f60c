//! Directory walker - applies a rule set to every file under a base directory

use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};
use walkdir::WalkDir;

use crate::copy::{self, CopyError};
use crate::rules::RuleSet;

/// Log at `info` when verbose, `debug` otherwise
macro_rules! progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            info!($($arg)+);
        } else {
            debug!($($arg)+);
        }
    };
}

/// Policy switches for a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// Replace destination files that already exist
    pub overwrite: bool,

    /// Report copies, skips and failures at `info`/`error` level
    pub verbose: bool,

    /// Decide and log, but never touch the filesystem
    pub pretend: bool,

    /// Stop the whole walk at the first failed copy
    pub collapse_on_error: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            verbose: false,
            pretend: false,
            collapse_on_error: true,
        }
    }
}

/// Counters collected during a walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Regular files tested against the rules
    pub files_visited: usize,

    /// Copies performed (or pretended)
    pub copied: usize,

    /// Copies skipped because the destination existed
    pub skipped: usize,

    /// Copies that failed
    pub failed: usize,

    pub bytes_copied: u64,
}

/// Errors that end a walk
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("copying '{}' to '{}' failed", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: CopyError,
    },

    #[error("cannot traverse {}", .path.display())]
    Traverse {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("{} is not inside {}", .path.display(), .base.display())]
    OutsideBase { path: PathBuf, base: PathBuf },
}

/// Walks a directory tree and copies files according to a rule set
pub struct Walker<'a> {
    base_dir: PathBuf,
    rules: &'a RuleSet,
    options: WalkOptions,
}

impl<'a> Walker<'a> {
    pub fn new(base_dir: impl Into<PathBuf>, rules: &'a RuleSet, options: WalkOptions) -> Self {
        Self {
            base_dir: base_dir.into(),
            rules,
            options,
        }
    }

    /// Visit every file under the base directory, depth-first in file name
    /// order, and try every rule against each one.
    pub fn walk(&self) -> Result<WalkSummary, WalkError> {
        let mut summary = WalkSummary::default();

        for entry in WalkDir::new(&self.base_dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    let path = source
                        .path()
                        .unwrap_or(self.base_dir.as_path())
                        .to_path_buf();
                    warn!("Cannot read {}: {}", path.display(), source);
                    if self.options.collapse_on_error {
                        return Err(WalkError::Traverse { path, source });
                    }
                    continue;
                }
            };

            // Directories are descended into but never copied
            if !entry.file_type().is_file() {
                continue;
            }

            self.visit(entry.path(), &mut summary)?;
        }

        Ok(summary)
    }

    /// Target paths are always rooted at the base directory, even when absolute
    fn destination(&self, target: &str) -> PathBuf {
        let relative: PathBuf = Path::new(target)
            .components()
            .filter(|c| {
                matches!(
                    c,
                    Component::Normal(_) | Component::CurDir | Component::ParentDir
                )
            })
            .collect();
        self.base_dir.join(relative)
    }

    fn visit(&self, path: &Path, summary: &mut WalkSummary) -> Result<(), WalkError> {
        let relative = path
            .strip_prefix(&self.base_dir)
            .map_err(|_| WalkError::OutsideBase {
                path: path.to_path_buf(),
                base: self.base_dir.clone(),
            })?;

        let Some(relative) = relative.to_str() else {
            warn!("Skipping path that is not valid UTF-8: {}", path.display());
            return Ok(());
        };

        summary.files_visited += 1;
        let verbose = self.options.verbose;

        for rule in self.rules {
            let Some(target) = rule.apply(relative) else {
                trace!("No match: {} for {}", relative, rule);
                continue;
            };
            let destination = self.destination(&target);

            if !self.options.overwrite && copy::exists(&destination) {
                progress!(
                    verbose,
                    "skipping: '{}' to '{}'",
                    path.display(),
                    destination.display()
                );
                summary.skipped += 1;
                continue;
            }

            progress!(
                verbose,
                "copying:  '{}' to '{}'",
                path.display(),
                destination.display()
            );

            if self.options.pretend {
                summary.copied += 1;
                continue;
            }

            match copy::copy_file(&destination, path) {
                Ok(bytes) => {
                    summary.copied += 1;
                    summary.bytes_copied += bytes;
                }
                Err(e) => {
                    summary.failed += 1;
                    if verbose {
                        error!("{}", e);
                    } else {
                        debug!("{}", e);
                    }
                    if self.options.collapse_on_error {
                        return Err(WalkError::Copy {
                            from: path.to_path_buf(),
                            to: destination,
                            error: e,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
