//! Copy rules - regex templates and the target paths they produce

mod parser;
mod set;

pub use set::RuleSet;

use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;
use thiserror::Error;

/// Decomposes a relative path for negated rules, which have no match of
/// their own to take groups from:
/// `$0` the whole path, `$1` the directory prefix including its trailing
/// separator, `$2` the file name up to its last period, `$3` the final
/// extension including the period.
static PATH_PARTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    let sep = regex::escape(std::path::MAIN_SEPARATOR_STR);
    Regex::new(&format!(
        r"^((?:[^{sep}]*{sep})*)([^.]*(?:\.[^.]*)*?)(\.[^.]*)?$"
    ))
    .expect("invalid path decomposition regex")
});

/// Errors produced while reading a rule file
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("line {line}: expected regular expression after negation operator")]
    MissingExpression { line: usize },

    #[error("line {line}: invalid regular expression: {expression} ({})", regex_reason(.error))]
    InvalidExpression {
        line: usize,
        expression: String,
        error: regex::Error,
    },

    #[error("line {line}: source with no target: {template}")]
    MissingTarget { line: usize, template: String },

    #[error("cannot read rule file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Last line of a regex error, which otherwise spans several lines
fn regex_reason(error: &regex::Error) -> String {
    let message = error.to_string();
    let reason = message
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();
    reason.trim_start_matches("error: ").to_string()
}

/// A template/target pair.
///
/// A plain rule copies every path the template matches in full, expanding
/// the template's own capture groups into the target. A negated rule copies
/// every path the template does *not* match, expanding the fixed
/// directory/stem/extension groups instead.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Template as written in the rule file
    template: Regex,

    /// Template anchored at both ends, used for matching
    matcher: Regex,

    /// Substitution pattern (`$1`, `${name}`, ...)
    target: String,

    negated: bool,
}

impl Rule {
    /// Create a rule, compiling `template`
    pub fn new(
        template: &str,
        target: impl Into<String>,
        negated: bool,
    ) -> Result<Self, regex::Error> {
        // Validate the bare expression first so that something like `a)(b`
        // cannot slip through once wrapped in a group.
        let template = Regex::new(template)?;
        // A trailing `(?x)` comment swallows the closing group; a newline
        // ends the comment and is ignored in verbose mode.
        let matcher = Regex::new(&format!(r"\A(?:{})\z", template.as_str()))
            .or_else(|e| {
                Regex::new(&format!("\\A(?:{}\n)\\z", template.as_str())).map_err(|_| e)
            })?;

        Ok(Self {
            template,
            matcher,
            target: target.into(),
            negated,
        })
    }

    /// Test a path relative to the walked directory.
    ///
    /// Returns the target path when the file should be copied.
    pub fn apply(&self, relative_path: &str) -> Option<String> {
        let captures = if self.negated {
            if self.matcher.is_match(relative_path) {
                return None;
            }
            // Matches any string
            PATH_PARTS_RE.captures(relative_path)?
        } else {
            self.matcher.captures(relative_path)?
        };

        let mut target = String::with_capacity(self.target.len() + relative_path.len());
        captures.expand(&self.target, &mut target);
        Some(target)
    }

    /// The template expression
    pub fn template(&self) -> &str {
        self.template.as_str()
    }

    /// The substitution pattern
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "!")?;
        }
        write!(f, "{} -> {}", self.template(), self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(template: &str, target: &str) -> Rule {
        Rule::new(template, target, false).unwrap()
    }

    fn negated(template: &str, target: &str) -> Rule {
        Rule::new(template, target, true).unwrap()
    }

    #[test]
    fn test_full_match_required() {
        let r = rule(r"a\.txt", "b.txt");

        assert_eq!(r.apply("a.txt").as_deref(), Some("b.txt"));
        assert_eq!(r.apply("xa.txt"), None);
        assert_eq!(r.apply("a.txt.bak"), None);
    }

    #[test]
    fn test_alternation_matches_whole_path() {
        // The longer branch must be taken when only it covers the path
        let r = rule("a|ab", "hit");
        assert_eq!(r.apply("ab").as_deref(), Some("hit"));
    }

    #[test]
    fn test_capture_groups_substituted() {
        let r = rule(r"(.*)\.txt", "$1.bak");
        assert_eq!(r.apply("notes.txt").as_deref(), Some("notes.bak"));

        let r = rule(r"(?P<name>\w+)-(\d+)\.log", "${2}_$name.log");
        assert_eq!(r.apply("server-42.log").as_deref(), Some("42_server.log"));

        let r = rule(r".*\.md", "copy_of_$0");
        assert_eq!(r.apply("README.md").as_deref(), Some("copy_of_README.md"));
    }

    #[test]
    fn test_literal_dollar_in_target() {
        let r = rule(r"(.*)", "$$$1");
        assert_eq!(r.apply("x").as_deref(), Some("$x"));
    }

    #[test]
    fn test_case_sensitive() {
        let r = rule(r".*\.TXT", "upper");
        assert_eq!(r.apply("a.txt"), None);
        assert_eq!(r.apply("a.TXT").as_deref(), Some("upper"));
    }

    #[test]
    fn test_negated_skips_matching_paths() {
        let r = negated(r".*\.log", "$0.bak");
        assert_eq!(r.apply("debug.log"), None);
        assert_eq!(r.apply("notes.txt").as_deref(), Some("notes.txt.bak"));
    }

    #[test]
    fn test_negated_template_uses_full_match() {
        // `\.log$` only matches the whole path when it is exactly ".log"
        let r = negated(r"\.log$", "[$1][$2][$3]");
        assert_eq!(r.apply("notes.txt").as_deref(), Some("[][notes][.txt]"));
        assert_eq!(r.apply("debug.log").as_deref(), Some("[][debug][.log]"));
        assert_eq!(r.apply(".log"), None);
    }

    #[test]
    fn test_negated_groups_without_extension() {
        let r = negated("nothing", "[$1][$2][$3]");
        assert_eq!(r.apply("Makefile").as_deref(), Some("[][Makefile][]"));
    }

    #[test]
    fn test_negated_groups_multiple_periods() {
        let r = negated("nothing", "[$1][$2][$3]");
        assert_eq!(
            r.apply("archive.tar.gz").as_deref(),
            Some("[][archive.tar][.gz]")
        );
    }

    #[test]
    fn test_negated_groups_dotfile() {
        // A leading period is treated as the extension
        let r = negated("nothing", "[$1][$2][$3]");
        assert_eq!(r.apply(".bashrc").as_deref(), Some("[][][.bashrc]"));
    }

    #[cfg(unix)]
    #[test]
    fn test_negated_groups_with_directories() {
        let r = negated("nothing", "[$1][$2][$3]");
        assert_eq!(
            r.apply("src/util/io.rs").as_deref(),
            Some("[src/util/][io][.rs]")
        );
        assert_eq!(
            r.apply("v1.2/README").as_deref(),
            Some("[v1.2/][README][]")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_negated_redirects_into_directory() {
        let r = negated(r".*\.rs", "${1}backup/${2}_old$3");
        assert_eq!(
            r.apply("docs/guide.md").as_deref(),
            Some("docs/backup/guide_old.md")
        );
        assert_eq!(r.apply("src/main.rs"), None);
    }

    #[test]
    fn test_verbose_template_with_trailing_comment() {
        let r = rule(r"(?x) (\w+) \.txt  # the file", "$1.bak");
        assert_eq!(r.template(), r"(?x) (\w+) \.txt  # the file");
        assert_eq!(r.apply("notes.txt").as_deref(), Some("notes.bak"));
        assert_eq!(r.apply("x/notes.txt"), None);
        assert_eq!(r.apply("notes.txt.old"), None);

        let r = negated("(?x) .*\\.log # logs", "$0");
        assert_eq!(r.apply("app.log"), None);
        assert_eq!(r.apply("app.txt").as_deref(), Some("app.txt"));
    }

    #[test]
    fn test_invalid_template_rejected() {
        assert!(Rule::new("a)(b", "x", false).is_err());
        assert!(Rule::new("(unclosed", "x", true).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(rule(r".*\.c", "$0.o").to_string(), r".*\.c -> $0.o");
        assert_eq!(negated(r".*\.c", "$0").to_string(), r"!.*\.c -> $0");
    }
}
