//! Rule file parser
//!
//! A rule file is a sequence of template/target line pairs. Blank lines and
//! lines starting with `//` are ignored anywhere. A template prefixed with
//! `!` is negated; `\!` escapes a template that really starts with `!`.

use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

use super::{Rule, RuleError};

/// Trimmed from both ends of every line
const TRIM_CHARS: &[char] = &[' ', '\t', '\r', '\n', '\u{feff}'];

/// One or more backslashes followed by `!`; the first backslash is dropped
static ESCAPED_NEGATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\\(\\*!.*)$").expect("invalid negation escape regex"));

enum State {
    ExpectTemplate,
    ExpectTarget {
        line: usize,
        template: String,
        rule: Rule,
    },
}

/// Parse rule file contents into rules, in file order
pub(super) fn parse_rules(content: &str) -> Result<Vec<Rule>, RuleError> {
    let mut rules = Vec::new();
    let mut state = State::ExpectTemplate;

    for (index, raw) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim_matches(TRIM_CHARS);

        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        state = match state {
            State::ExpectTemplate => State::ExpectTarget {
                line: line_number,
                template: line.to_string(),
                rule: parse_template(line, line_number)?,
            },
            State::ExpectTarget { mut rule, .. } => {
                rule.target = line.to_string();
                trace!("Parsed rule {}: {}", rules.len() + 1, rule);
                rules.push(rule);
                State::ExpectTemplate
            }
        };
    }

    if let State::ExpectTarget { line, template, .. } = state {
        return Err(RuleError::MissingTarget { line, template });
    }

    Ok(rules)
}

/// Build a rule with no target yet from a template line
fn parse_template(line: &str, line_number: usize) -> Result<Rule, RuleError> {
    let (expression, negated) = match line.strip_prefix('!') {
        Some(rest) => {
            let rest = rest.trim_matches(TRIM_CHARS);
            if rest.is_empty() {
                return Err(RuleError::MissingExpression { line: line_number });
            }
            (rest.to_string(), true)
        }
        None => (
            ESCAPED_NEGATION_RE.replace(line, "$1").into_owned(),
            false,
        ),
    };

    Rule::new(&expression, String::new(), negated).map_err(|source| {
        RuleError::InvalidExpression {
            line: line_number,
            expression,
            error: source,
        }
    })
}
