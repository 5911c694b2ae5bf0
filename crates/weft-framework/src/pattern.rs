//! Path pattern compilation and matching.
//!
//! A pattern is one of four shapes, decided at compile time:
//!
//! | Shape          | Example                | Anchoring                        |
//! |----------------|------------------------|----------------------------------|
//! | literal        | `/about`               | exact, optional trailing `/`     |
//! | named tokens   | `/user/:id`            | full path, optional trailing `/` |
//! | segment glob   | `/files/*`             | full path, optional trailing `/` |
//! | raw regex      | `^/user/(\d+)`         | start only, as written           |
//!
//! Named tokens are written `:name` or `(:name)` and capture one non-empty
//! segment lazily. A segment that is exactly `*` captures one segment the same
//! way but without a name. A `*` inside a longer segment is literal text.
//!
//! Captures are reported left to right. Named captures are keyed by name and
//! unnamed ones by their zero-based position among all captures.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::error::{PatternError, PatternResult};

const SEGMENT_CAPTURE: &str = "[^/]+?";

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(:([A-Za-z_][A-Za-z0-9_]*)\)|:([A-Za-z_][A-Za-z0-9_]*)")
        .expect("valid token regex")
});

// =============================================================================
// Captures
// =============================================================================

/// One captured path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// The token name, or `None` for positional captures.
    pub name: Option<String>,
    /// The captured text. Empty when an optional group did not participate.
    pub value: String,
}

/// The ordered captures of one successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures(Vec<Capture>);

impl Captures {
    /// Returns `true` if the pattern captured nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of captures.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a capture value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|c| c.name.as_deref() == Some(name))
            .map(|c| c.value.as_str())
    }

    /// Iterates captures in match order.
    pub fn iter(&self) -> impl Iterator<Item = &Capture> {
        self.0.iter()
    }

    /// Converts the captures to parameter pairs. Named captures keep their
    /// name; positional ones are keyed by their index.
    pub fn into_params(self) -> Vec<(String, String)> {
        self.0
            .into_iter()
            .enumerate()
            .map(|(index, capture)| {
                let key = capture.name.unwrap_or_else(|| index.to_string());
                (key, capture.value)
            })
            .collect()
    }
}

// =============================================================================
// PathPattern
// =============================================================================

enum Matcher {
    Literal(String),
    Regex(Regex),
}

/// A compiled path pattern.
pub struct PathPattern {
    source: String,
    matcher: Matcher,
}

impl PathPattern {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when the expanded expression is not a valid
    /// regex, such as a raw pattern with unbalanced groups or two tokens with
    /// the same name.
    pub fn compile(pattern: &str) -> PatternResult<Self> {
        let source = pattern.to_string();

        let expression = if pattern.starts_with('^') {
            Some(rewrite_segments(pattern, |segment, out| out.push_str(segment)))
        } else if TOKEN.is_match(pattern) || has_glob_segment(pattern) {
            let mut body = rewrite_segments(pattern, expand_tokens);
            body.insert(0, '^');
            body.push_str("/?$");
            Some(body)
        } else {
            None
        };

        let matcher = match expression {
            Some(expression) => {
                trace!(pattern = %source, regex = %expression, "Compiled path pattern");
                let regex = Regex::new(&expression).map_err(|e| PatternError {
                    pattern: source.clone(),
                    source: e,
                })?;
                Matcher::Regex(regex)
            }
            None => Matcher::Literal(source.clone()),
        };

        Ok(Self { source, matcher })
    }

    /// Returns the pattern as registered.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns `true` for a plain literal pattern.
    pub fn is_literal(&self) -> bool {
        matches!(self.matcher, Matcher::Literal(_))
    }

    /// Tests `path` against the pattern, returning its captures on success.
    pub fn matches(&self, path: &str) -> Option<Captures> {
        match &self.matcher {
            Matcher::Literal(literal) => {
                let matched = path == literal
                    || path
                        .strip_suffix('/')
                        .is_some_and(|trimmed| trimmed == literal);
                matched.then(Captures::default)
            }
            Matcher::Regex(regex) => {
                let caps = regex.captures(path)?;
                let captures = regex
                    .capture_names()
                    .enumerate()
                    .skip(1)
                    .map(|(index, name)| Capture {
                        name: name.map(str::to_string),
                        value: caps
                            .get(index)
                            .map(|m| m.as_str().to_string())
                            .unwrap_or_default(),
                    })
                    .collect();
                Some(Captures(captures))
            }
        }
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathPattern")
            .field("source", &self.source)
            .field("literal", &self.is_literal())
            .finish()
    }
}

fn has_glob_segment(pattern: &str) -> bool {
    pattern.split('/').any(|segment| segment == "*")
}

/// Rebuilds `pattern` segment by segment. Segments that are exactly `*` become
/// an unnamed capture; every other segment is handed to `other`.
fn rewrite_segments(pattern: &str, other: impl Fn(&str, &mut String)) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    for (index, segment) in pattern.split('/').enumerate() {
        if index > 0 {
            out.push('/');
        }
        if segment == "*" {
            out.push('(');
            out.push_str(SEGMENT_CAPTURE);
            out.push(')');
        } else {
            other(segment, &mut out);
        }
    }
    out
}

/// Escapes literal text and expands `:name` / `(:name)` tokens.
fn expand_tokens(segment: &str, out: &mut String) {
    let mut last = 0;
    for caps in TOKEN.captures_iter(segment) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2))) else {
            continue;
        };
        out.push_str(&regex::escape(&segment[last..whole.start()]));
        out.push_str("(?P<");
        out.push_str(name.as_str());
        out.push('>');
        out.push_str(SEGMENT_CAPTURE);
        out.push(')');
        last = whole.end();
    }
    out.push_str(&regex::escape(&segment[last..]));
}
