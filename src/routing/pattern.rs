//! URL pattern compilation, matching and generation.
//!
//! # Syntax
//! - Literal text matches itself.
//! - `{name}` matches one non-empty path segment (`[^/]+`).
//! - `{name:regex}` matches the given regular expression.
//! - A trailing `*name` matches the rest of the path, slashes included.
//!
//! # Design Decisions
//! - Patterns compile once into an anchored regex at registration time
//! - Matching runs against the URL-decoded path
//! - Generation percent-encodes values; remainder values keep their `/`

use regex::Regex;
use thiserror::Error;

use crate::routing::Matchdict;

/// Errors raised while compiling a pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("unclosed placeholder starting at byte {0}")]
    UnclosedPlaceholder(usize),

    #[error("invalid placeholder name `{0}`")]
    InvalidName(String),

    #[error("placeholder `{0}` appears more than once")]
    DuplicateName(String),

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

/// A placeholder value required for generation was not supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPlaceholder(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Segment(String),
    Constrained { name: String, regex: String },
    Remainder(String),
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    parts: Vec<Part>,
    regex: Regex,
}

impl RoutePattern {
    /// Compile a pattern. A missing leading `/` is added.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let source = if pattern.starts_with('/') {
            pattern.to_string()
        } else {
            format!("/{}", pattern)
        };

        let parts = parse(&source)?;

        let mut seen: Vec<&str> = Vec::new();
        for part in &parts {
            let name = match part {
                Part::Literal(_) => continue,
                Part::Segment(name) | Part::Remainder(name) => name.as_str(),
                Part::Constrained { name, .. } => name.as_str(),
            };
            if seen.contains(&name) {
                return Err(PatternError::DuplicateName(name.to_string()));
            }
            seen.push(name);
        }

        let mut expr = String::from("^");
        for part in &parts {
            match part {
                Part::Literal(text) => expr.push_str(&regex::escape(text)),
                Part::Segment(name) => expr.push_str(&format!("(?P<{}>[^/]+)", name)),
                Part::Constrained { name, regex } => {
                    expr.push_str(&format!("(?P<{}>(?:{}))", name, regex))
                }
                Part::Remainder(name) => expr.push_str(&format!("(?P<{}>.*)", name)),
            }
        }
        expr.push('$');

        Ok(Self {
            source,
            parts,
            regex: Regex::new(&expr)?,
        })
    }

    /// The pattern text as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of all placeholders, in pattern order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Literal(_) => None,
            Part::Segment(name) | Part::Remainder(name) => Some(name.as_str()),
            Part::Constrained { name, .. } => Some(name.as_str()),
        })
    }

    /// Match a request path, returning the extracted values.
    pub fn match_path(&self, path: &str) -> Option<Matchdict> {
        let decoded = urlencoding::decode(path)
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| path.to_string());

        let captures = self.regex.captures(&decoded)?;
        Some(
            self.placeholders()
                .map(|name| {
                    let value = captures.name(name).map(|m| m.as_str()).unwrap_or("");
                    (name.to_string(), value.to_string())
                })
                .collect(),
        )
    }

    /// Build a path from placeholder values. Extra keys are ignored.
    pub fn generate(&self, kwargs: &Matchdict) -> Result<String, MissingPlaceholder> {
        let mut path = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                Part::Literal(text) => path.push_str(text),
                Part::Segment(name) | Part::Constrained { name, .. } => {
                    let value = kwargs
                        .get(name)
                        .ok_or_else(|| MissingPlaceholder(name.clone()))?;
                    path.push_str(&urlencoding::encode(value));
                }
                Part::Remainder(name) => {
                    let value = kwargs
                        .get(name)
                        .ok_or_else(|| MissingPlaceholder(name.clone()))?;
                    let encoded: Vec<_> = value
                        .split('/')
                        .map(|segment| urlencoding::encode(segment).into_owned())
                        .collect();
                    path.push_str(&encoded.join("/"));
                }
            }
        }
        Ok(path)
    }
}

fn parse(source: &str) -> Result<Vec<Part>, PatternError> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let bytes = source.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                let start = i;
                let mut depth = 0usize;
                let mut end = None;
                for (offset, &b) in bytes[start..].iter().enumerate() {
                    match b {
                        b'{' => depth += 1,
                        b'}' => {
                            depth -= 1;
                            if depth == 0 {
                                end = Some(start + offset);
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                let end = end.ok_or(PatternError::UnclosedPlaceholder(start))?;

                if !literal.is_empty() {
                    parts.push(Part::Literal(std::mem::take(&mut literal)));
                }

                let inner = &source[start + 1..end];
                let part = match inner.split_once(':') {
                    Some((name, regex)) => Part::Constrained {
                        name: checked_name(name)?,
                        regex: regex.to_string(),
                    },
                    None => Part::Segment(checked_name(inner)?),
                };
                parts.push(part);
                i = end + 1;
            }
            b'*' if is_identifier(&source[i + 1..]) => {
                if !literal.is_empty() {
                    parts.push(Part::Literal(std::mem::take(&mut literal)));
                }
                parts.push(Part::Remainder(source[i + 1..].to_string()));
                break;
            }
            _ => {
                // Advance over one full UTF-8 character.
                let ch = source[i..].chars().next().unwrap_or_default();
                literal.push(ch);
                i += ch.len_utf8().max(1);
            }
        }
    }

    if !literal.is_empty() {
        parts.push(Part::Literal(literal));
    }
    Ok(parts)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn checked_name(name: &str) -> Result<String, PatternError> {
    let name = name.trim();
    if is_identifier(name) {
        Ok(name.to_string())
    } else {
        Err(PatternError::InvalidName(name.to_string()))
    }
}
