//! Path pattern compilation and matching.
//!
//! # Responsibilities
//! - Normalize patterns to a single leading `/`
//! - Compile `/users/:id` into literal and capture segments
//! - Match request paths segment by segment, binding captures
//!
//! # Design Decisions
//! - No regex: a segment is either an exact literal or a `:name` capture
//! - A capture matches exactly one non-empty segment
//! - Segment counts must be equal (no prefix or wildcard matching)
//! - One trailing `/` on a request path is ignored

use std::collections::HashMap;
use std::fmt;

/// Normalize a pattern or request path so it always starts with `/`.
pub fn normalize(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(String),
}

/// A compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compile a pattern. A missing leading `/` is added.
    pub fn compile(pattern: &str) -> Self {
        let source = normalize(pattern);
        let segments = split_segments(&source)
            .map(|s| match s.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Capture(name.to_string()),
                _ => Segment::Literal(s.to_string()),
            })
            .collect();

        Self { source, segments }
    }

    /// The normalized pattern string, e.g. `/users/:id`.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of the capture segments, in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Capture(name) => Some(name.clone()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Returns true if `path` matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.captures(path).is_some()
    }

    /// Match `path` and return the bound captures, or `None` on mismatch.
    pub fn captures(&self, path: &str) -> Option<HashMap<String, String>> {
        let path = normalize(path);
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path.as_str(),
        };
        let parts: Vec<&str> = split_segments(path).collect();

        if parts.len() != self.segments.len() {
            return None;
        }

        let mut captures = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Capture(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    captures.insert(name.clone(), part.to_string());
                }
            }
        }

        Some(captures)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// "/" yields no segments; "/a//b" keeps the empty middle segment so it can
// never satisfy a capture.
fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let mut iter = trimmed.split('/');
    if trimmed.is_empty() {
        iter.next();
    }
    iter
}
