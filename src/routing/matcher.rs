//! Path pattern matching.
//!
//! # Responsibilities
//! - Parse route paths into literal and parameter segments
//! - Normalize request paths before lookup
//! - Match normalized segments against a pattern, capturing parameters
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `:name` segments capture exactly one path segment
//! - No regex to guarantee O(n) matching

use std::collections::BTreeMap;

use crate::routing::router::RouteError;

/// Parameters captured while matching, keyed by parameter name.
pub type Params = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled route path such as `/` or `/cities/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a route path. The path must start with `/`.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if !path.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        if path.contains(['?', '#']) {
            return Err(invalid("must not contain a query or fragment"));
        }

        let mut segments = Vec::new();
        let mut names = Vec::new();
        for part in split_segments(path) {
            match part.strip_prefix(':') {
                Some("") => return Err(invalid("parameter name must not be empty")),
                Some(name) => {
                    if names.contains(&name) {
                        return Err(invalid("parameter names must be unique"));
                    }
                    names.push(name);
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Literal(part.to_string())),
            }
        }

        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    /// The path as declared.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the pattern has no parameter segments.
    pub fn is_static(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Canonical form used for uniqueness checks: parameters collapse to `:`,
    /// so `/a/:id` and `/a/:name` share a shape.
    pub fn shape(&self) -> String {
        let parts: Vec<&str> = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Literal(l) => l.as_str(),
                Segment::Param(_) => ":",
            })
            .collect();
        format!("/{}", parts.join("/"))
    }

    /// Match normalized request segments, returning captured parameters.
    pub fn matches(&self, request: &[&str]) -> Option<Params> {
        if request.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, value) in self.segments.iter().zip(request) {
            match segment {
                Segment::Literal(l) if l == value => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*value).to_string());
                }
            }
        }
        Some(params)
    }

    /// Build a concrete path from parameter values.
    /// Returns `None` when a parameter is missing.
    pub fn fill(&self, params: &Params) -> Option<String> {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(l) => parts.push(l.as_str()),
                Segment::Param(name) => parts.push(params.get(name)?.as_str()),
            }
        }
        Some(format!("/{}", parts.join("/")))
    }
}

/// Split a path into non-empty segments, dropping any query or fragment.
/// `//results/` and `/results?x=1` both yield `["results"]`.
pub fn split_segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Normalize a request path to its canonical form.
pub fn normalize_path(path: &str) -> String {
    format!("/{}", split_segments(path).join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/results/"), "/results");
        assert_eq!(normalize_path("//results//"), "/results");
        assert_eq!(normalize_path("/results?city_id=1"), "/results");
        assert_eq!(normalize_path("/results#top"), "/results");
    }

    #[test]
    fn test_static_pattern() {
        let pattern = PathPattern::parse("/results").unwrap();
        assert!(pattern.is_static());
        assert!(pattern.matches(&["results"]).is_some());
        assert!(pattern.matches(&["Results"]).is_none()); // Case sensitive
        assert!(pattern.matches(&[]).is_none());
    }

    #[test]
    fn test_param_pattern() {
        let pattern = PathPattern::parse("/cities/:id").unwrap();
        assert!(!pattern.is_static());
        assert_eq!(pattern.shape(), "/cities/:");

        let params = pattern.matches(&["cities", "42"]).unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
        assert!(pattern.matches(&["cities"]).is_none());
        assert!(pattern.matches(&["towns", "42"]).is_none());
    }

    #[test]
    fn test_fill() {
        let pattern = PathPattern::parse("/cities/:id").unwrap();
        let mut params = Params::new();
        assert_eq!(pattern.fill(&params), None);

        params.insert("id".into(), "7".into());
        assert_eq!(pattern.fill(&params).as_deref(), Some("/cities/7"));
        assert_eq!(PathPattern::parse("/").unwrap().fill(&params).as_deref(), Some("/"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(PathPattern::parse("results").is_err());
        assert!(PathPattern::parse("/a/:").is_err());
        assert!(PathPattern::parse("/a/:x/:x").is_err());
        assert!(PathPattern::parse("/a?b=c").is_err());
    }
}
