//! Route patterns derived from endpoint paths.
//!
//! An endpoint path is kept verbatim in the endpoint set, but a server can
//! only route on the path part. The query string and fragment are dropped,
//! a leading `/` is ensured, and any segment containing a `${...}` template
//! placeholder becomes a single-segment parameter.

use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A routable path: literal segments and named single-segment parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let mut used: HashSet<String> = HashSet::new();

        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| match placeholder_name(segment) {
                Some(base) => {
                    let mut name = base.clone();
                    let mut n = 2;
                    while !used.insert(name.clone()) {
                        name = format!("{base}{n}");
                        n += 1;
                    }
                    Segment::Param(name)
                }
                None => Segment::Literal(segment.to_string()),
            })
            .collect();

        Self { segments }
    }

    /// Express-style path: `/users/:id`.
    pub fn to_express(&self) -> String {
        self.to_string()
    }

    pub fn has_params(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Param(_)))
    }

    /// Whether a request path (without query) matches. A trailing slash is ignored.
    pub fn matches(&self, request_path: &str) -> bool {
        let request_path = request_path.split('?').next().unwrap_or("");
        let parts: Vec<&str> = request_path.split('/').filter(|s| !s.is_empty()).collect();
        parts.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(parts)
                .all(|(segment, part)| match segment {
                    Segment::Literal(lit) => lit == part,
                    Segment::Param(_) => !part.is_empty(),
                })
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => write!(f, "/{lit}")?,
                Segment::Param(name) => write!(f, "/:{name}")?,
            }
        }
        Ok(())
    }
}

/// Parameter name for a segment containing `${expr}`: the last identifier in
/// the first placeholder, or `param`.
fn placeholder_name(segment: &str) -> Option<String> {
    let start = segment.find("${")?;
    let inner = &segment[start + 2..];
    let inner = inner.split('}').next().unwrap_or("");

    let name: String = inner
        .rsplit(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .find(|part| !part.is_empty() && !part.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or("param")
        .to_string();
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path() {
        let p = RoutePattern::parse("/api/users");
        assert_eq!(p.to_express(), "/api/users");
        assert!(!p.has_params());
        assert!(p.matches("/api/users"));
        assert!(p.matches("/api/users/"));
        assert!(!p.matches("/api/users/1"));
    }

    #[test]
    fn test_query_is_dropped() {
        let p = RoutePattern::parse("/a/b?x=1");
        assert_eq!(p.to_express(), "/a/b");
        assert!(p.matches("/a/b?x=2"));
    }

    #[test]
    fn test_root_and_relative() {
        assert_eq!(RoutePattern::parse("").to_express(), "/");
        assert_eq!(RoutePattern::parse("/?expires=1d").to_express(), "/");
        assert_eq!(RoutePattern::parse("api/users").to_express(), "/api/users");
    }

    #[test]
    fn test_placeholders_become_params() {
        let p = RoutePattern::parse("/api/users/${user.id}/posts/${encodeURIComponent(slug)}");
        assert_eq!(p.to_express(), "/api/users/:id/posts/:slug");
        assert!(p.has_params());
        assert!(p.matches("/api/users/42/posts/hello"));
        assert!(!p.matches("/api/users/42/posts"));
    }

    #[test]
    fn test_duplicate_param_names_are_numbered() {
        let p = RoutePattern::parse("/${id}/${id}/${}");
        assert_eq!(p.to_express(), "/:id/:id2/:param");
    }
}
