//! Reduce raw call sites to a canonical, deduplicated endpoint set.

use crate::types::{CallSite, Endpoint};
use std::collections::HashSet;

/// Strip scheme and host from an absolute `http(s)://` URL, keeping path and
/// query. Relative URLs, and absolute ones that do not parse, pass through
/// unchanged.
///
/// The path is sliced from the original text rather than re-serialized so
/// template placeholders like `${id}` survive without percent-encoding.
pub fn normalize_path(raw: &str) -> String {
    let Some(after_scheme) = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
    else {
        return raw.to_string();
    };
    if url::Url::parse(raw).is_err() {
        return raw.to_string();
    }

    let rest = match after_scheme.find(['/', '?', '#']) {
        Some(idx) => &after_scheme[idx..],
        None => "",
    };
    let rest = rest.split('#').next().unwrap_or("");

    match rest.split_once('?') {
        Some((path, query)) => {
            let path = if path.is_empty() { "/" } else { path };
            if query.is_empty() {
                path.to_string()
            } else {
                format!("{path}?{query}")
            }
        }
        None if rest.is_empty() => "/".to_string(),
        None => rest.to_string(),
    }
}

/// Collapse call sites to one endpoint per `(method, normalized path)`.
///
/// The first call site for a key wins; output follows first-insertion order.
pub fn reduce<'a, I>(call_sites: I) -> Vec<Endpoint>
where
    I: IntoIterator<Item = &'a CallSite>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut endpoints = Vec::new();

    for site in call_sites {
        let endpoint = Endpoint::new(site.method, normalize_path(&site.url));
        if seen.insert(endpoint.key()) {
            endpoints.push(endpoint);
        } else {
            tracing::trace!("duplicate call site {} in {}", endpoint.key(), site.source_file);
        }
    }

    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpMethod;

    fn site(method: HttpMethod, url: &str) -> CallSite {
        CallSite {
            url: url.to_string(),
            method,
            source_file: "src/api.ts".to_string(),
        }
    }

    #[test]
    fn test_normalize_absolute() {
        assert_eq!(normalize_path("https://host/a/b?x=1"), "/a/b?x=1");
        assert_eq!(normalize_path("http://host:8080/a"), "/a");
        assert_eq!(normalize_path("https://host"), "/");
        assert_eq!(normalize_path("https://host?x=1"), "/?x=1");
        assert_eq!(normalize_path("https://host/a?"), "/a");
        assert_eq!(normalize_path("https://host/a#top"), "/a");
    }

    #[test]
    fn test_normalize_keeps_placeholders_raw() {
        assert_eq!(
            normalize_path("https://api.example.com/users/${id}"),
            "/users/${id}"
        );
    }

    #[test]
    fn test_normalize_relative_and_unparsable_pass_through() {
        assert_eq!(normalize_path("/a/b?x=1"), "/a/b?x=1");
        assert_eq!(normalize_path("api/users"), "api/users");
        assert_eq!(normalize_path("http://[::1/api"), "http://[::1/api");
    }

    #[test]
    fn test_absolute_and_relative_collapse() {
        let sites = vec![
            site(HttpMethod::Get, "https://host/a/b?x=1"),
            site(HttpMethod::Get, "/a/b?x=1"),
        ];
        let endpoints = reduce(&sites);
        assert_eq!(endpoints, vec![Endpoint::new(HttpMethod::Get, "/a/b?x=1")]);
    }

    #[test]
    fn test_first_insertion_order_and_method_distinct() {
        let sites = vec![
            site(HttpMethod::Get, "/api/users"),
            site(HttpMethod::Post, "/api/users"),
            site(HttpMethod::Get, "/api/orders"),
            site(HttpMethod::Get, "/api/users"),
        ];
        let keys: Vec<String> = reduce(&sites).iter().map(Endpoint::key).collect();
        assert_eq!(
            keys,
            vec!["GET /api/users", "POST /api/users", "GET /api/orders"]
        );
    }

    #[test]
    fn test_reduce_empty() {
        assert!(reduce(&Vec::new()).is_empty());
    }
}
