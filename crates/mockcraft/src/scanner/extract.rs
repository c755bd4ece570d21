//! Lexical call-site and type-declaration extraction.
//!
//! Three independent regex scans over raw source text:
//!
//! 1. **fetch-style**: `fetch('url', { method: 'POST' })`, method defaults to GET.
//! 2. **axios-style**: `axios.post('url')`, method taken from the member name.
//! 3. **declarations**: `interface Name { ... }` and `type Name = { ... }`,
//!    captured as opaque text up to the first `}` at column start.
//!
//! Every function is stateless: text in, fresh match list out.

use crate::types::{CallSite, DeclarationKind, HttpMethod, TypeDeclaration};
use regex::Regex;
use std::sync::OnceLock;

fn fetch_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\bfetch\(\s*['"`]([^'"`]+)['"`]\s*(?:,\s*\{([^}]*)\})?"#)
            .expect("fetch regex is valid")
    })
}

fn fetch_method_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\bmethod\s*:\s*['"`]?(\w+)['"`]?"#).expect("method regex is valid")
    })
}

fn axios_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\baxios\.(get|post|put|delete|patch)\(\s*['"`]([^'"`]+)['"`]"#)
            .expect("axios regex is valid")
    })
}

fn interface_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\binterface\s+(\w+)[^{;]*?\{((?s:.*?))\n\}"#)
            .expect("interface regex is valid")
    })
}

fn type_alias_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\btype\s+(\w+)\s*(?:<[^>=]*>)?\s*=\s*\{((?s:.*?))\n\}"#)
            .expect("type alias regex is valid")
    })
}

/// Everything extracted from one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub fetch_calls: Vec<CallSite>,
    pub axios_calls: Vec<CallSite>,
    pub type_declarations: Vec<TypeDeclaration>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.fetch_calls.is_empty()
            && self.axios_calls.is_empty()
            && self.type_declarations.is_empty()
    }
}

/// Run all three scans over `text`.
pub fn extract(text: &str, source_file: &str) -> Extraction {
    Extraction {
        fetch_calls: extract_fetch_calls(text, source_file),
        axios_calls: extract_axios_calls(text, source_file),
        type_declarations: extract_type_declarations(text),
    }
}

/// `fetch("url")` and `fetch("url", { method: "..." })` call sites.
///
/// A method token outside GET/POST/PUT/DELETE/PATCH (including a variable
/// name) leaves the call at GET.
pub fn extract_fetch_calls(text: &str, source_file: &str) -> Vec<CallSite> {
    fetch_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let url = caps.get(1)?.as_str();
            let method = caps
                .get(2)
                .and_then(|opts| fetch_method_re().captures(opts.as_str()))
                .and_then(|m| {
                    let token = m.get(1)?.as_str();
                    match token.parse::<HttpMethod>() {
                        Ok(method) => Some(method),
                        Err(e) => {
                            tracing::trace!("{source_file}: {e}, defaulting to GET");
                            None
                        }
                    }
                })
                .unwrap_or(HttpMethod::Get);
            Some(CallSite {
                url: url.to_string(),
                method,
                source_file: source_file.to_string(),
            })
        })
        .collect()
}

/// `axios.<verb>("url")` call sites.
pub fn extract_axios_calls(text: &str, source_file: &str) -> Vec<CallSite> {
    axios_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let method = caps.get(1)?.as_str().parse::<HttpMethod>().ok()?;
            let url = caps.get(2)?.as_str();
            Some(CallSite {
                url: url.to_string(),
                method,
                source_file: source_file.to_string(),
            })
        })
        .collect()
}

/// Interface and object type-alias declarations, in source order.
pub fn extract_type_declarations(text: &str) -> Vec<TypeDeclaration> {
    let mut found: Vec<(usize, TypeDeclaration)> = Vec::new();

    for (re, kind) in [
        (interface_re(), DeclarationKind::Interface),
        (type_alias_re(), DeclarationKind::TypeAlias),
    ] {
        for caps in re.captures_iter(text) {
            let (Some(whole), Some(name), Some(body)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            found.push((
                whole.start(),
                TypeDeclaration {
                    name: name.as_str().to_string(),
                    kind,
                    body_text: body.as_str().to_string(),
                },
            ));
        }
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, decl)| decl).collect()
}
