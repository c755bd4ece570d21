//! Core data types shared by the scanner and the synthesizer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// HTTP methods an endpoint can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Canonical upper-case name (`"GET"`, `"POST"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Lower-case verb used for route registration (`app.get`, `axios.post`).
    pub fn verb(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a method token is not one of the five supported methods.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported HTTP method '{0}'")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// A recursive description of a request or response body.
///
/// Serialized as plain JSON: a string is a primitive tag, an array is a
/// sequence, an object is an ordered mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Shape {
    Primitive(String),
    Sequence(Vec<Shape>),
    Mapping(Vec<(String, Shape)>),
}

impl Shape {
    /// An empty mapping, the "shape unknown" marker.
    pub fn empty() -> Self {
        Shape::Mapping(Vec::new())
    }

    pub fn is_empty_mapping(&self) -> bool {
        matches!(self, Shape::Mapping(fields) if fields.is_empty())
    }
}

impl From<Value> for Shape {
    fn from(value: Value) -> Self {
        match value {
            Value::String(tag) => Shape::Primitive(tag),
            Value::Bool(_) => Shape::Primitive("boolean".to_string()),
            Value::Number(_) => Shape::Primitive("number".to_string()),
            Value::Null => Shape::empty(),
            Value::Array(items) => Shape::Sequence(items.into_iter().map(Shape::from).collect()),
            Value::Object(map) => Shape::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, Shape::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Shape> for Value {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Primitive(tag) => Value::String(tag),
            Shape::Sequence(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Shape::Mapping(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(key, shape)| (key, Value::from(shape)))
                    .collect(),
            ),
        }
    }
}

/// A canonical API endpoint, identified by `(method, path)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub method: HttpMethod,
    /// Normalized path: no scheme or host, query string preserved.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_schema: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Shape>,
}

impl Endpoint {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body_schema: None,
            response_schema: None,
        }
    }

    pub fn with_response_schema(mut self, shape: Shape) -> Self {
        self.response_schema = Some(shape);
        self
    }

    /// Deduplication key: `"METHOD path"`.
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// A single textual occurrence of an HTTP call in scanned source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSite {
    /// The raw string literal as found in source.
    pub url: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub source_file: String,
}

/// Which declaration keyword introduced a [`TypeDeclaration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Interface,
    TypeAlias,
}

/// An interface or object type alias captured as opaque text.
///
/// Serializes with the reconstructed `definition` alongside its parts, and
/// deserializes from either form: `{name, kind, bodyText}` or the web
/// client's `{name, definition}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TypeDeclarationInput", into = "TypeDeclarationOutput")]
pub struct TypeDeclaration {
    pub name: String,
    pub kind: DeclarationKind,
    /// Raw text between the opening brace and the closing brace at column start.
    pub body_text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeDeclarationInput {
    name: String,
    #[serde(default)]
    kind: Option<DeclarationKind>,
    #[serde(default)]
    body_text: Option<String>,
    #[serde(default)]
    definition: Option<String>,
}

impl From<TypeDeclarationInput> for TypeDeclaration {
    fn from(input: TypeDeclarationInput) -> Self {
        if let Some(body_text) = input.body_text {
            return Self {
                name: input.name,
                kind: input.kind.unwrap_or(DeclarationKind::Interface),
                body_text,
            };
        }

        let definition = input.definition.unwrap_or_default();
        let kind = input.kind.unwrap_or_else(|| {
            if definition.trim_start().starts_with("type ") {
                DeclarationKind::TypeAlias
            } else {
                DeclarationKind::Interface
            }
        });
        let body_text = match (definition.find('{'), definition.rfind('}')) {
            (Some(open), Some(close)) if open < close => {
                let body = &definition[open + 1..close];
                body.strip_suffix('\n').unwrap_or(body).to_string()
            }
            _ => definition,
        };
        Self {
            name: input.name,
            kind,
            body_text,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TypeDeclarationOutput {
    name: String,
    kind: DeclarationKind,
    body_text: String,
    definition: String,
}

impl From<TypeDeclaration> for TypeDeclarationOutput {
    fn from(decl: TypeDeclaration) -> Self {
        let definition = decl.definition();
        Self {
            name: decl.name,
            kind: decl.kind,
            body_text: decl.body_text,
            definition,
        }
    }
}

impl TypeDeclaration {
    /// Reconstructed declaration text, suitable for display.
    pub fn definition(&self) -> String {
        match self.kind {
            DeclarationKind::Interface => format!("interface {} {{{}\n}}", self.name, self.body_text),
            DeclarationKind::TypeAlias => format!("type {} = {{{}\n}}", self.name, self.body_text),
        }
    }
}

/// Descriptive metadata about the scanned repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoMetadata {
    pub name: String,
    pub description: String,
    /// Language name to byte count.
    #[serde(default)]
    pub languages: BTreeMap<String, u64>,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub contributors: u64,
    pub is_active: bool,
}

/// A file the scanner had to leave out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Everything a scan produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub interfaces: Vec<TypeDeclaration>,
    #[serde(default)]
    pub fetch_calls: Vec<CallSite>,
    #[serde(default)]
    pub axios_calls: Vec<CallSite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_metadata: Option<RepoMetadata>,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub files_scanned: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_files: Vec<SkippedFile>,
}
