//! Sample payload synthesis.
//!
//! Two-tier policy: an explicit shape is resolved recursively through a fixed
//! tag table; an empty or absent shape falls back to a payload chosen by
//! keywords in the endpoint path, and finally to a generic envelope.

use crate::types::Shape;
use chrono::Utc;
use rand::Rng;
use serde_json::{json, Map, Value};

/// UUID returned for `id`-tagged fields.
pub const SAMPLE_UUID: &str = "123e4567-e89b-12d3-a456-426614174000";

/// Concrete sample for a primitive tag. Unknown tags yield `"sample"`.
pub fn sample_value(tag: &str) -> Value {
    match tag.trim().to_ascii_lowercase().as_str() {
        "string" => json!("sample"),
        "number" | "integer" | "int" => json!(42),
        "boolean" | "bool" => json!(true),
        "id" | "uuid" => json!(SAMPLE_UUID),
        "email" => json!("user@example.com"),
        "name" => json!("John Doe"),
        "url" => json!("https://example.com"),
        "date" | "datetime" => json!("2024-01-01T00:00:00Z"),
        _ => json!("sample"),
    }
}

/// Synthesize a payload for `shape`, falling back to `path_hint` heuristics.
pub fn synthesize(shape: Option<&Shape>, path_hint: Option<&str>) -> Value {
    synthesize_with_rng(shape, path_hint, &mut rand::thread_rng())
}

/// [`synthesize`] with an explicit source of randomness for generated file IDs.
pub fn synthesize_with_rng<R: Rng + ?Sized>(
    shape: Option<&Shape>,
    path_hint: Option<&str>,
    rng: &mut R,
) -> Value {
    match (shape, path_hint) {
        (Some(shape), _) if !shape.is_empty_mapping() => resolve(shape),
        (_, Some(path)) => contextual_payload(path, rng),
        (_, None) => Value::Object(Map::new()),
    }
}

fn resolve(shape: &Shape) -> Value {
    match shape {
        Shape::Primitive(tag) => sample_value(tag),
        Shape::Sequence(items) => Value::Array(items.iter().map(resolve).collect()),
        Shape::Mapping(fields) => resolve_mapping(fields),
    }
}

fn resolve_mapping(fields: &[(String, Shape)]) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, shape)| (key.clone(), resolve(shape)))
            .collect(),
    )
}

/// Illustrative payload chosen by keywords in `path`.
///
/// Conversion keywords are checked before `upload` so `/webp-to-png/upload`
/// describes the conversion result.
pub fn contextual_payload<R: Rng + ?Sized>(path: &str, rng: &mut R) -> Value {
    let path = path.to_ascii_lowercase();
    let now = Utc::now().to_rfc3339();

    if path.contains("webp-to-mp4") {
        json!({
            "videoUrl": "https://cdn.example.com/animation.mp4",
            "duration": 5.2,
            "format": "mp4",
            "resolution": "1280x720",
            "fileSize": 2048576,
            "status": "ready",
        })
    } else if path.contains("webp-to-png") {
        json!({
            "imageUrl": "https://cdn.example.com/converted.png",
            "originalFormat": "webp",
            "newFormat": "png",
            "width": 1920,
            "height": 1080,
            "status": "converted",
        })
    } else if path.contains("upload") {
        json!({
            "fileId": random_file_id(rng),
            "fileName": "image.webp",
            "size": 524288,
            "uploadedAt": now,
            "status": "success",
        })
    } else if path.contains("upscale") {
        json!({
            "originalUrl": "https://cdn.example.com/original.webp",
            "upscaledUrl": "https://cdn.example.com/upscaled.webp",
            "scale": 4,
            "processingTime": 1250,
            "status": "completed",
        })
    } else {
        json!({
            "data": "Sample response",
            "status": "success",
            "timestamp": now,
        })
    }
}

/// `file_` followed by nine lowercase base-36 characters.
fn random_file_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("file_{suffix}")
}

/// Repeat the elements of every top-level sequence until it holds `items`
/// entries. Objects holding a sequence under `data` or `items` are expanded
/// too; other values are returned unchanged.
pub fn expand_for_pagination(sample: Value, items: usize) -> Value {
    match sample {
        Value::Array(elements) => Value::Array(cycle_to(elements, items)),
        Value::Object(mut map) => {
            for key in ["data", "items"] {
                if let Some(Value::Array(elements)) = map.get_mut(key) {
                    *elements = cycle_to(std::mem::take(elements), items);
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

fn cycle_to(elements: Vec<Value>, items: usize) -> Vec<Value> {
    if elements.is_empty() {
        return elements;
    }
    elements.iter().cycle().take(items.max(elements.len())).cloned().collect()
}
