// Wire types for the preset server's JSON API.
//
// Fields use `#[serde(default)]` liberally: only `seq` is guaranteed on
// every reply, and preset metadata varies with the loaded E2 dump.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Full state ───────────────────────────────────────────────────────

/// `GET /api/v1/`: the full authoritative state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResponse {
    pub seq: u64,
    #[serde(default)]
    pub presets: HashMap<String, PresetMeta>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub safe: bool,
}

/// Metadata for one preset as the server describes it.
///
/// The known fields are modelled explicitly; everything else lands in
/// `extra` so nothing the server sends is dropped. Known fields with an
/// unexpected shape (`null`, a number where a string was expected) fall
/// back to their defaults instead of failing the whole state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetMeta {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub group: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub active: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub preview: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub program: bool,
    /// Either plain names or `{id, title, ...}` objects, depending on the
    /// server version.
    #[serde(default, deserialize_with = "lenient_list")]
    pub destinations: Vec<Value>,
    /// Catch-all for fields not modelled above.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(d)?, Value::Bool(true)))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Value>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items,
        _ => Vec::new(),
    })
}

// ── Sources ──────────────────────────────────────────────────────────

/// `GET /api/v1/sources/`: auxiliary read-only listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesResponse {
    #[serde(default)]
    pub safe: bool,
    #[serde(default)]
    pub sources: Vec<Value>,
}

// ── Commands ─────────────────────────────────────────────────────────

/// Body of `POST /api/v1/preset/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqRequest {
    pub seq: u64,
}

/// Body of `POST /api/v1/preset/`.
///
/// Unset flags are omitted from the JSON rather than sent as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub seq: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cut: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autotrans: Option<bool>,
}

impl TransitionRequest {
    pub fn cut(seq: u64) -> Self {
        Self {
            seq,
            cut: Some(true),
            autotrans: None,
        }
    }

    pub fn autotrans(seq: u64) -> Self {
        Self {
            seq,
            cut: None,
            autotrans: Some(true),
        }
    }
}

/// Reply to any accepted command: the new server sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqResponse {
    pub seq: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn transition_request_omits_unset_flags() {
        let cut = serde_json::to_value(TransitionRequest::cut(6)).unwrap();
        assert_eq!(cut, json!({ "seq": 6, "cut": true }));

        let autotrans = serde_json::to_value(TransitionRequest::autotrans(7)).unwrap();
        assert_eq!(autotrans, json!({ "seq": 7, "autotrans": true }));
    }

    #[test]
    fn state_response_keeps_unknown_preset_fields() {
        let raw = json!({
            "seq": 5,
            "safe": true,
            "presets": {
                "1.2": {
                    "title": "Wide",
                    "group": "Cameras",
                    "active": true,
                    "index": [1, 2]
                }
            }
        });

        let state: StateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(state.seq, 5);
        assert!(state.safe);

        let preset = &state.presets["1.2"];
        assert_eq!(preset.title.as_deref(), Some("Wide"));
        assert_eq!(preset.group.as_deref(), Some("Cameras"));
        assert!(preset.active);
        assert!(!preset.program);
        assert_eq!(preset.extra["index"], json!([1, 2]));
    }

    #[test]
    fn preset_meta_tolerates_null_and_object_fields() {
        let raw = json!({
            "seq": 3,
            "safe": null,
            "presets": {
                "1": {
                    "title": "Wide",
                    "group": null,
                    "active": null,
                    "program": "yes",
                    "destinations": [{ "id": 0, "title": "Screen" }, "Monitor"]
                },
                "2": { "title": 2, "destinations": null }
            }
        });

        let state: StateResponse = serde_json::from_value(raw).unwrap();
        assert!(!state.safe);

        let wide = &state.presets["1"];
        assert_eq!(wide.title.as_deref(), Some("Wide"));
        assert_eq!(wide.group, None);
        assert!(!wide.active);
        assert!(!wide.program);
        assert_eq!(
            wide.destinations,
            [json!({ "id": 0, "title": "Screen" }), json!("Monitor")]
        );

        let two = &state.presets["2"];
        assert_eq!(two.title.as_deref(), Some("2"));
        assert!(two.destinations.is_empty());
    }

    #[test]
    fn state_response_tolerates_missing_optional_fields() {
        let state: StateResponse = serde_json::from_str(r#"{"seq": 0}"#).unwrap();
        assert_eq!(state.seq, 0);
        assert!(state.presets.is_empty());
        assert!(!state.safe);
    }
}
