// Wire → domain conversions.

use e2sync_api::{PresetMeta, SourcesResponse, StateResponse};

use serde_json::Value;

use crate::model::{Preset, PresetId, Snapshot, Source, SourceListing};

/// Display label for one destination entry: the string itself, or an
/// object's `title`, `name` or `id`, in that order.
fn destination_label(dest: &Value) -> Option<String> {
    match dest {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => ["title", "name", "id"]
            .iter()
            .filter_map(|key| obj.get(*key))
            .find_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
        _ => None,
    }
}

fn preset_from_meta(id: String, meta: PresetMeta) -> Preset {
    let id = PresetId::from(id);
    let title = meta
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| id.to_string());
    let group = meta.group.filter(|g| !g.trim().is_empty());

    Preset {
        id,
        title,
        group,
        active: meta.active,
        preview: meta.preview,
        program: meta.program,
        destinations: meta.destinations.iter().filter_map(destination_label).collect(),
        extra: meta.extra,
    }
}

impl From<StateResponse> for Snapshot {
    fn from(state: StateResponse) -> Self {
        let presets = state
            .presets
            .into_iter()
            .map(|(id, meta)| {
                let preset = preset_from_meta(id, meta);
                (preset.id.clone(), preset)
            })
            .collect();

        Self {
            sequence: state.seq,
            presets,
            safe: state.safe,
        }
    }
}

impl From<SourcesResponse> for SourceListing {
    fn from(resp: SourcesResponse) -> Self {
        Self {
            safe: resp.safe,
            sources: resp.sources.into_iter().map(Source::from).collect(),
        }
    }
}
