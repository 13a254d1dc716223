use std::collections::BTreeMap;

use serde::Serialize;

use super::preset::{Preset, PresetGroup, PresetId};

/// The full server state as seen by the client at one point in time.
///
/// Immutable once published: the store swaps whole snapshots, so a reader
/// holding an `Arc<Snapshot>` never observes a partial update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// Server-issued version; the next command must quote this value.
    pub sequence: u64,
    pub presets: BTreeMap<PresetId, Preset>,
    /// Whether the switcher currently permits transitions.
    pub safe: bool,
}

impl Snapshot {
    /// The state before the first successful refresh.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn preset(&self, id: &PresetId) -> Option<&Preset> {
        self.presets.get(id)
    }

    /// The currently selected preset, if the server marked one.
    pub fn active(&self) -> Option<&Preset> {
        self.presets.values().find(|p| p.active)
    }

    /// Presets grouped by their group title.
    ///
    /// The ungrouped presets come first, then the named groups sorted by
    /// lowercased title. Group keys compare case-insensitively; the first
    /// spelling seen in id order is used as the title.
    pub fn groups(&self) -> Vec<PresetGroup<'_>> {
        let mut ungrouped = PresetGroup {
            title: None,
            presets: Vec::new(),
        };
        let mut groups: BTreeMap<String, PresetGroup<'_>> = BTreeMap::new();

        for preset in self.presets.values() {
            let Some(title) = preset.group.as_deref() else {
                ungrouped.presets.push(preset);
                continue;
            };
            groups
                .entry(title.to_lowercase())
                .or_insert_with(|| PresetGroup {
                    title: Some(title),
                    presets: Vec::new(),
                })
                .presets
                .push(preset);
        }

        let mut out = Vec::with_capacity(groups.len() + 1);
        if !ungrouped.presets.is_empty() {
            out.push(ungrouped);
        }
        out.extend(groups.into_values());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset(id: &str, group: Option<&str>) -> Preset {
        Preset {
            id: PresetId::from(id),
            title: format!("Preset {id}"),
            group: group.map(str::to_owned),
            active: false,
            preview: false,
            program: false,
            destinations: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    fn snapshot(presets: Vec<Preset>) -> Snapshot {
        Snapshot {
            sequence: 1,
            presets: presets.into_iter().map(|p| (p.id.clone(), p)).collect(),
            safe: true,
        }
    }

    #[test]
    fn empty_snapshot_is_unsafe_at_zero() {
        let s = Snapshot::empty();
        assert_eq!(s.sequence, 0);
        assert!(s.presets.is_empty());
        assert!(!s.safe);
    }

    #[test]
    fn groups_put_ungrouped_first_and_merge_case() {
        let s = snapshot(vec![
            preset("1", Some("Cameras")),
            preset("2", None),
            preset("3", Some("cameras")),
            preset("4", Some("Slides")),
        ]);

        let groups = s.groups();
        let titles: Vec<&str> = groups.iter().map(PresetGroup::display_title).collect();
        assert_eq!(titles, ["Ungrouped", "Cameras", "Slides"]);

        let cameras: Vec<&str> = groups[1].presets.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(cameras, ["1", "3"]);
    }

    #[test]
    fn groups_sort_by_title_not_by_first_member() {
        let s = snapshot(vec![
            preset("1", Some("Zebra")),
            preset("2", Some("apple")),
            preset("3", Some("Mango")),
        ]);

        let groups = s.groups();
        let titles: Vec<&str> = groups.iter().map(PresetGroup::display_title).collect();
        assert_eq!(titles, ["apple", "Mango", "Zebra"]);
    }

    #[test]
    fn groups_skip_empty_ungrouped() {
        let s = snapshot(vec![preset("1", Some("A"))]);
        let groups = s.groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].title, Some("A"));
    }

    #[test]
    fn active_finds_marked_preset() {
        let mut p = preset("2", None);
        p.active = true;
        let s = snapshot(vec![preset("1", None), p]);
        assert_eq!(s.active().map(|p| p.id.as_str()), Some("2"));
    }
}
