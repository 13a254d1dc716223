// ── Preset domain types ──

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque preset identifier as used by the server.
///
/// E2 presets come in two index forms: legacy `"N"` and ordered
/// `"MAJOR.MINOR"`. Ordering follows the switcher: legacy presets sort as
/// `(0, N)`, ordered ones as `(MAJOR, MINOR)`, numerically. Anything that
/// is not numeric sorts after all numeric ids, lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetId(String);

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey<'a> {
    Numeric(u64, u64),
    Other(&'a str),
}

impl PresetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `(major, minor)` index, if this id is in one of the E2 numeric forms.
    pub fn index(&self) -> Option<(u64, u64)> {
        match self.0.split_once('.') {
            Some((major, minor)) => Some((major.parse().ok()?, minor.parse().ok()?)),
            None => Some((0, self.0.parse().ok()?)),
        }
    }

    fn sort_key(&self) -> SortKey<'_> {
        match self.index() {
            Some((major, minor)) => SortKey::Numeric(major, minor),
            None => SortKey::Other(&self.0),
        }
    }
}

impl Ord for PresetId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for PresetId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PresetId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PresetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A named, pre-configured target state of the switcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: PresetId,
    pub title: String,
    pub group: Option<String>,
    /// Currently selected preset (the one a transition would take).
    pub active: bool,
    pub preview: bool,
    pub program: bool,
    pub destinations: Vec<String>,
    /// Server fields not modelled above, passed through for rendering.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Preset {
    /// Group title for display; presets without a group are "Ungrouped".
    pub fn group_title(&self) -> &str {
        self.group.as_deref().unwrap_or(UNGROUPED)
    }
}

pub(crate) const UNGROUPED: &str = "Ungrouped";

/// Presets sharing a group, in id order.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetGroup<'a> {
    /// `None` for the ungrouped presets.
    pub title: Option<&'a str>,
    pub presets: Vec<&'a Preset>,
}

impl PresetGroup<'_> {
    pub fn display_title(&self) -> &str {
        self.title.unwrap_or(UNGROUPED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_parses_both_forms() {
        assert_eq!(PresetId::from("7").index(), Some((0, 7)));
        assert_eq!(PresetId::from("2.13").index(), Some((2, 13)));
        assert_eq!(PresetId::from("wide").index(), None);
        assert_eq!(PresetId::from("1.x").index(), None);
    }

    #[test]
    fn ordering_is_numeric_not_lexicographic() {
        let mut ids: Vec<PresetId> = ["10", "2", "1.10", "1.2", "wide", "A"]
            .into_iter()
            .map(PresetId::from)
            .collect();
        ids.sort();

        let sorted: Vec<&str> = ids.iter().map(PresetId::as_str).collect();
        assert_eq!(sorted, ["2", "10", "1.2", "1.10", "A", "wide"]);
    }

    #[test]
    fn equal_index_different_text_stays_distinct() {
        let a = PresetId::from("01");
        let b = PresetId::from("1");
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }
}
