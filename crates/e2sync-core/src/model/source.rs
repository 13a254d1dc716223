use serde::Serialize;
use serde_json::Value;

/// One entry of the server's auxiliary sources listing.
///
/// Source objects carry no fixed schema; the commonly present `index` and
/// `title` fields are lifted out and the rest is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Source {
    pub index: Option<i64>,
    pub title: Option<String>,
    pub raw: Value,
}

impl From<Value> for Source {
    fn from(raw: Value) -> Self {
        let index = raw
            .get("index")
            .or_else(|| raw.get("id"))
            .and_then(Value::as_i64);
        let title = raw
            .get("title")
            .or_else(|| raw.get("name"))
            .and_then(Value::as_str)
            .map(str::to_owned);
        Self { index, title, raw }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceListing {
    pub safe: bool,
    pub sources: Vec<Source>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lifts_known_fields() {
        let s = Source::from(json!({ "index": 3, "title": "Laptop", "type": "input" }));
        assert_eq!(s.index, Some(3));
        assert_eq!(s.title.as_deref(), Some("Laptop"));
        assert_eq!(s.raw["type"], "input");
    }

    #[test]
    fn falls_back_to_id_and_name() {
        let s = Source::from(json!({ "id": 7, "name": "Cam" }));
        assert_eq!(s.index, Some(7));
        assert_eq!(s.title.as_deref(), Some("Cam"));
    }
}
