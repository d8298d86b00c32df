use serde_json::Value;

/// Maximum nesting depth accepted when converting untrusted documents.
pub const MAX_NESTING_DEPTH: usize = 8;

/// A loosely-typed field value as produced by a format parser.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    List(Vec<String>),
    Nested(Vec<(String, RawValue)>),
}

impl RawValue {
    fn from_json(value: &Value, depth: usize) -> Option<RawValue> {
        if depth > MAX_NESTING_DEPTH {
            return None;
        }
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(RawValue::Text(b.to_string())),
            Value::Number(n) => Some(RawValue::Text(n.to_string())),
            Value::String(s) => Some(RawValue::Text(s.clone())),
            Value::Array(items) => {
                // Arrays of scalars become a string list; arrays holding
                // objects are flattened into nested entries.
                if items.iter().any(|item| item.is_object() || item.is_array()) {
                    let mut nested = Vec::new();
                    for (index, item) in items.iter().enumerate() {
                        if let Some(raw) = RawValue::from_json(item, depth + 1) {
                            nested.push((index.to_string(), raw));
                        }
                    }
                    Some(RawValue::Nested(nested))
                } else {
                    let list: Vec<String> = items
                        .iter()
                        .filter_map(|item| match item {
                            Value::String(s) => Some(s.clone()),
                            Value::Number(n) => Some(n.to_string()),
                            Value::Bool(b) => Some(b.to_string()),
                            _ => None,
                        })
                        .collect();
                    Some(RawValue::List(list))
                }
            }
            Value::Object(map) => {
                let mut nested = Vec::new();
                for (key, item) in map {
                    if let Some(raw) = RawValue::from_json(item, depth + 1) {
                        nested.push((key.clone(), raw));
                    }
                }
                Some(RawValue::Nested(nested))
            }
        }
    }

    fn to_json(&self) -> Value {
        match self {
            RawValue::Text(s) => Value::String(s.clone()),
            RawValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            RawValue::Nested(entries) => {
                let mut map = serde_json::Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json());
                }
                Value::Object(map)
            }
        }
    }

    /// Visit every string held anywhere inside this value, depth-bounded.
    fn visit_strings<'a>(&'a self, depth: usize, visit: &mut dyn FnMut(&'a str)) {
        if depth > MAX_NESTING_DEPTH {
            return;
        }
        match self {
            RawValue::Text(s) => visit(s),
            RawValue::List(items) => {
                for item in items {
                    visit(item);
                }
            }
            RawValue::Nested(entries) => {
                for (_, value) in entries {
                    value.visit_strings(depth + 1, visit);
                }
            }
        }
    }
}

/// An unvalidated, insertion-ordered field bag produced by one format parser.
///
/// Keys are stored under their normalized spelling (lowercased, trimmed,
/// whitespace and dashes collapsed to underscores) so alias lookups are
/// spelling-insensitive.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    fields: Vec<(String, RawValue)>,
}

pub fn normalize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
        .collect()
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from one JSON object, bounding nesting depth.
    pub fn from_json_object(map: &serde_json::Map<String, Value>) -> Self {
        let mut record = RawRecord::new();
        for (key, value) in map {
            if let Some(raw) = RawValue::from_json(value, 0) {
                record.set(key, raw);
            }
        }
        record
    }

    /// Set a field, replacing an existing value in place to preserve order.
    pub fn set(&mut self, key: &str, value: RawValue) {
        let normalized = normalize_key(key);
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == normalized) {
            slot.1 = value;
        } else {
            self.fields.push((normalized, value));
        }
    }

    pub fn set_text(&mut self, key: &str, value: impl Into<String>) {
        self.set(key, RawValue::Text(value.into()));
    }

    pub fn set_list(&mut self, key: &str, values: Vec<String>) {
        self.set(key, RawValue::List(values));
    }

    /// Append an item to a list field, creating the list if needed and
    /// promoting an existing text value to a list.
    pub fn push_list_item(&mut self, key: &str, item: impl Into<String>) {
        let normalized = normalize_key(key);
        let item = item.into();
        match self.fields.iter_mut().find(|(k, _)| *k == normalized) {
            Some((_, RawValue::List(items))) => items.push(item),
            Some(slot) => {
                let existing = match &slot.1 {
                    RawValue::Text(s) => vec![s.clone(), item],
                    _ => vec![item],
                };
                slot.1 = RawValue::List(existing);
            }
            None => self.fields.push((normalized, RawValue::List(vec![item]))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        let normalized = normalize_key(key);
        self.fields
            .iter()
            .find(|(k, _)| *k == normalized)
            .map(|(_, v)| v)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(RawValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.get(key) {
            Some(RawValue::List(items)) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// First value present under any of the given alias keys.
    pub fn first_matching(&self, aliases: &[&str]) -> Option<&RawValue> {
        aliases.iter().find_map(|alias| self.get(alias))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Serialize the whole record back to JSON (field order is kept by
    /// serde_json's preserve_order feature being irrelevant here: callers only
    /// use this for metadata snapshots and link scanning).
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.to_json());
        }
        Value::Object(map)
    }

    /// Drop duplicate items from every list field, keeping first occurrences.
    pub fn dedup_lists(&mut self) {
        for (_, value) in self.fields.iter_mut() {
            if let RawValue::List(items) = value {
                let mut deduped: Vec<String> = Vec::new();
                for item in items.iter() {
                    if !deduped.contains(item) {
                        deduped.push(item.clone());
                    }
                }
                *items = deduped;
            }
        }
    }

    /// Collect every string value reachable in the record, in field order,
    /// bounded by [`MAX_NESTING_DEPTH`].
    pub fn collect_strings(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for (_, value) in &self.fields {
            value.visit_strings(0, &mut |s| out.push(s));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalization() {
        let mut record = RawRecord::new();
        record.set_text("Course Name", "Rust Basics");
        assert_eq!(record.text("course_name"), Some("Rust Basics"));
        assert_eq!(record.text("COURSE-NAME"), Some("Rust Basics"));
    }

    #[test]
    fn test_push_list_item_promotes_text() {
        let mut record = RawRecord::new();
        record.set_text("links", "https://a.example");
        record.push_list_item("links", "https://b.example");
        assert_eq!(
            record.list("links"),
            Some(&["https://a.example".to_string(), "https://b.example".to_string()][..])
        );
    }

    #[test]
    fn test_from_json_object_bounds_depth() {
        let mut value = serde_json::json!("leaf");
        for _ in 0..(MAX_NESTING_DEPTH + 4) {
            value = serde_json::json!({ "inner": value });
        }
        let map = value.as_object().unwrap();
        let record = RawRecord::from_json_object(map);
        // The over-deep tail is dropped instead of recursing forever.
        assert!(record.collect_strings().is_empty());
    }

    #[test]
    fn test_collect_strings_walks_nested_values() {
        let map = serde_json::json!({
            "topic": "Week 1",
            "resources": ["https://youtu.be/abc", "notes"],
            "extra": { "deep": { "link": "https://example.com/file.pdf" } }
        });
        let record = RawRecord::from_json_object(map.as_object().unwrap());
        let strings = record.collect_strings();
        assert!(strings.contains(&"https://youtu.be/abc"));
        assert!(strings.contains(&"https://example.com/file.pdf"));
    }
}
