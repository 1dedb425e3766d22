//! Field subsetting for the filter-fields query parameter.
//!
//! Fields are top-level keys of a transformed item. Dot paths
//! (`author.name`) select keys inside nested objects; arrays are filtered
//! element by element.

use serde_json::{Map, Value};

/// Keeps only the requested fields of `item`.
///
/// An empty field list keeps everything. Non-object values are returned
/// unchanged.
pub fn apply_fields(item: &Value, fields: &[&str]) -> Value {
    if fields.is_empty() {
        return item.clone();
    }
    select(item, fields)
}

fn select(value: &Value, paths: &[&str]) -> Value {
    match value {
        Value::Object(obj) => {
            let mut result = Map::new();

            for (key, child) in obj {
                let mut selected = false;
                let mut nested: Vec<&str> = Vec::new();

                for path in paths {
                    if *path == key {
                        selected = true;
                    } else if let Some(rest) = strip_segment(path, key) {
                        nested.push(rest);
                    }
                }

                if selected {
                    result.insert(key.clone(), child.clone());
                } else if !nested.is_empty() {
                    result.insert(key.clone(), select(child, &nested));
                }
            }

            Value::Object(result)
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| select(v, paths)).collect()),
        _ => value.clone(),
    }
}

/// Returns the remainder of `path` when it starts with `key.`.
fn strip_segment<'a>(path: &'a str, key: &str) -> Option<&'a str> {
    path.strip_prefix(key)?.strip_prefix('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_fields_keeps_everything() {
        let item = json!({"id": 1, "name": "Ada"});
        assert_eq!(apply_fields(&item, &[]), item);
    }

    #[test]
    fn test_top_level_fields() {
        let item = json!({"id": 1, "name": "Ada", "born": 1815});
        let result = apply_fields(&item, &["id", "name"]);
        assert_eq!(result, json!({"id": 1, "name": "Ada"}));
    }

    #[test]
    fn test_nested_path() {
        let item = json!({
            "id": 1,
            "publisher": {"name": "Penguin", "city": "London"}
        });
        let result = apply_fields(&item, &["publisher.name"]);
        assert_eq!(result, json!({"publisher": {"name": "Penguin"}}));
    }

    #[test]
    fn test_nested_path_through_array() {
        let item = json!({
            "books": [
                {"title": "Notes", "year": 1843},
                {"title": "Sketch", "year": 1842}
            ]
        });
        let result = apply_fields(&item, &["books.title"]);
        assert_eq!(
            result,
            json!({"books": [{"title": "Notes"}, {"title": "Sketch"}]})
        );
    }

    #[test]
    fn test_whole_field_beats_nested_path() {
        let item = json!({"publisher": {"name": "Penguin", "city": "London"}});
        let result = apply_fields(&item, &["publisher.name", "publisher"]);
        assert_eq!(result, item);
    }

    #[test]
    fn test_prefix_is_not_a_segment() {
        let item = json!({"name": "Ada", "names": ["A"]});
        let result = apply_fields(&item, &["name"]);
        assert_eq!(result, json!({"name": "Ada"}));
    }

    #[test]
    fn test_scalar_unchanged() {
        assert_eq!(apply_fields(&json!(42), &["id"]), json!(42));
    }
}
