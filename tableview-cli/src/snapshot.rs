//! Loading rows from JSON.

use std::path::Path;

use anyhow::Context;
use anyhow::bail;
use serde_json::Value;
use tableview_lib::model::CellValue;
use tableview_lib::model::Row;

/// Read a row snapshot file.
pub fn load_rows(path: &Path) -> anyhow::Result<Vec<Row>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_rows(&json).with_context(|| format!("Invalid rows in {}", path.display()))
}

/// Parse a JSON array of flat objects. `id` becomes the row ID; every
/// other key becomes an attribute.
pub fn parse_rows(json: &str) -> anyhow::Result<Vec<Row>> {
    let Value::Array(items) = serde_json::from_str(json)? else {
        bail!("expected a JSON array of rows");
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let Value::Object(fields) = item else {
                bail!("row {index} is not an object");
            };
            let id = match fields.get("id") {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => bail!("row {index} has no id"),
            };
            let mut row = Row::new(id);
            for (key, value) in fields {
                if key != "id" {
                    row.attributes.insert(key, cell(value));
                }
            }
            Ok(row)
        })
        .collect()
}

/// Column keys in first-seen order across all rows.
pub fn column_keys(rows: &[Row]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for row in rows {
        for key in row.attributes.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }
    keys
}

fn cell(value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Bool(b) => CellValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => CellValue::Int(i),
            None => n.as_f64().map(CellValue::Float).unwrap_or(CellValue::Null),
        },
        Value::String(s) => CellValue::Text(s),
        nested => CellValue::Text(nested.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows() {
        let rows = parse_rows(
            r#"[
                {"id": 1, "name": "Ada", "age": 36, "active": true},
                {"id": "b-2", "name": "Bob", "score": 2.5, "tags": ["x"]}
            ]"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "1");
        assert_eq!(rows[0].get("age"), Some(&CellValue::Int(36)));
        assert!(rows[0].flag("active"));
        assert_eq!(rows[1].id, "b-2");
        assert_eq!(rows[1].get("score"), Some(&CellValue::Float(2.5)));
        assert_eq!(rows[1].text("tags"), r#"["x"]"#);
    }

    #[test]
    fn test_rows_need_ids() {
        assert!(parse_rows(r#"[{"name": "Ada"}]"#).is_err());
        assert!(parse_rows(r#"{"id": 1}"#).is_err());
        assert!(parse_rows(r#"[3]"#).is_err());
    }

    #[test]
    fn test_load_rows_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, r#"[{"id": 1, "name": "Ada"}]"#).unwrap();
        assert_eq!(load_rows(&path).unwrap().len(), 1);

        let missing = dir.path().join("missing.json");
        let err = load_rows(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_column_keys() {
        let rows = vec![
            Row::new("1").set("name", "Ada"),
            Row::new("2").set("age", 3).set("name", "Bob"),
        ];
        assert_eq!(column_keys(&rows), vec!["name", "age"]);
    }
}
