use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One sample record: column name to scalar (or `null`), in column order.
pub type DataRow = serde_json::Map<String, serde_json::Value>;

/// Auxiliary tabular data attached to a reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDataset {
    /// Column names, most relevant first.
    pub columns: Vec<String>,
    /// Sample rows.
    #[serde(rename = "data_summary", default)]
    pub rows: Vec<DataRow>,
}

/// Datasets keyed by name. Replaced wholesale on every reply.
pub type SourceData = BTreeMap<String, SourceDataset>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rows_use_data_summary_on_the_wire() {
        let raw = r#"{
            "columns": ["age", "region"],
            "data_summary": [{"region": "north", "age": 31}, {"region": null, "age": 40}]
        }"#;
        let ds: SourceDataset = serde_json::from_str(raw).unwrap();
        assert_eq!(ds.columns, vec!["age", "region"]);
        assert_eq!(ds.rows.len(), 2);
        assert!(ds.rows[1]["region"].is_null());

        // row keys keep their original order
        let keys: Vec<&String> = ds.rows[0].keys().collect();
        assert_eq!(keys, ["region", "age"]);

        let back = serde_json::to_value(&ds).unwrap();
        assert!(back.get("data_summary").is_some());
    }
}
