use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column-major header plus row-major cells for one tabular result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of the named column, `Null` where a row is short.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.columns.iter().position(|column| column == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).unwrap_or(&Value::Null))
                .collect(),
        )
    }

    /// Builds a table from row objects, keeping `columns` order. Keys missing
    /// from a row become `Null`; keys not listed in `columns` are dropped.
    pub fn from_records(columns: Vec<String>, records: Vec<Map<String, Value>>) -> Self {
        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|column| record.remove(column).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    /// Parses an inline snapshot shaped as `{"columns": [...], "rows": [...]}`
    /// (`data` is accepted for `rows`). Rows may be arrays or objects.
    pub fn from_inline(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let columns: Vec<String> = object
            .get("columns")?
            .as_array()?
            .iter()
            .map(|column| match column {
                Value::String(name) => name.clone(),
                other => other.to_string(),
            })
            .collect();
        let raw_rows = object
            .get("rows")
            .or_else(|| object.get("data"))
            .and_then(Value::as_array)?;

        let rows = raw_rows
            .iter()
            .map(|row| match row {
                Value::Array(cells) => cells.clone(),
                Value::Object(record) => columns
                    .iter()
                    .map(|column| record.get(column).cloned().unwrap_or(Value::Null))
                    .collect(),
                scalar => vec![scalar.clone()],
            })
            .collect();

        Some(Self { columns, rows })
    }
}
