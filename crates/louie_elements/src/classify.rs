use serde_json::Value;

use crate::block::{
    Block, BlockKind, CodeBlock, DiagnosticLevel, DiagnosticLine, ExceptionBlock, GraphBlock,
    TableBlock, TextBlock, UnknownBlock,
};
use crate::table::Table;

const TABLE_REFERENCE_FIELDS: [&str; 3] = ["df_id", "block_id", "id_ref"];
const DEFAULT_EXCEPTION_MESSAGE: &str = "Unknown error";

/// Classifies one raw payload record into exactly one [`Block`].
pub fn classify(record: &Value) -> Block {
    let tag = discriminator(record).unwrap_or("");
    let id = string_field(record, "id");

    match BlockKind::from_tag(tag) {
        BlockKind::Text => Block::Text(TextBlock {
            id,
            text: display_text(record),
        }),
        BlockKind::Table => Block::Table(table_block(record, id)),
        BlockKind::Graph => Block::Graph(GraphBlock {
            dataset_id: graph_dataset_id(record),
            id,
            raw: record.clone(),
        }),
        BlockKind::Debug => diagnostic(record, id, DiagnosticLevel::Debug),
        BlockKind::Info => diagnostic(record, id, DiagnosticLevel::Info),
        BlockKind::Warning => diagnostic(record, id, DiagnosticLevel::Warning),
        BlockKind::Error => diagnostic(record, id, DiagnosticLevel::Error),
        BlockKind::Exception => Block::Exception(ExceptionBlock {
            id,
            message: string_field(record, "message")
                .unwrap_or_else(|| DEFAULT_EXCEPTION_MESSAGE.to_owned()),
            error_type: string_field(record, "error_type"),
            traceback: string_field(record, "traceback"),
        }),
        BlockKind::Code => Block::Code(CodeBlock {
            id,
            code: string_field(record, "code")
                .or_else(|| string_field(record, "text"))
                .unwrap_or_default(),
            language: string_field(record, "language"),
        }),
        BlockKind::Unknown => Block::Unknown(UnknownBlock {
            id,
            tag: tag.to_owned(),
            text: display_text(record),
            raw: record.clone(),
        }),
    }
}

/// Classifies records in order.
pub fn classify_all<'a>(records: impl IntoIterator<Item = &'a Value>) -> Vec<Block> {
    records.into_iter().map(classify).collect()
}

/// Best-effort display string: first non-empty of `text`, `content`, `value`.
/// A non-string `value` is rendered as compact JSON.
pub fn display_text(record: &Value) -> String {
    for key in ["text", "content"] {
        if let Some(text) = non_empty_str(record, key) {
            return text.to_owned();
        }
    }

    match record.get("value") {
        Some(Value::String(text)) if !text.is_empty() => text.clone(),
        Some(Value::Null) | Some(Value::String(_)) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn discriminator(record: &Value) -> Option<&str> {
    record
        .get("type")
        .and_then(Value::as_str)
        .or_else(|| record.get("kind").and_then(Value::as_str))
}

fn table_block(record: &Value, id: Option<String>) -> TableBlock {
    let reference = TABLE_REFERENCE_FIELDS
        .iter()
        .find_map(|key| string_field(record, key));
    let inline = record
        .get("table")
        .and_then(Table::from_inline)
        .or_else(|| Table::from_inline(record));

    TableBlock {
        id,
        reference,
        inline,
        metadata: record.get("metadata").filter(|value| !value.is_null()).cloned(),
        materialized: None,
    }
}

fn graph_dataset_id(record: &Value) -> Option<String> {
    record
        .get("value")
        .and_then(|value| non_empty_str(value, "dataset_id"))
        .or_else(|| non_empty_str(record, "dataset_id"))
        .or_else(|| non_empty_str(record, "id"))
        .map(ToOwned::to_owned)
}

fn diagnostic(record: &Value, id: Option<String>, level: DiagnosticLevel) -> Block {
    Block::Diagnostic(DiagnosticLine {
        id,
        level,
        text: display_text(record),
    })
}

fn string_field(record: &Value, key: &str) -> Option<String> {
    non_empty_str(record, key).map(ToOwned::to_owned)
}

fn non_empty_str<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{classify, display_text};
    use crate::block::{Block, BlockKind};

    #[test]
    fn kind_field_is_used_when_type_is_missing() {
        let block = classify(&json!({"id": "a", "kind": "text", "text": "hi"}));
        assert_eq!(block.kind(), BlockKind::Text);
    }

    #[test]
    fn display_text_skips_empty_candidates() {
        assert_eq!(
            display_text(&json!({"text": "", "content": "body"})),
            "body"
        );
        assert_eq!(display_text(&json!({"value": {"n": 1}})), r#"{"n":1}"#);
        assert_eq!(display_text(&json!({"other": 1})), "");
    }

    #[test]
    fn graph_dataset_falls_back_to_block_id() {
        let nested = classify(&json!({"type": "graph", "id": "g1", "value": {"dataset_id": "ds"}}));
        let flat = classify(&json!({"type": "GraphElement", "id": "g2"}));

        assert_eq!(
            nested.as_graph().and_then(|graph| graph.dataset_id.as_deref()),
            Some("ds")
        );
        assert_eq!(
            flat.as_graph().and_then(|graph| graph.dataset_id.as_deref()),
            Some("g2")
        );
    }

    #[test]
    fn exception_message_defaults_when_missing() {
        let block = classify(&json!({"type": "ExceptionElement", "id": "e"}));
        let Block::Exception(exception) = block else {
            panic!("expected exception block");
        };
        assert_eq!(exception.message, "Unknown error");
    }
}
