use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::table::Table;

/// Canonical block kind after surface-spelling normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Text,
    Table,
    Graph,
    Debug,
    Info,
    Warning,
    Error,
    Exception,
    Code,
    Unknown,
}

impl BlockKind {
    /// Maps every known wire spelling to its kind. Unrecognized tags are
    /// `Unknown`, never an error.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "TextElement" | "text" => Self::Text,
            "DfElement" | "df" => Self::Table,
            "GraphElement" | "graph" => Self::Graph,
            "DebugLine" => Self::Debug,
            "InfoLine" => Self::Info,
            "WarningLine" => Self::Warning,
            "ErrorLine" => Self::Error,
            "ExceptionElement" | "exception" | "error" => Self::Exception,
            "CodeElement" | "code" => Self::Code,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Table => "table",
            Self::Graph => "graph",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Exception => "exception",
            Self::Code => "code",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Self::Debug | Self::Info | Self::Warning | Self::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl DiagnosticLevel {
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Debug => BlockKind::Debug,
            Self::Info => BlockKind::Info,
            Self::Warning => BlockKind::Warning,
            Self::Error => BlockKind::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub id: Option<String>,
    pub text: String,
}

/// Tabular result. `inline` is whatever snapshot the stream carried;
/// `materialized` is filled at most once by out-of-band hydration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBlock {
    pub id: Option<String>,
    /// Explicit dataframe reference (`df_id`, `block_id` or `id_ref`).
    pub reference: Option<String>,
    pub inline: Option<Table>,
    pub metadata: Option<Value>,
    pub materialized: Option<Table>,
}

impl TableBlock {
    /// Identifier used to fetch the full table: the explicit reference when
    /// present, otherwise the block id.
    pub fn fetch_key(&self) -> Option<&str> {
        self.reference.as_deref().or(self.id.as_deref())
    }

    /// Best available table: materialized first, then the inline snapshot.
    pub fn table(&self) -> Option<&Table> {
        self.materialized.as_ref().or(self.inline.as_ref())
    }

    pub fn is_hydrated(&self) -> bool {
        self.materialized.is_some()
    }

    /// Shape advertised in `metadata.shape`, if the server sent one.
    pub fn advertised_shape(&self) -> Option<(u64, u64)> {
        let shape = self.metadata.as_ref()?.get("shape")?.as_array()?;
        match shape.as_slice() {
            [rows, columns] => Some((rows.as_u64()?, columns.as_u64()?)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphBlock {
    pub id: Option<String>,
    pub dataset_id: Option<String>,
    pub raw: Value,
}

impl GraphBlock {
    /// Link to the hosted graph viewer for this dataset.
    pub fn graph_url(&self, server: &str) -> Option<String> {
        let dataset_id = self.dataset_id.as_deref()?;
        Some(format!(
            "{}/graph/graph.html?dataset={dataset_id}",
            server.trim_end_matches('/')
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticLine {
    pub id: Option<String>,
    pub level: DiagnosticLevel,
    pub text: String,
}

/// Server-reported failure carried as data inside a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionBlock {
    pub id: Option<String>,
    pub message: String,
    pub error_type: Option<String>,
    pub traceback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub id: Option<String>,
    pub code: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownBlock {
    pub id: Option<String>,
    /// Raw discriminator as received (empty when absent).
    pub tag: String,
    pub text: String,
    pub raw: Value,
}

/// One typed unit of content within a turn. Only [`crate::classify`] builds
/// these from wire records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Text(TextBlock),
    Table(TableBlock),
    Graph(GraphBlock),
    Diagnostic(DiagnosticLine),
    Exception(ExceptionBlock),
    Code(CodeBlock),
    Unknown(UnknownBlock),
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Text(_) => BlockKind::Text,
            Self::Table(_) => BlockKind::Table,
            Self::Graph(_) => BlockKind::Graph,
            Self::Diagnostic(line) => line.level.kind(),
            Self::Exception(_) => BlockKind::Exception,
            Self::Code(_) => BlockKind::Code,
            Self::Unknown(_) => BlockKind::Unknown,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Text(block) => block.id.as_deref(),
            Self::Table(block) => block.id.as_deref(),
            Self::Graph(block) => block.id.as_deref(),
            Self::Diagnostic(block) => block.id.as_deref(),
            Self::Exception(block) => block.id.as_deref(),
            Self::Code(block) => block.id.as_deref(),
            Self::Unknown(block) => block.id.as_deref(),
        }
    }

    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Self::Text(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableBlock> {
        match self {
            Self::Table(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut TableBlock> {
        match self {
            Self::Table(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_graph(&self) -> Option<&GraphBlock> {
        match self {
            Self::Graph(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_diagnostic(&self) -> Option<&DiagnosticLine> {
        match self {
            Self::Diagnostic(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_exception(&self) -> Option<&ExceptionBlock> {
        match self {
            Self::Exception(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_code(&self) -> Option<&CodeBlock> {
        match self {
            Self::Code(block) => Some(block),
            _ => None,
        }
    }
}
