use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single cell as read from a source table. `None` is an absent/null cell.
pub type Cell = Option<String>;

/// A named grid of untyped cells. Row order defines row numbers (1-based).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Named tables in source order (e.g. the sheets of a workbook).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSet {
    tables: Vec<Table>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, table: Table) {
        self.tables.push(table);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl From<Vec<Table>> for TableSet {
    fn from(tables: Vec<Table>) -> Self {
        Self { tables }
    }
}

impl FromIterator<Table> for TableSet {
    fn from_iter<I: IntoIterator<Item = Table>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}

/// Pre-loaded inputs for one reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    /// Raw scanner readings, one per line, unfiltered.
    pub scanned: Vec<String>,
    pub registry: Table,
    pub on_hand: TableSet,
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// A tag that satisfied the grammar, in canonical uppercase form.
///
/// Only [`crate::matcher::TagGrammar::parse`] creates these, so holding a
/// `TagId` means the value was fully matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TagId(String);

impl TagId {
    pub(crate) fn new_unchecked(canonical: String) -> Self {
        Self(canonical)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TagId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub type TagSet = BTreeSet<TagId>;

// ---------------------------------------------------------------------------
// Exceptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionReason {
    /// More than one tag on the row.
    Ambiguous,
    /// Non-blank row without any tag.
    Empty,
    /// Tag already claimed by an earlier registry row.
    Duplicate,
}

impl fmt::Display for ExceptionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ambiguous => write!(f, "ambiguous"),
            Self::Empty => write!(f, "empty"),
            Self::Duplicate => write!(f, "duplicate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionContent {
    /// Non-blank cells of the row, trimmed, in column order.
    Cells(Vec<String>),
    /// Non-blank cells joined into one string, plus the row's width.
    Joined { text: String, column_count: usize },
}

/// A source row that could not be cleanly classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// 1-based position of the row in its source table.
    pub row: usize,
    pub reason: ExceptionReason,
    pub content: ExceptionContent,
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub registry: TagSet,
    pub scanned: TagSet,
    pub on_hand: TagSet,
    /// On-hand tags that are also in the registry.
    pub on_hand_real: TagSet,
    pub missing: TagSet,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingItem {
    pub tag: TagId,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub registry_rows: usize,
    pub registry_valid: usize,
    pub scanned: usize,
    pub on_hand_total: usize,
    pub on_hand_real: usize,
    pub missing: usize,
}

impl ReconSummary {
    /// Counters with display labels, in report order.
    pub fn rows(&self) -> [(&'static str, usize); 6] {
        [
            ("Registry rows", self.registry_rows),
            ("Registry tags (valid)", self.registry_valid),
            ("Scanned", self.scanned),
            ("On hand (total)", self.on_hand_total),
            ("On hand (in registry)", self.on_hand_real),
            ("Missing", self.missing),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub missing: Vec<MissingItem>,
    pub registry_exceptions: Vec<ExceptionRow>,
    pub on_hand_exceptions: Vec<ExceptionRow>,
}
