use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tracing::debug;

use crate::classify::{classify_row, non_blank_cells, RowOutcome, DESCRIPTION_SEPARATOR};
use crate::config::{DuplicatePolicy, OnHandAmbiguity};
use crate::matcher::TagGrammar;
use crate::model::{ExceptionContent, ExceptionReason, ExceptionRow, Table, TableSet, TagId, TagSet};

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct RegistryExtract {
    /// Tag -> description for every accepted row.
    pub entries: BTreeMap<TagId, String>,
    /// Ambiguous rows, then empty rows, then rejected duplicates; each in row order.
    pub exceptions: Vec<ExceptionRow>,
    /// Rows in the source table, blank ones included.
    pub total_rows: usize,
}

/// Build the tag -> description map from a registry table.
pub fn extract_registry(grammar: &TagGrammar, table: &Table, policy: DuplicatePolicy) -> RegistryExtract {
    let mut entries: BTreeMap<TagId, String> = BTreeMap::new();
    let mut ambiguous = Vec::new();
    let mut empty = Vec::new();
    let mut duplicates = Vec::new();

    for (idx, row) in table.rows.iter().enumerate() {
        let row_number = idx + 1;
        match classify_row(grammar, row) {
            RowOutcome::Ignored => {}
            RowOutcome::Valid { tag, description } => match entries.entry(tag) {
                Entry::Vacant(slot) => {
                    slot.insert(description);
                }
                Entry::Occupied(mut slot) => match policy {
                    DuplicatePolicy::Overwrite => {
                        slot.insert(description);
                    }
                    DuplicatePolicy::FirstWins => {}
                    DuplicatePolicy::Reject => {
                        duplicates.push(registry_exception(row_number, ExceptionReason::Duplicate, cells_of(row)));
                    }
                },
            },
            RowOutcome::Ambiguous { cells, .. } => {
                ambiguous.push(registry_exception(row_number, ExceptionReason::Ambiguous, cells));
            }
            RowOutcome::Empty { cells } => {
                empty.push(registry_exception(row_number, ExceptionReason::Empty, cells));
            }
        }
    }

    debug!(
        rows = table.len(),
        tags = entries.len(),
        ambiguous = ambiguous.len(),
        empty = empty.len(),
        duplicates = duplicates.len(),
        "registry extracted"
    );

    let mut exceptions = ambiguous;
    exceptions.append(&mut empty);
    exceptions.append(&mut duplicates);

    RegistryExtract {
        entries,
        exceptions,
        total_rows: table.len(),
    }
}

fn registry_exception(row: usize, reason: ExceptionReason, cells: Vec<String>) -> ExceptionRow {
    ExceptionRow {
        table: None,
        row,
        reason,
        content: ExceptionContent::Cells(cells),
    }
}

fn cells_of(row: &[Option<String>]) -> Vec<String> {
    non_blank_cells(row).into_iter().map(str::to_string).collect()
}

// ---------------------------------------------------------------------------
// On hand
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct OnHandExtract {
    pub tags: TagSet,
    /// Tagged with the source table name, in table then row order.
    pub exceptions: Vec<ExceptionRow>,
}

/// Collect every on-hand tag across all tables.
///
/// Rows with several tags contribute all of them under
/// [`OnHandAmbiguity::Include`]; under `Exclude` they contribute none and are
/// reported instead. Rows with content but no tag are always reported.
pub fn extract_on_hand(grammar: &TagGrammar, tables: &TableSet, ambiguity: OnHandAmbiguity) -> OnHandExtract {
    let mut tags = TagSet::new();
    let mut exceptions = Vec::new();

    for table in tables.iter() {
        let before = tags.len();
        for (idx, row) in table.rows.iter().enumerate() {
            let outcome = classify_row(grammar, row);
            let reason = match &outcome {
                RowOutcome::Ignored => continue,
                RowOutcome::Valid { tag, .. } => {
                    tags.insert(tag.clone());
                    continue;
                }
                RowOutcome::Ambiguous { tags: found, .. } if ambiguity == OnHandAmbiguity::Include => {
                    tags.extend(found.iter().cloned());
                    continue;
                }
                RowOutcome::Ambiguous { .. } => ExceptionReason::Ambiguous,
                RowOutcome::Empty { .. } => ExceptionReason::Empty,
            };

            exceptions.push(ExceptionRow {
                table: Some(table.name.clone()),
                row: idx + 1,
                reason,
                content: ExceptionContent::Joined {
                    text: non_blank_cells(row).join(DESCRIPTION_SEPARATOR),
                    column_count: row.len(),
                },
            });
        }
        debug!(table = %table.name, rows = table.len(), new_tags = tags.len() - before, "on-hand table extracted");
    }

    OnHandExtract { tags, exceptions }
}

// ---------------------------------------------------------------------------
// Scanned
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ScannedExtract {
    pub tags: TagSet,
    /// Non-blank readings that were not a tag.
    pub rejected: usize,
}

/// Keep the readings that are tags, normalized. Blank readings are skipped.
pub fn extract_scanned<S: AsRef<str>>(grammar: &TagGrammar, readings: &[S]) -> ScannedExtract {
    let mut out = ScannedExtract::default();
    for reading in readings {
        let value = reading.as_ref().trim();
        if value.is_empty() {
            continue;
        }
        match grammar.parse(value) {
            Some(tag) => {
                out.tags.insert(tag);
            }
            None => out.rejected += 1,
        }
    }
    debug!(tags = out.tags.len(), rejected = out.rejected, "scanned readings filtered");
    out
}
