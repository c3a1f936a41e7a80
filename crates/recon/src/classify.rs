use crate::matcher::TagGrammar;
use crate::model::{Cell, TagId};

/// Separator between the cells that make up a row's description.
pub const DESCRIPTION_SEPARATOR: &str = " | ";

/// Classification of one source row by the number of tags it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Every cell is absent or blank.
    Ignored,
    /// Exactly one tag; the rest of the row is its description.
    Valid { tag: TagId, description: String },
    /// Two or more tags. Never resolved here.
    Ambiguous { tags: Vec<TagId>, cells: Vec<String> },
    /// Content but no tag.
    Empty { cells: Vec<String> },
}

impl RowOutcome {
    /// Every tag found on the row, in column order.
    pub fn tags(&self) -> Vec<&TagId> {
        match self {
            Self::Valid { tag, .. } => vec![tag],
            Self::Ambiguous { tags, .. } => tags.iter().collect(),
            Self::Ignored | Self::Empty { .. } => Vec::new(),
        }
    }

    pub fn is_exception(&self) -> bool {
        matches!(self, Self::Ambiguous { .. } | Self::Empty { .. })
    }
}

/// Trimmed, non-blank cells of a row in column order.
pub fn non_blank_cells(row: &[Cell]) -> Vec<&str> {
    row.iter()
        .filter_map(|cell| cell.as_deref())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect()
}

/// Classify a row. Pure; does not depend on the row's position or table.
pub fn classify_row(grammar: &TagGrammar, row: &[Cell]) -> RowOutcome {
    let cells = non_blank_cells(row);
    if cells.is_empty() {
        return RowOutcome::Ignored;
    }

    let mut found: Vec<(usize, TagId)> = cells
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| grammar.parse(value).map(|tag| (idx, tag)))
        .collect();

    if found.len() > 1 {
        return RowOutcome::Ambiguous {
            tags: found.into_iter().map(|(_, tag)| tag).collect(),
            cells: to_owned(&cells),
        };
    }

    match found.pop() {
        None => RowOutcome::Empty {
            cells: to_owned(&cells),
        },
        Some((tag_idx, tag)) => {
            let description = cells
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != tag_idx)
                .map(|(_, value)| *value)
                .collect::<Vec<_>>()
                .join(DESCRIPTION_SEPARATOR);
            RowOutcome::Valid { tag, description }
        }
    }
}

fn to_owned(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}
