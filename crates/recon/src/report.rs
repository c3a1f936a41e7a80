use std::collections::BTreeMap;

use crate::model::{ExceptionContent, ExceptionRow, MissingItem, ReconSummary, ReconciliationResult, TagId};

/// Missing items in ascending tag order, described from the registry.
pub fn missing_items(result: &ReconciliationResult, descriptions: &BTreeMap<TagId, String>) -> Vec<MissingItem> {
    result
        .missing
        .iter()
        .map(|tag| MissingItem {
            tag: tag.clone(),
            description: descriptions.get(tag).cloned().unwrap_or_default(),
        })
        .collect()
}

/// Summary counters for a run.
pub fn compute_summary(registry_rows: usize, result: &ReconciliationResult) -> ReconSummary {
    ReconSummary {
        registry_rows,
        registry_valid: result.registry.len(),
        scanned: result.scanned.len(),
        on_hand_total: result.on_hand.len(),
        on_hand_real: result.on_hand_real.len(),
        missing: result.missing.len(),
    }
}

/// Flatten an exception row into report cells.
///
/// Registry rows: `Row, <n>, <reason>, <cells...>`.
/// On-hand rows: `Sheet, <name>, Row, <n>, Columns, <count>, Content, <text>`.
pub fn exception_record(exception: &ExceptionRow) -> Vec<String> {
    let mut record = Vec::new();
    if let Some(ref table) = exception.table {
        record.push("Sheet".to_string());
        record.push(table.clone());
    }
    record.push("Row".to_string());
    record.push(exception.row.to_string());

    match &exception.content {
        ExceptionContent::Cells(cells) => {
            record.push(exception.reason.to_string());
            record.extend(cells.iter().cloned());
        }
        ExceptionContent::Joined { text, column_count } => {
            record.push("Columns".to_string());
            record.push(column_count.to_string());
            record.push("Content".to_string());
            record.push(text.clone());
        }
    }
    record
}

/// Header + one record per missing item.
pub fn missing_records(items: &[MissingItem]) -> Vec<Vec<String>> {
    let mut records = Vec::with_capacity(items.len() + 1);
    records.push(vec!["Tag".to_string(), "Description".to_string()]);
    records.extend(
        items
            .iter()
            .map(|item| vec![item.tag.to_string(), item.description.clone()]),
    );
    records
}
