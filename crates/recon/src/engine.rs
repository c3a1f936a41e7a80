use tracing::{debug, info};

use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::extract::{extract_on_hand, extract_registry, extract_scanned};
use crate::matcher::TagGrammar;
use crate::model::{ReconInput, ReconMeta, ReconReport, TagSet};
use crate::reconcile::reconcile;
use crate::report::{compute_summary, missing_items};

/// Run reconciliation per config. Returns the missing items, exception
/// reports and summary.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconReport, ReconError> {
    config.validate()?;
    let grammar = TagGrammar::from_config(&config.grammar)?;
    Ok(run_with_grammar(config, &grammar, input))
}

/// Same as [`run`] with an already compiled grammar.
pub fn run_with_grammar(config: &ReconConfig, grammar: &TagGrammar, input: &ReconInput) -> ReconReport {
    let scanned = extract_scanned(grammar, &input.scanned);
    let registry = extract_registry(grammar, &input.registry, config.registry.on_duplicate);
    let on_hand = extract_on_hand(grammar, &input.on_hand, config.on_hand.ambiguous);

    let registry_set: TagSet = registry.entries.keys().cloned().collect();
    let result = reconcile(&registry_set, &scanned.tags, &on_hand.tags);
    debug!(
        registry = result.registry.len(),
        scanned = result.scanned.len(),
        on_hand = result.on_hand.len(),
        on_hand_real = result.on_hand_real.len(),
        "sets reconciled"
    );

    let summary = compute_summary(registry.total_rows, &result);
    let missing = missing_items(&result, &registry.entries);

    info!(
        missing = summary.missing,
        registry_exceptions = registry.exceptions.len(),
        on_hand_exceptions = on_hand.exceptions.len(),
        scanned_rejected = scanned.rejected,
        "reconciliation finished"
    );

    ReconReport {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        missing,
        registry_exceptions: registry.exceptions,
        on_hand_exceptions: on_hand.exceptions,
    }
}
