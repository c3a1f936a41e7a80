use crate::model::{ReconciliationResult, TagSet};

/// Three-way set reconciliation.
///
/// `on_hand_real = on_hand ∩ registry` and
/// `missing = registry − scanned − on_hand_real`.
pub fn reconcile(registry: &TagSet, scanned: &TagSet, on_hand: &TagSet) -> ReconciliationResult {
    let on_hand_real: TagSet = on_hand.intersection(registry).cloned().collect();

    let missing: TagSet = registry
        .iter()
        .filter(|tag| !scanned.contains(*tag) && !on_hand_real.contains(*tag))
        .cloned()
        .collect();

    ReconciliationResult {
        registry: registry.clone(),
        scanned: scanned.clone(),
        on_hand: on_hand.clone(),
        on_hand_real,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_PREFIX, DEFAULT_SUFFIX_LEN};
    use crate::matcher::TagGrammar;

    fn set(suffixes: &[&str]) -> TagSet {
        let g = TagGrammar::new(DEFAULT_PREFIX, DEFAULT_SUFFIX_LEN).unwrap();
        suffixes
            .iter()
            .map(|s| g.parse(&format!("{DEFAULT_PREFIX}{s}")).unwrap())
            .collect()
    }

    #[test]
    fn missing_excludes_scanned_and_real_on_hand() {
        let registry = set(&["0000000A", "0000000B", "0000000C", "0000000D"]);
        let scanned = set(&["0000000A", "000000FF"]);
        let on_hand = set(&["0000000B", "000000EE"]);

        let r = reconcile(&registry, &scanned, &on_hand);
        assert_eq!(r.on_hand_real, set(&["0000000B"]));
        assert_eq!(r.missing, set(&["0000000C", "0000000D"]));
    }

    #[test]
    fn on_hand_outside_registry_is_not_real() {
        let registry = set(&["0000000A"]);
        let r = reconcile(&registry, &TagSet::new(), &set(&["000000EE"]));
        assert!(r.on_hand_real.is_empty());
        assert_eq!(r.missing, registry);
        assert_eq!(r.on_hand.len(), 1);
    }

    #[test]
    fn empty_registry_has_nothing_missing() {
        let r = reconcile(&TagSet::new(), &set(&["0000000A"]), &set(&["0000000B"]));
        assert!(r.missing.is_empty());
        assert!(r.on_hand_real.is_empty());
    }

    #[test]
    fn missing_iterates_in_ascending_order() {
        let registry = set(&["000000FF", "0000000A", "000000B0"]);
        let r = reconcile(&registry, &TagSet::new(), &TagSet::new());
        let order: Vec<&str> = r.missing.iter().map(|t| t.as_str()).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
    }
}
