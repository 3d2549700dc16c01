//! Synthesis coordinator.
//!
//! Decides when the store holds enough material to fold into a higher-level
//! insight, selects the source records, invokes the oracle's `synthesize`
//! contract, and appends the result as an ordinary aggregate record — which
//! can itself be retrieved or feed a later synthesis round.
//!
//! Source ids are captured at selection time as `(id, imprint)` pairs, so
//! provenance (`derived_from`) is exact even when two records happen to share
//! identical imprint text.

use tracing::{debug, info, warn};
use uuid::Uuid;
use weave_types::{InsightRecord, OracleError, SemanticOracle};

use crate::store::InsightStore;

/// Minimum number of records (and of non-empty imprints) required before a
/// synthesis attempt goes through.
pub const MIN_SYNTHESIS_SOURCES: usize = 2;

/// What a synthesis attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// A new aggregate record was appended; carries its id.
    Synthesized(Uuid),
    /// The store did not meet the eligibility rule; nothing changed.
    Skipped,
}

/// One selected synthesis source: the record's id and its imprint text,
/// captured together so provenance never has to be re-derived.
fn select_sources(store: &InsightStore) -> Vec<(Uuid, String)> {
    store
        .records()
        .iter()
        .filter_map(|r| r.imprint_text().map(|imp| (r.id, imp.to_string())))
        .collect()
}

/// Attempt one synthesis round over `store`.
///
/// Eligibility: the store must hold at least [`MIN_SYNTHESIS_SOURCES`]
/// records overall, of which at least that many carry a non-empty imprint.
/// An ineligible store is a silent no-op ([`SynthesisOutcome::Skipped`]),
/// not an error.
///
/// # Errors
///
/// Propagates [`OracleError`] when the oracle's `synthesize` call fails; the
/// store is left untouched in that case and the failure is non-fatal to the
/// engine.
pub fn attempt_synthesis<O: SemanticOracle>(
    store: &mut InsightStore,
    oracle: &O,
) -> Result<SynthesisOutcome, OracleError> {
    if store.len() < MIN_SYNTHESIS_SOURCES {
        debug!(records = store.len(), "too few records for synthesis");
        return Ok(SynthesisOutcome::Skipped);
    }

    let sources = select_sources(store);
    if sources.len() < MIN_SYNTHESIS_SOURCES {
        debug!(
            usable_imprints = sources.len(),
            "too few non-empty imprints for synthesis"
        );
        return Ok(SynthesisOutcome::Skipped);
    }

    info!(sources = sources.len(), "attempting insight synthesis");
    let imprints: Vec<String> = sources.iter().map(|(_, imp)| imp.clone()).collect();

    let attrs = oracle.synthesize(&imprints).inspect_err(|e| {
        warn!(error = %e, "synthesis failed; store unchanged");
    })?;

    let derived_from: Vec<Uuid> = sources.into_iter().map(|(id, _)| id).collect();
    let aggregate = InsightRecord::aggregate(attrs, derived_from);
    let id = aggregate.id;
    info!(id = %id, "synthesized aggregate appended");
    store.append(aggregate);
    Ok(SynthesisOutcome::Synthesized(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_types::{AggregateAttributes, EnrichedAttributes};

    /// Deterministic oracle: either answers with a fixed aggregate or fails.
    struct ScriptedOracle {
        fail: bool,
    }

    impl SemanticOracle for ScriptedOracle {
        fn enrich(&self, _text: &str) -> Result<EnrichedAttributes, OracleError> {
            unreachable!("synthesis never enriches");
        }

        fn synthesize(&self, imprints: &[String]) -> Result<AggregateAttributes, OracleError> {
            assert!(imprints.len() >= 2, "caller contract: at least 2 imprints");
            if self.fail {
                return Err(OracleError::Transport("scripted failure".into()));
            }
            Ok(AggregateAttributes {
                ia_core_data: "Launch delay driven by budget risk".into(),
                ia_resonance_keys: vec!["launch".into(), "budget".into(), "delay".into()],
                ia_signifiers: vec!["risk assessment".into()],
                ia_situational_imprint: "Budget risk is delaying the launch.".into(),
            })
        }
    }

    fn record_with_imprint(imprint: Option<&str>) -> InsightRecord {
        let mut rec = InsightRecord::base(
            "raw",
            "test",
            EnrichedAttributes {
                resonance_keys: vec!["key".into()],
                signifiers: vec![],
                imprint: imprint.unwrap_or_default().to_string(),
                extracted_entities: vec![],
            },
        );
        if imprint.is_none() {
            rec.imprint = None;
        }
        rec
    }

    #[test]
    fn skipped_when_store_too_small() {
        let mut store = InsightStore::new();
        store.append(record_with_imprint(Some("only one record")));
        let outcome = attempt_synthesis(&mut store, &ScriptedOracle { fail: false }).unwrap();
        assert_eq!(outcome, SynthesisOutcome::Skipped);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn skipped_when_too_few_usable_imprints() {
        let mut store = InsightStore::new();
        store.append(record_with_imprint(Some("usable imprint")));
        store.append(record_with_imprint(None));
        store.append(record_with_imprint(Some("")));
        let outcome = attempt_synthesis(&mut store, &ScriptedOracle { fail: false }).unwrap();
        assert_eq!(outcome, SynthesisOutcome::Skipped);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn success_appends_aggregate_with_provenance() {
        let mut store = InsightStore::new();
        store.append(record_with_imprint(Some("Team decided to delay launch")));
        store.append(record_with_imprint(Some("Budget concerns raised for Q3")));
        let (r1, r2) = (store.records()[0].id, store.records()[1].id);

        let outcome = attempt_synthesis(&mut store, &ScriptedOracle { fail: false }).unwrap();

        assert_eq!(store.len(), 3);
        let aggregate = store.last().unwrap();
        assert!(aggregate.is_aggregate);
        assert_eq!(outcome, SynthesisOutcome::Synthesized(aggregate.id));
        assert_eq!(aggregate.content, "Launch delay driven by budget risk");
        assert!(aggregate.derived_from.contains(&r1));
        assert!(aggregate.derived_from.contains(&r2));
    }

    #[test]
    fn duplicate_imprint_text_still_yields_distinct_provenance() {
        let mut store = InsightStore::new();
        store.append(record_with_imprint(Some("same summary")));
        store.append(record_with_imprint(Some("same summary")));
        let ids: Vec<Uuid> = store.records().iter().map(|r| r.id).collect();

        attempt_synthesis(&mut store, &ScriptedOracle { fail: false }).unwrap();

        let aggregate = store.last().unwrap();
        assert_eq!(aggregate.derived_from.len(), 2);
        assert!(aggregate.derived_from.contains(&ids[0]));
        assert!(aggregate.derived_from.contains(&ids[1]));
    }

    #[test]
    fn oracle_failure_leaves_store_unchanged() {
        let mut store = InsightStore::new();
        store.append(record_with_imprint(Some("first")));
        store.append(record_with_imprint(Some("second")));

        let err = attempt_synthesis(&mut store, &ScriptedOracle { fail: true }).unwrap_err();
        assert!(matches!(err, OracleError::Transport(_)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn aggregates_are_eligible_sources_for_later_rounds() {
        let mut store = InsightStore::new();
        store.append(record_with_imprint(Some("first")));
        store.append(record_with_imprint(Some("second")));
        attempt_synthesis(&mut store, &ScriptedOracle { fail: false }).unwrap();
        assert_eq!(store.len(), 3);

        // The freshly appended aggregate has an imprint, so the next round
        // selects all three records.
        let sources = select_sources(&store);
        assert_eq!(sources.len(), 3);
    }
}
