//! Keyword-overlap relevance retrieval.
//!
//! Scores every stored record against the query's keyword set and returns
//! the top-k by score, highest first:
//!
//! * each `resonance_keys` phrase contributes `2 ×` its keyword overlap with
//!   the query,
//! * the imprint, when present, contributes `1 ×` its overlap.
//!
//! Records scoring zero are discarded. Ranking uses a stable sort, so records
//! with equal scores keep their insertion order. When *nothing* scores above
//! zero the retriever falls back to the single most recently inserted record
//! rather than returning nothing — recency is the best guess the engine has
//! when keywords give no signal. The fallback never overrides `top_k == 0`
//! and never returns more than one record.

use std::collections::HashSet;

use tracing::{debug, info};
use weave_types::InsightRecord;

use crate::keywords;
use crate::store::InsightStore;

/// Score weight of a query keyword found in a resonance-key phrase.
const RESONANCE_WEIGHT: usize = 2;
/// Score weight of a query keyword found in the imprint.
const IMPRINT_WEIGHT: usize = 1;

/// Relevance score of a single record against a pre-extracted query keyword set.
fn score_record(record: &InsightRecord, query_keywords: &HashSet<String>) -> usize {
    let mut score = 0;
    for phrase in &record.resonance_keys {
        let phrase_keywords = keywords::extract(phrase);
        score += RESONANCE_WEIGHT * phrase_keywords.intersection(query_keywords).count();
    }
    if let Some(imprint) = record.imprint_text() {
        let imprint_keywords = keywords::extract(imprint);
        score += IMPRINT_WEIGHT * imprint_keywords.intersection(query_keywords).count();
    }
    score
}

/// Return the `top_k` records most relevant to `query`, best first.
///
/// Never mutates the store and never fails. Returns at most `top_k` records,
/// except that the no-match fallback returns exactly one record regardless
/// of how large `top_k` is.
pub fn retrieve(store: &InsightStore, query: &str, top_k: usize) -> Vec<InsightRecord> {
    if store.is_empty() {
        debug!("store is empty; nothing to retrieve");
        return Vec::new();
    }
    if top_k == 0 {
        return Vec::new();
    }

    let query_keywords = keywords::extract(query);
    debug!(?query_keywords, "scoring {} records", store.len());

    let mut scored: Vec<(&InsightRecord, usize)> = store
        .records()
        .iter()
        .filter_map(|r| {
            let score = score_record(r, &query_keywords);
            (score > 0).then_some((r, score))
        })
        .collect();

    if scored.is_empty() {
        // No keyword overlap anywhere: fall back to the most recent record.
        if let Some(recent) = store.last() {
            info!(id = %recent.id, "no record scored above zero; falling back to most recent");
            return vec![recent.clone()];
        }
        return Vec::new();
    }

    // Stable sort: equal scores keep insertion order.
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(top_k);

    info!(
        hits = scored.len(),
        best_score = scored.first().map(|(_, s)| *s).unwrap_or(0),
        "retrieval complete"
    );
    scored.into_iter().map(|(r, _)| r.clone()).collect()
}
