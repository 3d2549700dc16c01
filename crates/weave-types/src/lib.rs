//! `weave-types` – shared data model for the Insight Weave memory system.
//!
//! Defines the single persisted entity, the [`InsightRecord`], together with
//! the two structured attribute bundles produced by the semantic oracle
//! ([`EnrichedAttributes`] for base records, [`AggregateAttributes`] for
//! synthesized ones), the [`OracleError`] taxonomy, and the
//! [`SemanticOracle`] trait that the engine depends on.
//!
//! The oracle is deliberately modelled as a trait so the memory engine can be
//! exercised with a deterministic in-test implementation, decoupled from any
//! networked LLM call.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Failures of the semantic oracle boundary.
///
/// The engine treats every variant identically: the call simply did not
/// produce usable attributes, and no record is created from it.
#[derive(Error, Debug)]
pub enum OracleError {
    /// The call to the backing service (HTTP, process, …) failed outright.
    #[error("Oracle transport error: {0}")]
    Transport(String),

    /// The oracle replied, but the payload was not the JSON we asked for.
    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),

    /// The oracle's JSON was parseable but missing a required field.
    #[error("Oracle response missing required field '{0}'")]
    MissingField(&'static str),
}

// ─────────────────────────────────────────────────────────────────────────────
// Oracle attribute bundles
// ─────────────────────────────────────────────────────────────────────────────

/// Structured attributes produced by enriching a raw text input.
///
/// All four fields are required; a response missing any of them is rejected
/// at the oracle boundary as [`OracleError::MissingField`] rather than
/// admitted as a null-filled partial record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EnrichedAttributes {
    /// Short phrases crucial for identifying this information, ordered by
    /// perceived importance. Primary retrieval-scoring signal.
    pub resonance_keys: Vec<String>,
    /// Broad categorical labels (e.g. "technical issue", "user feedback").
    pub signifiers: Vec<String>,
    /// Single-sentence summary of the core context and key takeaway.
    pub imprint: String,
    /// Named entities mentioned in the text; may be empty.
    pub extracted_entities: Vec<String>,
}

/// Structured attributes of a freshly synthesized aggregate insight.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AggregateAttributes {
    /// The synthesized higher-level conclusion or identified pattern.
    pub ia_core_data: String,
    /// Core terms for retrieving the synthesized insight.
    pub ia_resonance_keys: Vec<String>,
    /// Broad categorical labels for the synthesized insight.
    pub ia_signifiers: Vec<String>,
    /// Single-sentence summary of what the aggregate itself represents.
    pub ia_situational_imprint: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// SemanticOracle
// ─────────────────────────────────────────────────────────────────────────────

/// The external semantic service the memory engine depends on.
///
/// Both calls are blocking and unbounded in latency from the engine's
/// perspective; retry, timeout, and mutual-exclusion policy belong to the
/// caller wrapping the engine, not to this contract.
pub trait SemanticOracle {
    /// Turn raw text into the structured attributes of a base record.
    fn enrich(&self, text: &str) -> Result<EnrichedAttributes, OracleError>;

    /// Fold two or more record imprints into one higher-level attribute set.
    ///
    /// Calling this with fewer than 2 imprints is a caller contract
    /// violation; the synthesis coordinator's eligibility check guarantees
    /// it never does.
    fn synthesize(&self, imprints: &[String]) -> Result<AggregateAttributes, OracleError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// InsightRecord
// ─────────────────────────────────────────────────────────────────────────────

/// The fundamental unit of knowledge in the weave.
///
/// A record is either a *base* record carrying the original raw text, or an
/// *aggregate* produced by synthesizing the imprints of earlier records.
/// Records are append-only: once constructed, no content field is ever
/// mutated and no record is ever removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightRecord {
    /// Process-unique identifier, assigned at creation.
    pub id: Uuid,
    /// Raw input text (base) or synthesized conclusion (aggregate).
    pub content: String,
    /// Label of whatever produced the underlying text (e.g. `"user_input"`).
    pub source: String,
    /// Scoring phrases, most-important first.
    pub resonance_keys: Vec<String>,
    /// Broad category labels; carried for display, not used in scoring.
    pub signifiers: Vec<String>,
    /// Single-sentence summary; secondary scoring signal and synthesis input.
    pub imprint: Option<String>,
    /// Named entities; carried for display only.
    pub extracted_entities: Vec<String>,
    /// `true` for records produced by synthesis.
    pub is_aggregate: bool,
    /// Ids of the records whose imprints fed this aggregate; empty otherwise.
    pub derived_from: Vec<Uuid>,
    /// Wall-clock creation time (UTC).
    pub created_at: DateTime<Utc>,
    /// Reserved: no in-scope operation writes this.
    pub modified_at: Option<DateTime<Utc>>,
    /// Reserved: retrieval is read-only and does not touch this.
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// Reserved extension point, always 0 in scope.
    pub access_count: u64,
    /// Reserved extension point, always 0.0 in scope.
    pub importance: f64,
}

impl InsightRecord {
    /// Construct a base record from raw text and its enriched attributes.
    pub fn base(text: impl Into<String>, source: impl Into<String>, attrs: EnrichedAttributes) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: text.into(),
            source: source.into(),
            resonance_keys: attrs.resonance_keys,
            signifiers: attrs.signifiers,
            imprint: Some(attrs.imprint),
            extracted_entities: attrs.extracted_entities,
            is_aggregate: false,
            derived_from: Vec::new(),
            created_at: Utc::now(),
            modified_at: None,
            last_accessed_at: None,
            access_count: 0,
            importance: 0.0,
        }
    }

    /// Construct an aggregate record from synthesized attributes and the ids
    /// of the records whose imprints were folded into it.
    pub fn aggregate(attrs: AggregateAttributes, derived_from: Vec<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: attrs.ia_core_data,
            source: "synthesis".to_string(),
            resonance_keys: attrs.ia_resonance_keys,
            signifiers: attrs.ia_signifiers,
            imprint: Some(attrs.ia_situational_imprint),
            extracted_entities: Vec::new(),
            is_aggregate: true,
            derived_from,
            created_at: Utc::now(),
            modified_at: None,
            last_accessed_at: None,
            access_count: 0,
            importance: 0.0,
        }
    }

    /// The record's imprint, treating an empty string as absent.
    ///
    /// Scoring and synthesis eligibility both go through this accessor so an
    /// oracle that returned `""` cannot sneak a blank imprint into either.
    pub fn imprint_text(&self) -> Option<&str> {
        self.imprint.as_deref().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> EnrichedAttributes {
        EnrichedAttributes {
            resonance_keys: vec!["launch delay".into(), "q3 budget".into()],
            signifiers: vec!["project management".into()],
            imprint: "The team delayed the launch over budget concerns.".into(),
            extracted_entities: vec!["Q3".into()],
        }
    }

    #[test]
    fn base_record_is_not_aggregate() {
        let rec = InsightRecord::base("we slipped the launch", "user_input", attrs());
        assert!(!rec.is_aggregate);
        assert!(rec.derived_from.is_empty());
        assert_eq!(rec.content, "we slipped the launch");
        assert_eq!(rec.source, "user_input");
        assert_eq!(rec.access_count, 0);
    }

    #[test]
    fn aggregate_record_carries_provenance() {
        let sources = vec![Uuid::new_v4(), Uuid::new_v4()];
        let rec = InsightRecord::aggregate(
            AggregateAttributes {
                ia_core_data: "Budget risk is driving schedule slip".into(),
                ia_resonance_keys: vec!["budget".into(), "schedule".into()],
                ia_signifiers: vec!["risk assessment".into()],
                ia_situational_imprint: "Budget pressure is delaying delivery.".into(),
            },
            sources.clone(),
        );
        assert!(rec.is_aggregate);
        assert_eq!(rec.derived_from, sources);
        assert_eq!(rec.content, "Budget risk is driving schedule slip");
        assert_eq!(rec.source, "synthesis");
    }

    #[test]
    fn imprint_text_filters_empty_string() {
        let mut rec = InsightRecord::base("x", "test", attrs());
        assert!(rec.imprint_text().is_some());
        rec.imprint = Some(String::new());
        assert!(rec.imprint_text().is_none());
        rec.imprint = None;
        assert!(rec.imprint_text().is_none());
    }

    #[test]
    fn record_serde_roundtrip() {
        let rec = InsightRecord::base("remember this", "user_input", attrs());
        let json = serde_json::to_string(&rec).unwrap();
        let back: InsightRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, rec.id);
        assert_eq!(back.resonance_keys, rec.resonance_keys);
        assert_eq!(back.imprint, rec.imprint);
    }

    #[test]
    fn enriched_attributes_reject_missing_field() {
        // A payload without `imprint` must not deserialize into a partial
        // attribute set.
        let json = r#"{
            "resonance_keys": ["a"],
            "signifiers": ["b"],
            "extracted_entities": []
        }"#;
        assert!(serde_json::from_str::<EnrichedAttributes>(json).is_err());
    }

    #[test]
    fn aggregate_attributes_reject_missing_field() {
        let json = r#"{
            "ia_core_data": "conclusion",
            "ia_resonance_keys": [],
            "ia_signifiers": []
        }"#;
        assert!(serde_json::from_str::<AggregateAttributes>(json).is_err());
    }

    #[test]
    fn oracle_error_display() {
        let err = OracleError::MissingField("resonance_keys");
        assert!(err.to_string().contains("resonance_keys"));

        let err2 = OracleError::Transport("connection refused".into());
        assert!(err2.to_string().contains("connection refused"));
    }
}
