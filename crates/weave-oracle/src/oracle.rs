//! [`LlmOracle`] – the LLM-backed semantic oracle.
//!
//! Implements the [`SemanticOracle`] contract on top of [`LlmClient`]:
//! `enrich` turns raw text into the structured attributes of a base insight
//! record, `synthesize` folds a set of record imprints into the attributes
//! of one higher-level aggregate. Both calls request schema-constrained JSON
//! output and validate the reply into a strict attribute type before handing
//! it to the engine — a reply missing a required field is rejected as a
//! whole, never admitted as a partial record.

use schemars::schema_for;
use tracing::{debug, info};
use weave_types::{AggregateAttributes, EnrichedAttributes, OracleError, SemanticOracle};

use crate::client::{ChatMessage, CompletionOptions, LlmClient, Role};

// ─────────────────────────────────────────────────────────────────────────────
// Prompts
// ─────────────────────────────────────────────────────────────────────────────

const ENRICH_SYSTEM_PROMPT: &str = "\
You are an AI assistant specialized in extracting structured information from \
text and outputting it as valid JSON, adhering strictly to the requested schema.";

const SYNTHESIZE_SYSTEM_PROMPT: &str = "\
You are an AI assistant specialized in synthesizing higher-level insights from \
related information snippets and outputting the result as a single valid JSON \
object, adhering strictly to the requested schema.";

fn enrich_prompt(raw_text: &str) -> String {
    format!(
        r#"Analyze the following text and produce a single JSON object with these keys:
- "resonance_keys": 5-7 specific core terms or short phrases crucial for identifying and searching this information (key entities, actions, concepts, outcomes), ordered by importance.
- "signifiers": 3-5 broader categorical or thematic labels (e.g. "project management", "technical issue", "user feedback", "strategic decision").
- "imprint": one concise sentence capturing the core context and the most critical takeaway or outcome.
- "extracted_entities": key named entities (people, organizations, locations, products, projects); an empty list when none are prominent.

Text for analysis:
---
{raw_text}
---

Output ONLY the JSON object, with no text before or after it."#
    )
}

fn synthesize_prompt(imprints: &[String]) -> String {
    let formatted: String = imprints
        .iter()
        .enumerate()
        .map(|(i, imp)| format!("- Imprint {}: \"{}\"\n", i + 1, imp))
        .collect();
    format!(
        r#"You are given the one-sentence imprints of several related insight records.
Identify the overarching theme, pattern, problem, or emergent conclusion that connects them, and produce a single JSON object with these keys:
- "ia_core_data": the synthesized higher-level conclusion or identified pattern — an abstracted insight not explicitly stated in any single imprint but evident from their combination.
- "ia_resonance_keys": 3-5 core terms or short phrases for retrieving this synthesized insight.
- "ia_signifiers": 2-3 broad categorical labels (e.g. "strategic insight", "emergent trend", "risk assessment").
- "ia_situational_imprint": one concise sentence describing what this synthesized insight itself represents.

Input imprints:
---
{formatted}---

Output ONLY the JSON object, with no text before or after it."#
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Response validation
// ─────────────────────────────────────────────────────────────────────────────

/// Parse an LLM reply into a value of `T` after checking every required key
/// is present.
///
/// Validation is two-stage so the error taxonomy stays precise: non-JSON text
/// is [`OracleError::MalformedResponse`], parseable JSON lacking a required
/// key is [`OracleError::MissingField`].
fn parse_validated<T: serde::de::DeserializeOwned>(
    raw: &str,
    required: &[&'static str],
) -> Result<T, OracleError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| OracleError::MalformedResponse(e.to_string()))?;
    for key in required {
        if value.get(key).is_none() {
            return Err(OracleError::MissingField(key));
        }
    }
    serde_json::from_value(value).map_err(|e| OracleError::MalformedResponse(e.to_string()))
}

pub(crate) fn parse_enriched(raw: &str) -> Result<EnrichedAttributes, OracleError> {
    parse_validated(
        raw,
        &["resonance_keys", "signifiers", "imprint", "extracted_entities"],
    )
}

pub(crate) fn parse_aggregate(raw: &str) -> Result<AggregateAttributes, OracleError> {
    parse_validated(
        raw,
        &[
            "ia_core_data",
            "ia_resonance_keys",
            "ia_signifiers",
            "ia_situational_imprint",
        ],
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// LlmOracle
// ─────────────────────────────────────────────────────────────────────────────

/// Semantic oracle backed by an OpenAI-compatible model server.
pub struct LlmOracle {
    client: LlmClient,
}

impl LlmOracle {
    /// Build an oracle around an existing [`LlmClient`].
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Convenience constructor from endpoint and model name.
    pub fn connect(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(LlmClient::new(base_url, model))
    }
}

impl SemanticOracle for LlmOracle {
    fn enrich(&self, text: &str) -> Result<EnrichedAttributes, OracleError> {
        info!(chars = text.len(), "enriching text into insight attributes");
        let schema = serde_json::to_value(schema_for!(EnrichedAttributes))
            .unwrap_or(serde_json::Value::Null);
        let messages = [
            ChatMessage {
                role: Role::System,
                content: ENRICH_SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: Role::User,
                content: enrich_prompt(text),
            },
        ];
        let raw = self
            .client
            .complete(&messages, &CompletionOptions::extraction(schema))?;
        debug!(reply_chars = raw.len(), "enrichment reply received");
        parse_enriched(&raw)
    }

    fn synthesize(&self, imprints: &[String]) -> Result<AggregateAttributes, OracleError> {
        debug_assert!(
            imprints.len() >= 2,
            "synthesize requires at least 2 imprints"
        );
        info!(imprints = imprints.len(), "synthesizing aggregate insight");
        let schema = serde_json::to_value(schema_for!(AggregateAttributes))
            .unwrap_or(serde_json::Value::Null);
        let messages = [
            ChatMessage {
                role: Role::System,
                content: SYNTHESIZE_SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: Role::User,
                content: synthesize_prompt(imprints),
            },
        ];
        let raw = self
            .client
            .complete(&messages, &CompletionOptions::synthesis(schema))?;
        debug!(reply_chars = raw.len(), "synthesis reply received");
        parse_aggregate(&raw)
    }
}
