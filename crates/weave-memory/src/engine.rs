//! [`MemoryEngine`] – the insight memory facade.
//!
//! Wires the record store, retriever, and synthesis coordinator around an
//! injected [`SemanticOracle`]. The engine owns the turn counter and the
//! synthesis interval as explicit state ([`EngineConfig`]) rather than
//! hidden process-wide globals; every `interval`-th [`tick`][MemoryEngine::tick]
//! runs one synthesis attempt.
//!
//! # Example
//!
//! ```rust,ignore
//! use weave_memory::engine::{EngineConfig, MemoryEngine};
//!
//! let mut engine = MemoryEngine::new(oracle, EngineConfig::default());
//! engine.add("we decided to delay the launch", "user_input")?;
//! let hits = engine.query("what happened to the launch", 2);
//! engine.tick();
//! ```

use tracing::{info, warn};
use uuid::Uuid;
use weave_types::{InsightRecord, OracleError, SemanticOracle};

use crate::retrieval;
use crate::store::InsightStore;
use crate::synthesis::{self, SynthesisOutcome};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Tunables for [`MemoryEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Run a synthesis attempt every this many [`tick`][MemoryEngine::tick]s.
    pub synthesis_interval: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            synthesis_interval: 3,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemoryEngine
// ─────────────────────────────────────────────────────────────────────────────

/// The insight memory engine.
///
/// Single-threaded and synchronous: every operation runs to completion
/// before the next begins, and control leaves the engine only through the
/// two blocking oracle calls.
pub struct MemoryEngine<O: SemanticOracle> {
    store: InsightStore,
    oracle: O,
    turn_count: u64,
    synthesis_interval: u64,
}

impl<O: SemanticOracle> MemoryEngine<O> {
    /// Build an engine around `oracle` with the given configuration.
    ///
    /// A `synthesis_interval` of 0 disables interval-triggered synthesis.
    pub fn new(oracle: O, config: EngineConfig) -> Self {
        Self {
            store: InsightStore::new(),
            oracle,
            turn_count: 0,
            synthesis_interval: config.synthesis_interval,
        }
    }

    /// Enrich `text` via the oracle and append the resulting base record.
    ///
    /// # Errors
    ///
    /// Returns the [`OracleError`] when enrichment fails; nothing is appended
    /// in that case and the engine remains fully usable.
    pub fn add(&mut self, text: &str, source: &str) -> Result<Uuid, OracleError> {
        let attrs = self.oracle.enrich(text).inspect_err(|e| {
            warn!(error = %e, "enrichment failed; input not added to memory");
        })?;
        let record = InsightRecord::base(text, source, attrs);
        let id = record.id;
        info!(
            id = %id,
            source,
            imprint = record.imprint.as_deref().unwrap_or(""),
            total = self.store.len() + 1,
            "insight record stored"
        );
        self.store.append(record);
        Ok(id)
    }

    /// Retrieve the `top_k` records most relevant to `text`.
    ///
    /// See [`retrieval::retrieve`] for scoring and fallback semantics.
    pub fn query(&self, text: &str, top_k: usize) -> Vec<InsightRecord> {
        retrieval::retrieve(&self.store, text, top_k)
    }

    /// Advance the turn counter by one.
    ///
    /// On every `synthesis_interval`-th call this runs one synthesis attempt
    /// and hands its result back; other calls return `None`. An oracle
    /// failure during synthesis is reported here but is non-fatal and leaves
    /// the store unchanged.
    pub fn tick(&mut self) -> Option<Result<SynthesisOutcome, OracleError>> {
        self.turn_count += 1;
        if self.synthesis_interval == 0 || self.turn_count % self.synthesis_interval != 0 {
            return None;
        }
        info!(turn = self.turn_count, "synthesis interval reached");
        Some(synthesis::attempt_synthesis(&mut self.store, &self.oracle))
    }

    /// Read-only view of the underlying store.
    pub fn store(&self) -> &InsightStore {
        &self.store
    }

    /// Number of ticks observed so far.
    pub fn turn_count(&self) -> u64 {
        self.turn_count
    }
}
