//! `weave-memory` – the Insight Memory Engine.
//!
//! Maintains an evolving, append-only memory of discrete insight records,
//! retrieves the most relevant ones for a query by keyword overlap, and
//! periodically folds stored records into higher-level synthesized records.
//!
//! # Modules
//!
//! - [`keywords`] – stopword-filtered keyword extraction, the sole text
//!   normalization used for scoring.
//! - [`store`] – [`InsightStore`][store::InsightStore]: the order-preserving,
//!   append-only record sequence.
//! - [`retrieval`] – keyword-overlap scoring with a most-recent-record
//!   fallback when nothing matches.
//! - [`synthesis`] – eligibility check, source selection, and aggregate
//!   materialization around the oracle's `synthesize` contract.
//! - [`engine`] – [`MemoryEngine`][engine::MemoryEngine]: the `add` / `query`
//!   / `tick` facade that owns the store, the turn counter, and the injected
//!   [`SemanticOracle`][weave_types::SemanticOracle].

pub mod engine;
pub mod keywords;
pub mod retrieval;
pub mod store;
pub mod synthesis;

pub use engine::{EngineConfig, MemoryEngine};
pub use store::InsightStore;
pub use synthesis::SynthesisOutcome;
