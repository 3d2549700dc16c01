//! `weave-oracle` – LLM-backed implementation of the semantic oracle.
//!
//! # Modules
//!
//! - [`client`] – [`LlmClient`][client::LlmClient]: a blocking
//!   OpenAI-compatible chat-completions client (works against Ollama at
//!   `http://localhost:11434` or any compatible server), with per-call
//!   [`CompletionOptions`][client::CompletionOptions] and optional JSON
//!   Schema output constraints.
//! - [`oracle`] – [`LlmOracle`][oracle::LlmOracle]: implements
//!   [`SemanticOracle`][weave_types::SemanticOracle] by prompting the model
//!   for strictly-shaped JSON and validating the reply into the engine's
//!   attribute types. The schemas of
//!   [`EnrichedAttributes`][weave_types::EnrichedAttributes] and
//!   [`AggregateAttributes`][weave_types::AggregateAttributes] are injected
//!   via `response_format` to force typed model output.

pub mod client;
pub mod oracle;

pub use client::{ChatMessage, CompletionOptions, LlmClient, Role};
pub use oracle::LlmOracle;
