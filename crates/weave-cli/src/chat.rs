//! Interactive chat loop for the weave CLI.
//!
//! Each user line makes one full conversation turn:
//!
//! 1. The line is added to insight memory (enrichment via the oracle; an
//!    enrichment failure means the line is simply not remembered).
//! 2. The most relevant records are retrieved and rendered into a
//!    memory-context system prompt.
//! 3. The conversational model produces the reply.
//! 4. The engine ticks; every Nth turn triggers an insight synthesis attempt.
//!
//! Supported slash-commands:
//!   /help         – show this list
//!   /memory       – dump the current insight store
//!   /quit | /exit – end the session

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use weave_memory::{EngineConfig, MemoryEngine, SynthesisOutcome};
use weave_oracle::{ChatMessage, CompletionOptions, LlmClient, LlmOracle, Role};
use weave_types::{InsightRecord, SemanticOracle};

use crate::config::Config;

/// Reply given to the user when the conversational model call fails.
const FALLBACK_REPLY: &str =
    "I encountered an error trying to process your request. Please try again.";

// ─────────────────────────────────────────────────────────────────────────────
// Prompt assembly
// ─────────────────────────────────────────────────────────────────────────────

/// Render retrieved records into the memory block of the system prompt.
///
/// Aggregates show their synthesized conclusion, base records their imprint
/// and resonance keys, so the conversational model sees the most useful view
/// of each.
fn memory_context(records: &[InsightRecord]) -> String {
    if records.is_empty() {
        return "No specific memories retrieved for this query.".to_string();
    }
    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            if rec.is_aggregate {
                format!(
                    "Memory {} (Aggregate): Synthesized insight: \"{}\" (Summary: \"{}\")",
                    i + 1,
                    rec.content,
                    rec.imprint.as_deref().unwrap_or(""),
                )
            } else {
                format!(
                    "Memory {} (Record): \"{}\" (Keywords: {:?})",
                    i + 1,
                    rec.imprint.as_deref().unwrap_or(&rec.content),
                    rec.resonance_keys,
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn chat_system_prompt(context: &str) -> String {
    format!(
        r#"You are a helpful AI assistant.
You have access to some memories from previous interactions or synthesized insights.
Use these memories to provide a comprehensive and contextually relevant answer to the user's query.
If the memories are not directly relevant, answer from general knowledge and acknowledge that no specific memories were used.

Available memories:
---
{context}
---"#
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat loop
// ─────────────────────────────────────────────────────────────────────────────

/// Entry point for the interactive chat session.
///
/// `shutdown` is polled each iteration; when set the loop exits cleanly and
/// prints the session epilogue.
pub fn run(shutdown: Arc<AtomicBool>, cfg: &Config) {
    let oracle = LlmOracle::new(
        LlmClient::new(&cfg.oracle_url, &cfg.oracle_model).with_api_key(&cfg.api_key),
    );
    let chat_client =
        LlmClient::new(&cfg.oracle_url, &cfg.chat_model).with_api_key(&cfg.api_key);
    let mut engine = MemoryEngine::new(
        oracle,
        EngineConfig {
            synthesis_interval: cfg.synthesis_interval,
        },
    );

    println!("  I will try to remember our conversation and synthesize insights.");
    println!("  Type {} to end the session.\n", "/quit".bold());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "you>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/help" => cmd_help(),
            "/memory" => cmd_memory(&engine),
            "/quit" | "/exit" => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            _ => conversation_turn(&mut engine, &chat_client, cfg, input),
        }
    }

    print_epilogue(&engine);
}

/// One full remember–recall–reply–tick cycle.
fn conversation_turn<O: SemanticOracle>(
    engine: &mut MemoryEngine<O>,
    chat_client: &LlmClient,
    cfg: &Config,
    input: &str,
) {
    // Remember. A failed enrichment is reported but not fatal to the turn.
    if let Err(e) = engine.add(input, "user_input") {
        warn!(error = %e, "input not added to memory");
        println!("  {}", "(this one couldn't be memorized)".dimmed());
    }

    // Recall and reply.
    let recalled = engine.query(input, cfg.retrieval_top_k);
    let system = chat_system_prompt(&memory_context(&recalled));
    let messages = [
        ChatMessage {
            role: Role::System,
            content: system,
        },
        ChatMessage {
            role: Role::User,
            content: input.to_string(),
        },
    ];
    let reply = match chat_client.complete(&messages, &CompletionOptions::conversational()) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!(error = %e, "conversational model call failed");
            FALLBACK_REPLY.to_string()
        }
    };
    println!("{} {}", "weave>".bold().green(), reply);

    // Advance the turn clock; every Nth turn runs a synthesis attempt.
    match engine.tick() {
        Some(Ok(SynthesisOutcome::Synthesized(id))) => {
            info!(%id, "aggregate insight synthesized");
            println!("  {}", "✦ synthesized a new aggregate insight".dimmed());
        }
        Some(Ok(SynthesisOutcome::Skipped)) => {}
        Some(Err(e)) => {
            warn!(error = %e, "synthesis skipped");
            println!("  {}", "(synthesis skipped)".dimmed());
        }
        None => {}
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Weave Commands".bold().underline());
    println!("  {}    – dump the current insight store", "/memory".bold().cyan());
    println!("  {}  – end the session", "/quit  /exit".bold().cyan());
    println!("  Anything else is a conversation turn that I will remember.");
    println!();
}

fn cmd_memory<O: SemanticOracle>(engine: &MemoryEngine<O>) {
    let records = engine.store().records();
    println!();
    println!(
        "{} ({} record(s), {} turn(s))",
        "Insight Store".bold().underline(),
        records.len(),
        engine.turn_count()
    );
    for (i, rec) in records.iter().enumerate() {
        let kind = if rec.is_aggregate { "aggregate" } else { "record" };
        println!(
            "  {}. [{}] {}",
            i + 1,
            kind.yellow(),
            snippet(&rec.content, 70).bold()
        );
        if let Some(imp) = rec.imprint_text() {
            println!("       imprint: {}", imp.dimmed());
        }
        if !rec.derived_from.is_empty() {
            println!("       derived from {} record(s)", rec.derived_from.len());
        }
    }
    println!();
}

fn print_epilogue<O: SemanticOracle>(engine: &MemoryEngine<O>) {
    let records = engine.store().records();
    info!(records = records.len(), "chat session ended");
    println!(
        "\n  Session over – the weave holds {} insight record(s).",
        records.len()
    );
    for (i, rec) in records.iter().enumerate() {
        let kind = if rec.is_aggregate { "aggregate" } else { "record" };
        let summary = rec.imprint_text().unwrap_or(&rec.content);
        println!("    {}. ({}) {}", i + 1, kind, snippet(summary, 90).dimmed());
    }
}

/// First `max` characters of `text`, with an ellipsis when truncated.
fn snippet(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_types::{AggregateAttributes, EnrichedAttributes};

    fn base_record(imprint: &str, keys: &[&str]) -> InsightRecord {
        InsightRecord::base(
            "raw input",
            "user_input",
            EnrichedAttributes {
                resonance_keys: keys.iter().map(|s| s.to_string()).collect(),
                signifiers: vec![],
                imprint: imprint.to_string(),
                extracted_entities: vec![],
            },
        )
    }

    #[test]
    fn memory_context_for_empty_retrieval() {
        assert_eq!(
            memory_context(&[]),
            "No specific memories retrieved for this query."
        );
    }

    #[test]
    fn memory_context_renders_base_records_with_imprint() {
        let rec = base_record("The launch slipped to Q4.", &["launch delay"]);
        let ctx = memory_context(&[rec]);
        assert!(ctx.contains("Memory 1 (Record)"));
        assert!(ctx.contains("The launch slipped to Q4."));
        assert!(ctx.contains("launch delay"));
    }

    #[test]
    fn memory_context_renders_aggregates_with_conclusion() {
        let rec = InsightRecord::aggregate(
            AggregateAttributes {
                ia_core_data: "Budget risk is driving schedule slip".into(),
                ia_resonance_keys: vec!["budget".into()],
                ia_signifiers: vec!["risk assessment".into()],
                ia_situational_imprint: "Budget pressure delays delivery.".into(),
            },
            vec![],
        );
        let ctx = memory_context(&[rec]);
        assert!(ctx.contains("Memory 1 (Aggregate)"));
        assert!(ctx.contains("Budget risk is driving schedule slip"));
        assert!(ctx.contains("Budget pressure delays delivery."));
    }

    #[test]
    fn memory_context_numbers_multiple_records() {
        let records = vec![
            base_record("first summary", &["one"]),
            base_record("second summary", &["two"]),
        ];
        let ctx = memory_context(&records);
        assert!(ctx.contains("Memory 1"));
        assert!(ctx.contains("Memory 2"));
    }

    #[test]
    fn system_prompt_embeds_context_block() {
        let prompt = chat_system_prompt("Memory 1 (Record): \"x\"");
        assert!(prompt.contains("Memory 1 (Record)"));
        assert!(prompt.contains("helpful AI assistant"));
    }

    #[test]
    fn snippet_truncates_long_text() {
        assert_eq!(snippet("short", 10), "short");
        let long = "a".repeat(20);
        let cut = snippet(&long, 10);
        assert!(cut.starts_with("aaaaaaaaaa"));
        assert!(cut.ends_with('…'));
    }
}
