//! `weave-cli` – the Insight Weave conversational front end.
//!
//! This binary is the entry point for the memory-augmented chat agent. It:
//!
//! 1. Checks for `~/.weave/config.toml`; runs a **First-Run Wizard** when the
//!    file is absent.
//! 2. Probes the configured Ollama instance and reports available models.
//! 3. Drops the user into the **chat loop** (`/help`, `/memory`, `/quit`),
//!    where every line is remembered, recalled against, and periodically
//!    folded into synthesized insights.
//! 4. Intercepts **Ctrl-C** to end the session cleanly with an epilogue.

mod chat;
mod config;
mod ollama;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // Initialise tracing-subscriber using RUST_LOG (defaults to "info").
    // Set WEAVE_LOG_FORMAT=json to emit newline-delimited JSON logs suitable
    // for log aggregators. The CLI's user-facing output still uses println!
    // for UX consistency.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("WEAVE_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – ending session …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    // ── First-Run Wizard ──────────────────────────────────────────────────
    match config::load() {
        Ok(None) => run_first_run_wizard(),
        Ok(Some(_)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
        }
    }

    let cfg = config::load().ok().flatten().unwrap_or_default();

    // ── Ollama discovery ──────────────────────────────────────────────────
    print!("\n  Probing model server at {} … ", cfg.oracle_url.dimmed());
    match ollama::fetch_models(&cfg.oracle_url) {
        Ok(models) => {
            println!("{} ({} model(s) available)", "online".green(), models.len());
            let have_oracle = models.iter().any(|m| m.name == cfg.oracle_model);
            if !have_oracle {
                println!(
                    "  {} model '{}' not found locally – run `{}` first.",
                    "Note:".yellow(),
                    cfg.oracle_model.bold(),
                    format!("ollama pull {}", cfg.oracle_model).bold()
                );
            }
        }
        Err(_) => {
            println!("{}", "offline".yellow());
            println!(
                "  {}  Run `{}` to start a local AI.",
                "No model server detected – memory enrichment will fail.".dimmed(),
                "ollama serve".bold()
            );
        }
    }

    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    // ── Chat session ──────────────────────────────────────────────────────
    chat::run(shutdown, &cfg);
}

// ─────────────────────────────────────────────────────────────────────────────
// First-Run Wizard
// ─────────────────────────────────────────────────────────────────────────────

fn run_first_run_wizard() {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║       Weave First-Run Wizard         ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().cyan());
    println!();
    println!("  No configuration found.  Let's set up the weave.\n");

    let mut cfg = config::Config::default();

    let url = prompt_line(
        &format!("  Model server URL [{}]: ", cfg.oracle_url),
        &cfg.oracle_url,
    );
    cfg.oracle_url = url.trim().to_string();

    let model = prompt_line(
        &format!("  Oracle model (enrichment & synthesis) [{}]: ", cfg.oracle_model),
        &cfg.oracle_model,
    );
    cfg.oracle_model = model.trim().to_string();

    let model = prompt_line(
        &format!("  Chat model [{}]: ", cfg.chat_model),
        &cfg.chat_model,
    );
    cfg.chat_model = model.trim().to_string();

    let interval = prompt_line(
        &format!("  Synthesize insights every N turns [{}]: ", cfg.synthesis_interval),
        &cfg.synthesis_interval.to_string(),
    );
    if let Ok(n) = interval.trim().parse::<u64>() {
        cfg.synthesis_interval = n;
    }

    match config::save(&cfg) {
        Ok(()) => println!(
            "\n  {} Config saved to {}\n",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#" _      __                  "#.bold().cyan());
    println!("{}", r#"| | /| / /__ ___ __  _____ "#.bold().cyan());
    println!("{}", r#"| |/ |/ / -_) _ `/ |/ / -_)"#.bold().cyan());
    println!("{}", r#"|__/|__/\__/\_,_/|___/\__/ "#.bold().cyan());
    println!();
    println!("  {} {}",
        "Insight Weave".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Memory-augmented conversational agent");
    println!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn prompt_line(msg: &str, default: &str) -> String {
    use std::io::{BufRead, Write};
    print!("{}", msg);
    std::io::stdout().flush().ok();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(_) => {
            let t = line.trim().to_string();
            if t.is_empty() { default.to_string() } else { t }
        }
        Err(_) => default.to_string(),
    }
}
