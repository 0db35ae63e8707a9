//! AddMaths Expert System — interactive REPL entrypoint.
//! Loads the knowledge base, takes a topic catalog snapshot and answers queries on stdin.
//!
//! Env:
//! - `ADDMATHS_KB_PATH`  knowledge base file (defaults to `config/knowledge_base.toml`)
//! - `ADDMATHS_DEV_LOG=1` compact tracing logs (`RUST_LOG` overrides the filter)
//! - `ADDMATHS_METRICS=1` enable counters for the `stats` command

use std::io::{self, BufRead, Write};

use addmaths_expert::metrics::Metrics;
use addmaths_expert::telemetry::init_tracing;
use addmaths_expert::{help_text, Assistant, Command, FileKnowledgeBase};
use anyhow::Context;
use tracing::warn;

fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let metrics = Metrics::from_env()?;
    let kb = FileKnowledgeBase::load_default().context("loading knowledge base")?;
    let mut assistant = Assistant::new(kb)?;

    let banner = "=".repeat(60);
    println!("{banner}");
    println!("     WELCOME TO THE ADDMATHS EXPERT SYSTEM!");
    println!("{banner}");
    println!("This system helps with additional mathematics topics,");
    println!("formulas, and step-by-step solutions to problems.");
    println!();
    println!("{}", help_text());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\nWhat would you like to know? ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break; // EOF
        };
        let line = line.context("reading stdin")?;

        match Command::parse(&line) {
            Command::Exit => break,
            Command::Help => println!("{}", help_text()),
            Command::Reload => match assistant.reload() {
                Ok(()) => println!(
                    "Reloaded {} topics.",
                    assistant.catalog().topics().len()
                ),
                Err(e) => {
                    warn!(error = ?e, "reload failed");
                    println!("Reload failed; keeping the previous topic list.");
                }
            },
            Command::Stats => match &metrics {
                Some(m) => println!("{}", m.render()),
                None => println!("Metrics are disabled (set ADDMATHS_METRICS=1)."),
            },
            Command::Query(q) if q.is_empty() => continue,
            Command::Query(q) => {
                let reply = assistant.respond(&q);
                println!("\n{}", reply.text);
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}
