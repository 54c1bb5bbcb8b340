//! Screening CLI
//!
//! Evaluates one set of questionnaire answers against a ruleset document.
//!
//! ## Usage
//!
//! ```bash
//! # Human-readable decision
//! screen --ruleset policies/rusty_patched_bumble_bee.json --answers answers.json
//!
//! # Pipe answers from stdin, JSON output with diagnostics
//! cat answers.json | screen --ruleset policy.json --format json --detailed
//! ```
//!
//! ## Exit Codes
//!
//! - 0: decision produced
//! - 2: ruleset or answers could not be loaded

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use screening_engine::{Answers, Decision, EvaluationReport, Ruleset};
use tracing_subscriber::EnvFilter;

/// Evaluate screening answers against a ruleset document
#[derive(Parser)]
#[command(name = "screen")]
#[command(version)]
#[command(about = "Evaluate screening answers against a ruleset", long_about = None)]
struct Cli {
    /// Path to the ruleset document (JSON)
    #[arg(short, long)]
    ruleset: PathBuf,

    /// Path to the answers object (reads from stdin if not provided)
    #[arg(short, long)]
    answers: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Include the exit stage, unknowns count, and timing
    #[arg(long)]
    detailed: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// `RUST_LOG` directives when set and valid, `warn` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn run(cli: Cli) -> Result<()> {
    let document = std::fs::read_to_string(&cli.ruleset)
        .with_context(|| format!("Failed to read ruleset from {:?}", cli.ruleset))?;
    let ruleset = Ruleset::from_json(&document)
        .with_context(|| format!("Failed to load ruleset from {:?}", cli.ruleset))?;
    tracing::debug!(%ruleset, "ruleset loaded");

    let input = match &cli.answers {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read answers from {path:?}"))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read answers from stdin")?;
            buffer
        }
    };
    let answers = Answers::from_json(&input).context("Answers must be a JSON object")?;

    let report = ruleset.evaluate_detailed(&answers);
    let summary = ruleset.summary(report.decision(), &answers);

    match cli.format {
        OutputFormat::Json => print_json(&report, summary.as_deref(), cli.detailed)?,
        OutputFormat::Text => print_text(&report, summary.as_deref(), cli.detailed),
    }
    Ok(())
}

fn print_json(report: &EvaluationReport, summary: Option<&str>, detailed: bool) -> Result<()> {
    let mut value = serde_json::to_value(report.decision())?;
    if let Some(object) = value.as_object_mut() {
        if let Some(summary) = summary {
            object.insert("summary".into(), summary.into());
        }
        if detailed {
            object.insert("exit".into(), report.exit().to_string().into());
            object.insert("unknowns".into(), report.unknowns().into());
            #[allow(clippy::cast_possible_truncation)]
            let micros = report.duration().as_micros() as u64;
            object.insert("durationMicros".into(), micros.into());
        }
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_text(report: &EvaluationReport, summary: Option<&str>, detailed: bool) {
    let decision: &Decision = report.decision();

    println!("Determination: {}", decision.determination);
    println!(
        "Risk score:    {} ({} risk)",
        decision.risk_score, decision.risk_band
    );
    println!("Confidence:    {}", decision.confidence);

    if !decision.why_text.is_empty() {
        println!();
        println!("{}", decision.why_text);
    }

    if !decision.drivers.is_empty() {
        println!();
        println!("Drivers:");
        for driver in &decision.drivers {
            println!("  - {driver}");
        }
    }

    if !decision.recommendations.is_empty() {
        println!();
        println!("Recommendations:");
        for rec in &decision.recommendations {
            println!("  - {rec}");
        }
    }

    if !decision.next_action.is_empty() {
        println!();
        println!("Next action: {}", decision.next_action);
    }

    if let Some(summary) = summary {
        println!();
        println!("{summary}");
    }

    if detailed {
        println!();
        println!(
            "Exit: {}  Unknowns: {}  Duration: {:?}",
            report.exit(),
            report.unknowns(),
            report.duration()
        );
    }
}
