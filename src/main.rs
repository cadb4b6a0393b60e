use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod error;
mod flight;
mod logger;
mod models;
mod report;
mod roster;
mod rules;

use flight::{FlightReasoner, KnowledgeBase};
use logger::ResultLogger;
use models::{bool_word, EvaluationResult, StudentRecord};
use rules::BonusPolicy;

#[derive(Parser)]
#[command(name = "expert-rules")]
#[command(about = "Mini expert system: student rule checks and a default-logic flight reasoner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Audit log destination (defaults to ~/Downloads/logic_results.csv)
    #[arg(long, global = true, env = "EXPERT_RULES_LOG")]
    log_file: Option<PathBuf>,

    /// Verbose diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the built-in students and log each result
    Demo {
        /// Append to the existing log instead of starting a fresh one
        #[arg(long)]
        keep: bool,
    },
    /// Evaluate students imported from a CSV roster
    Evaluate {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = rules::DEFAULT_BONUS)]
        bonus: f64,
        #[arg(long, default_value_t = rules::DEFAULT_BONUS_CAP)]
        cap: f64,
        /// Print results as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Ask whether an animal can fly
    Fly {
        /// Animal name; read from stdin when omitted
        #[arg(long)]
        animal: Option<String>,
        /// Print the verdict and trace as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown summary of the audit log
    Report {
        #[arg(long, default_value = "rules_report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let logger = ResultLogger::new(cli.log_file.unwrap_or_else(ResultLogger::default_path));

    match cli.command {
        Commands::Demo { keep } => {
            if !keep {
                logger.reset().with_context(|| {
                    format!("failed to remove {}", logger.destination().display())
                })?;
            }
            println!("=== Mini Expert System: Demo Run ===");
            for student in roster::demo_students() {
                let result = rules::evaluate_student(&student);
                log_evaluation(&logger, &student, &result)?;
                print_evaluation(&student.name, &result);
            }
        }
        Commands::Evaluate {
            csv,
            bonus,
            cap,
            json,
        } => {
            let policy = BonusPolicy { bonus, cap };
            let students = roster::import_csv(&csv)?;
            let mut evaluated = Vec::with_capacity(students.len());

            for student in students {
                let result = rules::evaluate_with_policy(&student, policy);
                log_evaluation(&logger, &student, &result)?;
                evaluated.push((student, result));
            }

            if json {
                let payload: Vec<serde_json::Value> = evaluated
                    .iter()
                    .map(|(student, result)| {
                        serde_json::json!({ "student": student.name, "results": result })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for (student, result) in &evaluated {
                    print_evaluation(&student.name, result);
                }
            }
            info!(
                count = evaluated.len(),
                path = %logger.destination().display(),
                "evaluated roster"
            );
        }
        Commands::Fly { animal, json } => {
            let animal = match animal {
                Some(name) => name,
                None => read_animal(io::stdin().lock(), io::stdout(), !json)?,
            };
            let animal = animal.trim();
            let reasoning = FlightReasoner::new(KnowledgeBase::default()).can_fly(animal);

            if json {
                let payload = serde_json::json!({
                    "animal": animal,
                    "can_fly": reasoning.verdict.as_option(),
                    "verdict": reasoning.verdict,
                    "trace": reasoning.trace,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Reasoning trace:");
                for line in &reasoning.trace {
                    println!("{line}");
                }
                println!();
                println!("{}", flight::conclusion(animal, reasoning.verdict));
            }
        }
        Commands::Report { out } => {
            let rows = logger.read_rows().with_context(|| {
                format!("failed to read audit log {}", logger.destination().display())
            })?;
            let report = report::build_report(logger.destination(), &rows);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn log_evaluation(
    logger: &ResultLogger,
    student: &StudentRecord,
    result: &EvaluationResult,
) -> anyhow::Result<()> {
    logger
        .log_result(&student.name, result)
        .with_context(|| {
            format!(
                "failed to log {} to {}",
                student.name,
                logger.destination().display()
            )
        })
}

fn print_evaluation(name: &str, result: &EvaluationResult) {
    println!();
    println!("Student: {name}");
    for (rule, outcome) in result.iter() {
        println!(" - {}: {} | {}", rule, bool_word(outcome.passed), outcome.detail);
    }
}

/// Reads one line naming an animal. The prompt is skipped when stdout
/// carries JSON.
fn read_animal(
    mut input: impl BufRead,
    mut out: impl Write,
    show_prompt: bool,
) -> anyhow::Result<String> {
    if show_prompt {
        write!(out, "Enter the name of an animal: ")?;
        out.flush()?;
    }
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("failed to read animal name from stdin")?;
    Ok(line)
}
