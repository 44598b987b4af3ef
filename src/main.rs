use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use critic::config::{self, Config, Credential};
use critic::review::{self, client, AnalysisResult};
use critic::store::{ReviewRecord, ReviewStore};
use critic::util::{language_from_extension, truncate_str};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "critic",
    about = "AI-assisted code review with a deterministic static fallback",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Review a source file
    Review {
        /// File to review
        path: PathBuf,

        /// Language tag (inferred from the file extension when omitted)
        #[arg(short, long)]
        language: Option<String>,

        /// Print the raw JSON report instead of the formatted view
        #[arg(long)]
        json: bool,

        /// Skip the upstream model and use the static path only
        #[arg(long)]
        offline: bool,

        /// Do not persist the report
        #[arg(long)]
        no_save: bool,
    },

    /// List recent reviews
    List {
        /// Maximum number of reviews to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Show a stored review by id
    Show { id: Uuid },

    /// Delete a stored review by id
    Delete { id: Uuid },

    /// Configure the upstream API key
    Setup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Review {
            path,
            language,
            json,
            offline,
            no_save,
        } => run_review(path, language, json, offline, no_save).await,
        Command::List { limit } => run_list(limit),
        Command::Show { id } => run_show(id),
        Command::Delete { id } => run_delete(id),
        Command::Setup => config::setup_interactive(),
    }
}

async fn run_review(
    path: PathBuf,
    language: Option<String>,
    json: bool,
    offline: bool,
    no_save: bool,
) -> Result<()> {
    let code = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let language = language.unwrap_or_else(|| {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        language_from_extension(ext).to_string()
    });

    let upstream = if offline {
        None
    } else {
        fetch_upstream(&code, &language).await
    };

    let result = review::analyze(&code, &language, upstream.as_deref());

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&filename, &language, &result);
    }

    if !no_save {
        let record = ReviewRecord::new(filename, language, result);
        let id = record.id;
        match ReviewStore::open_default().and_then(|store| store.add(record)) {
            Ok(()) => {
                if !json {
                    println!("  Saved as {}", id);
                }
            }
            Err(err) => eprintln!("  Warning: Could not save review: {}", err),
        }
    }

    Ok(())
}

/// Fetch the raw upstream response, or None for any failure.
///
/// Absence of a credential and a failed call are handled identically: the
/// engine falls back to the static path and the review still completes.
async fn fetch_upstream(code: &str, language: &str) -> Option<String> {
    let credential = Config::load().credential();
    if let Credential::Unconfigured = credential {
        eprintln!("  No API key configured. Using static fallback mode.");
        return None;
    }

    match client::request_review(code, language, &credential).await {
        Ok(response) => {
            if let Some(usage) = &response.usage {
                if usage.cost() > 0.0 {
                    eprintln!("  Upstream review: {} tokens (${:.4})", usage.total_tokens, usage.cost());
                }
            }
            Some(response.content)
        }
        Err(err) => {
            eprintln!("  Warning: Upstream review failed ({}). Using static fallback.", err);
            None
        }
    }
}

fn run_list(limit: usize) -> Result<()> {
    let store = ReviewStore::open_default()?;
    let records = store.list(limit)?;

    if records.is_empty() {
        println!("No reviews stored yet.");
        return Ok(());
    }

    for record in records {
        println!(
            "{}  {:>5.1}  {:<12} {}  ({})",
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.result.score,
            record.language,
            record.filename,
            record.id
        );
    }
    Ok(())
}

fn run_show(id: Uuid) -> Result<()> {
    let store = ReviewStore::open_default()?;
    let record = store
        .get(id)?
        .with_context(|| format!("No review with id {}", id))?;
    print_report(&record.filename, &record.language, &record.result);
    Ok(())
}

fn run_delete(id: Uuid) -> Result<()> {
    let store = ReviewStore::open_default()?;
    if store.delete(id)? {
        println!("Review {} deleted.", id);
    } else {
        println!("No review with id {}.", id);
    }
    Ok(())
}

fn print_report(filename: &str, language: &str, result: &AnalysisResult) {
    println!();
    println!("  {} ({})", filename, language);
    println!("  Score: {:.0}/100", result.score);
    println!("  {}", result.summary);
    println!();

    if result.issues.is_empty() {
        println!("  No issues found.");
    } else {
        println!("  Issues:");
        for issue in &result.issues {
            println!(
                "    [{}] line {}: {} ({})",
                issue.severity.label(),
                issue.line,
                truncate_str(&issue.message, 100),
                issue.category
            );
        }
    }

    if !result.suggestions.is_empty() {
        println!();
        println!("  Suggestions:");
        for (i, suggestion) in result.suggestions.iter().enumerate() {
            println!("    {}. {}", i + 1, suggestion);
        }
    }

    let m = &result.metrics;
    println!();
    println!(
        "  {} lines | {} functions | {} classes | complexity {}/10 | {} duplicate lines",
        m.lines, m.functions, m.classes, m.complexity, m.duplicates
    );
    if let Some(coverage) = m.test_coverage {
        println!("  Test coverage: {:.0}%", coverage * 100.0);
    }
    println!();
}
