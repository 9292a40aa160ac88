use std::fmt::{self, Write};

use clap::Parser;
use services::{AppServices, Clock, load_syllabus};
use study_core::model::TaskDraft;
use tracing_subscriber::EnvFilter;

mod cli;
mod render;
mod seed;

use cli::{Cli, Commands};

#[derive(Debug)]
enum UsageError {
    InvalidDbUrl { raw: String },
    MissingFeedback,
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            UsageError::MissingFeedback => {
                write!(f, "complete needs --difficulty, or --total with --correct")
            }
        }
    }
}

impl std::error::Error for UsageError {}

fn is_in_memory(db_url: &str) -> bool {
    db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:")
}

/// Turn a bare path or a relative `sqlite:` URL into `sqlite://<absolute path>`.
fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_in_memory(trimmed) {
        return trimmed.to_string();
    }

    let rest = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let (path_str, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    match query {
        Some(query) => format!("sqlite://{}?{query}", absolute.display()),
        None => format!("sqlite://{}", absolute.display()),
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if is_in_memory(db_url) {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| UsageError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(UsageError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let db_url = normalize_sqlite_url(&cli.db_url);
    prepare_sqlite_file(&db_url)?;
    let syllabus = load_syllabus(cli.syllabus.as_deref())?;
    let services = AppServices::new_sqlite(&db_url, Clock::default_clock(), syllabus).await?;
    let planner = services.planner();

    let mut out = String::new();
    match cli.command {
        Commands::Add {
            subject,
            chapter,
            microtopic,
            task_type,
            date,
        } => {
            let draft = TaskDraft {
                subject,
                chapter,
                microtopic,
                task_type,
                date: date.unwrap_or_else(|| planner.today()),
            };
            let task = planner.add_task(draft).await?;
            render::write_task(&mut out, &task)?;
        }
        Commands::Complete {
            id,
            difficulty,
            total,
            correct,
        } => {
            let task = match (difficulty, total, correct) {
                (Some(difficulty), _, _) => planner.complete_study(id, difficulty).await?,
                (None, Some(total), Some(correct)) => {
                    planner.complete_practice(id, total, correct).await?
                }
                _ => return Err(UsageError::MissingFeedback.into()),
            };
            render::write_task(&mut out, &task)?;
        }
        Commands::Delete { id } => {
            let task = planner.delete_task(id).await?;
            render::write_task(&mut out, &task)?;
        }
        Commands::Plan => {
            render::write_agenda(&mut out, &planner.agenda().await?)?;
        }
        Commands::Stats { json } => {
            let stats = services.progress().progress().await?;
            if json {
                out = serde_json::to_string_pretty(&stats)?;
                out.push('\n');
            } else {
                render::write_stats(&mut out, &stats)?;
            }
        }
        Commands::Seed { tasks, start } => {
            let start = start.unwrap_or_else(|| planner.today());
            let seeded = seed::seed_demo(&planner, start, tasks).await?;
            writeln!(out, "Seeded {} tasks starting {start}", seeded.len())?;
        }
        Commands::Syllabus { subject } => {
            render::write_syllabus(&mut out, &services.syllabus(), subject)?;
        }
    }

    print!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
