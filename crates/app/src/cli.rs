//! Command-line definitions for the `study` binary.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use study_core::model::{Subject, TaskId, TaskType};

/// Plan study tasks and track progress across the syllabus.
#[derive(Parser, Debug)]
#[command(name = "study")]
#[command(author, version, about = "Plan study tasks and track syllabus progress", long_about = None)]
pub struct Cli {
    /// SQLite database URL or path
    #[arg(
        long = "db",
        global = true,
        env = "STUDY_DB_URL",
        default_value = "sqlite://study.sqlite3"
    )]
    pub db_url: String,

    /// JSON syllabus to use instead of the built-in one
    #[arg(long, global = true, env = "STUDY_SYLLABUS")]
    pub syllabus: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan a new task for a syllabus microtopic
    Add {
        /// Physics, Chemistry, Botany or Zoology
        #[arg(long)]
        subject: Subject,

        #[arg(long)]
        chapter: String,

        #[arg(long)]
        microtopic: String,

        /// study, revision or practice
        #[arg(long = "type", default_value = "study")]
        task_type: TaskType,

        /// Scheduled date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Mark a task as done with its feedback
    ///
    /// Study and revision tasks take `--difficulty`; practice tasks take
    /// `--total` and `--correct`.
    Complete {
        id: TaskId,

        /// How hard the session felt, 1 (easy) to 5 (hard)
        #[arg(long, conflicts_with_all = ["total", "correct"])]
        difficulty: Option<u8>,

        /// Questions attempted
        #[arg(long, requires = "correct")]
        total: Option<u32>,

        /// Questions answered correctly
        #[arg(long, requires = "total")]
        correct: Option<u32>,
    },

    /// Remove a task from the plan
    Delete { id: TaskId },

    /// Show the plan grouped by date
    Plan,

    /// Show completion and performance statistics
    Stats {
        /// Print the full statistics tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Append a demo plan, completing the first half of it
    Seed {
        /// Number of tasks to add
        #[arg(long, default_value_t = 12)]
        tasks: u32,

        /// Date of the first task (YYYY-MM-DD); defaults to today
        #[arg(long)]
        start: Option<NaiveDate>,
    },

    /// List subjects, chapters and microtopics
    Syllabus {
        /// Only show one subject
        #[arg(long)]
        subject: Option<Subject>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_defaults() {
        let cli = Cli::try_parse_from([
            "study",
            "add",
            "--subject",
            "physics",
            "--chapter",
            "Kinematics",
            "--microtopic",
            "Projectile Motion",
        ])
        .unwrap();
        match cli.command {
            Commands::Add {
                subject,
                task_type,
                date,
                ..
            } => {
                assert_eq!(subject, Subject::Physics);
                assert_eq!(task_type, TaskType::Study);
                assert_eq!(date, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_practice_completion() {
        let cli = Cli::try_parse_from(["study", "complete", "3", "--total", "20", "--correct", "15"])
            .unwrap();
        match cli.command {
            Commands::Complete {
                id,
                difficulty,
                total,
                correct,
            } => {
                assert_eq!(id, TaskId::new(3));
                assert_eq!(difficulty, None);
                assert_eq!((total, correct), (Some(20), Some(15)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_mixed_feedback() {
        let err = Cli::try_parse_from([
            "study",
            "complete",
            "3",
            "--difficulty",
            "2",
            "--total",
            "10",
            "--correct",
            "5",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_seed_with_start_date() {
        let cli = Cli::try_parse_from([
            "study",
            "--db",
            "sqlite::memory:",
            "seed",
            "--start",
            "2024-03-01",
        ])
        .unwrap();
        assert_eq!(cli.db_url, "sqlite::memory:");
        match cli.command {
            Commands::Seed { tasks, start } => {
                assert_eq!(tasks, 12);
                assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 1));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_subject() {
        assert!(Cli::try_parse_from(["study", "syllabus", "--subject", "maths"]).is_err());
    }
}
