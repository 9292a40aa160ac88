//! Plain-text views for the terminal.

use std::fmt::{self, Write};

use services::AgendaDay;
use study_core::model::{Subject, Syllabus, Task, TaskStatus};
use study_core::{ProgressStats, StatsNode};

const NAME_WIDTH: usize = 36;

/// An average of zero means "no samples" and renders as `N/A`.
fn average(value: f64, precision: usize, suffix: &str) -> String {
    if value == 0.0 {
        "N/A".to_string()
    } else {
        format!("{value:.precision$}{suffix}")
    }
}

fn node_row(out: &mut impl Write, depth: usize, name: &str, node: &StatsNode) -> fmt::Result {
    let indent = "  ".repeat(depth);
    let width = NAME_WIDTH.saturating_sub(indent.len());
    writeln!(
        out,
        "{indent}{name:<width$} {total:>4} {done:>4} {rate:>7.1}% {difficulty:>10} {accuracy:>9}",
        total = node.total(),
        done = node.completed(),
        rate = node.completion_rate(),
        difficulty = average(node.avg_difficulty(), 2, ""),
        accuracy = average(node.avg_accuracy(), 1, "%"),
    )
}

/// One line per subject, all four of them: its share of the completed tasks
/// in the breakdown and its feedback averages.
pub fn write_subject_summary(out: &mut impl Write, stats: &ProgressStats) -> fmt::Result {
    let completed: usize = stats.subjects().map(|(_, s)| s.stats().completed()).sum();
    writeln!(out, "By subject:")?;
    for (subject, subject_stats) in stats.subjects() {
        let node = subject_stats.stats();
        #[allow(clippy::cast_precision_loss)]
        let share = if completed == 0 {
            0.0
        } else {
            node.completed() as f64 / completed as f64 * 100.0
        };
        writeln!(
            out,
            "  {name:<10} completed {done} ({share:.0}%)  difficulty {difficulty}  accuracy {accuracy}",
            name = subject.as_str(),
            done = node.completed(),
            difficulty = average(node.avg_difficulty(), 2, ""),
            accuracy = average(node.avg_accuracy(), 1, "%"),
        )?;
    }
    Ok(())
}

/// Overall figures, the per-subject summary, then the subject → chapter →
/// microtopic table.
///
/// Only nodes with at least one task are listed in the table.
pub fn write_stats(out: &mut impl Write, stats: &ProgressStats) -> fmt::Result {
    writeln!(out, "Completion: {:.1}%", stats.completion_rate())?;
    writeln!(out, "Completed:  {}", stats.completed_tasks())?;
    writeln!(out, "Pending:    {}", stats.pending_tasks())?;
    writeln!(out)?;
    write_subject_summary(out, stats)?;
    writeln!(out)?;

    if stats.active_subjects().next().is_none() {
        return writeln!(out, "No tasks to break down yet.");
    }

    writeln!(
        out,
        "{:<NAME_WIDTH$} {:>4} {:>4} {:>8} {:>10} {:>9}",
        "Topic", "All", "Done", "Rate", "Difficulty", "Accuracy"
    )?;
    for (subject, subject_stats) in stats.active_subjects() {
        node_row(out, 0, subject.as_str(), subject_stats.stats())?;
        for (chapter, chapter_stats) in subject_stats.active_chapters() {
            node_row(out, 1, chapter, chapter_stats.stats())?;
            for (microtopic, node) in chapter_stats.active_microtopics() {
                node_row(out, 2, microtopic, node)?;
            }
        }
    }
    Ok(())
}

fn task_line(out: &mut impl Write, task: &Task) -> fmt::Result {
    let mark = match task.status() {
        TaskStatus::Pending => ' ',
        TaskStatus::Completed => 'x',
    };
    write!(
        out,
        "  #{id:<4} [{mark}] {kind:<8} {subject} / {chapter} / {microtopic}",
        id = task.id(),
        kind = task.task_type().as_str(),
        subject = task.subject(),
        chapter = task.chapter(),
        microtopic = task.microtopic(),
    )?;
    if task.is_completed() {
        if let Some(difficulty) = task.difficulty() {
            write!(out, "  (difficulty {difficulty})")?;
        }
        if let Some(result) = task.practice() {
            write!(
                out,
                "  ({}/{} correct)",
                result.correct_answers(),
                result.total_questions()
            )?;
        }
    }
    writeln!(out)
}

/// One block per date, earliest first.
pub fn write_agenda(out: &mut impl Write, agenda: &[AgendaDay]) -> fmt::Result {
    if agenda.is_empty() {
        return writeln!(out, "Nothing planned.");
    }
    for day in agenda {
        writeln!(out, "{}", day.date.format("%Y-%m-%d (%a)"))?;
        for task in &day.tasks {
            task_line(out, task)?;
        }
    }
    Ok(())
}

pub fn write_task(out: &mut impl Write, task: &Task) -> fmt::Result {
    writeln!(out, "{}", task.date())?;
    task_line(out, task)
}

pub fn write_syllabus(
    out: &mut impl Write,
    syllabus: &Syllabus,
    only: Option<Subject>,
) -> fmt::Result {
    for subject in Subject::ALL {
        if only.is_some_and(|wanted| wanted != subject) {
            continue;
        }
        writeln!(out, "{subject}")?;
        for chapter in syllabus.chapters(subject) {
            writeln!(out, "  {}", chapter.name())?;
            for microtopic in chapter.microtopics() {
                writeln!(out, "    - {microtopic}")?;
            }
        }
    }
    Ok(())
}
