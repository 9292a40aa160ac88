//! Progress aggregation: folds a flat task list into subject → chapter →
//! microtopic statistics.
//!
//! The tree is a pure projection of `(syllabus, tasks)`. It is rebuilt from
//! scratch on every call and never patched in place.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::model::{Difficulty, PracticeResult, Subject, Syllabus, Task};

//
// ─── ACCUMULATORS ──────────────────────────────────────────────────────────────
//

/// Running sum/count; only the mean is ever read.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct RunningMean {
    sum: f64,
    samples: u32,
}

impl RunningMean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.samples = self.samples.saturating_add(1);
    }

    fn mean(self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.sum / f64::from(self.samples)
        }
    }
}

/// What a single resolved task adds to every node on its path.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Contribution {
    completed: bool,
    difficulty: Option<f64>,
    accuracy: Option<f64>,
}

impl Contribution {
    /// Pending tasks only count towards `total`, whatever feedback they carry.
    /// A stored rating outside 1..=5 is not a difficulty sample.
    fn of(task: &Task) -> Self {
        if !task.is_completed() {
            return Self {
                completed: false,
                difficulty: None,
                accuracy: None,
            };
        }
        Self {
            completed: true,
            difficulty: task
                .difficulty()
                .and_then(|raw| Difficulty::new(raw).ok())
                .map(|rating| f64::from(rating.value())),
            accuracy: task.practice().and_then(PracticeResult::accuracy),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

//
// ─── STATS NODE ────────────────────────────────────────────────────────────────
//

/// Counts, completion rate and feedback averages for one node of the tree.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsNode {
    total: usize,
    completed: usize,
    completion_rate: f64,
    avg_difficulty: f64,
    avg_accuracy: f64,
    #[serde(skip)]
    difficulty: RunningMean,
    #[serde(skip)]
    accuracy: RunningMean,
}

impl StatsNode {
    fn record(&mut self, contribution: &Contribution) {
        self.total += 1;
        if contribution.completed {
            self.completed += 1;
        }
        if let Some(value) = contribution.difficulty {
            self.difficulty.push(value);
        }
        if let Some(value) = contribution.accuracy {
            self.accuracy.push(value);
        }
    }

    fn finalize(&mut self) {
        self.completion_rate = percentage(self.completed, self.total);
        self.avg_difficulty = self.difficulty.mean();
        self.avg_accuracy = self.accuracy.mean();
    }

    /// Tasks planned at this node or below.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.total - self.completed
    }

    /// `completed / total × 100`, or 0 for an empty node.
    #[must_use]
    pub fn completion_rate(&self) -> f64 {
        self.completion_rate
    }

    /// Mean difficulty of completed study/revision tasks, or 0 if none.
    #[must_use]
    pub fn avg_difficulty(&self) -> f64 {
        self.avg_difficulty
    }

    /// Mean accuracy percentage of completed practice tasks, or 0 if none.
    #[must_use]
    pub fn avg_accuracy(&self) -> f64 {
        self.avg_accuracy
    }

    #[must_use]
    pub fn has_tasks(&self) -> bool {
        self.total > 0
    }
}

/// Microtopics are leaves: a bare stats node.
pub type MicrotopicStats = StatsNode;

//
// ─── BREAKDOWN ─────────────────────────────────────────────────────────────────
//

/// Named child nodes in syllabus order with keyed lookup. Serializes as a
/// JSON object whose keys keep that order.
pub type Breakdown<T> = IndexMap<String, T>;

//
// ─── CHAPTER / SUBJECT ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ChapterStats {
    #[serde(flatten)]
    stats: StatsNode,
    microtopics: Breakdown<MicrotopicStats>,
}

impl ChapterStats {
    #[must_use]
    pub fn stats(&self) -> &StatsNode {
        &self.stats
    }

    #[must_use]
    pub fn microtopics(&self) -> &Breakdown<MicrotopicStats> {
        &self.microtopics
    }

    #[must_use]
    pub fn microtopic(&self, name: &str) -> Option<&MicrotopicStats> {
        self.microtopics.get(name)
    }

    /// Microtopics with at least one task, in syllabus order.
    pub fn active_microtopics(&self) -> impl Iterator<Item = (&str, &MicrotopicStats)> {
        self.microtopics
            .iter()
            .filter(|(_, node)| node.has_tasks())
            .map(|(name, node)| (name.as_str(), node))
    }

    fn finalize(&mut self) {
        self.stats.finalize();
        self.microtopics.values_mut().for_each(StatsNode::finalize);
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct SubjectStats {
    #[serde(flatten)]
    stats: StatsNode,
    chapters: Breakdown<ChapterStats>,
}

impl SubjectStats {
    /// Zeroed node with every chapter and microtopic the syllabus lists.
    fn shell(syllabus: &Syllabus, subject: Subject) -> Self {
        let chapters = syllabus
            .chapters(subject)
            .iter()
            .map(|outline| {
                let microtopics = outline
                    .microtopics()
                    .iter()
                    .map(|topic| (topic.clone(), StatsNode::default()))
                    .collect();
                let chapter = ChapterStats {
                    stats: StatsNode::default(),
                    microtopics,
                };
                (outline.name().to_string(), chapter)
            })
            .collect();
        Self {
            stats: StatsNode::default(),
            chapters,
        }
    }

    /// Applies the contribution along the path. Returns `false`, touching
    /// nothing, when the chapter or microtopic is not in the tree.
    fn record(&mut self, chapter: &str, microtopic: &str, contribution: &Contribution) -> bool {
        let Some(chapter) = self.chapters.get_mut(chapter) else {
            return false;
        };
        let Some(topic) = chapter.microtopics.get_mut(microtopic) else {
            return false;
        };
        topic.record(contribution);
        chapter.stats.record(contribution);
        self.stats.record(contribution);
        true
    }

    fn finalize(&mut self) {
        self.stats.finalize();
        self.chapters.values_mut().for_each(ChapterStats::finalize);
    }

    #[must_use]
    pub fn stats(&self) -> &StatsNode {
        &self.stats
    }

    #[must_use]
    pub fn chapters(&self) -> &Breakdown<ChapterStats> {
        &self.chapters
    }

    #[must_use]
    pub fn chapter(&self, name: &str) -> Option<&ChapterStats> {
        self.chapters.get(name)
    }

    /// Chapters with at least one task, in syllabus order.
    pub fn active_chapters(&self) -> impl Iterator<Item = (&str, &ChapterStats)> {
        self.chapters
            .iter()
            .filter(|(_, chapter)| chapter.stats.has_tasks())
            .map(|(name, chapter)| (name.as_str(), chapter))
    }
}

//
// ─── ROOT ──────────────────────────────────────────────────────────────────────
//

/// Root of the statistics tree.
///
/// `total_tasks` and `completed_tasks` count the raw task list, including
/// tasks whose syllabus path does not resolve; those tasks are absent from
/// the per-subject breakdown.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    total_tasks: usize,
    completed_tasks: usize,
    completion_rate: f64,
    subjects: BTreeMap<Subject, SubjectStats>,
}

impl ProgressStats {
    #[must_use]
    pub fn total_tasks(&self) -> usize {
        self.total_tasks
    }

    #[must_use]
    pub fn completed_tasks(&self) -> usize {
        self.completed_tasks
    }

    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.total_tasks - self.completed_tasks
    }

    #[must_use]
    pub fn completion_rate(&self) -> f64 {
        self.completion_rate
    }

    /// All four subjects in canonical order.
    pub fn subjects(&self) -> impl Iterator<Item = (Subject, &SubjectStats)> {
        self.subjects.iter().map(|(subject, stats)| (*subject, stats))
    }

    /// Subjects with at least one task on a resolvable path.
    pub fn active_subjects(&self) -> impl Iterator<Item = (Subject, &SubjectStats)> {
        self.subjects().filter(|(_, stats)| stats.stats.has_tasks())
    }

    #[must_use]
    pub fn subject(&self, subject: Subject) -> Option<&SubjectStats> {
        self.subjects.get(&subject)
    }

    #[must_use]
    pub fn microtopic(
        &self,
        subject: Subject,
        chapter: &str,
        microtopic: &str,
    ) -> Option<&MicrotopicStats> {
        self.subject(subject)?.chapter(chapter)?.microtopic(microtopic)
    }

    /// Tasks that made it into the breakdown (sum of subject totals).
    #[must_use]
    pub fn resolved_tasks(&self) -> usize {
        self.subjects.values().map(|s| s.stats.total).sum()
    }

    /// Tasks counted at the root but skipped by the breakdown.
    #[must_use]
    pub fn unresolved_tasks(&self) -> usize {
        self.total_tasks - self.resolved_tasks()
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Fold `tasks` into a statistics tree shaped by `syllabus`.
///
/// Every subject, chapter and microtopic in the syllabus gets a node, even
/// without tasks. A task whose chapter or microtopic is unknown is skipped
/// by the breakdown but still counted in the root totals. Never fails;
/// empty nodes report zero rates and averages.
#[must_use]
pub fn aggregate(syllabus: &Syllabus, tasks: &[Task]) -> ProgressStats {
    let mut subjects: BTreeMap<Subject, SubjectStats> = Subject::ALL
        .into_iter()
        .map(|subject| (subject, SubjectStats::shell(syllabus, subject)))
        .collect();

    for task in tasks {
        let Some(subject) = subjects.get_mut(&task.subject()) else {
            continue;
        };
        subject.record(task.chapter(), task.microtopic(), &Contribution::of(task));
    }

    subjects.values_mut().for_each(SubjectStats::finalize);

    let total_tasks = tasks.len();
    let completed_tasks = tasks.iter().filter(|task| task.is_completed()).count();

    ProgressStats {
        total_tasks,
        completed_tasks,
        completion_rate: percentage(completed_tasks, total_tasks),
        subjects,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
