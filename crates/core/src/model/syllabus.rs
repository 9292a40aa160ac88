use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::Subject;

const BUILTIN_SYLLABUS: &str = include_str!("../../data/syllabus.json");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyllabusError {
    #[error("invalid syllabus document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown subject in syllabus: {0}")]
    UnknownSubject(String),

    #[error("syllabus names cannot be empty")]
    EmptyName,

    #[error("chapter {chapter:?} appears twice under {subject}")]
    DuplicateChapter { subject: Subject, chapter: String },

    #[error("microtopic {microtopic:?} appears twice in chapter {chapter:?}")]
    DuplicateMicrotopic { chapter: String, microtopic: String },
}

/// A chapter and its ordered microtopics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterOutline {
    name: String,
    microtopics: Vec<String>,
}

impl ChapterOutline {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn microtopics(&self) -> &[String] {
        &self.microtopics
    }

    #[must_use]
    pub fn contains(&self, microtopic: &str) -> bool {
        self.microtopics.iter().any(|m| m == microtopic)
    }
}

/// The fixed subject → chapter → microtopic taxonomy tasks are planned against.
///
/// Chapters and microtopics keep their declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Syllabus {
    subjects: BTreeMap<Subject, Vec<ChapterOutline>>,
}

impl Syllabus {
    /// An empty syllabus. Populate it with [`Syllabus::add_chapter`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The syllabus shipped with the crate.
    ///
    /// # Panics
    ///
    /// Panics if the bundled document is malformed, which the test suite rules out.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_SYLLABUS).expect("bundled syllabus should be valid")
    }

    /// Parse a syllabus document of the form
    /// `{ "Physics": [ { "name": "...", "microtopics": ["..."] } ] }`.
    ///
    /// # Errors
    ///
    /// Returns `SyllabusError` for malformed JSON, unknown subject keys,
    /// empty names, or duplicated chapters/microtopics.
    pub fn from_json(raw: &str) -> Result<Self, SyllabusError> {
        let doc: BTreeMap<String, Vec<ChapterOutline>> = serde_json::from_str(raw)?;
        let mut syllabus = Self::new();
        for (subject_name, chapters) in doc {
            let subject: Subject = subject_name
                .parse()
                .map_err(|_| SyllabusError::UnknownSubject(subject_name.clone()))?;
            for chapter in chapters {
                syllabus.add_chapter(subject, chapter.name, chapter.microtopics)?;
            }
        }
        Ok(syllabus)
    }

    /// Append a chapter under `subject`.
    ///
    /// # Errors
    ///
    /// Returns `SyllabusError::EmptyName`, `DuplicateChapter`, or `DuplicateMicrotopic`.
    pub fn add_chapter<I, S>(
        &mut self,
        subject: Subject,
        name: impl Into<String>,
        microtopics: I,
    ) -> Result<(), SyllabusError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(SyllabusError::EmptyName);
        }
        if self.chapter(subject, &name).is_some() {
            return Err(SyllabusError::DuplicateChapter {
                subject,
                chapter: name,
            });
        }

        let mut topics: Vec<String> = Vec::new();
        for topic in microtopics {
            let topic = topic.into().trim().to_string();
            if topic.is_empty() {
                return Err(SyllabusError::EmptyName);
            }
            if topics.contains(&topic) {
                return Err(SyllabusError::DuplicateMicrotopic {
                    chapter: name,
                    microtopic: topic,
                });
            }
            topics.push(topic);
        }

        self.subjects.entry(subject).or_default().push(ChapterOutline {
            name,
            microtopics: topics,
        });
        Ok(())
    }

    /// Chapters of `subject` in declared order; empty if the subject has none.
    #[must_use]
    pub fn chapters(&self, subject: Subject) -> &[ChapterOutline] {
        self.subjects
            .get(&subject)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn chapter(&self, subject: Subject, name: &str) -> Option<&ChapterOutline> {
        self.chapters(subject).iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn contains(&self, subject: Subject, chapter: &str, microtopic: &str) -> bool {
        self.chapter(subject, chapter)
            .is_some_and(|c| c.contains(microtopic))
    }

    /// Number of microtopics across all subjects.
    #[must_use]
    pub fn microtopic_count(&self) -> usize {
        self.subjects
            .values()
            .flatten()
            .map(|c| c.microtopics.len())
            .sum()
    }
}
