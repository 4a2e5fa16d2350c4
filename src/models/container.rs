use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AppError;
use crate::models::notes::Topic;
use crate::models::paper::PastPaper;
use crate::models::question::ExamTopic;

/// The three resource kinds every container holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    ExamQuestions,
    RevisionNotes,
    PastPapers,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::ExamQuestions => write!(f, "exam questions"),
            ResourceKind::RevisionNotes => write!(f, "revision notes"),
            ResourceKind::PastPapers => write!(f, "past papers"),
        }
    }
}

impl ResourceKind {
    /// Parse a resource kind from a string (case-insensitive, separator-agnostic).
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "examquestions" => Some(ResourceKind::ExamQuestions),
            "revisionnotes" => Some(ResourceKind::RevisionNotes),
            "pastpapers" => Some(ResourceKind::PastPapers),
            _ => None,
        }
    }

    /// BSON field name of this kind's section inside a container document.
    pub fn field_name(&self) -> &'static str {
        match self {
            ResourceKind::ExamQuestions => "examQuestions",
            ResourceKind::RevisionNotes => "revisionNotes",
            ResourceKind::PastPapers => "pastPapers",
        }
    }
}

/// Exam-questions section of a container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamQuestions {
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub topics: Vec<ExamTopic>,
}

/// Revision-notes section of a container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionNotes {
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// Past-papers section of a container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastPapers {
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub papers: Vec<PastPaper>,
}

/// Per-kind visibility and volume, shown on the admin course catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStats {
    pub count: usize,
    pub enabled: bool,
}

/// The per-(subject, course, exam board) aggregate holding the three
/// resource kinds and their enable flags.
///
/// Corresponds to the `resources` collection. Disabling a kind only hides
/// it from students; content is never deleted by a toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContainer {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub subject: String,
    pub course: String,
    pub exam_board: String,
    #[serde(default)]
    pub exam_questions: ExamQuestions,
    #[serde(default)]
    pub revision_notes: RevisionNotes,
    #[serde(default)]
    pub past_papers: PastPapers,
    pub last_updated: DateTime<Utc>,
}

impl ResourceContainer {
    pub fn new(
        subject: impl Into<String>,
        course: impl Into<String>,
        exam_board: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            subject: subject.into(),
            course: course.into(),
            exam_board: exam_board.into(),
            exam_questions: ExamQuestions::default(),
            revision_notes: RevisionNotes::default(),
            past_papers: PastPapers::default(),
            last_updated: Utc::now(),
        }
    }

    /// Count/enabled rollup for one resource kind.
    ///
    /// Exam questions count every MCQ across all topics and sub-sections.
    /// Revision notes count top-level topics only; sub-topics are
    /// deliberately excluded from this rollup.
    pub fn stats(&self, kind: ResourceKind) -> ResourceStats {
        match kind {
            ResourceKind::ExamQuestions => ResourceStats {
                count: self
                    .exam_questions
                    .topics
                    .iter()
                    .map(|topic| {
                        topic
                            .sub_sections
                            .iter()
                            .map(|section| section.questions.len())
                            .sum::<usize>()
                    })
                    .sum(),
                enabled: self.exam_questions.is_enabled,
            },
            ResourceKind::RevisionNotes => ResourceStats {
                count: self.revision_notes.topics.len(),
                enabled: self.revision_notes.is_enabled,
            },
            ResourceKind::PastPapers => ResourceStats {
                count: self.past_papers.papers.len(),
                enabled: self.past_papers.is_enabled,
            },
        }
    }

    /// Idempotent visibility toggle. Counts and content are untouched.
    pub fn set_enabled(&mut self, kind: ResourceKind, enabled: bool) {
        match kind {
            ResourceKind::ExamQuestions => self.exam_questions.is_enabled = enabled,
            ResourceKind::RevisionNotes => self.revision_notes.is_enabled = enabled,
            ResourceKind::PastPapers => self.past_papers.is_enabled = enabled,
        }
    }

    /// Replace the past paper at `index`.
    pub fn update_paper(&mut self, index: usize, paper: PastPaper) -> Result<(), AppError> {
        let slot = self
            .past_papers
            .papers
            .get_mut(index)
            .ok_or_else(|| AppError::NotFound(format!("No past paper at index {index}")))?;
        *slot = paper;
        Ok(())
    }

    /// Remove and return the past paper at `index`.
    pub fn remove_paper(&mut self, index: usize) -> Result<PastPaper, AppError> {
        if index >= self.past_papers.papers.len() {
            return Err(AppError::NotFound(format!("No past paper at index {index}")));
        }
        Ok(self.past_papers.papers.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Mcq, SubSection};

    fn mcq(question: &str) -> Mcq {
        Mcq {
            question: question.to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_option: 0,
            explanation: String::new(),
            difficulty: Default::default(),
            marks: 1,
        }
    }

    fn container_with_questions() -> ResourceContainer {
        let mut container = ResourceContainer::new("Mathematics", "IGCSE", "Edexcel");
        let mut algebra = ExamTopic::new(1, "Algebra");
        let mut linear = SubSection::new(1, "Linear equations");
        linear.questions.push(mcq("Solve x + 1 = 2"));
        linear.questions.push(mcq("Solve 2x = 6"));
        let mut quadratic = SubSection::new(2, "Quadratics");
        quadratic.questions.push(mcq("Factorise x^2 - 1"));
        algebra.sub_sections.push(linear);
        algebra.sub_sections.push(quadratic);
        container.exam_questions.topics.push(algebra);
        container
    }

    #[test]
    fn test_exam_question_count_spans_all_sections() {
        let container = container_with_questions();
        let stats = container.stats(ResourceKind::ExamQuestions);
        assert_eq!(stats.count, 3);
        assert!(!stats.enabled);
    }

    #[test]
    fn test_revision_note_count_is_top_level_only() {
        let mut container = ResourceContainer::new("Physics", "A-Level", "AQA");
        let mut topic = Topic::new(1, "Waves");
        topic
            .sub_topics
            .push(crate::models::notes::SubTopic::new(1, "Interference"));
        container.revision_notes.topics.push(topic);
        container.revision_notes.topics.push(Topic::new(2, "Fields"));

        let stats = container.stats(ResourceKind::RevisionNotes);
        assert_eq!(stats.count, 2);
    }

    #[test]
    fn test_set_enabled_is_idempotent_and_preserves_content() {
        let mut container = container_with_questions();
        container.set_enabled(ResourceKind::ExamQuestions, true);
        container.set_enabled(ResourceKind::ExamQuestions, true);

        let stats = container.stats(ResourceKind::ExamQuestions);
        assert!(stats.enabled);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn test_update_paper_out_of_range() {
        let mut container = ResourceContainer::new("Chemistry", "IGCSE", "CIE");
        let result = container.update_paper(
            0,
            PastPaper {
                year: "2024".into(),
                title: "Paper 1".into(),
                paper_number: None,
                pdf_url: "/assets/p1.pdf".into(),
                file_size: String::new(),
                duration: None,
                total_marks: None,
            },
        );
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_remove_paper_by_index() {
        let mut container = ResourceContainer::new("Chemistry", "IGCSE", "CIE");
        for year in ["2022", "2023", "2024"] {
            container.past_papers.papers.push(PastPaper {
                year: year.into(),
                title: format!("Paper {year}"),
                paper_number: None,
                pdf_url: format!("/assets/{year}.pdf"),
                file_size: String::new(),
                duration: None,
                total_marks: None,
            });
        }

        let removed = container.remove_paper(1).unwrap();
        assert_eq!(removed.year, "2023");
        assert_eq!(container.stats(ResourceKind::PastPapers).count, 2);
        assert_eq!(container.past_papers.papers[1].year, "2024");
    }

    #[test]
    fn test_resource_kind_from_str_ci() {
        assert_eq!(
            ResourceKind::from_str_ci("revision-notes"),
            Some(ResourceKind::RevisionNotes)
        );
        assert_eq!(
            ResourceKind::from_str_ci("ExamQuestions"),
            Some(ResourceKind::ExamQuestions)
        );
        assert_eq!(
            ResourceKind::from_str_ci("past papers"),
            Some(ResourceKind::PastPapers)
        );
        assert_eq!(ResourceKind::from_str_ci("flashcards"), None);
    }

    #[test]
    fn test_container_deserialization_defaults() {
        // Old documents may predate one or more sections.
        let json = r###"{
            "subject": "Biology",
            "course": "GCSE",
            "examBoard": "OCR",
            "lastUpdated": "2024-01-01T00:00:00Z"
        }"###;
        let container: ResourceContainer = serde_json::from_str(json).unwrap();
        assert!(!container.revision_notes.is_enabled);
        assert!(container.past_papers.papers.is_empty());
        assert_eq!(container.stats(ResourceKind::ExamQuestions).count, 0);
    }
}
