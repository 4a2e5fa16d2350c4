use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AppError;
use crate::ordering::Ordered;

/// Number of options every multiple-choice question carries.
pub const MCQ_OPTION_COUNT: usize = 4;

/// Difficulty rating of an exam question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl Difficulty {
    /// Parse a difficulty from a string (case-insensitive).
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

fn default_marks() -> u32 {
    1
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mcq {
    pub question: String,
    /// Exactly four entries once validated.
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_option: usize,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_marks")]
    pub marks: u32,
}

impl Mcq {
    /// Field-level validation, applied before any persistence call.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.question.trim().is_empty() {
            return Err(AppError::BadRequest("Question text cannot be empty".into()));
        }
        if self.options.len() != MCQ_OPTION_COUNT {
            return Err(AppError::BadRequest(format!(
                "Expected {} options, got {}",
                MCQ_OPTION_COUNT,
                self.options.len()
            )));
        }
        if self.correct_option >= self.options.len() {
            return Err(AppError::BadRequest(format!(
                "Correct option index {} is out of range",
                self.correct_option
            )));
        }
        if self.marks == 0 {
            return Err(AppError::BadRequest("Marks must be a positive integer".into()));
        }
        Ok(())
    }
}

/// Second-level node of the exam-questions hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubSection {
    pub title: String,
    pub order: i32,
    #[serde(default)]
    pub questions: Vec<Mcq>,
}

impl SubSection {
    pub fn new(order: i32, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            order,
            questions: Vec::new(),
        }
    }
}

/// Top-level node of the exam-questions hierarchy.
///
/// Shares the shape of the revision-notes tree but carries question banks
/// instead of free content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamTopic {
    pub title: String,
    pub order: i32,
    #[serde(default)]
    pub sub_sections: Vec<SubSection>,
}

impl ExamTopic {
    pub fn new(order: i32, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            order,
            sub_sections: Vec::new(),
        }
    }
}

impl Ordered for ExamTopic {
    fn order(&self) -> i32 {
        self.order
    }
}

impl Ordered for SubSection {
    fn order(&self) -> i32 {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mcq() -> Mcq {
        Mcq {
            question: "What is 2 + 2?".to_string(),
            options: vec!["3".into(), "4".into(), "5".into(), "22".into()],
            correct_option: 1,
            explanation: "Basic addition.".to_string(),
            difficulty: Difficulty::Easy,
            marks: 1,
        }
    }

    #[test]
    fn test_valid_mcq_passes() {
        assert!(sample_mcq().validate().is_ok());
    }

    #[test]
    fn test_rejects_three_options() {
        let mut mcq = sample_mcq();
        mcq.options = vec!["a".into(), "b".into(), "c".into()];
        match mcq.validate().unwrap_err() {
            AppError::BadRequest(msg) => assert!(msg.contains("4 options")),
            other => panic!("Expected BadRequest, got: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_out_of_range_answer() {
        let mut mcq = sample_mcq();
        mcq.correct_option = 4;
        assert!(matches!(mcq.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_rejects_empty_question() {
        let mut mcq = sample_mcq();
        mcq.question = "   ".to_string();
        assert!(matches!(mcq.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_rejects_zero_marks() {
        let mut mcq = sample_mcq();
        mcq.marks = 0;
        assert!(matches!(mcq.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_difficulty_from_str_ci() {
        assert_eq!(Difficulty::from_str_ci("Easy"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_str_ci("MEDIUM"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_str_ci("hard"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str_ci("brutal"), None);
    }

    #[test]
    fn test_mcq_deserialization_defaults() {
        let json = r###"{
            "question": "Pick one",
            "options": ["a", "b", "c", "d"],
            "correctOption": 0
        }"###;
        let mcq: Mcq = serde_json::from_str(json).unwrap();
        assert_eq!(mcq.marks, 1);
        assert_eq!(mcq.difficulty, Difficulty::Medium);
        assert!(mcq.explanation.is_empty());
    }

    #[test]
    fn test_difficulty_serializes_lowercase() {
        let json = serde_json::to_string(&Difficulty::Hard).unwrap();
        assert_eq!(json, "\"hard\"");
    }
}
