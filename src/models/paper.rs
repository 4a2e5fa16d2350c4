use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A past exam paper.
///
/// Flat resource: no hierarchy, addressed by position within its
/// container's list. Callers must re-fetch the container after a mutation;
/// there is no optimistic-lock token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastPaper {
    pub year: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_number: Option<String>,
    pub pdf_url: String,
    /// Human-readable size, e.g. `"2.4 MB"`.
    #[serde(default)]
    pub file_size: String,
    /// Duration in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_marks: Option<u32>,
}

impl PastPaper {
    /// Field-level validation, applied before any persistence call.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.year.trim().is_empty() {
            return Err(AppError::BadRequest("Year cannot be empty".into()));
        }
        if self.title.trim().is_empty() {
            return Err(AppError::BadRequest("Title cannot be empty".into()));
        }
        if self.pdf_url.trim().is_empty() {
            return Err(AppError::BadRequest("PDF URL cannot be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_paper() -> PastPaper {
        PastPaper {
            year: "2024".to_string(),
            title: "Paper 1 (Non-calculator)".to_string(),
            paper_number: Some("1H".to_string()),
            pdf_url: "/assets/2024-paper-1h.pdf".to_string(),
            file_size: "1.8 MB".to_string(),
            duration: Some(90),
            total_marks: Some(80),
        }
    }

    #[test]
    fn test_valid_paper_passes() {
        assert!(sample_paper().validate().is_ok());
    }

    #[test]
    fn test_rejects_missing_pdf_url() {
        let mut paper = sample_paper();
        paper.pdf_url = String::new();
        match paper.validate().unwrap_err() {
            AppError::BadRequest(msg) => assert!(msg.contains("PDF URL")),
            other => panic!("Expected BadRequest, got: {:?}", other),
        }
    }

    #[test]
    fn test_optional_fields_omitted_from_json() {
        let paper = PastPaper {
            paper_number: None,
            duration: None,
            total_marks: None,
            ..sample_paper()
        };
        let json = serde_json::to_string(&paper).unwrap();
        assert!(!json.contains("paperNumber"));
        assert!(!json.contains("duration"));
        assert!(json.contains("\"pdfUrl\""));
    }

    #[test]
    fn test_deserializes_minimal_paper() {
        let json = r###"{
            "year": "2023",
            "title": "Paper 2",
            "pdfUrl": "/assets/p2.pdf"
        }"###;
        let paper: PastPaper = serde_json::from_str(json).unwrap();
        assert_eq!(paper.paper_number, None);
        assert!(paper.file_size.is_empty());
        assert_eq!(paper.duration, None);
    }
}
