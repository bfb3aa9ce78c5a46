//! Form-level input rules checked before a hook is triggered.
//!
//! Hooks only guard against missing input; these rules cover sizes, file
//! types and minimum lengths.

use crate::types::{FileUpload, COMPARE_TEXTS_RANGE};
use thiserror::Error;

pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
pub const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf", ".docx"];
pub const TEXT_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".txt"];
pub const MIN_TEXT_CHARS: usize = 50;
pub const MIN_COMPARE_CHARS: usize = 10;
pub const MIN_QUESTION_CHARS: usize = 5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{filename} is larger than 10 MB")]
    FileTooLarge { filename: String },
    #[error("{filename}: only {} files are accepted", .accepted.join(", "))]
    UnsupportedFile {
        filename: String,
        accepted: Vec<String>,
    },
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("provide between 2 and 5 texts to compare")]
    TextCount,
}

/// File accepted for summarization: PDF or DOCX up to 10 MB
pub fn check_document(file: &FileUpload) -> Result<(), ValidationError> {
    check_file(file, DOCUMENT_EXTENSIONS)
}

/// File accepted by the text capabilities: PDF, DOCX or TXT up to 10 MB
pub fn check_text_file(file: &FileUpload) -> Result<(), ValidationError> {
    check_file(file, TEXT_EXTENSIONS)
}

fn check_file(file: &FileUpload, accepted: &[&str]) -> Result<(), ValidationError> {
    if file.size() > MAX_FILE_SIZE {
        return Err(ValidationError::FileTooLarge {
            filename: file.filename.clone(),
        });
    }
    let ext = file.extension().unwrap_or_default();
    if !accepted.contains(&ext.as_str()) {
        return Err(ValidationError::UnsupportedFile {
            filename: file.filename.clone(),
            accepted: accepted.iter().map(|s| s.to_string()).collect(),
        });
    }
    Ok(())
}

fn check_min(field: &'static str, value: &str, min: usize) -> Result<(), ValidationError> {
    if value.trim().chars().count() < min {
        return Err(ValidationError::TooShort { field, min });
    }
    Ok(())
}

/// Pasted text for keywords, entities, topics, bullets and question context
pub fn check_text(text: &str) -> Result<(), ValidationError> {
    check_min("text", text, MIN_TEXT_CHARS)
}

pub fn check_question(question: &str) -> Result<(), ValidationError> {
    check_min("question", question, MIN_QUESTION_CHARS)
}

/// Every non-blank entry must be long enough, and there must be 2 to 5 of them
pub fn check_compare_texts(texts: &[String]) -> Result<(), ValidationError> {
    let filled: Vec<&String> = texts.iter().filter(|t| !t.trim().is_empty()).collect();
    if !COMPARE_TEXTS_RANGE.contains(&filled.len()) {
        return Err(ValidationError::TextCount);
    }
    filled
        .iter()
        .try_for_each(|t| check_min("each text", t, MIN_COMPARE_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_must_be_pdf_or_docx() {
        assert!(check_document(&FileUpload::new("a.PDF", vec![1])).is_ok());
        assert!(check_document(&FileUpload::new("a.docx", vec![1])).is_ok());

        let err = check_document(&FileUpload::new("a.txt", vec![1])).unwrap_err();
        assert_eq!(err.to_string(), "a.txt: only .pdf, .docx files are accepted");
        assert!(check_text_file(&FileUpload::new("a.txt", vec![1])).is_ok());
        assert!(check_text_file(&FileUpload::new("noext", vec![1])).is_err());
    }

    #[test]
    fn files_over_ten_megabytes_are_rejected() {
        let big = FileUpload::new("big.pdf", vec![0; MAX_FILE_SIZE + 1]);
        assert_eq!(
            check_document(&big),
            Err(ValidationError::FileTooLarge {
                filename: "big.pdf".into()
            })
        );
        let exact = FileUpload::new("ok.pdf", vec![0; MAX_FILE_SIZE]);
        assert!(check_document(&exact).is_ok());
    }

    #[test]
    fn minimum_lengths() {
        assert!(check_text("too short").is_err());
        assert!(check_text(&"x".repeat(MIN_TEXT_CHARS)).is_ok());
        assert!(check_question("Why").is_err());
        assert!(check_question("Why so?").is_ok());
    }

    #[test]
    fn compare_counts_non_blank_entries() {
        let texts = vec!["long enough one".to_string(), "  ".to_string()];
        assert_eq!(check_compare_texts(&texts), Err(ValidationError::TextCount));

        let texts = vec!["long enough one".to_string(), "short".to_string()];
        assert!(matches!(
            check_compare_texts(&texts),
            Err(ValidationError::TooShort { .. })
        ));

        let texts = vec!["long enough one".to_string(), "long enough two".to_string()];
        assert!(check_compare_texts(&texts).is_ok());
    }
}
