//! Request and response records exchanged with the document service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 256..=2048;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const NUM_TOPICS_RANGE: RangeInclusive<u32> = 1..=10;
pub const DEFAULT_NUM_TOPICS: u32 = 3;
pub const COMPARE_TEXTS_RANGE: RangeInclusive<usize> = 2..=5;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("path has no file name: {0}")]
    NoFileName(String),
}

/// A local file to upload, held in memory with its original name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk
    pub async fn from_path(path: &Path) -> Result<Self, InputError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| InputError::NoFileName(path.display().to_string()))?
            .to_string();
        let bytes = tokio::fs::read(path).await.map_err(|source| InputError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self { filename, bytes })
    }

    /// Lowercased extension including the dot, e.g. `.pdf`
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
    }

    /// MIME type sent with the multipart part
    pub fn mime_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some(".pdf") => "application/pdf",
            Some(".docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some(".txt") => "text/plain",
            _ => "application/octet-stream",
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// The document a capability works on: pasted text or an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
    Text(String),
    File(FileUpload),
}

impl DocumentInput {
    /// Build from the optional pair a form collects. Text wins when both are
    /// present; blank text counts as absent. `None` when neither is usable.
    pub fn from_parts(text: Option<String>, file: Option<FileUpload>) -> Option<Self> {
        match (text.filter(|t| !t.trim().is_empty()), file) {
            (Some(text), _) => Some(Self::Text(text)),
            (None, Some(file)) => Some(Self::File(file)),
            (None, None) => None,
        }
    }
}

/// Flavour of summary the backend should produce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryType {
    #[default]
    General,
    Bullets,
    Tldr,
    Business,
    Academic,
}

impl SummaryType {
    pub const ALL: [SummaryType; 5] = [
        SummaryType::General,
        SummaryType::Bullets,
        SummaryType::Tldr,
        SummaryType::Business,
        SummaryType::Academic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryType::General => "general",
            SummaryType::Bullets => "bullets",
            SummaryType::Tldr => "tldr",
            SummaryType::Business => "business",
            SummaryType::Academic => "academic",
        }
    }
}

impl fmt::Display for SummaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown summary type '{0}' (expected general, bullets, tldr, business or academic)")]
pub struct UnknownSummaryType(String);

impl FromStr for SummaryType {
    type Err = UnknownSummaryType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SummaryType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSummaryType(s.to_string()))
    }
}

fn clamp(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizeRequest {
    pub file: FileUpload,
    pub summary_type: SummaryType,
    pub max_tokens: u32,
}

impl SummarizeRequest {
    pub fn new(file: FileUpload) -> Self {
        Self {
            file,
            summary_type: SummaryType::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn summary_type(mut self, summary_type: SummaryType) -> Self {
        self.summary_type = summary_type;
        self
    }

    /// Set the token budget, clamped to [`MAX_TOKENS_RANGE`]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = clamp(max_tokens, &MAX_TOKENS_RANGE);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordsRequest {
    pub input: DocumentInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitiesRequest {
    pub input: DocumentInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareTextsRequest {
    pub texts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRequest {
    pub input: DocumentInput,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicModelingRequest {
    pub input: DocumentInput,
    pub num_topics: u32,
}

impl TopicModelingRequest {
    /// Topic count is clamped to [`NUM_TOPICS_RANGE`]
    pub fn new(input: DocumentInput, num_topics: u32) -> Self {
        Self {
            input,
            num_topics: clamp(num_topics, &NUM_TOPICS_RANGE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextToBulletsRequest {
    pub input: DocumentInput,
}

/// `GET /` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    #[serde(default)]
    pub service: String,
}

/// `POST /api/summarize` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub summary_type: String,
    pub original_filename: String,
    pub length_original: u64,
    pub length_summary: u64,
}

impl SummarizeResponse {
    /// How much shorter the summary is than the source, in percent
    pub fn reduction_percentage(&self) -> f64 {
        if self.length_original == 0 {
            return 0.0;
        }
        let original = self.length_original as f64;
        (original - self.length_summary as f64) / original * 100.0
    }
}

/// Markdown payload shared by every analysis capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownResponse {
    #[serde(alias = "markdown")]
    pub result: String,
}
