//! Saving results as Markdown files.

use chrono::Utc;
use std::path::{Path, PathBuf};

/// Which capability produced a result; decides the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Keywords,
    Entities,
    Comparison,
    Answer,
    Topics,
    Bullets,
}

impl ResultKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            ResultKind::Keywords => "keywords",
            ResultKind::Entities => "entities",
            ResultKind::Comparison => "comparison",
            ResultKind::Answer => "answer",
            ResultKind::Topics => "topics",
            ResultKind::Bullets => "bullets",
        }
    }
}

/// `<prefix>-<unix millis>.md`
pub fn markdown_filename(kind: ResultKind) -> String {
    format!("{}-{}.md", kind.prefix(), Utc::now().timestamp_millis())
}

/// `summary_<original name without extension>.md`
pub fn summary_filename(original_filename: &str) -> String {
    let stem = Path::new(original_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document");
    format!("summary_{}.md", stem)
}

/// Write `content` to `dir/filename`, creating `dir` if needed
pub fn save_markdown(dir: &Path, filename: &str, content: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, content)?;
    Ok(path)
}
