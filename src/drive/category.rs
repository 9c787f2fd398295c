//! File type classification.
//!
//! A record belongs to a category when its explicit type matches the
//! category's MIME rule, or when its lower-cased name ends with one of the
//! category's extensions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::record::{FileRecord, FOLDER_TYPE};

/// Type filter label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeLabel {
    #[serde(rename = "PDFs")]
    Pdfs,
    Images,
    Videos,
    Audio,
    Documents,
    Spreadsheets,
    Presentations,
    Folders,
}

/// How a label matches the explicit type field.
enum MimeRule {
    Contains(&'static str),
    Prefix(&'static str),
    Exact(&'static str),
}

impl MimeRule {
    fn matches(&self, mime: &str) -> bool {
        match self {
            MimeRule::Contains(needle) => mime.contains(needle),
            MimeRule::Prefix(prefix) => mime.starts_with(prefix),
            MimeRule::Exact(value) => mime == *value,
        }
    }
}

impl TypeLabel {
    /// All labels, in classification order.
    pub const ALL: [TypeLabel; 8] = [
        TypeLabel::Folders,
        TypeLabel::Pdfs,
        TypeLabel::Images,
        TypeLabel::Videos,
        TypeLabel::Audio,
        TypeLabel::Documents,
        TypeLabel::Spreadsheets,
        TypeLabel::Presentations,
    ];

    /// Label as shown in the type filter menu.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeLabel::Pdfs => "PDFs",
            TypeLabel::Images => "Images",
            TypeLabel::Videos => "Videos",
            TypeLabel::Audio => "Audio",
            TypeLabel::Documents => "Documents",
            TypeLabel::Spreadsheets => "Spreadsheets",
            TypeLabel::Presentations => "Presentations",
            TypeLabel::Folders => "Folders",
        }
    }

    /// File name suffixes for this label.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            TypeLabel::Pdfs => &[".pdf"],
            TypeLabel::Images => &[".png", ".jpg", ".jpeg", ".bmp", ".gif", ".webp"],
            TypeLabel::Videos => &[".mp4", ".mov", ".avi", ".mkv", ".webm"],
            TypeLabel::Audio => &[".mp3", ".wav", ".aac", ".flac", ".ogg"],
            TypeLabel::Documents => &[".doc", ".docx", ".txt", ".rtf"],
            TypeLabel::Spreadsheets => &[".xls", ".xlsx", ".csv"],
            TypeLabel::Presentations => &[".ppt", ".pptx", ".key"],
            TypeLabel::Folders => &[],
        }
    }

    fn mime_rule(&self) -> MimeRule {
        match self {
            TypeLabel::Pdfs => MimeRule::Contains("pdf"),
            TypeLabel::Images => MimeRule::Prefix("image/"),
            TypeLabel::Videos => MimeRule::Prefix("video/"),
            TypeLabel::Audio => MimeRule::Prefix("audio/"),
            TypeLabel::Documents => MimeRule::Contains("wordprocessing"),
            TypeLabel::Spreadsheets => MimeRule::Contains("spreadsheet"),
            TypeLabel::Presentations => MimeRule::Contains("presentation"),
            TypeLabel::Folders => MimeRule::Exact(FOLDER_TYPE),
        }
    }

    /// Whether `(file_type, name)` falls under this label.
    pub fn matches_parts(&self, file_type: Option<&str>, name: &str) -> bool {
        let mime = file_type.unwrap_or_default().to_lowercase();
        if !mime.is_empty() && self.mime_rule().matches(&mime) {
            return true;
        }
        let name = name.to_lowercase();
        self.extensions().iter().any(|ext| name.ends_with(ext))
    }

    /// Whether a record falls under this label.
    pub fn matches(&self, record: &FileRecord) -> bool {
        self.matches_parts(record.file_type.as_deref(), &record.name)
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdfs" | "pdf" => Ok(TypeLabel::Pdfs),
            "images" => Ok(TypeLabel::Images),
            "videos" => Ok(TypeLabel::Videos),
            "audio" => Ok(TypeLabel::Audio),
            "documents" => Ok(TypeLabel::Documents),
            "spreadsheets" => Ok(TypeLabel::Spreadsheets),
            "presentations" => Ok(TypeLabel::Presentations),
            "folders" => Ok(TypeLabel::Folders),
            _ => Err(format!("unknown file type: {s}")),
        }
    }
}

/// Classify a record by explicit type and file name.
///
/// Returns the first matching label in [`TypeLabel::ALL`] order, or `None`
/// for names with no known extension and no recognised type.
pub fn classify(file_type: Option<&str>, name: &str) -> Option<TypeLabel> {
    TypeLabel::ALL
        .into_iter()
        .find(|label| label.matches_parts(file_type, name))
}
