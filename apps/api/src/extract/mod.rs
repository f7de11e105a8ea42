//! Document extraction: uploaded bytes → plain text + formatting flags.
//!
//! PDF text comes from `pdf-extract`; DOCX text is pulled straight out of
//! the WordprocessingML body (`word/document.xml`). Extraction failures are
//! terminal for the owning job — there are no retries.

mod docx;

use std::path::Path;

use regex::Regex;
use serde::Serialize;

use crate::errors::AppError;

pub use docx::DocxFeatures;

pub const MAX_FILE_MB: u64 = 10;
pub const MAX_FILE_BYTES: usize = (MAX_FILE_MB as usize) * 1024 * 1024;

const SECTION_HINTS: [&str; 9] = [
    "summary",
    "skills",
    "experience",
    "education",
    "projects",
    "certifications",
    "achievements",
    "publications",
    "internship",
];

const CORE_SECTIONS: [&str; 4] = ["summary", "skills", "experience", "education"];

/// Lines at or below this length count as "short" for the multi-column
/// heuristic; PDFs whose short-line ratio exceeds the threshold were likely
/// laid out in columns.
const SHORT_LINE_LEN: usize = 25;
const MULTI_COLUMN_RATIO: f64 = 0.45;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Docx,
}

impl FileKind {
    /// Resolves the declared file kind from the upload's filename.
    /// `None` means the extension is unsupported (or absent).
    pub fn from_filename(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "docx" => Some(FileKind::Docx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Docx => "docx",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactInfo {
    pub email_detected: bool,
    pub phone_detected: bool,
    pub linkedin_detected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionPresence {
    pub detected_sections: Vec<String>,
    pub missing_core_sections: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Readability {
    pub line_count: usize,
    pub short_line_ratio: f64,
}

/// Coarse layout signals detected during extraction. Feeds the formatting
/// sub-score and the suggestion rules.
#[derive(Debug, Clone, Serialize)]
pub struct FormattingFlags {
    pub file_type: String,
    pub contact_info: ContactInfo,
    pub possible_multi_column_layout: bool,
    pub uses_tables: bool,
    pub uses_images: bool,
    pub section_presence: SectionPresence,
    pub readability: Readability,
}

#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub text: String,
    pub flags: FormattingFlags,
}

/// Converts uploaded bytes to an `ExtractedDocument`. Regexes are compiled
/// once at startup; the extractor itself is stateless per call.
pub struct DocumentExtractor {
    email_re: Regex,
    phone_re: Regex,
    space_re: Regex,
    newline_re: Regex,
}

impl DocumentExtractor {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            email_re: Regex::new(r"[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}")?,
            phone_re: Regex::new(r"\+?\d[\d \-()]{8,}\d")?,
            space_re: Regex::new(r"[ \t]+")?,
            newline_re: Regex::new(r"\n{3,}")?,
        })
    }

    pub fn extract(&self, kind: FileKind, bytes: &[u8]) -> Result<ExtractedDocument, AppError> {
        let (raw, features) = match kind {
            FileKind::Pdf => {
                let text = pdf_extract::extract_text_from_mem(bytes)
                    .map_err(|e| AppError::CorruptDocument(e.to_string()))?;
                (text, DocxFeatures::default())
            }
            FileKind::Docx => docx::extract_docx(bytes)?,
        };

        let text = self.clean_text(&raw);
        if text.is_empty() {
            return Err(AppError::EmptyContent);
        }

        let flags = self.detect_formatting_flags(kind, &text, features);
        Ok(ExtractedDocument { text, flags })
    }

    /// Normalizes extracted text: strip NULs, collapse horizontal
    /// whitespace, cap blank-line runs at one.
    fn clean_text(&self, raw: &str) -> String {
        let t = raw.replace('\u{0}', " ");
        let t = self.space_re.replace_all(&t, " ");
        let t = self.newline_re.replace_all(&t, "\n\n");
        t.trim().to_string()
    }

    fn detect_formatting_flags(
        &self,
        kind: FileKind,
        text: &str,
        features: DocxFeatures,
    ) -> FormattingFlags {
        let lower = text.to_lowercase();

        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|ln| !ln.is_empty())
            .collect();
        let short_line_ratio = if lines.is_empty() {
            0.0
        } else {
            lines.iter().filter(|ln| ln.len() <= SHORT_LINE_LEN).count() as f64
                / lines.len() as f64
        };

        let detected_sections: Vec<String> = SECTION_HINTS
            .iter()
            .filter(|s| lower.contains(*s))
            .map(|s| s.to_string())
            .collect();
        let missing_core_sections: Vec<String> = CORE_SECTIONS
            .iter()
            .filter(|s| !detected_sections.iter().any(|d| d == *s))
            .map(|s| s.to_string())
            .collect();

        FormattingFlags {
            file_type: kind.as_str().to_string(),
            contact_info: ContactInfo {
                email_detected: self.email_re.is_match(&lower),
                phone_detected: self.phone_re.is_match(&lower),
                linkedin_detected: lower.contains("linkedin.com"),
            },
            possible_multi_column_layout: kind == FileKind::Pdf
                && short_line_ratio > MULTI_COLUMN_RATIO,
            uses_tables: features.uses_tables,
            uses_images: features.uses_images,
            section_presence: SectionPresence {
                detected_sections,
                missing_core_sections,
            },
            readability: Readability {
                line_count: lines.len(),
                short_line_ratio: (short_line_ratio * 1000.0).round() / 1000.0,
            },
        }
    }
}
