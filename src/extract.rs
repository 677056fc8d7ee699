//! Content acquisition: turning pasted text or an uploaded file into plain text.
//!
//! The extraction backend is chosen from the upload's declared type. Plain text is
//! decoded directly, PDFs go through an external `pdftotext`, and images are accepted
//! but have no text recognition behind them yet.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{ExtractionError, QuizError};

/// How an upload's bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    PlainText,
    Pdf,
    Image,
}

impl SourceFormat {
    /// Select by declared MIME type. Unknown types are read as text.
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim().to_ascii_lowercase();
        if mime == "application/pdf" {
            Self::Pdf
        } else if mime.starts_with("image/") {
            Self::Image
        } else {
            Self::PlainText
        }
    }

    /// Select by file extension. Unknown extensions are read as text.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Self::Pdf,
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "tif" | "tiff" => Self::Image,
            _ => Self::PlainText,
        }
    }
}

/// An uploaded document.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub format: SourceFormat,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, format: SourceFormat, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), format, bytes }
    }

    /// Read a file from disk, choosing the format from its extension.
    pub async fn from_path(path: &Path) -> Result<Self, ExtractionError> {
        let bytes = fs::read(path).await?;
        Ok(Self::new(path.display().to_string(), SourceFormat::from_path(path), bytes))
    }
}

/// Where the quiz content comes from.
#[derive(Debug, Clone)]
pub enum ContentInput {
    Text(String),
    Upload(Upload),
}

/// Capability to pull plain text out of a document.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, upload: &Upload) -> Result<String, ExtractionError>;
}

#[derive(Debug, Clone, Default)]
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, upload: &Upload) -> Result<String, ExtractionError> {
        let text = std::str::from_utf8(&upload.bytes).map_err(|_| ExtractionError::InvalidText)?;
        // Drop a UTF-8 byte order mark if present.
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }
}

/// Extracts PDF text by running `pdftotext <file> -`.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    program: String,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new("pdftotext")
    }
}

impl PdfExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("quiz_forge_{}.pdf", Uuid::new_v4()))
    }
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    #[instrument(target = "quiz_forge::extract", skip(self, upload), fields(name = %upload.name, size = upload.bytes.len()))]
    async fn extract(&self, upload: &Upload) -> Result<String, ExtractionError> {
        let path = Self::scratch_path();
        fs::write(&path, &upload.bytes).await?;

        let output = Command::new(&self.program)
            .arg("-layout")
            .arg(&path)
            .arg("-")
            .stdin(Stdio::null())
            .output()
            .await;

        if let Err(e) = fs::remove_file(&path).await {
            warn!(target: "quiz_forge::extract", error = %e, path = %path.display(), "Failed to remove scratch file");
        }

        let output = output.map_err(|e| {
            ExtractionError::Program(format!("failed to run {}: {}", self.program, e))
        })?;
        if !output.status.success() {
            return Err(ExtractionError::Program(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(ExtractionError::Empty(upload.name.clone()));
        }
        debug!(target: "quiz_forge::extract", text_len = text.len(), "Extracted PDF text");
        Ok(text)
    }
}

/// Placeholder for image text recognition.
#[derive(Debug, Clone, Default)]
pub struct ImageOcrStub;

#[async_trait]
impl TextExtractor for ImageOcrStub {
    async fn extract(&self, upload: &Upload) -> Result<String, ExtractionError> {
        warn!(target: "quiz_forge::extract", name = %upload.name, "Image uploaded but OCR is not available");
        Err(ExtractionError::OcrUnavailable)
    }
}

/// First 200 characters of `text`, for logging.
fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(200).collect();
    if preview.len() < text.len() {
        preview.push_str("...");
    }
    preview
}

/// Picks the extractor for each source format.
#[derive(Debug, Clone, Default)]
pub struct Extractors {
    pub plain_text: PlainTextExtractor,
    pub pdf: PdfExtractor,
    pub image: ImageOcrStub,
}

impl Extractors {
    /// Use `program` for PDF extraction.
    pub fn with_pdf_program(program: impl Into<String>) -> Self {
        Self { pdf: PdfExtractor::new(program), ..Self::default() }
    }

    pub fn for_format(&self, format: SourceFormat) -> &dyn TextExtractor {
        match format {
            SourceFormat::PlainText => &self.plain_text,
            SourceFormat::Pdf => &self.pdf,
            SourceFormat::Image => &self.image,
        }
    }

    /// Produce the plain-text content for `input`.
    ///
    /// Pasted text is returned as given; the caller decides whether it is usable.
    /// Uploads that yield only whitespace fail with `ExtractionError::Empty`.
    #[instrument(target = "quiz_forge::extract", skip(self, input))]
    pub async fn acquire(&self, input: ContentInput) -> Result<String, QuizError> {
        match input {
            ContentInput::Text(text) => Ok(text),
            ContentInput::Upload(upload) => {
                info!(target: "quiz_forge::extract", name = %upload.name, format = ?upload.format, "Extracting uploaded file");
                let text = self.for_format(upload.format).extract(&upload).await?;
                if text.trim().is_empty() {
                    return Err(ExtractionError::Empty(upload.name).into());
                }
                debug!(target: "quiz_forge::extract", text_len = text.len(), preview = %preview(&text), "Extracted content");
                Ok(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_paths_are_unique() {
        let first = PdfExtractor::scratch_path();
        let second = PdfExtractor::scratch_path();
        assert_ne!(first, second);
        assert!(first.starts_with(std::env::temp_dir()));
        assert_eq!(first.extension().and_then(|e| e.to_str()), Some("pdf"));
    }

    #[test]
    fn long_previews_are_cut() {
        let text = "a".repeat(300);
        assert_eq!(preview(&text).len(), 203);
        assert_eq!(preview("short"), "short");
    }
}
