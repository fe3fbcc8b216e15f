//! Resume input validation. Everything here runs before any network call.

use bytes::Bytes;
use tracing::warn;

use crate::errors::AppError;

pub const PDF_MIME: &str = "application/pdf";
const PDF_SIGNATURE: &[u8] = b"%PDF-";
/// Uploads above this size are rejected.
pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

pub const INVALID_FILE_TYPE: &str = "Invalid file type. Please upload a PDF.";
pub const EMPTY_RESUME_TEXT: &str = "Resume text cannot be empty.";

/// A validated resume ready for analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum ResumeContent {
    Pdf {
        bytes: Bytes,
        /// Text layer pulled out of the PDF, when it has one.
        text_layer: Option<String>,
    },
    Text(String),
}

impl ResumeContent {
    pub fn kind(&self) -> &'static str {
        match self {
            ResumeContent::Pdf { .. } => PDF_MIME,
            ResumeContent::Text(_) => "text/plain",
        }
    }

    /// Validates pasted resume text.
    pub fn from_text(text: &str) -> Result<Self, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation(EMPTY_RESUME_TEXT.to_string()));
        }
        Ok(ResumeContent::Text(text.to_string()))
    }

    /// Validates an uploaded file: declared type, PDF signature and size.
    /// The text layer is not extracted here; see `with_text_layer`.
    pub fn from_upload(content_type: Option<&str>, bytes: Bytes) -> Result<Self, AppError> {
        let declared_pdf = content_type
            .map(|ct| ct.split(';').next().unwrap_or("").trim())
            .is_some_and(|ct| ct.eq_ignore_ascii_case(PDF_MIME));

        if !declared_pdf || !bytes.starts_with(PDF_SIGNATURE) {
            return Err(AppError::Validation(INVALID_FILE_TYPE.to_string()));
        }
        if bytes.len() > MAX_RESUME_BYTES {
            return Err(AppError::Validation(format!(
                "Resume is too large. The maximum size is {} MB.",
                MAX_RESUME_BYTES / (1024 * 1024)
            )));
        }

        Ok(ResumeContent::Pdf {
            bytes,
            text_layer: None,
        })
    }

    /// Extracts the PDF text layer on a blocking thread. Extraction failures are
    /// logged and leave the content unchanged; the document itself is still sent.
    pub async fn with_text_layer(self) -> Self {
        let ResumeContent::Pdf { bytes, .. } = self else {
            return self;
        };

        let pdf = bytes.clone();
        let extracted =
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf)).await;

        let text_layer = match extracted {
            Ok(Ok(text)) => Some(text.trim().to_string()).filter(|t| !t.is_empty()),
            Ok(Err(e)) => {
                warn!("Could not extract PDF text layer: {e}");
                None
            }
            Err(e) => {
                warn!("spawn_blocking failed during PDF text extraction: {e}");
                None
            }
        };

        ResumeContent::Pdf { bytes, text_layer }
    }
}
