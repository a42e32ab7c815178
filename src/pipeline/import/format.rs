use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Upper bound accepted by the remote processor for synchronous requests.
pub const MAX_FILE_SIZE: usize = 20 * 1024 * 1024; // 20MB

/// Anything shorter cannot hold a meaningful page.
pub const MIN_FILE_SIZE: usize = 100;

/// Document formats the extraction processor accepts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Jpeg,
    Png,
}

impl DocumentFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }
}

/// Boolean + reason view of a validation, for callers that only report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub ok: bool,
    pub reason: String,
}

/// Validate size and magic bytes (NOT the declared mime type).
pub fn validate_document(content: &[u8]) -> Result<DocumentFormat, ValidationError> {
    let size = content.len();

    if size > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge {
            size,
            max_mb: MAX_FILE_SIZE / (1024 * 1024),
        });
    }

    if size < MIN_FILE_SIZE {
        return Err(ValidationError::TooSmall { size });
    }

    match content {
        // PDF: starts with %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => Ok(DocumentFormat::Pdf),
        // JPEG: starts with FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(DocumentFormat::Jpeg),
        // PNG: full 8-byte signature
        [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, ..] => Ok(DocumentFormat::Png),
        _ => Err(ValidationError::UnsupportedFormat),
    }
}

pub fn validate(content: &[u8]) -> ValidationOutcome {
    match validate_document(content) {
        Ok(_) => ValidationOutcome {
            ok: true,
            reason: String::new(),
        },
        Err(e) => ValidationOutcome {
            ok: false,
            reason: e.to_string(),
        },
    }
}

/// Compare the caller's declared mime type with what the bytes say.
/// Parameters such as `; charset=` are ignored.
pub fn mime_matches(declared: &str, detected: DocumentFormat) -> bool {
    let essence = declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match detected {
        DocumentFormat::Jpeg => essence == "image/jpeg" || essence == "image/jpg",
        other => essence == other.mime_type(),
    }
}
