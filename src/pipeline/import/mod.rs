pub mod format;

pub use format::*;

use thiserror::Error;

/// Rejections raised before anything leaves the process.
/// Every variant is fixable by the caller resubmitting a different file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File size exceeds {max_mb}MB limit (got {size} bytes)")]
    TooLarge { size: usize, max_mb: usize },

    #[error("File is too small to be a valid document ({size} bytes)")]
    TooSmall { size: usize },

    #[error("File format not supported. Use PDF, JPEG, or PNG.")]
    UnsupportedFormat,
}

impl ValidationError {
    pub fn is_resubmittable(&self) -> bool {
        true
    }
}
