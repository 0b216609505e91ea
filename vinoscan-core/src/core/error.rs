//! Error types for the VinoScan core library.

use crate::core::analysis::AnalysisError;
use thiserror::Error;

/// All errors that can occur within the VinoScan core library.
#[derive(Debug, Error)]
pub enum VinoscanError {
    /// The persisted cellar blob exists but could not be decoded. The
    /// catalog starts empty when this is raised at load time.
    #[error("Stored cellar data is corrupted: {0}")]
    StorageLoad(String),

    /// The durable store rejected a write (quota exceeded). The in-memory
    /// mutation that triggered the write has already been applied and is
    /// kept.
    #[error("Storage capacity exceeded: {0}")]
    StorageWrite(String),

    /// Label analysis failed; see [`AnalysisError`] for the cause.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// A CSV import aborted before any entries were added.
    #[error("Import failed: {0}")]
    Import(String),

    /// Permanent deletion was requested without explicit confirmation.
    #[error("Permanent deletion requires confirmation")]
    PurgeConfirmationRequired,

    /// An entry ID was passed to an operation that requires it to exist.
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// An I/O operation on the durable store failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog data could not be serialized to JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias that pins the error type to [`VinoscanError`].
pub type Result<T> = std::result::Result<T, VinoscanError>;

impl VinoscanError {
    /// Returns a short title suitable for a user-facing notice heading.
    #[must_use]
    pub fn user_title(&self) -> &'static str {
        match self {
            Self::StorageLoad(_) => "Storage Error",
            Self::StorageWrite(_) => "Storage Full",
            Self::Analysis(_) => "Analysis Failed",
            Self::Import(_) => "Import Failed",
            Self::PurgeConfirmationRequired => "Confirm Deletion",
            Self::EntryNotFound(_) => "Not Found",
            Self::Io(_) => "File Error",
            Self::Json(_) => "Data Error",
        }
    }

    /// Returns a human-readable message suitable for display to the end
    /// user, paired with [`user_title`](Self::user_title).
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::StorageLoad(_) => {
                "Could not load your saved cellar. Data might be corrupted.".to_string()
            }
            Self::StorageWrite(_) => {
                "Your cellar is too large for local storage. Try removing some photos or entries."
                    .to_string()
            }
            Self::Analysis(e) => e.user_message(),
            Self::Import(msg) => msg.clone(),
            Self::PurgeConfirmationRequired => {
                "This will permanently erase this bottle. Confirm to continue.".to_string()
            }
            Self::EntryNotFound(_) => "This bottle no longer exists.".to_string(),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purge_confirmation_has_distinct_notice() {
        let e = VinoscanError::PurgeConfirmationRequired;
        assert_eq!(e.user_title(), "Confirm Deletion");
        assert!(e.user_message().contains("permanently"));
    }

    #[test]
    fn test_quota_notice_mentions_storage() {
        let e = VinoscanError::StorageWrite("blob of 12000000 bytes".to_string());
        assert_eq!(e.user_title(), "Storage Full");
        assert!(e.user_message().contains("too large"));
    }

    #[test]
    fn test_analysis_errors_surface_provider_taxonomy() {
        let e = VinoscanError::from(AnalysisError::EmptyResponse);
        assert_eq!(e.user_title(), "Analysis Failed");
        assert!(e.user_message().contains("empty response"));
    }
}
