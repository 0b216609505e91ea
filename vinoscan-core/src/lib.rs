//! Core library for VinoScan — a local-first wine cellar inventory tracker.
//!
//! The primary entry point is [`Cellar`], the authoritative catalog of
//! [`WineEntry`] records synchronized with a [`StorageBackend`]. Around it
//! sit the derived list view ([`query`]), the CSV codec
//! ([`import_rows`]/[`export_csv`]), the image pipeline ([`compress`]), the
//! label-analysis boundary ([`LabelAnalyzer`]), and the session intake
//! workflow ([`Intake`]) that turns captured photos into drafts.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core`
//! module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    analysis::{AnalysisError, GeminiAnalyzer, LabelAnalyzer},
    cellar::Cellar,
    csv::{export_csv, import_rows, EXPORT_FILENAME},
    entry::{AiWineResponse, CustomField, WineEntry, WineType},
    error::{Result, VinoscanError},
    image::{compress, compress_data_url, MAX_DIMENSION},
    intake::{Intake, IntakeState},
    query::{query, CellarQuery, SortKey, SortOrder},
    storage::{decode_cellar, encode_cellar, FileStore, MemoryStore, StorageBackend},
};
