//! Internal domain modules for the VinoScan core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod analysis;
pub mod cellar;
pub mod csv;
pub mod entry;
pub mod error;
pub mod image;
pub mod intake;
pub mod query;
pub mod storage;

#[doc(inline)]
pub use analysis::{AnalysisError, GeminiAnalyzer, LabelAnalyzer};
#[doc(inline)]
pub use cellar::Cellar;
#[doc(inline)]
pub use csv::{export_csv, import_rows, EXPORT_FILENAME};
#[doc(inline)]
pub use entry::{AiWineResponse, CustomField, WineEntry, WineType};
#[doc(inline)]
pub use error::{Result, VinoscanError};
#[doc(inline)]
pub use image::{compress, compress_data_url, MAX_DIMENSION};
#[doc(inline)]
pub use intake::{Intake, IntakeState};
#[doc(inline)]
pub use query::{query, CellarQuery, SortKey, SortOrder};
#[doc(inline)]
pub use storage::{decode_cellar, encode_cellar, FileStore, MemoryStore, StorageBackend};
