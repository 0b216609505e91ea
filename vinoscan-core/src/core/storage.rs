use crate::{CustomField, Result, VinoscanError, WineEntry, WineType};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Durable key-value storage consumed by the catalog: one opaque blob,
/// loaded at startup and rewritten in full after every mutation.
pub trait StorageBackend {
    /// Returns the stored blob, or `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<String>>;

    /// Replaces the stored blob. A capacity failure must surface as
    /// [`VinoscanError::StorageWrite`].
    fn save(&mut self, blob: &str) -> Result<()>;
}

/// In-memory backend with an optional capacity cap, mirroring the quota
/// behavior of browser-local storage. Primarily used in tests and as the
/// backend for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Option<String>,
    capacity: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects blobs larger than `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            blob: None,
            capacity: Some(capacity),
        }
    }

    /// Seeds the store with a pre-existing blob, as if a previous session
    /// had saved it.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
            capacity: None,
        }
    }
}

impl StorageBackend for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.blob.clone())
    }

    fn save(&mut self, blob: &str) -> Result<()> {
        if let Some(cap) = self.capacity {
            if blob.len() > cap {
                return Err(VinoscanError::StorageWrite(format!(
                    "blob of {} bytes exceeds capacity of {} bytes",
                    blob.len(),
                    cap
                )));
            }
        }
        self.blob = Some(blob.to_string());
        Ok(())
    }
}

/// File-backed store for desktop sessions. The blob lives in a single file;
/// an optional size cap maps oversized writes to the quota error.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    max_bytes: Option<u64>,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_bytes: None,
        }
    }

    pub fn with_max_bytes<P: AsRef<Path>>(path: P, max_bytes: u64) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_bytes: Some(max_bytes),
        }
    }
}

impl StorageBackend for FileStore {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, blob: &str) -> Result<()> {
        if let Some(max) = self.max_bytes {
            if blob.len() as u64 > max {
                return Err(VinoscanError::StorageWrite(format!(
                    "blob of {} bytes exceeds limit of {} bytes",
                    blob.len(),
                    max
                )));
            }
        }
        std::fs::write(&self.path, blob)?;
        Ok(())
    }
}

/// Raw persisted entry shape, covering both the current encoding
/// (`imageUrls` array) and the legacy one (scalar `imageUrl`). Decoding
/// goes through this struct so the legacy fallback is a defined transform
/// rather than ad hoc field probing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    id: String,
    #[serde(default)]
    image_urls: Option<Vec<String>>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    maker: String,
    #[serde(default)]
    year: String,
    #[serde(rename = "type", default)]
    wine_type: WineType,
    #[serde(default)]
    price: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    bin_number: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    custom_fields: Vec<CustomField>,
    created_at: i64,
    #[serde(default)]
    deleted_at: Option<i64>,
}

impl StoredEntry {
    fn into_entry(self) -> WineEntry {
        // Legacy blobs carry a single `imageUrl`; wrap it into a one-element
        // gallery. Absent both fields, the gallery is empty.
        let image_urls = self
            .image_urls
            .or_else(|| self.image_url.map(|url| vec![url]))
            .unwrap_or_default();
        WineEntry {
            id: self.id,
            image_urls,
            name: self.name,
            maker: self.maker,
            year: self.year,
            wine_type: self.wine_type,
            price: self.price,
            description: self.description,
            bin_number: self.bin_number,
            notes: self.notes,
            custom_fields: self.custom_fields,
            created_at: self.created_at,
            deleted_at: self.deleted_at,
        }
    }
}

/// Decodes a persisted blob into catalog entries, migrating legacy shapes.
///
/// # Errors
///
/// Returns [`VinoscanError::StorageLoad`] if the blob is not valid JSON for
/// either encoding.
pub fn decode_cellar(blob: &str) -> Result<Vec<WineEntry>> {
    let raw: Vec<StoredEntry> =
        serde_json::from_str(blob).map_err(|e| VinoscanError::StorageLoad(e.to_string()))?;
    Ok(raw.into_iter().map(StoredEntry::into_entry).collect())
}

/// Serializes the full catalog for storage.
pub fn encode_cellar(entries: &[WineEntry]) -> Result<String> {
    Ok(serde_json::to_string(entries)?)
}
