//! The authoritative catalog of cellar entries, synchronized with durable
//! storage.
//!
//! `Cellar` is the primary interface for all catalog mutations. It owns the
//! in-memory collection and a [`StorageBackend`]; every mutation re-serializes
//! the full collection and hands it to the backend. Writes are
//! fire-and-forget relative to the in-memory state: a quota failure surfaces
//! as [`VinoscanError::StorageWrite`] but the already-applied mutation is
//! kept, so the user can recover by deleting entries and saving again.

use crate::core::{csv, storage};
use crate::{CellarQuery, Result, StorageBackend, VinoscanError, WineEntry};
use log::{debug, warn};

/// An open cellar catalog backed by durable storage.
pub struct Cellar {
    entries: Vec<WineEntry>,
    store: Box<dyn StorageBackend>,
    load_warning: Option<VinoscanError>,
}

impl Cellar {
    /// Loads the catalog from the backend.
    ///
    /// An absent blob yields an empty cellar. A corrupt or unreadable blob
    /// also yields an empty cellar rather than a failure; the typed load
    /// error is parked and can be collected once via
    /// [`take_load_warning`](Self::take_load_warning) to surface a notice.
    /// Legacy blobs that carry a scalar `imageUrl` per entry are migrated
    /// transparently.
    #[must_use]
    pub fn load(store: Box<dyn StorageBackend>) -> Self {
        let mut load_warning = None;
        let entries = match store.load() {
            Ok(Some(blob)) => match storage::decode_cellar(&blob) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("cellar blob is corrupt, starting empty: {e}");
                    load_warning = Some(e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("cellar load failed, starting empty: {e}");
                load_warning = Some(e);
                Vec::new()
            }
        };
        Self {
            entries,
            store,
            load_warning,
        }
    }

    /// Returns the load-time error, if any, exactly once.
    pub fn take_load_warning(&mut self) -> Option<VinoscanError> {
        self.load_warning.take()
    }

    /// The full collection, trashed entries included, in collection order.
    #[must_use]
    pub fn entries(&self) -> &[WineEntry] {
        &self.entries
    }

    /// Looks up an entry by id across both partitions.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WineEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries currently in the trash.
    #[must_use]
    pub fn trash_len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_deleted()).count()
    }

    /// Computes the view for the given query state. See [`crate::query`].
    #[must_use]
    pub fn view(&self, q: &CellarQuery) -> Vec<&WineEntry> {
        crate::core::query::query(&self.entries, q)
    }

    /// Adds a new entry at the front of the collection, so the freshest
    /// entries appear first in default views. Uniqueness is by `id` only;
    /// duplicate names/makers are allowed.
    ///
    /// # Errors
    ///
    /// Returns [`VinoscanError::StorageWrite`] if persisting fails; the
    /// entry is in the collection either way.
    pub fn insert(&mut self, entry: WineEntry) -> Result<()> {
        self.entries.insert(0, entry);
        self.persist()
    }

    /// Replaces the entry whose `id` matches.
    ///
    /// # Errors
    ///
    /// Returns [`VinoscanError::EntryNotFound`] when no entry carries the
    /// id; updating a missing entry is a caller error, not a silent no-op.
    pub fn update(&mut self, entry: WineEntry) -> Result<()> {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(slot) => {
                *slot = entry;
                self.persist()
            }
            None => Err(VinoscanError::EntryNotFound(entry.id)),
        }
    }

    /// Moves an entry to the trash by stamping `deleted_at`. Re-deleting a
    /// trashed entry just refreshes the stamp; a missing id is a no-op.
    pub fn soft_delete(&mut self, id: &str) -> Result<()> {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.deleted_at = Some(chrono::Utc::now().timestamp_millis());
                self.persist()
            }
            None => Ok(()),
        }
    }

    /// Returns a trashed entry to the active partition. A missing id (in
    /// particular one that was already purged) is a no-op.
    pub fn restore(&mut self, id: &str) -> Result<()> {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.deleted_at = None;
                self.persist()
            }
            None => Ok(()),
        }
    }

    /// Permanently removes an entry. Unrecoverable, so the caller must pass
    /// `confirmed = true` after an explicit user confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`VinoscanError::PurgeConfirmationRequired`] when `confirmed`
    /// is false; nothing is removed in that case.
    pub fn purge(&mut self, id: &str, confirmed: bool) -> Result<()> {
        if !confirmed {
            return Err(VinoscanError::PurgeConfirmationRequired);
        }
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return Ok(());
        }
        self.persist()
    }

    /// Parses CSV text and prepends the resulting batch ahead of existing
    /// entries, in parsed order. Returns the number of entries added.
    ///
    /// # Errors
    ///
    /// Returns [`VinoscanError::Import`] on structural failure (missing
    /// header row); the catalog is untouched in that case.
    pub fn import_csv(&mut self, text: &str) -> Result<usize> {
        let batch = csv::import_rows(text, chrono::Utc::now().timestamp_millis())?;
        let count = batch.len();
        let mut entries = batch;
        entries.append(&mut self.entries);
        self.entries = entries;
        self.persist()?;
        Ok(count)
    }

    /// Serializes the active (non-trashed) entries as CSV, in collection
    /// order.
    #[must_use]
    pub fn export_csv(&self) -> String {
        csv::export_csv(self.entries.iter().filter(|e| !e.is_deleted()))
    }

    fn persist(&mut self) -> Result<()> {
        let blob = storage::encode_cellar(&self.entries)?;
        debug!("persisting cellar: {} entries, {} bytes", self.entries.len(), blob.len());
        self.store.save(&blob).map_err(|e| {
            warn!("cellar write failed, in-memory state kept: {e}");
            e
        })
    }
}
