//! Catalog entry types: [`WineEntry`], [`WineType`], and the transient
//! AI analysis payload.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The closed set of wine categories.
///
/// Serializes as the exact display strings the persisted blob and the
/// CSV/analysis boundaries use, so stored data from earlier versions of the
/// application round-trips unchanged.
///
/// # Examples
///
/// ```rust
/// use vinoscan_core::WineType;
///
/// let json = serde_json::to_string(&WineType::Champagne).unwrap();
/// assert_eq!(json, r#""Champagne/Sparkling""#);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WineType {
    Red,
    White,
    #[serde(rename = "Rosé")]
    Rose,
    #[serde(rename = "Champagne/Sparkling")]
    Champagne,
    Other,
}

impl WineType {
    /// All categories, in display order.
    pub const ALL: [WineType; 5] = [
        WineType::Red,
        WineType::White,
        WineType::Rose,
        WineType::Champagne,
        WineType::Other,
    ];

    /// The display string for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            WineType::Red => "Red",
            WineType::White => "White",
            WineType::Rose => "Rosé",
            WineType::Champagne => "Champagne/Sparkling",
            WineType::Other => "Other",
        }
    }

    /// Resolves a display string back to a category.
    ///
    /// Matching is exact: no trimming or case folding. Returns `None` for
    /// anything outside the closed set; callers pick their own fallback
    /// (CSV import falls back to `Red`, label analysis to `Other`).
    #[must_use]
    pub fn parse(value: &str) -> Option<WineType> {
        WineType::ALL.iter().copied().find(|t| t.as_str() == value)
    }
}

impl Default for WineType {
    fn default() -> Self {
        WineType::Red
    }
}

impl std::fmt::Display for WineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-defined label/value pair attached to an entry.
///
/// Ordered; labels carry no uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub label: String,
    pub value: String,
}

/// A single bottle in the cellar catalog.
///
/// Field naming in the persisted JSON is camelCase (`binNumber`,
/// `createdAt`, …) for compatibility with blobs written by earlier versions
/// of the application. `year` and `price` are free text rather than numeric
/// so approximate values like `"N/V"` or `"$40-60"` survive round-trips;
/// the query engine coerces them numerically only at sort time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WineEntry {
    /// Opaque unique identifier, assigned at creation. Never reused, even
    /// across the trash partition.
    pub id: String,

    /// Encoded image references in gallery order; index 0 is the primary
    /// image. May be empty.
    #[serde(default)]
    pub image_urls: Vec<String>,

    pub name: String,
    pub maker: String,
    pub year: String,

    #[serde(rename = "type")]
    pub wine_type: WineType,

    pub price: String,
    pub description: String,
    pub bin_number: String,
    pub notes: String,

    #[serde(default)]
    pub custom_fields: Vec<CustomField>,

    /// Creation timestamp in epoch milliseconds. Set once at construction;
    /// edits never touch it.
    pub created_at: i64,

    /// Present iff the entry is in the trash. Absent in the serialized form
    /// for active entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

impl WineEntry {
    /// Builds a blank draft around a set of staged images (manual-entry
    /// path). The first image becomes the primary; all text fields start
    /// empty and the type defaults to `Red`.
    #[must_use]
    pub fn draft(image_urls: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            image_urls,
            name: String::new(),
            maker: String::new(),
            year: String::new(),
            wine_type: WineType::Red,
            price: String::new(),
            description: String::new(),
            bin_number: String::new(),
            notes: String::new(),
            custom_fields: Vec::new(),
            created_at: chrono::Utc::now().timestamp_millis(),
            deleted_at: None,
        }
    }

    /// Merges an analysis result with the staged images into a draft entry,
    /// attaching a generated `id` and `created_at`.
    #[must_use]
    pub fn from_analysis(ai: AiWineResponse, image_urls: Vec<String>) -> Self {
        Self {
            name: ai.name,
            maker: ai.maker,
            year: ai.year,
            wine_type: ai.wine_type,
            description: ai.description,
            ..Self::draft(image_urls)
        }
    }

    /// Whether this entry currently sits in the trash partition.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Appends images to the gallery, preserving existing order.
    pub fn push_images(&mut self, images: impl IntoIterator<Item = String>) {
        self.image_urls.extend(images);
    }
}

/// Structured attributes extracted from a label photo by the analysis
/// provider. Transient: merged into a [`WineEntry`] draft, never persisted
/// as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiWineResponse {
    pub name: String,
    pub maker: String,
    pub year: String,
    #[serde(rename = "type")]
    pub wine_type: WineType,
    pub description: String,
}
