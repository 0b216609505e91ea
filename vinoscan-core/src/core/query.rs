//! The derived list view: partition, search, and sort over the catalog.
//!
//! [`query`] is a pure function of the full collection plus transient UI
//! query state: it never mutates the source collection and recomputes from
//! scratch on every call. At expected catalog sizes (hundreds of bottles)
//! there is nothing to be gained from incremental indexing.

use crate::WineEntry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort dimension for the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Name,
    Maker,
    Year,
    Price,
    CreatedAt,
}

/// Sort direction for the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// The opposite direction.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vinoscan_core::SortOrder;
    ///
    /// assert_eq!(SortOrder::Asc.toggle(), SortOrder::Desc);
    /// ```
    #[must_use]
    pub fn toggle(self) -> SortOrder {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Transient query state the view derives from. Defaults to the freshest
/// entries first: active partition, no search, newest `created_at` on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellarQuery {
    /// Select the trash partition instead of the active one.
    pub show_trash: bool,
    /// Free-text search; trimmed and matched case-insensitively against
    /// name, maker, notes, and bin number.
    pub search: String,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
}

impl Default for CellarQuery {
    fn default() -> Self {
        Self {
            show_trash: false,
            search: String::new(),
            sort_key: SortKey::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }
}

/// Computes the ordered sequence of entries the view should render.
///
/// Pipeline: partition on `deleted_at` presence, then substring filter, then
/// a stable sort; ties keep their relative collection order. The returned
/// vector borrows from `entries`; the source is never reordered.
#[must_use]
pub fn query<'a>(entries: &'a [WineEntry], q: &CellarQuery) -> Vec<&'a WineEntry> {
    let mut result: Vec<&WineEntry> = entries
        .iter()
        .filter(|e| e.is_deleted() == q.show_trash)
        .collect();

    let term = q.search.trim().to_lowercase();
    if !term.is_empty() {
        result.retain(|e| {
            e.name.to_lowercase().contains(&term)
                || e.maker.to_lowercase().contains(&term)
                || e.notes.to_lowercase().contains(&term)
                || e.bin_number.to_lowercase().contains(&term)
        });
    }

    result.sort_by(|a, b| {
        let ord = compare(a, b, q.sort_key);
        match q.sort_order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });

    result
}

fn compare(a: &WineEntry, b: &WineEntry, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => cmp_text(&a.name, &b.name),
        SortKey::Maker => cmp_text(&a.maker, &b.maker),
        SortKey::Year => year_value(&a.year).cmp(&year_value(&b.year)),
        SortKey::Price => price_value(&a.price).total_cmp(&price_value(&b.price)),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Numeric coercion for the free-text price field: strip everything except
/// digits and the decimal point, parse as a float, and treat anything
/// unparseable as zero.
fn price_value(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

/// Numeric coercion for the free-text year field: digits only, zero when
/// nothing parses (covers "N/V" and ranges).
fn year_value(raw: &str) -> i64 {
    let cleaned: String = raw.chars().filter(char::is_ascii_digit).collect();
    cleaned.parse().unwrap_or(0)
}
