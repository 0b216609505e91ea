//! CSV import and export for the catalog.
//!
//! Import runs a character-level tokenizer (a two-state machine, quoted and
//! unquoted) that emits a flat token stream; row assembly sits on top of it.
//! The dialect matches what the application has historically written and
//! accepted: quote characters toggle quote mode and are stripped, content
//! between them is taken verbatim (embedded commas and newlines included),
//! `\r`, `\n`, and `\r\n` each count as one row break, and cells are
//! trimmed as they are emitted.
//!
//! Export is deliberately minimal: every field wrapped in double quotes,
//! comma-joined, newline-joined, no escaping of embedded quotes.

use crate::{Result, VinoscanError, WineEntry, WineType};
use uuid::Uuid;

/// Default filename the shell should offer when saving an export.
pub const EXPORT_FILENAME: &str = "cellar_inventory.csv";

/// Header row written by [`export_csv`].
const EXPORT_HEADERS: [&str; 7] = ["Name", "Maker", "Year", "Type", "Price", "Bin", "Notes"];

/// Accepted header aliases per imported field, matched against the
/// lower-cased header row.
const NAME_ALIASES: [&str; 3] = ["name", "wine", "wine name"];
const MAKER_ALIASES: [&str; 3] = ["maker", "winery", "producer"];
const YEAR_ALIASES: [&str; 2] = ["year", "vintage"];
const TYPE_ALIASES: [&str; 2] = ["type", "category"];
const PRICE_ALIASES: [&str; 3] = ["price", "cost", "value"];
const BIN_ALIASES: [&str; 3] = ["bin", "bin number", "location"];
const NOTES_ALIASES: [&str; 3] = ["notes", "personal notes", "comment"];

/// One unit of tokenizer output.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CsvToken {
    /// A completed (trimmed) cell.
    Cell(String),
    /// The row containing the preceding cells is complete.
    EndOfRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenizerState {
    Unquoted,
    Quoted,
}

/// Runs the character state machine over the whole input.
///
/// A row break is only emitted when the row has content (a pending cell or
/// at least one already-delimited cell), so blank lines between records
/// vanish instead of producing spurious empty rows. End of input flushes any
/// pending cell and row.
fn tokenize(text: &str) -> Vec<CsvToken> {
    let mut tokens = Vec::new();
    let mut state = TokenizerState::Unquoted;
    let mut cell = String::new();
    // Whether a cell delimiter has been seen since the last row break.
    let mut row_open = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            TokenizerState::Quoted => {
                if c == '"' {
                    state = TokenizerState::Unquoted;
                } else {
                    cell.push(c);
                }
            }
            TokenizerState::Unquoted => match c {
                '"' => state = TokenizerState::Quoted,
                ',' => {
                    tokens.push(CsvToken::Cell(cell.trim().to_string()));
                    cell.clear();
                    row_open = true;
                }
                '\n' | '\r' => {
                    if c == '\r' && chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    if !cell.is_empty() || row_open {
                        tokens.push(CsvToken::Cell(cell.trim().to_string()));
                        tokens.push(CsvToken::EndOfRow);
                    }
                    cell.clear();
                    row_open = false;
                }
                _ => cell.push(c),
            },
        }
    }

    if !cell.is_empty() || row_open {
        tokens.push(CsvToken::Cell(cell.trim().to_string()));
        tokens.push(CsvToken::EndOfRow);
    }

    tokens
}

/// Assembles tokenizer output into rows of cells.
fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut current = Vec::new();
    for token in tokenize(text) {
        match token {
            CsvToken::Cell(cell) => current.push(cell),
            CsvToken::EndOfRow => rows.push(std::mem::take(&mut current)),
        }
    }
    rows
}

/// Parses CSV text into a batch of new catalog entries.
///
/// The first row is the header; columns are resolved through the accepted
/// aliases and a column that is not found yields an empty string for that
/// field. Missing names and makers degrade to `"Imported Wine"` /
/// `"Unknown"`; a type value that is not an exact member of the closed set
/// falls back to `Red`. Each entry gets a fresh id and
/// `created_at = start_time + row_index`, so a batch keeps a stable,
/// strictly increasing creation order matching file order.
///
/// # Errors
///
/// Returns [`VinoscanError::Import`] when the input has fewer than two rows
/// (no header plus at least one data row). Structural failure happens before
/// any entry is built, so a failed import never partially mutates anything.
pub fn import_rows(text: &str, start_time: i64) -> Result<Vec<WineEntry>> {
    let rows = parse_rows(text);
    if rows.len() < 2 {
        return Err(VinoscanError::Import(
            "CSV is empty or missing headers.".to_string(),
        ));
    }

    let headers: Vec<String> = rows[0].iter().map(|h| h.to_lowercase()).collect();
    let column = |aliases: &[&str]| headers.iter().position(|h| aliases.contains(&h.as_str()));

    let name_col = column(&NAME_ALIASES);
    let maker_col = column(&MAKER_ALIASES);
    let year_col = column(&YEAR_ALIASES);
    let type_col = column(&TYPE_ALIASES);
    let price_col = column(&PRICE_ALIASES);
    let bin_col = column(&BIN_ALIASES);
    let notes_col = column(&NOTES_ALIASES);

    let mut entries = Vec::new();
    for (index, row) in rows.iter().enumerate().skip(1) {
        if row.is_empty() || (row.len() == 1 && row[0].is_empty()) {
            continue;
        }

        let cell = |col: Option<usize>| -> String {
            col.and_then(|i| row.get(i)).cloned().unwrap_or_default()
        };

        entries.push(WineEntry {
            id: Uuid::new_v4().to_string(),
            image_urls: Vec::new(),
            name: or_default(cell(name_col), "Imported Wine"),
            maker: or_default(cell(maker_col), "Unknown"),
            year: cell(year_col),
            wine_type: WineType::parse(&cell(type_col)).unwrap_or(WineType::Red),
            price: cell(price_col),
            description: String::new(),
            bin_number: cell(bin_col),
            notes: cell(notes_col),
            custom_fields: Vec::new(),
            created_at: start_time + index as i64,
            deleted_at: None,
        });
    }

    Ok(entries)
}

fn or_default(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Serializes entries into CSV text: the fixed header row, then one
/// quoted-field row per entry in the given order.
#[must_use]
pub fn export_csv<'a>(entries: impl IntoIterator<Item = &'a WineEntry>) -> String {
    let mut lines = vec![EXPORT_HEADERS.join(",")];
    for e in entries {
        let fields = [
            e.name.as_str(),
            e.maker.as_str(),
            e.year.as_str(),
            e.wine_type.as_str(),
            e.price.as_str(),
            e.bin_number.as_str(),
            e.notes.as_str(),
        ];
        let row: Vec<String> = fields.iter().map(|f| format!("\"{f}\"")).collect();
        lines.push(row.join(","));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizer_plain_rows() {
        assert_eq!(
            parse_rows("a,b\nc,d"),
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string(), "d".to_string()]
            ]
        );
    }

    #[test]
    fn test_tokenizer_quoted_comma_and_newline() {
        let rows = parse_rows("\"a,b\",\"line\nbreak\"\nnext,row");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["a,b".to_string(), "line\nbreak".to_string()]);
        assert_eq!(rows[1], vec!["next".to_string(), "row".to_string()]);
    }

    #[test]
    fn test_tokenizer_quotes_are_stripped_not_kept() {
        let rows = parse_rows("\"Opus One\",plain");
        assert_eq!(rows[0], vec!["Opus One".to_string(), "plain".to_string()]);
    }

    #[test]
    fn test_tokenizer_crlf_is_one_break() {
        let rows = parse_rows("a,b\r\nc,d\r\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["c".to_string(), "d".to_string()]);
    }

    #[test]
    fn test_tokenizer_bare_cr_is_one_break() {
        let rows = parse_rows("a\rb");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_tokenizer_skips_blank_lines() {
        let rows = parse_rows("a,b\n\n\nc,d\n");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_tokenizer_trailing_cell_is_flushed() {
        let rows = parse_rows("a,b\nc");
        assert_eq!(rows[1], vec!["c".to_string()]);
    }

    #[test]
    fn test_tokenizer_trims_cells() {
        let rows = parse_rows("  spaced  , tight\n");
        assert_eq!(rows[0], vec!["spaced".to_string(), "tight".to_string()]);
    }

    #[test]
    fn test_import_resolves_header_aliases() {
        let csv = "Wine Name,Winery,Vintage\n\"Opus One\",\"Opus Winery\",\"2018\"\n";
        let entries = import_rows(csv, 1_000).unwrap();
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.name, "Opus One");
        assert_eq!(e.maker, "Opus Winery");
        assert_eq!(e.year, "2018");
        assert_eq!(e.wine_type, WineType::Red);
        assert!(e.created_at > 1_000);
        assert!(e.image_urls.is_empty());
        assert!(e.description.is_empty());
        assert!(e.custom_fields.is_empty());
    }

    #[test]
    fn test_import_header_only_is_hard_failure() {
        let result = import_rows("Name,Maker,Year\n", 0);
        match result {
            Err(VinoscanError::Import(msg)) => {
                assert_eq!(msg, "CSV is empty or missing headers.");
            }
            other => panic!("expected import error, got {other:?}"),
        }
    }

    #[test]
    fn test_import_empty_input_is_hard_failure() {
        assert!(matches!(
            import_rows("", 0),
            Err(VinoscanError::Import(_))
        ));
    }

    #[test]
    fn test_import_defaults_missing_fields() {
        let csv = "year\n2015\n";
        let entries = import_rows(csv, 0).unwrap();
        let e = &entries[0];
        assert_eq!(e.name, "Imported Wine");
        assert_eq!(e.maker, "Unknown");
        assert_eq!(e.year, "2015");
        assert_eq!(e.price, "");
        assert_eq!(e.bin_number, "");
    }

    #[test]
    fn test_import_type_must_match_exactly() {
        let csv = "name,type\nA,White\nB,white\nC,Champagne/Sparkling\n";
        let entries = import_rows(csv, 0).unwrap();
        assert_eq!(entries[0].wine_type, WineType::White);
        assert_eq!(entries[1].wine_type, WineType::Red);
        assert_eq!(entries[2].wine_type, WineType::Champagne);
    }

    #[test]
    fn test_import_created_at_is_strictly_increasing_in_file_order() {
        let csv = "name\nfirst\nsecond\nthird\n";
        let entries = import_rows(csv, 500).unwrap();
        let stamps: Vec<i64> = entries.iter().map(|e| e.created_at).collect();
        assert_eq!(stamps, vec![501, 502, 503]);
        assert_eq!(entries[0].name, "first");
    }

    #[test]
    fn test_import_skips_empty_data_rows() {
        let csv = "name,maker\nA,M\n   \nB,N\n";
        let entries = import_rows(csv, 0).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_export_shape() {
        let mut entry = WineEntry::draft(vec![]);
        entry.name = "Barolo".to_string();
        entry.maker = "Rinaldi".to_string();
        entry.year = "2016".to_string();
        entry.price = "$90".to_string();
        entry.bin_number = "A3".to_string();
        entry.notes = "decant".to_string();

        let csv = export_csv([&entry]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Name,Maker,Year,Type,Price,Bin,Notes"));
        assert_eq!(
            lines.next(),
            Some(r#""Barolo","Rinaldi","2016","Red","$90","A3","decant""#)
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_export_import_round_trip_preserves_the_seven_fields() {
        let mut a = WineEntry::draft(vec!["image".to_string()]);
        a.name = "Cloudy Bay".to_string();
        a.maker = "Cloudy Bay".to_string();
        a.year = "2022".to_string();
        a.wine_type = WineType::White;
        a.price = "30".to_string();
        a.bin_number = "B1".to_string();
        a.notes = "summer".to_string();
        a.description = "should not survive the trip".to_string();
        a.custom_fields.push(crate::CustomField {
            label: "region".to_string(),
            value: "Marlborough".to_string(),
        });

        let csv = export_csv([&a]);
        let back = import_rows(&csv, 9_000).unwrap();
        assert_eq!(back.len(), 1);
        let b = &back[0];
        assert_eq!(
            (
                b.name.as_str(),
                b.maker.as_str(),
                b.year.as_str(),
                b.wine_type,
                b.price.as_str(),
                b.bin_number.as_str(),
                b.notes.as_str(),
            ),
            ("Cloudy Bay", "Cloudy Bay", "2022", WineType::White, "30", "B1", "summer")
        );
        // Description, custom fields, and images are not part of the export.
        assert!(b.description.is_empty());
        assert!(b.custom_fields.is_empty());
        assert!(b.image_urls.is_empty());
        assert_ne!(b.id, a.id);
    }
}
