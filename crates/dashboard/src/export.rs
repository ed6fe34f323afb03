//! Column selection and CSV encoding for page tables.
//!
//! A table shows the columns the user picked, in the order they picked
//! them, and the CSV download carries exactly the same selection over the
//! same filtered rows.

use std::fmt::Write;

use thiserror::Error;

/// Errors from building a table or export.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("unknown column '{column}' (available: {available})")]
    UnknownColumn { column: String, available: String },
}

/// A row that can be rendered column by column.
pub trait TableRow {
    /// Every selectable column, in natural order.
    const COLUMNS: &'static [&'static str];

    /// Columns shown when the request does not choose any.
    const DEFAULT_COLUMNS: &'static [&'static str];

    /// Text of one cell. Missing values render as an empty string.
    fn cell(&self, column: &str) -> String;
}

/// Resolve a comma-separated column list against `R::COLUMNS`.
///
/// An absent or blank list yields the defaults. Duplicates keep their first
/// position.
///
/// # Errors
///
/// Returns `ExportError::UnknownColumn` for the first name not in
/// `R::COLUMNS`.
pub fn select_columns<R: TableRow>(raw: Option<&str>) -> Result<Vec<&'static str>, ExportError> {
    let requested: Vec<&str> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if requested.is_empty() {
        return Ok(R::DEFAULT_COLUMNS.to_vec());
    }

    let mut selected: Vec<&'static str> = Vec::with_capacity(requested.len());
    for name in requested {
        let column = R::COLUMNS
            .iter()
            .find(|c| **c == name)
            .ok_or_else(|| ExportError::UnknownColumn {
                column: name.to_string(),
                available: R::COLUMNS.join(", "),
            })?;
        if !selected.contains(column) {
            selected.push(column);
        }
    }
    Ok(selected)
}

/// Header and cell text for a rendered table.
#[derive(Debug, Clone, Default)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn build<R: TableRow>(rows: &[R], columns: &[&str]) -> Self {
        Self {
            headers: columns.iter().map(ToString::to_string).collect(),
            rows: rows
                .iter()
                .map(|row| columns.iter().map(|c| row.cell(c)).collect())
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Encode rows as UTF-8 CSV with a header line and no index column.
pub fn to_csv<R: TableRow>(rows: &[R], columns: &[&str]) -> String {
    let mut csv = String::new();
    write_record(&mut csv, columns.iter().copied());
    for row in rows {
        let cells: Vec<String> = columns.iter().map(|c| row.cell(c)).collect();
        write_record(&mut csv, cells.iter().map(String::as_str));
    }
    csv
}

fn write_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{}", escape_field(field));
    }
    out.push('\n');
}

/// Quote a field if it contains a delimiter, quote, or line break.
fn escape_field(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        std::borrow::Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        std::borrow::Cow::Borrowed(field)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Item {
        id: i32,
        note: Option<&'static str>,
    }

    impl TableRow for Item {
        const COLUMNS: &'static [&'static str] = &["id", "note"];
        const DEFAULT_COLUMNS: &'static [&'static str] = &["id"];

        fn cell(&self, column: &str) -> String {
            match column {
                "id" => self.id.to_string(),
                "note" => self.note.unwrap_or_default().to_string(),
                _ => String::new(),
            }
        }
    }

    #[test]
    fn test_blank_selection_uses_defaults() {
        assert_eq!(select_columns::<Item>(None).unwrap(), vec!["id"]);
        assert_eq!(select_columns::<Item>(Some(" , ")).unwrap(), vec!["id"]);
    }

    #[test]
    fn test_selection_keeps_order_and_drops_duplicates() {
        let columns = select_columns::<Item>(Some("note,id,note")).unwrap();
        assert_eq!(columns, vec!["note", "id"]);
    }

    #[test]
    fn test_unknown_column_rejected() {
        let err = select_columns::<Item>(Some("id,password")).unwrap_err();
        assert_eq!(
            err,
            ExportError::UnknownColumn {
                column: "password".to_string(),
                available: "id, note".to_string(),
            }
        );
    }

    #[test]
    fn test_csv_quotes_special_characters() {
        let rows = [
            Item {
                id: 1,
                note: Some("Jl. Merdeka, No. 5"),
            },
            Item {
                id: 2,
                note: Some("say \"hi\""),
            },
            Item {
                id: 3,
                note: Some("line\nbreak"),
            },
            Item { id: 4, note: None },
        ];
        let csv = to_csv(&rows, &["id", "note"]);
        assert_eq!(
            csv,
            "id,note\n1,\"Jl. Merdeka, No. 5\"\n2,\"say \"\"hi\"\"\"\n3,\"line\nbreak\"\n4,\n"
        );
    }

    #[test]
    fn test_csv_respects_column_order() {
        let rows = [Item {
            id: 7,
            note: Some("x"),
        }];
        assert_eq!(to_csv(&rows, &["note", "id"]), "note,id\nx,7\n");
    }

    #[test]
    fn test_table_view_matches_selection() {
        let rows = [Item { id: 9, note: None }];
        let table = TableView::build(&rows, &["id"]);
        assert_eq!(table.headers, vec!["id"]);
        assert_eq!(table.rows, vec![vec!["9".to_string()]]);
        assert!(TableView::default().is_empty());
    }
}
