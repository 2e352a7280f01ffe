//! Row visibility filters. Rows are hidden, never removed from the table.

use crate::core::table::{RecordTable, Row};

/// Whether any column of the row contains `search`, ignoring case
pub fn row_matches(row: &Row, search: &str) -> bool {
    let needle = search.to_lowercase();
    row.texts().any(|text| text.to_lowercase().contains(&needle))
}

/// Show rows matching `search` and hide the rest
pub fn apply_text_filter(table: &mut RecordTable, search: &str) {
    let visibility: Vec<bool> = table
        .rows()
        .iter()
        .map(|row| row_matches(row, search))
        .collect();
    for (row, visible) in visibility.into_iter().enumerate() {
        table.set_row_hidden(row, !visible);
    }
}

/// Show only rows whose reference column equals `parent_id`.
///
/// `None` shows every row.
pub fn apply_reference_filter(table: &mut RecordTable, reference_field: &str, parent_id: Option<&str>) {
    let Some(parent_id) = parent_id else {
        table.show_all_rows();
        return;
    };
    let Some(column) = table.column_of_field(reference_field) else {
        return;
    };
    let visibility: Vec<bool> = table
        .rows()
        .iter()
        .map(|row| row.cell(column) == Some(parent_id))
        .collect();
    for (row, visible) in visibility.into_iter().enumerate() {
        table.set_row_hidden(row, !visible);
    }
}
