//! Presentation helpers: row filters, vehicle details and table text

pub mod details;
pub mod filter;

pub use details::VehicleDetails;
pub use filter::{apply_reference_filter, apply_text_filter, row_matches};

use crate::core::RecordTable;

/// Model index and header of each column a view shows
pub fn visible_headers(table: &RecordTable) -> Vec<(usize, &'static str)> {
    table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.hidden)
        .map(|(i, c)| (i, c.header))
        .collect()
}

/// A visible row as shown: its model position and the texts of the visible columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub position: usize,
    pub cells: Vec<String>,
}

pub fn visible_rows(table: &RecordTable) -> Vec<RenderedRow> {
    let shown: Vec<usize> = visible_headers(table).into_iter().map(|(i, _)| i).collect();
    table
        .visible_rows()
        .map(|(position, row)| RenderedRow {
            position,
            cells: shown
                .iter()
                .map(|&c| row.cell(c).unwrap_or_default().to_string())
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TableSync;
    use servis_api::{Change, Fields, RecordKind, Value};

    #[test]
    fn hidden_columns_and_rows_are_left_out() {
        let mut sync = TableSync::new(RecordKind::Services);
        for (id, vehicle) in [("s1", "v1"), ("s2", "v2")] {
            sync.apply_change(&Change::Added {
                id: id.into(),
                fields: Fields::from([
                    ("pripada".to_string(), Value::from(vehicle)),
                    ("detalji".to_string(), Value::from("Ulje")),
                    ("datum_vreme".to_string(), Value::from("2024-03-05 09:07:00")),
                ]),
            })
            .unwrap();
        }
        let table = sync.table_mut();
        apply_reference_filter(table, "pripada", Some("v2"));

        assert_eq!(
            visible_headers(table),
            vec![
                (2, "Detalji"),
                (3, "Kilometraža"),
                (4, "Cena"),
                (5, "Datum"),
                (6, "Vreme")
            ]
        );
        let rows = visible_rows(table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[0].cells, vec!["Ulje", "", "", "05.03.2024.", "09:07"]);
    }
}
