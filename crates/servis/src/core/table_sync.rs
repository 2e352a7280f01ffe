//! Bidirectional synchronization between one remote collection and its table
//!
//! Architecture:
//! - Remote change batches are applied to the table in delivery order
//! - Local cell edits are confirmed by the user, then patched into the remote document
//! - The remote write is never reflected directly; its effect arrives as a later MODIFIED

use std::collections::HashMap;

use servis_api::{Change, ChangeBatch, Fields, RecordKind, RemoteCollections, Value};
use tracing::{debug, info};

use crate::confirm::{ConfirmRequest, Confirmer};
use crate::core::field_mapping::field_for_header;
use crate::core::table::RecordTable;
use crate::core::timestamp::{self, COMBINED_FIELD, DATE_FIELD, TIME_FIELD};
use crate::error::Result;

/// Result of a local cell edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The column has no database field; the edit stays local only
    Unmapped,
    /// The user declined; the remote document is untouched
    Declined,
    /// The field was patched in the remote document
    Written { field: &'static str },
}

/// Keeps one `RecordTable` in agreement with one remote collection
#[derive(Debug, Clone)]
pub struct TableSync {
    table: RecordTable,
}

impl TableSync {
    pub fn new(kind: RecordKind) -> Self {
        Self {
            table: RecordTable::new(kind),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.table.kind()
    }

    pub fn collection(&self) -> &'static str {
        self.table.kind().collection()
    }

    pub fn table(&self) -> &RecordTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut RecordTable {
        &mut self.table
    }

    /// Apply a change batch entry by entry.
    ///
    /// A failing entry aborts the batch; entries before it stay applied.
    #[tracing::instrument(name = "sync.apply_batch", skip(self, batch), fields(collection = self.collection(), changes = batch.len()))]
    pub fn apply_batch(&mut self, batch: &ChangeBatch) -> Result<()> {
        for change in &batch.items {
            self.apply_change(change)?;
        }
        Ok(())
    }

    pub fn apply_change(&mut self, change: &Change) -> Result<()> {
        debug!(
            "[TableSync] {} {} on {}",
            change.kind_name(),
            change.id(),
            self.collection()
        );
        match change {
            Change::Added { id, fields } => {
                let cells = self.render_cells(fields)?;
                self.table.append_row(id.clone(), cells);
            }
            Change::Modified { id, fields } => {
                if let Some(row) = self.table.position(id) {
                    let cells = self.render_cells(fields)?;
                    self.table.replace_cells(row, cells);
                } else {
                    debug!("[TableSync] MODIFIED for unknown id {} ignored", id);
                }
            }
            Change::Removed { id } => {
                self.table.remove_row(id);
            }
        }
        Ok(())
    }

    /// Display texts of the declared field columns for a document
    fn render_cells(&self, fields: &Fields) -> Result<Vec<String>> {
        let kind = self.kind();
        let mut cells: Vec<String> = kind
            .fields()
            .map(|field| fields.get(field).map(Value::display_text).unwrap_or_default())
            .collect();

        if kind == RecordKind::Services {
            let combined = fields
                .get(COMBINED_FIELD)
                .filter(|v| !v.is_null())
                .map(Value::display_text);
            let date_at = self.cell_index(DATE_FIELD);
            let time_at = self.cell_index(TIME_FIELD);
            match combined {
                Some(raw) => {
                    let (date, time) = timestamp::display_timestamp(&raw)?;
                    if let Some(i) = date_at {
                        cells[i] = date;
                    }
                    if let Some(i) = time_at {
                        cells[i] = time;
                    }
                }
                None => {
                    if let Some(i) = date_at {
                        cells[i] = timestamp::display_date(&cells[i]);
                    }
                    if let Some(i) = time_at {
                        cells[i] = timestamp::display_time(&cells[i]);
                    }
                }
            }
        }

        Ok(cells)
    }

    /// Index into a row's field cells (id excluded)
    fn cell_index(&self, field: &str) -> Option<usize> {
        self.table.column_of_field(field).map(|c| c - 1)
    }

    /// Propagate a user edit of one cell to the remote document.
    ///
    /// Field cells show `text` immediately, whatever the outcome; a declined or
    /// unmapped edit stays visible until the next remote update of the row.
    /// Edits of the id column are discarded as unmapped.
    #[tracing::instrument(name = "sync.edit_cell", skip(self, remote, confirmer, text), fields(collection = self.collection()))]
    pub async fn edit_cell(
        &mut self,
        remote: &dyn RemoteCollections,
        confirmer: &mut dyn Confirmer,
        row: usize,
        column: usize,
        text: String,
    ) -> Result<EditOutcome> {
        let header = self.table.column(column)?.header;
        let id = self.table.row(row)?.id().to_string();
        // the id column is never rewritten, not even locally
        if column != 0 {
            self.table.set_cell(row, column, text.clone())?;
        }

        let Some(field) = field_for_header(header) else {
            debug!("[TableSync] Column {} has no field mapping, edit kept local", header);
            return Ok(EditOutcome::Unmapped);
        };

        let current = remote.get_document(self.collection(), &id).await?;
        let old_value = current
            .get(field)
            .map(Value::display_text)
            .unwrap_or_default();

        let request = ConfirmRequest::field_update(&old_value, &text);
        if !confirmer.confirm(&request).await {
            info!("[TableSync] Edit of {}.{} declined", id, field);
            return Ok(EditOutcome::Declined);
        }

        let patch: Fields = HashMap::from([(field.to_string(), Value::String(text))]);
        remote
            .update_document(self.collection(), &id, patch)
            .await?;
        info!("[TableSync] Wrote {}.{} to {}", id, field, self.collection());
        Ok(EditOutcome::Written { field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServisError;

    fn fields(pairs: &[(&str, Value)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn added(id: &str, pairs: &[(&str, Value)]) -> Change {
        Change::Added {
            id: id.to_string(),
            fields: fields(pairs),
        }
    }

    #[test]
    fn added_rows_follow_declared_column_order() {
        let mut sync = TableSync::new(RecordKind::Customers);
        sync.apply_change(&added(
            "k1",
            &[
                ("telefon", "0611234567".into()),
                ("ime", "Marko".into()),
                ("prezime", "Petrović".into()),
            ],
        ))
        .unwrap();

        let texts: Vec<_> = sync.table().row(0).unwrap().texts().collect();
        assert_eq!(texts, vec!["k1", "Marko", "Petrović", "0611234567"]);
    }

    #[test]
    fn unset_fields_render_empty() {
        let mut sync = TableSync::new(RecordKind::Vehicles);
        sync.apply_change(&added("v1", &[("model", "Golf".into()), ("pripada", Value::Null)]))
            .unwrap();
        let row = sync.table().row(0).unwrap();
        assert_eq!(row.cell(1), Some(""));
        assert_eq!(row.cell(2), Some("Golf"));
        assert_eq!(row.cell(9), Some(""));
    }

    #[test]
    fn modified_for_unknown_id_is_a_no_op() {
        let mut sync = TableSync::new(RecordKind::Customers);
        sync.apply_change(&Change::Modified {
            id: "ghost".into(),
            fields: fields(&[("ime", "Ana".into())]),
        })
        .unwrap();
        assert!(sync.table().is_empty());
    }

    #[test]
    fn modified_overwrites_in_place_and_keeps_position() {
        let mut sync = TableSync::new(RecordKind::Customers);
        let batch = ChangeBatch::new(vec![
            added("a", &[("ime", "Ana".into())]),
            added("b", &[("ime", "Bojan".into())]),
            Change::Modified {
                id: "a".into(),
                fields: fields(&[("ime", "Anja".into()), ("telefon", "063".into())]),
            },
        ]);
        sync.apply_batch(&batch).unwrap();

        let first = sync.table().row(0).unwrap();
        assert_eq!(first.id(), "a");
        assert_eq!(first.cell(1), Some("Anja"));
        assert_eq!(first.cell(3), Some("063"));
        assert_eq!(sync.table().row(1).unwrap().id(), "b");
    }

    #[test]
    fn removed_is_idempotent() {
        let mut sync = TableSync::new(RecordKind::Customers);
        let batch = ChangeBatch::new(vec![
            added("a", &[]),
            Change::Removed { id: "a".into() },
            Change::Removed { id: "a".into() },
            Change::Removed { id: "never".into() },
        ]);
        sync.apply_batch(&batch).unwrap();
        assert!(sync.table().is_empty());
    }

    #[test]
    fn combined_timestamp_fills_date_and_time_columns() {
        let mut sync = TableSync::new(RecordKind::Services);
        sync.apply_change(&added(
            "s1",
            &[
                ("pripada", "v1".into()),
                ("cena", Value::Float(4500.0)),
                ("kilometraza", Value::Integer(182000)),
                ("datum_vreme", "2024-05-17 14:30:00".into()),
            ],
        ))
        .unwrap();
        let texts: Vec<_> = sync.table().row(0).unwrap().texts().collect();
        assert_eq!(
            texts,
            vec!["s1", "v1", "", "182000", "4500.0", "17.05.2024.", "14:30"]
        );
    }

    #[test]
    fn separate_date_and_time_fields_are_reformatted() {
        let mut sync = TableSync::new(RecordKind::Services);
        sync.apply_change(&added(
            "s1",
            &[("datum", "2024-05-17".into()), ("vreme", "08:00:00".into())],
        ))
        .unwrap();
        let row = sync.table().row(0).unwrap();
        assert_eq!(row.cell(5), Some("17.05.2024."));
        assert_eq!(row.cell(6), Some("08:00"));
    }

    #[test]
    fn malformed_timestamp_aborts_the_rest_of_the_batch() {
        let mut sync = TableSync::new(RecordKind::Services);
        let batch = ChangeBatch::new(vec![
            added("s1", &[]),
            added("s2", &[("datum_vreme", "2024-05-17".into())]),
            added("s3", &[]),
        ]);
        let err = sync.apply_batch(&batch).unwrap_err();
        assert!(matches!(err, ServisError::MalformedTimestamp { .. }));
        let ids: Vec<_> = sync.table().ids().collect();
        assert_eq!(ids, vec!["s1"]);
    }

    #[test]
    fn remote_modification_keeps_row_visibility() {
        let mut sync = TableSync::new(RecordKind::Customers);
        sync.apply_change(&added("a", &[("ime", "Ana".into())])).unwrap();
        sync.table_mut().set_row_hidden(0, true);
        sync.apply_change(&Change::Modified {
            id: "a".into(),
            fields: fields(&[("ime", "Anja".into())]),
        })
        .unwrap();
        assert!(sync.table().row(0).unwrap().is_hidden());
    }
}
