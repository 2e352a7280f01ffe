//! In-memory ordered table mirroring one remote collection

use servis_api::{DocumentId, RecordKind, ID_HEADER};

use crate::error::{Result, ServisError};

/// Column of a record table. Column 0 is always the hidden id column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    /// Database field, `None` for the id column
    pub field: Option<&'static str>,
    pub hidden: bool,
}

/// One row, mirroring exactly one remote document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: DocumentId,
    /// Display text of the declared field columns (id excluded)
    cells: Vec<String>,
    hidden: bool,
}

impl Row {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Text of a column, where column 0 is the id
    pub fn cell(&self, column: usize) -> Option<&str> {
        if column == 0 {
            Some(&self.id)
        } else {
            self.cells.get(column - 1).map(String::as_str)
        }
    }

    /// All column texts, id first
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str()).chain(self.cells.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone)]
pub struct RecordTable {
    kind: RecordKind,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl RecordTable {
    pub fn new(kind: RecordKind) -> Self {
        let id_column = Column {
            header: ID_HEADER,
            field: None,
            hidden: true,
        };
        let columns = std::iter::once(id_column)
            .chain(kind.columns().iter().map(|spec| Column {
                header: spec.header,
                field: Some(spec.field),
                hidden: spec.hidden,
            }))
            .collect();

        Self {
            kind,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, column: usize) -> Result<&Column> {
        self.columns.get(column).ok_or(ServisError::ColumnOutOfRange {
            kind: self.kind,
            column,
        })
    }

    /// Position of a column by its database field
    pub fn column_of_field(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.field == Some(field))
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, row: usize) -> Result<&Row> {
        self.rows.get(row).ok_or(ServisError::RowOutOfRange {
            kind: self.kind,
            row,
            len: self.rows.len(),
        })
    }

    /// First row mirroring the given document
    pub fn position(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.id.as_str())
    }

    /// Visible rows with their model positions
    pub fn visible_rows(&self) -> impl Iterator<Item = (usize, &Row)> {
        self.rows.iter().enumerate().filter(|(_, r)| !r.hidden)
    }

    pub(crate) fn append_row(&mut self, id: DocumentId, cells: Vec<String>) {
        debug_assert_eq!(cells.len() + 1, self.columns.len());
        self.rows.push(Row {
            id,
            cells,
            hidden: false,
        });
    }

    /// Overwrite the field cells of a row, keeping its visibility
    pub(crate) fn replace_cells(&mut self, row: usize, cells: Vec<String>) {
        if let Some(r) = self.rows.get_mut(row) {
            r.cells = cells;
        }
    }

    /// Remove the first row mirroring `id`; returns whether a row was removed
    pub fn remove_row(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(row) => {
                self.rows.remove(row);
                true
            }
            None => false,
        }
    }

    /// Set the text of a field cell. The id column cannot be written.
    pub(crate) fn set_cell(&mut self, row: usize, column: usize, text: String) -> Result<()> {
        let kind = self.kind;
        let len = self.rows.len();
        if column == 0 || column >= self.columns.len() {
            return Err(ServisError::ColumnOutOfRange { kind, column });
        }
        let r = self
            .rows
            .get_mut(row)
            .ok_or(ServisError::RowOutOfRange { kind, row, len })?;
        r.cells[column - 1] = text;
        Ok(())
    }

    pub fn set_row_hidden(&mut self, row: usize, hidden: bool) {
        if let Some(r) = self.rows.get_mut(row) {
            r.hidden = hidden;
        }
    }

    pub fn show_all_rows(&mut self) {
        for r in &mut self.rows {
            r.hidden = false;
        }
    }
}
