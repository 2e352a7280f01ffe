//! Record kinds and their fixed column schemas

use serde::{Deserialize, Serialize};
use std::fmt;

/// Header of the identifier column, always the first column of every table
pub const ID_HEADER: &str = "ID";

/// One declared field column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Database field name
    pub field: &'static str,
    /// Header shown in the table
    pub header: &'static str,
    /// Column is kept in the model but not displayed
    pub hidden: bool,
}

const fn shown(field: &'static str, header: &'static str) -> ColumnSpec {
    ColumnSpec {
        field,
        header,
        hidden: false,
    }
}

const fn hidden(field: &'static str, header: &'static str) -> ColumnSpec {
    ColumnSpec {
        field,
        header,
        hidden: true,
    }
}

const CUSTOMER_COLUMNS: &[ColumnSpec] = &[
    shown("ime", "Ime"),
    shown("prezime", "Prezime"),
    shown("telefon", "Telefon"),
];

const VEHICLE_COLUMNS: &[ColumnSpec] = &[
    hidden("pripada", "Pripada"),
    shown("model", "Model"),
    shown("vrsta", "Vrsta"),
    shown("sasija", "Broj šasije"),
    shown("motor", "Broj motora"),
    shown("tablice", "Tablice"),
    shown("godiste", "Godište"),
    shown("snaga", "Snaga"),
    shown("kubikaza", "Kubikaža"),
];

const SERVICE_COLUMNS: &[ColumnSpec] = &[
    hidden("pripada", "Pripada"),
    shown("detalji", "Detalji"),
    shown("kilometraza", "Kilometraža"),
    shown("cena", "Cena"),
    shown("datum", "Datum"),
    shown("vreme", "Vreme"),
];

/// The three record collections of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Customers,
    Vehicles,
    Services,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::Customers,
        RecordKind::Vehicles,
        RecordKind::Services,
    ];

    /// Name of the remote collection
    pub fn collection(self) -> &'static str {
        match self {
            RecordKind::Customers => "korisnici",
            RecordKind::Vehicles => "vozila",
            RecordKind::Services => "servisi",
        }
    }

    pub fn from_collection(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.collection() == name)
    }

    /// Declared field columns, in display order, without the id column
    pub fn columns(self) -> &'static [ColumnSpec] {
        match self {
            RecordKind::Customers => CUSTOMER_COLUMNS,
            RecordKind::Vehicles => VEHICLE_COLUMNS,
            RecordKind::Services => SERVICE_COLUMNS,
        }
    }

    pub fn fields(self) -> impl Iterator<Item = &'static str> {
        self.columns().iter().map(|c| c.field)
    }

    /// Field holding the weak reference to the parent record, if any
    pub fn reference_field(self) -> Option<&'static str> {
        match self {
            RecordKind::Customers => None,
            RecordKind::Vehicles | RecordKind::Services => Some("pripada"),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collections_round_trip_through_names() {
        for kind in RecordKind::ALL {
            assert_eq!(RecordKind::from_collection(kind.collection()), Some(kind));
        }
        assert_eq!(RecordKind::from_collection("racuni"), None);
    }

    #[test]
    fn reference_columns_are_hidden_and_first() {
        for kind in [RecordKind::Vehicles, RecordKind::Services] {
            let first = kind.columns()[0];
            assert_eq!(Some(first.field), kind.reference_field());
            assert!(first.hidden);
        }
        assert!(RecordKind::Customers.columns().iter().all(|c| !c.hidden));
    }

    #[test]
    fn service_fields_are_declared_in_order() {
        let fields: Vec<_> = RecordKind::Services.fields().collect();
        assert_eq!(
            fields,
            vec!["pripada", "detalji", "kilometraza", "cena", "datum", "vreme"]
        );
    }
}
