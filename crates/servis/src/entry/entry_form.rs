//! New-record entry form for customers and vehicles

use std::collections::HashMap;

use servis_api::{DocumentId, Fields, RecordKind, Value};

use crate::core::RecordTable;
use crate::error::{Result, ServisError};

const CUSTOMER_INPUTS: &[(&str, &str)] = &[
    ("ime", "Ime"),
    ("prezime", "Prezime"),
    ("telefon", "Telefon"),
];

const VEHICLE_INPUTS: &[(&str, &str)] = &[
    ("model", "Model"),
    ("vrsta", "Vrsta"),
    ("sasija", "Šasija"),
    ("motor", "Motor"),
    ("tablice", "Tablice"),
    ("godiste", "Godište"),
    ("snaga", "Snaga"),
    ("kubikaza", "Kubikaža"),
];

/// Customer display names and the ids they resolve to
#[derive(Debug, Clone, Default)]
pub struct OwnerDirectory {
    /// Names in table order, as offered by the combo box
    names: Vec<String>,
    ids: HashMap<String, DocumentId>,
}

impl OwnerDirectory {
    /// Build from the customer table; a later duplicate name wins the lookup
    pub fn from_customers(customers: &RecordTable) -> Self {
        let ime = customers.column_of_field("ime");
        let prezime = customers.column_of_field("prezime");
        let mut directory = Self::default();
        for row in customers.rows() {
            let first = ime.and_then(|c| row.cell(c)).unwrap_or_default();
            let last = prezime.and_then(|c| row.cell(c)).unwrap_or_default();
            directory.insert(format!("{} {}", first, last), row.id().to_string());
        }
        directory
    }

    pub fn insert(&mut self, name: String, id: DocumentId) {
        self.names.push(name.clone());
        self.ids.insert(name, id);
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Owner id of an exactly matching name
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.ids.get(name).map(String::as_str)
    }

    /// Name offered for an owner id
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.ids
            .iter()
            .find(|(_, owner)| owner.as_str() == id)
            .map(|(name, _)| name.as_str())
    }

    /// Autocomplete: names starting with `typed`, ignoring case
    pub fn suggestions(&self, typed: &str) -> Vec<&str> {
        let typed = typed.to_lowercase();
        self.names
            .iter()
            .filter(|name| name.to_lowercase().starts_with(&typed))
            .map(String::as_str)
            .collect()
    }
}

/// Text inputs of a new customer or vehicle
#[derive(Debug, Clone)]
pub struct EntryForm {
    kind: RecordKind,
    inputs: &'static [(&'static str, &'static str)],
    values: HashMap<&'static str, String>,
    owner: Option<OwnerField>,
}

/// Editable owner combo box of the vehicle form
#[derive(Debug, Clone)]
pub struct OwnerField {
    pub directory: OwnerDirectory,
    pub text: String,
}

impl EntryForm {
    pub fn customer() -> Self {
        Self {
            kind: RecordKind::Customers,
            inputs: CUSTOMER_INPUTS,
            values: HashMap::new(),
            owner: None,
        }
    }

    /// Vehicle form, preselecting `selected_owner` when it names a known customer
    pub fn vehicle(directory: OwnerDirectory, selected_owner: Option<&str>) -> Self {
        let text = selected_owner
            .and_then(|id| directory.name_of(id))
            .map(str::to_string)
            .or_else(|| directory.names().first().cloned())
            .unwrap_or_default();
        Self {
            kind: RecordKind::Vehicles,
            inputs: VEHICLE_INPUTS,
            values: HashMap::new(),
            owner: Some(OwnerField { directory, text }),
        }
    }

    pub fn for_kind(
        kind: RecordKind,
        customers: &RecordTable,
        selected_owner: Option<&str>,
    ) -> Result<Self> {
        match kind {
            RecordKind::Customers => Ok(Self::customer()),
            RecordKind::Vehicles => Ok(Self::vehicle(
                OwnerDirectory::from_customers(customers),
                selected_owner,
            )),
            RecordKind::Services => Err(ServisError::UnsupportedEntryKind { kind }),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            RecordKind::Customers => "Dodaj Korisnika",
            _ => "Dodaj Vozilo",
        }
    }

    /// (field, placeholder) pairs in input order
    pub fn inputs(&self) -> &'static [(&'static str, &'static str)] {
        self.inputs
    }

    /// Set the text of an input; unknown fields are ignored
    pub fn set(&mut self, field: &str, text: impl Into<String>) {
        if let Some((name, _)) = self.inputs.iter().find(|(name, _)| *name == field) {
            self.values.insert(*name, text.into());
        }
    }

    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or_default()
    }

    pub fn owner(&self) -> Option<&OwnerField> {
        self.owner.as_ref()
    }

    pub fn set_owner_text(&mut self, text: impl Into<String>) {
        if let Some(owner) = &mut self.owner {
            owner.text = text.into();
        }
    }

    /// Field mapping written to the remote collection.
    ///
    /// Texts are stored as typed; an owner name that matches no customer is
    /// stored as `Null`.
    pub fn data(&self) -> Fields {
        let mut data = Fields::new();
        if let Some(owner) = &self.owner {
            let id = owner.directory.resolve(&owner.text).map(str::to_string);
            data.insert("pripada".to_string(), Value::from(id));
        }
        for (field, _) in self.inputs {
            data.insert(field.to_string(), Value::from(self.get(field)));
        }
        data
    }
}
