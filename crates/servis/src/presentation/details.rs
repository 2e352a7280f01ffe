//! Detail panel of the selected vehicle

use servis_api::{Fields, Value};

/// Detail fields shown for the selected vehicle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleDetails {
    pub model: String,
    pub vrsta: String,
    pub sasija: String,
    pub motor: String,
    pub tablice: String,
    pub godiste: String,
    pub snaga: String,
    pub kubikaza: String,
}

impl VehicleDetails {
    pub fn from_fields(fields: &Fields) -> Self {
        let text = |field: &str| fields.get(field).map(Value::display_text).unwrap_or_default();
        Self {
            model: text("model"),
            vrsta: text("vrsta"),
            sasija: text("sasija"),
            motor: text("motor"),
            tablice: text("tablice"),
            godiste: text("godiste"),
            snaga: text("snaga"),
            kubikaza: text("kubikaza"),
        }
    }

    /// (label, value) pairs in panel order
    pub fn entries(&self) -> [(&'static str, &str); 8] {
        [
            ("Model", &self.model),
            ("Vrsta", &self.vrsta),
            ("Broj šasije", &self.sasija),
            ("Broj motora", &self.motor),
            ("Tablice", &self.tablice),
            ("Godište", &self.godiste),
            ("Snaga", &self.snaga),
            ("Kubikaža", &self.kubikaza),
        ]
    }
}
