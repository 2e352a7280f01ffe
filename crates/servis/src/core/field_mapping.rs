//! Display-name to database-field translation for in-place cell edits

/// Headers whose cells may be written back to the remote document.
///
/// `ID` and the derived `Datum`/`Vreme` columns are absent: their cells show
/// reformatted or key data, and writing that text back would corrupt the
/// stored value.
const FIELD_MAPPING: &[(&str, &str)] = &[
    ("Pripada", "pripada"),
    ("Ime", "ime"),
    ("Prezime", "prezime"),
    ("Telefon", "telefon"),
    ("Model", "model"),
    ("Vrsta", "vrsta"),
    ("Broj šasije", "sasija"),
    ("Broj motora", "motor"),
    ("Tablice", "tablice"),
    ("Godište", "godiste"),
    ("Snaga", "snaga"),
    ("Kubikaža", "kubikaza"),
    ("Detalji", "detalji"),
    ("Kilometraža", "kilometraza"),
    ("Cena", "cena"),
];

/// Database field for a column header, `None` when edits of that column are discarded
pub fn field_for_header(header: &str) -> Option<&'static str> {
    FIELD_MAPPING
        .iter()
        .find(|(display, _)| *display == header)
        .map(|(_, field)| *field)
}
