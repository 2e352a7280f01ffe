//! Plain-text rendering of tables and panels

use servis::core::RecordTable;
use servis::entry::ServiceForm;
use servis::presentation::{VehicleDetails, visible_headers, visible_rows};
use unicode_segmentation::UnicodeSegmentation;

fn width(text: &str) -> usize {
    text.graphemes(true).count()
}

fn pad(text: &str, to: usize) -> String {
    let fill = to.saturating_sub(width(text));
    format!("{}{}", text, " ".repeat(fill))
}

fn table_title(table: &RecordTable) -> &'static str {
    match table.kind() {
        servis::RecordKind::Customers => "Korisnici",
        servis::RecordKind::Vehicles => "Vozila",
        servis::RecordKind::Services => "Servisi",
    }
}

/// A table with a `#` column of row numbers; headers carry their column number
pub fn render_table(table: &RecordTable) -> String {
    let headers: Vec<String> = std::iter::once("#".to_string())
        .chain(
            visible_headers(table)
                .into_iter()
                .map(|(column, header)| format!("{}:{}", column, header)),
        )
        .collect();
    let rows: Vec<Vec<String>> = visible_rows(table)
        .into_iter()
        .map(|row| {
            std::iter::once(row.position.to_string())
                .chain(row.cells)
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| width(h)).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(width(cell));
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| pad(cell, w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = format!(
        "== {} ({} of {}) ==\n",
        table_title(table),
        rows.len(),
        table.len()
    );
    out.push_str(&line(&headers));
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

fn render_pairs(title: &str, pairs: &[(&str, &str)]) -> String {
    let label_width = pairs.iter().map(|(label, _)| width(label)).max().unwrap_or(0);
    let mut out = format!("== {} ==\n", title);
    for (label, value) in pairs {
        out.push_str(&format!("{}  {}\n", pad(label, label_width), value));
    }
    out
}

pub fn render_vehicle_details(details: &VehicleDetails) -> String {
    render_pairs("Vozilo", &details.entries())
}

pub fn render_service_form(form: &ServiceForm) -> String {
    let date = form.date.format("%d.%m.%Y.").to_string();
    let time = form.time.format("%H:%M").to_string();
    render_pairs(
        "Servis",
        &[
            ("Detalji", &form.details),
            ("Kilometraža", &form.mileage),
            ("Cena", &form.price),
            ("Datum", &date),
            ("Vreme", &time),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use servis::core::TableSync;
    use servis::{Change, Fields, RecordKind, Value};

    #[test]
    fn columns_are_aligned_by_grapheme_width() {
        let mut sync = TableSync::new(RecordKind::Customers);
        for (id, ime, prezime) in [("k1", "Đorđe", "Šćepanović"), ("k2", "Ana", "Ilić")] {
            sync.apply_change(&Change::Added {
                id: id.into(),
                fields: Fields::from([
                    ("ime".to_string(), Value::from(ime)),
                    ("prezime".to_string(), Value::from(prezime)),
                ]),
            })
            .unwrap();
        }
        sync.table_mut().set_row_hidden(1, true);

        let text = render_table(sync.table());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "== Korisnici (1 of 2) ==");
        assert_eq!(lines[1], "#  1:Ime  2:Prezime   3:Telefon");
        assert_eq!(lines[2], "0  Đorđe  Šćepanović");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn details_panel_lists_labels_and_values() {
        let details = VehicleDetails {
            model: "Passat".into(),
            ..VehicleDetails::default()
        };
        let text = render_vehicle_details(&details);
        assert!(text.starts_with("== Vozilo ==\n"));
        assert!(text.contains("Model        Passat\n"));
    }
}
