use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

/// Shown wherever a value cannot be computed for the current selection.
pub const PLACEHOLDER: &str = "–";

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Filter");
    ui.separator();

    // Cheap Arc clone so the selection can be mutated inside the loops.
    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year ----
            let header = format!(
                "Year  ({}/{})",
                state.selection.years.len(),
                dataset.years.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("year_filter")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    all_none_buttons(ui, |all| state.select_all_years(all));
                    for &year in &dataset.years {
                        let mut checked = state.selection.years.contains(&year);
                        if ui.checkbox(&mut checked, year.to_string()).changed() {
                            state.toggle_year(year);
                        }
                    }
                });

            // ---- Genre ----
            let header = format!(
                "Genre  ({}/{})",
                state.selection.genres.len(),
                dataset.genres.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("genre_filter")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    all_none_buttons(ui, |all| state.select_all_genres(all));
                    for genre in &dataset.genres {
                        let mut checked = state.selection.genres.contains(genre);
                        if ui.checkbox(&mut checked, genre.as_str()).changed() {
                            state.toggle_genre(genre);
                        }
                    }
                });

            ui.separator();
            infos(ui);
        });
}

fn all_none_buttons(ui: &mut Ui, mut select: impl FnMut(bool)) {
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            select(true);
        }
        if ui.small_button("None").clicked() {
            select(false);
        }
    });
}

fn infos(ui: &mut Ui) {
    ui.strong("🛈 Infos");
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label("Base dataset:");
        ui.hyperlink_to(
            "Spotify 1M Tracks (Kaggle)",
            "https://www.kaggle.com/datasets/amitanshjoshi/spotify-1million-tracks",
        );
    });
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label("Data license:");
        ui.hyperlink_to("ODbL 1.0", "https://opendatacommons.org/licenses/odbl/1-0/");
    });
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label("Project license:");
        ui.hyperlink_to("BSD-3-Clause", "https://opensource.org/license/bsd-3-clause");
    });
}

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

/// Render the five headline metrics of the current selection.
pub fn kpi_row(ui: &mut Ui, state: &AppState) {
    let top = state.summary.top_key.as_ref();
    let metrics = [
        ("Top Key", top.map(|t| t.label.clone())),
        ("Tracks in top key", top.map(|t| format_count(t.tracks))),
        (
            "Top key mean popularity",
            top.and_then(|t| t.mean_popularity).map(format_decimal),
        ),
        (
            "Top key median popularity",
            top.and_then(|t| t.median_popularity).map(format_decimal),
        ),
        (
            "Tracks in Dataset",
            Some(format_count(state.summary.total_tracks)),
        ),
    ];

    ui.columns(metrics.len(), |cols: &mut [Ui]| {
        for (col, (label, value)) in cols.iter_mut().zip(metrics) {
            col.label(RichText::new(label).small());
            col.heading(value.unwrap_or_else(|| PLACEHOLDER.to_string()));
        }
    });
}

/// `1234567` → `"1,234,567"`.
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Two decimals with thousands separators: `1234.567` → `"1,234.57"`.
pub fn format_decimal(v: f64) -> String {
    let fixed = format!("{:.2}", v.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let int_part = int_part
        .parse::<usize>()
        .map(format_count)
        .unwrap_or_else(|_| int_part.to_string());
    let sign = if v < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{int_part}.{frac}")
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} tracks loaded, {} selected",
                format_count(ds.len()),
                format_count(state.visible_indices.len())
            ));
            ui.separator();
            ui.label(RichText::new(state.data_path.display().to_string()).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open track dataset")
        .add_filter("Supported files", &["gz", "csv", "json", "parquet", "pq"])
        .add_filter("Compressed CSV / JSON", &["gz"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_get_thousands_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(283_412), "283,412");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn decimals_round_to_two_places() {
        assert_eq!(format_decimal(50.0), "50.00");
        assert_eq!(format_decimal(1234.567), "1,234.57");
        assert_eq!(format_decimal(-0.001), "0.00");
        assert_eq!(format_decimal(-1500.5), "-1,500.50");
    }
}
