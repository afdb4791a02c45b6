use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Track;
use crate::state::AppState;
use crate::ui::panels::{format_count, PLACEHOLDER};

const ROW_HEIGHT: f32 = 18.0;

const HEADERS: [&str; 14] = [
    "#",
    "Track",
    "Artist",
    "Year",
    "Genre",
    "Key",
    "Tonality",
    "Key with Relative",
    "Popularity",
    "Instrumentalness",
    "Valence",
    "Danceability",
    "Energy",
    "Tempo",
];

fn optional(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| format!("{v:.decimals$}"))
}

/// Text of every cell of one detail-table row, in [`HEADERS`] order.
fn cells(rank: usize, track: &Track) -> [String; 14] {
    [
        format_count(rank + 1),
        track.track_name.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
        track.artist_name.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
        track.year.to_string(),
        track.genre.clone(),
        track.key_chord_notation.to_string(),
        track.tonality.clone(),
        track.key_relative_notation.to_string(),
        format!("{:.0}", track.popularity),
        format!("{:.3}", track.instrumentalness),
        format!("{:.3}", track.valence),
        optional(track.danceability, 3),
        optional(track.energy, 3),
        optional(track.tempo, 1),
    ]
}

// ---------------------------------------------------------------------------
// Detail table
// ---------------------------------------------------------------------------

/// Render the most popular tracks of the current selection.
pub fn detail_table(ui: &mut Ui, state: &AppState) {
    ui.heading("Detailed Data");
    ui.label(format!(
        "Top {} most popular tracks in the filtered dataset.",
        format_count(state.top_n)
    ));

    let (Some(dataset), false) = (&state.dataset, state.summary.top_tracks.is_empty()) else {
        ui.label(RichText::new("No rows.").weak());
        return;
    };
    let rows = &state.summary.top_tracks;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(420.0)
        .columns(Column::auto().at_least(40.0), HEADERS.len() - 1)
        .column(Column::remainder())
        .header(ROW_HEIGHT + 4.0, |mut header| {
            for title in HEADERS {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let rank = row.index();
                let track = &dataset.tracks[rows[rank]];
                for text in cells(rank, track) {
                    row.col(|ui| {
                        ui.label(text);
                    });
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::track;
    use crate::data::model::PitchClass;

    #[test]
    fn cells_fill_placeholders_for_missing_columns() {
        let mut t = track(2004, "rock", PitchClass::FSharp, true, 77.0);
        t.tempo = Some(128.44);
        let row = cells(0, &t);
        assert_eq!(row.len(), HEADERS.len());
        assert_eq!(row[0], "1");
        assert_eq!(row[1], PLACEHOLDER);
        assert_eq!(row[5], "F#");
        assert_eq!(row[7], "A/F#m");
        assert_eq!(row[8], "77");
        assert_eq!(row[12], PLACEHOLDER);
        assert_eq!(row[13], "128.4");
    }
}
