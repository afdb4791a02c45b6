use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::Config;
use crate::state::AppState;
use crate::ui::charts::{self, counts};
use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct KeyscopeApp {
    pub state: AppState,
}

impl KeyscopeApp {
    /// Create the app and load the configured dataset.
    pub fn new(config: &Config) -> Self {
        let mut state = AppState::new(config);
        state.open(config.data.clone());
        Self { state }
    }
}

impl eframe::App for KeyscopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                load_failure(ui, &self.state);
                return;
            }
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| dashboard(ui, &self.state));
        });
    }
}

/// Shown instead of the dashboard when no dataset is loaded.
fn load_failure(ui: &mut Ui, state: &AppState) {
    ui.centered_and_justified(|ui: &mut Ui| match &state.status_message {
        Some(msg) => {
            ui.label(
                RichText::new(format!("Could not load dataset\n\n{msg}"))
                    .heading()
                    .color(Color32::RED),
            );
        }
        None => {
            ui.heading("Open a dataset to begin  (File → Open…)");
        }
    });
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    let summary = &state.summary;

    ui.heading("🎼 Key and Tonality Dashboard");
    ui.label(
        "Explore the keys and tonalities of the loaded tracks. \
         Use the filters in the left sidebar to narrow the analysis.",
    );

    ui.add_space(8.0);
    ui.strong("General Metrics");
    panels::kpi_row(ui, state);
    ui.separator();

    ui.heading("Graphs");
    charts::key_bar_chart(
        ui,
        "tracks_per_key",
        "Number of Tracks per Key",
        "Tracks",
        &counts(&summary.tracks_per_key),
    );

    ui.columns(3, |cols: &mut [Ui]| {
        charts::key_bar_chart(
            &mut cols[0],
            "mean_popularity_per_key",
            "Mean Popularity per Key",
            "Popularity",
            &summary.mean_popularity_per_key,
        );
        charts::key_bar_chart(
            &mut cols[1],
            "mean_instrumentalness_per_key",
            "Mean Instrumentalness per Key",
            "Instrumentalness",
            &summary.mean_instrumentalness_per_key,
        );
        charts::key_bar_chart(
            &mut cols[2],
            "mean_valence_per_key",
            "Mean Valence per Key",
            "Valence",
            &summary.mean_valence_per_key,
        );
    });

    charts::key_evolution_chart(ui, &summary.key_evolution);
    charts::genre_bubble_chart(
        ui,
        "tracks_per_genre_and_key",
        "Tracks per key in each Genre",
        "Tracks",
        &counts(&summary.tracks_per_genre_and_key),
    );
    charts::genre_bubble_chart(
        ui,
        "mean_popularity_per_genre_and_key",
        "Mean Popularity per key in each Genre",
        "Popularity",
        &summary.mean_popularity_per_genre_and_key,
    );

    ui.separator();
    table::detail_table(ui, state);
}
