use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, MarkerShape, Plot, PlotPoints, Points};

use crate::color::{ColorMap, CATEGORICAL};
use crate::data::aggregate::{GenreRelative, KeyTonality, RelativeYear};
use crate::data::model::{PitchClass, RelativeKey};

const CHART_HEIGHT: f32 = 280.0;

/// Colour of a relative key; fixed so series keep their colour across filters.
fn relative_color(key: RelativeKey) -> Color32 {
    CATEGORICAL[key.major().index() % CATEGORICAL.len()]
}

fn no_data(ui: &mut Ui, title: &str) {
    ui.strong(title);
    ui.colored_label(Color32::from_rgb(0xE6, 0x86, 0x00), "⚠ No data provided.");
}

/// Axis formatter showing `labels[i]` at integer positions and nothing
/// in between.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let rounded = mark.value.round();
        if (mark.value - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        labels.get(rounded as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Per-key bar charts
// ---------------------------------------------------------------------------

/// Grouped bars: x = pitch class (fixed C → B order), one series per
/// tonality placed side by side within each key slot.
pub fn key_bar_chart(
    ui: &mut Ui,
    id: &str,
    title: &str,
    y_label: &str,
    data: &BTreeMap<KeyTonality, f64>,
) {
    if data.is_empty() {
        no_data(ui, title);
        return;
    }

    let tonalities: BTreeSet<&str> = data.keys().map(|(_, t)| t.as_str()).collect();
    let colors = ColorMap::new(tonalities.iter().copied());
    let slot = 0.8 / tonalities.len() as f64;

    let charts: Vec<BarChart> = tonalities
        .iter()
        .enumerate()
        .map(|(i, tonality)| {
            let offset = -0.4 + slot * (i as f64 + 0.5);
            let bars = data
                .iter()
                .filter(|((_, t), _)| t.as_str() == *tonality)
                .map(|((key, _), value)| {
                    Bar::new(key.index() as f64 + offset, *value)
                        .width(slot * 0.95)
                        .name(format!("{key} {tonality}"))
                })
                .collect();
            BarChart::new(bars)
                .name(*tonality)
                .color(colors.color_for(tonality))
        })
        .collect();

    let key_labels = PitchClass::ALL.iter().map(|k| k.to_string()).collect();

    ui.strong(title);
    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Key")
        .y_axis_label(y_label)
        .x_axis_formatter(category_axis(key_labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Key evolution line chart
// ---------------------------------------------------------------------------

/// One line (with markers) per relative key: x = year, y = tracks.
pub fn key_evolution_chart(ui: &mut Ui, data: &BTreeMap<RelativeYear, usize>) {
    const TITLE: &str = "Keys evolution over time";
    if data.is_empty() {
        no_data(ui, TITLE);
        return;
    }

    ui.strong(TITLE);
    Plot::new("key_evolution")
        .height(CHART_HEIGHT + 60.0)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Tracks")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for key in RelativeKey::ALL {
                let points: Vec<[f64; 2]> = data
                    .range((key, i32::MIN)..=(key, i32::MAX))
                    .map(|(&(_, year), &tracks)| [year as f64, tracks as f64])
                    .collect();
                if points.is_empty() {
                    continue;
                }
                let color = relative_color(key);
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(key.label())
                        .color(color)
                        .width(1.5),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(key.label())
                        .color(color)
                        .shape(MarkerShape::Circle)
                        .radius(3.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Per-genre bubble charts
// ---------------------------------------------------------------------------

/// Bubbles: x = genre (lexicographic), y = value, radius grows with the
/// value, one colour per relative key.
pub fn genre_bubble_chart(
    ui: &mut Ui,
    id: &str,
    title: &str,
    y_label: &str,
    data: &BTreeMap<GenreRelative, f64>,
) {
    if data.is_empty() {
        no_data(ui, title);
        return;
    }

    let genres: Vec<String> = data
        .keys()
        .map(|(g, _)| g.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let max = data.values().copied().fold(0.0_f64, f64::max);

    let mut bubbles = Vec::with_capacity(data.len());
    for ((genre, key), value) in data {
        let value = *value;
        let x = genres.binary_search(genre).unwrap_or_default() as f64;
        let radius = if max > 0.0 {
            2.0 + 16.0 * (value / max).max(0.0).sqrt()
        } else {
            2.0
        };
        bubbles.push((*key, x, value, radius as f32));
    }
    // Series names drive the legend; emit in relative-key order.
    bubbles.sort_by_key(|(key, ..)| *key);

    ui.strong(title);
    Plot::new(id)
        .height(CHART_HEIGHT + 60.0)
        .legend(Legend::default())
        .x_axis_label("Genre")
        .y_axis_label(y_label)
        .x_axis_formatter(category_axis(genres))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (key, x, y, radius) in bubbles {
                plot_ui.points(
                    Points::new(PlotPoints::from(vec![[x, y]]))
                        .name(key.label())
                        .color(relative_color(key).gamma_multiply(0.8))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(radius),
                );
            }
        });
}

/// Count map as plot heights, for [`key_bar_chart`] / [`genre_bubble_chart`].
pub fn counts<K: Ord + Clone>(data: &BTreeMap<K, usize>) -> BTreeMap<K, f64> {
    data.iter().map(|(k, v)| (k.clone(), *v as f64)).collect()
}
