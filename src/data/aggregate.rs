//! Grouped summaries of a [`FilteredView`].
//!
//! Every function here is pure and returns an empty map / `None` for an
//! empty view. Means and medians skip NaN inputs; a group with nothing but
//! NaN is left out rather than reported as NaN.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::filter::FilteredView;
use super::model::{PitchClass, RelativeKey, Track};

/// Detail table length used when none is configured.
pub const DEFAULT_TOP_N: usize = 10_000;

/// Grouping key of the per-key charts: chord notation, then tonality.
pub type KeyTonality = (PitchClass, String);
/// Grouping key of the evolution chart.
pub type RelativeYear = (RelativeKey, i32);
/// Grouping key of the per-genre charts.
pub type GenreRelative = (String, RelativeKey);

// ---------------------------------------------------------------------------
// Scalar statistics
// ---------------------------------------------------------------------------

/// Arithmetic mean of the non-NaN values, `None` if there are none.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Median of the non-NaN values (mean of the two middle values for an even
/// count), `None` if there are none.
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

// ---------------------------------------------------------------------------
// Group-by helpers
// ---------------------------------------------------------------------------

fn count_by<'a, K: Ord>(
    view: FilteredView<'a>,
    key: impl Fn(&'a Track) -> K,
) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for track in view.tracks() {
        *counts.entry(key(track)).or_insert(0) += 1;
    }
    counts
}

fn mean_by<'a, K: Ord>(
    view: FilteredView<'a>,
    key: impl Fn(&'a Track) -> K,
    value: impl Fn(&Track) -> f64,
) -> BTreeMap<K, f64> {
    let mut sums: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for track in view.tracks() {
        let v = value(track);
        let entry = sums.entry(key(track)).or_insert((0.0, 0));
        if !v.is_nan() {
            entry.0 += v;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .filter(|(_, (_, n))| *n > 0)
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect()
}

fn key_tonality(track: &Track) -> KeyTonality {
    (track.key_chord_notation, track.tonality.clone())
}

fn genre_relative(track: &Track) -> GenreRelative {
    (track.genre.clone(), track.key_relative_notation)
}

// ---------------------------------------------------------------------------
// Top key
// ---------------------------------------------------------------------------

/// The most frequent `short_key_tonality` and its popularity statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct TopKey {
    pub label: String,
    pub tracks: usize,
    pub mean_popularity: Option<f64>,
    pub median_popularity: Option<f64>,
}

/// Most frequent `short_key_tonality`. Equal counts go to the label that
/// sorts first, so the answer does not depend on row order.
pub fn top_key(view: FilteredView<'_>) -> Option<TopKey> {
    if view.is_empty() {
        return None;
    }
    let counts = count_by(view, |t| t.short_key_tonality.as_str());
    let (label, tracks) = counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (label, n)| match best {
            Some((_, best_n)) if best_n >= n => best,
            _ => Some((label, n)),
        })?;

    let popularity = || {
        view.tracks()
            .filter(move |t| t.short_key_tonality == label)
            .map(|t| t.popularity)
    };
    Some(TopKey {
        label: label.to_string(),
        tracks,
        mean_popularity: mean(popularity()),
        median_popularity: median(popularity()),
    })
}

// ---------------------------------------------------------------------------
// Per-key charts
// ---------------------------------------------------------------------------

pub fn tracks_per_key(view: FilteredView<'_>) -> BTreeMap<KeyTonality, usize> {
    count_by(view, key_tonality)
}

pub fn mean_popularity_per_key(view: FilteredView<'_>) -> BTreeMap<KeyTonality, f64> {
    mean_by(view, key_tonality, |t| t.popularity)
}

pub fn mean_instrumentalness_per_key(view: FilteredView<'_>) -> BTreeMap<KeyTonality, f64> {
    mean_by(view, key_tonality, |t| t.instrumentalness)
}

pub fn mean_valence_per_key(view: FilteredView<'_>) -> BTreeMap<KeyTonality, f64> {
    mean_by(view, key_tonality, |t| t.valence)
}

// ---------------------------------------------------------------------------
// Relative-key charts
// ---------------------------------------------------------------------------

/// Track count per relative key and year.
pub fn key_evolution(view: FilteredView<'_>) -> BTreeMap<RelativeYear, usize> {
    count_by(view, |t| (t.key_relative_notation, t.year))
}

pub fn tracks_per_genre_and_key(view: FilteredView<'_>) -> BTreeMap<GenreRelative, usize> {
    count_by(view, genre_relative)
}

pub fn mean_popularity_per_genre_and_key(
    view: FilteredView<'_>,
) -> BTreeMap<GenreRelative, f64> {
    mean_by(view, genre_relative, |t| t.popularity)
}

// ---------------------------------------------------------------------------
// Detail table
// ---------------------------------------------------------------------------

/// Descending popularity with NaN last.
fn popularity_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

/// Dataset indices of the `n` most popular tracks of the view, most popular
/// first. The sort is stable: equal popularity keeps dataset order.
pub fn top_tracks(view: FilteredView<'_>, n: usize) -> Vec<usize> {
    let mut indices = view.indices().to_vec();
    indices.sort_by(|&a, &b| popularity_desc(view.track(a).popularity, view.track(b).popularity));
    indices.truncate(n);
    indices
}

// ---------------------------------------------------------------------------
// Summary – everything the dashboard shows for one selection
// ---------------------------------------------------------------------------

/// All aggregation outputs for one filtered view. Owns its data so it can
/// outlive the view it was computed from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    pub total_tracks: usize,
    pub top_key: Option<TopKey>,
    pub tracks_per_key: BTreeMap<KeyTonality, usize>,
    pub mean_popularity_per_key: BTreeMap<KeyTonality, f64>,
    pub mean_instrumentalness_per_key: BTreeMap<KeyTonality, f64>,
    pub mean_valence_per_key: BTreeMap<KeyTonality, f64>,
    pub key_evolution: BTreeMap<RelativeYear, usize>,
    pub tracks_per_genre_and_key: BTreeMap<GenreRelative, usize>,
    pub mean_popularity_per_genre_and_key: BTreeMap<GenreRelative, f64>,
    /// Dataset row indices, most popular first.
    pub top_tracks: Vec<usize>,
}

impl Summary {
    pub fn compute(view: FilteredView<'_>, top_n: usize) -> Self {
        Summary {
            total_tracks: view.len(),
            top_key: top_key(view),
            tracks_per_key: tracks_per_key(view),
            mean_popularity_per_key: mean_popularity_per_key(view),
            mean_instrumentalness_per_key: mean_instrumentalness_per_key(view),
            mean_valence_per_key: mean_valence_per_key(view),
            key_evolution: key_evolution(view),
            tracks_per_genre_and_key: tracks_per_genre_and_key(view),
            mean_popularity_per_genre_and_key: mean_popularity_per_genre_and_key(view),
            top_tracks: top_tracks(view, top_n),
        }
    }
}
