use std::collections::BTreeSet;

use super::model::{Dataset, Track};

// ---------------------------------------------------------------------------
// Selection: which years and genres the user has ticked
// ---------------------------------------------------------------------------

/// The sidebar selections. Membership is set-based; the `BTreeSet`s also
/// give the ascending display order for free.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub years: BTreeSet<i32>,
    pub genres: BTreeSet<String>,
}

impl Selection {
    /// Every year and every genre of the dataset selected.
    pub fn all(dataset: &Dataset) -> Self {
        Selection {
            years: dataset.years.clone(),
            genres: dataset.genres.clone(),
        }
    }

    /// Whether a track passes both membership tests.
    ///
    /// An empty set selects nothing, so it rejects every track.
    pub fn matches(&self, track: &Track) -> bool {
        self.years.contains(&track.year) && self.genres.contains(&track.genre)
    }

    pub fn toggle_year(&mut self, year: i32) {
        if !self.years.remove(&year) {
            self.years.insert(year);
        }
    }

    pub fn toggle_genre(&mut self, genre: &str) {
        if !self.genres.remove(genre) {
            self.genres.insert(genre.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredView – the rows passing the current selection
// ---------------------------------------------------------------------------

/// A read-only window onto the tracks of a [`Dataset`] passing a
/// [`Selection`]. Rebuilt from scratch on every selection change.
#[derive(Debug, Clone, Copy)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: &'a [usize],
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a Dataset, indices: &'a [usize]) -> Self {
        FilteredView { dataset, indices }
    }

    /// Dataset row indices of the passing tracks, in dataset order.
    pub fn indices(&self) -> &'a [usize] {
        self.indices
    }

    pub fn tracks(&self) -> impl Iterator<Item = &'a Track> + 'a {
        let tracks = &self.dataset.tracks;
        self.indices.iter().map(move |&i| &tracks[i])
    }

    pub fn track(&self, index: usize) -> &'a Track {
        &self.dataset.tracks[index]
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return indices of tracks whose year AND genre are selected.
///
/// Selected values absent from the dataset simply match nothing.
pub fn filtered_indices(dataset: &Dataset, selection: &Selection) -> Vec<usize> {
    if selection.years.is_empty() || selection.genres.is_empty() {
        return Vec::new();
    }
    dataset
        .tracks
        .iter()
        .enumerate()
        .filter(|(_, track)| selection.matches(track))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{small_dataset, track};
    use crate::data::model::PitchClass;

    fn select(years: &[i32], genres: &[&str]) -> Selection {
        Selection {
            years: years.iter().copied().collect(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[test]
    fn single_year_and_genre() {
        let ds = small_dataset();
        let idx = filtered_indices(&ds, &select(&[2000], &["pop"]));
        assert_eq!(idx, vec![0]);
        assert_eq!(ds.tracks[idx[0]].popularity, 50.0);
    }

    #[test]
    fn full_selection_keeps_everything() {
        let ds = small_dataset();
        let idx = filtered_indices(&ds, &Selection::all(&ds));
        assert_eq!(idx, vec![0, 1, 2]);
    }

    #[test]
    fn empty_year_or_genre_set_keeps_nothing() {
        let ds = small_dataset();
        assert!(filtered_indices(&ds, &select(&[], &["pop", "rock"])).is_empty());
        assert!(filtered_indices(&ds, &select(&[2000, 2001], &[])).is_empty());
    }

    #[test]
    fn unknown_values_match_nothing() {
        let ds = small_dataset();
        assert!(filtered_indices(&ds, &select(&[1999], &["pop"])).is_empty());
        assert!(filtered_indices(&ds, &select(&[2000], &["polka"])).is_empty());
        assert_eq!(
            filtered_indices(&ds, &select(&[1999, 2001], &["pop", "polka"])),
            vec![2]
        );
    }

    #[test]
    fn result_is_exactly_the_matching_rows() {
        let mut tracks = Vec::new();
        for (i, genre) in ["pop", "rock", "jazz"].iter().cycle().take(30).enumerate() {
            tracks.push(track(2000 + (i as i32 % 4), genre, PitchClass::G, i % 2 == 0, i as f64));
        }
        let ds = Dataset::from_tracks(tracks);
        let sel = select(&[2001, 2003], &["rock", "jazz"]);
        let idx = filtered_indices(&ds, &sel);

        for (i, t) in ds.tracks.iter().enumerate() {
            let expected = (t.year == 2001 || t.year == 2003)
                && (t.genre == "rock" || t.genre == "jazz");
            assert_eq!(idx.contains(&i), expected, "row {i}");
        }
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn toggles_flip_membership() {
        let ds = small_dataset();
        let mut sel = Selection::all(&ds);
        sel.toggle_genre("rock");
        assert!(!sel.genres.contains("rock"));
        sel.toggle_genre("rock");
        assert!(sel.genres.contains("rock"));
        sel.toggle_year(2001);
        assert_eq!(filtered_indices(&ds, &sel), vec![0, 1]);
    }

    #[test]
    fn view_iterates_selected_tracks() {
        let ds = small_dataset();
        let idx = vec![1, 2];
        let view = FilteredView::new(&ds, &idx);
        let genres: Vec<&str> = view.tracks().map(|t| t.genre.as_str()).collect();
        assert_eq!(genres, vec!["rock", "pop"]);
        assert_eq!(view.len(), 2);
    }
}
