use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// PitchClass – the 12 chord-notation keys, in musical order
// ---------------------------------------------------------------------------

/// One of the twelve pitch classes used by `key_chord_notation`.
///
/// The derived `Ord` follows the declaration order (C → B), which is the
/// order keys are grouped and plotted in. Never sort these alphabetically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    /// Position in the chromatic scale starting at C (0..12).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    /// Pitch class `semitones` above this one, wrapping at the octave.
    pub fn transpose(self, semitones: usize) -> Self {
        Self::from_index(self.index() + semitones)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PitchClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        PitchClass::ALL
            .into_iter()
            .find(|p| p.label() == s)
            .ok_or_else(|| format!("unknown pitch class '{s}'"))
    }
}

impl TryFrom<String> for PitchClass {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// RelativeKey – a major key paired with its relative minor
// ---------------------------------------------------------------------------

/// One of the twelve `key_relative_notation` labels, e.g. `C/Am`.
///
/// Identified by the major root, so ordering follows [`PitchClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct RelativeKey {
    major: PitchClass,
}

impl RelativeKey {
    pub const ALL: [RelativeKey; 12] = {
        let mut all = [RelativeKey { major: PitchClass::C }; 12];
        let mut i = 0;
        while i < 12 {
            all[i] = RelativeKey { major: PitchClass::ALL[i] };
            i += 1;
        }
        all
    };

    pub fn from_major(major: PitchClass) -> Self {
        RelativeKey { major }
    }

    /// The relative pair a key belongs to. A minor key's relative major
    /// sits three semitones above its root.
    pub fn of(root: PitchClass, minor: bool) -> Self {
        if minor {
            RelativeKey { major: root.transpose(3) }
        } else {
            RelativeKey { major: root }
        }
    }

    pub fn major(self) -> PitchClass {
        self.major
    }

    pub fn label(self) -> &'static str {
        const LABELS: [&str; 12] = [
            "C/Am", "C#/A#m", "D/Bm", "D#/Cm", "E/C#m", "F/Dm", "F#/D#m", "G/Em", "G#/Fm",
            "A/F#m", "A#/Gm", "B/G#m",
        ];
        LABELS[self.major.index()]
    }
}

impl fmt::Display for RelativeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RelativeKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        RelativeKey::ALL
            .into_iter()
            .find(|k| k.label() == s)
            .ok_or_else(|| format!("unknown relative key '{s}'"))
    }
}

impl TryFrom<String> for RelativeKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Track – one row of the dataset
// ---------------------------------------------------------------------------

/// A single track (one row of the source table).
///
/// Deserialised by column name, so column order in the file is irrelevant
/// and columns not listed here are ignored. Empty or null scores load as
/// NaN, which the aggregations skip.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Track {
    pub year: i32,
    pub genre: String,
    #[serde(deserialize_with = "nan_if_missing")]
    pub popularity: f64,
    pub key_chord_notation: PitchClass,
    pub tonality: String,
    pub short_key_tonality: String,
    pub key_relative_notation: RelativeKey,
    #[serde(deserialize_with = "nan_if_missing")]
    pub instrumentalness: f64,
    #[serde(deserialize_with = "nan_if_missing")]
    pub valence: f64,

    #[serde(default)]
    pub track_name: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub danceability: Option<f64>,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub tempo: Option<f64>,
}

/// An empty CSV cell or a JSON `null` becomes NaN.
fn nan_if_missing<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full, immutable dataset with pre-computed filter domains.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// All tracks, in file order.
    pub tracks: Vec<Track>,
    /// Distinct release years, ascending.
    pub years: BTreeSet<i32>,
    /// Distinct genres, lexicographic.
    pub genres: BTreeSet<String>,
}

impl Dataset {
    /// Build the filter domains from the loaded tracks.
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let years = tracks.iter().map(|t| t.year).collect();
        let genres = tracks.iter().map(|t| t.genre.clone()).collect();
        Dataset {
            tracks,
            years,
            genres,
        }
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
