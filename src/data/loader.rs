use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use flate2::read::GzDecoder;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::{LoadError, Result};
use super::model::{Dataset, Track};

/// Columns every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "year",
    "genre",
    "popularity",
    "key_chord_notation",
    "tonality",
    "short_key_tonality",
    "key_relative_notation",
    "instrumentalness",
    "valence",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Input layouts, decided from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv { gzip: bool },
    Json { gzip: bool },
    Parquet,
}

impl Format {
    /// Detect the format from the file name.
    ///
    /// * `.csv`, `.csv.gz`, bare `.gz` – CSV with a header row
    /// * `.json`, `.json.gz` – `[{ "year": 2000, "genre": "pop", ... }, ...]`
    /// * `.parquet`, `.pq` – Parquet (as written by Pandas or Polars)
    pub fn detect(path: &Path) -> Result<Format> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let (stem, gzip) = match name.strip_suffix(".gz") {
            Some(stem) => (stem, true),
            None => (name.as_str(), false),
        };
        let ext = Path::new(stem)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match (ext, gzip) {
            ("csv", _) => Ok(Format::Csv { gzip }),
            ("json", _) => Ok(Format::Json { gzip }),
            ("parquet" | "pq", false) => Ok(Format::Parquet),
            ("", true) => Ok(Format::Csv { gzip: true }),
            _ => Err(LoadError::UnsupportedFormat(name)),
        }
    }
}

/// Load a track dataset from a file. Dispatch by file name.
///
/// Reads the whole file; either every row parses or the load fails.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let tracks = match Format::detect(path)? {
        Format::Csv { gzip } => read_csv(open(path, gzip)?)?,
        Format::Json { gzip } => read_json(open(path, gzip)?)?,
        Format::Parquet => read_parquet(path)?,
    };
    Ok(Dataset::from_tracks(tracks))
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io(e),
    })
}

fn open(path: &Path, gzip: bool) -> Result<Box<dyn Read>> {
    let file = BufReader::new(open_file(path)?);
    if gzip {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names; rows are matched to [`Track`] fields by
/// name. Extra columns are ignored.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Track>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        return Err(LoadError::MissingColumn(missing.to_string()));
    }

    let mut tracks = Vec::new();
    for result in reader.deserialize() {
        tracks.push(result?);
    }
    Ok(tracks)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<Track>> {
    Ok(serde_json::from_reader(reader)?)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load the tracks of a Parquet file.
///
/// Numeric columns may use any integer or float width; text columns may be
/// `Utf8` or `LargeUtf8`. Everything is cast to a common type per column.
fn read_parquet(path: &Path) -> Result<Vec<Track>> {
    let file = open_file(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut tracks = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = TrackColumns::from_batch(&batch)?;
        let offset = tracks.len();
        for row in 0..batch.num_rows() {
            tracks.push(columns.track(row, offset + row)?);
        }
    }
    Ok(tracks)
}

/// The columns of one record batch, cast to the types [`Track`] needs.
struct TrackColumns {
    year: Int64Array,
    genre: StringArray,
    popularity: Float64Array,
    key_chord_notation: StringArray,
    tonality: StringArray,
    short_key_tonality: StringArray,
    key_relative_notation: StringArray,
    instrumentalness: Float64Array,
    valence: Float64Array,
    track_name: Option<StringArray>,
    artist_name: Option<StringArray>,
    danceability: Option<Float64Array>,
    energy: Option<Float64Array>,
    tempo: Option<Float64Array>,
}

impl TrackColumns {
    fn from_batch(batch: &RecordBatch) -> Result<Self> {
        let int = |name: &str| -> Result<Int64Array> {
            Ok(cast(&required(batch, name)?, &DataType::Int64)?
                .as_primitive::<Int64Type>()
                .clone())
        };
        let float = |name: &str| -> Result<Float64Array> {
            Ok(cast(&required(batch, name)?, &DataType::Float64)?
                .as_primitive::<Float64Type>()
                .clone())
        };
        let text = |name: &str| -> Result<StringArray> {
            Ok(cast(&required(batch, name)?, &DataType::Utf8)?
                .as_string::<i32>()
                .clone())
        };
        let opt_float = |name: &str| -> Result<Option<Float64Array>> {
            batch
                .column_by_name(name)
                .map(|col| -> Result<Float64Array> {
                    Ok(cast(col, &DataType::Float64)?
                        .as_primitive::<Float64Type>()
                        .clone())
                })
                .transpose()
        };
        let opt_text = |name: &str| -> Result<Option<StringArray>> {
            batch
                .column_by_name(name)
                .map(|col| -> Result<StringArray> {
                    Ok(cast(col, &DataType::Utf8)?.as_string::<i32>().clone())
                })
                .transpose()
        };

        Ok(TrackColumns {
            year: int("year")?,
            genre: text("genre")?,
            popularity: float("popularity")?,
            key_chord_notation: text("key_chord_notation")?,
            tonality: text("tonality")?,
            short_key_tonality: text("short_key_tonality")?,
            key_relative_notation: text("key_relative_notation")?,
            instrumentalness: float("instrumentalness")?,
            valence: float("valence")?,
            track_name: opt_text("track_name")?,
            artist_name: opt_text("artist_name")?,
            danceability: opt_float("danceability")?,
            energy: opt_float("energy")?,
            tempo: opt_float("tempo")?,
        })
    }

    /// Build the track at `row` of this batch; `abs_row` is used in errors.
    fn track(&self, row: usize, abs_row: usize) -> Result<Track> {
        let year = int_at(&self.year, row, abs_row, "year")?;
        let year = i32::try_from(year).map_err(|_| invalid(abs_row, "year", year))?;

        let key = text_at(&self.key_chord_notation, row, abs_row, "key_chord_notation")?;
        let relative = text_at(&self.key_relative_notation, row, abs_row, "key_relative_notation")?;

        Ok(Track {
            year,
            genre: text_at(&self.genre, row, abs_row, "genre")?.to_string(),
            popularity: float_at(&self.popularity, row),
            key_chord_notation: key
                .parse()
                .map_err(|_| invalid(abs_row, "key_chord_notation", key))?,
            tonality: text_at(&self.tonality, row, abs_row, "tonality")?.to_string(),
            short_key_tonality: text_at(&self.short_key_tonality, row, abs_row, "short_key_tonality")?
                .to_string(),
            key_relative_notation: relative
                .parse()
                .map_err(|_| invalid(abs_row, "key_relative_notation", relative))?,
            instrumentalness: float_at(&self.instrumentalness, row),
            valence: float_at(&self.valence, row),
            track_name: optional_text(self.track_name.as_ref(), row),
            artist_name: optional_text(self.artist_name.as_ref(), row),
            danceability: optional_float(self.danceability.as_ref(), row),
            energy: optional_float(self.energy.as_ref(), row),
            tempo: optional_float(self.tempo.as_ref(), row),
        })
    }
}

// -- Arrow helpers --

fn required(batch: &RecordBatch, name: &str) -> Result<ArrayRef> {
    batch
        .column_by_name(name)
        .cloned()
        .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
}

fn cast(col: &ArrayRef, to: &DataType) -> Result<ArrayRef> {
    Ok(arrow::compute::cast(col, to)?)
}

fn invalid(row: usize, column: &str, value: impl std::fmt::Display) -> LoadError {
    LoadError::InvalidValue {
        row,
        column: column.to_string(),
        value: format!("'{value}'"),
    }
}

fn int_at(arr: &Int64Array, row: usize, abs_row: usize, column: &str) -> Result<i64> {
    if arr.is_null(row) {
        return Err(invalid(abs_row, column, "null"));
    }
    Ok(arr.value(row))
}

/// Null scores load as NaN, like empty CSV cells.
fn float_at(arr: &Float64Array, row: usize) -> f64 {
    if arr.is_null(row) {
        return f64::NAN;
    }
    arr.value(row)
}

fn text_at<'a>(arr: &'a StringArray, row: usize, abs_row: usize, column: &str) -> Result<&'a str> {
    if arr.is_null(row) {
        return Err(invalid(abs_row, column, "null"));
    }
    Ok(arr.value(row))
}

fn optional_text(arr: Option<&StringArray>, row: usize) -> Option<String> {
    arr.filter(|a| !a.is_null(row))
        .map(|a| a.value(row).to_string())
}

fn optional_float(arr: Option<&Float64Array>, row: usize) -> Option<f64> {
    arr.filter(|a| !a.is_null(row)).map(|a| a.value(row))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Int32Array, LargeStringArray};
    use arrow::datatypes::{Field, Schema};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::aggregate;
    use crate::data::filter::FilteredView;
    use crate::data::model::{PitchClass, RelativeKey};

    const CSV: &str = "\
track_name,year,genre,popularity,key_chord_notation,tonality,short_key_tonality,key_relative_notation,instrumentalness,valence,extra
Song A,2000,pop,50,C,Major,C,C/Am,0.1,0.8,x
Song B,2000,rock,90,C,Major,C,C/Am,0.0,0.2,y
,2001,pop,70,D,Minor,Dm,F/Dm,0.5,0.4,z
";

    fn write_gz(path: &Path, content: &str) {
        let file = File::create(path).unwrap();
        let mut enc = GzEncoder::new(file, Compression::default());
        enc.write_all(content.as_bytes()).unwrap();
        enc.finish().unwrap();
    }

    #[test]
    fn detects_formats_from_file_name() {
        assert_eq!(
            Format::detect(Path::new("data/keys.csv.gz")).unwrap(),
            Format::Csv { gzip: true }
        );
        assert_eq!(
            Format::detect(Path::new("KEYS.CSV")).unwrap(),
            Format::Csv { gzip: false }
        );
        assert_eq!(
            Format::detect(Path::new("dump.gz")).unwrap(),
            Format::Csv { gzip: true }
        );
        assert_eq!(
            Format::detect(Path::new("t.json.gz")).unwrap(),
            Format::Json { gzip: true }
        );
        assert_eq!(Format::detect(Path::new("t.pq")).unwrap(), Format::Parquet);
        assert!(matches!(
            Format::detect(Path::new("t.parquet.gz")),
            Err(LoadError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            Format::detect(Path::new("t.xlsx")),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn reads_gzip_csv_by_column_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.csv.gz");
        write_gz(&path, CSV);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 3);

        let first = &ds.tracks[0];
        assert_eq!(first.year, 2000);
        assert_eq!(first.genre, "pop");
        assert_eq!(first.key_chord_notation, PitchClass::C);
        assert_eq!(first.key_relative_notation, RelativeKey::from_major(PitchClass::C));
        assert_eq!(first.track_name.as_deref(), Some("Song A"));
        assert_eq!(first.artist_name, None);

        let third = &ds.tracks[2];
        assert_eq!(third.key_relative_notation.label(), "F/Dm");
        assert_eq!(third.track_name, None);
        assert_eq!(third.tonality, "Minor");
    }

    #[test]
    fn repeated_loads_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.csv.gz");
        write_gz(&path, CSV);
        assert_eq!(load_file(&path).unwrap(), load_file(&path).unwrap());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.csv.gz")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn missing_required_column_fails() {
        let csv = "year,genre,popularity\n2000,pop,1\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "key_chord_notation"));
    }

    #[test]
    fn unknown_key_label_fails_whole_load() {
        let csv = CSV.replace("2001,pop,70,D,", "2001,pop,70,H,");
        assert!(read_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn uncompressed_file_with_gz_name_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.csv.gz");
        std::fs::write(&path, CSV).unwrap();
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn reads_json_records() {
        let json = r#"[{"year": 2010, "genre": "jazz", "popularity": 12.5,
            "key_chord_notation": "F#", "tonality": "Major", "short_key_tonality": "F#",
            "key_relative_notation": "F#/D#m", "instrumentalness": 0.9, "valence": 0.3,
            "tempo": 120.0}]"#;
        let tracks = read_json(json.as_bytes()).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].key_chord_notation, PitchClass::FSharp);
        assert_eq!(tracks[0].tempo, Some(120.0));
        assert_eq!(tracks[0].energy, None);
    }

    #[test]
    fn reads_parquet_with_mixed_widths() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("year", DataType::Int32, false),
            Field::new("genre", DataType::LargeUtf8, false),
            Field::new("popularity", DataType::Int64, false),
            Field::new("key_chord_notation", DataType::Utf8, false),
            Field::new("tonality", DataType::Utf8, false),
            Field::new("short_key_tonality", DataType::Utf8, false),
            Field::new("key_relative_notation", DataType::Utf8, false),
            Field::new("instrumentalness", DataType::Float64, false),
            Field::new("valence", DataType::Float64, true),
            Field::new("energy", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(vec![2005, 2006])),
                Arc::new(LargeStringArray::from(vec!["pop", "metal"])),
                Arc::new(Int64Array::from(vec![33, 44])),
                Arc::new(StringArray::from(vec!["A", "G#"])),
                Arc::new(StringArray::from(vec!["Minor", "Major"])),
                Arc::new(StringArray::from(vec!["Am", "G#"])),
                Arc::new(StringArray::from(vec!["C/Am", "G#/Fm"])),
                Arc::new(Float64Array::from(vec![0.0, 0.25])),
                Arc::new(Float64Array::from(vec![Some(0.5), None])),
                Arc::new(Float64Array::from(vec![Some(0.9), None])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.parquet");
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.tracks[0].year, 2005);
        assert_eq!(ds.tracks[0].popularity, 33.0);
        assert_eq!(ds.tracks[0].energy, Some(0.9));
        assert_eq!(ds.tracks[1].genre, "metal");
        assert_eq!(ds.tracks[1].key_chord_notation, PitchClass::GSharp);
        assert_eq!(ds.tracks[1].energy, None);
        assert_eq!(ds.tracks[1].track_name, None);
        assert!(ds.tracks[1].valence.is_nan());
    }

    #[test]
    fn empty_csv_scores_load_as_nan_and_are_skipped() {
        let csv = CSV
            .replace("Song A,2000,pop,50,C,Major,C,C/Am,0.1,", "Song A,2000,pop,,C,Major,C,C/Am,,")
            .replace("Song B,2000,rock,90,C,Major,C,C/Am,0.0,0.2", "Song B,2000,rock,90,C,Major,C,C/Am,0.3,");
        let ds = Dataset::from_tracks(read_csv(csv.as_bytes()).unwrap());
        assert_eq!(ds.len(), 3);
        assert!(ds.tracks[0].popularity.is_nan());
        assert!(ds.tracks[0].instrumentalness.is_nan());
        assert!(ds.tracks[1].valence.is_nan());

        let idx: Vec<usize> = (0..ds.len()).collect();
        let view = FilteredView::new(&ds, &idx);
        let c_major = (PitchClass::C, "Major".to_string());
        assert_eq!(aggregate::mean_instrumentalness_per_key(view)[&c_major], 0.3);
        assert_eq!(aggregate::mean_popularity_per_key(view)[&c_major], 90.0);
        assert_eq!(aggregate::mean_valence_per_key(view)[&c_major], 0.8);
    }

    #[test]
    fn json_null_scores_load_as_nan() {
        let json = r#"[{"year": 2010, "genre": "jazz", "popularity": null,
            "key_chord_notation": "E", "tonality": "Minor", "short_key_tonality": "Em",
            "key_relative_notation": "G/Em", "instrumentalness": null, "valence": 0.3}]"#;
        let tracks = read_json(json.as_bytes()).unwrap();
        assert!(tracks[0].popularity.is_nan());
        assert!(tracks[0].instrumentalness.is_nan());
        assert_eq!(tracks[0].valence, 0.3);
    }

    #[test]
    fn padded_csv_headers_still_match_fields() {
        let csv = CSV.replacen("track_name,year,genre", "track_name, year , genre", 1);
        let tracks = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].year, 2000);
        assert_eq!(tracks[2].genre, "pop");
    }
}
