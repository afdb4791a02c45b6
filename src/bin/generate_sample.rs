use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;

const KEYS: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
const RELATIVES: [&str; 12] = [
    "C/Am", "C#/A#m", "D/Bm", "D#/Cm", "E/C#m", "F/Dm", "F#/D#m", "G/Em", "G#/Fm", "A/F#m",
    "A#/Gm", "B/G#m",
];
/// Rough key popularity in pop music; G, C and D dominate.
const KEY_WEIGHTS: [f64; 12] = [12.0, 9.0, 10.0, 3.0, 6.0, 7.0, 5.0, 12.0, 6.0, 8.0, 5.0, 6.0];

const GENRES: [(&str, f64, f64); 8] = [
    // (genre, base popularity, base instrumentalness)
    ("acoustic", 35.0, 0.10),
    ("ambient", 20.0, 0.75),
    ("country", 40.0, 0.02),
    ("dance", 55.0, 0.15),
    ("hip-hop", 60.0, 0.01),
    ("jazz", 25.0, 0.45),
    ("pop", 65.0, 0.01),
    ("rock", 45.0, 0.05),
];

/// Write a synthetic, deterministic track dataset for the dashboard.
#[derive(Debug, Parser)]
struct Args {
    /// Output file (gzip-compressed CSV).
    #[arg(short, long, default_value = "data/sample_tracks.csv.gz")]
    output: PathBuf,

    /// Tracks generated per (year, genre) pair.
    #[arg(short, long, default_value_t = 120)]
    per_group: usize,

    /// PRNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Debug, Serialize)]
struct Row {
    artist_name: String,
    track_name: String,
    year: i32,
    genre: &'static str,
    popularity: u32,
    danceability: f64,
    energy: f64,
    instrumentalness: f64,
    valence: f64,
    tempo: f64,
    key_chord_notation: &'static str,
    tonality: &'static str,
    short_key_tonality: String,
    key_relative_notation: &'static str,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Index drawn proportionally to `weights`.
    fn weighted(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let mut target = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if target < *w {
                return i;
            }
            target -= w;
        }
        weights.len() - 1
    }
}

fn unit(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    if let Some(dir) = args.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut writer = csv::Writer::from_writer(GzEncoder::new(file, Compression::default()));

    let mut written = 0usize;
    for year in 2000..=2023 {
        for &(genre, base_popularity, base_instrumental) in &GENRES {
            for _ in 0..args.per_group {
                let key = rng.weighted(&KEY_WEIGHTS);
                let minor = rng.next_f64() < 0.38;
                // A minor key shares its signature with the major three semitones up.
                let relative = if minor { (key + 3) % 12 } else { key };

                let valence = unit(rng.gauss(if minor { 0.40 } else { 0.55 }, 0.2));
                let popularity = rng.gauss(base_popularity, 15.0).clamp(0.0, 100.0);

                writer
                    .serialize(Row {
                        artist_name: format!("Artist {:03}", rng.next_u64() % 500),
                        track_name: format!("Track {written:06}"),
                        year,
                        genre,
                        popularity: popularity.round() as u32,
                        danceability: unit(rng.gauss(0.55, 0.15)),
                        energy: unit(rng.gauss(0.6, 0.2)),
                        instrumentalness: unit(rng.gauss(base_instrumental, 0.1)),
                        valence,
                        tempo: rng.gauss(120.0, 25.0).clamp(50.0, 220.0),
                        key_chord_notation: KEYS[key],
                        tonality: if minor { "Minor" } else { "Major" },
                        short_key_tonality: if minor {
                            format!("{}m", KEYS[key])
                        } else {
                            KEYS[key].to_string()
                        },
                        key_relative_notation: RELATIVES[relative],
                    })
                    .context("writing CSV row")?;
                written += 1;
            }
        }
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV: {}", e.error()))?
        .finish()
        .context("finishing gzip stream")?;

    println!("Wrote {written} tracks to {}", args.output.display());
    Ok(())
}
