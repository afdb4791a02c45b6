/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  .csv.gz / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐     ┌──────────────┐
///   │  loader   │ ◄── │ DatasetCache │  path + mtime → Arc<Dataset>
///   └──────────┘     └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Track>, year / genre domains
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  Selection → FilteredView (row indices)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  FilteredView → Summary (KPIs, chart tables, top-N)
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
