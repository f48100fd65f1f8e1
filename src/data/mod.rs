/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table (typed Records + ColumnSet)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  Vec<Record>, which required columns exist
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  age / income windows → filtered indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
