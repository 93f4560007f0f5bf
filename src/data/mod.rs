/// Data layer: core types, loading, cleaning, aggregation and filtering.
///
/// Architecture:
/// ```text
///  .csv / .csv.zip / .csv.gz / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → raw Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  median / mode fills, dates, publication year
///   └──────────┘
///        │
///        ├──────────────────────┐
///        ▼                      ▼
///   ┌──────────┐          ┌──────────┐
///   │ analysis  │ ◄─────── │  filter   │  year range + journal → rows
///   └──────────┘          └──────────┘
///     counts per year / journal / source, title words
/// ```
pub mod analysis;
pub mod clean;
pub mod filter;
pub mod loader;
pub mod model;
