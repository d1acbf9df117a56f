/// Data layer: dataset types, key maps, and loading.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Dataset (+ KeyIndexMap from the key column)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────────────────────────────────┐
///   │ PointDataset │ ClusterDataset │ MetadataDataset │
///   └──────────────────────────────────────────────┘
/// ```

pub mod keymap;
pub mod loader;
pub mod model;
