/// Grouped-series core: turns one dimension of a point dataset plus a
/// grouping into a [`GroupedSeriesDocument`].
///
/// ```text
///   PointDataset ──► extract ──────────────────────────┐
///                                                      ▼
///   ClusterDataset ──► read_partition ─────────► build_grouped_series ──► document
///                                                      ▲
///   MetadataDataset ──► translate ──► assign_ids ──────┘
///        (via KeyIndexMap on both sides)
/// ```

pub mod builder;
pub mod document;
pub mod extract;
pub mod partition;
pub mod registry;
pub mod translate;

pub use builder::{build_grouped_series, GroupingSource, MetadataJoin};
pub use document::{ClusterGroup, GroupedSeriesDocument, Grouping};
