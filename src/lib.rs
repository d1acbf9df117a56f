//! Plots one dimension of a point dataset, grouped by its cluster partition
//! or by a categorical metadata column joined through shared keys.

pub mod color;
pub mod data;
pub mod error;
pub mod series;
pub mod session;

pub use crate::series::{build_grouped_series, GroupedSeriesDocument, Grouping, GroupingSource, MetadataJoin};
pub use crate::data::keymap::KeyIndexMap;
pub use crate::data::model::{Cluster, ClusterDataset, Dataset, DataType, MetadataDataset, PointDataset, Rgb};
pub use crate::error::{DatasetError, DimensionOutOfRange, KeyMapError, RejectedPartition};
