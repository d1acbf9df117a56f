use std::time::Instant;

use log::{debug, warn};

use crate::data::keymap::KeyIndexMap;
use crate::data::model::{ClusterDataset, MetadataDataset, PointDataset};

use super::document::{ClusterGroup, GroupedSeriesDocument, Grouping};
use super::extract::{extract, extract_subset};
use super::partition::{check_indices, read_partition};
use super::registry::assign_ids;
use super::translate::resolved_pairs;

// ---------------------------------------------------------------------------
// Grouping sources
// ---------------------------------------------------------------------------

/// Where the grouping of a build comes from.
#[derive(Debug, Clone, Copy)]
pub enum GroupingSource<'a> {
    /// The primary dataset's own cluster partition.
    Clusters(&'a ClusterDataset),
    /// A categorical column of a metadata dataset, joined on shared keys.
    Metadata(MetadataJoin<'a>),
    /// Nothing bound.
    None,
}

/// Everything needed to join a metadata column onto the primary dataset.
#[derive(Debug, Clone, Copy)]
pub struct MetadataJoin<'a> {
    pub dataset: &'a MetadataDataset,
    pub column: &'a str,
    /// Key map of the primary (point) dataset.
    pub primary_keys: &'a KeyIndexMap,
    /// Key map of the metadata dataset.
    pub metadata_keys: &'a KeyIndexMap,
}

impl<'a> MetadataJoin<'a> {
    /// Join `column` of `dataset` onto `primary` using both datasets' own
    /// key maps.
    pub fn new(primary: &'a PointDataset, dataset: &'a MetadataDataset, column: &'a str) -> Self {
        Self {
            dataset,
            column,
            primary_keys: &primary.keys,
            metadata_keys: &dataset.keys,
        }
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Build the grouped-series document for one dimension of `primary`.
///
/// Returns `None` when nothing can be built: the dimension is out of range,
/// no grouping is bound, the partition is rejected, or the metadata column
/// does not exist. Callers keep their previous rendering in that case.
pub fn build_grouped_series(
    primary: &PointDataset,
    dimension_index: usize,
    grouping: GroupingSource<'_>,
) -> Option<GroupedSeriesDocument> {
    let Some(title) = primary.dimension_names().get(dimension_index).cloned() else {
        warn!(
            "Dimension {dimension_index} out of range for '{}' ({} dimensions)",
            primary.name,
            primary.num_dimensions()
        );
        return None;
    };

    let started = Instant::now();
    let document = match grouping {
        GroupingSource::Clusters(clusters) => build_cluster_grouped(primary, dimension_index, title, clusters),
        GroupingSource::Metadata(join) => build_category_joined(primary, dimension_index, title, join),
        GroupingSource::None => {
            debug!("No grouping bound for '{}', nothing to build", primary.name);
            None
        }
    }?;

    debug!(
        "Built '{}' with {} values in {:.2?}",
        document.title,
        document.len(),
        started.elapsed()
    );
    Some(document)
}

fn build_cluster_grouped(
    primary: &PointDataset,
    dimension_index: usize,
    title: String,
    clusters: &ClusterDataset,
) -> Option<GroupedSeriesDocument> {
    let partition = read_partition(clusters)
        .and_then(|partition| {
            check_indices(&partition, primary.num_points())?;
            Ok(partition)
        })
        .map_err(|e| warn!("Ignoring partition '{}': {e}", clusters.name))
        .ok()?;

    let values = extract(primary, dimension_index).ok()?;
    let categories = partition
        .into_iter()
        .map(|c| ClusterGroup {
            name: c.name,
            indices: c.indices,
            color: c.color,
        })
        .collect();

    Some(GroupedSeriesDocument {
        title,
        values,
        grouping: Grouping::Clusters { categories },
    })
}

fn build_category_joined(
    primary: &PointDataset,
    dimension_index: usize,
    title: String,
    join: MetadataJoin<'_>,
) -> Option<GroupedSeriesDocument> {
    let Some(column) = join.dataset.get_column(join.column) else {
        warn!("Metadata '{}' has no column '{}'", join.dataset.name, join.column);
        return None;
    };

    let pairs = resolved_pairs(primary.num_points(), join.primary_keys, join.metadata_keys);

    // Keys may map past the end of a column if the key map was built for
    // another table; such rows count as unresolved too.
    let (point_indices, labels): (Vec<usize>, Vec<&str>) = pairs
        .into_iter()
        .filter_map(|(point, row)| column.get(row).map(|label| (point, label.as_str())))
        .unzip();

    let dropped = primary.num_points() - point_indices.len();
    if dropped > 0 {
        debug!(
            "{dropped} of {} points in '{}' have no row in '{}'",
            primary.num_points(),
            primary.name,
            join.dataset.name
        );
    }

    let values = extract_subset(primary, dimension_index, &point_indices).ok()?;
    let (category_ids, categories) = assign_ids(labels);

    Some(GroupedSeriesDocument {
        title,
        values,
        grouping: Grouping::Categories {
            categories,
            category_ids,
        },
    })
}
