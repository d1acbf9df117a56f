use std::path::Path;
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::data::model::{ClusterDataset, DataType, Dataset, MetadataDataset, PointDataset};
use crate::series::builder::{build_grouped_series, GroupingSource, MetadataJoin};
use crate::series::document::GroupedSeriesDocument;

// ---------------------------------------------------------------------------
// Rendering sink
// ---------------------------------------------------------------------------

/// Receives each freshly built document, serialized as indented JSON.
pub trait DocumentSink {
    fn set_data(&mut self, json: String);
}

/// Sink that keeps only the most recent document.
#[derive(Debug, Default, Clone)]
pub struct LatestDocument {
    pub json: Option<String>,
    /// Number of documents received so far.
    pub updates: u64,
}

impl DocumentSink for LatestDocument {
    fn set_data(&mut self, json: String) {
        self.json = Some(json);
        self.updates += 1;
    }
}

// ---------------------------------------------------------------------------
// Bindings
// ---------------------------------------------------------------------------

/// The dataset the points are grouped by.
#[derive(Debug, Clone)]
pub enum GroupingBinding {
    Clusters(Arc<ClusterDataset>),
    Metadata {
        dataset: Arc<MetadataDataset>,
        /// Selected categorical column; `None` until one is chosen.
        column: Option<String>,
    },
}

impl GroupingBinding {
    pub fn data_type(&self) -> DataType {
        match self {
            GroupingBinding::Clusters(_) => DataType::Clusters,
            GroupingBinding::Metadata { .. } => DataType::Metadata,
        }
    }
}

/// Result of offering a dataset to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// Bound, and a new document was produced.
    Rebuilt,
    /// Bound, but prerequisites for a document are not met yet.
    Pending,
    /// The same dataset is already bound in that slot.
    AlreadyBound,
}

// ---------------------------------------------------------------------------
// PlotSession – rebuild on every binding or selection change
// ---------------------------------------------------------------------------

/// Owns the current bindings and rebuilds the document whenever the primary
/// dataset, the grouping dataset, or the selected dimension changes.
///
/// Rebuilds are always full. When a rebuild produces nothing, the sink and
/// the last document are left untouched.
pub struct PlotSession<S: DocumentSink> {
    primary: Option<Arc<PointDataset>>,
    grouping: Option<GroupingBinding>,
    dimension: usize,
    document: Option<GroupedSeriesDocument>,
    sink: S,
}

impl<S: DocumentSink> PlotSession<S> {
    pub fn new(sink: S) -> Self {
        Self {
            primary: None,
            grouping: None,
            dimension: 0,
            document: None,
            sink,
        }
    }

    pub fn primary(&self) -> Option<&PointDataset> {
        self.primary.as_deref()
    }

    pub fn grouping(&self) -> Option<&GroupingBinding> {
        self.grouping.as_ref()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Last document handed to the sink.
    pub fn document(&self) -> Option<&GroupedSeriesDocument> {
        self.document.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Bind a dataset into the slot its kind belongs to.
    pub fn bind(&mut self, dataset: Dataset) -> BindOutcome {
        match dataset {
            Dataset::Points(points) => self.set_primary(Arc::new(points)),
            Dataset::Clusters(clusters) => self.set_clusters(Arc::new(clusters)),
            Dataset::Metadata(metadata) => {
                let column = metadata.column_names.first().cloned();
                self.set_metadata(Arc::new(metadata), column)
            }
        }
    }

    /// Bind the point dataset whose dimensions are plotted.
    ///
    /// A cluster partition belongs to the previous points and is unbound;
    /// metadata stays bound since it joins through keys. The dimension
    /// selection falls back to 0 when it is out of range for the new points.
    pub fn set_primary(&mut self, points: Arc<PointDataset>) -> BindOutcome {
        if self
            .primary
            .as_ref()
            .is_some_and(|p| same_dataset(p, &points, p.source(), points.source()))
        {
            warn!("Data already loaded: '{}'", points.name);
            return BindOutcome::AlreadyBound;
        }

        info!(
            "Binding points '{}' ({} points, {} dimensions)",
            points.name,
            points.num_points(),
            points.num_dimensions()
        );

        if matches!(self.grouping, Some(GroupingBinding::Clusters(_))) {
            self.grouping = None;
        }
        if self.dimension >= points.num_dimensions() {
            self.dimension = 0;
        }
        self.primary = Some(points);
        self.rebuild_outcome()
    }

    /// Group by a cluster partition.
    pub fn set_clusters(&mut self, clusters: Arc<ClusterDataset>) -> BindOutcome {
        if let Some(GroupingBinding::Clusters(current)) = &self.grouping {
            if same_dataset(current, &clusters, current.source(), clusters.source()) {
                warn!("Data already loaded: '{}'", clusters.name);
                return BindOutcome::AlreadyBound;
            }
        }

        info!("Binding clusters '{}' ({} clusters)", clusters.name, clusters.clusters().len());
        self.grouping = Some(GroupingBinding::Clusters(clusters));
        self.rebuild_outcome()
    }

    /// Group by a column of a metadata dataset.
    pub fn set_metadata(&mut self, metadata: Arc<MetadataDataset>, column: Option<String>) -> BindOutcome {
        if let Some(GroupingBinding::Metadata { dataset, .. }) = &self.grouping {
            if same_dataset(dataset, &metadata, dataset.source(), metadata.source()) {
                warn!("Data already loaded: '{}'", metadata.name);
                return BindOutcome::AlreadyBound;
            }
        }

        info!(
            "Binding metadata '{}' ({} rows, columns {:?})",
            metadata.name,
            metadata.num_rows(),
            metadata.column_names
        );
        self.grouping = Some(GroupingBinding::Metadata {
            dataset: metadata,
            column,
        });
        self.rebuild_outcome()
    }

    /// Choose which metadata column categorizes the points.
    ///
    /// Ignored when no metadata dataset is bound or the column does not
    /// exist; the current selection is kept.
    pub fn set_metadata_column(&mut self, name: &str) -> bool {
        match &mut self.grouping {
            Some(GroupingBinding::Metadata { dataset, column }) => {
                if column.as_deref() == Some(name) {
                    return false;
                }
                if dataset.get_column(name).is_none() {
                    warn!("Metadata '{}' has no column '{name}'", dataset.name);
                    return false;
                }
                *column = Some(name.to_string());
            }
            _ => return false,
        }
        self.rebuild()
    }

    /// Select the plotted dimension.
    ///
    /// An index outside the bound points is refused and the current
    /// selection is kept.
    pub fn set_dimension(&mut self, dimension: usize) -> bool {
        let Some(primary) = self.primary.as_deref() else {
            debug!("No points bound, ignoring dimension {dimension}");
            return false;
        };
        if dimension >= primary.num_dimensions() {
            warn!(
                "Dimension {dimension} is out of range for '{}' ({} dimensions)",
                primary.name,
                primary.num_dimensions()
            );
            return false;
        }
        if dimension == self.dimension && self.document.is_some() {
            return false;
        }
        self.dimension = dimension;
        self.rebuild()
    }

    /// Drop the grouping binding. The last document stays in place.
    pub fn clear_grouping(&mut self) {
        self.grouping = None;
    }

    fn rebuild_outcome(&mut self) -> BindOutcome {
        if self.rebuild() {
            BindOutcome::Rebuilt
        } else {
            BindOutcome::Pending
        }
    }

    /// Rebuild from the current bindings and hand the result to the sink.
    ///
    /// Returns `false`, leaving the previous document in place, when nothing
    /// could be built.
    pub fn rebuild(&mut self) -> bool {
        let Some(primary) = self.primary.as_deref() else {
            debug!("No points bound, skipping rebuild");
            return false;
        };

        let source = match &self.grouping {
            Some(GroupingBinding::Clusters(clusters)) => GroupingSource::Clusters(clusters),
            Some(GroupingBinding::Metadata {
                dataset,
                column: Some(column),
            }) => GroupingSource::Metadata(MetadataJoin::new(primary, dataset, column)),
            Some(GroupingBinding::Metadata { column: None, .. }) | None => GroupingSource::None,
        };

        let Some(document) = build_grouped_series(primary, self.dimension, source) else {
            return false;
        };

        match document.to_json() {
            Ok(json) => {
                self.sink.set_data(json);
                self.document = Some(document);
                true
            }
            Err(e) => {
                error!("Failed to serialize '{}': {e}", document.title);
                false
            }
        }
    }
}

/// Datasets loaded from the same file are the same dataset; in-memory ones
/// only when they share a handle.
fn same_dataset<T>(
    bound: &Arc<T>,
    offered: &Arc<T>,
    bound_source: Option<&Path>,
    offered_source: Option<&Path>,
) -> bool {
    Arc::ptr_eq(bound, offered)
        || matches!((bound_source, offered_source), (Some(a), Some(b)) if a == b)
}
