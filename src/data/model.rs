use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use palette::Srgb;

use crate::error::{DatasetError, DimensionOutOfRange};

use super::keymap::KeyIndexMap;

/// Display color of a cluster (8 bits per channel).
pub type Rgb = Srgb<u8>;

// ---------------------------------------------------------------------------
// PointDataset – rows of named numeric dimensions
// ---------------------------------------------------------------------------

/// A dense point dataset, stored row-major.
#[derive(Debug, Clone)]
pub struct PointDataset {
    pub name: String,
    dimension_names: Vec<String>,
    /// `num_points * num_dimensions` values, row-major.
    values: Vec<f32>,
    num_points: usize,
    /// Row index ↔ shared key.
    pub keys: KeyIndexMap,
    source: Option<PathBuf>,
}

impl PointDataset {
    /// Build a dataset from row-major values.
    ///
    /// `keys` must cover exactly `num_points` rows; pass
    /// [`KeyIndexMap::sequential`] when the source has no key column.
    pub fn new(
        name: impl Into<String>,
        dimension_names: Vec<String>,
        values: Vec<f32>,
        keys: KeyIndexMap,
    ) -> Result<Self, DatasetError> {
        let num_dimensions = dimension_names.len();
        let num_points = keys.len();
        let expected = num_points * num_dimensions;

        if values.len() != expected {
            return Err(DatasetError::ValueCountMismatch {
                expected,
                actual: values.len(),
                num_points,
                num_dimensions,
            });
        }

        Ok(Self {
            name: name.into(),
            dimension_names,
            values,
            num_points,
            keys,
            source: None,
        })
    }

    /// Build a dataset from rows, keyed by row number.
    pub fn from_rows(
        name: impl Into<String>,
        dimension_names: Vec<String>,
        rows: &[Vec<f32>],
    ) -> Result<Self, DatasetError> {
        let values: Vec<f32> = rows.iter().flatten().copied().collect();
        Self::new(
            name,
            dimension_names,
            values,
            KeyIndexMap::sequential(rows.len()),
        )
    }

    /// File this dataset was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn dimension_names(&self) -> &[String] {
        &self.dimension_names
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn num_dimensions(&self) -> usize {
        self.dimension_names.len()
    }

    /// Copy out the column of values for one dimension.
    pub fn extract_data_for_dimension(
        &self,
        dimension_index: usize,
    ) -> Result<Vec<f32>, DimensionOutOfRange> {
        let num_dimensions = self.num_dimensions();
        if dimension_index >= num_dimensions {
            return Err(DimensionOutOfRange {
                index: dimension_index,
                num_dimensions,
            });
        }

        Ok(self
            .values
            .iter()
            .skip(dimension_index)
            .step_by(num_dimensions)
            .copied()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Clusters – a named, colored partition of a point dataset
// ---------------------------------------------------------------------------

/// One cluster: a display color and the member point indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub name: String,
    pub color: Rgb,
    pub indices: Vec<usize>,
}

/// A cluster partition over some point dataset.
///
/// `names` and `clusters` are kept separately, mirroring how hosts expose
/// them; a partition where their lengths differ is corrupt and is rejected by
/// [`read_partition`](crate::series::partition::read_partition).
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterDataset {
    pub name: String,
    names: Vec<String>,
    clusters: Vec<Cluster>,
    source: Option<PathBuf>,
}

impl ClusterDataset {
    /// Partition whose name list is taken from the clusters themselves.
    pub fn new(name: impl Into<String>, clusters: Vec<Cluster>) -> Self {
        let names = clusters.iter().map(|c| c.name.clone()).collect();
        Self {
            name: name.into(),
            names,
            clusters,
            source: None,
        }
    }

    /// Partition with an explicit name list, which may disagree with the
    /// cluster list.
    pub fn with_names(name: impl Into<String>, names: Vec<String>, clusters: Vec<Cluster>) -> Self {
        Self {
            name: name.into(),
            names,
            clusters,
            source: None,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn cluster_names(&self) -> &[String] {
        &self.names
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }
}

// ---------------------------------------------------------------------------
// MetadataDataset – categorical text columns addressed by key
// ---------------------------------------------------------------------------

/// A table of text columns whose rows are identified through `keys`.
#[derive(Debug, Clone)]
pub struct MetadataDataset {
    pub name: String,
    /// Column names in the order they were given to [`MetadataDataset::new`].
    pub column_names: Vec<String>,
    columns: BTreeMap<String, Vec<String>>,
    pub keys: KeyIndexMap,
    source: Option<PathBuf>,
}

impl MetadataDataset {
    /// Build from named columns; every column must have one entry per key.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<(String, Vec<String>)>,
        keys: KeyIndexMap,
    ) -> Result<Self, DatasetError> {
        let rows = keys.len();
        let mut column_names = Vec::with_capacity(columns.len());
        let mut by_name = BTreeMap::new();

        for (column, values) in columns {
            if values.len() != rows {
                return Err(DatasetError::ColumnLengthMismatch {
                    column,
                    expected: rows,
                    actual: values.len(),
                });
            }
            column_names.push(column.clone());
            by_name.insert(column, values);
        }

        Ok(Self {
            name: name.into(),
            column_names,
            columns: by_name,
            keys,
            source: None,
        })
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn num_rows(&self) -> usize {
        self.keys.len()
    }

    pub fn get_column(&self, column: &str) -> Option<&[String]> {
        self.columns.get(column).map(Vec::as_slice)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the closed set of bindable dataset kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Points,
    Clusters,
    Metadata,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Points => write!(f, "points"),
            DataType::Clusters => write!(f, "clusters"),
            DataType::Metadata => write!(f, "metadata"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Dataset {
    Points(PointDataset),
    Clusters(ClusterDataset),
    Metadata(MetadataDataset),
}

impl Dataset {
    pub fn data_type(&self) -> DataType {
        match self {
            Dataset::Points(_) => DataType::Points,
            Dataset::Clusters(_) => DataType::Clusters,
            Dataset::Metadata(_) => DataType::Metadata,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Dataset::Points(d) => &d.name,
            Dataset::Clusters(d) => &d.name,
            Dataset::Metadata(d) => &d.name,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        match self {
            Dataset::Points(d) => d.source(),
            Dataset::Clusters(d) => d.source(),
            Dataset::Metadata(d) => d.source(),
        }
    }

    /// Record the file the dataset was read from; it identifies the dataset
    /// when it is bound.
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        let path = Some(path.into());
        match &mut self {
            Dataset::Points(d) => d.source = path,
            Dataset::Clusters(d) => d.source = path,
            Dataset::Metadata(d) => d.source = path,
        }
        self
    }
}
