use thiserror::Error;

// ---------------------------------------------------------------------------
// Library errors
// ---------------------------------------------------------------------------

/// A cluster partition that cannot be used as a grouping.
///
/// Rejection is all-or-nothing: no cluster of a rejected partition is ever
/// emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectedPartition {
    #[error("partition has {names} cluster names but {clusters} clusters")]
    NameCountMismatch { names: usize, clusters: usize },

    #[error("cluster '{cluster}' references point {index}, but the dataset has {num_points} points")]
    IndexOutOfRange {
        cluster: String,
        index: usize,
        num_points: usize,
    },
}

/// Requested dimension does not exist in the point dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("dimension {index} out of range (dataset has {num_dimensions} dimensions)")]
pub struct DimensionOutOfRange {
    pub index: usize,
    pub num_dimensions: usize,
}

/// Failure to build a [`KeyIndexMap`](crate::data::keymap::KeyIndexMap).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyMapError {
    #[error("key '{key}' appears at rows {first} and {second}")]
    DuplicateKey {
        key: String,
        first: usize,
        second: usize,
    },
}

/// Structurally invalid dataset contents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("expected {expected} values for {num_points} points x {num_dimensions} dimensions, got {actual}")]
    ValueCountMismatch {
        expected: usize,
        actual: usize,
        num_points: usize,
        num_dimensions: usize,
    },

    #[error("column '{column}' has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("dataset has {rows} rows but its key map covers {keys}")]
    KeyCountMismatch { rows: usize, keys: usize },
}
