use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType as ArrowType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::color::generate_palette;
use crate::series::document::hex_color;

use super::keymap::KeyIndexMap;
use super::model::{Cluster, ClusterDataset, DataType, Dataset, MetadataDataset, PointDataset};

/// Label used for missing metadata cells.
pub const NULL_LABEL: &str = "<null>";

/// Column carrying the shared key when none is configured.
pub const DEFAULT_KEY_COLUMN: &str = "id";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset of the given kind from a file.  Dispatch by extension.
///
/// Supported formats:
/// * points   – `.csv`, `.json`, `.parquet`
/// * clusters – `.json`
/// * metadata – `.csv`, `.json`, `.parquet`
///
/// `key_column` names the column holding the shared key of each row. When
/// the file has no such column, rows are keyed by their row number. The
/// canonical path is recorded as the dataset's source.
pub fn load_file(path: &Path, kind: DataType, key_column: &str) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let name = dataset_name(path);

    let dataset = match (kind, ext.as_str()) {
        (DataType::Points, "csv") => Dataset::Points(read_points_csv(&name, open(path)?, key_column)?),
        (DataType::Points, "json") => Dataset::Points(read_points_json(&name, open(path)?)?),
        (DataType::Points, "parquet" | "pq") => Dataset::Points(load_points_parquet(&name, path, key_column)?),
        (DataType::Clusters, "json") => Dataset::Clusters(read_clusters_json(&name, open(path)?)?),
        (DataType::Metadata, "csv") => Dataset::Metadata(read_metadata_csv(&name, open(path)?, key_column)?),
        (DataType::Metadata, "json") => Dataset::Metadata(read_metadata_json(&name, open(path)?, key_column)?),
        (DataType::Metadata, "parquet" | "pq") => {
            Dataset::Metadata(load_metadata_parquet(&name, path, key_column)?)
        }
        (kind, other) => bail!("Unsupported file extension for {kind} data: .{other}"),
    };

    let source = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    Ok(dataset.with_source(source))
}

fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))
}

fn dataset_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string()
}

fn key_map(name: &str, keys: Option<Vec<String>>, rows: usize) -> Result<KeyIndexMap> {
    match keys {
        Some(keys) => KeyIndexMap::from_keys(keys).with_context(|| format!("building key map for '{name}'")),
        None => Ok(KeyIndexMap::sequential(rows)),
    }
}

// ---------------------------------------------------------------------------
// Points
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names. The key column (if present)
/// holds row keys; every other column is a numeric dimension. Empty cells
/// read as NaN.
pub fn read_points_csv<R: Read>(name: &str, reader: R, key_column: &str) -> Result<PointDataset> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let key_idx = headers.iter().position(|h| h == key_column);
    let dimension_names: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != key_idx)
        .map(|(_, h)| h.clone())
        .collect();

    let mut values = Vec::new();
    let mut keys = key_idx.map(|_| Vec::new());

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        for (col_idx, cell) in record.iter().enumerate() {
            if Some(col_idx) == key_idx {
                if let Some(keys) = keys.as_mut() {
                    keys.push(cell.to_string());
                }
                continue;
            }
            values.push(parse_float(cell).with_context(|| {
                format!("Row {row_no}, column '{}': '{cell}' is not a number", headers[col_idx])
            })?);
        }
    }

    let rows = if dimension_names.is_empty() {
        keys.as_ref().map_or(0, Vec::len)
    } else {
        values.len() / dimension_names.len()
    };
    let keys = key_map(name, keys, rows)?;
    PointDataset::new(name, dimension_names, values, keys).with_context(|| format!("building points '{name}'"))
}

fn parse_float(cell: &str) -> Result<f32> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(f32::NAN);
    }
    Ok(cell.parse::<f32>()?)
}

#[derive(Debug, Deserialize)]
struct PointsJson {
    dimensions: Vec<String>,
    #[serde(default)]
    keys: Option<Vec<String>>,
    values: Vec<Vec<f32>>,
}

/// Expected JSON schema:
///
/// ```json
/// {
///   "dimensions": ["CD4", "CD8"],
///   "keys": ["cell_1", "cell_2"],
///   "values": [[0.5, 1.25], [0.0, 3.5]]
/// }
/// ```
///
/// `keys` is optional.
pub fn read_points_json<R: Read>(name: &str, reader: R) -> Result<PointDataset> {
    let parsed: PointsJson = serde_json::from_reader(reader).context("parsing points JSON")?;

    for (i, row) in parsed.values.iter().enumerate() {
        if row.len() != parsed.dimensions.len() {
            bail!(
                "Row {i}: {} values but {} dimensions",
                row.len(),
                parsed.dimensions.len()
            );
        }
    }

    let keys = key_map(name, parsed.keys, parsed.values.len())?;
    let values = parsed.values.into_iter().flatten().collect();
    PointDataset::new(name, parsed.dimensions, values, keys).with_context(|| format!("building points '{name}'"))
}

/// Load points from a Parquet file: numeric columns become dimensions, the
/// key column (if present) supplies row keys, other columns are ignored.
fn load_points_parquet(name: &str, path: &Path, key_column: &str) -> Result<PointDataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut dimension_names: Option<Vec<String>> = None;
    let mut columns: Vec<Vec<f32>> = Vec::new();
    let mut keys: Option<Vec<String>> = None;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let numeric: Vec<(usize, String)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.name() != key_column && is_numeric(f.data_type()))
            .map(|(i, f)| (i, f.name().clone()))
            .collect();

        if dimension_names.is_none() {
            columns = vec![Vec::new(); numeric.len()];
            dimension_names = Some(numeric.iter().map(|(_, n)| n.clone()).collect());
        }

        for (slot, (col_idx, col_name)) in numeric.iter().enumerate() {
            let column = columns
                .get_mut(slot)
                .with_context(|| format!("column '{col_name}' not present in first batch"))?;
            column.extend(float_column(batch.column(*col_idx)).with_context(|| format!("reading '{col_name}'"))?);
        }

        if let Ok(key_idx) = schema.index_of(key_column) {
            keys.get_or_insert_with(Vec::new)
                .extend(string_column(batch.column(key_idx)).with_context(|| format!("reading '{key_column}'"))?);
        }
    }

    let dimension_names = dimension_names.unwrap_or_default();
    let rows = columns.first().map_or_else(|| keys.as_ref().map_or(0, Vec::len), Vec::len);

    let mut values = Vec::with_capacity(rows * dimension_names.len());
    for row in 0..rows {
        for column in &columns {
            values.push(column.get(row).copied().unwrap_or(f32::NAN));
        }
    }

    let keys = key_map(name, keys, rows)?;
    PointDataset::new(name, dimension_names, values, keys).with_context(|| format!("building points '{name}'"))
}

// ---------------------------------------------------------------------------
// Clusters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ClustersJson {
    #[serde(default)]
    names: Option<Vec<String>>,
    clusters: Vec<ClusterJson>,
}

#[derive(Debug, Deserialize)]
struct ClusterJson {
    name: String,
    #[serde(default)]
    color: Option<String>,
    indices: Vec<usize>,
}

/// Expected JSON schema:
///
/// ```json
/// {
///   "clusters": [
///     { "name": "T cells", "color": "#1f77b4", "indices": [0, 4, 5] },
///     { "name": "B cells", "indices": [1, 2] }
///   ]
/// }
/// ```
///
/// An explicit `"names"` list may accompany the clusters; it is kept as-is
/// so a mismatched partition is detected when it is read. Clusters without
/// a colour get one from the palette.
pub fn read_clusters_json<R: Read>(name: &str, reader: R) -> Result<ClusterDataset> {
    let parsed: ClustersJson = serde_json::from_reader(reader).context("parsing clusters JSON")?;
    let palette = generate_palette(parsed.clusters.len());

    let clusters = parsed
        .clusters
        .into_iter()
        .zip(palette)
        .map(|(c, fallback)| -> Result<Cluster> {
            let color = match c.color.as_deref() {
                Some(text) => hex_color::parse(text)
                    .with_context(|| format!("cluster '{}': invalid color '{text}'", c.name))?,
                None => fallback,
            };
            Ok(Cluster {
                name: c.name,
                color,
                indices: c.indices,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(match parsed.names {
        Some(names) => ClusterDataset::with_names(name, names, clusters),
        None => ClusterDataset::new(name, clusters),
    })
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// CSV layout: header row; the key column (if present) holds row keys and
/// every other column is kept as text. Empty cells read as [`NULL_LABEL`].
pub fn read_metadata_csv<R: Read>(name: &str, reader: R, key_column: &str) -> Result<MetadataDataset> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let key_idx = headers.iter().position(|h| h == key_column);
    let mut columns: Vec<(String, Vec<String>)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != key_idx)
        .map(|(_, h)| (h.clone(), Vec::new()))
        .collect();
    let mut keys = key_idx.map(|_| Vec::new());
    let mut rows = 0;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let mut slot = 0;

        for (col_idx, cell) in record.iter().enumerate() {
            if Some(col_idx) == key_idx {
                if let Some(keys) = keys.as_mut() {
                    keys.push(cell.to_string());
                }
                continue;
            }
            let label = if cell.is_empty() { NULL_LABEL } else { cell };
            columns[slot].1.push(label.to_string());
            slot += 1;
        }
        rows += 1;
    }

    let keys = key_map(name, keys, rows)?;
    MetadataDataset::new(name, columns, keys).with_context(|| format!("building metadata '{name}'"))
}

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "id": "cell_1", "cell_type": "T", "batch": 1 },
///   { "id": "cell_2", "cell_type": "B", "batch": 2 }
/// ]
/// ```
///
/// Columns keep the order in which their names first appear. Non-string
/// values are rendered as text; missing or null cells read as [`NULL_LABEL`].
pub fn read_metadata_json<R: Read>(name: &str, reader: R, key_column: &str) -> Result<MetadataDataset> {
    let root: JsonValue = serde_json::from_reader(reader).context("parsing metadata JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut column_names: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for column in obj.keys().filter(|k| *k != key_column) {
            if seen.insert(column.as_str()) {
                column_names.push(column.clone());
            }
        }
        rows.push(obj);
    }

    let has_keys = rows.iter().any(|obj| obj.contains_key(key_column));
    let keys = if has_keys {
        let keys = rows
            .iter()
            .enumerate()
            .map(|(i, obj)| {
                obj.get(key_column)
                    .map(json_to_label)
                    .with_context(|| format!("Row {i}: missing '{key_column}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        Some(keys)
    } else {
        None
    };

    let columns: Vec<(String, Vec<String>)> = column_names
        .into_iter()
        .map(|column| {
            let values = rows
                .iter()
                .map(|obj| obj.get(&column).map_or_else(|| NULL_LABEL.to_string(), json_to_label))
                .collect();
            (column, values)
        })
        .collect();

    let keys = key_map(name, keys, rows.len())?;
    MetadataDataset::new(name, columns, keys).with_context(|| format!("building metadata '{name}'"))
}

fn json_to_label(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => NULL_LABEL.to_string(),
        other => other.to_string(),
    }
}

/// Load metadata from a Parquet file: every non-key column is cast to text.
fn load_metadata_parquet(name: &str, path: &Path, key_column: &str) -> Result<MetadataDataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<(String, Vec<String>)> = Vec::new();
    let mut keys: Option<Vec<String>> = None;
    let mut rows = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        if columns.is_empty() {
            columns = schema
                .fields()
                .iter()
                .filter(|f| f.name() != key_column)
                .map(|f| (f.name().clone(), Vec::new()))
                .collect();
        }

        for (col_name, values) in columns.iter_mut() {
            let col_idx = schema
                .index_of(col_name)
                .map_err(|_| anyhow::anyhow!("column '{col_name}' missing from a record batch"))?;
            values.extend(string_column(batch.column(col_idx)).with_context(|| format!("reading '{col_name}'"))?);
        }

        if let Ok(key_idx) = schema.index_of(key_column) {
            keys.get_or_insert_with(Vec::new)
                .extend(string_column(batch.column(key_idx)).with_context(|| format!("reading '{key_column}'"))?);
        }
        rows += batch.num_rows();
    }

    let keys = key_map(name, keys, rows)?;
    MetadataDataset::new(name, columns, keys).with_context(|| format!("building metadata '{name}'"))
}

// -- Parquet / Arrow helpers --

fn is_numeric(data_type: &ArrowType) -> bool {
    matches!(
        data_type,
        ArrowType::Float32 | ArrowType::Float64 | ArrowType::Int32 | ArrowType::Int64
    )
}

/// Read a numeric column as `f32`; nulls become NaN.
fn float_column(col: &Arc<dyn Array>) -> Result<Vec<f32>> {
    let values: Vec<f32> = match col.data_type() {
        ArrowType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .iter()
            .map(|v| v.unwrap_or(f32::NAN))
            .collect(),
        ArrowType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .iter()
            .map(|v| v.map_or(f32::NAN, |v| v as f32))
            .collect(),
        ArrowType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .iter()
            .map(|v| v.map_or(f32::NAN, |v| v as f32))
            .collect(),
        ArrowType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .iter()
            .map(|v| v.map_or(f32::NAN, |v| v as f32))
            .collect(),
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok(values)
}

/// Read any column as text; nulls become [`NULL_LABEL`].
fn string_column(col: &Arc<dyn Array>) -> Result<Vec<String>> {
    let as_text = cast(col, &ArrowType::Utf8).context("casting column to text")?;
    let strings = as_text.as_string::<i32>();
    Ok(strings
        .iter()
        .map(|v| v.map_or_else(|| NULL_LABEL.to_string(), str::to_string))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_csv_splits_key_column_from_dimensions() {
        let text = "id,CD4,CD8\nc1,1.5,2\nc2,,4\n";
        let ds = read_points_csv("cells", text.as_bytes(), "id").unwrap();

        assert_eq!(ds.dimension_names(), &["CD4".to_string(), "CD8".to_string()]);
        assert_eq!(ds.num_points(), 2);
        assert_eq!(ds.keys.index_of("c2"), Some(1));
        assert_eq!(ds.extract_data_for_dimension(1).unwrap(), vec![2.0, 4.0]);
        assert!(ds.extract_data_for_dimension(0).unwrap()[1].is_nan());
    }

    #[test]
    fn points_csv_without_key_column_uses_row_numbers() {
        let ds = read_points_csv("cells", "a\n1\n2\n".as_bytes(), "id").unwrap();
        assert_eq!(ds.keys.key_of(1), Some("1"));
    }

    #[test]
    fn points_csv_rejects_text_in_dimensions() {
        let err = read_points_csv("cells", "a,b\n1,x\n".as_bytes(), "id").unwrap_err();
        assert!(format!("{err:#}").contains("'x' is not a number"));
    }

    #[test]
    fn points_json_reads_rows_and_keys() {
        let text = r#"{"dimensions":["a","b"],"keys":["k1","k2"],"values":[[1,2],[3,4]]}"#;
        let ds = read_points_json("pts", text.as_bytes()).unwrap();
        assert_eq!(ds.extract_data_for_dimension(0).unwrap(), vec![1.0, 3.0]);
        assert_eq!(ds.keys.key_of(0), Some("k1"));

        let ragged = r#"{"dimensions":["a","b"],"values":[[1]]}"#;
        assert!(read_points_json("pts", ragged.as_bytes()).is_err());
    }

    #[test]
    fn duplicate_keys_fail_the_load() {
        let text = "id,a\nc1,1\nc1,2\n";
        assert!(read_points_csv("cells", text.as_bytes(), "id").is_err());
    }

    #[test]
    fn clusters_json_parses_colors_and_fills_missing_ones() {
        let text = r##"{"clusters":[
            {"name":"T","color":"#FF0000","indices":[0,2]},
            {"name":"B","indices":[1]}
        ]}"##;
        let ds = read_clusters_json("leiden", text.as_bytes()).unwrap();

        assert_eq!(ds.cluster_names(), &["T".to_string(), "B".to_string()]);
        assert_eq!(hex_color::format(&ds.clusters()[0].color), "#ff0000");
        assert_eq!(ds.clusters()[1].color, generate_palette(2)[1]);
    }

    #[test]
    fn clusters_json_keeps_explicit_name_list() {
        let text = r#"{"names":["only"],"clusters":[{"name":"a","indices":[]},{"name":"b","indices":[]}]}"#;
        let ds = read_clusters_json("odd", text.as_bytes()).unwrap();
        assert_eq!(ds.cluster_names().len(), 1);
        assert_eq!(ds.clusters().len(), 2);
    }

    #[test]
    fn clusters_json_rejects_bad_color() {
        let text = r#"{"clusters":[{"name":"a","color":"red","indices":[]}]}"#;
        assert!(read_clusters_json("bad", text.as_bytes()).is_err());
    }

    #[test]
    fn metadata_csv_keeps_text_columns() {
        let text = "cell_type,id,batch\nT,k1,1\n,k2,2\n";
        let ds = read_metadata_csv("meta", text.as_bytes(), "id").unwrap();

        assert_eq!(ds.column_names, vec!["cell_type", "batch"]);
        assert_eq!(ds.get_column("cell_type").unwrap(), &["T".to_string(), NULL_LABEL.to_string()]);
        assert_eq!(ds.keys.index_of("k2"), Some(1));
    }

    #[test]
    fn metadata_json_renders_values_as_text() {
        let text = r#"[{"id":"k1","type":"T","batch":1},{"id":"k2","batch":null}]"#;
        let ds = read_metadata_json("meta", text.as_bytes(), "id").unwrap();

        assert_eq!(ds.num_rows(), 2);
        assert_eq!(ds.get_column("batch").unwrap(), &["1".to_string(), NULL_LABEL.to_string()]);
        assert_eq!(ds.get_column("type").unwrap(), &["T".to_string(), NULL_LABEL.to_string()]);
        assert_eq!(ds.keys.key_of(1), Some("k2"));
    }

    #[test]
    fn metadata_json_keeps_first_seen_column_order() {
        let text = r#"[{"id":"k1","zone":"a","batch":1},{"id":"k2","age":3,"zone":"b"}]"#;
        let ds = read_metadata_json("meta", text.as_bytes(), "id").unwrap();
        assert_eq!(ds.column_names, vec!["zone", "batch", "age"]);
    }
}
