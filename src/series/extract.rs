use crate::data::model::PointDataset;
use crate::error::DimensionOutOfRange;

/// Values of one dimension for every point, in point order.
///
/// Callers are expected to have checked `dimension_index` against
/// [`PointDataset::num_dimensions`]; an out-of-range index is reported rather
/// than clamped.
pub fn extract(dataset: &PointDataset, dimension_index: usize) -> Result<Vec<f32>, DimensionOutOfRange> {
    dataset.extract_data_for_dimension(dimension_index)
}

/// Values of one dimension for the listed points only, in the listed order.
pub fn extract_subset(
    dataset: &PointDataset,
    dimension_index: usize,
    indices: &[usize],
) -> Result<Vec<f32>, DimensionOutOfRange> {
    let column = extract(dataset, dimension_index)?;
    Ok(indices.iter().filter_map(|&i| column.get(i).copied()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> PointDataset {
        PointDataset::from_rows(
            "pts",
            vec!["x".into(), "y".into()],
            &[vec![1.0, -1.0], vec![2.0, -2.0], vec![3.0, -3.0]],
        )
        .unwrap()
    }

    #[test]
    fn extract_returns_one_value_per_point() {
        assert_eq!(extract(&dataset(), 1).unwrap(), vec![-1.0, -2.0, -3.0]);
    }

    #[test]
    fn subset_follows_requested_order() {
        assert_eq!(extract_subset(&dataset(), 0, &[2, 0]).unwrap(), vec![3.0, 1.0]);
    }

    #[test]
    fn out_of_range_dimension_is_reported() {
        assert!(extract(&dataset(), 5).is_err());
    }

    #[test]
    fn empty_dataset_yields_empty_column() {
        let empty = PointDataset::from_rows("none", vec!["x".into()], &[]).unwrap();
        assert!(extract(&empty, 0).unwrap().is_empty());
    }
}
