use crate::data::keymap::KeyIndexMap;

// ---------------------------------------------------------------------------
// Cross-dataset index translation through a shared key space
// ---------------------------------------------------------------------------

/// Resolve source rows to target rows by way of their shared keys.
///
/// The result is aligned with `source_indices`. An entry is `None` when the
/// source index has no key in `source_map`, or when that key is absent from
/// `target_map`. Row positions are never assumed to line up across datasets.
pub fn translate(
    source_indices: &[usize],
    source_map: &KeyIndexMap,
    target_map: &KeyIndexMap,
) -> Vec<Option<usize>> {
    source_indices
        .iter()
        .map(|&i| {
            source_map
                .key_of(i)
                .and_then(|key| target_map.index_of(key))
        })
        .collect()
}

/// Translate all rows `0..n` of the source and keep only the resolved pairs
/// `(source_index, target_index)`, in source order.
pub fn resolved_pairs(
    num_source_rows: usize,
    source_map: &KeyIndexMap,
    target_map: &KeyIndexMap,
) -> Vec<(usize, usize)> {
    let source_indices: Vec<usize> = (0..num_source_rows).collect();
    translate(&source_indices, source_map, target_map)
        .into_iter()
        .enumerate()
        .filter_map(|(source, target)| target.map(|t| (source, t)))
        .collect()
}
