use std::collections::HashMap;

use crate::error::KeyMapError;

// ---------------------------------------------------------------------------
// KeyIndexMap – bijection between local row indices and shared keys
// ---------------------------------------------------------------------------

/// Bidirectional map between a dataset's row indices and an external key
/// space (cell ids, sample ids, ...).
///
/// Two datasets that share a key space can be joined through their maps even
/// when their row counts and orderings differ. The map is built once and is
/// immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyIndexMap {
    /// index → key. Dense: row `i` has key `keys[i]`.
    keys: Vec<String>,
    /// key → index.
    indices: HashMap<String, usize>,
}

impl KeyIndexMap {
    /// Build a map where row `i` carries `keys[i]`.
    ///
    /// Fails on the first repeated key, since a repeated key would break the
    /// bijection.
    pub fn from_keys<I, S>(keys: I) -> Result<Self, KeyMapError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        let mut indices = HashMap::with_capacity(keys.len());

        for (i, key) in keys.iter().enumerate() {
            if let Some(first) = indices.insert(key.clone(), i) {
                return Err(KeyMapError::DuplicateKey {
                    key: key.clone(),
                    first,
                    second: i,
                });
            }
        }

        Ok(Self { keys, indices })
    }

    /// Identity-style map whose keys are the decimal row numbers `0..n`.
    pub fn sequential(n: usize) -> Self {
        let keys: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        let indices = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i))
            .collect();
        Self { keys, indices }
    }

    /// Number of rows covered by the map.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key_of(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.indices.get(key).copied()
    }

    /// Keys for the given indices; `None` where an index is not covered.
    pub fn keys_by_indices(&self, indices: &[usize]) -> Vec<Option<&str>> {
        indices.iter().map(|&i| self.key_of(i)).collect()
    }

    /// Indices for the given keys; `None` where a key is unknown.
    pub fn indices_by_keys<S: AsRef<str>>(&self, keys: &[S]) -> Vec<Option<usize>> {
        keys.iter().map(|k| self.index_of(k.as_ref())).collect()
    }

    /// All keys in row order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_go_both_ways() {
        let map = KeyIndexMap::from_keys(["c1", "c2", "c3"]).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.key_of(1), Some("c2"));
        assert_eq!(map.index_of("c3"), Some(2));
        assert_eq!(map.index_of("c9"), None);
        assert_eq!(map.key_of(3), None);
    }

    #[test]
    fn batch_lookups_mark_missing_entries() {
        let map = KeyIndexMap::from_keys(["a", "b"]).unwrap();
        assert_eq!(map.keys_by_indices(&[1, 5, 0]), vec![Some("b"), None, Some("a")]);
        assert_eq!(map.indices_by_keys(&["b", "x"]), vec![Some(1), None]);
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let err = KeyIndexMap::from_keys(["a", "b", "a"]).unwrap_err();
        assert_eq!(
            err,
            KeyMapError::DuplicateKey {
                key: "a".into(),
                first: 0,
                second: 2
            }
        );
    }

    #[test]
    fn sequential_uses_row_numbers() {
        let map = KeyIndexMap::sequential(3);
        assert_eq!(map.key_of(2), Some("2"));
        assert_eq!(map.index_of("0"), Some(0));
        assert!(KeyIndexMap::sequential(0).is_empty());
    }
}
