use std::collections::HashMap;

// ---------------------------------------------------------------------------
// CategoryRegistry – dense ids in order of first appearance
// ---------------------------------------------------------------------------

/// Assigns dense ids `0, 1, 2, ...` to labels in the order they are first
/// seen.
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    ids: HashMap<String, u32>,
    names: Vec<String>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `label`, registering it if unseen.
    pub fn id_for(&mut self, label: &str) -> u32 {
        if let Some(&id) = self.ids.get(label) {
            return id;
        }
        let id = self.names.len() as u32;
        self.ids.insert(label.to_string(), id);
        self.names.push(label.to_string());
        id
    }

    /// Labels in ascending id order.
    pub fn ordered_names(&self) -> &[String] {
        &self.names
    }

    pub fn into_ordered_names(self) -> Vec<String> {
        self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Map every label to its first-seen id.
///
/// Returns the ids aligned with `labels` and the distinct labels indexed by
/// id.
pub fn assign_ids<I, S>(labels: I) -> (Vec<u32>, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut registry = CategoryRegistry::new();
    let ids = labels
        .into_iter()
        .map(|label| registry.id_for(label.as_ref()))
        .collect();
    (ids, registry.into_ordered_names())
}
