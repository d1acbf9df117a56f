use serde::{Deserialize, Deserializer, Serialize};

use crate::data::model::Rgb;

// ---------------------------------------------------------------------------
// GroupedSeriesDocument – the payload handed to the rendering sink
// ---------------------------------------------------------------------------

/// One dimension's values plus a description of how they are grouped.
///
/// Serialized shape:
///
/// ```json
/// { "title": "CD4", "values": [1.0, 2.5],
///   "categories": [{ "name": "T", "indices": [0, 1], "color": "#1f77b4" }] }
/// ```
///
/// or, for metadata categories:
///
/// ```json
/// { "title": "CD4", "values": [1.0, 2.5],
///   "categories": ["naive", "memory"], "categoryIds": [0, 1] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedSeriesDocument {
    pub title: String,
    /// Missing values are NaN, written as `null`.
    #[serde(deserialize_with = "null_as_nan")]
    pub values: Vec<f32>,
    #[serde(flatten)]
    pub grouping: Grouping,
}

/// Exactly one of the two grouping descriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Grouping {
    /// Per-point category ids aligned with `values`, and the category names
    /// indexed by id.
    Categories {
        categories: Vec<String>,
        #[serde(rename = "categoryIds")]
        category_ids: Vec<u32>,
    },
    /// Named index-membership groups over `values`.
    Clusters { categories: Vec<ClusterGroup> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterGroup {
    pub name: String,
    pub indices: Vec<usize>,
    #[serde(with = "hex_color")]
    pub color: Rgb,
}

impl GroupedSeriesDocument {
    /// Number of points carried by the document.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Group names in display order.
    pub fn group_names(&self) -> Vec<&str> {
        match &self.grouping {
            Grouping::Clusters { categories } => categories.iter().map(|g| g.name.as_str()).collect(),
            Grouping::Categories { categories, .. } => categories.iter().map(String::as_str).collect(),
        }
    }

    /// Values of each group, in group order.
    ///
    /// For cluster groups a point may appear in several groups.
    pub fn group_values(&self) -> Vec<Vec<f32>> {
        match &self.grouping {
            Grouping::Clusters { categories } => categories
                .iter()
                .map(|g| g.indices.iter().filter_map(|&i| self.values.get(i).copied()).collect())
                .collect(),
            Grouping::Categories {
                categories,
                category_ids,
            } => {
                let mut groups = vec![Vec::new(); categories.len()];
                for (&id, &value) in category_ids.iter().zip(&self.values) {
                    if let Some(group) = groups.get_mut(id as usize) {
                        group.push(value);
                    }
                }
                groups
            }
        }
    }

    /// Whether every referenced index and id stays within bounds.
    pub fn is_consistent(&self) -> bool {
        match &self.grouping {
            Grouping::Clusters { categories } => categories
                .iter()
                .all(|g| g.indices.iter().all(|&i| i < self.values.len())),
            Grouping::Categories {
                categories,
                category_ids,
            } => {
                category_ids.len() == self.values.len()
                    && category_ids.iter().all(|&id| (id as usize) < categories.len())
            }
        }
    }

    /// Indented JSON, the form handed to the rendering sink.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a document produced by [`to_json`](Self::to_json); `null`
    /// values read back as NaN.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

fn null_as_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f32>, D::Error> {
    let values: Vec<Option<f32>> = Vec::deserialize(deserializer)?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f32::NAN)).collect())
}

/// `#rrggbb` encoding of [`Rgb`], lowercase on output.
pub mod hex_color {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::data::model::Rgb;

    pub fn format(color: &Rgb) -> String {
        format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
    }

    pub fn parse(text: &str) -> Option<Rgb> {
        let hex = text.strip_prefix('#').unwrap_or(text);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn serialize<S: Serializer>(color: &Rgb, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(color))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rgb, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).ok_or_else(|| D::Error::custom(format!("invalid color '{text}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cluster_document() -> GroupedSeriesDocument {
        GroupedSeriesDocument {
            title: "CD4".into(),
            values: vec![1.0, 2.0, 3.0],
            grouping: Grouping::Clusters {
                categories: vec![ClusterGroup {
                    name: "T".into(),
                    indices: vec![0, 2],
                    color: Rgb::new(31, 119, 180),
                }],
            },
        }
    }

    fn category_document() -> GroupedSeriesDocument {
        GroupedSeriesDocument {
            title: "CD8".into(),
            values: vec![10.0, 30.0, 40.0],
            grouping: Grouping::Categories {
                categories: vec!["red".into(), "blue".into()],
                category_ids: vec![0, 1, 0],
            },
        }
    }

    #[test]
    fn cluster_grouping_serializes_as_category_objects() {
        let value = serde_json::to_value(cluster_document()).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "CD4",
                "values": [1.0, 2.0, 3.0],
                "categories": [{ "name": "T", "indices": [0, 2], "color": "#1f77b4" }]
            })
        );
    }

    #[test]
    fn category_grouping_serializes_names_and_ids() {
        let value = serde_json::to_value(category_document()).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "CD8",
                "values": [10.0, 30.0, 40.0],
                "categories": ["red", "blue"],
                "categoryIds": [0, 1, 0]
            })
        );
    }

    #[test]
    fn both_shapes_parse_back_into_the_right_variant() {
        for doc in [cluster_document(), category_document()] {
            let text = doc.to_json().unwrap();
            assert_eq!(GroupedSeriesDocument::from_json(&text).unwrap(), doc);
        }
    }

    #[test]
    fn group_values_follow_the_grouping() {
        assert_eq!(cluster_document().group_values(), vec![vec![1.0, 3.0]]);
        assert_eq!(
            category_document().group_values(),
            vec![vec![10.0, 40.0], vec![30.0]]
        );
        assert_eq!(category_document().group_names(), vec!["red", "blue"]);
    }

    #[test]
    fn consistency_catches_dangling_references() {
        assert!(cluster_document().is_consistent());
        assert!(category_document().is_consistent());

        let mut doc = cluster_document();
        doc.values.truncate(2);
        assert!(!doc.is_consistent());

        let mut doc = category_document();
        if let Grouping::Categories { category_ids, .. } = &mut doc.grouping {
            category_ids[0] = 5;
        }
        assert!(!doc.is_consistent());
    }

    #[test]
    fn colors_use_lowercase_hex() {
        assert_eq!(hex_color::format(&Rgb::new(255, 0, 171)), "#ff00ab");
        assert_eq!(hex_color::parse("#FF00AB"), Some(Rgb::new(255, 0, 171)));
        assert_eq!(hex_color::parse("00ff00"), Some(Rgb::new(0, 255, 0)));
        assert_eq!(hex_color::parse("#12345"), None);
        assert_eq!(hex_color::parse("#gg0000"), None);
    }
}
