use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Rgb;
use crate::series::document::{GroupedSeriesDocument, Grouping};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            rgb.into_format::<u8>()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Group colours for a document
// ---------------------------------------------------------------------------

/// One colour per group of `document`, in group order.
///
/// Cluster groups keep their own colour; metadata categories have none and
/// get palette colours assigned by category id.
pub fn group_colors(document: &GroupedSeriesDocument) -> Vec<Rgb> {
    match &document.grouping {
        Grouping::Clusters { categories } => categories.iter().map(|g| g.color).collect(),
        Grouping::Categories { categories, .. } => generate_palette(categories.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::document::ClusterGroup;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let palette = generate_palette(6);
        assert_eq!(palette.len(), 6);
        for (i, a) in palette.iter().enumerate() {
            for b in &palette[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn cluster_groups_keep_their_colour() {
        let doc = GroupedSeriesDocument {
            title: "d".into(),
            values: vec![0.0],
            grouping: Grouping::Clusters {
                categories: vec![ClusterGroup {
                    name: "a".into(),
                    indices: vec![0],
                    color: Rgb::new(1, 2, 3),
                }],
            },
        };
        assert_eq!(group_colors(&doc), vec![Rgb::new(1, 2, 3)]);
    }
}
