use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoints, Points};

use dimension_plot::color::group_colors;
use dimension_plot::Rgb;

use crate::state::AppState;

/// Horizontal spread of the points within one group's column.
const JITTER_WIDTH: f64 = 0.6;

const BOX_WIDTH: f64 = 0.8;

// ---------------------------------------------------------------------------
// Strip plot (central panel)
// ---------------------------------------------------------------------------

/// Render the last document as one column of points per group, over a
/// box-and-whisker of that group's values.
pub fn dimension_plot(ui: &mut Ui, state: &mut AppState) {
    let Some(document) = state.session.document() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Load points and clusters or metadata  (File → Open…)");
        });
        return;
    };

    let names: Vec<String> = document.group_names().iter().map(|s| s.to_string()).collect();
    let groups = document.group_values();
    let colors = group_colors(document);

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(&document.title);
    });

    let response = Plot::new("dimension_plot")
        .legend(Legend::default())
        .x_axis_label("Group")
        .y_axis_label(document.title.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (slot, values) in groups.iter().enumerate() {
                let color = colors.get(slot).copied().map_or(Color32::LIGHT_BLUE, to_color32);

                if let Some(spread) = box_spread(values) {
                    let elem = BoxElem::new(slot as f64, spread)
                        .name(&names[slot])
                        .box_width(BOX_WIDTH)
                        .whisker_width(BOX_WIDTH / 2.0)
                        .fill(Color32::TRANSPARENT)
                        .stroke(Stroke::new(1.5, color));
                    plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&names[slot]).color(color));
                }

                let points: PlotPoints = values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| [slot as f64 + jitter(i), v as f64])
                    .collect();
                plot_ui.points(
                    Points::new(points)
                        .name(&names[slot])
                        .color(color)
                        .radius(1.5),
                );
            }

            plot_ui.pointer_coordinate().and_then(|p| {
                let slot = p.x.round();
                (slot >= 0.0 && (slot as usize) < names.len()).then(|| slot as usize)
            })
        });

    let hovered = response
        .response
        .hovered()
        .then_some(response.inner)
        .flatten()
        .map(|slot| names[slot].clone());
    state.hover_group(hovered);
}

/// Deterministic offset in `[-JITTER_WIDTH / 2, JITTER_WIDTH / 2)` for the
/// `i`-th point of a group.
fn jitter(i: usize) -> f64 {
    let h = (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 40;
    (h as f64 / (1u64 << 24) as f64 - 0.5) * JITTER_WIDTH
}

pub fn to_color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}

/// Min, quartiles, median and max of the finite values; `None` for a group
/// with none.
fn box_spread(values: &[f32]) -> Option<BoxSpread> {
    let mut sorted: Vec<f64> = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|&v| v as f64)
        .collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    Some(BoxSpread::new(
        sorted[0],
        quantile_sorted(&sorted, 0.25),
        quantile_sorted(&sorted, 0.5),
        quantile_sorted(&sorted, 0.75),
        sorted[sorted.len() - 1],
    ))
}

/// Linear interpolation between the closest ranks of a sorted, non-empty
/// slice.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * p;
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}
