use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use dimension_plot::color::group_colors;
use dimension_plot::session::GroupingBinding;
use dimension_plot::DataType;

use crate::state::AppState;
use crate::ui::plot::to_color32;

// ---------------------------------------------------------------------------
// Left side panel – bindings and legend
// ---------------------------------------------------------------------------

/// Render the left panel: what is bound, the pickers, and the legend.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data");
    ui.separator();

    let Some(primary) = state.session.primary() else {
        ui.label("No data loaded.");
        ui.label("Use File → Open… to load points.");
        return;
    };

    ui.label(format!(
        "{}: {} points, {} dimensions",
        primary.name,
        primary.num_points(),
        primary.num_dimensions()
    ));
    let dimension_names = primary.dimension_names().to_vec();

    let metadata_columns = match state.session.grouping() {
        Some(GroupingBinding::Clusters(clusters)) => {
            ui.label(format!("Clusters: {} ({})", clusters.name, clusters.clusters().len()));
            None
        }
        Some(GroupingBinding::Metadata { dataset, column }) => {
            ui.label(format!("Metadata: {} ({} rows)", dataset.name, dataset.num_rows()));
            Some((dataset.column_names.clone(), column.clone().unwrap_or_default()))
        }
        None => {
            ui.label("No grouping bound.");
            None
        }
    };
    ui.separator();

    // ---- Dimension picker ----
    ui.strong("Dimension");
    let current = state.session.dimension();
    let selected_text = dimension_names.get(current).cloned().unwrap_or_default();
    egui::ComboBox::from_id_salt("dimension")
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            for (i, name) in dimension_names.iter().enumerate() {
                if ui.selectable_label(current == i, name).clicked() {
                    state.select_dimension(i);
                }
            }
        });

    // ---- Metadata column picker ----
    if let Some((columns, current_column)) = metadata_columns {
        ui.strong("Group by");
        egui::ComboBox::from_id_salt("metadata_column")
            .selected_text(&current_column)
            .show_ui(ui, |ui: &mut Ui| {
                for col in &columns {
                    if ui.selectable_label(current_column == *col, col).clicked() {
                        state.select_metadata_column(col);
                    }
                }
            });
    }
    ui.separator();

    legend(ui, state);
}

/// Group names with their colour and member count.
fn legend(ui: &mut Ui, state: &AppState) {
    let Some(document) = state.session.document() else {
        return;
    };

    let colors = group_colors(document);
    let groups = document.group_values();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (slot, name) in document.group_names().into_iter().enumerate() {
                let count = groups.get(slot).map_or(0, Vec::len);
                let mut text = RichText::new(format!("{name}  ({count})"));
                if let Some(&c) = colors.get(slot) {
                    text = text.color(to_color32(c));
                }
                if state.hovered_group.as_deref() == Some(name) {
                    text = text.strong();
                }
                ui.label(text);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open points…").clicked() {
                open_file_dialog(state, DataType::Points);
                ui.close_menu();
            }
            if ui.button("Open clusters…").clicked() {
                open_file_dialog(state, DataType::Clusters);
                ui.close_menu();
            }
            if ui.button("Open metadata…").clicked() {
                open_file_dialog(state, DataType::Metadata);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(doc) = state.session.document() {
            ui.label(format!("{}: {} values", doc.title, doc.len()));
        }

        if let Some(group) = &state.hovered_group {
            ui.separator();
            ui.label(format!("Partition: {group}"));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, kind: DataType) {
    let dialog = rfd::FileDialog::new().set_title(format!("Open {kind} data"));
    let dialog = match kind {
        DataType::Clusters => dialog.add_filter("JSON", &["json"]),
        DataType::Points | DataType::Metadata => dialog
            .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
            .add_filter("Parquet", &["parquet", "pq"])
            .add_filter("JSON", &["json"])
            .add_filter("CSV", &["csv"]),
    };

    if let Some(path) = dialog.pick_file() {
        state.open_file(&path, kind);
    }
}
