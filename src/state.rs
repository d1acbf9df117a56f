use std::path::Path;

use dimension_plot::data::loader::load_file;
use dimension_plot::session::{BindOutcome, GroupingBinding, LatestDocument, PlotSession};
use dimension_plot::DataType;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Dataset bindings and the last built document.
    pub session: PlotSession<LatestDocument>,

    /// Column holding the shared key when loading points or metadata.
    pub key_column: String,

    /// Name of the group under the pointer, if any.
    pub hovered_group: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            session: PlotSession::new(LatestDocument::default()),
            key_column: key_column.into(),
            hovered_group: None,
            status_message: None,
        }
    }

    /// Load a file as the given kind of dataset and bind it.
    pub fn open_file(&mut self, path: &Path, kind: DataType) {
        match load_file(path, kind, &self.key_column) {
            Ok(dataset) => {
                log::info!("Loaded {kind} dataset '{}' from {}", dataset.name(), path.display());
                let name = dataset.name().to_string();
                self.status_message = match self.session.bind(dataset) {
                    BindOutcome::Rebuilt => None,
                    BindOutcome::Pending => Some(pending_hint(&self.session)),
                    BindOutcome::AlreadyBound => Some(format!("'{name}' is already loaded")),
                };
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Select the plotted dimension.
    pub fn select_dimension(&mut self, index: usize) {
        if self.session.set_dimension(index) {
            self.status_message = None;
        }
    }

    /// Select the metadata column used as categories.
    pub fn select_metadata_column(&mut self, column: &str) {
        if self.session.set_metadata_column(column) {
            self.status_message = None;
        } else if self.session.primary().is_some() {
            self.status_message = Some(format!("Cannot group by '{column}'"));
        }
    }

    /// Record the group under the pointer, reporting changes.
    pub fn hover_group(&mut self, group: Option<String>) {
        if group != self.hovered_group {
            if let Some(name) = &group {
                log::debug!("Hovered partition: {name}");
            }
            self.hovered_group = group;
        }
    }
}

/// What is still missing before a document can be built.
fn pending_hint(session: &PlotSession<LatestDocument>) -> String {
    match (session.primary(), session.grouping()) {
        (None, _) => "Load points to plot".to_string(),
        (Some(_), None) => "Load clusters or metadata to group the points".to_string(),
        (Some(_), Some(GroupingBinding::Metadata { column: None, .. })) => {
            "Pick a metadata column".to_string()
        }
        (Some(_), Some(_)) => "Grouping could not be applied, see log".to_string(),
    }
}
