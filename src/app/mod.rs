use blockgrid::geometry::Grid;
use blockgrid::model::BlockId;
use blockgrid::session::EditorSession;
use blockgrid::settings::{self, EditorSettings};
use blockgrid::store::LayoutStore;
use blockgrid::tree::LayoutTree;
use eframe::egui;
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

mod actions;
mod interaction;
mod render;
mod update;

/// Pointer gesture the canvas is currently feeding into the session.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
    Draw { last: egui::Pos2 },
    Move { press: egui::Pos2 },
    Resize { press: egui::Pos2 },
}

/// Confirmation or prompt shown over the canvas.
#[derive(Clone, Debug, PartialEq)]
enum Pending {
    Clear,
    SaveAs { name: String },
    Load { index: usize },
    Delete { name: String },
}

pub struct BlockGridApp {
    session: EditorSession,
    settings: EditorSettings,
    settings_path: PathBuf,
    store: Option<LayoutStore>,
    layout_filter: String,
    gesture: Option<Gesture>,
    pending: Option<Pending>,
    export_cache: String,
    export_dirty: Rc<Cell<bool>>,
    grid_size_input: f32,
    status: Option<String>,
}

impl BlockGridApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let (mut settings, settings_path) = settings::load_or_default();
        let grid = Grid::new(settings.grid_size).unwrap_or_else(|e| {
            log::warn!("{e}; using the default grid");
            Grid::default()
        });
        settings.grid_size = grid.quantum();
        let session = EditorSession::with_grid(&settings, grid, LayoutTree::new());
        let (store, status) = match LayoutStore::open(&settings.layouts_path) {
            Ok(store) => (Some(store), None),
            Err(e) => {
                log::warn!("saved layouts unavailable: {e}");
                (None, Some(format!("Saved layouts unavailable: {e}")))
            }
        };

        let export_dirty = Rc::new(Cell::new(true));
        let mut app = Self {
            session,
            grid_size_input: settings.grid_size,
            settings,
            settings_path,
            store,
            layout_filter: String::new(),
            gesture: None,
            pending: None,
            export_cache: String::new(),
            export_dirty: Rc::clone(&export_dirty),
            status,
        };
        app.session.subscribe(move |_: &LayoutTree| export_dirty.set(true));
        app
    }

    fn canvas_point(origin: egui::Pos2, screen: egui::Pos2) -> (f32, f32) {
        let v = screen - origin;
        (v.x, v.y)
    }

    fn selected_name(&self) -> Option<String> {
        let id: BlockId = self.session.selected()?;
        self.session.tree().find_by_id(id).map(|b| b.name.clone())
    }

    fn refresh_export(&mut self) {
        if !self.export_dirty.get() && !self.session.is_interacting() {
            return;
        }
        match self.session.export_json() {
            Ok(json) => self.export_cache = json,
            Err(e) => self.status = Some(format!("Export failed: {e}")),
        }
        self.export_dirty.set(false);
    }
}
