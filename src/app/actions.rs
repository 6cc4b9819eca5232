use blockgrid::settings;

use super::BlockGridApp;

impl BlockGridApp {
    pub(super) fn undo(&mut self) {
        if !self.session.undo() {
            self.status = Some("Nothing to undo".to_string());
        } else {
            self.status = None;
        }
    }

    pub(super) fn redo(&mut self) {
        if !self.session.redo() {
            self.status = Some("Nothing to redo".to_string());
        } else {
            self.status = None;
        }
    }

    pub(super) fn clear_all(&mut self) {
        self.session.clear_all();
        self.status = Some("Canvas cleared".to_string());
    }

    pub(super) fn apply_style(&mut self) {
        let Some(name) = self.selected_name() else {
            self.status = Some("Select a block to style".to_string());
            return;
        };
        if self.session.apply_style_buffer() {
            self.status = Some(format!("Applied styles to {name}"));
        } else {
            self.status = Some(format!("No `#{name}` rule found; styles unchanged"));
        }
    }

    /// Validates the grid field before handing it to the session.
    pub(super) fn apply_grid_size(&mut self) {
        match self.session.set_grid_size(self.grid_size_input) {
            Ok(()) => {
                self.settings.grid_size = self.grid_size_input;
                self.persist_settings();
            }
            Err(e) => {
                self.status = Some(format!("{e}"));
                self.grid_size_input = self.session.grid().quantum();
            }
        }
    }

    pub(super) fn apply_canvas_width(&mut self) {
        self.settings.canvas_width = settings::clamp_canvas_width(self.settings.canvas_width);
        self.session.set_canvas_width(self.settings.canvas_width);
        self.persist_settings();
    }

    pub(super) fn persist_settings(&mut self) {
        self.settings.default_block_type = self.session.block_type();
        if let Err(e) = settings::save_settings(&self.settings_path, &self.settings) {
            log::warn!("settings not saved: {e}");
            self.status = Some(format!("Settings save failed: {e}"));
        }
    }

    pub(super) fn save_layout(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            self.status = Some("Layout name cannot be empty".to_string());
            return;
        }
        let Some(store) = &mut self.store else {
            self.status = Some("Saved layouts are unavailable".to_string());
            return;
        };
        match store.save_layout(name, self.session.tree().roots()) {
            Ok(()) => self.status = Some(format!("Saved layout {name}")),
            Err(e) => self.status = Some(format!("Save failed: {e}")),
        }
    }

    pub(super) fn load_layout(&mut self, index: usize) {
        let Some(saved) = self.store.as_ref().and_then(|s| s.get(index)) else {
            self.status = Some("Layout no longer exists".to_string());
            return;
        };
        let label = saved.label();
        let data = saved.data.clone();
        self.session.load_tree(data);
        self.status = Some(format!("Loaded {label}"));
    }

    pub(super) fn delete_layout(&mut self, name: &str) {
        let Some(store) = &mut self.store else {
            return;
        };
        match store.remove(name) {
            Ok(0) => self.status = Some(format!("No layout named {name}")),
            Ok(n) => self.status = Some(format!("Deleted {n} layout(s) named {name}")),
            Err(e) => self.status = Some(format!("Delete failed: {e}")),
        }
    }

    pub(super) fn export_to_path(&mut self) {
        let path = self.settings.export_path.clone();
        match self.session.export().write_to(&path) {
            Ok(()) => self.status = Some(format!("Exported {path}")),
            Err(e) => self.status = Some(format!("Export failed: {e}")),
        }
    }

    pub(super) fn export_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(&self.settings.export_path)
            .add_filter("JSON", &["json"])
            .save_file()
        {
            let path_str = path.display().to_string();
            match self.session.export().write_to(&path) {
                Ok(()) => {
                    self.settings.export_path = path_str.clone();
                    self.persist_settings();
                    self.status = Some(format!("Exported {path_str}"));
                }
                Err(e) => self.status = Some(format!("Export failed: {e}")),
            }
        }
    }

    pub(super) fn copy_export(&mut self, ctx: &eframe::egui::Context) {
        self.refresh_export();
        ctx.copy_text(self.export_cache.clone());
        self.status = Some("Copied JSON to clipboard".to_string());
    }
}
