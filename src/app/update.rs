use blockgrid::model::BlockType;
use blockgrid::session::Mode;
use blockgrid::settings::{MAX_CANVAS_WIDTH, MIN_CANVAS_WIDTH};
use eframe::egui;

use super::render::{draw_blocks, draw_grid, draw_preview, draw_resize_handles};
use super::{BlockGridApp, Pending};

fn mode_button(ui: &mut egui::Ui, label: &str, mode: Mode, current: Mode) -> bool {
    ui.selectable_label(current == mode, label).clicked()
}

impl eframe::App for BlockGridApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let wants_keyboard = ctx.wants_keyboard_input();
        let (undo, redo, escape) = ctx.input_mut(|i| {
            if wants_keyboard || self.pending.is_some() {
                return (false, false, false);
            }
            let redo = i.consume_key(
                egui::Modifiers::COMMAND | egui::Modifiers::SHIFT,
                egui::Key::Z,
            ) || i.consume_key(egui::Modifiers::COMMAND, egui::Key::Y);
            let undo = !redo && i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z);
            let escape = i.consume_key(egui::Modifiers::NONE, egui::Key::Escape);
            (undo, redo, escape)
        });
        if undo {
            self.undo();
        }
        if redo {
            self.redo();
        }
        if escape {
            self.session.deselect_all();
        }

        self.top_bar(ctx);
        self.side_panel(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(status) = &self.status {
                    ui.label(status);
                } else {
                    ui.label("Ready");
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let history = self.session.history();
                    ui.label(format!(
                        "History: {} / {}",
                        history.undo_len(),
                        history.undo_len() + history.redo_len()
                    ));
                    ui.separator();
                    ui.label(format!("Blocks: {}", self.session.tree().len()));
                    ui.separator();
                    let (w, h) = self.session.canvas_size();
                    ui.label(format!("Canvas: {w}x{h}"));
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().id_salt("canvas_scroll").show(ui, |ui| {
                let (w, h) = self.session.canvas_size();
                let (rect, response) =
                    ui.allocate_exact_size(egui::vec2(w, h), egui::Sense::click_and_drag());
                let origin = rect.min;

                let handle_owned = self.interact_resize_handles(ui, origin);
                if !handle_owned {
                    self.interact_canvas(ctx, &response, origin);
                }

                let painter = ui.painter_at(rect);
                draw_grid(&painter, rect, self.session.grid().quantum());
                draw_blocks(
                    &painter,
                    origin,
                    self.session.tree().roots(),
                    self.session.selected(),
                    self.session.mode(),
                );
                if let Some(preview) = self.session.drag_preview() {
                    draw_preview(&painter, origin, preview, self.session.block_type().color());
                }
                if self.session.mode() == Mode::Arrange {
                    if let Some(abs) = self
                        .session
                        .selected()
                        .and_then(|id| self.session.tree().absolute_rect(id))
                    {
                        draw_resize_handles(ui.painter(), origin, abs);
                    }
                }
            });
        });

        self.pending_window(ctx);
    }
}

impl BlockGridApp {
    fn top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                let mode = self.session.mode();
                if mode_button(ui, "Draw", Mode::Draw, mode) {
                    self.session.set_mode(Mode::Draw);
                }
                if mode_button(ui, "Arrange", Mode::Arrange, mode) {
                    self.session.toggle_mode(Mode::Arrange);
                }
                if mode_button(ui, "Style", Mode::Style, mode) {
                    self.session.toggle_mode(Mode::Style);
                }
                ui.separator();

                let mut kind = self.session.block_type();
                egui::ComboBox::from_id_salt("block_type")
                    .selected_text(kind.as_str())
                    .show_ui(ui, |ui| {
                        for k in BlockType::ALL {
                            ui.selectable_value(&mut kind, k, k.as_str());
                        }
                    });
                if kind != self.session.block_type() {
                    self.session.set_block_type(kind);
                    self.persist_settings();
                }

                ui.label("Grid");
                let grid = ui.add(
                    egui::DragValue::new(&mut self.grid_size_input)
                        .range(1.0..=200.0)
                        .speed(1.0),
                );
                if grid.drag_stopped() || grid.lost_focus() {
                    self.apply_grid_size();
                }

                ui.label("Width");
                let width = ui.add(
                    egui::DragValue::new(&mut self.settings.canvas_width)
                        .range(MIN_CANVAS_WIDTH..=MAX_CANVAS_WIDTH)
                        .speed(10.0),
                );
                if width.changed() {
                    self.apply_canvas_width();
                }
                ui.separator();

                let history = self.session.history();
                let (can_undo, can_redo) = (history.can_undo(), history.can_redo());
                if ui
                    .add_enabled(can_undo, egui::Button::new("Undo (⌘Z)"))
                    .clicked()
                {
                    self.undo();
                }
                if ui
                    .add_enabled(can_redo, egui::Button::new("Redo (⌘⇧Z)"))
                    .clicked()
                {
                    self.redo();
                }
                if ui
                    .add_enabled(!self.session.tree().is_empty(), egui::Button::new("Clear"))
                    .clicked()
                {
                    self.pending = Some(Pending::Clear);
                }
                ui.separator();
                if ui.button("Save layout…").clicked() {
                    self.pending = Some(Pending::SaveAs {
                        name: String::new(),
                    });
                }
                if ui.button("Export…").clicked() {
                    self.export_dialog();
                }
                if ui
                    .button("Quick export")
                    .on_hover_text(&self.settings.export_path)
                    .clicked()
                {
                    self.export_to_path();
                }
            });
        });
    }

    fn side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("right_panel")
            .resizable(true)
            .min_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("side_scroll")
                    .show(ui, |ui| {
                        self.style_section(ui);
                        ui.separator();
                        self.export_section(ui, ctx);
                        ui.separator();
                        self.layouts_section(ui);
                    });
            });
    }

    fn style_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Styles");
        if self.session.mode() != Mode::Style {
            ui.small("Switch to Style mode and click a block to edit its CSS.");
            return;
        }
        let Some(name) = self.selected_name() else {
            ui.small("Click a block to edit its CSS.");
            return;
        };
        ui.label(format!("#{name}"));
        ui.add(
            egui::TextEdit::multiline(self.session.style_buffer_mut())
                .code_editor()
                .desired_rows(8)
                .desired_width(f32::INFINITY),
        );
        if ui.button("Apply").clicked() {
            self.apply_style();
        }
    }

    fn export_section(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            ui.heading("JSON");
            if ui.small_button("Copy").clicked() {
                self.copy_export(ctx);
            }
        });
        self.refresh_export();
        egui::ScrollArea::vertical()
            .id_salt("json_scroll")
            .max_height(260.0)
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut self.export_cache.as_str())
                        .code_editor()
                        .desired_width(f32::INFINITY),
                );
            });
    }

    fn layouts_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Saved layouts");
        let Some(store) = &self.store else {
            ui.small("Unavailable");
            return;
        };
        ui.add(egui::TextEdit::singleline(&mut self.layout_filter).hint_text("Filter"));
        let hits = store.filter(&self.layout_filter);
        if hits.is_empty() {
            ui.small("No saved layouts");
        }
        let mut request = None;
        egui::Grid::new("layouts_table")
            .num_columns(3)
            .striped(true)
            .show(ui, |ui| {
                for index in hits {
                    let Some(saved) = store.get(index) else {
                        continue;
                    };
                    ui.label(saved.label());
                    if ui.small_button("Load").clicked() {
                        request = Some(Pending::Load { index });
                    }
                    if ui.small_button("Delete").clicked() {
                        request = Some(Pending::Delete {
                            name: saved.name.clone(),
                        });
                    }
                    ui.end_row();
                }
            });
        if request.is_some() {
            self.pending = request;
        }
    }

    fn pending_window(&mut self, ctx: &egui::Context) {
        let Some(pending) = self.pending.clone() else {
            return;
        };
        let title = match &pending {
            Pending::Clear => "Clear canvas",
            Pending::SaveAs { .. } => "Save layout",
            Pending::Load { .. } => "Load layout",
            Pending::Delete { .. } => "Delete layout",
        };
        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                match &mut self.pending {
                    Some(Pending::Clear) => {
                        ui.label("Remove every block? Undo can bring them back.");
                    }
                    Some(Pending::SaveAs { name }) => {
                        ui.label("Layout name");
                        let response = ui.text_edit_singleline(name);
                        response.request_focus();
                        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                            confirmed = true;
                        }
                    }
                    Some(Pending::Load { .. }) => {
                        ui.label("Replace the current canvas with this layout?");
                    }
                    Some(Pending::Delete { name }) => {
                        ui.label(format!("Delete every layout named \"{name}\"?"));
                    }
                    None => {}
                }
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        confirmed = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });
        if cancelled || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.pending = None;
            return;
        }
        if !confirmed {
            return;
        }
        match self.pending.take() {
            Some(Pending::Clear) => self.clear_all(),
            Some(Pending::SaveAs { name }) => self.save_layout(&name),
            Some(Pending::Load { index }) => self.load_layout(index),
            Some(Pending::Delete { name }) => self.delete_layout(&name),
            None => {}
        }
    }
}
