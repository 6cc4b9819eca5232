use blockgrid::geometry::ResizeHandle;
use blockgrid::session::Mode;
use eframe::egui;

use super::{BlockGridApp, Gesture};

const HANDLE_SIZE: f32 = 10.0;

pub(super) fn handle_rect(origin: egui::Pos2, (x, y): (f32, f32)) -> egui::Rect {
    egui::Rect::from_center_size(origin + egui::vec2(x, y), egui::vec2(HANDLE_SIZE, HANDLE_SIZE))
}

impl BlockGridApp {
    /// Corner handles of the selected block. Returns true while one of them owns the pointer.
    pub(super) fn interact_resize_handles(&mut self, ui: &egui::Ui, origin: egui::Pos2) -> bool {
        if self.session.mode() != Mode::Arrange {
            return false;
        }
        let Some(id) = self.session.selected() else {
            return false;
        };
        let Some(abs) = self.session.tree().absolute_rect(id) else {
            return false;
        };

        let mut owned = false;
        for handle in ResizeHandle::CORNERS {
            let r = handle_rect(origin, handle.anchor(abs));
            let response = ui.interact(
                r,
                ui.id().with(("resize_handle", id.0, handle.as_str())),
                egui::Sense::drag(),
            );
            if response.hovered() || response.dragged() {
                ui.ctx().set_cursor_icon(cursor_for(handle));
            }
            if response.drag_started() {
                let press = response.interact_pointer_pos().unwrap_or(r.center());
                if self.session.begin_resize(id, handle) {
                    self.gesture = Some(Gesture::Resize { press });
                }
            }
            if response.dragged() {
                if let (Some(Gesture::Resize { press }), Some(pos)) =
                    (self.gesture, response.interact_pointer_pos())
                {
                    let delta = pos - press;
                    self.session.update_resize(delta.x, delta.y);
                }
                owned = true;
            }
            if response.drag_stopped() {
                self.finish_gesture(origin, response.interact_pointer_pos());
                owned = true;
            }
        }
        owned
    }

    /// Pointer handling for the canvas body: drawing, moving and selection.
    pub(super) fn interact_canvas(
        &mut self,
        ctx: &egui::Context,
        response: &egui::Response,
        origin: egui::Pos2,
    ) {
        if response.drag_started() {
            let press = ctx
                .input(|i| i.pointer.press_origin())
                .or(response.interact_pointer_pos());
            if let Some(press) = press {
                self.start_gesture(ctx, origin, press);
            }
        }

        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                match &mut self.gesture {
                    Some(Gesture::Draw { last }) => {
                        *last = pos;
                        let (x, y) = Self::canvas_point(origin, pos);
                        self.session.update_drag(x, y);
                    }
                    Some(Gesture::Move { press }) => {
                        let delta = pos - *press;
                        self.session.update_move(delta.x, delta.y);
                    }
                    Some(Gesture::Resize { .. }) | None => {}
                }
            }
        }

        if response.drag_stopped() {
            self.finish_gesture(origin, response.interact_pointer_pos());
        }

        if response.clicked() && self.session.mode() != Mode::Draw {
            let hit = response.interact_pointer_pos().and_then(|pos| {
                let (x, y) = Self::canvas_point(origin, pos);
                self.session.tree().block_at(x, y)
            });
            match hit {
                Some(id) => {
                    self.session.select_block(id);
                }
                None => self.session.deselect_all(),
            }
        }
    }

    fn start_gesture(&mut self, ctx: &egui::Context, origin: egui::Pos2, press: egui::Pos2) {
        let (x, y) = Self::canvas_point(origin, press);
        let draw_nested = ctx.input(|i| i.modifiers.shift);
        match self.session.mode() {
            Mode::Draw => {
                self.session.begin_drag(x, y);
                self.gesture = Some(Gesture::Draw { last: press });
            }
            Mode::Arrange => match self.session.tree().block_at(x, y) {
                Some(id) if !draw_nested => {
                    if self.session.begin_move(id) {
                        self.gesture = Some(Gesture::Move { press });
                    }
                }
                _ => {
                    self.session.begin_drag(x, y);
                    self.gesture = Some(Gesture::Draw { last: press });
                }
            },
            Mode::Style => {}
        }
    }

    fn finish_gesture(&mut self, origin: egui::Pos2, pos: Option<egui::Pos2>) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        let pos = match (pos, gesture) {
            (Some(pos), _) => pos,
            (None, Gesture::Draw { last }) => last,
            (None, Gesture::Move { press } | Gesture::Resize { press }) => press,
        };
        let (x, y) = Self::canvas_point(origin, pos);
        self.session.pointer_released(x, y);
    }
}

fn cursor_for(handle: ResizeHandle) -> egui::CursorIcon {
    match handle {
        ResizeHandle::NW | ResizeHandle::SE => egui::CursorIcon::ResizeNwSe,
        ResizeHandle::NE | ResizeHandle::SW => egui::CursorIcon::ResizeNeSw,
        ResizeHandle::N | ResizeHandle::S => egui::CursorIcon::ResizeVertical,
        ResizeHandle::W | ResizeHandle::E => egui::CursorIcon::ResizeHorizontal,
    }
}
