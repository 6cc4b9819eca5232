use blockgrid::geometry::ResizeHandle;
use blockgrid::model::{Block, BlockId, Rect, Rgba};
use blockgrid::session::Mode;
use eframe::egui;

use super::interaction::handle_rect;

const SELECTION_COLOR: egui::Color32 = egui::Color32::from_rgb(90, 160, 255);
const STYLE_TARGET_COLOR: egui::Color32 = egui::Color32::from_rgb(230, 120, 40);

fn to_color32(c: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.alpha_u8())
}

fn to_screen(origin: egui::Pos2, rect: Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        origin + egui::vec2(rect.x, rect.y),
        egui::vec2(rect.width, rect.height),
    )
}

/// Canvas background with a line every grid quantum.
pub(super) fn draw_grid(painter: &egui::Painter, rect: egui::Rect, quantum: f32) {
    painter.rect_filled(rect, 0.0, egui::Color32::WHITE);
    let stroke = egui::Stroke::new(1.0, egui::Color32::from_gray(225));
    // Sub-pixel spacing would paint a solid fill.
    if quantum >= 4.0 {
        let mut x = rect.min.x;
        while x <= rect.max.x {
            painter.line_segment([egui::pos2(x, rect.min.y), egui::pos2(x, rect.max.y)], stroke);
            x += quantum;
        }
        let mut y = rect.min.y;
        while y <= rect.max.y {
            painter.line_segment([egui::pos2(rect.min.x, y), egui::pos2(rect.max.x, y)], stroke);
            y += quantum;
        }
    }
    painter.rect_stroke(
        rect,
        0.0,
        egui::Stroke::new(1.0, egui::Color32::from_gray(160)),
        egui::StrokeKind::Middle,
    );
}

pub(super) fn draw_blocks(
    painter: &egui::Painter,
    origin: egui::Pos2,
    roots: &[Block],
    selected: Option<BlockId>,
    mode: Mode,
) {
    for block in roots {
        draw_block(painter, origin, block, selected, mode);
    }
}

fn draw_block(
    painter: &egui::Painter,
    origin: egui::Pos2,
    block: &Block,
    selected: Option<BlockId>,
    mode: Mode,
) {
    let r = to_screen(origin, block.rect);
    painter.rect_filled(r, 0.0, to_color32(block.color));

    let is_selected = selected == Some(block.id);
    let stroke = match (is_selected, mode) {
        (true, Mode::Style) => egui::Stroke::new(2.0, STYLE_TARGET_COLOR),
        (true, _) => egui::Stroke::new(2.0, SELECTION_COLOR),
        (false, _) => egui::Stroke::new(1.0, to_color32(Rgba { a: 1.0, ..block.color })),
    };
    painter.rect_stroke(r, 0.0, stroke, egui::StrokeKind::Inside);

    let text_color = egui::Color32::from_gray(40);
    painter.text(
        r.min + egui::vec2(4.0, 2.0),
        egui::Align2::LEFT_TOP,
        &block.name,
        egui::FontId::proportional(11.0),
        text_color,
    );
    painter.text(
        r.max - egui::vec2(4.0, 2.0),
        egui::Align2::RIGHT_BOTTOM,
        format!("{}x{}", block.rect.width, block.rect.height),
        egui::FontId::monospace(10.0),
        text_color,
    );

    // Children are stored relative to this block.
    for child in &block.children {
        draw_block(painter, r.min, child, selected, mode);
    }
}

pub(super) fn draw_resize_handles(painter: &egui::Painter, origin: egui::Pos2, abs: Rect) {
    let stroke = egui::Stroke::new(1.0, SELECTION_COLOR);
    for handle in ResizeHandle::CORNERS {
        let r = handle_rect(origin, handle.anchor(abs));
        painter.rect_filled(r, 1.0, egui::Color32::WHITE);
        painter.rect_stroke(r, 1.0, stroke, egui::StrokeKind::Middle);
    }
}

pub(super) fn draw_preview(painter: &egui::Painter, origin: egui::Pos2, preview: Rect, fill: Rgba) {
    let r = to_screen(origin, preview);
    painter.rect_filled(r, 0.0, to_color32(Rgba { a: 0.25, ..fill }));
    painter.rect_stroke(
        r,
        0.0,
        egui::Stroke::new(1.0, to_color32(Rgba { a: 1.0, ..fill })),
        egui::StrokeKind::Middle,
    );
    if preview.is_valid() {
        painter.text(
            r.max + egui::vec2(4.0, 4.0),
            egui::Align2::LEFT_TOP,
            format!("{}x{}", preview.width, preview.height),
            egui::FontId::monospace(10.0),
            egui::Color32::from_gray(80),
        );
    }
}
