use crate::error::{LayoutError, Result};
use crate::model::Rect;
use std::fmt;
use std::str::FromStr;

/// Rounds `value` to the nearest multiple of `quantum`, halves rounding up.
pub fn snap(value: f32, quantum: f32) -> Result<f32> {
    Ok(Grid::new(quantum)?.snap(value))
}

/// Normalizes a two-corner drag into a rect. Zero-area results are the caller's to reject.
pub fn rect_from_drag(x1: f32, y1: f32, x2: f32, y2: f32) -> Rect {
    Rect {
        x: x1.min(x2),
        y: y1.min(y2),
        width: (x2 - x1).abs(),
        height: (y2 - y1).abs(),
    }
}

/// Translates `rect` by already-snapped deltas.
pub fn apply_move(rect: Rect, dx: f32, dy: f32) -> Rect {
    rect.translated(dx, dy)
}

/// Drags the edges named by `handle` by already-snapped deltas.
///
/// Width and height never go below `min_size`. A north or west edge moves by
/// the delta until the clamp engages and then stays put, so it never
/// overshoots the opposite edge. A zero delta never moves the origin, even
/// when the rect is already smaller than `min_size`.
pub fn apply_resize(rect: Rect, handle: ResizeHandle, dx: f32, dy: f32, min_size: f32) -> Rect {
    let mut out = rect;
    if handle.east() {
        out.width = (rect.width + dx).max(min_size);
    }
    if handle.west() {
        let shift = dx.min((rect.width - min_size).max(0.0));
        out.x = rect.x + shift;
        out.width = (rect.width - shift).max(min_size);
    }
    if handle.south() {
        out.height = (rect.height + dy).max(min_size);
    }
    if handle.north() {
        let shift = dy.min((rect.height - min_size).max(0.0));
        out.y = rect.y + shift;
        out.height = (rect.height - shift).max(min_size);
    }
    out.width = out.width.max(min_size);
    out.height = out.height.max(min_size);
    out
}

pub const DEFAULT_QUANTUM: f32 = 20.0;

/// A validated grid quantum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    quantum: f32,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            quantum: DEFAULT_QUANTUM,
        }
    }
}

impl Grid {
    pub fn new(quantum: f32) -> Result<Self> {
        if !quantum.is_finite() || quantum <= 0.0 {
            return Err(LayoutError::InvalidConfiguration { quantum });
        }
        Ok(Self { quantum })
    }

    pub fn quantum(self) -> f32 {
        self.quantum
    }

    pub fn snap(self, value: f32) -> f32 {
        (value / self.quantum + 0.5).floor() * self.quantum
    }

    pub fn move_rect(self, rect: Rect, raw_dx: f32, raw_dy: f32) -> Rect {
        apply_move(rect, self.snap(raw_dx), self.snap(raw_dy))
    }

    pub fn resize_rect(self, rect: Rect, handle: ResizeHandle, raw_dx: f32, raw_dy: f32) -> Rect {
        apply_resize(
            rect,
            handle,
            self.snap(raw_dx),
            self.snap(raw_dy),
            self.quantum,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    NW,
    N,
    NE,
    W,
    E,
    SW,
    S,
    SE,
}

impl ResizeHandle {
    /// Handles drawn on a selected block.
    pub const CORNERS: [ResizeHandle; 4] = [
        ResizeHandle::NW,
        ResizeHandle::NE,
        ResizeHandle::SW,
        ResizeHandle::SE,
    ];

    pub fn north(self) -> bool {
        matches!(self, ResizeHandle::N | ResizeHandle::NE | ResizeHandle::NW)
    }

    pub fn south(self) -> bool {
        matches!(self, ResizeHandle::S | ResizeHandle::SE | ResizeHandle::SW)
    }

    pub fn east(self) -> bool {
        matches!(self, ResizeHandle::E | ResizeHandle::NE | ResizeHandle::SE)
    }

    pub fn west(self) -> bool {
        matches!(self, ResizeHandle::W | ResizeHandle::NW | ResizeHandle::SW)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResizeHandle::NW => "nw",
            ResizeHandle::N => "n",
            ResizeHandle::NE => "ne",
            ResizeHandle::W => "w",
            ResizeHandle::E => "e",
            ResizeHandle::SW => "sw",
            ResizeHandle::S => "s",
            ResizeHandle::SE => "se",
        }
    }

    /// Position of the handle on `rect`, as a point on its outline.
    pub fn anchor(self, rect: Rect) -> (f32, f32) {
        let x = if self.west() {
            rect.x
        } else if self.east() {
            rect.right()
        } else {
            rect.x + rect.width * 0.5
        };
        let y = if self.north() {
            rect.y
        } else if self.south() {
            rect.bottom()
        } else {
            rect.y + rect.height * 0.5
        };
        (x, y)
    }
}

impl fmt::Display for ResizeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizeHandle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let north = s.contains('n');
        let south = s.contains('s');
        let east = s.contains('e');
        let west = s.contains('w');
        let known = s.chars().all(|c| matches!(c, 'n' | 's' | 'e' | 'w'));
        let handle = match (north, south, east, west) {
            _ if !known => None,
            (true, false, false, false) => Some(ResizeHandle::N),
            (false, true, false, false) => Some(ResizeHandle::S),
            (false, false, true, false) => Some(ResizeHandle::E),
            (false, false, false, true) => Some(ResizeHandle::W),
            (true, false, true, false) => Some(ResizeHandle::NE),
            (true, false, false, true) => Some(ResizeHandle::NW),
            (false, true, true, false) => Some(ResizeHandle::SE),
            (false, true, false, true) => Some(ResizeHandle::SW),
            _ => None,
        };
        handle.ok_or_else(|| format!("invalid resize direction `{s}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_rounds_to_nearest_multiple() {
        assert_eq!(snap(23.0, 10.0).unwrap(), 20.0);
        assert_eq!(snap(25.0, 10.0).unwrap(), 30.0);
        assert_eq!(snap(7.0, 10.0).unwrap(), 10.0);
        assert_eq!(snap(-4.0, 10.0).unwrap(), 0.0);
        assert_eq!(snap(-16.0, 10.0).unwrap(), -20.0);
    }

    #[test]
    fn snap_rejects_non_positive_quantum() {
        assert!(matches!(
            snap(5.0, 0.0),
            Err(LayoutError::InvalidConfiguration { .. })
        ));
        assert!(snap(5.0, -10.0).is_err());
        assert!(snap(5.0, f32::NAN).is_err());
    }

    #[test]
    fn drag_normalizes_any_corner_order() {
        let r = rect_from_drag(110.0, 160.0, 10.0, 10.0);
        assert_eq!(r, Rect::new(10.0, 10.0, 100.0, 150.0));
        assert!(!rect_from_drag(10.0, 10.0, 10.0, 50.0).is_valid());
    }

    #[test]
    fn move_keeps_size() {
        let grid = Grid::new(10.0).unwrap();
        let r = grid.move_rect(Rect::new(10.0, 10.0, 40.0, 30.0), 14.0, -6.0);
        assert_eq!(r, Rect::new(20.0, 0.0, 40.0, 30.0));
    }

    #[test]
    fn resize_southeast_grows_from_fixed_origin() {
        let grid = Grid::new(10.0).unwrap();
        let r = grid.resize_rect(
            Rect::new(10.0, 10.0, 100.0, 150.0),
            ResizeHandle::SE,
            23.0,
            7.0,
        );
        assert_eq!(r, Rect::new(10.0, 10.0, 120.0, 160.0));
    }

    #[test]
    fn resize_northwest_shifts_origin() {
        let r = apply_resize(
            Rect::new(50.0, 50.0, 100.0, 100.0),
            ResizeHandle::NW,
            20.0,
            -10.0,
            10.0,
        );
        assert_eq!(r, Rect::new(70.0, 40.0, 80.0, 110.0));
    }

    #[test]
    fn resize_clamp_freezes_dragged_edge() {
        let r = apply_resize(
            Rect::new(50.0, 50.0, 40.0, 40.0),
            ResizeHandle::W,
            100.0,
            0.0,
            10.0,
        );
        assert_eq!(r, Rect::new(80.0, 50.0, 10.0, 40.0));

        let r = apply_resize(
            Rect::new(50.0, 50.0, 40.0, 40.0),
            ResizeHandle::SE,
            -100.0,
            -100.0,
            10.0,
        );
        assert_eq!(r, Rect::new(50.0, 50.0, 10.0, 10.0));
    }

    #[test]
    fn resize_clamp_freezes_north_edge() {
        let r = apply_resize(
            Rect::new(50.0, 50.0, 40.0, 40.0),
            ResizeHandle::N,
            0.0,
            100.0,
            10.0,
        );
        assert_eq!(r, Rect::new(50.0, 80.0, 40.0, 10.0));
    }

    #[test]
    fn undersized_rect_keeps_origin_without_delta() {
        let r = apply_resize(
            Rect::new(50.0, 50.0, 10.0, 10.0),
            ResizeHandle::NW,
            0.0,
            0.0,
            20.0,
        );
        assert_eq!(r, Rect::new(50.0, 50.0, 20.0, 20.0));

        // Growing outward still moves the edge by the full delta.
        let r = apply_resize(
            Rect::new(50.0, 50.0, 10.0, 10.0),
            ResizeHandle::NW,
            -20.0,
            -40.0,
            20.0,
        );
        assert_eq!(r, Rect::new(30.0, 10.0, 30.0, 50.0));
    }

    #[test]
    fn handle_parses_from_edge_letters() {
        assert_eq!("se".parse::<ResizeHandle>(), Ok(ResizeHandle::SE));
        assert_eq!("WN".parse::<ResizeHandle>(), Ok(ResizeHandle::NW));
        assert_eq!("e".parse::<ResizeHandle>(), Ok(ResizeHandle::E));
        assert!("ns".parse::<ResizeHandle>().is_err());
        assert!("nx".parse::<ResizeHandle>().is_err());
        assert!("".parse::<ResizeHandle>().is_err());
    }
}
