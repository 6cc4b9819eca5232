//! Editing session: the live tree plus everything the interaction layer
//! needs to drive it (mode, selection, grid, in-flight pointer gesture).

use crate::error::Result;
use crate::export::{self, Document};
use crate::geometry::{Grid, ResizeHandle, rect_from_drag};
use crate::history::History;
use crate::model::{Block, BlockId, BlockType, Rect};
use crate::settings::{self, EditorSettings};
use crate::style;
use crate::tree::LayoutTree;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    /// Dragging on the canvas draws new root blocks.
    #[default]
    Draw,
    /// Blocks can be selected, moved and resized; drawing nests inside the selection.
    Arrange,
    /// A selected block's CSS overrides are edited.
    Style,
}

#[derive(Clone, Debug, PartialEq)]
enum Interaction {
    Draw {
        start: (f32, f32),
        current: (f32, f32),
        parent: Option<BlockId>,
    },
    Move {
        id: BlockId,
        start_rect: Rect,
    },
    Resize {
        id: BlockId,
        handle: ResizeHandle,
        start_rect: Rect,
    },
}

/// Receives the live tree after every committed change, undo and redo.
pub trait TreeObserver {
    fn tree_changed(&mut self, tree: &LayoutTree);
}

impl<F: FnMut(&LayoutTree)> TreeObserver for F {
    fn tree_changed(&mut self, tree: &LayoutTree) {
        (self)(tree)
    }
}

pub struct EditorSession {
    tree: LayoutTree,
    history: History,
    grid: Grid,
    canvas_width: f32,
    block_type: BlockType,
    mode: Mode,
    selected: Option<BlockId>,
    interaction: Option<Interaction>,
    style_buffer: String,
    observers: Vec<Box<dyn TreeObserver>>,
}

impl EditorSession {
    pub fn new(settings: &EditorSettings) -> Result<Self> {
        Self::with_tree(settings, LayoutTree::new())
    }

    /// Session over an existing tree, which becomes the first history entry.
    pub fn with_tree(settings: &EditorSettings, tree: LayoutTree) -> Result<Self> {
        let grid = Grid::new(settings.grid_size)?;
        Ok(Self::with_grid(settings, grid, tree))
    }

    /// Like [`EditorSession::with_tree`], with the grid already validated;
    /// `settings.grid_size` is ignored.
    pub fn with_grid(settings: &EditorSettings, grid: Grid, tree: LayoutTree) -> Self {
        let mut session = Self {
            tree,
            history: History::with_limit(settings.history_limit),
            grid,
            canvas_width: settings::clamp_canvas_width(settings.canvas_width),
            block_type: settings.default_block_type,
            mode: Mode::Draw,
            selected: None,
            interaction: None,
            style_buffer: String::new(),
            observers: Vec::new(),
        };
        session.history.commit(session.tree.roots());
        session
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selected(&self) -> Option<BlockId> {
        self.selected
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn set_block_type(&mut self, kind: BlockType) {
        self.block_type = kind;
    }

    pub fn canvas_size(&self) -> (f32, f32) {
        (self.canvas_width, self.canvas_width * settings::CANVAS_ASPECT)
    }

    pub fn set_canvas_width(&mut self, width: f32) {
        self.canvas_width = settings::clamp_canvas_width(width);
    }

    /// Changes the grid quantum. A rejected value leaves the session untouched.
    pub fn set_grid_size(&mut self, quantum: f32) -> Result<()> {
        match Grid::new(quantum) {
            Ok(grid) => {
                self.grid = grid;
                Ok(())
            }
            Err(e) => {
                log::warn!("{e}");
                Err(e)
            }
        }
    }

    pub fn subscribe(&mut self, observer: impl TreeObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self) {
        for observer in &mut self.observers {
            observer.tree_changed(&self.tree);
        }
    }

    fn commit(&mut self) {
        self.history.commit(self.tree.roots());
        self.notify();
    }

    // Modes and selection.

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.interaction = None;
        self.deselect_all();
    }

    /// Enters `mode`, or falls back to drawing if it is already active.
    pub fn toggle_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            self.set_mode(Mode::Draw);
        } else {
            self.set_mode(mode);
        }
    }

    pub fn select_block(&mut self, id: BlockId) -> bool {
        if self.mode == Mode::Draw {
            log::debug!("ignoring selection of {id} while drawing");
            return false;
        }
        if !self.tree.contains(id) {
            log::warn!("cannot select {id}: not in the tree");
            return false;
        }
        self.selected = Some(id);
        if self.mode == Mode::Style {
            self.style_buffer = self.style_editor_text(id).unwrap_or_default();
        }
        true
    }

    pub fn deselect_all(&mut self) {
        self.selected = None;
        self.style_buffer.clear();
    }

    // Drawing new blocks.

    fn canvas_point(&self, x: f32, y: f32) -> (f32, f32) {
        let (w, h) = self.canvas_size();
        (
            self.grid.snap(x).clamp(0.0, w),
            self.grid.snap(y).clamp(0.0, h),
        )
    }

    pub fn begin_drag(&mut self, x: f32, y: f32) {
        if self.interaction.is_some() || self.mode == Mode::Style {
            return;
        }
        let parent = match self.mode {
            Mode::Arrange => self.selected,
            _ => None,
        };
        let start = self.canvas_point(x, y);
        self.interaction = Some(Interaction::Draw {
            start,
            current: start,
            parent,
        });
    }

    pub fn update_drag(&mut self, x: f32, y: f32) {
        let point = self.canvas_point(x, y);
        if let Some(Interaction::Draw { current, .. }) = &mut self.interaction {
            *current = point;
        }
    }

    /// Finishes a draw gesture. Zero-area drags create nothing.
    pub fn end_drag(&mut self, x: f32, y: f32) -> Option<BlockId> {
        if !matches!(self.interaction, Some(Interaction::Draw { .. })) {
            return None;
        }
        self.update_drag(x, y);
        let Some(Interaction::Draw {
            start,
            current,
            parent,
        }) = self.interaction.take()
        else {
            return None;
        };
        let rect = rect_from_drag(start.0, start.1, current.0, current.1);
        if !rect.is_valid() {
            log::debug!("ignoring zero-area drag at {start:?}");
            return None;
        }
        let local = match parent {
            Some(pid) => {
                let Some(origin) = self.tree.absolute_rect(pid) else {
                    log::warn!("parent {pid} vanished before the drag ended");
                    return None;
                };
                rect.translated(-origin.x, -origin.y)
            }
            None => rect,
        };
        match self.tree.create_block(local, self.block_type, parent) {
            Ok(id) => {
                self.commit();
                Some(id)
            }
            Err(e) => {
                log::warn!("block not created: {e}");
                None
            }
        }
    }

    /// Canvas-space rect of the block being drawn.
    pub fn drag_preview(&self) -> Option<Rect> {
        match &self.interaction {
            Some(Interaction::Draw { start, current, .. }) => {
                Some(rect_from_drag(start.0, start.1, current.0, current.1))
            }
            _ => None,
        }
    }

    // Moving and resizing. Deltas are raw pointer offsets since the gesture began.

    fn begin_transform(&mut self, id: BlockId, handle: Option<ResizeHandle>) -> bool {
        if self.mode != Mode::Arrange || self.interaction.is_some() {
            return false;
        }
        let Some(start_rect) = self.tree.find_by_id(id).map(|b| b.rect) else {
            log::warn!("cannot transform {id}: not in the tree");
            return false;
        };
        self.selected = Some(id);
        self.interaction = Some(match handle {
            Some(handle) => Interaction::Resize {
                id,
                handle,
                start_rect,
            },
            None => Interaction::Move { id, start_rect },
        });
        true
    }

    pub fn begin_move(&mut self, id: BlockId) -> bool {
        self.begin_transform(id, None)
    }

    pub fn begin_resize(&mut self, id: BlockId, handle: ResizeHandle) -> bool {
        self.begin_transform(id, Some(handle))
    }

    pub fn update_move(&mut self, dx: f32, dy: f32) {
        if let Some(Interaction::Move { id, start_rect }) = self.interaction {
            let rect = self.grid.move_rect(start_rect, dx, dy);
            self.apply_transform(id, rect);
        }
    }

    pub fn update_resize(&mut self, dx: f32, dy: f32) {
        if let Some(Interaction::Resize {
            id,
            handle,
            start_rect,
        }) = self.interaction
        {
            let rect = self.grid.resize_rect(start_rect, handle, dx, dy);
            self.apply_transform(id, rect);
        }
    }

    fn apply_transform(&mut self, id: BlockId, rect: Rect) {
        if let Err(e) = self.tree.update_rect(id, rect) {
            log::warn!("dropping transform: {e}");
            self.interaction = None;
        }
    }

    pub fn end_move(&mut self) {
        if matches!(self.interaction, Some(Interaction::Move { .. })) {
            self.interaction = None;
            self.commit();
        }
    }

    pub fn end_resize(&mut self) {
        if matches!(self.interaction, Some(Interaction::Resize { .. })) {
            self.interaction = None;
            self.commit();
        }
    }

    /// Ends whatever pointer gesture is in flight.
    pub fn pointer_released(&mut self, x: f32, y: f32) {
        match self.interaction {
            Some(Interaction::Draw { .. }) => {
                self.end_drag(x, y);
            }
            Some(Interaction::Move { .. }) => self.end_move(),
            Some(Interaction::Resize { .. }) => self.end_resize(),
            None => {}
        }
    }

    pub fn is_interacting(&self) -> bool {
        self.interaction.is_some()
    }

    // Styling.

    /// Prior override text of a block, or the default seed for it.
    pub fn style_editor_text(&self, id: BlockId) -> Option<String> {
        let block = self.tree.find_by_id(id)?;
        Some(
            block
                .raw_override_text
                .clone()
                .unwrap_or_else(|| style::default_seed_text(&block.name, block.kind)),
        )
    }

    pub fn style_buffer(&self) -> &str {
        &self.style_buffer
    }

    pub fn style_buffer_mut(&mut self) -> &mut String {
        &mut self.style_buffer
    }

    /// Replaces a block's overrides with the rule for it in `raw_text`.
    /// Text without such a rule changes nothing.
    pub fn apply_style_text(&mut self, id: BlockId, raw_text: &str) -> bool {
        let Some(name) = self.tree.find_by_id(id).map(|b| b.name.clone()) else {
            log::warn!("cannot style {id}: not in the tree");
            return false;
        };
        let Some(body) = style::find_rule_body(raw_text, &name).filter(|b| !b.trim().is_empty())
        else {
            log::warn!("style text has no non-empty `#{name}` rule; overrides unchanged");
            return false;
        };
        let overrides = style::parse_declarations(body);
        if let Err(e) = self
            .tree
            .set_style_overrides(id, overrides, Some(raw_text.to_string()))
        {
            log::warn!("{e}");
            return false;
        }
        self.commit();
        true
    }

    /// Applies the editor buffer to the block selected for styling.
    pub fn apply_style_buffer(&mut self) -> bool {
        match (self.mode, self.selected) {
            (Mode::Style, Some(id)) => {
                let text = self.style_buffer.clone();
                self.apply_style_text(id, &text)
            }
            _ => false,
        }
    }

    // Whole-tree replacement.

    pub fn clear_all(&mut self) {
        self.interaction = None;
        self.deselect_all();
        self.tree.clear();
        self.commit();
    }

    pub fn load_tree(&mut self, roots: Vec<Block>) {
        self.interaction = None;
        self.deselect_all();
        self.tree.replace_roots(roots);
        self.commit();
    }

    fn restore(&mut self, roots: Vec<Block>) {
        self.interaction = None;
        self.deselect_all();
        self.tree.replace_roots(roots);
        self.notify();
    }

    pub fn undo(&mut self) -> bool {
        if self.interaction.is_some() {
            return false;
        }
        match self.history.undo() {
            Some(roots) => {
                self.restore(roots);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.interaction.is_some() {
            return false;
        }
        match self.history.redo() {
            Some(roots) => {
                self.restore(roots);
                true
            }
            None => false,
        }
    }

    pub fn export(&self) -> Document {
        export::serialize(self.tree.roots())
    }

    pub fn export_json(&self) -> Result<String> {
        self.export().to_json_pretty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn session() -> EditorSession {
        let settings = EditorSettings {
            grid_size: 10.0,
            canvas_width: 600.0,
            ..EditorSettings::default()
        };
        EditorSession::with_tree(&settings, LayoutTree::with_seed(3)).unwrap()
    }

    fn draw(s: &mut EditorSession, x1: f32, y1: f32, x2: f32, y2: f32) -> Option<BlockId> {
        s.begin_drag(x1, y1);
        s.update_drag((x1 + x2) / 2.0, (y1 + y2) / 2.0);
        s.end_drag(x2, y2)
    }

    #[test]
    fn rejects_bad_grid() {
        let settings = EditorSettings {
            grid_size: 0.0,
            ..EditorSettings::default()
        };
        assert!(EditorSession::new(&settings).is_err());
        let mut s = session();
        assert!(s.set_grid_size(-1.0).is_err());
        assert_eq!(s.grid().quantum(), 10.0);
        s.set_grid_size(25.0).unwrap();
        assert_eq!(s.grid().quantum(), 25.0);
    }

    #[test]
    fn drawing_snaps_and_commits_once() {
        let mut s = session();
        let id = draw(&mut s, 12.0, 9.0, 108.0, 163.0).unwrap();
        let block = s.tree().find_by_id(id).unwrap();
        assert_eq!(block.rect, Rect::new(10.0, 10.0, 100.0, 150.0));
        assert_eq!(block.kind, BlockType::Div);
        assert_eq!(s.history().undo_len(), 2);
    }

    #[test]
    fn zero_area_drag_is_a_no_op() {
        let mut s = session();
        assert!(draw(&mut s, 10.0, 10.0, 10.0, 90.0).is_none());
        assert!(draw(&mut s, 10.0, 10.0, 13.0, 90.0).is_none());
        assert!(s.tree().is_empty());
        assert_eq!(s.history().undo_len(), 1);
    }

    #[test]
    fn drag_is_clamped_to_canvas() {
        let mut s = session();
        s.set_canvas_width(300.0);
        let id = draw(&mut s, -40.0, -40.0, 5000.0, 5000.0).unwrap();
        assert_eq!(
            s.tree().find_by_id(id).unwrap().rect,
            Rect::new(0.0, 0.0, 300.0, 450.0)
        );
    }

    #[test]
    fn drawing_in_arrange_mode_nests_in_selection() {
        let mut s = session();
        let parent = draw(&mut s, 100.0, 100.0, 300.0, 300.0).unwrap();
        s.set_mode(Mode::Arrange);
        assert!(s.select_block(parent));
        let child = draw(&mut s, 120.0, 140.0, 160.0, 180.0).unwrap();

        let p = s.tree().find_by_id(parent).unwrap();
        assert_eq!(p.children.len(), 1);
        assert_eq!(p.children[0].id, child);
        assert_eq!(p.children[0].rect, Rect::new(20.0, 40.0, 40.0, 40.0));
        assert!(p.children[0].name.starts_with(&format!("{}.", p.name)));
        assert_eq!(s.tree().absolute_rect(child), Some(Rect::new(120.0, 140.0, 40.0, 40.0)));
    }

    #[test]
    fn move_coalesces_into_one_commit() {
        let mut s = session();
        let id = draw(&mut s, 10.0, 10.0, 50.0, 50.0).unwrap();
        s.set_mode(Mode::Arrange);
        assert!(s.begin_move(id));
        assert_eq!(s.selected(), Some(id));
        s.update_move(3.0, 4.0);
        s.update_move(14.0, 26.0);
        s.update_move(31.0, 19.0);
        assert_eq!(s.history().undo_len(), 2);
        s.end_move();
        assert_eq!(s.history().undo_len(), 3);
        assert_eq!(s.tree().find_by_id(id).unwrap().rect, Rect::new(40.0, 30.0, 40.0, 40.0));

        assert!(s.undo());
        assert_eq!(s.tree().find_by_id(id).unwrap().rect, Rect::new(10.0, 10.0, 40.0, 40.0));
    }

    #[test]
    fn transforms_require_arrange_mode() {
        let mut s = session();
        let id = draw(&mut s, 10.0, 10.0, 50.0, 50.0).unwrap();
        assert!(!s.begin_move(id));
        assert!(!s.select_block(id));
        s.set_mode(Mode::Arrange);
        assert!(!s.begin_resize(BlockId(999), ResizeHandle::SE));
        assert!(!s.is_interacting());
    }

    #[test]
    fn resize_uses_rect_from_gesture_start() {
        let mut s = session();
        let id = draw(&mut s, 10.0, 10.0, 110.0, 160.0).unwrap();
        s.set_mode(Mode::Arrange);
        assert!(s.begin_resize(id, ResizeHandle::SE));
        s.update_resize(50.0, 50.0);
        s.update_resize(23.0, 7.0);
        s.pointer_released(0.0, 0.0);
        assert_eq!(
            s.tree().find_by_id(id).unwrap().rect,
            Rect::new(10.0, 10.0, 120.0, 160.0)
        );
        assert!(!s.is_interacting());
    }

    #[test]
    fn switching_modes_clears_selection() {
        let mut s = session();
        let id = draw(&mut s, 10.0, 10.0, 50.0, 50.0).unwrap();
        s.set_mode(Mode::Style);
        assert!(s.select_block(id));
        assert!(s.style_buffer().contains("display: block;"));
        s.set_mode(Mode::Arrange);
        assert_eq!(s.selected(), None);
        assert!(s.style_buffer().is_empty());
        s.toggle_mode(Mode::Arrange);
        assert_eq!(s.mode(), Mode::Draw);
    }

    #[test]
    fn style_apply_replaces_overrides_and_commits() {
        let mut s = session();
        let id = draw(&mut s, 10.0, 10.0, 50.0, 50.0).unwrap();
        let name = s.tree().find_by_id(id).unwrap().name.clone();
        s.set_mode(Mode::Style);
        assert!(s.select_block(id));
        *s.style_buffer_mut() = format!("#{name} {{ display: flex; color: red; }}");
        assert!(s.apply_style_buffer());

        let text = format!("#{name} {{ color: blue }}");
        assert!(s.apply_style_text(id, &text));
        let block = s.tree().find_by_id(id).unwrap();
        assert_eq!(block.style_overrides.len(), 1);
        assert_eq!(block.style_overrides["color"], "blue");
        assert_eq!(s.style_editor_text(id).as_deref(), Some(text.as_str()));

        let commits = s.history().undo_len();
        assert!(!s.apply_style_text(id, "#someone-else { color: green }"));
        assert_eq!(s.history().undo_len(), commits);
        assert_eq!(s.tree().find_by_id(id).unwrap().style_overrides["color"], "blue");
        assert!(!s.apply_style_text(BlockId(77), &text));
    }

    #[test]
    fn empty_rule_body_leaves_overrides_alone() {
        let mut s = session();
        let id = draw(&mut s, 10.0, 10.0, 50.0, 50.0).unwrap();
        let name = s.tree().find_by_id(id).unwrap().name.clone();
        assert!(s.apply_style_text(id, &format!("#{name} {{ color: red }}")));
        let commits = s.history().undo_len();

        assert!(!s.apply_style_text(id, &format!("#{name} {{  \n }}")));
        assert_eq!(s.history().undo_len(), commits);
        assert_eq!(s.tree().find_by_id(id).unwrap().style_overrides["color"], "red");
    }

    #[test]
    fn raised_grid_does_not_shift_undersized_block() {
        let mut s = session();
        let id = draw(&mut s, 50.0, 50.0, 60.0, 60.0).unwrap();
        s.set_grid_size(20.0).unwrap();
        s.set_mode(Mode::Arrange);
        assert!(s.begin_resize(id, ResizeHandle::NW));
        s.update_resize(0.0, 0.0);
        s.end_resize();
        assert_eq!(
            s.tree().find_by_id(id).unwrap().rect,
            Rect::new(50.0, 50.0, 20.0, 20.0)
        );
    }

    #[test]
    fn undo_redo_drop_selection_and_notify() {
        let mut s = session();
        let seen = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&seen);
        s.subscribe(move |_: &LayoutTree| counter.set(counter.get() + 1));

        let id = draw(&mut s, 10.0, 10.0, 50.0, 50.0).unwrap();
        s.set_mode(Mode::Arrange);
        s.select_block(id);
        assert!(s.undo());
        assert_eq!(s.selected(), None);
        assert!(s.tree().is_empty());
        assert!(s.redo());
        assert!(s.tree().contains(id));
        assert!(!s.redo());
        s.clear_all();
        assert!(s.tree().is_empty());
        assert_eq!(seen.get(), 4);
    }

    #[test]
    fn load_tree_commits_and_keeps_ids_fresh() {
        let mut s = session();
        let loaded = vec![Block::new(BlockId(40), BlockType::Span, "xy-span".into(), Rect::new(0.0, 0.0, 20.0, 20.0))];
        s.load_tree(loaded.clone());
        assert_eq!(s.tree().roots(), loaded.as_slice());
        let id = draw(&mut s, 100.0, 100.0, 150.0, 150.0).unwrap();
        assert_eq!(id, BlockId(41));
        assert!(s.undo());
        assert_eq!(s.tree().roots(), loaded.as_slice());
    }
}
