//! Linear undo/redo over full-tree snapshots.
//!
//! The undo stack always ends with the snapshot of the live tree. A commit
//! appends to it and drops the redo stack; undo moves the top entry over to
//! the redo stack and hands back a fresh copy of the entry below it.

use crate::model::Block;
use std::sync::Arc;

/// Immutable capture of every root block at one point in time.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    roots: Arc<[Block]>,
}

impl Snapshot {
    pub fn capture(roots: &[Block]) -> Self {
        Self {
            roots: Arc::from(roots),
        }
    }

    pub fn roots(&self) -> &[Block] {
        &self.roots
    }

    /// Fresh, unshared blocks rebuilt from this snapshot.
    pub fn restore(&self) -> Vec<Block> {
        self.roots.to_vec()
    }
}

#[derive(Clone, Debug, Default)]
pub struct History {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// History that forgets its oldest entries past `limit` (at least one is kept).
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit: limit.map(|l| l.max(1)),
            ..Self::default()
        }
    }

    pub fn commit(&mut self, roots: &[Block]) {
        self.undo.push(Snapshot::capture(roots));
        self.redo.clear();
        if let Some(limit) = self.limit {
            if self.undo.len() > limit {
                let overflow = self.undo.len() - limit;
                self.undo.drain(0..overflow);
            }
        }
        log::debug!("history commit: {} undo entries", self.undo.len());
    }

    pub fn undo(&mut self) -> Option<Vec<Block>> {
        if self.undo.len() < 2 {
            return None;
        }
        let top = self.undo.pop()?;
        self.redo.push(top);
        log::debug!(
            "undo: {} undo / {} redo entries",
            self.undo.len(),
            self.redo.len()
        );
        self.undo.last().map(Snapshot::restore)
    }

    pub fn redo(&mut self) -> Option<Vec<Block>> {
        let next = self.redo.pop()?;
        let roots = next.restore();
        self.undo.push(next);
        log::debug!(
            "redo: {} undo / {} redo entries",
            self.undo.len(),
            self.redo.len()
        );
        Some(roots)
    }

    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Snapshot matching the live tree, if anything was ever committed.
    pub fn current(&self) -> Option<&Snapshot> {
        self.undo.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockId, BlockType, Rect};

    fn roots(n: u64) -> Vec<Block> {
        (1..=n)
            .map(|i| {
                Block::new(
                    BlockId(i),
                    BlockType::Div,
                    format!("b{i}-div"),
                    Rect::new(i as f32 * 10.0, 0.0, 10.0, 10.0),
                )
            })
            .collect()
    }

    #[test]
    fn undo_needs_two_entries() {
        let mut h = History::new();
        assert!(h.undo().is_none());
        h.commit(&roots(0));
        assert!(h.undo().is_none());
        assert!(!h.can_undo());
        assert_eq!(h.undo_len(), 1);
    }

    #[test]
    fn undo_then_redo_walks_the_timeline() {
        let mut h = History::new();
        h.commit(&roots(0));
        h.commit(&roots(1));
        h.commit(&roots(2));

        assert_eq!(h.undo(), Some(roots(1)));
        assert_eq!(h.undo(), Some(roots(0)));
        assert_eq!(h.undo(), None);
        assert_eq!(h.redo_len(), 2);

        assert_eq!(h.redo(), Some(roots(1)));
        assert_eq!(h.redo(), Some(roots(2)));
        assert_eq!(h.redo(), None);
        assert_eq!(h.current().map(Snapshot::roots), Some(roots(2).as_slice()));
    }

    #[test]
    fn commit_discards_redo_branch() {
        let mut h = History::new();
        h.commit(&roots(0));
        h.commit(&roots(1));
        h.undo();
        assert!(h.can_redo());
        h.commit(&roots(3));
        assert!(!h.can_redo());
        assert!(h.redo().is_none());
        assert_eq!(h.undo(), Some(roots(0)));
    }

    #[test]
    fn restored_trees_do_not_alias_snapshots() {
        let mut h = History::new();
        h.commit(&roots(1));
        h.commit(&roots(2));
        let mut restored = h.undo().unwrap();
        restored[0].rect.x = 999.0;
        restored[0].children.push(roots(1).remove(0));
        let again = h.redo().and_then(|_| h.undo()).unwrap();
        assert_eq!(again, roots(1));
    }

    #[test]
    fn limit_drops_oldest_entries() {
        let mut h = History::with_limit(Some(2));
        for n in 0..5 {
            h.commit(&roots(n));
        }
        assert_eq!(h.undo_len(), 2);
        assert_eq!(h.undo(), Some(roots(3)));
        assert!(h.undo().is_none());
    }
}
