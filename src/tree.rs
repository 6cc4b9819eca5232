//! The live block tree: lookup, insertion and in-place mutation.
//!
//! Rects are stored relative to the parent block's origin. Moving a parent
//! never rewrites its children; they follow it by composition.

use crate::error::{LayoutError, Result};
use crate::model::{Block, BlockId, BlockType, Rect, StyleOverrides};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

const TOKEN_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const TOKEN_LEN: usize = 2;
const NAME_ATTEMPTS: usize = 64;

#[derive(Clone, Debug)]
pub struct LayoutTree {
    roots: Vec<Block>,
    next_id: u64,
    rng: StdRng,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    pub fn new() -> Self {
        Self {
            roots: Vec::new(),
            next_id: 1,
            rng: StdRng::from_entropy(),
        }
    }

    /// Tree with a reproducible name generator.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new()
        }
    }

    pub fn roots(&self) -> &[Block] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of blocks at every depth.
    pub fn len(&self) -> usize {
        self.iter().len()
    }

    /// All blocks in pre-order: each root, then its subtree.
    pub fn iter(&self) -> std::vec::IntoIter<&Block> {
        let mut out = Vec::new();
        for root in &self.roots {
            root.walk(&mut |b| out.push(b));
        }
        out.into_iter()
    }

    /// Swaps in a whole new set of roots. Identifiers handed out later stay
    /// above every identifier seen so far.
    pub fn replace_roots(&mut self, roots: Vec<Block>) {
        self.roots = roots;
        let max_id = self.iter().map(|b| b.id.0).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id + 1);
    }

    pub fn clear(&mut self) {
        self.roots.clear();
    }

    pub fn find_by_id(&self, id: BlockId) -> Option<&Block> {
        find_in(&self.roots, id)
    }

    pub fn find_by_id_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        find_in_mut(&mut self.roots, id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Chain of blocks from a root down to `id`, inclusive.
    pub fn path_to(&self, id: BlockId) -> Option<Vec<&Block>> {
        let mut path = Vec::new();
        path_in(&self.roots, id, &mut path).then_some(path)
    }

    /// The block's rect in canvas coordinates.
    pub fn absolute_rect(&self, id: BlockId) -> Option<Rect> {
        let path = self.path_to(id)?;
        let (dx, dy) = path[..path.len() - 1]
            .iter()
            .fold((0.0, 0.0), |(x, y), b| (x + b.rect.x, y + b.rect.y));
        path.last().map(|b| b.rect.translated(dx, dy))
    }

    /// Deepest, front-most block under a canvas point.
    pub fn block_at(&self, x: f32, y: f32) -> Option<BlockId> {
        hit_in(&self.roots, x, y)
    }

    /// Creates a block and appends it as a new root, or as the last child of
    /// `parent`. With a parent, `rect` must already be in the parent's local
    /// coordinates.
    pub fn create_block(
        &mut self,
        rect: Rect,
        kind: BlockType,
        parent: Option<BlockId>,
    ) -> Result<BlockId> {
        let parent_name = match parent {
            Some(pid) => Some(
                self.find_by_id(pid)
                    .ok_or(LayoutError::NotFound { id: pid })?
                    .name
                    .clone(),
            ),
            None => None,
        };
        let name = self.unique_name(kind, parent_name.as_deref());
        let id = BlockId(self.next_id);
        self.next_id += 1;
        let block = Block::new(id, kind, name, rect);
        log::debug!("created {} `{}` at {:?}", id, block.name, rect);
        match parent {
            Some(pid) => {
                let parent = self
                    .find_by_id_mut(pid)
                    .ok_or(LayoutError::NotFound { id: pid })?;
                parent.children.push(block);
            }
            None => self.roots.push(block),
        }
        Ok(id)
    }

    pub fn update_rect(&mut self, id: BlockId, rect: Rect) -> Result<()> {
        let block = self
            .find_by_id_mut(id)
            .ok_or(LayoutError::NotFound { id })?;
        block.rect = rect;
        Ok(())
    }

    pub fn set_style_overrides(
        &mut self,
        id: BlockId,
        overrides: StyleOverrides,
        raw_text: Option<String>,
    ) -> Result<()> {
        let block = self
            .find_by_id_mut(id)
            .ok_or(LayoutError::NotFound { id })?;
        block.style_overrides = overrides;
        block.raw_override_text = raw_text;
        Ok(())
    }

    fn unique_name(&mut self, kind: BlockType, parent_name: Option<&str>) -> String {
        let taken: HashSet<String> = self.iter().map(|b| b.name.clone()).collect();
        let mut len = TOKEN_LEN;
        loop {
            for _ in 0..NAME_ATTEMPTS {
                let token: String = (0..len)
                    .map(|_| TOKEN_CHARS[self.rng.gen_range(0..TOKEN_CHARS.len())] as char)
                    .collect();
                let name = match parent_name {
                    Some(parent) => format!("{parent}.{token}-{kind}"),
                    None => format!("{token}-{kind}"),
                };
                if !taken.contains(&name) {
                    return name;
                }
            }
            len += 1;
        }
    }
}

fn find_in(blocks: &[Block], id: BlockId) -> Option<&Block> {
    blocks.iter().find_map(|b| {
        if b.id == id {
            Some(b)
        } else {
            find_in(&b.children, id)
        }
    })
}

fn find_in_mut(blocks: &mut [Block], id: BlockId) -> Option<&mut Block> {
    blocks.iter_mut().find_map(|b| {
        if b.id == id {
            Some(b)
        } else {
            find_in_mut(&mut b.children, id)
        }
    })
}

fn path_in<'a>(blocks: &'a [Block], id: BlockId, path: &mut Vec<&'a Block>) -> bool {
    for b in blocks {
        path.push(b);
        if b.id == id || path_in(&b.children, id, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn hit_in(blocks: &[Block], x: f32, y: f32) -> Option<BlockId> {
    for b in blocks.iter().rev() {
        if b.rect.contains(x, y) {
            return hit_in(&b.children, x - b.rect.x, y - b.rect.y).or(Some(b.id));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (LayoutTree, BlockId, BlockId, BlockId) {
        let mut tree = LayoutTree::with_seed(7);
        let a = tree
            .create_block(Rect::new(10.0, 10.0, 200.0, 200.0), BlockType::Div, None)
            .unwrap();
        let b = tree
            .create_block(Rect::new(20.0, 30.0, 50.0, 50.0), BlockType::Flex, Some(a))
            .unwrap();
        let c = tree
            .create_block(Rect::new(300.0, 0.0, 40.0, 40.0), BlockType::Span, None)
            .unwrap();
        (tree, a, b, c)
    }

    #[test]
    fn create_assigns_unique_ids_and_type_color() {
        let (tree, a, b, c) = sample();
        assert_ne!(a, b);
        assert_ne!(b, c);
        let block = tree.find_by_id(b).unwrap();
        assert_eq!(block.kind, BlockType::Flex);
        assert_eq!(block.color, BlockType::Flex.color());
        assert!(block.style_overrides.is_empty());
        assert!(block.children.is_empty());
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.roots().len(), 2);
    }

    #[test]
    fn nested_names_carry_parent_path() {
        let (tree, a, b, _) = sample();
        let parent = tree.find_by_id(a).unwrap();
        let child = tree.find_by_id(b).unwrap();
        assert!(parent.name.ends_with("-div"));
        assert!(child.name.starts_with(&format!("{}.", parent.name)));
        assert!(child.name.ends_with("-flex"));
    }

    #[test]
    fn names_stay_unique_under_collisions() {
        let mut tree = LayoutTree::with_seed(1);
        for _ in 0..1500 {
            tree.create_block(Rect::new(0.0, 0.0, 10.0, 10.0), BlockType::Span, None)
                .unwrap();
        }
        let names: HashSet<&str> = tree.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names.len(), 1500);
    }

    #[test]
    fn lookup_is_preorder_and_misses_softly() {
        let (tree, a, b, c) = sample();
        let order: Vec<BlockId> = tree.iter().map(|b| b.id).collect();
        assert_eq!(order, vec![a, b, c]);
        assert!(tree.find_by_id(BlockId(999)).is_none());
    }

    #[test]
    fn unknown_parent_is_not_found() {
        let mut tree = LayoutTree::new();
        let err = tree
            .create_block(Rect::new(0.0, 0.0, 10.0, 10.0), BlockType::Div, Some(BlockId(5)))
            .unwrap_err();
        assert!(matches!(err, LayoutError::NotFound { id } if id == BlockId(5)));
        assert!(tree.is_empty());
    }

    #[test]
    fn moving_parent_leaves_child_rects_alone() {
        let (mut tree, a, b, _) = sample();
        tree.update_rect(a, Rect::new(50.0, 60.0, 200.0, 200.0)).unwrap();
        assert_eq!(tree.find_by_id(b).unwrap().rect, Rect::new(20.0, 30.0, 50.0, 50.0));
        assert_eq!(
            tree.absolute_rect(b),
            Some(Rect::new(70.0, 90.0, 50.0, 50.0))
        );
    }

    #[test]
    fn hit_test_prefers_deepest_block() {
        let (tree, a, b, c) = sample();
        assert_eq!(tree.block_at(35.0, 45.0), Some(b));
        assert_eq!(tree.block_at(150.0, 150.0), Some(a));
        assert_eq!(tree.block_at(310.0, 10.0), Some(c));
        assert_eq!(tree.block_at(5.0, 5.0), None);
        let path: Vec<BlockId> = tree.path_to(b).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(path, vec![a, b]);
    }

    #[test]
    fn style_overrides_replace_wholesale() {
        let (mut tree, a, _, _) = sample();
        let mut first = StyleOverrides::new();
        first.insert("color".into(), "red".into());
        first.insert("margin".into(), "4px".into());
        tree.set_style_overrides(a, first, Some("#x { color: red; margin: 4px }".into()))
            .unwrap();
        let mut second = StyleOverrides::new();
        second.insert("color".into(), "blue".into());
        tree.set_style_overrides(a, second.clone(), None).unwrap();
        let block = tree.find_by_id(a).unwrap();
        assert_eq!(block.style_overrides, second);
        assert!(block.raw_override_text.is_none());
        assert!(tree
            .set_style_overrides(BlockId(42), StyleOverrides::new(), None)
            .is_err());
    }

    #[test]
    fn replacing_roots_never_reuses_ids() {
        let (mut tree, _, _, c) = sample();
        tree.clear();
        assert!(tree.is_empty());
        tree.replace_roots(Vec::new());
        let d = tree
            .create_block(Rect::new(0.0, 0.0, 10.0, 10.0), BlockType::Div, None)
            .unwrap();
        assert!(d.0 > c.0);

        let loaded = vec![Block::new(BlockId(100), BlockType::Div, "zz-div".into(), Rect::default())];
        tree.replace_roots(loaded);
        let e = tree
            .create_block(Rect::new(0.0, 0.0, 10.0, 10.0), BlockType::Div, None)
            .unwrap();
        assert_eq!(e, BlockId(101));
    }
}
