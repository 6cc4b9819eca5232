use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Axis-aligned rectangle in the coordinate space of the owning block's parent.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(self) -> f32 {
        self.y + self.height
    }

    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn contains(self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_css(self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }

    pub fn alpha_u8(self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

/// The markup element a block stands for.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Span,
    #[default]
    Div,
    Flex,
    Block,
}

impl BlockType {
    pub const ALL: [BlockType; 4] = [
        BlockType::Span,
        BlockType::Div,
        BlockType::Flex,
        BlockType::Block,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Span => "span",
            BlockType::Div => "div",
            BlockType::Flex => "flex",
            BlockType::Block => "block",
        }
    }

    /// CSS `display` value a block of this type gets unless overridden.
    pub fn default_display(self) -> &'static str {
        match self {
            BlockType::Span => "inline",
            BlockType::Div => "block",
            BlockType::Flex => "flex",
            BlockType::Block => "block",
        }
    }

    pub fn color(self) -> Rgba {
        match self {
            BlockType::Span => Rgba::new(255, 99, 71, 0.5),
            BlockType::Div => Rgba::new(173, 216, 230, 0.5),
            BlockType::Flex => Rgba::new(144, 238, 144, 0.5),
            BlockType::Block => Rgba::new(255, 228, 181, 0.5),
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown block type `{s}`"))
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block-{}", self.0)
    }
}

pub type StyleOverrides = BTreeMap<String, String>;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub name: String,
    pub color: Rgba,
    pub rect: Rect,
    #[serde(default)]
    pub style_overrides: StyleOverrides,
    #[serde(default)]
    pub raw_override_text: Option<String>,
    #[serde(default)]
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(id: BlockId, kind: BlockType, name: String, rect: Rect) -> Self {
        Self {
            id,
            kind,
            name,
            color: kind.color(),
            rect,
            style_overrides: StyleOverrides::new(),
            raw_override_text: None,
            children: Vec::new(),
        }
    }

    /// Pre-order walk over this block and all of its descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Block)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
