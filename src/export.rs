//! Styling-oriented export of the block tree.

use crate::error::Result;
use crate::model::{Block, BlockType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub elements: Vec<ExportedElement>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExportedElement {
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub id: String,
    pub name: String,
    pub styles: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ExportedElement>>,
}

pub fn serialize(roots: &[Block]) -> Document {
    Document {
        elements: roots.iter().map(export_block).collect(),
    }
}

/// Rounds to thousandths so float noise from fractional grids stays out of the CSS.
fn px(v: f32) -> Value {
    let v = (v * 1000.0).round() / 1000.0 + 0.0;
    Value::String(format!("{v}px"))
}

fn export_block(block: &Block) -> ExportedElement {
    let mut styles = Map::new();
    styles.insert("position".into(), Value::String("absolute".into()));
    styles.insert("left".into(), px(block.rect.x));
    styles.insert("top".into(), px(block.rect.y));
    styles.insert("width".into(), px(block.rect.width));
    styles.insert("height".into(), px(block.rect.height));
    styles.insert(
        "backgroundColor".into(),
        Value::String(block.color.to_css()),
    );
    styles.insert(
        "display".into(),
        Value::String(block.kind.default_display().into()),
    );
    for (property, value) in &block.style_overrides {
        styles.insert(property.clone(), Value::String(value.clone()));
    }
    let children = (!block.children.is_empty())
        .then(|| block.children.iter().map(export_block).collect());
    ExportedElement {
        kind: block.kind,
        id: block.id.to_string(),
        name: block.name.clone(),
        styles,
        children,
    }
}

impl Document {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_pretty()?)?;
        log::info!("exported {} root element(s) to {}", self.elements.len(), path.display());
        Ok(())
    }
}
