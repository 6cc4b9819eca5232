//! Per-block CSS overrides authored as a single `#name { ... }` rule.

use crate::model::{BlockType, StyleOverrides};
use regex::RegexBuilder;

/// Declarations of the first `#<block_name> { ... }` rule in `css`.
///
/// Returns an empty mapping when no rule targets the block. Declarations
/// missing a property or a value are dropped one by one.
pub fn parse_override_block(css: &str, block_name: &str) -> StyleOverrides {
    find_rule_body(css, block_name)
        .map(parse_declarations)
        .unwrap_or_default()
}

/// Body of the first rule whose id selector is `block_name`, matched
/// case-insensitively.
pub fn find_rule_body<'a>(css: &'a str, block_name: &str) -> Option<&'a str> {
    let pattern = format!(r"#{}\s*\{{([^}}]*)\}}", regex::escape(block_name));
    let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(e) => {
            log::warn!("cannot build selector matcher for `{block_name}`: {e}");
            return None;
        }
    };
    re.captures(css)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn parse_declarations(body: &str) -> StyleOverrides {
    body.split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let (property, value) = (property.trim(), value.trim());
            if property.is_empty() || value.is_empty() {
                log::debug!("skipping malformed declaration `{}`", decl.trim());
                return None;
            }
            Some((property.to_string(), value.to_string()))
        })
        .collect()
}

/// Editor text offered for a block that has never been styled.
pub fn default_seed_text(block_name: &str, kind: BlockType) -> String {
    format!(
        "#{block_name} {{\n    display: {};\n}}\n",
        kind.default_display()
    )
}
