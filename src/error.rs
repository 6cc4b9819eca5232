use crate::model::BlockId;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Invalid grid quantum {quantum}: must be a positive number")]
    InvalidConfiguration { quantum: f32 },

    #[error("Block not found: {id}")]
    NotFound { id: BlockId },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
