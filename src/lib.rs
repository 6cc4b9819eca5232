//! Visual layout designer core: a tree of absolutely positioned blocks,
//! grid-snapped move/resize geometry, per-block CSS overrides, a styling
//! export and snapshot-based undo/redo.

pub mod error;
pub mod export;
pub mod geometry;
pub mod history;
pub mod model;
pub mod session;
pub mod settings;
pub mod store;
pub mod style;
pub mod tree;

pub use error::{LayoutError, Result};
pub use session::{EditorSession, Mode};
