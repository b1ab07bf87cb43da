//! Line editing.

pub mod edit_buffer;
pub mod editor;
pub mod history;

pub use edit_buffer::EditBuffer;
pub use editor::{EditorOptions, LineEditor};
pub use history::{HistoryLog, HistoryNavigator};
