//! # Waymark Editor
//!
//! The editing layer of the waymark map annotation engine: reversible
//! [`commands::EditCommand`]s, the bounded [`history::History`], and
//! [`editor::EditorState`] tying the transform, layer stack, waypoint set,
//! and schema registry together behind an undo-aware operation surface.

pub mod commands;
pub mod editor;
pub mod history;

pub use commands::{DocumentState, EditCommand};
pub use editor::EditorState;
pub use history::{History, DEFAULT_DEPTH};
