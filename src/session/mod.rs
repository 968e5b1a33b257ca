//! Editing session management module
//!
//! This module contains:
//! - Session state and the drawing state machine
//! - Message and effect types for canvas interactions
//! - Keyboard shortcut mapping

pub mod messages;
pub mod shortcuts;
pub mod state;

pub use messages::{Effect, Msg};
pub use state::{EditorState, Session, Tool};
