//! Annotation editing: message handlers and derived entity lists
//!
//! This module provides:
//! - `handle_msg`, the session dispatch for drawing, editing and labels
//! - List entries shown beside the canvas

pub mod handlers;
pub mod lists;

pub use handlers::{apply_loaded, handle_msg};
pub use lists::{EntityLists, ListEntry};
