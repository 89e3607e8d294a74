//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (document model, selection, settings, messages)
//! - `controllers/` - Orchestration (toolbar reconciler, dropdowns, editor session)
//! - `services/` - Editing engine and JSON import/export
//! - `infrastructure/` - External integrations (FLTK buffer, logging, error)
//! - `state.rs` - Main application coordinator

pub mod controllers;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod state;

// Re-exports for convenient external access
pub use controllers::session::{EditorSession, Notifier};
pub use controllers::toolbar::{ToolbarController, ToolbarState};
pub use domain::{AppSettings, DocumentModel, EditorState, Message};
pub use infrastructure::buffer::buffer_text_no_leak;
pub use infrastructure::error::{AppError, Result};
pub use services::engine::{EditorCommand, EditorEngine, EditorUpdate, Subscription};
pub use services::rich_text::RichTextEngine;
