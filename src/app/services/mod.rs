//! Services layer - business operations.
//!
//! This module contains the editing logic:
//! - The engine interface and listener registry
//! - The in-memory rich-text engine with undo history
//! - JSON import/export of documents

pub mod document_io;
pub mod engine;
pub mod rich_text;
