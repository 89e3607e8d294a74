//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - The block/run document, selections and the editor state snapshot
//! - Text marks, block types and inline styles
//! - Application settings and the patient record
//! - Message types for the event system

pub mod blocks;
pub mod document;
pub mod editor_state;
pub mod marks;
pub mod messages;
pub mod patient;
pub mod selection;
pub mod settings;
pub mod style;

pub use blocks::{BlockKind, BlockType, ElementFormat, HeadingLevel};
pub use document::{Block, DocumentModel, TextRun};
pub use editor_state::EditorState;
pub use marks::{MarkSet, TextMark};
pub use messages::Message;
pub use patient::{PatientField, PatientRecord};
pub use selection::{NodeSelection, Point, RangeSelection, Selection};
pub use settings::AppSettings;
pub use style::StyleMap;
