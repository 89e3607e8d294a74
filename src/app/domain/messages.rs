use super::blocks::{BlockType, ElementFormat};
use super::marks::TextMark;
use super::patient::PatientField;
use crate::app::controllers::dropdown::Dropdown;

/// All messages that can be sent through the FLTK channel.
/// Each widget callback sends one of these; the dispatch loop in main handles them.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // File
    ExportDocument,
    ImportDocument,
    /// Contents of the import file, read off the UI thread.
    ImportLoaded(Result<String, String>),
    FileQuit,
    WindowClose,

    // Edit
    Undo,
    Redo,
    /// Text buffer modification, in character offsets.
    BufferEdited {
        pos: usize,
        inserted: String,
        deleted: usize,
    },

    // Toolbar
    ToggleMark(TextMark),
    SetBlockType(BlockType),
    SetAlignment(ElementFormat),
    Indent,
    Outdent,
    PickTextColor,
    PickBackgroundColor,
    FontSizeStep(i32),
    FontSizeEntered(String),
    FontSizeEditing(bool),
    ClearFormatting,
    ToggleReadOnly,
    ToggleDropdown(Dropdown),
    /// Mouse press anywhere in the window, in window coordinates.
    PointerPressed { x: i32, y: i32 },

    // Metadata form
    PatientFieldChanged(PatientField, String),

    // View
    ToggleDarkMode,
}
