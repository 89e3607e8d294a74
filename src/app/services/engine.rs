//! Editing engine interface.
//!
//! The engine owns the document, the selection and the undo history. UI
//! code only talks to it through [`EditorEngine`]: it dispatches
//! [`EditorCommand`]s, listens for [`EditorUpdate`]s and reads the current
//! [`EditorState`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::app::domain::blocks::{BlockKind, ElementFormat};
use crate::app::domain::editor_state::EditorState;
use crate::app::domain::marks::TextMark;
use crate::app::domain::selection::{Point, Selection};
use crate::app::infrastructure::error::Result;

/// Commands understood by an editing engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    /// Replace the selection. Allowed while read-only.
    SetSelection(Option<Selection>),
    /// Toggle a mark on the selection (or on the caret format).
    FormatText(TextMark),
    /// Set alignment of every block touched by the selection.
    FormatElement(ElementFormat),
    Indent,
    Outdent,
    /// Convert every block touched by the selection.
    SetBlocksType(BlockKind),
    /// Set (`Some`) or remove (`None`) an inline style property.
    PatchStyle(String, Option<String>),
    /// Remove every mark from the selected text.
    ClearMarks,
    /// Replace the selected content with one unformatted run of `text`.
    ReplaceWithPlainText(String),
    /// Insert text at the selection, replacing selected content.
    /// `\n` splits the block.
    InsertText(String),
    /// Delete the text between two points; crossing a block boundary
    /// merges the blocks.
    DeleteRange(Point, Point),
    Undo,
    Redo,
}

impl EditorCommand {
    /// Whether the command changes the document (and is therefore refused
    /// while the editor is read-only).
    pub fn is_mutation(&self) -> bool {
        !matches!(self, EditorCommand::SetSelection(_))
    }
}

/// Change notification passed to listeners after every dispatch that did
/// something, and after the document or editable flag is replaced.
#[derive(Debug, Clone, Copy)]
pub struct EditorUpdate<'a> {
    pub state: &'a EditorState,
    /// The document changed (not only the selection).
    pub document_changed: bool,
    pub editable: bool,
    pub can_undo: bool,
    pub can_redo: bool,
}

pub type UpdateListener = Box<dyn FnMut(&EditorUpdate<'_>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listener table shared between an engine and its [`Subscription`]s.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<(ListenerId, UpdateListener)>,
    retired: Vec<ListenerId>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Add a listener and return the guard that removes it again.
    pub fn register(registry: &Rc<RefCell<Self>>, listener: UpdateListener) -> Subscription {
        let mut reg = registry.borrow_mut();
        reg.next_id += 1;
        let id = ListenerId(reg.next_id);
        reg.listeners.push((id, listener));
        Subscription {
            id,
            registry: Rc::downgrade(registry),
        }
    }

    /// Call every listener with `update`.
    ///
    /// Listeners are taken out of the table while they run so a listener
    /// may drop a subscription (its own included) without a double borrow.
    pub fn emit(registry: &Rc<RefCell<Self>>, update: &EditorUpdate<'_>) {
        let mut running = std::mem::take(&mut registry.borrow_mut().listeners);
        for (_, listener) in running.iter_mut() {
            listener(update);
        }
        let mut reg = registry.borrow_mut();
        let retired = std::mem::take(&mut reg.retired);
        running.retain(|(id, _)| !retired.contains(id));
        // Listeners registered during emission were pushed to the now-empty table.
        running.append(&mut reg.listeners);
        reg.listeners = running;
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn unregister(&mut self, id: ListenerId) {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        if self.listeners.len() == before {
            // Not in the table: it is running inside `emit` right now.
            self.retired.push(id);
        }
    }
}

/// Scoped listener registration. Dropping it removes the listener.
#[must_use = "dropping a Subscription immediately unregisters the listener"]
pub struct Subscription {
    id: ListenerId,
    registry: Weak<RefCell<ListenerRegistry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut reg) = registry.try_borrow_mut() {
                reg.unregister(self.id);
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Capability set of a rich-text editing engine.
pub trait EditorEngine {
    /// Run a command. Returns `true` if the engine handled it and emitted
    /// an update, `false` if it was refused or had nothing to do.
    fn dispatch(&mut self, command: EditorCommand) -> bool;

    /// Register a change listener for as long as the returned guard lives.
    fn register_update_listener(&mut self, listener: UpdateListener) -> Subscription;

    /// Current document and selection.
    fn state(&self) -> &EditorState;

    fn is_editable(&self) -> bool;

    /// Flip the editable flag; listeners are notified.
    fn set_editable(&mut self, editable: bool);

    fn can_undo(&self) -> bool;

    fn can_redo(&self) -> bool;

    /// Serialize the whole document.
    fn serialize_state(&self) -> Result<String>;

    /// Parse a serialized document without touching the current one.
    fn parse_state(&self, json: &str) -> Result<EditorState>;

    /// Replace the current document wholesale; listeners are notified.
    fn set_state(&mut self, state: EditorState);
}
