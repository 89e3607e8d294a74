use crate::app::domain::editor_state::EditorState;

/// What produced a history entry. Consecutive typing or deleting steps
/// collapse into one undo step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Typing,
    Deleting,
    Formatting,
    Structure,
}

impl EntryKind {
    fn merges(self) -> bool {
        matches!(self, EntryKind::Typing | EntryKind::Deleting)
    }
}

struct HistoryEntry {
    state: EditorState,
    kind: EntryKind,
}

/// Snapshot-based undo/redo stack.
pub struct History {
    undo: Vec<HistoryEntry>,
    redo: Vec<EditorState>,
    depth: usize,
    merge_open: bool,
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            depth: depth.max(1),
            merge_open: false,
        }
    }

    /// Record the state from before a document change.
    pub fn record(&mut self, before: EditorState, kind: EntryKind) {
        self.redo.clear();
        let merge = self.merge_open
            && kind.merges()
            && self.undo.last().is_some_and(|last| last.kind == kind);
        if !merge {
            self.undo.push(HistoryEntry { state: before, kind });
            if self.undo.len() > self.depth {
                self.undo.remove(0);
            }
        }
        self.merge_open = kind.merges();
    }

    /// Stop the next typing step from merging into the previous one.
    pub fn break_merge(&mut self) {
        self.merge_open = false;
    }

    pub fn undo(&mut self, current: &EditorState) -> Option<EditorState> {
        let entry = self.undo.pop()?;
        self.redo.push(current.clone());
        self.merge_open = false;
        Some(entry.state)
    }

    pub fn redo(&mut self, current: &EditorState) -> Option<EditorState> {
        let next = self.redo.pop()?;
        self.undo.push(HistoryEntry {
            state: current.clone(),
            kind: EntryKind::Structure,
        });
        self.merge_open = false;
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.merge_open = false;
    }
}
