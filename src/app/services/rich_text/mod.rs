//! In-memory rich-text engine.
//!
//! `RichTextEngine` keeps the document, the selection, the editable flag and
//! a snapshot undo history, and notifies registered listeners synchronously
//! after every command it handles.

pub mod editing;
pub mod history;

use std::cell::RefCell;
use std::rc::Rc;

use crate::app::domain::document::DocumentModel;
use crate::app::domain::editor_state::EditorState;
use crate::app::domain::selection::{RangeSelection, Selection};
use crate::app::infrastructure::error::Result;
use crate::app::services::document_io;
use crate::app::services::engine::{
    EditorCommand, EditorEngine, EditorUpdate, ListenerRegistry, Subscription, UpdateListener,
};

use history::{EntryKind, History};

pub const DEFAULT_HISTORY_DEPTH: usize = 100;

pub struct RichTextEngine {
    state: EditorState,
    editable: bool,
    history: History,
    listeners: Rc<RefCell<ListenerRegistry>>,
}

impl Default for RichTextEngine {
    fn default() -> Self {
        Self::new(DocumentModel::new(), DEFAULT_HISTORY_DEPTH)
    }
}

impl RichTextEngine {
    pub fn new(document: DocumentModel, history_depth: usize) -> Self {
        Self {
            state: EditorState::new(document),
            editable: true,
            history: History::new(history_depth),
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn emit(&self, document_changed: bool) {
        let update = EditorUpdate {
            state: &self.state,
            document_changed,
            editable: self.editable,
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        };
        ListenerRegistry::emit(&self.listeners, &update);
    }

    /// Run a mutation against the document and selection, recording history
    /// and notifying listeners. `f` returns `false` when it had nothing to do.
    fn mutate(
        &mut self,
        kind: EntryKind,
        f: impl FnOnce(&mut DocumentModel, &mut Option<Selection>) -> bool,
    ) -> bool {
        let before = self.state.clone();
        if !f(&mut self.state.document, &mut self.state.selection) {
            return false;
        }
        let changed = before.document != self.state.document;
        if changed {
            self.history.record(before, kind);
        } else {
            self.history.break_merge();
        }
        self.emit(changed);
        true
    }

    /// Like [`mutate`](Self::mutate) but only for range selections.
    fn mutate_range(
        &mut self,
        kind: EntryKind,
        f: impl FnOnce(&mut DocumentModel, &mut RangeSelection),
    ) -> bool {
        self.mutate(kind, |doc, selection| match selection {
            Some(Selection::Range(range)) => {
                f(doc, range);
                true
            }
            _ => false,
        })
    }

    /// Block-level mutation over the blocks the selection touches.
    fn mutate_blocks(&mut self, f: impl FnOnce(&mut DocumentModel, (usize, usize)) -> bool) -> bool {
        self.mutate(EntryKind::Structure, |doc, selection| match selection {
            Some(sel) => {
                f(doc, sel.block_span());
                true
            }
            None => false,
        })
    }

    fn clamp_selection(&self, selection: Option<Selection>) -> Option<Selection> {
        let doc = &self.state.document;
        match selection? {
            Selection::Range(mut range) => {
                range.anchor = doc.clamp(range.anchor);
                range.focus = doc.clamp(range.focus);
                let (format, style) = editing::caret_format_at(doc, range.anchor);
                range.format = format;
                range.style = style;
                Some(Selection::Range(range))
            }
            Selection::Node(node) if node.block < doc.block_count() => Some(Selection::Node(node)),
            Selection::Node(_) => None,
        }
    }
}

impl EditorEngine for RichTextEngine {
    fn dispatch(&mut self, command: EditorCommand) -> bool {
        if !self.editable && command.is_mutation() {
            log::debug!("Ignoring {:?} while read-only", command);
            return false;
        }

        match command {
            EditorCommand::SetSelection(selection) => {
                let selection = self.clamp_selection(selection);
                if selection == self.state.selection {
                    return false;
                }
                self.state.selection = selection;
                self.history.break_merge();
                self.emit(false);
                true
            }
            EditorCommand::FormatText(mark) => self.mutate_range(EntryKind::Formatting, |doc, range| {
                editing::format_text(doc, range, mark)
            }),
            EditorCommand::PatchStyle(key, value) => self.mutate_range(EntryKind::Formatting, |doc, range| {
                editing::patch_style(doc, range, &key, value.as_deref())
            }),
            EditorCommand::ClearMarks => {
                self.mutate_range(EntryKind::Formatting, editing::clear_marks)
            }
            EditorCommand::FormatElement(align) => {
                self.mutate_blocks(|doc, span| editing::format_element(doc, span, align))
            }
            EditorCommand::Indent => self.mutate_blocks(|doc, span| editing::indent(doc, span, 1)),
            EditorCommand::Outdent => self.mutate_blocks(|doc, span| editing::indent(doc, span, -1)),
            EditorCommand::SetBlocksType(kind) => {
                self.mutate_blocks(|doc, span| editing::set_blocks_type(doc, span, kind))
            }
            EditorCommand::ReplaceWithPlainText(text) => {
                self.mutate_range(EntryKind::Formatting, |doc, range| {
                    let start = editing::delete_range(doc, range.start(), range.end());
                    let end = editing::insert_text(doc, start, &text, Default::default(), &Default::default());
                    *range = RangeSelection::new(start, end);
                })
            }
            EditorCommand::InsertText(text) => {
                let kind = if text.contains('\n') {
                    EntryKind::Structure
                } else {
                    EntryKind::Typing
                };
                self.mutate_range(kind, |doc, range| {
                    let start = editing::delete_range(doc, range.start(), range.end());
                    let end = editing::insert_text(doc, start, &text, range.format, &range.style);
                    range.collapse_to(end);
                })
            }
            EditorCommand::DeleteRange(from, to) => self.mutate(EntryKind::Deleting, |doc, selection| {
                if doc.clamp(from) == doc.clamp(to) {
                    return false;
                }
                let at = editing::delete_range(doc, from, to);
                let mut caret = RangeSelection::caret(at);
                let (format, style) = editing::caret_format_at(doc, at);
                caret.format = format;
                caret.style = style;
                *selection = Some(Selection::Range(caret));
                true
            }),
            EditorCommand::Undo => match self.history.undo(&self.state) {
                Some(previous) => {
                    self.state = previous;
                    self.emit(true);
                    true
                }
                None => false,
            },
            EditorCommand::Redo => match self.history.redo(&self.state) {
                Some(next) => {
                    self.state = next;
                    self.emit(true);
                    true
                }
                None => false,
            },
        }
    }

    fn register_update_listener(&mut self, listener: UpdateListener) -> Subscription {
        ListenerRegistry::register(&self.listeners, listener)
    }

    fn state(&self) -> &EditorState {
        &self.state
    }

    fn is_editable(&self) -> bool {
        self.editable
    }

    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
        self.emit(false);
    }

    fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn serialize_state(&self) -> Result<String> {
        document_io::to_json(&self.state.document)
    }

    fn parse_state(&self, json: &str) -> Result<EditorState> {
        document_io::from_json(json).map(EditorState::new)
    }

    fn set_state(&mut self, state: EditorState) {
        self.state = state;
        self.history.clear();
        self.emit(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::app::domain::blocks::{BlockKind, ElementFormat, HeadingLevel};
    use crate::app::domain::document::Block;
    use crate::app::domain::marks::TextMark;
    use crate::app::domain::selection::Point;

    fn engine_with(texts: &[&str]) -> RichTextEngine {
        RichTextEngine::new(
            DocumentModel::from_blocks(texts.iter().map(|t| Block::paragraph(t)).collect()),
            DEFAULT_HISTORY_DEPTH,
        )
    }

    fn select(engine: &mut RichTextEngine, anchor: (usize, usize), focus: (usize, usize)) {
        engine.dispatch(EditorCommand::SetSelection(Some(Selection::range(
            Point::new(anchor.0, anchor.1),
            Point::new(focus.0, focus.1),
        ))));
    }

    #[test]
    fn test_listener_called_and_unregistered_on_drop() {
        let mut engine = engine_with(&["abc"]);
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let sub = engine.register_update_listener(Box::new(move |_: &EditorUpdate<'_>| counter.set(counter.get() + 1)));
        assert_eq!(engine.listener_count(), 1);

        select(&mut engine, (0, 0), (0, 2));
        assert_eq!(calls.get(), 1);

        drop(sub);
        assert_eq!(engine.listener_count(), 0);
        select(&mut engine, (0, 1), (0, 2));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_update_reports_document_change() {
        let mut engine = engine_with(&["abc"]);
        let changes = Rc::new(RefCell::new(Vec::new()));
        let log = changes.clone();
        let _sub = engine.register_update_listener(Box::new(move |u: &EditorUpdate<'_>| log.borrow_mut().push(u.document_changed)));
        select(&mut engine, (0, 0), (0, 3));
        engine.dispatch(EditorCommand::FormatText(TextMark::Bold));
        assert_eq!(*changes.borrow(), vec![false, true]);
    }

    #[test]
    fn test_same_selection_is_not_reemitted() {
        let mut engine = engine_with(&["abc"]);
        select(&mut engine, (0, 1), (0, 1));
        assert!(!engine.dispatch(EditorCommand::SetSelection(Some(Selection::caret(0, 1)))));
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut engine = engine_with(&["abc"]);
        select(&mut engine, (5, 9), (5, 9));
        assert_eq!(engine.state().range_selection().unwrap().anchor, Point::new(0, 3));
    }

    #[test]
    fn test_toggle_twice_restores_document() {
        let mut engine = engine_with(&["patient stable"]);
        let original = engine.state().document.clone();
        select(&mut engine, (0, 0), (0, 7));
        engine.dispatch(EditorCommand::FormatText(TextMark::Italic));
        assert!(engine.state().selection_has_mark(TextMark::Italic));
        engine.dispatch(EditorCommand::FormatText(TextMark::Italic));
        assert!(!engine.state().selection_has_mark(TextMark::Italic));
        assert_eq!(engine.state().document, original);
    }

    #[test]
    fn test_typing_uses_caret_format() {
        let mut engine = engine_with(&[""]);
        select(&mut engine, (0, 0), (0, 0));
        engine.dispatch(EditorCommand::FormatText(TextMark::Bold));
        engine.dispatch(EditorCommand::InsertText("BP".to_string()));
        let block = &engine.state().document.blocks[0];
        assert_eq!(block.text(), "BP");
        assert!(block.runs[0].marks.contains(TextMark::Bold));
        assert_eq!(engine.state().range_selection().unwrap().anchor, Point::new(0, 2));
    }

    #[test]
    fn test_insert_replaces_selected_text() {
        let mut engine = engine_with(&["hello world"]);
        select(&mut engine, (0, 6), (0, 11));
        engine.dispatch(EditorCommand::InsertText("there".to_string()));
        assert_eq!(engine.state().document.plain_text(), "hello there");
    }

    #[test]
    fn test_block_commands_apply_to_node_selection() {
        let mut engine = engine_with(&["a", "b"]);
        engine.dispatch(EditorCommand::SetSelection(Some(Selection::node(1))));
        engine.dispatch(EditorCommand::SetBlocksType(BlockKind::Heading(HeadingLevel::H3)));
        engine.dispatch(EditorCommand::FormatElement(ElementFormat::Right));
        let blocks = &engine.state().document.blocks;
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(blocks[1].kind, BlockKind::Heading(HeadingLevel::H3));
        assert_eq!(blocks[1].align, ElementFormat::Right);
        assert!(!engine.dispatch(EditorCommand::FormatText(TextMark::Bold)));
    }

    #[test]
    fn test_commands_without_selection_are_ignored() {
        let mut engine = engine_with(&["a"]);
        assert!(!engine.dispatch(EditorCommand::FormatText(TextMark::Bold)));
        assert!(!engine.dispatch(EditorCommand::Indent));
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_read_only_rejects_mutations_but_allows_selection() {
        let mut engine = engine_with(&["locked note"]);
        let original = engine.state().document.clone();
        engine.set_editable(false);
        select(&mut engine, (0, 0), (0, 6));
        assert!(engine.state().selection.is_some());
        for command in [
            EditorCommand::FormatText(TextMark::Bold),
            EditorCommand::FormatElement(ElementFormat::Center),
            EditorCommand::Indent,
            EditorCommand::SetBlocksType(BlockKind::Heading(HeadingLevel::H1)),
            EditorCommand::PatchStyle("color".to_string(), Some("#f00".to_string())),
            EditorCommand::ClearMarks,
            EditorCommand::InsertText("x".to_string()),
            EditorCommand::DeleteRange(Point::new(0, 0), Point::new(0, 3)),
        ] {
            assert!(!engine.dispatch(command));
        }
        assert_eq!(engine.state().document, original);
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut engine = engine_with(&["note"]);
        select(&mut engine, (0, 0), (0, 4));
        engine.dispatch(EditorCommand::FormatText(TextMark::Underline));
        let formatted = engine.state().document.clone();
        assert!(engine.can_undo());

        assert!(engine.dispatch(EditorCommand::Undo));
        assert_eq!(engine.state().document.blocks[0].runs[0].marks.bits(), 0);
        assert!(engine.can_redo());

        assert!(engine.dispatch(EditorCommand::Redo));
        assert_eq!(engine.state().document, formatted);
    }

    #[test]
    fn test_consecutive_typing_is_one_undo_step() {
        let mut engine = engine_with(&[""]);
        select(&mut engine, (0, 0), (0, 0));
        for ch in ["a", "b", "c"] {
            engine.dispatch(EditorCommand::InsertText(ch.to_string()));
        }
        engine.dispatch(EditorCommand::Undo);
        assert_eq!(engine.state().document.plain_text(), "");
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_delete_range_moves_caret() {
        let mut engine = engine_with(&["one", "two"]);
        assert!(engine.dispatch(EditorCommand::DeleteRange(Point::new(0, 3), Point::new(1, 0))));
        assert_eq!(engine.state().document.plain_text(), "onetwo");
        assert_eq!(engine.state().range_selection().unwrap().anchor, Point::new(0, 3));
        assert!(!engine.dispatch(EditorCommand::DeleteRange(Point::new(0, 1), Point::new(0, 1))));
    }

    #[test]
    fn test_set_state_clears_history_and_notifies() {
        let mut engine = engine_with(&["a"]);
        select(&mut engine, (0, 0), (0, 1));
        engine.dispatch(EditorCommand::FormatText(TextMark::Bold));
        let notified = Rc::new(Cell::new(false));
        let flag = notified.clone();
        let _sub = engine.register_update_listener(Box::new(move |u: &EditorUpdate<'_>| flag.set(u.document_changed)));
        engine.set_state(EditorState::new(DocumentModel::from_blocks(vec![Block::paragraph("fresh")])));
        assert!(notified.get());
        assert!(!engine.can_undo());
        assert!(engine.state().selection.is_none());
    }
}
