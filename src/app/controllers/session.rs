//! Editor session: one engine, its toolbar controller, the read-only flag,
//! JSON import/export and the patient record shown above the editor.

use std::path::{Path, PathBuf};

use crate::app::domain::blocks::{BlockType, ElementFormat};
use crate::app::domain::editor_state::EditorState;
use crate::app::domain::marks::TextMark;
use crate::app::domain::patient::{PatientField, PatientRecord};
use crate::app::domain::selection::Selection;
use crate::app::infrastructure::error::Result;
use crate::app::services::document_io::{self, INVALID_JSON_MESSAGE};
use crate::app::services::engine::{EditorCommand, EditorEngine, Subscription, UpdateListener};

use super::toolbar::{ToolbarController, ToolbarState};

/// Sink for user-facing alerts (a modal dialog in the UI).
pub trait Notifier {
    fn alert(&mut self, message: &str);
}

pub struct EditorSession {
    toolbar: ToolbarController,
    engine: Box<dyn EditorEngine>,
    notifier: Box<dyn Notifier>,
    patient: PatientRecord,
    export_file_name: String,
}

impl EditorSession {
    pub fn new(mut engine: Box<dyn EditorEngine>, notifier: Box<dyn Notifier>, export_file_name: &str) -> Self {
        let toolbar = ToolbarController::attach(engine.as_mut());
        Self {
            toolbar,
            engine,
            notifier,
            patient: PatientRecord::default(),
            export_file_name: export_file_name.to_string(),
        }
    }

    pub fn engine(&self) -> &dyn EditorEngine {
        self.engine.as_ref()
    }

    pub fn editor_state(&self) -> &EditorState {
        self.engine.state()
    }

    pub fn toolbar(&self) -> &ToolbarController {
        &self.toolbar
    }

    pub fn toolbar_state(&self) -> ToolbarState {
        self.toolbar.state()
    }

    pub fn is_editable(&self) -> bool {
        self.engine.is_editable()
    }

    /// Listen for engine updates alongside the toolbar.
    pub fn register_update_listener(&mut self, listener: UpdateListener) -> Subscription {
        self.engine.register_update_listener(listener)
    }

    /// Flip between editable and read-only. Returns the new editable flag.
    pub fn toggle_read_only(&mut self) -> bool {
        let editable = !self.engine.is_editable();
        self.engine.set_editable(editable);
        log::info!("Editor is now {}", if editable { "editable" } else { "read-only" });
        editable
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) -> bool {
        self.engine.dispatch(EditorCommand::SetSelection(selection))
    }

    /// Forward a raw editing command (typing, deleting) to the engine.
    pub fn dispatch(&mut self, command: EditorCommand) -> bool {
        self.engine.dispatch(command)
    }

    /// Current range selection as `(anchor, focus)` character offsets.
    pub fn selection_offsets(&self) -> Option<(usize, usize)> {
        let state = self.engine.state();
        let range = state.range_selection()?;
        Some((
            state.document.char_offset_of(range.anchor),
            state.document.char_offset_of(range.focus),
        ))
    }

    /// Move the engine selection to the widget's `anchor..focus` character
    /// range. Does nothing when it already matches, so caret formatting
    /// toggled on an empty selection survives.
    pub fn sync_selection(&mut self, anchor: usize, focus: usize) -> bool {
        if self.selection_offsets() == Some((anchor, focus)) {
            return false;
        }
        let document = &self.engine.state().document;
        let selection = Selection::range(document.point_at(anchor), document.point_at(focus));
        self.set_selection(Some(selection))
    }

    /// Replay an edit made in the text widget: `deleted` characters removed
    /// at character offset `pos`, then `inserted` typed there.
    pub fn apply_buffer_edit(&mut self, pos: usize, inserted: &str, deleted: usize) -> bool {
        let mut changed = false;
        if deleted > 0 {
            let document = &self.engine.state().document;
            let (from, to) = (document.point_at(pos), document.point_at(pos + deleted));
            changed |= self.dispatch(EditorCommand::DeleteRange(from, to));
        }
        if !inserted.is_empty() {
            if self.selection_offsets() != Some((pos, pos)) {
                let at = self.engine.state().document.point_at(pos);
                self.set_selection(Some(Selection::range(at, at)));
            }
            changed |= self.dispatch(EditorCommand::InsertText(inserted.to_string()));
        }
        changed
    }

    // Toolbar actions

    pub fn toggle_mark(&mut self, mark: TextMark) -> bool {
        self.toolbar.toggle_mark(self.engine.as_mut(), mark)
    }

    pub fn set_block_type(&mut self, block_type: BlockType) -> bool {
        self.toolbar.set_block_type(self.engine.as_mut(), block_type)
    }

    pub fn set_alignment(&mut self, align: ElementFormat) -> bool {
        self.toolbar.set_alignment(self.engine.as_mut(), align)
    }

    pub fn indent(&mut self) -> bool {
        self.toolbar.indent(self.engine.as_mut())
    }

    pub fn outdent(&mut self) -> bool {
        self.toolbar.outdent(self.engine.as_mut())
    }

    pub fn apply_style(&mut self, key: &str, value: Option<&str>) -> bool {
        self.toolbar.apply_style(self.engine.as_mut(), key, value)
    }

    pub fn step_font_size(&mut self, delta: i32) -> bool {
        self.toolbar.step_font_size(self.engine.as_mut(), delta)
    }

    pub fn set_font_size(&mut self, entered: &str) -> bool {
        self.toolbar.set_font_size(self.engine.as_mut(), entered)
    }

    pub fn set_font_size_editing(&self, editing: bool) {
        self.toolbar.set_font_size_editing(editing);
    }

    pub fn clear_formatting(&mut self) -> bool {
        self.toolbar.clear_formatting(self.engine.as_mut())
    }

    pub fn undo(&mut self) -> bool {
        self.toolbar.undo(self.engine.as_mut())
    }

    pub fn redo(&mut self) -> bool {
        self.toolbar.redo(self.engine.as_mut())
    }

    // Import / export

    pub fn export_json(&self) -> Result<String> {
        self.engine.serialize_state()
    }

    /// Serialize the document into `dir`. Failures are logged and alerted.
    pub fn export_to_dir(&mut self, dir: &Path) -> Option<PathBuf> {
        let written = self
            .export_json()
            .and_then(|json| document_io::write_export(dir, &self.export_file_name, &json));
        match written {
            Ok(path) => {
                log::info!("Exported document to {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::error!("Export failed: {}", e);
                self.notifier.alert(&format!("Error exporting file: {}", e));
                None
            }
        }
    }

    /// Replace the document with a serialized one. On a parse failure the
    /// current document is kept and a single alert is raised.
    pub fn import_text(&mut self, json: &str) -> bool {
        match self.engine.parse_state(json) {
            Ok(state) => {
                self.engine.set_state(state);
                log::info!("Imported document");
                true
            }
            Err(e) => {
                log::warn!("Rejected import: {}", e);
                self.notifier.alert(INVALID_JSON_MESSAGE);
                false
            }
        }
    }

    /// Handle the result of reading an import file off the UI thread.
    pub fn import_loaded(&mut self, contents: std::result::Result<String, String>) -> bool {
        match contents {
            Ok(json) => self.import_text(&json),
            Err(e) => {
                log::error!("Import read failed: {}", e);
                self.notifier.alert(&format!("Error reading file: {}", e));
                false
            }
        }
    }

    /// Import from a chosen file. `None` (picker cancelled) does nothing.
    pub fn import_file(&mut self, path: Option<&Path>) -> bool {
        let Some(path) = path else {
            return false;
        };
        self.import_loaded(document_io::read_import(path).map_err(|e| e.to_string()))
    }

    // Patient record

    pub fn patient(&self) -> &PatientRecord {
        &self.patient
    }

    pub fn set_patient_field(&mut self, field: PatientField, value: &str) {
        self.patient.set(field, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::app::domain::document::{Block, DocumentModel, TextRun};
    use crate::app::domain::marks::MarkSet;
    use crate::app::domain::selection::Point;
    use crate::app::domain::style::{COLOR, StyleMap};
    use crate::app::services::document_io::EXPORT_FILE_NAME;
    use crate::app::services::rich_text::{DEFAULT_HISTORY_DEPTH, RichTextEngine};

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        alerts: Rc<RefCell<Vec<String>>>,
    }

    impl Notifier for RecordingNotifier {
        fn alert(&mut self, message: &str) {
            self.alerts.borrow_mut().push(message.to_string());
        }
    }

    fn session_with(blocks: Vec<Block>) -> (EditorSession, RecordingNotifier) {
        let notifier = RecordingNotifier::default();
        let engine = RichTextEngine::new(DocumentModel::from_blocks(blocks), DEFAULT_HISTORY_DEPTH);
        let session = EditorSession::new(Box::new(engine), Box::new(notifier.clone()), EXPORT_FILE_NAME);
        (session, notifier)
    }

    fn select(session: &mut EditorSession, anchor: (usize, usize), focus: (usize, usize)) {
        session.set_selection(Some(Selection::range(
            Point::new(anchor.0, anchor.1),
            Point::new(focus.0, focus.1),
        )));
    }

    #[test]
    fn test_invalid_json_import_alerts_once_and_keeps_document() {
        let (mut session, notifier) = session_with(vec![Block::paragraph("current note")]);
        let before = session.editor_state().document.clone();

        assert!(!session.import_text("\"not valid json\""));
        assert_eq!(session.editor_state().document, before);
        assert_eq!(*notifier.alerts.borrow(), vec![INVALID_JSON_MESSAGE.to_string()]);
    }

    #[test]
    fn test_export_then_import_reproduces_document() {
        let run = TextRun::styled(
            "hypertension",
            MarkSet::empty().with(TextMark::Bold),
            StyleMap::parse("color: #c00"),
        );
        let (mut session, notifier) = session_with(vec![
            Block::paragraph("Dx: ").with_run(run),
            Block::paragraph("Plan: follow up"),
        ]);
        select(&mut session, (1, 0), (1, 5));
        session.set_alignment(ElementFormat::Right);
        let document = session.editor_state().document.clone();

        let dir = tempfile::tempdir().unwrap();
        let path = session.export_to_dir(dir.path()).unwrap();
        assert!(path.ends_with(EXPORT_FILE_NAME));

        let (mut fresh, _) = session_with(vec![Block::paragraph("something else")]);
        assert!(fresh.import_file(Some(&path)));
        assert_eq!(fresh.editor_state().document, document);
        assert!(notifier.alerts.borrow().is_empty());
    }

    #[test]
    fn test_import_cancelled_is_noop() {
        let (mut session, notifier) = session_with(vec![Block::paragraph("keep")]);
        assert!(!session.import_file(None));
        assert_eq!(session.editor_state().document.plain_text(), "keep");
        assert!(notifier.alerts.borrow().is_empty());
    }

    #[test]
    fn test_import_read_error_alerts() {
        let (mut session, notifier) = session_with(vec![Block::paragraph("keep")]);
        let dir = tempfile::tempdir().unwrap();
        assert!(!session.import_file(Some(&dir.path().join("missing.json"))));
        assert_eq!(session.editor_state().document.plain_text(), "keep");
        assert_eq!(notifier.alerts.borrow().len(), 1);
        assert!(notifier.alerts.borrow()[0].starts_with("Error reading file"));
    }

    #[test]
    fn test_import_resets_history() {
        let (mut session, _) = session_with(vec![Block::paragraph("a")]);
        select(&mut session, (0, 0), (0, 1));
        session.toggle_mark(TextMark::Bold);
        assert!(session.toolbar_state().can_undo);

        let json = session.export_json().unwrap();
        assert!(session.import_text(&json));
        assert!(!session.toolbar_state().can_undo);
        assert!(!session.engine().can_undo());
    }

    #[test]
    fn test_read_only_blocks_toolbar_but_not_selection() {
        let (mut session, _) = session_with(vec![Block::paragraph("signed"), Block::paragraph("note")]);
        assert!(!session.toggle_read_only());
        assert!(!session.toolbar_state().is_editable);

        let before = session.editor_state().document.clone();
        select(&mut session, (0, 0), (1, 2));
        assert!(session.editor_state().selection.is_some());
        assert!(!session.toggle_mark(TextMark::Italic));
        assert!(!session.apply_style(COLOR, Some("#0f0")));
        assert!(!session.set_block_type(BlockType::H3));
        assert!(!session.clear_formatting());
        assert!(!session.dispatch(EditorCommand::InsertText("x".to_string())));
        assert_eq!(session.editor_state().document, before);

        assert!(session.toggle_read_only());
        assert!(session.toggle_mark(TextMark::Italic));
    }

    #[test]
    fn test_read_only_still_exports() {
        let (mut session, _) = session_with(vec![Block::paragraph("locked")]);
        session.toggle_read_only();
        let dir = tempfile::tempdir().unwrap();
        assert!(session.export_to_dir(dir.path()).is_some());
    }

    #[test]
    fn test_patient_fields() {
        let (mut session, _) = session_with(vec![Block::default()]);
        session.set_patient_field(PatientField::LastName, "Roe");
        session.set_patient_field(PatientField::Sex, "F");
        assert_eq!(session.patient().get(PatientField::LastName), "Roe");
        assert_eq!(session.patient().sex, "F");
        assert_eq!(session.patient().agency, "");
    }

    #[test]
    fn test_buffer_typing_replays_into_document() {
        let (mut session, _) = session_with(vec![Block::paragraph("BP 120"), Block::paragraph("HR")]);
        assert!(session.apply_buffer_edit(6, "/80", 0));
        assert!(session.apply_buffer_edit(7, "\n", 0));
        assert_eq!(session.editor_state().document.plain_text(), "BP 120/\n80\nHR");
        assert_eq!(session.selection_offsets(), Some((8, 8)));
    }

    #[test]
    fn test_buffer_delete_across_blocks_merges() {
        let (mut session, _) = session_with(vec![Block::paragraph("one"), Block::paragraph("two")]);
        assert!(session.apply_buffer_edit(3, "", 1));
        assert_eq!(session.editor_state().document.plain_text(), "onetwo");
        assert_eq!(session.editor_state().document.block_count(), 1);
    }

    #[test]
    fn test_buffer_replace_selection() {
        let (mut session, _) = session_with(vec![Block::paragraph("left arm")]);
        session.sync_selection(0, 4);
        assert!(session.apply_buffer_edit(0, "right", 4));
        assert_eq!(session.editor_state().document.plain_text(), "right arm");
    }

    #[test]
    fn test_caret_format_survives_matching_sync() {
        let (mut session, _) = session_with(vec![Block::paragraph("note")]);
        assert!(session.sync_selection(4, 4));
        assert!(session.toggle_mark(TextMark::Bold));
        assert!(!session.sync_selection(4, 4));
        assert!(session.apply_buffer_edit(4, "!", 0));
        let block = &session.editor_state().document.blocks[0];
        assert!(block.runs.last().unwrap().marks.contains(TextMark::Bold));
    }

    #[test]
    fn test_sync_selection_backward() {
        let (mut session, _) = session_with(vec![Block::paragraph("ab"), Block::paragraph("cd")]);
        assert!(session.sync_selection(4, 1));
        let range = session.editor_state().range_selection().unwrap().clone();
        assert_eq!(range.anchor, Point::new(1, 1));
        assert_eq!(range.focus, Point::new(0, 1));
        assert!(range.is_backward());
    }

    #[test]
    fn test_undo_restores_formatting_selection() {
        let (mut session, _) = session_with(vec![Block::paragraph("fever")]);
        select(&mut session, (0, 0), (0, 4));
        assert!(session.toggle_mark(TextMark::Bold));
        assert!(session.sync_selection(2, 2));
        assert!(session.undo());
        assert_eq!(session.editor_state().document.plain_text(), "fever");
        assert_eq!(session.selection_offsets(), Some((0, 4)));
    }

    #[test]
    fn test_buffer_edit_refused_while_read_only() {
        let (mut session, _) = session_with(vec![Block::paragraph("final")]);
        session.toggle_read_only();
        assert!(!session.apply_buffer_edit(0, "x", 0));
        assert_eq!(session.editor_state().document.plain_text(), "final");
    }
}
