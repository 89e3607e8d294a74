use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use fltk::{
    app::{self, Sender},
    dialog::{self, ColorMode},
    enums::{Event, Key},
    prelude::*,
    text::TextEditor,
};

use super::controllers::dropdown::{Dropdown, DropdownState};
use super::controllers::session::{EditorSession, Notifier};
use super::domain::document::DocumentModel;
use super::domain::messages::Message;
use super::domain::settings::AppSettings;
use super::domain::style::{self, BACKGROUND_COLOR, COLOR};
use super::infrastructure::buffer::EditorBuffer;
use super::services::document_io;
use super::services::engine::{EditorUpdate, Subscription};
use super::services::rich_text::RichTextEngine;
use crate::ui::file_dialogs::{choose_export_dir, choose_import_file};
use crate::ui::main_window::MainWidgets;
use crate::ui::menu::sync_read_only;
use crate::ui::render::{StylePalette, render};
use crate::ui::theme::apply_theme;

/// Alerts shown as modal FLTK dialogs.
pub struct DialogNotifier;

impl Notifier for DialogNotifier {
    fn alert(&mut self, message: &str) {
        dialog::alert_default(message);
    }
}

/// Keys the editor keeps handling while read-only.
const NAVIGATION_KEYS: [Key; 13] = [
    Key::Left,
    Key::Right,
    Key::Up,
    Key::Down,
    Key::Home,
    Key::End,
    Key::PageUp,
    Key::PageDown,
    Key::Escape,
    Key::ShiftL,
    Key::ShiftR,
    Key::ControlL,
    Key::ControlR,
];

fn key_edits_text(key: Key, ctrl: bool) -> bool {
    if ctrl {
        key == Key::from_char('x') || key == Key::from_char('v')
    } else {
        !NAVIGATION_KEYS.contains(&key)
    }
}

/// Route undo/redo and Tab to the engine, and swallow editing input while
/// the editor is read-only.
fn install_editor_keys(editor: &mut TextEditor, sender: Sender<Message>, editable: Rc<Cell<bool>>) {
    editor.handle(move |_, event| match event {
        Event::KeyDown => {
            let key = app::event_key();
            let ctrl = app::is_event_ctrl();
            let shift = app::is_event_shift();
            if ctrl && key == Key::from_char('z') {
                sender.send(if shift { Message::Redo } else { Message::Undo });
                return true;
            }
            if ctrl && key == Key::from_char('y') {
                sender.send(Message::Redo);
                return true;
            }
            if key == Key::Tab && !ctrl {
                sender.send(if shift { Message::Outdent } else { Message::Indent });
                return true;
            }
            !editable.get() && key_edits_text(key, ctrl)
        }
        Event::Paste | Event::DndRelease => !editable.get(),
        _ => false,
    });
}

pub struct AppState {
    pub widgets: MainWidgets,
    pub buffer: EditorBuffer,
    pub session: EditorSession,
    pub palette: StylePalette,
    pub dropdowns: DropdownState,
    pub sender: Sender<Message>,
    pub settings: AppSettings,
    pub dark_mode: bool,
    /// Last directory used in an import/export dialog.
    pub last_open_directory: Option<String>,
    /// Mirrors the engine's editable flag for the editor key handler.
    editable: Rc<Cell<bool>>,
    /// Set by the engine listener when the document must be re-rendered.
    document_dirty: Rc<Cell<bool>>,
    _document_subscription: Subscription,
    /// Something visible changed since the last [`AppState::sync_view`].
    view_dirty: bool,
}

impl AppState {
    pub fn new(mut widgets: MainWidgets, sender: Sender<Message>, settings: AppSettings) -> Self {
        let engine = RichTextEngine::new(DocumentModel::new(), settings.history_depth);
        let mut session = EditorSession::new(Box::new(engine), Box::new(DialogNotifier), &settings.export_file_name);

        let document_dirty = Rc::new(Cell::new(true));
        let subscription = session.register_update_listener({
            let dirty = document_dirty.clone();
            Box::new(move |update: &EditorUpdate<'_>| {
                if update.document_changed {
                    dirty.set(true);
                }
            })
        });

        let buffer = EditorBuffer::new(sender);
        widgets.text_editor.set_buffer(buffer.buffer.clone());

        let editable = Rc::new(Cell::new(session.is_editable()));
        install_editor_keys(&mut widgets.text_editor, sender, editable.clone());

        let dark_mode = settings.dark_mode;
        apply_theme(&mut widgets, dark_mode);

        let mut state = Self {
            widgets,
            buffer,
            session,
            palette: StylePalette::new(settings.default_font_size, dark_mode),
            dropdowns: DropdownState::new(),
            sender,
            last_open_directory: settings.last_open_directory.clone(),
            settings,
            dark_mode,
            editable,
            document_dirty,
            _document_subscription: subscription,
            view_dirty: true,
        };
        state.sync_view();
        state
    }

    /// Handle one message. Returns `false` when the app should exit.
    pub fn handle(&mut self, msg: Message) -> bool {
        self.view_dirty = true;
        match msg {
            Message::ExportDocument => {
                self.export_document();
            }
            Message::ImportDocument => self.import_document(),
            Message::ImportLoaded(contents) => {
                self.session.import_loaded(contents);
            }
            Message::FileQuit | Message::WindowClose => return !self.quit(),

            Message::BufferEdited { pos, inserted, deleted } => {
                self.session.apply_buffer_edit(pos, &inserted, deleted);
                // A refused edit still has to be reverted in the widget.
                self.document_dirty.set(true);
            }
            Message::Undo => {
                self.session.undo();
            }
            Message::Redo => {
                self.session.redo();
            }

            Message::ToggleMark(mark) => {
                self.session.toggle_mark(mark);
            }
            Message::SetBlockType(block_type) => {
                self.dropdowns.select(Dropdown::BlockType);
                self.session.set_block_type(block_type);
            }
            Message::SetAlignment(align) => {
                self.dropdowns.select(Dropdown::Alignment);
                self.session.set_alignment(align);
            }
            Message::Indent => {
                self.session.indent();
            }
            Message::Outdent => {
                self.session.outdent();
            }
            Message::PickTextColor => self.pick_color(COLOR, "Text Color"),
            Message::PickBackgroundColor => self.pick_color(BACKGROUND_COLOR, "Background Color"),
            Message::FontSizeStep(delta) => {
                self.session.step_font_size(delta);
            }
            Message::FontSizeEntered(value) => {
                if !self.session.set_font_size(&value) {
                    log::debug!("Ignored font size {:?}", value);
                }
                self.session.set_font_size_editing(false);
                if let Err(e) = self.widgets.text_editor.take_focus() {
                    log::debug!("Editor did not take focus: {}", e);
                }
            }
            Message::FontSizeEditing(editing) => self.session.set_font_size_editing(editing),
            Message::ClearFormatting => {
                self.session.clear_formatting();
            }
            Message::ToggleReadOnly => {
                self.session.toggle_read_only();
                self.dropdowns.close();
            }
            Message::ToggleDropdown(dropdown) => self.dropdowns.toggle(dropdown),
            Message::PointerPressed { x, y } => {
                let hit = self.widgets.toolbar.dropdown_hit(x, y);
                if !self.dropdowns.pointer_pressed(hit) {
                    self.view_dirty = false;
                }
            }

            Message::PatientFieldChanged(field, value) => {
                self.session.set_patient_field(field, &value);
                let name = self.session.patient().display_name();
                self.widgets.set_patient_banner(&name);
            }
            Message::ToggleDarkMode => self.toggle_dark_mode(),
        }
        true
    }

    /// Bring the widgets in line with the engine after a batch of messages,
    /// then pick up selection changes made in the editor widget.
    pub fn sync_view(&mut self) {
        if self.document_dirty.replace(false) {
            self.render_document();
            self.view_dirty = true;
        } else if let Some((anchor, focus)) = self.widget_selection() {
            if self.session.sync_selection(anchor, focus) {
                self.view_dirty = true;
            }
        }

        if std::mem::take(&mut self.view_dirty) {
            self.refresh_controls();
        }
    }

    fn widget_selection(&self) -> Option<(usize, usize)> {
        if self.buffer.buffer.length() as usize != self.session.editor_state().document.plain_text().len() {
            // Edits are still queued; the offsets would not match the model.
            return None;
        }
        Some(self.buffer.selection_chars(self.widgets.text_editor.insert_position()))
    }

    fn render_document(&mut self) {
        let rendered = render(&self.session.editor_state().document, &mut self.palette);
        if self.buffer.text() != rendered.text {
            self.buffer.set_text_silently(&rendered.text);
        }
        // Undo/redo may move the selection without touching the text.
        if let Some((anchor, focus)) = self.session.selection_offsets() {
            self.buffer.select_chars(anchor, focus);
            let caret = self.buffer.byte_offset(focus);
            self.widgets.text_editor.set_insert_position(caret);
            self.widgets.text_editor.show_insert_position();
        }
        self.buffer.set_styles(&rendered.styles);
        self.widgets
            .text_editor
            .set_highlight_data_ext(self.buffer.style_buffer.clone(), self.palette.entries().to_vec());
        self.widgets.text_editor.redraw();
    }

    fn refresh_controls(&mut self) {
        let toolbar_state = self.session.toolbar_state();
        self.editable.set(toolbar_state.is_editable);
        self.widgets.toolbar.refresh(
            &toolbar_state,
            &self.dropdowns,
            self.session.toolbar().is_font_size_editing(),
        );
        sync_read_only(&mut self.widgets.menu, !toolbar_state.is_editable);
        self.widgets.wind.redraw();
    }

    // --- Import / export ---

    fn remember_directory(&mut self, dir: &Path) {
        self.last_open_directory = Some(dir.to_string_lossy().to_string());
        self.settings.last_open_directory = self.last_open_directory.clone();
        if let Err(e) = self.settings.save() {
            log::warn!("Failed to save settings: {}", e);
        }
    }

    /// Pick a file and read it on a worker thread; the contents come back as
    /// [`Message::ImportLoaded`].
    pub fn import_document(&mut self) {
        let Some(path) = choose_import_file(self.last_open_directory.as_deref()) else {
            return;
        };
        if let Some(parent) = path.parent() {
            self.remember_directory(parent);
        }
        log::info!("Importing {}", path.display());
        let sender = self.sender;
        std::thread::spawn(move || {
            let contents = document_io::read_import(&path).map_err(|e| e.to_string());
            sender.send(Message::ImportLoaded(contents));
            app::awake();
        });
    }

    pub fn export_document(&mut self) -> Option<PathBuf> {
        let dir = choose_export_dir(self.last_open_directory.as_deref())?;
        self.remember_directory(&dir);
        self.session.export_to_dir(&dir)
    }

    // --- Toolbar pickers ---

    fn pick_color(&mut self, key: &str, title: &str) {
        if !self.session.is_editable() {
            return;
        }
        if let Some((r, g, b)) = dialog::color_chooser(title, ColorMode::Rgb) {
            self.session.apply_style(key, Some(&style::format_hex_color(r, g, b)));
        }
    }

    // --- View ---

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
        apply_theme(&mut self.widgets, self.dark_mode);
        self.palette.reconfigure(self.settings.default_font_size, self.dark_mode);
        self.document_dirty.set(true);

        self.settings.dark_mode = self.dark_mode;
        if let Err(e) = self.settings.save() {
            log::warn!("Failed to save settings: {}", e);
        }
    }

    /// Handle quit request. Returns `true` if the app should exit.
    pub fn quit(&mut self) -> bool {
        if let Err(e) = self.settings.save() {
            log::warn!("Failed to save settings on exit: {}", e);
        }
        log::info!("Shutting down");
        true
    }
}
