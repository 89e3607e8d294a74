//! Toolbar selection state and toolbar commands.
//!
//! `ToolbarController` subscribes to engine updates and keeps a
//! [`ToolbarState`] in sync with the current selection. The UI reads that
//! state to decide which buttons look pressed, and routes button presses
//! back through the controller's command methods.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::app::domain::blocks::{BlockType, ElementFormat};
use crate::app::domain::marks::{MarkSet, TextMark};
use crate::app::domain::selection::Selection;
use crate::app::domain::style::{
    self, BACKGROUND_COLOR, CLEARABLE_PROPERTIES, COLOR, DEFAULT_BACKGROUND_COLOR,
    DEFAULT_FONT_COLOR, DEFAULT_FONT_SIZE, DEFAULT_FONT_SIZE_PX, FONT_SIZE, MIN_FONT_SIZE_PX,
};
use crate::app::services::engine::{EditorCommand, EditorEngine, EditorUpdate, Subscription};

/// What the toolbar shows for the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarState {
    pub marks: MarkSet,
    pub block_type: BlockType,
    pub alignment: ElementFormat,
    pub indent: u32,
    pub font_color: String,
    pub bg_color: String,
    /// Empty when the selection mixes sizes.
    pub font_size: String,
    pub is_editable: bool,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl Default for ToolbarState {
    fn default() -> Self {
        Self {
            marks: MarkSet::empty(),
            block_type: BlockType::Paragraph,
            alignment: ElementFormat::Left,
            indent: 0,
            font_color: DEFAULT_FONT_COLOR.to_string(),
            bg_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            font_size: DEFAULT_FONT_SIZE.to_string(),
            is_editable: true,
            can_undo: false,
            can_redo: false,
        }
    }
}

impl ToolbarState {
    pub fn is_active(&self, mark: TextMark) -> bool {
        self.marks.contains(mark)
    }
}

/// Bring `toolbar` in line with an engine update.
///
/// Editable and history flags always follow the update. Formatting fields
/// are only recomputed for range selections; node selections and a missing
/// selection leave them as they were. The font size is left alone while
/// the user is typing into the size input.
pub fn reconcile(toolbar: &mut ToolbarState, update: &EditorUpdate<'_>, font_size_editing: bool) {
    toolbar.is_editable = update.editable;
    toolbar.can_undo = update.can_undo;
    toolbar.can_redo = update.can_redo;

    let editor = update.state;
    if editor.range_selection().is_none() {
        return;
    }

    let (kind, align, indent) = editor.anchor_element();
    toolbar.block_type = BlockType::from_kind(kind);
    toolbar.alignment = align;
    toolbar.indent = indent;

    for mark in TextMark::ALL {
        toolbar.marks.set(mark, editor.selection_has_mark(mark));
    }

    toolbar.font_color = editor.selection_style_value(COLOR, DEFAULT_FONT_COLOR);
    toolbar.bg_color = editor.selection_style_value(BACKGROUND_COLOR, DEFAULT_BACKGROUND_COLOR);
    if !font_size_editing {
        toolbar.font_size = editor.selection_style_value(FONT_SIZE, DEFAULT_FONT_SIZE);
    }
}

/// Keeps a [`ToolbarState`] current and turns toolbar actions into engine
/// commands. Every command is a no-op while the editor is read-only.
pub struct ToolbarController {
    state: Rc<RefCell<ToolbarState>>,
    font_size_editing: Rc<Cell<bool>>,
    _subscription: Subscription,
}

impl ToolbarController {
    /// Subscribe to `engine`. The subscription ends when the controller is
    /// dropped.
    pub fn attach(engine: &mut dyn EditorEngine) -> Self {
        let state = Rc::new(RefCell::new(ToolbarState {
            is_editable: engine.is_editable(),
            can_undo: engine.can_undo(),
            can_redo: engine.can_redo(),
            ..ToolbarState::default()
        }));
        let font_size_editing = Rc::new(Cell::new(false));

        let subscription = engine.register_update_listener(Box::new({
            let state = state.clone();
            let editing = font_size_editing.clone();
            move |update: &EditorUpdate<'_>| reconcile(&mut state.borrow_mut(), update, editing.get())
        }));

        Self {
            state,
            font_size_editing,
            _subscription: subscription,
        }
    }

    pub fn state(&self) -> ToolbarState {
        self.state.borrow().clone()
    }

    /// Mark the font-size input as being edited (focus in) or not (focus out).
    pub fn set_font_size_editing(&self, editing: bool) {
        self.font_size_editing.set(editing);
    }

    pub fn is_font_size_editing(&self) -> bool {
        self.font_size_editing.get()
    }

    fn is_editable(&self) -> bool {
        self.state.borrow().is_editable
    }

    fn run(&self, engine: &mut dyn EditorEngine, command: EditorCommand) -> bool {
        if !self.is_editable() {
            log::debug!("Toolbar disabled, dropping {:?}", command);
            return false;
        }
        engine.dispatch(command)
    }

    pub fn toggle_mark(&self, engine: &mut dyn EditorEngine, mark: TextMark) -> bool {
        self.run(engine, EditorCommand::FormatText(mark))
    }

    /// Convert the selected blocks. Picking the type already shown is a no-op.
    pub fn set_block_type(&self, engine: &mut dyn EditorEngine, block_type: BlockType) -> bool {
        if self.state.borrow().block_type == block_type {
            return false;
        }
        self.run(engine, EditorCommand::SetBlocksType(block_type.to_kind()))
    }

    pub fn set_alignment(&self, engine: &mut dyn EditorEngine, align: ElementFormat) -> bool {
        self.run(engine, EditorCommand::FormatElement(align))
    }

    pub fn indent(&self, engine: &mut dyn EditorEngine) -> bool {
        self.run(engine, EditorCommand::Indent)
    }

    pub fn outdent(&self, engine: &mut dyn EditorEngine) -> bool {
        self.run(engine, EditorCommand::Outdent)
    }

    /// Set an inline style property on the selection, or remove it with `None`.
    pub fn apply_style(&self, engine: &mut dyn EditorEngine, key: &str, value: Option<&str>) -> bool {
        self.run(
            engine,
            EditorCommand::PatchStyle(key.to_string(), value.map(str::to_string)),
        )
    }

    /// Step the font size by `delta` pixels from the size currently shown.
    /// A mixed selection steps from the default size. Sizes at or below the
    /// minimum are refused.
    pub fn step_font_size(&self, engine: &mut dyn EditorEngine, delta: i32) -> bool {
        let current = style::parse_font_size(&self.state.borrow().font_size).unwrap_or(DEFAULT_FONT_SIZE_PX);
        let next = i64::from(current) + i64::from(delta);
        if next <= i64::from(MIN_FONT_SIZE_PX) {
            log::debug!("Font size {}px refused", next);
            return false;
        }
        let Ok(px) = u32::try_from(next) else {
            return false;
        };
        self.apply_style(engine, FONT_SIZE, Some(&style::format_font_size(px)))
    }

    /// Apply a size typed into the font-size input (`"18"` or `"18px"`).
    pub fn set_font_size(&self, engine: &mut dyn EditorEngine, entered: &str) -> bool {
        match style::parse_font_size(entered) {
            Some(px) if px > MIN_FONT_SIZE_PX => {
                self.apply_style(engine, FONT_SIZE, Some(&style::format_font_size(px)))
            }
            _ => {
                log::debug!("Ignoring font size input {:?}", entered);
                false
            }
        }
    }

    /// Strip inline styles and marks from the selection.
    ///
    /// Within a single block the selected text is replaced by one plain run.
    /// Across blocks every mark is removed from the selected runs in place.
    pub fn clear_formatting(&self, engine: &mut dyn EditorEngine) -> bool {
        if !self.is_editable() {
            return false;
        }
        let (single_block, text) = {
            let editor = engine.state();
            let Some(Selection::Range(range)) = &editor.selection else {
                return false;
            };
            (range.start().block == range.end().block, editor.selected_text())
        };

        for key in CLEARABLE_PROPERTIES {
            self.apply_style(engine, key, None);
        }
        if single_block {
            engine.dispatch(EditorCommand::ReplaceWithPlainText(text))
        } else {
            engine.dispatch(EditorCommand::ClearMarks)
        }
    }

    pub fn undo(&self, engine: &mut dyn EditorEngine) -> bool {
        self.run(engine, EditorCommand::Undo)
    }

    pub fn redo(&self, engine: &mut dyn EditorEngine) -> bool {
        self.run(engine, EditorCommand::Redo)
    }
}
