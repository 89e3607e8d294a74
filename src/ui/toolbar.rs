use fltk::{
    app::Sender,
    button::{Button, ToggleButton},
    enums::{Align, CallbackTrigger, Color, Event, Font, FrameType},
    frame::Frame,
    group::{Flex, Group},
    input::Input,
    prelude::*,
};

use crate::app::controllers::dropdown::{Dropdown, DropdownState};
use crate::app::controllers::toolbar::ToolbarState;
use crate::app::domain::blocks::{BlockType, ElementFormat};
use crate::app::domain::marks::TextMark;
use crate::app::domain::messages::Message;
use crate::app::domain::style::{self, DEFAULT_BACKGROUND_COLOR, DEFAULT_FONT_COLOR};

pub const TOOLBAR_HEIGHT: i32 = 34;
const ITEM_HEIGHT: i32 = 26;
const PANEL_WIDTH: i32 = 130;

fn hex_to_color(value: &str, fallback: &str) -> Color {
    let (r, g, b) = style::parse_hex_color(value)
        .or_else(|| style::parse_hex_color(fallback))
        .unwrap_or((0, 0, 0));
    Color::from_rgb(r, g, b)
}

fn tool_button(label: &str, tooltip: &str, message: Message, sender: &Sender<Message>) -> Button {
    let mut button = Button::default().with_label(label);
    button.set_tooltip(tooltip);
    button.set_frame(FrameType::FlatBox);
    button.set_callback({
        let s = *sender;
        move |_| s.send(message.clone())
    });
    button
}

/// Pop-up list shown under a dropdown trigger button.
pub struct DropdownPanel<T> {
    pub group: Group,
    items: Vec<(T, Button, &'static str)>,
}

impl<T: Copy + PartialEq> DropdownPanel<T> {
    fn build(entries: &[(T, &'static str)], sender: &Sender<Message>, message: fn(T) -> Message) -> Self {
        let height = ITEM_HEIGHT * entries.len() as i32;
        let mut group = Group::new(0, 0, PANEL_WIDTH, height, None);
        group.set_frame(FrameType::BorderBox);
        group.set_color(Color::White);
        let mut items = Vec::new();
        for (i, (value, name)) in entries.iter().enumerate() {
            let mut item = Button::new(0, ITEM_HEIGHT * i as i32, PANEL_WIDTH, ITEM_HEIGHT, None);
            item.set_label(name);
            item.set_frame(FrameType::FlatBox);
            item.set_align(Align::Left | Align::Inside);
            item.set_callback({
                let s = *sender;
                let msg = message(*value);
                move |_| s.send(msg.clone())
            });
            items.push((*value, item, *name));
        }
        group.end();
        group.hide();
        Self { group, items }
    }

    /// Show under `trigger` with a check mark next to `current`.
    fn open_below(&mut self, trigger: &Button, current: T) {
        self.group.resize(trigger.x(), trigger.y() + trigger.h(), self.group.w(), self.group.h());
        for (value, item, name) in &mut self.items {
            let label = if *value == current { format!("{} \u{2713}", name) } else { name.to_string() };
            item.set_label(&label);
        }
        self.group.show();
        self.group.redraw();
    }

    fn close(&mut self) {
        if self.group.visible() {
            self.group.hide();
            if let Some(mut parent) = self.group.parent() {
                parent.redraw();
            }
        }
    }
}

pub struct ToolbarWidgets {
    pub row: Flex,
    undo: Button,
    redo: Button,
    block_type: Button,
    marks: Vec<(TextMark, ToggleButton)>,
    font_smaller: Button,
    font_size: Input,
    font_larger: Button,
    text_color: Button,
    bg_color: Button,
    alignment: Button,
    outdent: Button,
    indent: Button,
    clear: Button,
    read_only: ToggleButton,
    block_panel: Option<DropdownPanel<BlockType>>,
    align_panel: Option<DropdownPanel<ElementFormat>>,
}

impl ToolbarWidgets {
    /// Build the toolbar row inside the current group.
    pub fn new(sender: &Sender<Message>) -> Self {
        let mut row = Flex::default().row();
        row.set_margin(4);
        row.set_pad(2);

        let undo = tool_button("Undo", "Undo (Ctrl+Z)", Message::Undo, sender);
        row.fixed(&undo, 48);
        let redo = tool_button("Redo", "Redo (Ctrl+Shift+Z)", Message::Redo, sender);
        row.fixed(&redo, 48);

        let mut block_type = tool_button(
            "Normal \u{25be}",
            "Block type",
            Message::ToggleDropdown(Dropdown::BlockType),
            sender,
        );
        block_type.set_frame(FrameType::ThinUpBox);
        row.fixed(&block_type, 110);

        let mut marks = Vec::new();
        for mark in TextMark::ALL {
            let mut button = ToggleButton::default().with_label(mark.button_label());
            button.set_tooltip(mark.as_str());
            button.set_frame(FrameType::ThinUpBox);
            button.set_label_font(match mark {
                TextMark::Bold => Font::HelveticaBold,
                TextMark::Italic => Font::HelveticaItalic,
                TextMark::Code => Font::Courier,
                _ => Font::Helvetica,
            });
            button.set_callback({
                let s = *sender;
                move |_| s.send(Message::ToggleMark(mark))
            });
            row.fixed(&button, 30);
            marks.push((mark, button));
        }

        let font_smaller = tool_button("-", "Decrease font size", Message::FontSizeStep(-1), sender);
        row.fixed(&font_smaller, 24);
        let mut font_size = Input::default();
        font_size.set_tooltip("Font size (px)");
        font_size.set_trigger(CallbackTrigger::EnterKeyAlways);
        font_size.set_callback({
            let s = *sender;
            move |input| s.send(Message::FontSizeEntered(input.value()))
        });
        font_size.handle({
            let s = *sender;
            move |_, event| {
                match event {
                    Event::Focus => s.send(Message::FontSizeEditing(true)),
                    Event::Unfocus => s.send(Message::FontSizeEditing(false)),
                    _ => {}
                }
                false
            }
        });
        row.fixed(&font_size, 44);
        let font_larger = tool_button("+", "Increase font size", Message::FontSizeStep(1), sender);
        row.fixed(&font_larger, 24);

        let mut text_color = tool_button("A", "Text color", Message::PickTextColor, sender);
        text_color.set_frame(FrameType::ThinUpBox);
        text_color.set_label_font(Font::HelveticaBold);
        row.fixed(&text_color, 30);
        let mut bg_color = tool_button("", "Background color", Message::PickBackgroundColor, sender);
        bg_color.set_frame(FrameType::ThinUpBox);
        row.fixed(&bg_color, 30);

        let mut alignment = tool_button(
            "Left \u{25be}",
            "Alignment",
            Message::ToggleDropdown(Dropdown::Alignment),
            sender,
        );
        alignment.set_frame(FrameType::ThinUpBox);
        row.fixed(&alignment, 90);

        let outdent = tool_button("\u{21e4}", "Outdent (Shift+Tab)", Message::Outdent, sender);
        row.fixed(&outdent, 30);
        let indent = tool_button("\u{21e5}", "Indent (Tab)", Message::Indent, sender);
        row.fixed(&indent, 30);
        let clear = tool_button("Clear", "Clear formatting", Message::ClearFormatting, sender);
        row.fixed(&clear, 48);

        Frame::default();

        let mut read_only = ToggleButton::default().with_label("Read-only");
        read_only.set_frame(FrameType::ThinUpBox);
        read_only.set_callback({
            let s = *sender;
            move |_| s.send(Message::ToggleReadOnly)
        });
        row.fixed(&read_only, 80);

        row.end();

        Self {
            row,
            undo,
            redo,
            block_type,
            marks,
            font_smaller,
            font_size,
            font_larger,
            text_color,
            bg_color,
            alignment,
            outdent,
            indent,
            clear,
            read_only,
            block_panel: None,
            align_panel: None,
        }
    }

    /// Create the dropdown panels. Must be called with the window as the
    /// current group, after the main layout, so they draw on top.
    pub fn build_panels(&mut self, sender: &Sender<Message>) {
        let block_entries: Vec<_> = BlockType::ALL.iter().map(|t| (*t, t.display_name())).collect();
        self.block_panel = Some(DropdownPanel::build(&block_entries, sender, Message::SetBlockType));
        let align_entries: Vec<_> = ElementFormat::ALL.iter().map(|a| (*a, a.display_name())).collect();
        self.align_panel = Some(DropdownPanel::build(&align_entries, sender, Message::SetAlignment));
    }

    /// Which dropdown's trigger or open panel contains the window point.
    pub fn dropdown_hit(&self, x: i32, y: i32) -> Option<Dropdown> {
        if contains(&self.block_type, x, y) || self.block_panel.as_ref().is_some_and(|p| contains(&p.group, x, y)) {
            return Some(Dropdown::BlockType);
        }
        if contains(&self.alignment, x, y) || self.align_panel.as_ref().is_some_and(|p| contains(&p.group, x, y)) {
            return Some(Dropdown::Alignment);
        }
        None
    }

    /// Bring every widget in line with the toolbar state.
    pub fn refresh(&mut self, state: &ToolbarState, dropdowns: &DropdownState, font_size_editing: bool) {
        let editable = state.is_editable;

        set_active(&mut self.undo, editable && state.can_undo);
        set_active(&mut self.redo, editable && state.can_redo);

        self.block_type
            .set_label(&format!("{} \u{25be}", state.block_type.display_name()));
        self.alignment
            .set_label(&format!("{} \u{25be}", state.alignment.display_name()));

        for (mark, button) in &mut self.marks {
            button.set_value(state.is_active(*mark));
            set_active(button, editable);
        }

        if !font_size_editing {
            self.font_size.set_value(state.font_size.trim_end_matches("px"));
        }

        let fg = hex_to_color(&state.font_color, DEFAULT_FONT_COLOR);
        self.text_color.set_label_color(fg);
        self.text_color.set_tooltip(&format!("Text color ({})", display_value(&state.font_color)));
        self.bg_color.set_color(hex_to_color(&state.bg_color, DEFAULT_BACKGROUND_COLOR));
        self.bg_color.set_tooltip(&format!("Background color ({})", display_value(&state.bg_color)));

        for button in [
            &mut self.block_type,
            &mut self.font_smaller,
            &mut self.font_larger,
            &mut self.text_color,
            &mut self.bg_color,
            &mut self.alignment,
            &mut self.outdent,
            &mut self.indent,
            &mut self.clear,
        ] {
            set_active(button, editable);
        }
        set_active(&mut self.font_size, editable);

        self.read_only.set_value(!editable);

        if let Some(panel) = self.block_panel.as_mut() {
            if dropdowns.is_open(Dropdown::BlockType) && editable {
                panel.open_below(&self.block_type, state.block_type);
            } else {
                panel.close();
            }
        }
        if let Some(panel) = self.align_panel.as_mut() {
            if dropdowns.is_open(Dropdown::Alignment) && editable {
                panel.open_below(&self.alignment, state.alignment);
            } else {
                panel.close();
            }
        }

        self.row.redraw();
    }

    pub fn apply_theme(&mut self, is_dark: bool) {
        let (bg, fg) = if is_dark {
            (Color::from_rgb(35, 35, 35), Color::from_rgb(220, 220, 220))
        } else {
            (Color::from_rgb(245, 245, 245), Color::Black)
        };
        self.row.set_color(bg);
        for button in [&mut self.undo, &mut self.redo, &mut self.font_smaller, &mut self.font_larger] {
            button.set_color(bg);
            button.set_label_color(fg);
        }
        for (_, button) in &mut self.marks {
            button.set_label_color(fg);
        }
        self.row.redraw();
    }
}

fn display_value(value: &str) -> &str {
    if value.is_empty() { "mixed" } else { value }
}

fn contains<W: WidgetExt>(widget: &W, x: i32, y: i32) -> bool {
    widget.visible() && x >= widget.x() && x < widget.x() + widget.w() && y >= widget.y() && y < widget.y() + widget.h()
}

fn set_active<W: WidgetExt>(widget: &mut W, active: bool) {
    if active {
        widget.activate();
    } else {
        widget.deactivate();
    }
}
