use fltk::{
    app::Sender,
    enums::Shortcut,
    menu::{MenuBar, MenuFlag},
    prelude::*,
};

use crate::app::domain::blocks::{BlockType, ElementFormat};
use crate::app::domain::marks::TextMark;
use crate::app::domain::messages::Message;

pub const READ_ONLY_ITEM: &str = "View/Read-only";

fn mark_shortcut(mark: TextMark) -> Shortcut {
    match mark {
        TextMark::Bold => Shortcut::Ctrl | 'b',
        TextMark::Italic => Shortcut::Ctrl | 'i',
        TextMark::Underline => Shortcut::Ctrl | 'u',
        TextMark::Strikethrough => Shortcut::Ctrl | Shortcut::Shift | 'x',
        TextMark::Code => Shortcut::Ctrl | 'e',
    }
}

fn mark_menu_name(mark: TextMark) -> &'static str {
    match mark {
        TextMark::Bold => "Bold",
        TextMark::Italic => "Italic",
        TextMark::Underline => "Underline",
        TextMark::Strikethrough => "Strikethrough",
        TextMark::Code => "Code",
    }
}

pub fn build_menu(menu: &mut MenuBar, sender: &Sender<Message>, initial_dark_mode: bool) {
    let s = sender;

    // File
    menu.add("File/Import JSON...", Shortcut::Ctrl | 'o', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::ImportDocument) });
    menu.add("File/Export JSON...", Shortcut::Ctrl | 's', MenuFlag::MenuDivider, { let s = *s; move |_| s.send(Message::ExportDocument) });
    menu.add("File/Quit", Shortcut::Ctrl | 'q', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::FileQuit) });

    // Edit
    menu.add("Edit/Undo", Shortcut::Ctrl | 'z', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::Undo) });
    menu.add("Edit/Redo", Shortcut::Ctrl | Shortcut::Shift | 'z', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::Redo) });

    // Format
    for mark in TextMark::ALL {
        let path = format!("Format/{}", mark_menu_name(mark));
        menu.add(&path, mark_shortcut(mark), MenuFlag::Normal, { let s = *s; move |_| s.send(Message::ToggleMark(mark)) });
    }
    for block_type in BlockType::ALL {
        let path = format!("Format/Block Type/{}", block_type.display_name());
        menu.add(&path, Shortcut::None, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::SetBlockType(block_type)) });
    }
    for align in ElementFormat::ALL {
        let path = format!("Format/Align/{}", align.display_name());
        menu.add(&path, Shortcut::None, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::SetAlignment(align)) });
    }
    menu.add("Format/Indent", Shortcut::Ctrl | ']', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::Indent) });
    menu.add("Format/Outdent", Shortcut::Ctrl | '[', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::Outdent) });
    menu.add("Format/Clear Formatting", Shortcut::Ctrl | '\\', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::ClearFormatting) });

    // View
    let dm_flag = if initial_dark_mode { MenuFlag::Toggle | MenuFlag::Value } else { MenuFlag::Toggle };
    menu.add("View/Toggle Dark Mode", Shortcut::None, dm_flag, { let s = *s; move |_| s.send(Message::ToggleDarkMode) });
    menu.add(READ_ONLY_ITEM, Shortcut::Ctrl | Shortcut::Shift | 'r', MenuFlag::Toggle, { let s = *s; move |_| s.send(Message::ToggleReadOnly) });
}

/// Keep the read-only check mark in step with the editor.
pub fn sync_read_only(menu: &mut MenuBar, read_only: bool) {
    if let Some(mut item) = menu.find_item(READ_ONLY_ITEM) {
        if read_only {
            item.set();
        } else {
            item.clear();
        }
    }
}
