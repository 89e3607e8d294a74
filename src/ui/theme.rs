use fltk::{enums::Color, prelude::*};

use super::main_window::MainWidgets;

pub fn apply_theme(widgets: &mut MainWidgets, is_dark: bool) {
    let (header_bg, shell_bg, shell_fg) = if is_dark {
        (Color::from_rgb(20, 40, 60), Color::from_rgb(32, 32, 32), Color::from_rgb(220, 220, 220))
    } else {
        (Color::from_rgb(0, 94, 140), Color::from_rgb(236, 241, 245), Color::from_rgb(40, 40, 40))
    };

    let editor = &mut widgets.text_editor;
    if is_dark {
        editor.set_color(Color::from_rgb(30, 30, 30));
        editor.set_text_color(Color::from_rgb(220, 220, 220));
        editor.set_cursor_color(Color::from_rgb(255, 255, 255));
        editor.set_selection_color(Color::from_rgb(70, 70, 100));
        widgets.menu.set_color(Color::from_rgb(35, 35, 35));
        widgets.menu.set_text_color(Color::from_rgb(220, 220, 220));
        widgets.menu.set_selection_color(Color::from_rgb(60, 60, 60));
    } else {
        editor.set_color(Color::White);
        editor.set_text_color(Color::Black);
        editor.set_cursor_color(Color::Black);
        editor.set_selection_color(Color::from_rgb(173, 216, 230));
        widgets.menu.set_color(Color::from_rgb(240, 240, 240));
        widgets.menu.set_text_color(Color::Black);
        widgets.menu.set_selection_color(Color::from_rgb(200, 200, 200));
    }

    let header = &mut widgets.header;
    header.bar.set_color(header_bg);
    for frame in [&mut header.logo, &mut header.user_name, &mut header.user_details] {
        frame.set_label_color(Color::White);
    }
    header.avatar.set_label_color(Color::White);

    widgets.sidebar.set_color(shell_bg);
    for item in &mut widgets.sidebar_items {
        item.set_label_color(shell_fg);
    }
    widgets.wind.set_color(shell_bg);
    widgets.patient_banner.set_label_color(shell_fg);

    widgets.form.apply_theme(is_dark);
    widgets.toolbar.apply_theme(is_dark);

    widgets.wind.redraw();
}
