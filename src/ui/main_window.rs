use fltk::{
    app::Sender,
    button::Button,
    enums::{Align, Event, Font, FrameType},
    frame::Frame,
    group::Flex,
    menu::MenuBar,
    prelude::*,
    text::TextEditor,
    window::Window,
};

use super::metadata_form::{FORM_HEIGHT, MetadataForm};
use super::toolbar::{TOOLBAR_HEIGHT, ToolbarWidgets};
use crate::app::domain::messages::Message;

pub const HEADER_HEIGHT: i32 = 56;
pub const SIDEBAR_WIDTH: i32 = 180;
const MENU_HEIGHT: i32 = 28;
const CONTENT_HEADER_HEIGHT: i32 = 34;

pub const CLINIC_NAME: &str = "ALU-TUCP Medical Center";
pub const USER_NAME: &str = "Dr. Senku Ishigami";
pub const USER_DETAILS: &str = "40xxi  \u{b7}  icoxxi";
const SIDEBAR_ITEMS: [&str; 4] = ["Dashboard", "Patients", "Records", "Schedule"];

pub struct HeaderWidgets {
    pub bar: Flex,
    pub logo: Frame,
    pub user_name: Frame,
    pub user_details: Frame,
    pub avatar: Frame,
}

pub struct MainWidgets {
    pub wind: Window,
    pub menu: MenuBar,
    pub header: HeaderWidgets,
    pub sidebar: Flex,
    pub sidebar_items: Vec<Frame>,
    pub patient_banner: Frame,
    pub import_button: Button,
    pub export_button: Button,
    pub form: MetadataForm,
    pub toolbar: ToolbarWidgets,
    pub text_editor: TextEditor,
}

fn build_header() -> HeaderWidgets {
    let mut bar = Flex::default().row();
    bar.set_margin(8);
    bar.set_frame(FrameType::FlatBox);

    let mut logo = Frame::default().with_label(&format!("\u{271a}  {}", CLINIC_NAME));
    logo.set_label_font(Font::HelveticaBold);
    logo.set_label_size(18);
    logo.set_align(Align::Left | Align::Inside);
    bar.fixed(&logo, 320);

    Frame::default();

    let mut profile = Flex::default().column();
    let mut user_name = Frame::default().with_label(USER_NAME);
    user_name.set_label_font(Font::HelveticaBold);
    user_name.set_align(Align::Right | Align::Inside);
    let mut user_details = Frame::default().with_label(USER_DETAILS);
    user_details.set_label_size(11);
    user_details.set_align(Align::Right | Align::Inside);
    profile.end();
    bar.fixed(&profile, 200);

    let mut avatar = Frame::default().with_label("SI");
    avatar.set_frame(FrameType::OFlatFrame);
    avatar.set_label_font(Font::HelveticaBold);
    bar.fixed(&avatar, 40);

    bar.end();
    HeaderWidgets {
        bar,
        logo,
        user_name,
        user_details,
        avatar,
    }
}

fn build_sidebar() -> (Flex, Vec<Frame>) {
    let mut sidebar = Flex::default().column();
    sidebar.set_margin(10);
    sidebar.set_pad(4);
    sidebar.set_frame(FrameType::FlatBox);
    let mut items = Vec::new();
    for name in SIDEBAR_ITEMS {
        let mut item = Frame::default().with_label(name);
        item.set_align(Align::Left | Align::Inside);
        sidebar.fixed(&item, 30);
        items.push(item);
    }
    Frame::default();
    sidebar.end();
    (sidebar, items)
}

pub fn build_main_window(sender: &Sender<Message>) -> MainWidgets {
    let mut wind = Window::new(100, 100, 1100, 760, "ChartPad");
    wind.set_xclass("ChartPad");

    let mut flex = Flex::new(0, 0, 1100, 760, None);
    flex.set_type(fltk::group::FlexType::Column);

    let menu = MenuBar::new(0, 0, 0, MENU_HEIGHT, "");
    flex.fixed(&menu, MENU_HEIGHT);

    let header = build_header();
    flex.fixed(&header.bar, HEADER_HEIGHT);

    let mut body = Flex::default().row();
    let (sidebar, sidebar_items) = build_sidebar();
    body.fixed(&sidebar, SIDEBAR_WIDTH);

    let mut content = Flex::default().column();
    content.set_margin(8);
    content.set_pad(4);

    let mut content_header = Flex::default().row();
    let mut patient_banner = Frame::default().with_label("New record");
    patient_banner.set_label_font(Font::HelveticaBold);
    patient_banner.set_align(Align::Left | Align::Inside);
    let mut import_button = Button::default().with_label("Import");
    import_button.set_callback({
        let s = *sender;
        move |_| s.send(Message::ImportDocument)
    });
    content_header.fixed(&import_button, 70);
    let mut export_button = Button::default().with_label("Export");
    export_button.set_callback({
        let s = *sender;
        move |_| s.send(Message::ExportDocument)
    });
    content_header.fixed(&export_button, 70);
    content_header.end();
    content.fixed(&content_header, CONTENT_HEADER_HEIGHT);

    let form = MetadataForm::new(sender);
    content.fixed(&form.container, FORM_HEIGHT);

    let mut toolbar = ToolbarWidgets::new(sender);
    content.fixed(&toolbar.row, TOOLBAR_HEIGHT);

    let mut text_editor = TextEditor::new(0, 0, 0, 0, "");
    text_editor.wrap_mode(fltk::text::WrapMode::AtBounds, 0);
    text_editor.set_frame(FrameType::BorderBox);

    content.end();
    body.end();
    flex.end();

    toolbar.build_panels(sender);
    wind.end();
    wind.resizable(&flex);

    wind.handle({
        let s = *sender;
        move |_, event| {
            if event == Event::Push {
                s.send(Message::PointerPressed {
                    x: fltk::app::event_x(),
                    y: fltk::app::event_y(),
                });
            }
            false
        }
    });

    MainWidgets {
        wind,
        menu,
        header,
        sidebar,
        sidebar_items,
        patient_banner,
        import_button,
        export_button,
        form,
        toolbar,
        text_editor,
    }
}

impl MainWidgets {
    pub fn set_patient_banner(&mut self, display_name: &str) {
        let label = if display_name.is_empty() { "New record" } else { display_name };
        self.patient_banner.set_label(label);
        self.patient_banner.redraw();
    }
}
