use fltk::{
    app::Sender,
    enums::{Align, CallbackTrigger, Color, FrameType},
    frame::Frame,
    group::Flex,
    input::{Input, IntInput},
    menu::Choice,
    prelude::*,
};

use crate::app::domain::messages::Message;
use crate::app::domain::patient::{FieldKind, PatientField};

const FIELDS_PER_ROW: usize = 3;
const LABEL_HEIGHT: i32 = 16;
const INPUT_HEIGHT: i32 = 26;
pub const FORM_HEIGHT: i32 = 3 * (LABEL_HEIGHT + INPUT_HEIGHT + 6) + 12;

pub struct MetadataForm {
    pub container: Flex,
    labels: Vec<Frame>,
}

/// Add the input widget for `field` to the current group.
fn field_input(field: PatientField, sender: &Sender<Message>) {
    let s = *sender;
    match field.kind() {
        FieldKind::Choice(choices) => {
            let mut choice = Choice::default();
            for (_, label) in choices {
                choice.add_choice(label);
            }
            choice.set_callback(move |c| {
                let value = usize::try_from(c.value())
                    .ok()
                    .and_then(|i| choices.get(i))
                    .map(|(code, _)| *code)
                    .unwrap_or("");
                s.send(Message::PatientFieldChanged(field, value.to_string()));
            });
        }
        FieldKind::Number => {
            let mut input = IntInput::default();
            input.set_trigger(CallbackTrigger::Changed);
            input.set_callback(move |i| s.send(Message::PatientFieldChanged(field, i.value())));
        }
        FieldKind::Text | FieldKind::Date => {
            let mut input = Input::default();
            if field.kind() == FieldKind::Date {
                input.set_tooltip("YYYY-MM-DD");
            }
            input.set_trigger(CallbackTrigger::Changed);
            input.set_callback(move |i| s.send(Message::PatientFieldChanged(field, i.value())));
        }
    }
}

impl MetadataForm {
    /// Build the form inside the current group: labeled inputs in rows of three.
    pub fn new(sender: &Sender<Message>) -> Self {
        let mut container = Flex::default().column();
        container.set_margin(6);
        container.set_pad(6);
        container.set_frame(FrameType::FlatBox);

        let mut labels = Vec::new();
        for row_fields in PatientField::ALL.chunks(FIELDS_PER_ROW) {
            let mut row = Flex::default().row();
            row.set_pad(10);
            for field in row_fields {
                let mut cell = Flex::default().column();
                cell.set_pad(2);
                let mut label = Frame::default().with_label(field.label());
                label.set_align(Align::Left | Align::Inside);
                label.set_label_size(11);
                cell.fixed(&label, LABEL_HEIGHT);
                field_input(*field, sender);
                cell.end();
                labels.push(label);
            }
            row.end();
            container.fixed(&row, LABEL_HEIGHT + INPUT_HEIGHT + 2);
        }
        container.end();

        Self { container, labels }
    }

    pub fn apply_theme(&mut self, is_dark: bool) {
        let (bg, fg) = if is_dark {
            (Color::from_rgb(30, 30, 30), Color::from_rgb(200, 200, 200))
        } else {
            (Color::from_rgb(250, 250, 250), Color::from_rgb(80, 80, 80))
        };
        self.container.set_color(bg);
        for label in &mut self.labels {
            label.set_label_color(fg);
        }
        self.container.redraw();
    }
}
