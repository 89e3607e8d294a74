use fltk::{app, enums::Event, prelude::*};

use chart_pad::app::domain::messages::Message;
use chart_pad::app::domain::settings::AppSettings;
use chart_pad::app::infrastructure::logging;
use chart_pad::app::state::AppState;
use chart_pad::ui::main_window::build_main_window;
use chart_pad::ui::menu::build_menu;

fn main() {
    let settings = AppSettings::load();

    // Keep the handle alive for the whole run or file logging stops.
    let _logger = match logging::init(&AppSettings::log_dir(), &settings.log_level) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Failed to start logging: {}", e);
            None
        }
    };
    log::info!("Starting ChartPad {}", env!("CARGO_PKG_VERSION"));

    let app = app::App::default();
    let (sender, receiver) = app::channel::<Message>();

    let mut widgets = build_main_window(&sender);
    build_menu(&mut widgets.menu, &sender, settings.dark_mode);

    widgets.wind.set_callback({
        let s = sender;
        move |_| {
            if app::event() == Event::Close {
                s.send(Message::WindowClose);
            }
        }
    });
    widgets.wind.show();

    let mut state = AppState::new(widgets, sender, settings);

    while app.wait() {
        let mut quit = false;
        while let Some(msg) = receiver.recv() {
            if !state.handle(msg) {
                quit = true;
                break;
            }
        }
        if quit {
            app.quit();
            break;
        }
        state.sync_view();
    }
}
