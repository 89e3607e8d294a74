pub mod file_dialogs;
pub mod main_window;
pub mod menu;
pub mod metadata_form;
pub mod render;
pub mod theme;
pub mod toolbar;
