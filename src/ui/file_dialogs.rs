use std::path::{Path, PathBuf};

use fltk::dialog;

pub const JSON_FILTER: &str = "*.json";

fn start_dir(last_dir: Option<&str>) -> String {
    last_dir
        .filter(|d| Path::new(d).is_dir())
        .unwrap_or(".")
        .to_string()
}

/// Ask for a `.json` file to import. `None` when cancelled.
pub fn choose_import_file(last_dir: Option<&str>) -> Option<PathBuf> {
    dialog::file_chooser("Import Document", JSON_FILTER, &start_dir(last_dir), false).map(PathBuf::from)
}

/// Ask for the directory the export file is written into. `None` when cancelled.
pub fn choose_export_dir(last_dir: Option<&str>) -> Option<PathBuf> {
    dialog::dir_chooser("Export Document To", &start_dir(last_dir), false).map(PathBuf::from)
}
