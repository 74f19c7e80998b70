//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod file;
pub mod file_watcher;
pub mod paths;
pub mod rope_model;
pub mod settings;
pub mod status;
pub mod timer;

pub use file::{LocalFileStore, MemoryFileStore};
pub use file_watcher::FileWatcherService;
pub use paths::{
    ensure_log_dir, ensure_session_dir, get_app_data_dir, get_log_dir, get_session_dir,
    get_session_file_path,
};
pub use rope_model::{RopeModel, RopeModelFactory};
pub use settings::{ensure_settings_file, get_settings_path, load_settings, parse_settings};
pub use status::BusStatusRefresher;
pub use timer::{ManualSaveTimer, TokioSaveTimer};
