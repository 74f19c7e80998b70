//! Service ports: traits + data contracts.

pub mod config;
pub mod file;
pub mod settings;
pub mod status;
pub mod timer;
pub mod widget;

pub use config::EngineConfig;
pub use file::{FileError, FileStore, Result as FileResult};
pub use settings::{SessionSettings, Settings};
pub use status::{NoopStatusRefresher, StatusRefresher};
pub use timer::{SaveTimer, SaveTimerRequest, TimerHandle};
pub use widget::{DecorationId, ModelFactory, TextModel};
