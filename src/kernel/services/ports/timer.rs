use std::path::PathBuf;
use std::time::Duration;

/// One debounce window for a path. `generation` identifies the edit that
/// armed the timer; a firing whose generation is stale is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTimerRequest {
    pub path: PathBuf,
    pub generation: u64,
    pub delay: Duration,
}

pub trait TimerHandle: Send {
    fn cancel(&mut self);
}

/// Starts delayed callbacks that report back as
/// [`EngineMessage::SaveTimerFired`](crate::kernel::services::EngineMessage).
pub trait SaveTimer: Send + Sync {
    fn start(&self, request: SaveTimerRequest) -> Box<dyn TimerHandle>;
}
