//! Save timer implementations.
//!
//! `TokioSaveTimer` sleeps on the runtime and reports back over the engine bus.
//! `ManualSaveTimer` only records requests; the owner decides when they fire,
//! which keeps debounce behavior deterministic in tests and replays.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::kernel::services::ports::{SaveTimer, SaveTimerRequest, TimerHandle};
use crate::kernel::services::{EngineBusSender, EngineMessage};

pub struct TokioSaveTimer {
    handle: tokio::runtime::Handle,
    tx: EngineBusSender,
}

impl TokioSaveTimer {
    pub fn new(handle: tokio::runtime::Handle, tx: EngineBusSender) -> Self {
        Self { handle, tx }
    }
}

struct TokioTimerHandle(tokio::task::JoinHandle<()>);

impl TimerHandle for TokioTimerHandle {
    fn cancel(&mut self) {
        self.0.abort();
    }
}

impl SaveTimer for TokioSaveTimer {
    fn start(&self, request: SaveTimerRequest) -> Box<dyn TimerHandle> {
        let tx = self.tx.clone();
        let task = self.handle.spawn(async move {
            tokio::time::sleep(request.delay).await;
            let _ = tx.send(EngineMessage::SaveTimerFired {
                path: request.path,
                generation: request.generation,
            });
        });
        Box::new(TokioTimerHandle(task))
    }
}

struct ManualEntry {
    request: SaveTimerRequest,
    cancelled: Arc<AtomicBool>,
    fired: bool,
}

#[derive(Default)]
pub struct ManualSaveTimer {
    entries: Mutex<Vec<ManualEntry>>,
}

struct ManualTimerHandle(Arc<AtomicBool>);

impl TimerHandle for ManualTimerHandle {
    fn cancel(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl ManualSaveTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request ever started, cancelled or not.
    pub fn requests(&self) -> Vec<SaveTimerRequest> {
        self.entries
            .lock()
            .map(|entries| entries.iter().map(|e| e.request.clone()).collect())
            .unwrap_or_default()
    }

    /// Requests that are neither cancelled nor fired yet.
    pub fn active(&self) -> Vec<SaveTimerRequest> {
        self.entries
            .lock()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| !e.fired && !e.cancelled.load(Ordering::SeqCst))
                    .map(|e| e.request.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Fires every active request, in start order.
    pub fn fire_all(&self) -> Vec<EngineMessage> {
        let Ok(mut entries) = self.entries.lock() else {
            return Vec::new();
        };
        entries
            .iter_mut()
            .filter(|e| !e.fired && !e.cancelled.load(Ordering::SeqCst))
            .map(|e| {
                e.fired = true;
                EngineMessage::SaveTimerFired {
                    path: e.request.path.clone(),
                    generation: e.request.generation,
                }
            })
            .collect()
    }
}

impl SaveTimer for ManualSaveTimer {
    fn start(&self, request: SaveTimerRequest) -> Box<dyn TimerHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(ManualEntry {
                request,
                cancelled: Arc::clone(&cancelled),
                fired: false,
            });
        }
        Box::new(ManualTimerHandle(cancelled))
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/timer.rs"]
mod tests;
