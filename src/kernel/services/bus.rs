use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    SaveTimerFired { path: PathBuf, generation: u64 },
    ExternalChange { path: PathBuf },
    ExternalRemoval { path: PathBuf },
    StatusRefresh { path: PathBuf },
}

#[derive(Clone)]
pub struct EngineBusSender {
    tx: Sender<EngineMessage>,
}

pub struct EngineBusReceiver {
    rx: Receiver<EngineMessage>,
}

pub fn engine_bus() -> (EngineBusSender, EngineBusReceiver) {
    let (tx, rx) = mpsc::channel();
    (EngineBusSender { tx }, EngineBusReceiver { rx })
}

impl EngineBusSender {
    pub fn send(&self, msg: EngineMessage) -> Result<(), mpsc::SendError<EngineMessage>> {
        self.tx.send(msg)
    }
}

impl EngineBusReceiver {
    pub fn try_recv(&mut self) -> Result<EngineMessage, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<EngineMessage, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub fn drain(&mut self) -> Vec<EngineMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            out.push(msg);
        }
        out
    }
}
