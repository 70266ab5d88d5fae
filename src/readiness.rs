//! One-shot readiness signal for an external dependency.
//!
//! The producer reports `Ready` or `Unavailable` exactly once; consumers
//! wait for it with a fixed timeout. A timeout, an explicit failure and a
//! dropped producer all end in `Unavailable`.

use crate::error::{Result, ShowsError};
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessState {
    Pending,
    Ready,
    Unavailable(String),
}

/// Producer side. Consumed by the terminal call.
#[derive(Debug)]
pub struct ReadinessSignal {
    tx: watch::Sender<ReadinessState>,
}

/// Consumer side, cheap to clone into request handlers.
#[derive(Debug, Clone)]
pub struct ReadinessWatch {
    rx: watch::Receiver<ReadinessState>,
}

pub fn readiness() -> (ReadinessSignal, ReadinessWatch) {
    let (tx, rx) = watch::channel(ReadinessState::Pending);
    (ReadinessSignal { tx }, ReadinessWatch { rx })
}

impl ReadinessSignal {
    pub fn ready(self) {
        self.tx.send_replace(ReadinessState::Ready);
    }

    pub fn unavailable(self, reason: impl Into<String>) {
        self.tx.send_replace(ReadinessState::Unavailable(reason.into()));
    }
}

impl ReadinessWatch {
    /// A watch that is already `Ready`.
    pub fn ready_now() -> Self {
        let (signal, watch) = readiness();
        signal.ready();
        watch
    }

    pub fn current(&self) -> ReadinessState {
        self.rx.borrow().clone()
    }

    /// Resolves once the dependency is ready, or with `ShowsError::Unavailable`.
    pub async fn wait(&self, timeout: Duration) -> Result<()> {
        let mut rx = self.rx.clone();
        let outcome = tokio::time::timeout(timeout, async move {
            loop {
                let state = rx.borrow_and_update().clone();
                match state {
                    ReadinessState::Ready => return Ok(()),
                    ReadinessState::Unavailable(reason) => return Err(reason),
                    ReadinessState::Pending => {}
                }
                if rx.changed().await.is_err() {
                    return Err("readiness signal dropped before completion".to_string());
                }
            }
        })
        .await;

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(reason)) => Err(ShowsError::Unavailable(reason)),
            Err(_) => Err(ShowsError::Unavailable(format!("not ready after {:?}", timeout))),
        }
    }
}
