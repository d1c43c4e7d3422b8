//! Per-invocation execution context.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Lifecycle token for one `route` invocation.
///
/// Carries a cancellation signal (client went away) and a `wait_until` hook
/// for background work that must outlive the response.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    cancelled: watch::Receiver<bool>,
    background: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

/// Owner side of an `ExecutionContext`'s cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal cancellation to every clone of the context.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl ExecutionContext {
    /// Create a context and the handle that cancels it.
    pub fn new() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                cancelled: rx,
                background: Arc::new(Mutex::new(Vec::new())),
            },
            CancelHandle { tx },
        )
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Resolves once cancellation is signalled. Never resolves if the
    /// handle is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.cancelled.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Register background work that must run to completion after the
    /// response has been returned.
    pub fn wait_until<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(work);
        self.background
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    /// Number of registered background tasks not yet drained.
    pub fn pending_tasks(&self) -> usize {
        self.background
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    /// Await every registered background task.
    pub async fn drain(&self) {
        let handles: Vec<_> = self
            .background
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Background task failed");
            }
        }
    }
}
