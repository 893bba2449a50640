//! The shutdown coordinator (`spec.md` §4.10): a process-wide singleton
//! that turns SIGINT/SIGTERM into a cooperative shutdown signal the
//! executor can drain in-flight feature sets against, plus the cancellation
//! token derivation described in `spec.md` §5.

use log::info;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Why the process is shutting down (`spec.md` §4.9's `shutdown` system
/// object reads this verbatim).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownInfo {
    pub reason: String,
    pub signal: Option<String>,
    pub exit_code: Option<i32>,
}

impl ShutdownInfo {
    pub fn signal(name: &str) -> Self {
        ShutdownInfo { reason: format!("received {name}"), signal: Some(name.to_string()), exit_code: None }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        ShutdownInfo { reason: reason.into(), signal: None, exit_code: Some(1) }
    }

    pub fn normal(reason: impl Into<String>) -> Self {
        ShutdownInfo { reason: reason.into(), signal: None, exit_code: Some(0) }
    }
}

/// Process-wide (or engine-scoped — see `spec.md` §9's note on avoiding
/// serial-only-test singletons) shutdown signal. One coordinator is shared
/// by every task an `Engine` spawns; cloning the `Arc` is the intended way
/// to hand it to a task.
pub struct ShutdownCoordinator {
    fired: AtomicBool,
    info: RwLock<Option<ShutdownInfo>>,
    notify: Notify,
}

impl ShutdownCoordinator {
    pub fn new() -> Arc<Self> {
        Arc::new(ShutdownCoordinator { fired: AtomicBool::new(false), info: RwLock::new(None), notify: Notify::new() })
    }

    /// Marks the process for shutdown and wakes every waiter. Idempotent:
    /// the first call's `info` wins, later calls are no-ops beyond waking
    /// any waiter registered since.
    pub fn signal_shutdown(&self, info: ShutdownInfo) {
        if !self.fired.swap(true, Ordering::SeqCst) {
            *self.info.write() = Some(info);
        }
        self.notify.notify_waiters();
    }

    pub fn is_shutdown(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    pub fn info(&self) -> Option<ShutdownInfo> {
        self.info.read().clone()
    }

    /// Clears shutdown state. Exists for test isolation — production code
    /// creates a fresh coordinator per `Engine` rather than calling this.
    pub fn reset(&self) {
        self.fired.store(false, Ordering::SeqCst);
        *self.info.write() = None;
    }

    /// Resolves once shutdown has been signalled, returning the reason.
    pub async fn wait_for_shutdown(&self) -> ShutdownInfo {
        loop {
            if let Some(info) = self.info() {
                return info;
            }
            self.notify.notified().await;
        }
    }

    /// Installs OS signal handlers that call [`Self::signal_shutdown`] on
    /// SIGINT/SIGTERM. Spawned as a background task; the returned
    /// `JoinHandle` is dropped by callers that don't need to await it.
    pub fn install_signal_handlers(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    log::warn!("failed to install SIGTERM handler: {e}");
                    return;
                }
            };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("received SIGINT, beginning graceful shutdown");
                    coordinator.signal_shutdown(ShutdownInfo::signal("SIGINT"));
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, beginning graceful shutdown");
                    coordinator.signal_shutdown(ShutdownInfo::signal("SIGTERM"));
                }
            }
        })
    }

    /// A cooperative cancel token derived from this coordinator
    /// (`spec.md` §5). Cheap to clone; every task checks it at suspension
    /// points and loop-iteration boundaries rather than being preempted.
    pub fn cancel_token(self: &Arc<Self>) -> CancelToken {
        CancelToken { coordinator: self.clone(), deadline: None }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        ShutdownCoordinator { fired: AtomicBool::new(false), info: RwLock::new(None), notify: Notify::new() }
    }
}

/// A logical cancellation signal handed down to tasks. Derived from the
/// shutdown coordinator and, for HTTP handlers, additionally bounded by a
/// per-request deadline (`spec.md` §5).
#[derive(Clone)]
pub struct CancelToken {
    coordinator: Arc<ShutdownCoordinator>,
    deadline: Option<std::time::Instant>,
}

impl CancelToken {
    pub fn with_deadline(mut self, timeout: Duration) -> Self {
        self.deadline = Some(std::time::Instant::now() + timeout);
        self
    }

    /// True if the coordinator has signalled shutdown, or this token's
    /// deadline has passed. Checked at suspension points, never used to
    /// preempt a running task mid-statement.
    pub fn is_cancelled(&self) -> bool {
        self.coordinator.is_shutdown() || self.deadline.is_some_and(|d| std::time::Instant::now() >= d)
    }

    /// Resolves when cancellation becomes true, via whichever source fires
    /// first.
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                let sleep = tokio::time::sleep_until(deadline.into());
                tokio::pin!(sleep);
                tokio::select! {
                    _ = self.coordinator.wait_for_shutdown() => {}
                    _ = &mut sleep => {}
                }
            }
            None => {
                self.coordinator.wait_for_shutdown().await;
            }
        }
    }
}
