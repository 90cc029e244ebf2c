//! Graceful shutdown
//!
//! Ctrl-C and SIGTERM set a shared flag; the run loop checks it between
//! records and finishes the one in flight before stopping.

use crate::simulation::error::{SimulationError, SimulationResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::runtime::Builder;
use tracing::{debug, warn};

/// Shared flag raised when the run should stop
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    triggered: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// Create a lowered flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
    }

    /// Whether the flag has been raised
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Raise this flag on Ctrl-C or SIGTERM
    ///
    /// The handlers are registered before this returns; a dedicated thread
    /// running its own current-thread runtime then awaits them, so the caller
    /// stays synchronous.
    pub fn install_signal_handlers(&self) -> SimulationResult<()> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SimulationError::signal_error(format!("failed to start runtime: {}", e)))?;

        let listener = {
            let _context = runtime.enter();
            SignalListener::register().map_err(|e| {
                SimulationError::signal_error(format!("failed to register signal handlers: {}", e))
            })?
        };
        let flag = self.clone();

        thread::Builder::new()
            .name("shutdown-listener".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    let mut listener = listener;
                    match listener.recv().await {
                        Some(signal) => {
                            warn!("Received {}, finishing the current record", signal);
                            flag.trigger();
                        }
                        None => warn!("Signal listener stopped"),
                    }
                });
            })
            .map_err(|e| {
                SimulationError::signal_error(format!("failed to spawn listener: {}", e))
            })?;

        debug!("Shutdown signal handlers installed");
        Ok(())
    }
}

/// Registered shutdown signal streams
///
/// Must be created inside a tokio runtime context.
#[derive(Debug)]
struct SignalListener {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(windows)]
    ctrl_c: tokio::signal::windows::CtrlC,
}

impl SignalListener {
    #[cfg(unix)]
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(windows)]
    fn register() -> std::io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    /// Name of the first signal received, `None` if the streams closed
    #[cfg(unix)]
    async fn recv(&mut self) -> Option<&'static str> {
        tokio::select! {
            received = self.interrupt.recv() => received.map(|_| "Ctrl-C"),
            received = self.terminate.recv() => received.map(|_| "SIGTERM"),
        }
    }

    #[cfg(windows)]
    async fn recv(&mut self) -> Option<&'static str> {
        self.ctrl_c.recv().await.map(|_| "Ctrl-C")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let flag = ShutdownFlag::new();
        let clone = flag.clone();
        assert!(!flag.is_triggered());

        clone.trigger();
        assert!(flag.is_triggered());
    }

    #[test]
    fn test_register_inside_runtime_context() {
        let runtime = Builder::new_current_thread().enable_all().build().unwrap();
        let _context = runtime.enter();
        assert!(SignalListener::register().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_sigterm_right_after_install_raises_flag() {
        use std::process::Command;
        use std::time::{Duration, Instant};

        let flag = ShutdownFlag::new();
        flag.install_signal_handlers().unwrap();

        // Delivered immediately: handlers are already in place
        let status = Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        let deadline = Instant::now() + Duration::from_secs(5);
        while !flag.is_triggered() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(flag.is_triggered());
    }
}
