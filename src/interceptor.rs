//! Error Interceptor
//!
//! Single installation point for the three fault channels:
//! - recoverable errors raised by components (`on_error`)
//! - unrecoverable errors and panics reaching the top (`on_exception`, panic hook)
//! - abnormal termination while an operation is pending (`ShutdownGuard`)
//!
//! Every handler only logs. Logging from a handler goes through
//! [`guarded_log`], which refuses nested entry and swallows panics raised by
//! the logger itself.

use std::cell::Cell;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::process;
use std::sync::{Mutex, Once, PoisonError};
use log::{debug, error, warn};

use crate::error::{CoreError, EXIT_PANIC};

static PANIC_HOOK: Once = Once::new();

/// Operations with an armed `ShutdownGuard`, oldest first
static PENDING: Mutex<Vec<String>> = Mutex::new(Vec::new());

thread_local! {
    static IN_HANDLER: Cell<bool> = const { Cell::new(false) };
}

/// How the interceptor attaches to the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookMode {
    /// Install the process-wide panic hook
    Process,
    /// Record installation only; process-global hooks are left untouched
    Detached,
}

/// Run `f` as handler logging: never re-entered, never panics outward.
///
/// Returns `false` when the call was refused (already inside a handler) or
/// when `f` panicked.
pub fn guarded_log<F: FnOnce()>(f: F) -> bool {
    if IN_HANDLER.with(|flag| flag.replace(true)) {
        return false;
    }
    let completed = panic::catch_unwind(AssertUnwindSafe(f)).is_ok();
    IN_HANDLER.with(|flag| flag.set(false));
    completed
}

/// Operations currently guarded and not yet completed
pub fn pending_operations() -> Vec<String> {
    PENDING.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

fn track(operation: &str) {
    PENDING
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(operation.to_string());
}

fn untrack(operation: &str) {
    let mut pending = PENDING.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(index) = pending.iter().rposition(|op| op == operation) {
        pending.remove(index);
    }
}

fn report_abnormal_termination(operation: &str, panicking: bool) {
    guarded_log(|| {
        error!(
            "[shutdown] Abnormal termination while '{}' was pending{}",
            operation,
            if panicking { " (panic)" } else { "" }
        )
    });
}

/// Central fault interception for one core instance
#[derive(Debug)]
pub struct ErrorInterceptor {
    mode: HookMode,
    installed: bool,
}

impl ErrorInterceptor {
    pub fn new(mode: HookMode) -> Self {
        Self { mode, installed: false }
    }

    pub fn mode(&self) -> HookMode {
        self.mode
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Install the handlers. Repeated calls are ignored.
    pub fn install(&mut self) {
        if self.installed {
            warn!("Error interceptor already installed; ignoring");
            return;
        }
        if self.mode == HookMode::Process {
            PANIC_HOOK.call_once(|| {
                panic::set_hook(Box::new(|panic_info| {
                    // Raised by handler logging: left to guarded_log's catch_unwind
                    if IN_HANDLER.with(Cell::get) {
                        return;
                    }
                    guarded_log(|| error!("[panic] Unrecoverable fault: {}", panic_info));
                    for operation in pending_operations() {
                        report_abnormal_termination(&operation, true);
                    }
                    guarded_log(|| log::logger().flush());
                    process::exit(EXIT_PANIC);
                }));
            });
        }
        debug!("Error interceptor installed ({:?})", self.mode);
        self.installed = true;
    }

    /// Recoverable channel: log a warning and continue
    pub fn on_error(&self, context: &str, message: &dyn Display) {
        guarded_log(|| warn!("[{}] {}", context, message));
    }

    /// Unrecoverable channel: log the error and return the exit code the
    /// caller must terminate with
    pub fn on_exception(&self, err: &CoreError) -> i32 {
        guarded_log(|| error!("[{}] {}", err.kind(), err));
        guarded_log(|| log::logger().flush());
        err.exit_code()
    }

    /// Shutdown channel: arm a guard for a pending operation
    pub fn shutdown_guard(&self, operation: &str) -> ShutdownGuard {
        ShutdownGuard::arm(operation)
    }
}

/// Logs an abnormal termination if dropped before `complete` is called
#[derive(Debug)]
#[must_use = "dropping the guard immediately reports an abnormal termination"]
pub struct ShutdownGuard {
    operation: String,
    armed: bool,
}

impl ShutdownGuard {
    pub fn arm(operation: &str) -> Self {
        track(operation);
        Self {
            operation: operation.to_string(),
            armed: true,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Mark the operation as finished; no shutdown report is produced
    pub fn complete(mut self) {
        self.armed = false;
    }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        untrack(&self.operation);
        if !self.armed {
            return;
        }
        report_abnormal_termination(&self.operation, std::thread::panicking());
        guarded_log(|| log::logger().flush());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guarded_log_swallows_panics() {
        let completed = guarded_log(|| panic!("logger exploded"));
        assert!(!completed);
        // The guard is released afterwards
        assert!(guarded_log(|| {}));
    }

    #[test]
    fn test_guarded_log_refuses_reentry() {
        let mut inner_result = None;
        let outer = guarded_log(|| {
            inner_result = Some(guarded_log(|| {}));
        });
        assert!(outer);
        assert_eq!(inner_result, Some(false));
    }

    #[test]
    fn test_install_is_recorded_once() {
        let mut interceptor = ErrorInterceptor::new(HookMode::Detached);
        assert!(!interceptor.is_installed());
        interceptor.install();
        assert!(interceptor.is_installed());
        interceptor.install();
        assert!(interceptor.is_installed());
        assert_eq!(interceptor.mode(), HookMode::Detached);
    }

    #[test]
    fn test_on_exception_returns_exit_code() {
        let interceptor = ErrorInterceptor::new(HookMode::Detached);
        assert_eq!(interceptor.on_exception(&CoreError::nothing_to_run()), 2);
        assert_eq!(interceptor.on_exception(&CoreError::environment("too old")), 3);
    }

    #[test]
    fn test_armed_guards_are_tracked_until_released() {
        let completed = ShutdownGuard::arm("tracked-complete");
        let dropped = ShutdownGuard::arm("tracked-drop");
        let pending = pending_operations();
        assert!(pending.iter().any(|op| op == "tracked-complete"));
        assert!(pending.iter().any(|op| op == "tracked-drop"));

        completed.complete();
        drop(dropped);

        let pending = pending_operations();
        assert!(!pending.iter().any(|op| op.starts_with("tracked-")));
    }

    #[test]
    fn test_shutdown_guard_complete_and_drop() {
        let interceptor = ErrorInterceptor::new(HookMode::Detached);
        let guard = interceptor.shutdown_guard("bootstrap");
        assert_eq!(guard.operation(), "bootstrap");
        guard.complete();

        // Dropping an armed guard only logs
        let guard = ShutdownGuard::arm("invoke");
        drop(guard);
        assert!(guarded_log(|| {}));
    }
}
