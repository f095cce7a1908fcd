use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::BridgeError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BridgeSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// A spec could not be resolved or applied.
    Error,
    /// The module system itself failed (module missing or broken).
    Critical,
}

impl BridgeSeverity {
    /// Severity the bridge assigns to `error`.
    pub fn of(error: &BridgeError) -> Self {
        match error {
            BridgeError::Resolution(e) => match e.cause {
                crate::error::ResolutionCause::Load(_) => BridgeSeverity::Critical,
                _ => BridgeSeverity::Error,
            },
            _ => BridgeSeverity::Error,
        }
    }
}

/// What was being resolved when an event fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeContext {
    pub namespace: String,
    pub name: String,
    /// Number of literal arguments the spec binds.
    pub bound_args: usize,
}

/// Observer interface for resolution outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait BridgeObserver: Send + Sync {
    /// Called when a spec resolved (and applied) successfully.
    fn on_resolved(&self, _ctx: &BridgeContext) {}

    /// Called when resolution or application fails.
    fn on_failure(&self, _ctx: &BridgeContext, _severity: BridgeSeverity, _error: &BridgeError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &BridgeContext, severity: BridgeSeverity, error: &BridgeError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn BridgeObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn BridgeObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl BridgeObserver for CompositeObserver {
    fn on_resolved(&self, ctx: &BridgeContext) {
        for o in &self.observers {
            o.on_resolved(ctx);
        }
    }

    fn on_failure(&self, ctx: &BridgeContext, severity: BridgeSeverity, error: &BridgeError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &BridgeContext, severity: BridgeSeverity, error: &BridgeError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs bridge events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl BridgeObserver for StdErrObserver {
    fn on_resolved(&self, ctx: &BridgeContext) {
        eprintln!(
            "[bridge][ok] fn={}/{} bound_args={}",
            ctx.namespace, ctx.name, ctx.bound_args
        );
    }

    fn on_failure(&self, ctx: &BridgeContext, severity: BridgeSeverity, error: &BridgeError) {
        eprintln!(
            "[bridge][{:?}] fn={}/{} err={}",
            severity, ctx.namespace, ctx.name, error
        );
    }

    fn on_alert(&self, ctx: &BridgeContext, severity: BridgeSeverity, error: &BridgeError) {
        eprintln!(
            "[ALERT][bridge][{:?}] fn={}/{} err={}",
            severity, ctx.namespace, ctx.name, error
        );
    }
}

/// Appends bridge events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl BridgeObserver for FileObserver {
    fn on_resolved(&self, ctx: &BridgeContext) {
        self.append_line(&format!(
            "{} ok fn={}/{} bound_args={}",
            unix_ts(),
            ctx.namespace,
            ctx.name,
            ctx.bound_args
        ));
    }

    fn on_failure(&self, ctx: &BridgeContext, severity: BridgeSeverity, error: &BridgeError) {
        self.append_line(&format!(
            "{} fail severity={:?} fn={}/{} err={}",
            unix_ts(),
            severity,
            ctx.namespace,
            ctx.name,
            error
        ));
    }

    fn on_alert(&self, ctx: &BridgeContext, severity: BridgeSeverity, error: &BridgeError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} fn={}/{} err={}",
            unix_ts(),
            severity,
            ctx.namespace,
            ctx.name,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
