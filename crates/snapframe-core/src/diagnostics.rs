//! Explicit diagnostics handle for virtualization tracing.

use std::fmt;

/// Log target used for virtualization diagnostics.
pub const VIRTUALIZATION_TARGET: &str = "snapframe::virtualization";

/// Logger handed to components that emit verbose diagnostics.
///
/// Components never consult a global switch; whoever builds them decides
/// whether tracing is on.
#[derive(Debug, Clone, Copy)]
pub struct Tracer {
    target: &'static str,
    enabled: bool,
}

impl Default for Tracer {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Tracer {
    /// Tracer logging under `target` when `enabled`.
    pub fn new(target: &'static str, enabled: bool) -> Self {
        Self { target, enabled }
    }

    /// Tracer that drops every message.
    pub fn disabled() -> Self {
        Self::new(VIRTUALIZATION_TARGET, false)
    }

    /// Whether trace output is produced.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit a debug-level message when enabled.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        if self.enabled {
            log::debug!(target: self.target, "{}", args);
        }
    }

    /// Emit a trace-level message when enabled.
    pub fn trace(&self, args: fmt::Arguments<'_>) {
        if self.enabled {
            log::trace!(target: self.target, "{}", args);
        }
    }
}
