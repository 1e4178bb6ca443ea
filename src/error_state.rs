//! Error reporting and exception-handler plumbing (spec.md §4.G), separate
//! from the `Throwable` class hierarchy itself (`exceptions.rs`).

use crate::core::value::Value;

/// PHP's `E_*` reporting-level bitmask. Kept as plain `u32` constants rather
/// than a `bitflags!`-generated type — the teacher's pack has no bitflags
/// dependency and these ten bits don't warrant adding one.
pub mod level {
    pub const ERROR: u32 = 1;
    pub const WARNING: u32 = 2;
    pub const PARSE: u32 = 4;
    pub const NOTICE: u32 = 8;
    pub const CORE_ERROR: u32 = 16;
    pub const CORE_WARNING: u32 = 32;
    pub const COMPILE_ERROR: u32 = 64;
    pub const COMPILE_WARNING: u32 = 128;
    pub const USER_ERROR: u32 = 256;
    pub const USER_WARNING: u32 = 512;
    pub const USER_NOTICE: u32 = 1024;
    pub const STRICT: u32 = 2048;
    pub const RECOVERABLE_ERROR: u32 = 4096;
    pub const DEPRECATED: u32 = 8192;
    pub const USER_DEPRECATED: u32 = 16384;
    /// All of the above except `STRICT` (spec.md §6: `32767 − 2048 = 30719`).
    pub const ALL: u32 = 30719;
}

#[derive(Debug, Clone)]
pub struct LastError {
    pub level: u32,
    pub message: String,
    pub file: String,
    pub line: u32,
}

/// Per-VM-instance error/exception handler stacks and reporting state
/// (spec.md §4.G). A host VM owns exactly one of these and exposes it to
/// built-ins through `BuiltinCallContext`.
pub struct ErrorState {
    reporting_level: u32,
    last_error: Option<LastError>,
    error_handlers: Vec<Value>,
    exception_handlers: Vec<Value>,
}

impl ErrorState {
    pub fn new() -> Self {
        ErrorState {
            reporting_level: level::ALL & !level::DEPRECATED & !level::STRICT,
            last_error: None,
            error_handlers: Vec::new(),
            exception_handlers: Vec::new(),
        }
    }

    pub fn error_reporting(&mut self, new_level: Option<u32>) -> u32 {
        let previous = self.reporting_level;
        if let Some(l) = new_level {
            self.reporting_level = l;
        }
        previous
    }

    pub fn is_reported(&self, error_level: u32) -> bool {
        self.reporting_level & error_level != 0
    }

    /// Record `last_error` unconditionally (available via
    /// `error_get_last()` regardless of reporting level) and return whether
    /// a handler should run given the current level.
    pub fn trigger_error(&mut self, error_level: u32, message: &str, file: &str, line: u32) -> bool {
        self.last_error = Some(LastError {
            level: error_level,
            message: message.to_string(),
            file: file.to_string(),
            line,
        });
        self.is_reported(error_level)
    }

    pub fn last_error(&self) -> Option<&LastError> {
        self.last_error.as_ref()
    }

    pub fn clear_last_error(&mut self) {
        self.last_error = None;
    }

    /// Push a new error handler, returning the previous one (if any) —
    /// mirrors `set_error_handler()`'s return value.
    pub fn set_error_handler(&mut self, handler: Value) -> Option<Value> {
        let previous = self.error_handlers.last().cloned();
        self.error_handlers.push(handler);
        previous
    }

    pub fn restore_error_handler(&mut self) -> bool {
        self.error_handlers.pop().is_some()
    }

    pub fn current_error_handler(&self) -> Option<&Value> {
        self.error_handlers.last()
    }

    pub fn set_exception_handler(&mut self, handler: Value) -> Option<Value> {
        let previous = self.exception_handlers.last().cloned();
        self.exception_handlers.push(handler);
        previous
    }

    pub fn restore_exception_handler(&mut self) -> bool {
        self.exception_handlers.pop().is_some()
    }

    pub fn current_exception_handler(&self) -> Option<&Value> {
        self.exception_handlers.last()
    }
}

impl Default for ErrorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_error_records_last_error_regardless_of_reporting_level() {
        let mut state = ErrorState::new();
        state.error_reporting(Some(0));
        let should_report = state.trigger_error(level::WARNING, "oops", "f.php", 10);
        assert!(!should_report);
        assert_eq!(state.last_error().unwrap().message, "oops");
    }

    #[test]
    fn error_handler_stack_pushes_and_restores() {
        let mut state = ErrorState::new();
        assert!(state.set_error_handler(Value::str("handlerA")).is_none());
        let previous = state.set_error_handler(Value::str("handlerB"));
        assert!(previous.is_some());
        assert!(state.restore_error_handler());
        assert!(state.restore_error_handler());
        assert!(!state.restore_error_handler());
    }

    #[test]
    fn error_reporting_returns_previous_level() {
        let mut state = ErrorState::new();
        let prev = state.error_reporting(Some(level::ERROR));
        assert_eq!(prev, level::ALL & !level::DEPRECATED & !level::STRICT);
        assert_eq!(state.error_reporting(None), level::ERROR);
    }
}
