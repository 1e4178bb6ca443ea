//! Errors a built-in or the marshaling framework around it can raise.
//!
//! Grounded in the pack's `thiserror` idiom (`rustor-core`/`rustor-rules`/
//! `rustor-fixer`'s `Cargo.toml`s all reach for it) rather than the
//! teacher's ad hoc `Result<_, String>`, so a host embedding this crate can
//! match on fault kind instead of parsing a message.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum BuiltinFault {
    #[error("{function}() expects between {min} and {max} parameters, {got} given")]
    ArityBounded {
        function: String,
        min: usize,
        max: usize,
        got: usize,
    },
    #[error("{function}() expects at least {min} parameters, {got} given")]
    ArityUnbounded {
        function: String,
        min: usize,
        got: usize,
    },
    #[error("{function}() expects parameter {position} to be {expected}, {actual} given")]
    TypeMismatch {
        function: String,
        position: usize,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("{0}")]
    Runtime(String),
}

impl BuiltinFault {
    pub fn runtime(msg: impl Into<String>) -> Self {
        BuiltinFault::Runtime(msg.into())
    }
}
