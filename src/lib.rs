//! Core value model, symbol registry, built-in call ABI, and generator/
//! goroutine substrate for a PHP-shaped language runtime.
//!
//! This crate deliberately stops short of lexing, parsing, compiling, or
//! executing a full VM loop — those are a host's job. What lives here is
//! everything a host needs underneath that loop: the `Value` union and its
//! coercions, the ordered array and object-identity model, the process-wide
//! symbol registry with inheritance resolution, a narrow ABI a built-in
//! function is called through, and the two substrates (generators,
//! goroutines/`WaitGroup`) that need a cooperative scheduling story rather
//! than a plain function call.

pub mod abi;
pub mod bootstrap;
pub mod builtins;
pub mod concurrency;
pub mod core;
pub mod error_state;
pub mod exceptions;
pub mod generator;
pub mod registry;
pub mod resource;

pub use abi::{BuiltinCallContext, BuiltinFault, ExecutionContext, NativeHandler, OutputBufferStack};
pub use bootstrap::bootstrap;
pub use core::{loose_eq, strict_eq, ArrayKey, Callable, ObjectData, ObjectId, PhpArray, Reference, Value};
pub use error_state::ErrorState;
pub use generator::{Generator, GeneratorError};
pub use registry::{RegistryError, SymbolRegistry};
pub use resource::ResourceRegistry;
