//! Built-in function bodies, grouped by domain (spec.md §4.D step 5).
//!
//! Each module exposes a `register(registry) -> Result<(), RegistryError>`
//! that registers its functions through `FunctionDef::builtin`; bodies take
//! `&mut dyn BuiltinCallContext` and already-marshaled args (arity/defaults/
//! variadic packing happened in `abi::marshal` before the handler runs).

pub mod array;
pub mod ctype;
pub mod debug;
pub mod func;
pub mod math;
pub mod output;
pub mod string;
#[cfg(test)]
pub mod test_support;
pub mod types;
