pub mod registry;
pub mod symbols;

pub use registry::{RegistryError, SymbolRegistry};
