//! The strict, ordered, idempotent registration sequence (spec.md §4.D):
//! interfaces → base classes → exception hierarchy → `Generator`/`WaitGroup`
//! → built-in functions by domain → constants → freeze.
//!
//! Mirrors the teacher's `Extension::register_all`, which walks a fixed
//! list of `register_*` calls against one `ExtensionRegistry`; this just
//! generalizes the list to the fuller symbol surface spec.md names.

use thiserror::Error;
use tracing::info_span;

use crate::builtins::{array, ctype, debug, func, math, output, string, types};
use crate::core::value::Value;
use crate::error_state::level;
use crate::exceptions;
use crate::registry::registry::{RegistryError, SymbolRegistry};
use crate::registry::symbols::{ClassDescriptor, ConstantDescriptor};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Run the full bootstrap sequence against a fresh `registry`. Calling this
/// a second time on an already-bootstrapped registry is a deliberate no-op
/// (idempotent per spec.md §4.D) rather than an error, since a host VM may
/// reasonably call it defensively before every script run.
pub fn bootstrap(registry: &mut SymbolRegistry) -> Result<(), BootstrapError> {
    if registry.is_frozen() {
        return Ok(());
    }
    let _span = info_span!("bootstrap").entered();

    register_exception_hierarchy(registry)?;
    register_concurrency_classes(registry)?;
    register_builtin_functions(registry)?;
    register_constants(registry)?;

    registry.freeze();
    Ok(())
}

fn register_exception_hierarchy(registry: &mut SymbolRegistry) -> Result<(), BootstrapError> {
    let _span = info_span!("register_exception_hierarchy").entered();
    exceptions::register(registry)?;
    Ok(())
}

/// `Generator` and `WaitGroup` are marker classes here: their instance
/// state (the rendezvous channels, the counting mutex) lives in
/// Rust-native `generator::Generator`/`concurrency::WaitGroup` values held
/// behind the host's resource registry, not in `ObjectData` properties —
/// the host VM is expected to special-case method dispatch on these two
/// class names the way it already must special-case `Closure::call` et al.
fn register_concurrency_classes(registry: &mut SymbolRegistry) -> Result<(), BootstrapError> {
    let _span = info_span!("register_concurrency_classes").entered();
    registry.register_interface(crate::registry::symbols::InterfaceDescriptor {
        name: "Traversable".to_string(),
        methods: vec![],
        extends: vec![],
    })?;
    registry.register_interface(crate::registry::symbols::InterfaceDescriptor {
        name: "Iterator".to_string(),
        methods: vec![
            "current".to_string(),
            "key".to_string(),
            "next".to_string(),
            "rewind".to_string(),
            "valid".to_string(),
        ],
        extends: vec!["Traversable".to_string()],
    })?;
    registry.register_interface(crate::registry::symbols::InterfaceDescriptor {
        name: "ArrayAccess".to_string(),
        methods: vec![
            "offsetExists".to_string(),
            "offsetGet".to_string(),
            "offsetSet".to_string(),
            "offsetUnset".to_string(),
        ],
        extends: vec![],
    })?;
    registry.register_interface(crate::registry::symbols::InterfaceDescriptor {
        name: "Countable".to_string(),
        methods: vec!["count".to_string()],
        extends: vec![],
    })?;
    registry.register_interface(crate::registry::symbols::InterfaceDescriptor {
        name: "Stringable".to_string(),
        methods: vec!["__toString".to_string()],
        extends: vec![],
    })?;
    // Generator fulfils Iterator's contract natively (its five methods are
    // host-dispatched onto `generator::Generator`, never looked up through
    // `methods`), so it isn't declared as formally `implements Iterator`
    // here — that would trip `check_interfaces_satisfied`'s requirement
    // that every interface method appear in the class's own method table.
    registry.register_class(ClassDescriptor {
        name: "Generator".to_string(),
        is_final: true,
        ..Default::default()
    })?;
    registry.register_class(ClassDescriptor {
        name: "WaitGroup".to_string(),
        is_final: true,
        ..Default::default()
    })?;
    Ok(())
}

fn register_builtin_functions(registry: &mut SymbolRegistry) -> Result<(), BootstrapError> {
    let _span = info_span!("register_builtin_functions").entered();
    types::register(registry)?;
    string::register(registry)?;
    array::register(registry)?;
    math::register(registry)?;
    ctype::register(registry)?;
    output::register(registry)?;
    func::register(registry)?;
    debug::register(registry)?;
    Ok(())
}

fn register_constants(registry: &mut SymbolRegistry) -> Result<(), BootstrapError> {
    let _span = info_span!("register_constants").entered();
    let constants: &[(&str, Value)] = &[
        ("PHP_EOL", Value::str("\n")),
        ("PHP_INT_MAX", Value::Int(i64::MAX)),
        ("PHP_INT_MIN", Value::Int(i64::MIN)),
        ("PHP_INT_SIZE", Value::Int(8)),
        ("PHP_FLOAT_EPSILON", Value::Float(f64::EPSILON)),
        ("M_PI", Value::Float(std::f64::consts::PI)),
        ("NAN", Value::Float(f64::NAN)),
        ("INF", Value::Float(f64::INFINITY)),
        // Error reporting levels (spec.md §6).
        ("E_ERROR", Value::Int(level::ERROR as i64)),
        ("E_WARNING", Value::Int(level::WARNING as i64)),
        ("E_PARSE", Value::Int(level::PARSE as i64)),
        ("E_NOTICE", Value::Int(level::NOTICE as i64)),
        ("E_CORE_ERROR", Value::Int(level::CORE_ERROR as i64)),
        ("E_CORE_WARNING", Value::Int(level::CORE_WARNING as i64)),
        ("E_COMPILE_ERROR", Value::Int(level::COMPILE_ERROR as i64)),
        ("E_COMPILE_WARNING", Value::Int(level::COMPILE_WARNING as i64)),
        ("E_USER_ERROR", Value::Int(level::USER_ERROR as i64)),
        ("E_USER_WARNING", Value::Int(level::USER_WARNING as i64)),
        ("E_USER_NOTICE", Value::Int(level::USER_NOTICE as i64)),
        ("E_STRICT", Value::Int(level::STRICT as i64)),
        ("E_RECOVERABLE_ERROR", Value::Int(level::RECOVERABLE_ERROR as i64)),
        ("E_DEPRECATED", Value::Int(level::DEPRECATED as i64)),
        ("E_USER_DEPRECATED", Value::Int(level::USER_DEPRECATED as i64)),
        ("E_ALL", Value::Int(level::ALL as i64)),
        // Case-folding flags for `array_change_key_case` et al.
        ("CASE_LOWER", Value::Int(0)),
        ("CASE_UPPER", Value::Int(1)),
        // Sort flags for `sort`/`asort`/`ksort` et al.
        ("SORT_REGULAR", Value::Int(0)),
        ("SORT_NUMERIC", Value::Int(1)),
        ("SORT_STRING", Value::Int(2)),
        ("SORT_DESC", Value::Int(3)),
        ("SORT_ASC", Value::Int(4)),
        ("SORT_LOCALE_STRING", Value::Int(5)),
        ("SORT_NATURAL", Value::Int(6)),
        ("SORT_FLAG_CASE", Value::Int(8)),
        // `pathinfo()` component flags.
        ("PATHINFO_DIRNAME", Value::Int(1)),
        ("PATHINFO_BASENAME", Value::Int(2)),
        ("PATHINFO_EXTENSION", Value::Int(4)),
        ("PATHINFO_FILENAME", Value::Int(8)),
    ];
    for (name, value) in constants {
        registry.register_constant(ConstantDescriptor {
            name: name.to_string(),
            value: value.clone(),
            case_sensitive: true,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_populates_the_full_surface() {
        let mut registry = SymbolRegistry::new();
        bootstrap(&mut registry).unwrap();
        assert!(registry.is_frozen());
        assert!(registry.function_exists("array_sum"));
        assert!(registry.function_exists("ctype_digit"));
        assert!(registry.function_exists("print_r"));
        assert!(registry.function_exists("var_dump"));
        assert!(registry.function_exists("array_unique"));
        assert!(registry.lookup_class("Generator").is_some());
        assert!(registry.lookup_class("WaitGroup").is_some());
        assert!(registry.is_subclass_of("DivisionByZeroError", "Throwable"));
        assert_eq!(registry.lookup_constant("PHP_INT_MAX").unwrap().to_int(), i64::MAX);
        assert_eq!(registry.lookup_constant("E_ALL").unwrap().to_int(), 30719);
        assert!(registry.lookup_interface("Traversable").is_some());
        assert!(registry.lookup_interface("ArrayAccess").is_some());
        assert!(registry.lookup_interface("Countable").is_some());
        assert!(registry.lookup_interface("Stringable").is_some());
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let mut registry = SymbolRegistry::new();
        bootstrap(&mut registry).unwrap();
        bootstrap(&mut registry).unwrap();
    }
}
