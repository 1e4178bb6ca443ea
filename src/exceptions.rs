//! The standard `Throwable` hierarchy (spec.md §4.D step 3/§4.G), expressed
//! as one `(name, parent)` table registered through `SymbolRegistry` rather
//! than one Rust type per exception class — the classes differ only in
//! name and position in the tree, so a data table is the honest
//! representation instead of dozens of near-identical structs.

use std::collections::HashMap;
use std::rc::Rc;

use crate::registry::registry::{RegistryError, SymbolRegistry};
use crate::registry::symbols::{
    ClassDescriptor, FunctionKind, InterfaceDescriptor, MethodDescriptor, Parameter, PropertyDescriptor, Visibility,
};
use crate::core::value::Value;

const THROWABLE_METHODS: &[&str] = &[
    "getMessage",
    "getCode",
    "getFile",
    "getLine",
    "getTrace",
    "getTraceAsString",
    "getPrevious",
    "__toString",
];

/// `(class name, parent name or None for the two roots)`. Both roots
/// (`Exception`, `Error`) implement the `Throwable` interface directly;
/// everything else inherits it transitively through its parent.
const HIERARCHY: &[(&str, &str)] = &[
    ("ErrorException", "Exception"),
    ("LogicException", "Exception"),
    ("BadFunctionCallException", "LogicException"),
    ("BadMethodCallException", "LogicException"),
    ("DomainException", "LogicException"),
    ("InvalidArgumentException", "LogicException"),
    ("LengthException", "LogicException"),
    ("OutOfRangeException", "LogicException"),
    ("RuntimeException", "Exception"),
    ("OutOfBoundsException", "RuntimeException"),
    ("OverflowException", "RuntimeException"),
    ("RangeException", "RuntimeException"),
    ("UnderflowException", "RuntimeException"),
    ("UnexpectedValueException", "RuntimeException"),
    ("JsonException", "Exception"),
    ("TypeError", "Error"),
    ("ArgumentCountError", "TypeError"),
    ("ArithmeticError", "Error"),
    ("DivisionByZeroError", "ArithmeticError"),
    ("ParseError", "Error"),
    ("AssertionError", "Error"),
    ("UnhandledMatchError", "Error"),
    ("ValueError", "Error"),
];

/// Register `Throwable` (as an interface) and the full standard hierarchy
/// above into `registry`. Idempotent only in the sense that calling it
/// twice on the same registry surfaces `RegistryError::Duplicate` — callers
/// (i.e. `bootstrap::bootstrap`) are expected to call this exactly once.
pub fn register(registry: &mut SymbolRegistry) -> Result<(), RegistryError> {
    registry.register_interface(InterfaceDescriptor {
        name: "Throwable".to_string(),
        methods: THROWABLE_METHODS.iter().map(|m| m.to_string()).collect(),
        extends: vec![],
    })?;

    register_exception_root(registry, "Exception")?;
    register_exception_root(registry, "Error")?;

    for (name, parent) in HIERARCHY {
        registry.register_class(ClassDescriptor {
            name: name.to_string(),
            parent: Some(parent.to_string()),
            properties: base_exception_properties(),
            ..Default::default()
        })?;
    }
    Ok(())
}

fn register_exception_root(registry: &mut SymbolRegistry, name: &str) -> Result<(), RegistryError> {
    registry.register_class(ClassDescriptor {
        name: name.to_string(),
        parent: None,
        interfaces: vec!["Throwable".to_string()],
        properties: base_exception_properties(),
        methods: native_throwable_methods(),
        ..Default::default()
    })
}

/// `Throwable`'s methods, declared `Native` (host-dispatched) so
/// `Exception`/`Error` structurally satisfy the interface without this
/// registry owning an implementation for them.
fn native_throwable_methods() -> HashMap<String, Rc<MethodDescriptor>> {
    THROWABLE_METHODS
        .iter()
        .map(|name| {
            (
                // Keyed by the same lowercase form `SymbolRegistry` normalizes
                // lookups through (`resolve_method`/`check_interfaces_satisfied`);
                // `MethodDescriptor::name` below keeps the declared case.
                name.to_ascii_lowercase(),
                Rc::new(MethodDescriptor {
                    name: name.to_string(),
                    visibility: Visibility::Public,
                    is_static: false,
                    parameters: Vec::<Parameter>::new(),
                    kind: FunctionKind::Native,
                }),
            )
        })
        .collect()
}

fn base_exception_properties() -> HashMap<String, PropertyDescriptor> {
    let entries = [
        ("message", Value::str("")),
        ("code", Value::Int(0)),
        ("file", Value::str("")),
        ("line", Value::Int(0)),
        ("previous", Value::Null),
    ];
    entries
        .into_iter()
        .map(|(name, default)| {
            (
                name.to_string(),
                PropertyDescriptor {
                    name: name.to_string(),
                    visibility: Visibility::Protected,
                    default,
                    is_static: false,
                },
            )
        })
        .collect()
}

/// Construct an exception/error `ObjectData`-shaped property map for
/// `Exception::__construct($message, $code, $previous)` and its
/// subclasses — every class in [`HIERARCHY`] shares this constructor shape
/// (spec.md §4.G).
pub fn construct_properties(message: &str, code: i64, previous: Option<Value>) -> Vec<(String, Value)> {
    vec![
        ("message".to_string(), Value::str(message)),
        ("code".to_string(), Value::Int(code)),
        ("file".to_string(), Value::str("")),
        ("line".to_string(), Value::Int(0)),
        ("previous".to_string(), previous.unwrap_or(Value::Null)),
    ]
}
