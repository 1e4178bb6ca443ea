//! Registry entity descriptors (spec.md §3.7).

use std::rc::Rc;

use crate::abi::context::NativeHandler;
use crate::core::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub type_hint: Option<String>,
    pub by_reference: bool,
    pub default_value: Option<Value>,
    pub variadic: bool,
}

impl Parameter {
    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }
}

#[derive(Clone)]
pub enum FunctionKind {
    Builtin(NativeHandler),
    /// Opaque reference to a compiled user body; resolved by the host VM.
    User(u64),
    /// Implemented directly by the host VM against its own internal state
    /// (e.g. `Exception::getMessage`, `Generator::current`) rather than
    /// through either a `NativeHandler` or compiled bytecode. Exists so a
    /// class can formally declare an interface it satisfies natively
    /// without a body this registry can point to.
    Native,
}

#[derive(Clone)]
pub struct FunctionDef {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub min_args: usize,
    /// `-1` (represented as `None`) means unbounded (variadic).
    pub max_args: Option<usize>,
    pub is_variadic: bool,
    pub kind: FunctionKind,
}

impl FunctionDef {
    pub fn builtin(name: &str, parameters: Vec<Parameter>, handler: NativeHandler) -> Self {
        let min_args = parameters.iter().filter(|p| !p.has_default() && !p.variadic).count();
        let is_variadic = parameters.iter().any(|p| p.variadic);
        let max_args = if is_variadic { None } else { Some(parameters.len()) };
        FunctionDef {
            name: name.to_string(),
            parameters,
            min_args,
            max_args,
            is_variadic,
            kind: FunctionKind::Builtin(handler),
        }
    }
}

#[derive(Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub parameters: Vec<Parameter>,
    pub kind: FunctionKind,
}

#[derive(Clone, Default)]
pub struct ClassDescriptor {
    pub name: String,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    pub traits: Vec<String>,
    pub properties: std::collections::HashMap<String, PropertyDescriptor>,
    pub methods: std::collections::HashMap<String, Rc<MethodDescriptor>>,
    pub constants: std::collections::HashMap<String, Value>,
    pub is_abstract: bool,
    pub is_final: bool,
}

#[derive(Clone)]
pub struct PropertyDescriptor {
    pub name: String,
    pub visibility: Visibility,
    pub default: Value,
    pub is_static: bool,
}

#[derive(Clone, Default)]
pub struct InterfaceDescriptor {
    pub name: String,
    pub methods: Vec<String>,
    pub extends: Vec<String>,
}

#[derive(Clone)]
pub struct ConstantDescriptor {
    pub name: String,
    pub value: Value,
    pub case_sensitive: bool,
}
