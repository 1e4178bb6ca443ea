//! The four shapes a PHP callable can take (spec.md §3.6).

use std::rc::Rc;

use crate::core::object::ObjectId;
use crate::core::value::Value;
use crate::registry::symbols::Parameter;

#[derive(Debug, Clone)]
pub enum Callable {
    /// A named function symbol, resolved at call time through the registry.
    Function(String),
    /// `[$object, 'method']`.
    Method { object: ObjectId, method: String },
    /// `['ClassName', 'method']` — a static call.
    StaticMethod { class: String, method: String },
    /// A closure: captured `use`-bindings, optional bound `$this`, and the
    /// body's parameter list (the compiled body itself is opaque to the
    /// core — the host VM resolves `body_ref` back to executable code).
    Closure(Rc<ClosureData>),
}

#[derive(Debug)]
pub struct ClosureData {
    pub parameters: Vec<Parameter>,
    pub captured: Vec<(String, Value)>,
    pub bound_this: Option<ObjectId>,
    pub bound_scope: Option<String>,
    /// Opaque reference to the compiled function body; out of scope for
    /// this crate (spec.md §1 — the bytecode compiler/VM are external
    /// collaborators), resolved by the host's `ExecutionContext`.
    pub body_ref: u64,
}
