//! End-to-end: bootstrap a fresh registry, then drive a handful of
//! built-ins through the real `BuiltinCallContext` ABI (marshaling included).

use std::cell::RefCell;

use php_runtime_core::abi::{BuiltinCallContext, BuiltinFault, ExecutionContext, OutputBufferStack};
use php_runtime_core::{bootstrap, PhpArray, SymbolRegistry, Value};

struct Host {
    registry: SymbolRegistry,
    output: RefCell<Vec<u8>>,
}

impl BuiltinCallContext for Host {
    fn write_output(&mut self, value: &Value) {
        self.output.borrow_mut().extend(value.to_php_string());
    }
    fn get_global(&self, _name: &str) -> Option<Value> {
        None
    }
    fn set_global(&mut self, _name: &str, _value: Value) {}
    fn symbol_registry(&self) -> &SymbolRegistry {
        &self.registry
    }
    fn call_user_function(&mut self, _callable: &Value, _args: &[Value]) -> Result<Value, BuiltinFault> {
        panic!("this scenario never calls back into user code")
    }
    fn throw_exception(&mut self, _exception: Value) {}
    fn halt(&mut self, _exit_code: i32, _message: Option<&[u8]>) -> ! {
        panic!("halt() should not be exercised here")
    }
    fn current_function_arg(&self, _index: usize) -> Option<Value> {
        None
    }
    fn current_function_arg_count(&self) -> usize {
        0
    }
    fn execution_context(&mut self) -> &mut dyn ExecutionContext {
        panic!("unused in this scenario")
    }
    fn output_buffer_stack(&mut self) -> &mut dyn OutputBufferStack {
        panic!("unused in this scenario")
    }
}

fn host() -> Host {
    let mut registry = SymbolRegistry::new();
    bootstrap(&mut registry).unwrap();
    Host { registry, output: RefCell::new(Vec::new()) }
}

fn call(host: &mut Host, name: &str, args: &[Value]) -> Value {
    let def = host.registry.lookup_function(name).unwrap_or_else(|| panic!("{name} not registered"));
    let marshaled = php_runtime_core::abi::marshal_args(&def, args).unwrap();
    let handler = match &def.kind {
        php_runtime_core::registry::symbols::FunctionKind::Builtin(f) => *f,
        _ => panic!("{name} is not a builtin"),
    };
    handler(host, &marshaled).unwrap()
}

#[test]
fn strlen_and_substr_compose_through_the_real_abi() {
    let mut host = host();
    let s = Value::str("Hello World");
    assert_eq!(call(&mut host, "strlen", &[s.clone()]).to_int(), 11);
    let sub = call(&mut host, "substr", &[s, Value::Int(-5)]);
    assert_eq!(sub.to_php_string(), b"World");
}

#[test]
fn array_sum_overflow_end_to_end() {
    let mut host = host();
    let mut arr = PhpArray::new();
    arr.push(Value::Int(i64::MAX));
    arr.push(Value::Int(1));
    let sum = call(&mut host, "array_sum", &[Value::array(arr)]);
    assert!(matches!(sum, Value::Float(_)));
}

#[test]
fn print_writes_through_the_context() {
    let mut host = host();
    call(&mut host, "print", &[Value::str("hi")]);
    assert_eq!(*host.output.borrow(), b"hi");
}

#[test]
fn marshal_args_rejects_arity_violations_before_the_handler_runs() {
    let mut host = host();
    let def = host.registry.lookup_function("strlen").unwrap();
    assert!(php_runtime_core::abi::marshal_args(&def, &[]).is_err());
}
