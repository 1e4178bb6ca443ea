//! Callable-dispatch built-ins, plus the `go()` entry point onto the
//! goroutine substrate (spec.md §4.C/§4.F).

use crate::abi::context::BuiltinCallContext;
use crate::abi::error::BuiltinFault;
use crate::core::array::PhpArray;
use crate::core::callable::Callable;
use crate::core::value::Value;
use crate::registry::registry::{RegistryError, SymbolRegistry};
use crate::registry::symbols::{FunctionDef, Parameter};

fn param(name: &str) -> Parameter {
    Parameter {
        name: name.to_string(),
        type_hint: None,
        by_reference: false,
        default_value: None,
        variadic: false,
    }
}

fn variadic_param(name: &str) -> Parameter {
    Parameter {
        name: name.to_string(),
        type_hint: None,
        by_reference: false,
        default_value: None,
        variadic: true,
    }
}

fn call_user_func(ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    ctx.call_user_function(&args[0], &args[1..])
}

fn call_user_func_array(ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let arr = match args[1].deref_once() {
        Value::Array(a) => a,
        _ => return Err(BuiltinFault::runtime("call_user_func_array(): second argument must be an array")),
    };
    let call_args: Vec<Value> = arr.borrow().values().cloned().collect();
    ctx.call_user_function(&args[0], &call_args)
}

fn function_exists(ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let name = args[0].to_php_string();
    let name = String::from_utf8_lossy(&name);
    Ok(Value::Bool(ctx.symbol_registry().function_exists(&name)))
}

fn is_callable(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let callable = match args[0].deref_once() {
        Value::Callable(_) => true,
        Value::String(_) => true,
        Value::Array(a) => a.borrow().len() == 2,
        _ => false,
    };
    Ok(Value::Bool(callable))
}

/// `go($callable, ...$args)` (spec.md §4.F). Returns a `Resource` handle
/// wrapping the spawned `Goroutine`'s join point — see
/// `BuiltinCallContext::spawn_goroutine`'s doc comment for what "spawned"
/// actually means on a single-threaded host.
fn go_fn(ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    ctx.spawn_goroutine(&args[0], &args[1..])
}

fn func_num_args(ctx: &mut dyn BuiltinCallContext, _args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Int(ctx.current_function_arg_count() as i64))
}

fn func_get_args(ctx: &mut dyn BuiltinCallContext, _args: &[Value]) -> Result<Value, BuiltinFault> {
    let mut out = PhpArray::new();
    for i in 0..ctx.current_function_arg_count() {
        out.push(ctx.current_function_arg(i).unwrap_or(Value::Null));
    }
    Ok(Value::array(out))
}

/// Resolve a PHP callable value (string function name, `[obj, method]`
/// array, or `Callable`) into a `Callable` the registry can resolve, purely
/// for inspection built-ins like `is_callable`'s stricter cousins — the
/// actual invocation always goes through `BuiltinCallContext::call_user_function`.
pub fn resolve_callable_shape(value: &Value) -> Option<Callable> {
    match value.deref_once() {
        Value::String(name) => Some(Callable::Function(String::from_utf8_lossy(&name).into_owned())),
        Value::Callable(c) => Some((*c).clone()),
        _ => None,
    }
}

pub fn register(registry: &mut SymbolRegistry) -> Result<(), RegistryError> {
    registry.register_function(FunctionDef::builtin(
        "call_user_func",
        vec![param("callback"), variadic_param("args")],
        call_user_func,
    ))?;
    registry.register_function(FunctionDef::builtin(
        "call_user_func_array",
        vec![param("callback"), param("args")],
        call_user_func_array,
    ))?;
    registry.register_function(FunctionDef::builtin("function_exists", vec![param("name")], function_exists))?;
    registry.register_function(FunctionDef::builtin("is_callable", vec![param("value")], is_callable))?;
    registry.register_function(FunctionDef::builtin(
        "go",
        vec![param("callback"), variadic_param("args")],
        go_fn,
    ))?;
    registry.register_function(FunctionDef::builtin("func_num_args", vec![], func_num_args))?;
    registry.register_function(FunctionDef::builtin("func_get_args", vec![], func_get_args))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::test_support::StubContext;

    #[test]
    fn is_callable_accepts_two_element_array_as_method_ref() {
        let mut ctx = StubContext::default();
        let mut arr = PhpArray::new();
        arr.push(Value::str("obj"));
        arr.push(Value::str("method"));
        assert!(is_callable(&mut ctx, &[Value::array(arr)]).unwrap().to_bool());
    }

    #[test]
    fn function_exists_reflects_registry_state() {
        let mut ctx = StubContext::default();
        crate::builtins::types::register(&mut ctx.registry).unwrap();
        assert!(function_exists(&mut ctx, &[Value::str("is_int")]).unwrap().to_bool());
        assert!(!function_exists(&mut ctx, &[Value::str("nope")]).unwrap().to_bool());
    }
}
