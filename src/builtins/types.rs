//! Type-inspection and coercion built-ins (spec.md §4.A surface).

use crate::abi::context::BuiltinCallContext;
use crate::abi::error::BuiltinFault;
use crate::core::value::Value;
use crate::registry::registry::RegistryError;
use crate::registry::registry::SymbolRegistry;
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

fn gettype(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::str(args[0].type_name()))
}

fn is_int(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Bool(matches!(args[0].deref_once(), Value::Int(_))))
}

fn is_float(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Bool(matches!(args[0].deref_once(), Value::Float(_))))
}

fn is_string(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Bool(matches!(args[0].deref_once(), Value::String(_))))
}

fn is_bool(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Bool(matches!(args[0].deref_once(), Value::Bool(_))))
}

fn is_null(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Bool(args[0].is_null()))
}

fn is_array(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Bool(args[0].is_array()))
}

fn is_numeric(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let ok = match args[0].deref_once() {
        Value::Int(_) | Value::Float(_) => true,
        Value::String(s) => Value::is_numeric_string(&s),
        _ => false,
    };
    Ok(Value::Bool(ok))
}

fn intval(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Int(args[0].to_int()))
}

fn floatval(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Float(args[0].to_float()))
}

fn strval(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::str(args[0].to_php_string()))
}

fn boolval(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Bool(args[0].to_bool()))
}

pub fn register(registry: &mut SymbolRegistry) -> Result<(), RegistryError> {
    let one_arg = |n: &str, f| FunctionDef::builtin(n, vec![param("value")], f);
    registry.register_function(one_arg("gettype", gettype))?;
    registry.register_function(one_arg("is_int", is_int))?;
    registry.register_function(one_arg("is_integer", is_int))?;
    registry.register_function(one_arg("is_float", is_float))?;
    registry.register_function(one_arg("is_double", is_float))?;
    registry.register_function(one_arg("is_string", is_string))?;
    registry.register_function(one_arg("is_bool", is_bool))?;
    registry.register_function(one_arg("is_null", is_null))?;
    registry.register_function(one_arg("is_array", is_array))?;
    registry.register_function(one_arg("is_numeric", is_numeric))?;
    registry.register_function(one_arg("intval", intval))?;
    registry.register_function(one_arg("floatval", floatval))?;
    registry.register_function(one_arg("strval", strval))?;
    registry.register_function(one_arg("boolval", boolval))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::test_support::StubContext;

    #[test]
    fn gettype_matches_value_type_name() {
        let mut ctx = StubContext::default();
        assert_eq!(gettype(&mut ctx, &[Value::Int(1)]).unwrap().to_php_string(), b"integer");
        assert_eq!(gettype(&mut ctx, &[Value::Null]).unwrap().to_php_string(), b"NULL");
    }

    #[test]
    fn is_numeric_accepts_numeric_strings_only() {
        let mut ctx = StubContext::default();
        assert!(is_numeric(&mut ctx, &[Value::str("12.5")]).unwrap().to_bool());
        assert!(!is_numeric(&mut ctx, &[Value::str("12abc")]).unwrap().to_bool());
    }
}
