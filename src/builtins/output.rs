//! Output built-ins: `echo`/`print`'s function-call form, and the `ob_*`
//! family, which is a thin pass-through onto `OutputBufferStack` (spec.md §6).

use crate::abi::context::BuiltinCallContext;
use crate::abi::error::BuiltinFault;
use crate::core::value::Value;
use crate::registry::registry::{RegistryError, SymbolRegistry};
use crate::registry::symbols::{FunctionDef, Parameter};

fn param(name: &str, default: Option<Value>) -> Parameter {
    Parameter {
        name: name.to_string(),
        type_hint: None,
        by_reference: false,
        default_value: default,
        variadic: false,
    }
}

fn print_fn(ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    ctx.write_output(&args[0]);
    Ok(Value::Int(1))
}

fn ob_start(ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let handler = args.first().cloned().filter(|v| !v.is_null());
    let chunk_size = args.get(1).map(|v| v.to_int().max(0) as usize).unwrap_or(0);
    let flags = args.get(2).map(|v| v.to_int() as u32).unwrap_or(0);
    Ok(Value::Bool(ctx.output_buffer_stack().start(handler, chunk_size, flags)))
}

fn ob_get_contents(ctx: &mut dyn BuiltinCallContext, _args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(match ctx.output_buffer_stack().get_contents() {
        Some(bytes) => Value::str(bytes),
        None => Value::Bool(false),
    })
}

fn ob_get_length(ctx: &mut dyn BuiltinCallContext, _args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(match ctx.output_buffer_stack().get_length() {
        Some(len) => Value::Int(len as i64),
        None => Value::Bool(false),
    })
}

fn ob_get_level(ctx: &mut dyn BuiltinCallContext, _args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Int(ctx.output_buffer_stack().level() as i64))
}

fn ob_clean(ctx: &mut dyn BuiltinCallContext, _args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Bool(ctx.output_buffer_stack().clean()))
}

fn ob_flush(ctx: &mut dyn BuiltinCallContext, _args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Bool(ctx.output_buffer_stack().flush()))
}

fn ob_end_clean(ctx: &mut dyn BuiltinCallContext, _args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Bool(ctx.output_buffer_stack().end_clean()))
}

fn ob_end_flush(ctx: &mut dyn BuiltinCallContext, _args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Bool(ctx.output_buffer_stack().end_flush()))
}

fn ob_get_clean(ctx: &mut dyn BuiltinCallContext, _args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(match ctx.output_buffer_stack().get_clean() {
        Some(bytes) => Value::str(bytes),
        None => Value::Bool(false),
    })
}

fn ob_get_flush(ctx: &mut dyn BuiltinCallContext, _args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(match ctx.output_buffer_stack().get_flush() {
        Some(bytes) => Value::str(bytes),
        None => Value::Bool(false),
    })
}

pub fn register(registry: &mut SymbolRegistry) -> Result<(), RegistryError> {
    registry.register_function(FunctionDef::builtin("print", vec![param("value", None)], print_fn))?;
    registry.register_function(FunctionDef::builtin(
        "ob_start",
        vec![
            param("callback", Some(Value::Null)),
            param("chunk_size", Some(Value::Int(0))),
            param("flags", Some(Value::Int(0))),
        ],
        ob_start,
    ))?;
    registry.register_function(FunctionDef::builtin("ob_get_contents", vec![], ob_get_contents))?;
    registry.register_function(FunctionDef::builtin("ob_get_length", vec![], ob_get_length))?;
    registry.register_function(FunctionDef::builtin("ob_get_level", vec![], ob_get_level))?;
    registry.register_function(FunctionDef::builtin("ob_clean", vec![], ob_clean))?;
    registry.register_function(FunctionDef::builtin("ob_flush", vec![], ob_flush))?;
    registry.register_function(FunctionDef::builtin("ob_end_clean", vec![], ob_end_clean))?;
    registry.register_function(FunctionDef::builtin("ob_end_flush", vec![], ob_end_flush))?;
    registry.register_function(FunctionDef::builtin("ob_get_clean", vec![], ob_get_clean))?;
    registry.register_function(FunctionDef::builtin("ob_get_flush", vec![], ob_get_flush))?;
    Ok(())
}
