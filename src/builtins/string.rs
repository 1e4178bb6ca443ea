//! String built-ins (spec.md §4.D domain: string).

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

fn strlen(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Int(args[0].to_php_string().len() as i64))
}

fn strtolower(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::str(args[0].to_php_string().to_ascii_lowercase()))
}

fn strtoupper(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::str(args[0].to_php_string().to_ascii_uppercase()))
}

fn trim(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let s = args[0].to_php_string();
    let trimmed = trim_bytes(&s);
    Ok(Value::str(trimmed))
}

fn trim_bytes(s: &[u8]) -> Vec<u8> {
    const DEFAULT_CHARS: &[u8] = b" \t\n\r\0\x0b";
    let start = s.iter().position(|b| !DEFAULT_CHARS.contains(b)).unwrap_or(s.len());
    let end = s.iter().rposition(|b| !DEFAULT_CHARS.contains(b)).map(|i| i + 1).unwrap_or(0);
    if start >= end {
        Vec::new()
    } else {
        s[start..end].to_vec()
    }
}

fn str_repeat(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let s = args[0].to_php_string();
    let times = args[1].to_int().max(0) as usize;
    Ok(Value::str(s.repeat(times)))
}

fn str_contains(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let haystack = args[0].to_php_string();
    let needle = args[1].to_php_string();
    if needle.is_empty() {
        return Ok(Value::Bool(true));
    }
    let found = haystack.windows(needle.len()).any(|w| w == needle.as_slice());
    Ok(Value::Bool(found))
}

/// `substr($s, $start, $length)` (spec.md §9, resolved open question:
/// follow the reference language). Negative `$start` counts from the end
/// (clamped to 0 rather than wrapping past it); negative `$length` stops
/// that many characters before the end of the string instead of a count
/// from `$start`; omitted `$length` (`Null`) means "through the end".
fn substr(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let s = args[0].to_php_string();
    let len = s.len() as i64;
    let start_arg = args[1].to_int();
    let start = if start_arg < 0 {
        (len + start_arg).max(0)
    } else {
        start_arg.min(len)
    };
    let end = if args.len() > 2 && !args[2].is_null() {
        let length = args[2].to_int();
        if length < 0 {
            (len + length).max(start)
        } else {
            (start + length).min(len)
        }
    } else {
        len
    };
    if start >= end {
        return Ok(Value::str(""));
    }
    Ok(Value::str(s[start as usize..end as usize].to_vec()))
}

fn str_split(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let s = args[0].to_php_string();
    let chunk = if args.len() > 1 { args[1].to_int().max(1) as usize } else { 1 };
    let mut arr = crate::core::array::PhpArray::new();
    for piece in s.chunks(chunk) {
        arr.push(Value::str(piece.to_vec()));
    }
    Ok(Value::array(arr))
}

pub fn register(registry: &mut SymbolRegistry) -> Result<(), RegistryError> {
    registry.register_function(FunctionDef::builtin("strlen", vec![param("string", None)], strlen))?;
    registry.register_function(FunctionDef::builtin("strtolower", vec![param("string", None)], strtolower))?;
    registry.register_function(FunctionDef::builtin("strtoupper", vec![param("string", None)], strtoupper))?;
    registry.register_function(FunctionDef::builtin("trim", vec![param("string", None)], trim))?;
    registry.register_function(FunctionDef::builtin(
        "str_repeat",
        vec![param("string", None), param("times", None)],
        str_repeat,
    ))?;
    registry.register_function(FunctionDef::builtin(
        "str_contains",
        vec![param("haystack", None), param("needle", None)],
        str_contains,
    ))?;
    registry.register_function(FunctionDef::builtin(
        "substr",
        vec![param("string", None), param("start", None), param("length", Some(Value::Null))],
        substr,
    ))?;
    registry.register_function(FunctionDef::builtin(
        "str_split",
        vec![param("string", None), param("length", Some(Value::Int(1)))],
        str_split,
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::test_support::StubContext;

    #[test]
    fn substr_negative_start_counts_from_end() {
        let mut ctx = StubContext::default();
        let r = substr(&mut ctx, &[Value::str("Hello World"), Value::Int(-5), Value::Null]).unwrap();
        assert_eq!(r.to_php_string(), b"World");
    }

    #[test]
    fn substr_negative_length_stops_before_end() {
        let mut ctx = StubContext::default();
        let r = substr(&mut ctx, &[Value::str("Hello World"), Value::Int(0), Value::Int(-6)]).unwrap();
        assert_eq!(r.to_php_string(), b"Hello");
    }

    #[test]
    fn substr_start_past_end_is_empty() {
        let mut ctx = StubContext::default();
        let r = substr(&mut ctx, &[Value::str("hi"), Value::Int(10), Value::Null]).unwrap();
        assert_eq!(r.to_php_string(), b"");
    }

    #[test]
    fn trim_strips_default_whitespace_only() {
        let mut ctx = StubContext::default();
        let r = trim(&mut ctx, &[Value::str("  hi\n\t")]).unwrap();
        assert_eq!(r.to_php_string(), b"hi");
    }

    #[test]
    fn str_contains_empty_needle_is_always_true() {
        let mut ctx = StubContext::default();
        assert!(str_contains(&mut ctx, &[Value::str("abc"), Value::str("")]).unwrap().to_bool());
    }
}
