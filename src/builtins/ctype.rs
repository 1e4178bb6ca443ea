//! `ctype_*` built-ins (spec.md §4.D domain: ctype; §9 resolved open
//! question).
//!
//! The reference language's ctype family has a legacy non-strict quirk:
//! an `int` argument in `[-128, 255]` is treated as a single ASCII char
//! code rather than coerced to its decimal string representation (so
//! `ctype_digit(50)` is false — 50 is `'2'`'s code, not a digit char —
//! while `ctype_digit("50")` is true). Integers outside that range, and
//! every other type, fail immediately. This module follows that rule
//! rather than the more "obvious" string-coercion behavior, since builtins
//! here mirror the reference language's actual semantics, quirks included.

use crate::abi::context::BuiltinCallContext;
use crate::abi::error::BuiltinFault;
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

/// Resolve a ctype argument to the byte string it should test, or `None`
/// if the argument is ineligible (wrong type, or an int outside
/// `[-128, 255]`).
fn ctype_subject(value: &Value) -> Option<Vec<u8>> {
    match value.deref_once() {
        Value::String(s) => Some((*s).clone()),
        Value::Int(i) if (-128..=255).contains(&i) => Some(vec![i as u8]),
        _ => None,
    }
}

fn ctype_test(args: &[Value], pred: fn(u8) -> bool) -> Value {
    match ctype_subject(&args[0]) {
        Some(s) if !s.is_empty() => Value::Bool(s.iter().all(|&b| pred(b))),
        _ => Value::Bool(false),
    }
}

fn ctype_lower(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(ctype_test(args, |b| b.is_ascii_lowercase()))
}

fn ctype_upper(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(ctype_test(args, |b| b.is_ascii_uppercase()))
}

fn ctype_digit(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(ctype_test(args, |b| b.is_ascii_digit()))
}

fn ctype_alpha(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(ctype_test(args, |b| b.is_ascii_alphabetic()))
}

fn ctype_alnum(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(ctype_test(args, |b| b.is_ascii_alphanumeric()))
}

pub fn register(registry: &mut SymbolRegistry) -> Result<(), RegistryError> {
    registry.register_function(FunctionDef::builtin("ctype_lower", vec![param("text")], ctype_lower))?;
    registry.register_function(FunctionDef::builtin("ctype_upper", vec![param("text")], ctype_upper))?;
    registry.register_function(FunctionDef::builtin("ctype_digit", vec![param("text")], ctype_digit))?;
    registry.register_function(FunctionDef::builtin("ctype_alpha", vec![param("text")], ctype_alpha))?;
    registry.register_function(FunctionDef::builtin("ctype_alnum", vec![param("text")], ctype_alnum))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::test_support::StubContext;

    #[test]
    fn ctype_digit_int_is_treated_as_char_code_not_digits() {
        let mut ctx = StubContext::default();
        assert!(!ctype_digit(&mut ctx, &[Value::Int(50)]).unwrap().to_bool());
        assert!(ctype_digit(&mut ctx, &[Value::str("50")]).unwrap().to_bool());
    }

    #[test]
    fn ctype_lower_empty_string_is_false() {
        let mut ctx = StubContext::default();
        assert!(!ctype_lower(&mut ctx, &[Value::str("")]).unwrap().to_bool());
    }

    #[test]
    fn ctype_alpha_rejects_mixed_content() {
        let mut ctx = StubContext::default();
        assert!(ctype_alpha(&mut ctx, &[Value::str("abcXYZ")]).unwrap().to_bool());
        assert!(!ctype_alpha(&mut ctx, &[Value::str("abc123")]).unwrap().to_bool());
    }
}
