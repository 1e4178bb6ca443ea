//! Array built-ins (spec.md §4.D domain: array).

use crate::abi::context::BuiltinCallContext;
use crate::abi::error::BuiltinFault;
use crate::core::array::PhpArray;
use crate::core::value::{loose_eq, strict_eq, ArrayKey, Value};
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

fn as_array(v: &Value) -> Option<std::rc::Rc<std::cell::RefCell<PhpArray>>> {
    match v.deref_once() {
        Value::Array(a) => Some(a),
        _ => None,
    }
}

/// Non-array arguments count as a single element, except `null` which
/// counts as zero (spec.md §8 S1).
fn count(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    match as_array(&args[0]) {
        Some(arr) => Ok(Value::Int(arr.borrow().len() as i64)),
        None if args[0].is_null() => Ok(Value::Int(0)),
        None => Ok(Value::Int(1)),
    }
}

fn array_keys(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let arr = as_array(&args[0]).ok_or_else(|| BuiltinFault::runtime("array_keys(): argument must be an array"))?;
    let mut out = PhpArray::new();
    for key in arr.borrow().keys() {
        out.push(match key {
            ArrayKey::Int(i) => Value::Int(*i),
            ArrayKey::Str(s) => Value::str((**s).clone()),
        });
    }
    Ok(Value::array(out))
}

fn array_values(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let arr = as_array(&args[0]).ok_or_else(|| BuiltinFault::runtime("array_values(): argument must be an array"))?;
    let mut out = PhpArray::new();
    for v in arr.borrow().values() {
        out.push(v.clone());
    }
    Ok(Value::array(out))
}

fn in_array(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let needle = &args[0];
    let arr = as_array(&args[1]).ok_or_else(|| BuiltinFault::runtime("in_array(): haystack must be an array"))?;
    let strict = args.get(2).map(|v| v.to_bool()).unwrap_or(false);
    let found = arr
        .borrow()
        .values()
        .any(|v| if strict { strict_eq(v, needle) } else { loose_eq(v, needle) });
    Ok(Value::Bool(found))
}

fn array_key_exists(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let key = ArrayKey::normalize(&args[0]);
    let arr = as_array(&args[1]).ok_or_else(|| BuiltinFault::runtime("array_key_exists(): argument must be an array"))?;
    Ok(Value::Bool(arr.borrow().contains_key(&key)))
}

fn array_push(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let arr = as_array(&args[0]).ok_or_else(|| BuiltinFault::runtime("array_push(): argument must be an array"))?;
    for v in &args[1..] {
        arr.borrow_mut().push(v.clone());
    }
    let len = arr.borrow().len() as i64;
    Ok(Value::Int(len))
}

fn array_pop(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let arr = as_array(&args[0]).ok_or_else(|| BuiltinFault::runtime("array_pop(): argument must be an array"))?;
    let last_key = arr.borrow().keys().last().cloned();
    match last_key {
        Some(key) => Ok(arr.borrow_mut().remove(&key).unwrap_or(Value::Null)),
        None => Ok(Value::Null),
    }
}

fn array_merge(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let mut out = PhpArray::new();
    for arg in args {
        let arr = as_array(arg).ok_or_else(|| BuiltinFault::runtime("array_merge(): every argument must be an array"))?;
        for (key, value) in arr.borrow().iter() {
            match key {
                ArrayKey::Int(_) => {
                    out.push(value.clone());
                }
                ArrayKey::Str(_) => {
                    out.insert(key.clone(), value.clone());
                }
            }
        }
    }
    Ok(Value::array(out))
}

/// `array_sum` (spec.md §9, resolved open question: integer overflow
/// promotes the running total to `Float`, matching the rest of this core's
/// arithmetic-overflow story rather than wrapping or panicking).
fn array_sum(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let arr = as_array(&args[0]).ok_or_else(|| BuiltinFault::runtime("array_sum(): argument must be an array"))?;
    let mut int_total: i64 = 0;
    let mut float_total: f64 = 0.0;
    let mut overflowed = false;
    for v in arr.borrow().values() {
        if !overflowed {
            match v.deref_once() {
                Value::Int(i) => match int_total.checked_add(i) {
                    Some(sum) => int_total = sum,
                    None => {
                        overflowed = true;
                        float_total = int_total as f64 + i as f64;
                    }
                },
                other => {
                    overflowed = true;
                    float_total = int_total as f64 + other.to_float();
                }
            }
        } else {
            float_total += v.to_float();
        }
    }
    if overflowed {
        Ok(Value::Float(float_total))
    } else {
        Ok(Value::Int(int_total))
    }
}

/// Keeps the first occurrence of each loosely-distinct value, original keys
/// intact (spec.md §8 S3). Comparison is loose (`==`), matching the
/// reference language's default `SORT_STRING`-flavored dedup on the
/// stringified value; this core compares via `loose_eq` directly instead
/// since it doesn't need byte-identical stringification here.
fn array_unique(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let arr = as_array(&args[0]).ok_or_else(|| BuiltinFault::runtime("array_unique(): argument must be an array"))?;
    let mut out = PhpArray::new();
    let mut seen: Vec<Value> = Vec::new();
    for (key, value) in arr.borrow().iter() {
        if seen.iter().any(|v| loose_eq(v, value)) {
            continue;
        }
        seen.push(value.clone());
        out.insert(key.clone(), value.clone());
    }
    Ok(Value::array(out))
}

fn array_map(ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let callback = &args[0];
    let arr = as_array(&args[1]).ok_or_else(|| BuiltinFault::runtime("array_map(): argument must be an array"))?;
    let mut out = PhpArray::new();
    let entries: Vec<(ArrayKey, Value)> = arr.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    for (key, value) in entries {
        let mapped = ctx.call_user_function(callback, &[value])?;
        out.insert(key, mapped);
    }
    Ok(Value::array(out))
}

pub fn register(registry: &mut SymbolRegistry) -> Result<(), RegistryError> {
    registry.register_function(FunctionDef::builtin("count", vec![param("array")], count))?;
    registry.register_function(FunctionDef::builtin("array_keys", vec![param("array")], array_keys))?;
    registry.register_function(FunctionDef::builtin("array_values", vec![param("array")], array_values))?;
    registry.register_function(FunctionDef::builtin(
        "in_array",
        vec![
            param("needle"),
            param("haystack"),
            Parameter { default_value: Some(Value::Bool(false)), ..param("strict") },
        ],
        in_array,
    ))?;
    registry.register_function(FunctionDef::builtin(
        "array_key_exists",
        vec![param("key"), param("array")],
        array_key_exists,
    ))?;
    registry.register_function(FunctionDef::builtin(
        "array_push",
        vec![param("array"), variadic_param("values")],
        array_push,
    ))?;
    registry.register_function(FunctionDef::builtin("array_pop", vec![param("array")], array_pop))?;
    registry.register_function(FunctionDef::builtin(
        "array_merge",
        vec![variadic_param("arrays")],
        array_merge,
    ))?;
    registry.register_function(FunctionDef::builtin("array_sum", vec![param("array")], array_sum))?;
    registry.register_function(FunctionDef::builtin("array_unique", vec![param("array")], array_unique))?;
    registry.register_function(FunctionDef::builtin(
        "array_map",
        vec![param("callback"), param("array")],
        array_map,
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::test_support::StubContext;

    fn arr(values: &[i64]) -> Value {
        let mut a = PhpArray::new();
        for v in values {
            a.push(Value::Int(*v));
        }
        Value::array(a)
    }

    #[test]
    fn array_sum_overflows_to_float() {
        let mut ctx = StubContext::default();
        let a = arr(&[i64::MAX, 1]);
        let r = array_sum(&mut ctx, &[a]).unwrap();
        assert!(matches!(r, Value::Float(_)));
    }

    #[test]
    fn array_sum_stays_int_without_overflow() {
        let mut ctx = StubContext::default();
        let a = arr(&[1, 2, 3]);
        let r = array_sum(&mut ctx, &[a]).unwrap();
        assert!(matches!(r, Value::Int(6)));
    }

    #[test]
    fn array_merge_reindexes_integer_keys_but_keeps_string_keys() {
        let mut ctx = StubContext::default();
        let mut a = PhpArray::new();
        a.push(Value::Int(1));
        a.insert(ArrayKey::Str(std::rc::Rc::new(b"k".to_vec())), Value::Int(2));
        let mut b = PhpArray::new();
        b.push(Value::Int(3));
        let merged = array_merge(&mut ctx, &[Value::array(a), Value::array(b)]).unwrap();
        let arr = as_array(&merged).unwrap();
        assert_eq!(arr.borrow().len(), 3);
    }

    #[test]
    fn array_pop_returns_null_on_empty_array() {
        let mut ctx = StubContext::default();
        let r = array_pop(&mut ctx, &[Value::array(PhpArray::new())]).unwrap();
        assert!(r.is_null());
    }

    #[test]
    fn count_treats_null_as_zero_and_other_scalars_as_one() {
        let mut ctx = StubContext::default();
        assert!(matches!(count(&mut ctx, &[Value::Null]).unwrap(), Value::Int(0)));
        assert!(matches!(count(&mut ctx, &[Value::Int(5)]).unwrap(), Value::Int(1)));
        assert!(matches!(count(&mut ctx, &[arr(&[1, 2, 3])]).unwrap(), Value::Int(3)));
    }

    #[test]
    fn array_unique_keeps_first_occurrence_and_original_keys() {
        let mut ctx = StubContext::default();
        let unique = array_unique(&mut ctx, &[arr(&[1, 2, 2, 3, 1, 4, 3])]).unwrap();
        let backing = as_array(&unique).unwrap();
        let pairs: Vec<(ArrayKey, i64)> = backing.borrow().iter().map(|(k, v)| (k.clone(), v.to_int())).collect();
        assert_eq!(
            pairs,
            vec![
                (ArrayKey::Int(0), 1),
                (ArrayKey::Int(1), 2),
                (ArrayKey::Int(3), 3),
                (ArrayKey::Int(5), 4),
            ]
        );
    }
}
