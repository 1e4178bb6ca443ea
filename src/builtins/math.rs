//! Math built-ins (spec.md §4.D domain: math).

use crate::abi::context::BuiltinCallContext;
use crate::abi::error::BuiltinFault;
use crate::core::value::{loose_eq, Value};
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

fn abs(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    match args[0].deref_once() {
        Value::Int(i) => Ok(Value::Int(i.wrapping_abs())),
        other => Ok(Value::Float(other.to_float().abs())),
    }
}

fn floor(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Float(args[0].to_float().floor()))
}

fn ceil(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    Ok(Value::Float(args[0].to_float().ceil()))
}

fn round(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let precision = if args.len() > 1 { args[1].to_int() } else { 0 };
    let factor = 10f64.powi(precision as i32);
    Ok(Value::Float((args[0].to_float() * factor).round() / factor))
}

fn intdiv(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let divisor = args[1].to_int();
    if divisor == 0 {
        return Err(BuiltinFault::runtime("Division by zero"));
    }
    Ok(Value::Int(args[0].to_int().wrapping_div(divisor)))
}

fn pow_fn(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    if let (Value::Int(base), Value::Int(exp)) = (args[0].deref_once(), args[1].deref_once()) {
        if exp >= 0 {
            if let Some(result) = base.checked_pow(exp as u32) {
                return Ok(Value::Int(result));
            }
        }
    }
    Ok(Value::Float(args[0].to_float().powf(args[1].to_float())))
}

/// `max($a, $b, ...)` / a single array argument; compares with loose
/// ordering built from pairwise `==` plus numeric comparison, same as the
/// rest of the loose-comparison surface.
fn max_fn(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    pick_extreme(args, true)
}

fn min_fn(_ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    pick_extreme(args, false)
}

fn pick_extreme(args: &[Value], want_max: bool) -> Result<Value, BuiltinFault> {
    let values: Vec<Value> = if args.len() == 1 && args[0].is_array() {
        match args[0].deref_once() {
            Value::Array(a) => a.borrow().values().cloned().collect(),
            _ => unreachable!(),
        }
    } else {
        args.to_vec()
    };
    if values.is_empty() {
        return Err(BuiltinFault::runtime("max()/min() expects at least one value"));
    }
    let mut best = values[0].clone();
    for v in &values[1..] {
        let v_is_better = if want_max {
            v.to_float() > best.to_float() && !loose_eq(v, &best)
        } else {
            v.to_float() < best.to_float() && !loose_eq(v, &best)
        };
        if v_is_better {
            best = v.clone();
        }
    }
    Ok(best)
}

pub fn register(registry: &mut SymbolRegistry) -> Result<(), RegistryError> {
    registry.register_function(FunctionDef::builtin("abs", vec![param("num")], abs))?;
    registry.register_function(FunctionDef::builtin("floor", vec![param("num")], floor))?;
    registry.register_function(FunctionDef::builtin("ceil", vec![param("num")], ceil))?;
    registry.register_function(FunctionDef::builtin(
        "round",
        vec![
            param("num"),
            Parameter { default_value: Some(Value::Int(0)), ..param("precision") },
        ],
        round,
    ))?;
    registry.register_function(FunctionDef::builtin("intdiv", vec![param("num1"), param("num2")], intdiv))?;
    registry.register_function(FunctionDef::builtin("pow", vec![param("num"), param("exponent")], pow_fn))?;
    registry.register_function(FunctionDef::builtin("max", vec![variadic_param("values")], max_fn))?;
    registry.register_function(FunctionDef::builtin("min", vec![variadic_param("values")], min_fn))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::test_support::StubContext;

    #[test]
    fn intdiv_by_zero_errors() {
        let mut ctx = StubContext::default();
        assert!(intdiv(&mut ctx, &[Value::Int(4), Value::Int(0)]).is_err());
    }

    #[test]
    fn pow_integer_exponent_stays_int_when_it_fits() {
        let mut ctx = StubContext::default();
        let r = pow_fn(&mut ctx, &[Value::Int(2), Value::Int(10)]).unwrap();
        assert!(matches!(r, Value::Int(1024)));
    }

    #[test]
    fn max_picks_the_largest_by_loose_comparison() {
        let mut ctx = StubContext::default();
        let r = max_fn(&mut ctx, &[Value::Int(1), Value::Int(5), Value::Int(3)]).unwrap();
        assert_eq!(r.to_int(), 5);
    }
}
