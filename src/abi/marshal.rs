//! Argument marshaling: the framework's job, not the built-in's
//! (spec.md §4.C).
//!
//! Given a function's parameter descriptors: (1) check arity against
//! `[min_args, max_args]`, (2) apply defaults for missing optional
//! parameters, (3) pad missing positions with `Null` defensively, (4) for
//! variadic functions, pack the tail into a single array argument appended
//! after the fixed parameters.

use crate::abi::error::BuiltinFault;
use crate::core::array::PhpArray;
use crate::core::value::Value;
use crate::registry::symbols::FunctionDef;

pub fn marshal_args(function: &FunctionDef, args: &[Value]) -> Result<Vec<Value>, BuiltinFault> {
    let got = args.len();
    match function.max_args {
        Some(max) if got < function.min_args || got > max => {
            return Err(BuiltinFault::ArityBounded {
                function: function.name.clone(),
                min: function.min_args,
                max,
                got,
            });
        }
        None if got < function.min_args => {
            return Err(BuiltinFault::ArityUnbounded {
                function: function.name.clone(),
                min: function.min_args,
                got,
            });
        }
        _ => {}
    }

    let fixed_count = if function.is_variadic {
        function.parameters.len() - 1
    } else {
        function.parameters.len()
    };

    let mut marshaled = Vec::with_capacity(function.parameters.len());
    for (i, param) in function.parameters.iter().take(fixed_count).enumerate() {
        let value = args
            .get(i)
            .cloned()
            .or_else(|| param.default_value.clone())
            .unwrap_or(Value::Null);
        marshaled.push(value);
    }

    if function.is_variadic {
        let mut tail = PhpArray::new();
        for v in args.iter().skip(fixed_count) {
            tail.push(v.clone());
        }
        marshaled.push(Value::array(tail));
    }

    Ok(marshaled)
}
