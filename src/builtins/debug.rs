//! `print_r`/`var_dump` (spec.md §4.A "Copy-on-write"/§8 S5): the value
//! model explicitly calls out that these two printers must detect an array
//! that contains itself and emit `*RECURSION*` on revisit rather than
//! looping forever.

use std::rc::Rc;

use crate::abi::context::BuiltinCallContext;
use crate::abi::error::BuiltinFault;
use crate::core::array::PhpArray;
use crate::core::value::{ArrayKey, Value};
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

fn variadic_param(name: &str) -> Parameter {
    Parameter {
        name: name.to_string(),
        type_hint: None,
        by_reference: false,
        default_value: None,
        variadic: true,
    }
}

/// Identity of a `Value::Array`'s backing cell, used to detect a container
/// that has been entered higher up the same print — two `Value::Array`s
/// alias the same array iff they share this pointer (spec.md §3.2: arrays
/// are copy-on-write, so aliasing, not structural equality, is what makes
/// an array "the same container").
fn array_identity(arr: &Rc<std::cell::RefCell<PhpArray>>) -> usize {
    Rc::as_ptr(arr) as usize
}

fn print_r_array(arr: &Rc<std::cell::RefCell<PhpArray>>, indent: usize, visiting: &mut Vec<usize>) -> String {
    let id = array_identity(arr);
    visiting.push(id);
    let mut out = String::new();
    out.push_str("Array\n");
    out.push_str(&" ".repeat(indent));
    out.push_str("(\n");
    for (key, value) in arr.borrow().iter() {
        out.push_str(&" ".repeat(indent + 4));
        out.push_str(&format!("[{key}] => "));
        match value.deref_once() {
            Value::Array(inner) => {
                if visiting.contains(&array_identity(&inner)) {
                    out.push_str("Array\n *RECURSION*\n");
                } else {
                    out.push_str(&print_r_array(&inner, indent + 4, visiting));
                    out.push('\n');
                }
            }
            other => {
                out.push_str(&String::from_utf8_lossy(&other.to_php_string()));
                out.push('\n');
            }
        }
    }
    out.push_str(&" ".repeat(indent));
    out.push_str(")\n");
    visiting.pop();
    out
}

fn print_r_to_string(value: &Value) -> String {
    match value.deref_once() {
        Value::Array(arr) => print_r_array(&arr, 0, &mut Vec::new()),
        other => String::from_utf8_lossy(&other.to_php_string()).into_owned(),
    }
}

fn dump_key(key: &ArrayKey) -> String {
    match key {
        ArrayKey::Int(i) => i.to_string(),
        ArrayKey::Str(s) => format!("\"{}\"", String::from_utf8_lossy(s)),
    }
}

fn var_dump_one(value: &Value, indent: usize, visiting: &mut Vec<usize>, out: &mut String) {
    let pad = " ".repeat(indent);
    match value.deref_once() {
        Value::Null => out.push_str(&format!("{pad}NULL\n")),
        Value::Bool(b) => out.push_str(&format!("{pad}bool({b})\n")),
        Value::Int(i) => out.push_str(&format!("{pad}int({i})\n")),
        Value::Float(_) => out.push_str(&format!("{pad}float({})\n", String::from_utf8_lossy(&value.to_php_string()))),
        Value::String(s) => out.push_str(&format!("{pad}string({}) \"{}\"\n", s.len(), String::from_utf8_lossy(&s))),
        Value::Array(arr) => {
            let id = array_identity(&arr);
            if visiting.contains(&id) {
                out.push_str(&format!("{pad}*RECURSION*\n"));
                return;
            }
            visiting.push(id);
            let len = arr.borrow().len();
            out.push_str(&format!("{pad}array({len}) {{\n"));
            for (key, entry) in arr.borrow().iter() {
                out.push_str(&format!("{pad}  [{}]=>\n", dump_key(key)));
                var_dump_one(entry, indent + 2, visiting, out);
            }
            out.push_str(&format!("{pad}}}\n"));
            visiting.pop();
        }
        Value::Object(_) => out.push_str(&format!("{pad}object(stdClass)#0 (0) {{\n{pad}}}\n")),
        Value::Resource(id) => out.push_str(&format!("{pad}resource({id}) of type (resource)\n")),
        Value::Callable(_) => out.push_str(&format!("{pad}object(Closure)#0 (0) {{\n{pad}}}\n")),
        Value::Reference(_) => unreachable!("deref_once never returns Reference"),
    }
}

fn print_r(ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let rendered = print_r_to_string(&args[0]);
    let return_instead = args.get(1).map(|v| v.to_bool()).unwrap_or(false);
    if return_instead {
        Ok(Value::str(rendered))
    } else {
        ctx.write_output(&Value::str(rendered));
        Ok(Value::Bool(true))
    }
}

fn var_dump(ctx: &mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault> {
    let mut out = String::new();
    for value in args {
        var_dump_one(value, 0, &mut Vec::new(), &mut out);
    }
    ctx.write_output(&Value::str(out));
    Ok(Value::Null)
}

pub fn register(registry: &mut SymbolRegistry) -> Result<(), RegistryError> {
    registry.register_function(FunctionDef::builtin(
        "print_r",
        vec![param("value", None), param("return", Some(Value::Bool(false)))],
        print_r,
    ))?;
    registry.register_function(FunctionDef::builtin("var_dump", vec![variadic_param("values")], var_dump))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::test_support::StubContext;

    #[test]
    fn print_r_of_self_referencing_array_matches_scenario_s5() {
        let mut arr = PhpArray::new();
        arr.push(Value::Int(1));
        arr.push(Value::Int(2));
        let cell = Rc::new(std::cell::RefCell::new(arr));
        cell.borrow_mut().push(Value::Array(cell.clone()));

        let rendered = print_r_to_string(&Value::Array(cell));
        assert_eq!(
            rendered,
            "Array\n(\n    [0] => 1\n    [1] => 2\n    [2] => Array\n *RECURSION*\n)\n"
        );
    }

    #[test]
    fn print_r_with_return_true_does_not_touch_output() {
        let mut ctx = StubContext::default();
        let mut arr = PhpArray::new();
        arr.push(Value::Int(1));
        let r = print_r(&mut ctx, &[Value::array(arr), Value::Bool(true)]).unwrap();
        assert_eq!(r.to_php_string(), b"Array\n(\n    [0] => 1\n)\n");
        assert!(ctx.output.borrow().is_empty());
    }

    #[test]
    fn var_dump_detects_recursion() {
        let mut arr = PhpArray::new();
        arr.push(Value::Int(1));
        let cell = Rc::new(std::cell::RefCell::new(arr));
        cell.borrow_mut().push(Value::Array(cell.clone()));

        let mut out = String::new();
        var_dump_one(&Value::Array(cell), 0, &mut Vec::new(), &mut out);
        assert!(out.contains("*RECURSION*"));
    }

    #[test]
    fn var_dump_writes_scalars_through_the_context() {
        let mut ctx = StubContext::default();
        var_dump(&mut ctx, &[Value::Int(5), Value::str("hi")]).unwrap();
        assert_eq!(*ctx.output.borrow(), b"int(5)\nstring(2) \"hi\"\n".to_vec());
    }
}
