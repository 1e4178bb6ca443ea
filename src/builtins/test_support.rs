//! A minimal `BuiltinCallContext` stub shared by the builtin test modules.
//! Only the methods a given test actually exercises need to do real work;
//! everything else panics on use so a test that didn't expect to touch it
//! fails loudly instead of silently no-opping.
#![cfg(test)]

use std::cell::RefCell;

use crate::abi::context::{BuiltinCallContext, ExecutionContext, OutputBufferStack};
use crate::abi::error::BuiltinFault;
use crate::core::value::Value;
use crate::registry::registry::SymbolRegistry;

#[derive(Default)]
pub struct StubContext {
    pub output: RefCell<Vec<u8>>,
    pub registry: SymbolRegistry,
}

impl BuiltinCallContext for StubContext {
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
        unimplemented!("test didn't expect a user-function call")
    }
    fn throw_exception(&mut self, _exception: Value) {}
    fn halt(&mut self, _exit_code: i32, _message: Option<&[u8]>) -> ! {
        panic!("halt() called in test")
    }
    fn current_function_arg(&self, _index: usize) -> Option<Value> {
        None
    }
    fn current_function_arg_count(&self) -> usize {
        0
    }
    fn execution_context(&mut self) -> &mut dyn ExecutionContext {
        unimplemented!("test didn't expect execution_context()")
    }
    fn output_buffer_stack(&mut self) -> &mut dyn OutputBufferStack {
        unimplemented!("test didn't expect output_buffer_stack()")
    }
}
