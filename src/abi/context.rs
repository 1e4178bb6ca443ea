//! The built-in call ABI (spec.md §4.C) and the two capability interfaces
//! the core consumes from the VM (spec.md §6).
//!
//! Per spec.md §9's "interface smuggling" redesign note: the teacher's
//! `NativeHandler` is `fn(&mut VM, args: &[Handle]) -> Result<Handle, String>`,
//! naming the concrete `VM` type directly and forcing the registry crate to
//! depend on the VM crate. Here the handler is defined over a narrow trait
//! this crate owns, so a host VM can implement it without this crate ever
//! importing the VM.

use crate::abi::error::BuiltinFault;
use crate::core::value::Value;
use crate::registry::registry::SymbolRegistry;

/// The signature every built-in function implements.
pub type NativeHandler = fn(&mut dyn BuiltinCallContext, args: &[Value]) -> Result<Value, BuiltinFault>;

/// Capability bundle handed to a built-in: exactly what a native function
/// legitimately needs and nothing more (spec.md §4.C).
pub trait BuiltinCallContext {
    /// Append to the current output sink, honoring the output-buffer stack.
    fn write_output(&mut self, value: &Value);

    fn get_global(&self, name: &str) -> Option<Value>;
    fn set_global(&mut self, name: &str, value: Value);

    fn symbol_registry(&self) -> &SymbolRegistry;

    fn lookup_user_function(&self, name: &str) -> bool {
        self.symbol_registry().lookup_function(name).is_some()
    }
    fn lookup_user_class(&self, name: &str) -> bool {
        self.symbol_registry().lookup_class(name).is_some()
    }

    /// Re-enter the VM to invoke user code (`array_map`, `call_user_func`,
    /// sort comparators, ...).
    fn call_user_function(&mut self, callable: &Value, args: &[Value]) -> Result<Value, BuiltinFault>;

    /// Raise a PHP exception from a built-in.
    fn throw_exception(&mut self, exception: Value);

    /// Terminate execution (`exit`/`die`).
    fn halt(&mut self, exit_code: i32, message: Option<&[u8]>) -> !;

    fn current_function_arg(&self, index: usize) -> Option<Value>;
    fn current_function_arg_count(&self) -> usize;

    fn execution_context(&mut self) -> &mut dyn ExecutionContext;
    fn output_buffer_stack(&mut self) -> &mut dyn OutputBufferStack;

    /// Back `go($callable, ...$args)` (spec.md §4.F). The goroutine
    /// substrate in `concurrency::go` is thread-based and needs a `Send`
    /// closure; `BuiltinCallContext` itself is `&mut dyn` and tied to one
    /// interpreter thread, so it cannot be moved into a spawned thread
    /// directly. A host capable of running bytecode on more than one thread
    /// (e.g. one VM instance per OS thread, each with its own per-task copy
    /// of script-visible globals per spec.md §4.F) should override this to
    /// dispatch through `concurrency::go`. The default here runs the
    /// callable inline — correct but not concurrent, the right fallback for
    /// a single-threaded host.
    fn spawn_goroutine(&mut self, callable: &Value, args: &[Value]) -> Result<Value, BuiltinFault> {
        self.call_user_function(callable, args)
    }
}

/// What the core consumes from the VM to re-enter user code (spec.md §6).
pub trait ExecutionContext {
    fn create_call_frame(&mut self, function: &str, args: &[Value]) -> u64;
    fn execute_function(&mut self, frame: u64) -> Result<Value, String>;
    fn call_stack_depth(&self) -> usize;
    fn current_frame(&self) -> Option<u64>;
}

/// Output buffering stack, consumed by `ob_*` built-ins (spec.md §6).
pub trait OutputBufferStack {
    fn start(&mut self, handler: Option<Value>, chunk_size: usize, flags: u32) -> bool;
    fn write(&mut self, bytes: &[u8]);
    fn get_contents(&self) -> Option<Vec<u8>>;
    fn get_length(&self) -> Option<usize>;
    fn level(&self) -> usize;
    fn clean(&mut self) -> bool;
    fn flush(&mut self) -> bool;
    fn end_clean(&mut self) -> bool;
    fn end_flush(&mut self) -> bool;
    fn get_clean(&mut self) -> Option<Vec<u8>>;
    fn get_flush(&mut self) -> Option<Vec<u8>>;
    fn list_handlers(&self) -> Vec<String>;
    fn set_implicit_flush(&mut self, enabled: bool);
}
