pub mod context;
pub mod error;
pub mod marshal;

pub use context::{BuiltinCallContext, ExecutionContext, NativeHandler, OutputBufferStack};
pub use error::BuiltinFault;
pub use marshal::marshal_args;
