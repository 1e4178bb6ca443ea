pub mod array;
pub mod callable;
pub mod object;
pub mod value;

pub use array::PhpArray;
pub use callable::Callable;
pub use object::{ObjectData, ObjectId};
pub use value::{loose_eq, strict_eq, ArrayKey, Reference, Value};
