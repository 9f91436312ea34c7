mod deserialization;
mod error;
pub mod macros;
mod serialization;

pub use deserialization::*;
pub use error::*;
pub use serialization::*;
