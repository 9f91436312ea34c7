mod key_table;
mod summary;

pub use key_table::*;
pub use summary::*;
