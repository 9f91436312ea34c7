pub mod binary;
pub mod primitive;
pub mod string;

pub extern crate uuid;

pub use edjekit_core_derive::*;
