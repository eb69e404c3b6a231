pub mod chain;
pub mod common;
