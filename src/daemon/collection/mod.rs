pub mod collector;
pub mod probe;
