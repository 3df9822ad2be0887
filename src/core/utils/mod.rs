#[macro_use]
pub mod safety;
