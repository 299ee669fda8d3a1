pub mod reader;
pub mod spectrum;
