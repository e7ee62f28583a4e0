pub mod file;
pub mod generator;
