pub mod build;
pub mod persistence;
