pub mod error;
pub mod ingestion;
pub mod preprocessing;
pub mod routing;
pub mod services;
pub mod structures;
pub mod web;

pub use error::{Error, Result};
