mod barrier;
mod config;
mod edge;
mod geo;
mod graph;
mod node;
pub mod plan;
mod routingparameters;

pub use barrier::*;
pub use config::*;
pub use edge::*;
pub use geo::*;
pub use graph::*;
pub use node::*;
pub use routingparameters::*;

#[cfg(test)]
pub(crate) use graph::fixtures;
