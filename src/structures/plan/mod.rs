mod geometry;
mod node;
mod plan;

pub use geometry::*;
pub use node::*;
pub use plan::*;
