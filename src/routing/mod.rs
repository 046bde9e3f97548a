pub mod routing;
pub mod search;
pub mod stats;
