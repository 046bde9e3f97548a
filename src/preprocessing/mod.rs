mod costs;
mod snapper;

pub use costs::*;
pub use snapper::*;
