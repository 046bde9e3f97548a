use thiserror::Error;

use crate::structures::NodeID;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No path found between node {from} and node {to}")]
    NoPathFound { from: NodeID, to: NodeID },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Snapping failed: {0}")]
    SnapFailure(String),
    #[error("Network artifact not found at '{0}'")]
    ArtifactMissing(String),
    #[error("Incompatible network artifact: {0}")]
    ArtifactVersion(String),
    #[error("Node {0} not found")]
    NodeNotFound(NodeID),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OSM error: {0}")]
    Osm(#[from] osmpbf::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
    #[error("Serialization error: {0}")]
    Postcard(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
