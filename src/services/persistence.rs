use std::{fs, io::ErrorKind};

use postcard::{from_bytes, to_allocvec};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Error, Result, structures::Graph};

static ARTIFACT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ArtifactRef<'a> {
    version: u32,
    graph: &'a Graph,
}

#[derive(Deserialize)]
struct Artifact {
    version: u32,
    graph: Graph,
}

pub fn save_graph(graph: &Graph, path: &str) -> Result<()> {
    let bytes = to_allocvec(&ArtifactRef {
        version: ARTIFACT_VERSION,
        graph,
    })?;
    fs::write(path, &bytes)?;
    info!("Graph saved to {} ({} bytes)", path, bytes.len());
    Ok(())
}

/// Loads a cost-annotated network written by [`save_graph`].
pub fn load_graph(path: &str) -> Result<Graph> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::ArtifactMissing(path.to_string()),
        _ => Error::Io(e),
    })?;
    let artifact: Artifact = from_bytes(&bytes)?;
    if artifact.version != ARTIFACT_VERSION {
        return Err(Error::ArtifactVersion(format!(
            "'{path}' has version {}, expected {ARTIFACT_VERSION}",
            artifact.version
        )));
    }
    info!(
        "Graph restored from {} ({} nodes, {} edges)",
        path,
        artifact.graph.node_count(),
        artifact.graph.edge_count()
    );
    Ok(artifact.graph)
}
