use std::fs;

use serde::Deserialize;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub build: BuildConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize)]
pub struct BuildConfig {
    pub inputs: Vec<Ingestor>,
    pub output: String,
    /// Barriers farther than this from every segment are discarded (meters).
    #[serde(default)]
    pub max_snap_distance: Option<f64>,
    /// Fraction of discarded barriers above which the build fails.
    #[serde(default = "default_max_discard_ratio")]
    pub max_discard_ratio: f64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "ingestor")]
pub enum Ingestor {
    #[serde(rename = "osm/pbf")]
    OsmPbf(OsmPbfIngestor),
    #[serde(rename = "barriers/csv")]
    BarriersCsv(BarriersCsvIngestor),
}

#[derive(Debug, Deserialize)]
pub struct OsmPbfIngestor {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct BarriersCsvIngestor {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Used when a query gives neither a weight nor a tolerance.
    pub default_barrier_weight: f64,
    pub max_barrier_weight: f64,
    /// Power applied to an edge's accessibility cost; must exceed 1.
    pub exponent: f64,
    /// Barrier weights below this route on length alone.
    pub zero_threshold: f64,
    /// Degrees added around the network bounding box when validating queries.
    pub bounds_margin: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug)]
pub enum SourceLocation {
    Local(String),
    Remote(String),
}

fn default_max_discard_ratio() -> f64 {
    0.5
}

impl Default for RoutingConfig {
    fn default() -> Self {
        RoutingConfig {
            default_barrier_weight: 5.0,
            max_barrier_weight: 10.0,
            exponent: crate::structures::DEFAULT_EXPONENT,
            zero_threshold: crate::structures::DEFAULT_ZERO_THRESHOLD,
            bounds_margin: 0.01,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Ingestor {
    pub fn label(&self) -> &str {
        match self {
            Ingestor::OsmPbf(_) => "osm/pbf",
            Ingestor::BarriersCsv(c) => &c.name,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Ingestor::OsmPbf(c) => &c.url,
            Ingestor::BarriersCsv(c) => &c.url,
        }
    }

    pub fn location(&self) -> Result<SourceLocation> {
        let url = self.url();
        if let Some(path) = url.strip_prefix("path:") {
            Ok(SourceLocation::Local(path.to_string()))
        } else if url.starts_with("http://") || url.starts_with("https://") {
            Ok(SourceLocation::Remote(url.to_string()))
        } else {
            Err(Error::Config(format!(
                "Unknown URL scheme for '{}': {url}",
                self.label()
            )))
        }
    }

    /// Local path of the input. Downloads happen outside this tool.
    pub fn resolve_path(&self) -> Result<String> {
        match self.location()? {
            SourceLocation::Local(path) => Ok(path),
            SourceLocation::Remote(url) => Err(Error::Config(format!(
                "'{}' must be downloaded beforehand and referenced with path: ({url})",
                self.label()
            ))),
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.exponent.is_finite() && self.exponent > 1.0) {
            return Err(Error::Config(format!(
                "routing.exponent must be greater than 1, got {}",
                self.exponent
            )));
        }
        if !(self.max_barrier_weight.is_finite() && self.max_barrier_weight > 0.0) {
            return Err(Error::Config(format!(
                "routing.max_barrier_weight must be positive, got {}",
                self.max_barrier_weight
            )));
        }
        if !(0.0..=self.max_barrier_weight).contains(&self.default_barrier_weight) {
            return Err(Error::Config(format!(
                "routing.default_barrier_weight must lie in [0, {}], got {}",
                self.max_barrier_weight, self.default_barrier_weight
            )));
        }
        if !(self.zero_threshold.is_finite() && self.zero_threshold >= 0.0) {
            return Err(Error::Config(format!(
                "routing.zero_threshold must be non-negative, got {}",
                self.zero_threshold
            )));
        }
        if !(self.bounds_margin.is_finite() && self.bounds_margin >= 0.0) {
            return Err(Error::Config(format!(
                "routing.bounds_margin must be non-negative, got {}",
                self.bounds_margin
            )));
        }
        Ok(())
    }
}

impl BuildConfig {
    pub fn network(&self) -> Result<&Ingestor> {
        let mut networks = self
            .inputs
            .iter()
            .filter(|i| matches!(i, Ingestor::OsmPbf(_)));
        match (networks.next(), networks.next()) {
            (Some(network), None) => Ok(network),
            (None, _) => Err(Error::Config("build needs one osm/pbf input".to_string())),
            (Some(_), Some(_)) => Err(Error::Config(
                "build accepts a single osm/pbf input".to_string(),
            )),
        }
    }

    pub fn barriers(&self) -> impl Iterator<Item = &Ingestor> {
        self.inputs
            .iter()
            .filter(|i| matches!(i, Ingestor::BarriersCsv(_)))
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config '{path}': {e}")))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = serde_yml::from_str(content)?;
        config.routing.validate()?;
        Ok(config)
    }
}
