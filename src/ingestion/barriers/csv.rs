use std::{fs::File, io::Read};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    Result,
    structures::{BarrierObservation, LatLng},
};

/// Row of the cleaned barrier export. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct BarrierRecord {
    lat: f64,
    lon: f64,
    #[serde(default)]
    label: String,
    #[serde(default)]
    neighborhood: String,
    severity: f64,
    #[serde(default)]
    is_temporary: String,
    #[serde(default)]
    adjusted_severity: Option<f64>,
}

impl BarrierRecord {
    fn into_observation(self) -> Option<BarrierObservation> {
        let lat_lng = LatLng::new(self.lat, self.lon);
        if !lat_lng.is_finite() || !self.severity.is_finite() {
            return None;
        }

        let severity = self.severity.round().clamp(0.0, u8::MAX as f64) as u8;
        // Without a normalized column, map the 1-5 rating onto 0-10.
        let adjusted_severity = match self.adjusted_severity {
            Some(v) if v.is_finite() => v,
            Some(_) => return None,
            None => severity as f64 * 2.0,
        };

        Some(BarrierObservation {
            lat_lng,
            severity,
            adjusted_severity,
            label: self.label,
            neighborhood: self.neighborhood,
            is_temporary: matches!(
                self.is_temporary.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes"
            ),
        })
    }
}

pub fn load_barriers(csv_path: &str) -> Result<Vec<BarrierObservation>> {
    let barriers = read_barriers(File::open(csv_path)?)?;
    info!("Loaded {} barriers from {}", barriers.len(), csv_path);
    Ok(barriers)
}

/// Parses barrier rows; malformed rows are skipped with a warning.
pub fn read_barriers<R: Read>(reader: R) -> Result<Vec<BarrierObservation>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut barriers = Vec::new();
    let mut skipped = 0usize;

    for (line, record) in rdr.deserialize::<BarrierRecord>().enumerate() {
        match record.map(BarrierRecord::into_observation) {
            Ok(Some(barrier)) => barriers.push(barrier),
            Ok(None) => skipped += 1,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!("Skipping barrier row {}: {e}", line + 2);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} barrier rows with missing or invalid values");
    }

    Ok(barriers)
}
