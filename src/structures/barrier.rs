use serde::{Deserialize, Serialize};

use crate::structures::LatLng;

/// A geotagged accessibility barrier, as delivered by the cleaning step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarrierObservation {
    pub lat_lng: LatLng,
    /// Raw rating, 1 to 5.
    pub severity: u8,
    /// Normalized rating, 0 to 10. This is what edges accumulate.
    pub adjusted_severity: f64,
    pub label: String,
    pub neighborhood: String,
    pub is_temporary: bool,
}
