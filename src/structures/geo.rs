use std::fmt::Display;

use serde::{Deserialize, Serialize};

static EARTH_RADIUS: f64 = 6365396.0;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        LatLng {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Great-circle distance in meters between two `[lat, lon]` slices.
    ///
    /// Shaped for `kdtree`, which hands distance functions raw slices.
    pub fn distance(loc1: &[f64], loc2: &[f64]) -> f64 {
        LatLng::new(loc1[0], loc1[1]).dist(LatLng::new(loc2[0], loc2[1]))
    }

    pub fn dist(&self, other: Self) -> f64 {
        let delta_latitude = (self.latitude - other.latitude).to_radians();
        let delta_longitude = (self.longitude - other.longitude).to_radians();

        let central_angle_inner = (delta_latitude / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (delta_longitude / 2.0).sin().powi(2);
        let central_angle = 2.0 * central_angle_inner.sqrt().asin();

        EARTH_RADIUS * central_angle
    }
}

/// Planar coordinate in meters, relative to a [`Projection`] origin.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn as_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// Local equirectangular projection.
///
/// Flat enough for city-scale networks: distortion stays well below a meter
/// within a few kilometers of the origin.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    origin: LatLng,
    cos_origin: f64,
}

impl Projection {
    pub fn new(origin: LatLng) -> Self {
        Projection {
            origin,
            cos_origin: origin.latitude.to_radians().cos(),
        }
    }

    /// Projection centered on the mean coordinate of `points`.
    pub fn centered_on<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> Self {
        let (mut lat, mut lon, mut n) = (0.0, 0.0, 0usize);
        for p in points {
            lat += p.latitude;
            lon += p.longitude;
            n += 1;
        }
        if n == 0 {
            return Projection::new(LatLng::new(0.0, 0.0));
        }
        Projection::new(LatLng::new(lat / n as f64, lon / n as f64))
    }

    pub fn project(&self, loc: LatLng) -> Point {
        Point {
            x: EARTH_RADIUS * (loc.longitude - self.origin.longitude).to_radians() * self.cos_origin,
            y: EARTH_RADIUS * (loc.latitude - self.origin.latitude).to_radians(),
        }
    }

    pub fn unproject(&self, point: Point) -> LatLng {
        LatLng {
            latitude: self.origin.latitude + (point.y / EARTH_RADIUS).to_degrees(),
            longitude: self.origin.longitude
                + (point.x / (EARTH_RADIUS * self.cos_origin)).to_degrees(),
        }
    }
}

/// Geographic bounding box of a network.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: LatLng,
    pub max: LatLng,
}

impl Bounds {
    pub fn around(loc: LatLng) -> Self {
        Bounds { min: loc, max: loc }
    }

    pub fn extend(&mut self, loc: LatLng) {
        self.min.latitude = self.min.latitude.min(loc.latitude);
        self.min.longitude = self.min.longitude.min(loc.longitude);
        self.max.latitude = self.max.latitude.max(loc.latitude);
        self.max.longitude = self.max.longitude.max(loc.longitude);
    }

    /// Whether `loc` lies inside the box widened by `margin` degrees.
    pub fn contains(&self, loc: LatLng, margin: f64) -> bool {
        loc.latitude >= self.min.latitude - margin
            && loc.latitude <= self.max.latitude + margin
            && loc.longitude >= self.min.longitude - margin
            && loc.longitude <= self.max.longitude + margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_round_trips_near_origin() {
        let projection = Projection::new(LatLng::new(47.61, -122.33));
        let loc = LatLng::new(47.615, -122.325);

        let back = projection.unproject(projection.project(loc));

        assert!((back.latitude - loc.latitude).abs() < 1e-9);
        assert!((back.longitude - loc.longitude).abs() < 1e-9);
    }

    #[test]
    fn projected_distance_matches_great_circle() {
        let projection = Projection::new(LatLng::new(47.61, -122.33));
        let a = LatLng::new(47.610, -122.330);
        let b = LatLng::new(47.618, -122.320);

        let (pa, pb) = (projection.project(a), projection.project(b));
        let planar = ((pa.x - pb.x).powi(2) + (pa.y - pb.y).powi(2)).sqrt();

        assert!((planar - a.dist(b)).abs() < 1.0);
    }

    #[test]
    fn bounds_margin_widens_box() {
        let mut bounds = Bounds::around(LatLng::new(47.60, -122.34));
        bounds.extend(LatLng::new(47.62, -122.32));

        assert!(bounds.contains(LatLng::new(47.61, -122.33), 0.0));
        assert!(!bounds.contains(LatLng::new(47.625, -122.33), 0.0));
        assert!(bounds.contains(LatLng::new(47.625, -122.33), 0.01));
    }
}
