pub mod barriers;
pub mod osm;
