//! Packed edge geometry.
//!
//! Intermediate trail points are stored in the `edges.geometry` column as a flat
//! blob of little-endian `f32` pairs, latitude first:
//!
//! ```text
//! [lat0: f32 LE][lon0: f32 LE][lat1: f32 LE][lon1: f32 LE] ...
//! ```
//!
//! The endpoints of the edge are not part of the blob.

use crate::geo::Coordinate;

/// Size in bytes of one packed point.
pub const POINT_SIZE: usize = 8;

/// Pack coordinates into the on-disk geometry representation.
pub fn encode_geometry(points: &[Coordinate]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(points.len() * POINT_SIZE);
    for point in points {
        blob.extend_from_slice(&(point.latitude as f32).to_le_bytes());
        blob.extend_from_slice(&(point.longitude as f32).to_le_bytes());
    }
    blob
}

/// Unpack a geometry blob. Trailing bytes that do not form a whole point are
/// ignored; see [`has_trailing_bytes`].
pub fn decode_geometry(blob: &[u8]) -> Vec<Coordinate> {
    blob.chunks_exact(POINT_SIZE)
        .map(|chunk| {
            let lat = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            let lon = f32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
            Coordinate::new(f64::from(lat), f64::from(lon))
        })
        .collect()
}

/// Whether the blob length is not a multiple of the point size.
pub fn has_trailing_bytes(blob: &[u8]) -> bool {
    blob.len() % POINT_SIZE != 0
}
