//! State centroids for the project map.

use crate::rng::JitterRng;

/// Map centre used when the map is first drawn (geographic centre of Brazil).
pub const MAP_CENTER: (f64, f64) = (-14.2350, -51.9253);

/// (code, latitude, longitude) for every state the dashboard knows about.
pub const STATE_CENTROIDS: [(&str, f64, f64); 12] = [
    ("BA", -12.9777, -38.5016),
    ("RJ", -22.9068, -43.1729),
    ("SP", -23.5505, -46.6333),
    ("MG", -19.9167, -43.9345),
    ("PE", -8.0476, -34.8770),
    ("CE", -3.7172, -38.5433),
    ("AM", -3.1190, -60.0217),
    ("PA", -1.4558, -48.5024),
    ("GO", -16.6869, -49.2648),
    ("RS", -30.0346, -51.2177),
    ("SC", -27.5954, -48.5480),
    ("PR", -25.4284, -49.2733),
];

/// Case-insensitive centroid lookup. Unknown codes map to (0, 0).
pub fn centroid(state: &str) -> (f64, f64) {
    let code = state.trim();
    STATE_CENTROIDS
        .iter()
        .find(|(c, _, _)| c.eq_ignore_ascii_case(code))
        .map(|&(_, lat, lon)| (lat, lon))
        .unwrap_or((0.0, 0.0))
}

/// Centroid plus independent noise on each axis.
pub fn jittered(state: &str, std_dev: f64, rng: &mut JitterRng) -> (f64, f64) {
    let (lat, lon) = centroid(state);
    let lat = lat + rng.gaussian(0.0, std_dev);
    let lon = lon + rng.gaussian(0.0, std_dev);
    (lat, lon)
}

/// Bounding box as ((lon_min, lon_max), (lat_min, lat_max)) around all
/// centroids, padded by `margin` degrees. Used as the map viewport.
pub fn viewport(margin: f64) -> ((f64, f64), (f64, f64)) {
    let mut lon = (f64::MAX, f64::MIN);
    let mut lat = (f64::MAX, f64::MIN);
    for &(_, la, lo) in STATE_CENTROIDS.iter() {
        lat = (lat.0.min(la), lat.1.max(la));
        lon = (lon.0.min(lo), lon.1.max(lo));
    }
    (
        (lon.0 - margin, lon.1 + margin),
        (lat.0 - margin, lat.1 + margin),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        assert_eq!(centroid("ba"), (-12.9777, -38.5016));
        assert_eq!(centroid(" Sp "), (-23.5505, -46.6333));
    }

    #[test]
    fn unknown_state_is_origin() {
        assert_eq!(centroid("XX"), (0.0, 0.0));
        assert_eq!(centroid(""), (0.0, 0.0));
    }

    #[test]
    fn viewport_contains_every_centroid() {
        let ((lon_min, lon_max), (lat_min, lat_max)) = viewport(2.0);
        for &(_, la, lo) in STATE_CENTROIDS.iter() {
            assert!(lo > lon_min && lo < lon_max);
            assert!(la > lat_min && la < lat_max);
        }
    }
}
