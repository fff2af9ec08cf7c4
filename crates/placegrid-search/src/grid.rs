//! Grid covering for radius searches.
//!
//! Lays a square lattice of sample points over a circular search area so that
//! each point can be queried with a smaller sub-radius. Distances use the
//! equirectangular approximation: longitude degrees shrink by the cosine of
//! the center latitude, which keeps physical spacing ~equal across the grid.

use placegrid_core::Coordinate;

/// Metres per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_111.0;

/// Lattice half-width as a multiple of `radius / sub_radius`. The square
/// lattice is wider than the circle so its rim is fully populated before the
/// circular filter is applied.
const LATTICE_OVERPROVISION: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub lat: f64,
    pub lng: f64,
}

impl From<Coordinate> for GridPoint {
    fn from(c: Coordinate) -> Self {
        Self {
            lat: c.latitude,
            lng: c.longitude,
        }
    }
}

impl From<GridPoint> for Coordinate {
    fn from(p: GridPoint) -> Self {
        Coordinate::new(p.lat, p.lng)
    }
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Plan the sample points for a search of `radius` metres around `center`,
/// spaced `sub_radius` metres apart.
///
/// Returns `[center]` when the area fits in one sub-query or when no lattice
/// point survives the circular filter. Otherwise points come out in row-major
/// order: latitude rows south to north, longitude columns west to east.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn plan_grid(center: Coordinate, radius: f64, sub_radius: f64) -> Vec<GridPoint> {
    if radius <= sub_radius {
        return vec![center.into()];
    }

    let lat_step = sub_radius / METERS_PER_DEGREE;
    let lng_step = sub_radius / (METERS_PER_DEGREE * center.latitude.to_radians().cos());
    let steps = (LATTICE_OVERPROVISION * radius / sub_radius).ceil() as i64;

    let mut points = Vec::new();
    for row in -steps..=steps {
        let lat = center.latitude + row as f64 * lat_step;
        for col in -steps..=steps {
            let point = GridPoint {
                lat,
                lng: center.longitude + col as f64 * lng_step,
            };
            if planar_distance_m(center, point) <= radius {
                points.push(point);
            }
        }
    }

    if points.is_empty() {
        return vec![center.into()];
    }
    points
}

/// Equirectangular distance in metres from `center` to `point`.
///
/// Not great-circle: accurate to well under 1% for the few-tens-of-km
/// radii this planner is used with.
#[must_use]
pub fn planar_distance_m(center: Coordinate, point: GridPoint) -> f64 {
    let dy = (point.lat - center.latitude) * METERS_PER_DEGREE;
    let dx = (point.lng - center.longitude)
        * METERS_PER_DEGREE
        * center.latitude.to_radians().cos();
    dx.hypot(dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: Coordinate = Coordinate {
        latitude: 51.5074,
        longitude: -0.1278,
    };

    /// Offset `center` by `(east_m, north_m)` using the planner's projection.
    fn offset(center: Coordinate, east_m: f64, north_m: f64) -> GridPoint {
        GridPoint {
            lat: center.latitude + north_m / METERS_PER_DEGREE,
            lng: center.longitude
                + east_m / (METERS_PER_DEGREE * center.latitude.to_radians().cos()),
        }
    }

    #[test]
    fn small_radius_returns_center_only() {
        let pts = plan_grid(LONDON, 1_000.0, 2_000.0);
        assert_eq!(pts, vec![GridPoint::from(LONDON)]);
    }

    #[test]
    fn equal_radius_returns_center_only() {
        let pts = plan_grid(LONDON, 3_000.0, 3_000.0);
        assert_eq!(pts, vec![GridPoint::from(LONDON)]);
    }

    #[test]
    fn large_radius_returns_many_points_within_radius() {
        let radius = 10_000.0;
        let pts = plan_grid(LONDON, radius, 3_000.0);
        // Lattice nodes (i, j) with 3000·√(i²+j²) ≤ 10000.
        assert_eq!(pts.len(), 37);
        for p in &pts {
            let d = planar_distance_m(LONDON, *p);
            assert!(d <= radius * 1.000_001, "{p} is {d} m from center");
        }
    }

    #[test]
    fn center_is_part_of_the_lattice() {
        let pts = plan_grid(LONDON, 10_000.0, 3_000.0);
        assert!(pts
            .iter()
            .any(|p| (p.lat - LONDON.latitude).abs() < 1e-12
                && (p.lng - LONDON.longitude).abs() < 1e-12));
    }

    #[test]
    fn every_point_in_area_is_within_sub_radius_of_a_grid_point() {
        for (radius, sub_radius) in [(10_000.0, 3_000.0), (5_000.0, 2_000.0), (7_000.0, 3_000.0)] {
            let pts = plan_grid(LONDON, radius, sub_radius);
            for ring in 1..=20 {
                let rho = radius * f64::from(ring) / 20.0;
                for step in 0..120 {
                    let theta = std::f64::consts::TAU * f64::from(step) / 120.0;
                    let sample = offset(LONDON, rho * theta.cos(), rho * theta.sin());
                    let nearest = pts
                        .iter()
                        .map(|p| {
                            let dy = (p.lat - sample.lat) * METERS_PER_DEGREE;
                            let dx = (p.lng - sample.lng)
                                * METERS_PER_DEGREE
                                * LONDON.latitude.to_radians().cos();
                            dx.hypot(dy)
                        })
                        .fold(f64::INFINITY, f64::min);
                    assert!(
                        nearest <= sub_radius,
                        "gap at {sample}: nearest grid point {nearest} m away \
                         (sub-radius {sub_radius})"
                    );
                }
            }
        }
    }

    #[test]
    fn output_is_deterministic_and_row_major() {
        let a = plan_grid(LONDON, 10_000.0, 3_000.0);
        let b = plan_grid(LONDON, 10_000.0, 3_000.0);
        assert_eq!(a, b);
        for pair in a.windows(2) {
            assert!(
                pair[0].lat < pair[1].lat
                    || ((pair[0].lat - pair[1].lat).abs() < 1e-12 && pair[0].lng < pair[1].lng)
            );
        }
    }

    #[test]
    fn longitude_step_widens_at_higher_latitude() {
        let equator = Coordinate::new(0.0, 0.0);
        let north = Coordinate::new(60.0, 0.0);
        let span = |c: Coordinate| {
            let pts = plan_grid(c, 10_000.0, 3_000.0);
            let max = pts.iter().map(|p| p.lng).fold(f64::MIN, f64::max);
            let min = pts.iter().map(|p| p.lng).fold(f64::MAX, f64::min);
            max - min
        };
        assert!(span(north) > span(equator) * 1.9);
    }

    #[test]
    fn degenerate_input_falls_back_to_center() {
        let pole = Coordinate::new(90.0, 0.0);
        let pts = plan_grid(pole, f64::NAN, 1_000.0);
        assert_eq!(pts, vec![GridPoint::from(pole)]);
    }
}
