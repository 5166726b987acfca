//! Polygon generation - random point clouds ordered into simple closed loops
//!
//! Random polygons draw distinct integer lattice points, sort them by angle
//! around their centroid (a star-shaped ordering that cannot self-cross) and
//! normalize the result so the centroid sits at the origin and the farthest
//! vertex lands on the unit circle.

use num_complex::Complex64;
use rand::Rng;
use tracing::debug;

use super::{EpicycleError, Point};

/// Retry cap for random generation when a draw comes out degenerate.
const MAX_ATTEMPTS: usize = 64;

/// An ordered closed loop of distinct vertices.
///
/// The closing edge back to the first vertex is implicit; traversal code
/// uses [`Polygon::closed_points`] to materialize it.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Build a polygon from explicit vertices, in the given winding order.
    ///
    /// The first vertex must not be repeated at the end; the closing edge
    /// is implied.
    pub fn from_points(vertices: Vec<Point>) -> Result<Self, EpicycleError> {
        if vertices.len() < 3 {
            return Err(EpicycleError::InvalidInput(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        Ok(Self { vertices })
    }

    /// Generate a random star-shaped polygon inscribed in the unit circle.
    ///
    /// Draws `n` distinct integer-coordinate points with both coordinates in
    /// `[-bound, bound]`, orders them by angle around their centroid and
    /// normalizes. A draw is rejected and retried whenever two points share
    /// the exact same angle (or one lands on the centroid), so the angular
    /// ordering of the result is strictly increasing.
    pub fn random<R: Rng>(n: usize, bound: i32, rng: &mut R) -> Result<Self, EpicycleError> {
        if n < 3 {
            return Err(EpicycleError::InvalidInput(format!(
                "point count {n} is below the 3 needed for a polygon"
            )));
        }
        let side = 2 * bound as i128 + 1;
        if bound < 0 || side * side < n as i128 {
            return Err(EpicycleError::InvalidInput(format!(
                "bound {bound} gives fewer than {n} distinct lattice points"
            )));
        }

        for attempt in 1..=MAX_ATTEMPTS {
            let drawn = draw_distinct(n, bound, rng);
            let points: Vec<Point> = drawn
                .iter()
                .map(|&(x, y)| Complex64::new(f64::from(x), f64::from(y)))
                .collect();

            let center = centroid(&points);
            if points.iter().any(|p| (p - center).norm() == 0.0) {
                debug!("redrawing polygon (attempt {attempt}): point on centroid");
                continue;
            }

            // Sort on cached angles; exact ties mean two points share a ray
            // from the centroid and the loop would degenerate there.
            let mut angled: Vec<(f64, Point)> = points
                .iter()
                .map(|&p| ((p - center).arg(), p))
                .collect();
            angled.sort_by(|a, b| a.0.total_cmp(&b.0));
            if angled.windows(2).any(|w| w[0].0 == w[1].0) {
                debug!("redrawing polygon (attempt {attempt}): angular tie");
                continue;
            }

            let scale = angled
                .iter()
                .map(|&(_, p)| (p - center).norm())
                .fold(0.0, f64::max);
            let vertices = angled
                .into_iter()
                .map(|(_, p)| (p - center) / scale)
                .collect();

            return Ok(Self { vertices });
        }

        Err(EpicycleError::InvalidInput(format!(
            "no non-degenerate arrangement of {n} points found within bound {bound}"
        )))
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertices with the first one repeated at the end, the traversal form
    /// consumed by the resampler and the renderers.
    pub fn closed_points(&self) -> Vec<Point> {
        let mut points = self.vertices.clone();
        points.push(self.vertices[0]);
        points
    }
}

/// Mean of a non-empty point set.
pub fn centroid(points: &[Point]) -> Point {
    let sum: Complex64 = points.iter().copied().sum();
    sum / points.len() as f64
}

fn draw_distinct<R: Rng>(n: usize, bound: i32, rng: &mut R) -> Vec<(i32, i32)> {
    let mut drawn: Vec<(i32, i32)> = Vec::with_capacity(n);
    while drawn.len() < n {
        let candidate = (rng.gen_range(-bound..=bound), rng.gen_range(-bound..=bound));
        if !drawn.contains(&candidate) {
            drawn.push(candidate);
        }
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_triangle_always_valid() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let poly = Polygon::random(3, 10, &mut rng).unwrap();
            assert_eq!(poly.len(), 3);
            let v = poly.vertices();
            assert!(v[0] != v[1] && v[1] != v[2] && v[0] != v[2]);
            assert!(v.iter().all(|p| p.re.is_finite() && p.im.is_finite()));
        }
    }

    #[test]
    fn test_normalization() {
        let mut rng = StdRng::seed_from_u64(42);
        let poly = Polygon::random(12, 10, &mut rng).unwrap();

        let center = centroid(poly.vertices());
        assert!(center.norm() < 1e-12);

        let max_norm = poly
            .vertices()
            .iter()
            .map(|p| p.norm())
            .fold(0.0, f64::max);
        assert!((max_norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_angles_strictly_increasing() {
        for seed in [1, 7, 99, 1234] {
            let mut rng = StdRng::seed_from_u64(seed);
            let poly = Polygon::random(16, 20, &mut rng).unwrap();
            let center = centroid(poly.vertices());
            let angles: Vec<f64> = poly.vertices().iter().map(|p| (p - center).arg()).collect();
            for pair in angles.windows(2) {
                assert!(pair[0] < pair[1], "angles not strictly increasing");
            }
        }
    }

    #[test]
    fn test_seeded_determinism() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let first = Polygon::random(8, 10, &mut a).unwrap();
        let second = Polygon::random(8, 10, &mut b).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_too_few_points() {
        let mut rng = StdRng::seed_from_u64(0);
        let result = Polygon::random(2, 10, &mut rng);
        assert!(matches!(result, Err(EpicycleError::InvalidInput(_))));
    }

    #[test]
    fn test_bound_too_small() {
        let mut rng = StdRng::seed_from_u64(0);
        // A 3x3 lattice holds 9 points, so 10 can never be distinct.
        let result = Polygon::random(10, 1, &mut rng);
        assert!(matches!(result, Err(EpicycleError::InvalidInput(_))));
    }

    #[test]
    fn test_from_points_rejects_short() {
        let points = vec![Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)];
        let result = Polygon::from_points(points);
        assert!(matches!(result, Err(EpicycleError::InvalidInput(_))));
    }

    #[test]
    fn test_closed_points_wraps() {
        let points = vec![
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 1.0),
            Complex64::new(-1.0, 0.0),
        ];
        let poly = Polygon::from_points(points).unwrap();
        let closed = poly.closed_points();
        assert_eq!(closed.len(), 4);
        assert_eq!(closed[0], closed[3]);
    }
}
