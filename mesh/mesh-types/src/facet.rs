//! Facet type: one triangle of an STL mesh.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single triangle with its stored normal.
///
/// The normal is whatever the producer stored: a unit vector when normals
/// were computed, or the zero vector when they were not. A zero normal is
/// valid STL; readers recompute it from the winding.
///
/// # Example
///
/// ```
/// use mesh_types::{Facet, Point3, Vector3};
///
/// let facet = Facet::without_normal(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
/// assert_eq!(facet.normal, Vector3::zeros());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Facet {
    /// Stored facet normal (unit length or zero).
    pub normal: Vector3<f64>,
    /// The three corners, in winding order.
    pub vertices: [Point3<f64>; 3],
}

impl Facet {
    /// Create a facet from an explicit normal and vertices.
    #[inline]
    #[must_use]
    pub const fn new(normal: Vector3<f64>, vertices: [Point3<f64>; 3]) -> Self {
        Self { normal, vertices }
    }

    /// Create a facet whose normal is the zero vector.
    #[inline]
    #[must_use]
    pub fn without_normal(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self {
            normal: Vector3::zeros(),
            vertices: [v0, v1, v2],
        }
    }

    /// Create a facet and compute its unit normal from the winding.
    ///
    /// Degenerate triangles get the zero vector.
    #[must_use]
    pub fn with_computed_normal(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        let mut facet = Self::without_normal(v0, v1, v2);
        facet.normal = facet.compute_normal();
        facet
    }

    /// Build a facet from the flat 12-value STL record
    /// `[nx, ny, nz, x1, y1, z1, x2, y2, z2, x3, y3, z3]`.
    #[must_use]
    pub fn from_array(values: [f64; 12]) -> Self {
        Self {
            normal: Vector3::new(values[0], values[1], values[2]),
            vertices: [
                Point3::new(values[3], values[4], values[5]),
                Point3::new(values[6], values[7], values[8]),
                Point3::new(values[9], values[10], values[11]),
            ],
        }
    }

    /// Flatten into the 12-value STL record order: normal, then the three vertices.
    #[must_use]
    pub fn to_array(&self) -> [f64; 12] {
        let [a, b, c] = &self.vertices;
        [
            self.normal.x,
            self.normal.y,
            self.normal.z,
            a.x,
            a.y,
            a.z,
            b.x,
            b.y,
            b.z,
            c.x,
            c.y,
            c.z,
        ]
    }

    /// Cross product of the two edges leaving the first vertex.
    ///
    /// The magnitude equals twice the triangle's area.
    #[inline]
    #[must_use]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let [v0, v1, v2] = &self.vertices;
        (v1 - v0).cross(&(v2 - v0))
    }

    /// Unit normal following the right-hand rule, or the zero vector for
    /// degenerate (zero-area) triangles.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Facet, Point3, Vector3};
    ///
    /// let degen = Facet::without_normal(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(2.0, 0.0, 0.0),
    /// );
    /// assert_eq!(degen.compute_normal(), Vector3::zeros());
    /// ```
    #[must_use]
    pub fn compute_normal(&self) -> Vector3<f64> {
        let n = self.normal_unnormalized();
        let len = n.norm();
        if len > 0.0 { n / len } else { Vector3::zeros() }
    }

    /// Replace the stored normal with the one computed from the winding.
    pub fn refresh_normal(&mut self) {
        self.normal = self.compute_normal();
    }

    /// Multiply every vertex coordinate by `factor`. The normal is untouched,
    /// since a uniform scale does not change its direction.
    pub fn scale_vertices(&mut self, factor: f64) {
        for v in &mut self.vertices {
            v.coords *= factor;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_right_triangle() -> Facet {
        Facet::with_computed_normal(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn computed_normal_is_unit_and_follows_winding() {
        let facet = unit_right_triangle();
        assert_relative_eq!(facet.normal.norm(), 1.0);
        assert_relative_eq!(facet.normal.z, 1.0);

        let flipped = Facet::with_computed_normal(
            facet.vertices[1],
            facet.vertices[0],
            facet.vertices[2],
        );
        assert_relative_eq!(flipped.normal.z, -1.0);
    }

    #[test]
    fn degenerate_triangle_gets_zero_normal() {
        let p = Point3::new(3.0, 3.0, 3.0);
        let facet = Facet::with_computed_normal(p, p, p);
        assert_eq!(facet.normal, Vector3::zeros());
        assert!(facet.normal.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn tiny_triangle_still_gets_unit_normal() {
        let facet = Facet::with_computed_normal(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1e-9, 0.0, 0.0),
            Point3::new(0.0, 1e-9, 0.0),
        );
        assert_relative_eq!(facet.normal.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(facet.normal.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn array_layout_is_normal_then_vertices() {
        let facet = unit_right_triangle();
        let values = facet.to_array();
        assert_eq!(&values[..3], &[0.0, 0.0, 1.0]);
        assert_eq!(&values[3..6], &[0.0, 0.0, 0.0]);
        assert_eq!(&values[6..9], &[1.0, 0.0, 0.0]);
        assert_eq!(&values[9..], &[0.0, 1.0, 0.0]);
        assert_eq!(Facet::from_array(values), facet);
    }

    #[test]
    fn scaling_leaves_normal_alone() {
        let mut facet = unit_right_triangle();
        facet.scale_vertices(2.0);
        assert_eq!(facet.vertices[1], Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(facet.normal_unnormalized().norm(), 4.0);
        assert_relative_eq!(facet.normal.z, 1.0);
    }

    #[test]
    fn refresh_normal_tracks_moved_vertices() {
        let mut facet = unit_right_triangle();
        facet.vertices[2] = Point3::new(0.0, 0.0, 1.0);
        facet.refresh_normal();
        assert_relative_eq!(facet.normal.y, -1.0);
    }
}
