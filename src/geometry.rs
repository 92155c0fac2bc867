//! Geometry kernel interfaces.
//!
//! Unwrapping does not own a B-rep kernel. Topological edges and vertices,
//! analytic surfaces and face adjacency are consumed through the traits in
//! this module, so any CAD kernel can be plugged in. A handful of simple
//! implementations ([`LineSegment`], [`Polyline`], [`PointVertex`],
//! [`PlaneSurface`], [`CylinderSurface`]) cover straight seams, sampled curves
//! and the two most common analytic faces.

use nalgebra::{Point2, Point3, Vector3};

/// A topological edge that can classify points.
pub trait EdgeShape: Sync {
    /// Check whether `point` lies on the edge within `tolerance`.
    ///
    /// The test is tolerance based, never exact.
    fn is_inside(&self, point: &Point3<f64>, tolerance: f64) -> bool;

    /// Position of the first end vertex.
    fn start_point(&self) -> Point3<f64>;

    /// Position of the last end vertex.
    fn end_point(&self) -> Point3<f64>;
}

/// A topological vertex.
pub trait VertexShape: Sync {
    /// Position of the vertex.
    fn point(&self) -> Point3<f64>;

    /// Check whether `point` coincides with the vertex within `tolerance`.
    fn is_inside(&self, point: &Point3<f64>, tolerance: f64) -> bool {
        (point - self.point()).norm() <= tolerance
    }
}

/// An analytic surface with a (u, v) parameterization.
pub trait ParametricSurface: Sync {
    /// Evaluate the surface at parameter `(u, v)`.
    fn value_at(&self, u: f64, v: f64) -> Point3<f64>;

    /// Project `point` onto the surface and return its parameter.
    fn parameter(&self, point: &Point3<f64>) -> Point2<f64>;
}

/// Edge-to-face adjacency queries.
pub trait FaceAdjacency {
    /// Edge identity.
    type Edge;
    /// Face identity, comparable for equality.
    type Face: PartialEq;

    /// All faces that have `edge` on their boundary.
    fn ancestor_faces(&self, edge: &Self::Edge) -> Vec<Self::Face>;
}

/// Count the faces adjacent to `edge` that are part of `included`.
pub fn count_included_faces<A: FaceAdjacency>(
    adjacency: &A,
    edge: &A::Edge,
    included: &[A::Face],
) -> usize {
    adjacency
        .ancestor_faces(edge)
        .iter()
        .filter(|face| included.contains(face))
        .count()
}

/// Distance from `point` to the segment `[a, b]`.
pub fn point_segment_distance(point: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (point - a).norm();
    }
    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (point - (a + ab * t)).norm()
}

/// A straight edge between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// Start vertex.
    pub start: Point3<f64>,
    /// End vertex.
    pub end: Point3<f64>,
}

impl LineSegment {
    /// Create a segment.
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }
}

impl EdgeShape for LineSegment {
    fn is_inside(&self, point: &Point3<f64>, tolerance: f64) -> bool {
        point_segment_distance(point, &self.start, &self.end) <= tolerance
    }

    fn start_point(&self) -> Point3<f64> {
        self.start
    }

    fn end_point(&self) -> Point3<f64> {
        self.end
    }
}

/// A curved edge approximated by a polyline.
///
/// A closed curve repeats its first point at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Point3<f64>>,
}

impl Polyline {
    /// Create a polyline. At least one point is expected.
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    /// The sample points.
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }
}

impl EdgeShape for Polyline {
    fn is_inside(&self, point: &Point3<f64>, tolerance: f64) -> bool {
        match self.points.as_slice() {
            [] => false,
            [single] => (point - single).norm() <= tolerance,
            points => points
                .windows(2)
                .any(|w| point_segment_distance(point, &w[0], &w[1]) <= tolerance),
        }
    }

    fn start_point(&self) -> Point3<f64> {
        self.points.first().copied().unwrap_or_else(Point3::origin)
    }

    fn end_point(&self) -> Point3<f64> {
        self.points.last().copied().unwrap_or_else(Point3::origin)
    }
}

/// A topological vertex at a fixed position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointVertex(pub Point3<f64>);

impl VertexShape for PointVertex {
    fn point(&self) -> Point3<f64> {
        self.0
    }
}

/// A plane parameterized by an origin and two axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSurface {
    /// Point at parameter (0, 0).
    pub origin: Point3<f64>,
    /// Direction of increasing u.
    pub u_axis: Vector3<f64>,
    /// Direction of increasing v.
    pub v_axis: Vector3<f64>,
}

impl ParametricSurface for PlaneSurface {
    fn value_at(&self, u: f64, v: f64) -> Point3<f64> {
        self.origin + self.u_axis * u + self.v_axis * v
    }

    fn parameter(&self, point: &Point3<f64>) -> Point2<f64> {
        let d = point - self.origin;
        Point2::new(
            d.dot(&self.u_axis) / self.u_axis.norm_squared(),
            d.dot(&self.v_axis) / self.v_axis.norm_squared(),
        )
    }
}

/// A cylinder around the z axis.
///
/// `u` is the angle in `[0, 2π)`, `v` the height. The surface closes on
/// itself along `u = 0`, which makes it the canonical self-seam face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderSurface {
    /// Cylinder radius.
    pub radius: f64,
}

impl ParametricSurface for CylinderSurface {
    fn value_at(&self, u: f64, v: f64) -> Point3<f64> {
        Point3::new(self.radius * u.cos(), self.radius * u.sin(), v)
    }

    fn parameter(&self, point: &Point3<f64>) -> Point2<f64> {
        let mut angle = point.y.atan2(point.x);
        if angle < 0.0 {
            angle += std::f64::consts::TAU;
        }
        Point2::new(angle, point.z)
    }
}
