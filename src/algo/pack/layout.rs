//! Island placements and the transforms they describe.

use nalgebra::{Matrix3, Point2};

use crate::algo::parameterize::{UVMap, UVMesh};

/// Placement of one island: `offset + R(angle) * (scale * p)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutTransform {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
    /// Rotation in degrees, clockwise for positive values.
    pub angle_deg: f64,
}

impl LayoutTransform {
    pub fn new(offset_x: f64, offset_y: f64, scale: f64) -> Self {
        Self {
            offset_x,
            offset_y,
            scale,
            angle_deg: 0.0,
        }
    }

    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    pub fn with_angle(mut self, angle_deg: f64) -> Self {
        self.angle_deg = angle_deg;
        self
    }

    /// Homogeneous 2D matrix of the transform.
    pub fn to_matrix(&self) -> Matrix3<f64> {
        let (sin, cos) = self.angle_deg.to_radians().sin_cos();
        let s = self.scale;
        Matrix3::new(
            s * cos, s * sin, self.offset_x,
            -s * sin, s * cos, self.offset_y,
            0.0, 0.0, 1.0,
        )
    }

    pub fn apply(&self, p: &Point2<f64>) -> Point2<f64> {
        self.to_matrix().transform_point(p)
    }
}

impl Default for LayoutTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned bounds of an island, as seen by the packers.
#[derive(Debug, Clone, PartialEq)]
pub struct IslandBounds {
    pub id: String,
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl IslandBounds {
    pub fn new(id: impl Into<String>, min: Point2<f64>, max: Point2<f64>) -> Self {
        Self {
            id: id.into(),
            min,
            max,
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

/// Placement of a set of islands in a texture.
///
/// A normalised layout applies to area-normalised UVs
/// ([`UVMesh::normalised_uv`]); otherwise it applies to the raw UVs.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    entries: Vec<(String, LayoutTransform)>,
    normalised: bool,
}

impl Layout {
    pub fn new(entries: Vec<(String, LayoutTransform)>, normalised: bool) -> Self {
        Self { entries, normalised }
    }

    pub fn is_normalised(&self) -> bool {
        self.normalised
    }

    pub fn get(&self, id: &str) -> Option<&LayoutTransform> {
        self.entries.iter().find(|(key, _)| key == id).map(|(_, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LayoutTransform)> {
        self.entries.iter().map(|(id, t)| (id.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Full transform from the island's raw UVs to texture coordinates.
    ///
    /// `None` if the island is not part of the layout, or the layout is
    /// normalised and the island has no normal transform.
    pub fn transform_for(&self, island: &UVMesh) -> Option<Matrix3<f64>> {
        let layout = self.get(island.id())?.to_matrix();
        if self.normalised {
            Some(layout * island.normal_transform()?.to_matrix())
        } else {
            Some(layout)
        }
    }

    /// Final texture coordinates of `island`.
    pub fn texture_coordinates(&self, island: &UVMesh) -> Option<UVMap> {
        let transform = self.transform_for(island)?;
        Some(island.uv().transformed(&transform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriMesh;
    use nalgebra::Point3;

    fn unit_square(id: &str, uv_scale: f64) -> UVMesh {
        let mesh = TriMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        let uv = UVMap::new(vec![
            Point2::new(5.0, 5.0),
            Point2::new(5.0 + uv_scale, 5.0),
            Point2::new(5.0 + uv_scale, 5.0 + uv_scale),
            Point2::new(5.0, 5.0 + uv_scale),
        ]);
        UVMesh::with_uv(id, mesh, uv).unwrap()
    }

    #[test]
    fn test_matrix_convention() {
        let t = LayoutTransform::new(1.0, 2.0, 2.0).with_angle(90.0);
        let p = t.apply(&Point2::new(1.0, 0.0));
        // Positive angles turn +x towards -y.
        assert!((p - Point2::new(1.0, 0.0)).norm() < 1e-12);

        let q = LayoutTransform::new(1.0, 2.0, 2.0).apply(&Point2::new(1.0, 1.0));
        assert!((q - Point2::new(3.0, 4.0)).norm() < 1e-12);
    }

    #[test]
    fn test_identity() {
        let p = Point2::new(0.3, -0.7);
        assert_eq!(LayoutTransform::default().apply(&p), p);
    }

    #[test]
    fn test_normalised_layout_composes_with_normal_transform() {
        let island = unit_square("A", 0.5);
        let layout = Layout::new(vec![("A".into(), LayoutTransform::new(0.25, 0.0, 0.5))], true);

        // Raw UVs are moved to the origin and rescaled to unit area first.
        let coords = layout.texture_coordinates(&island).unwrap();
        assert!((coords.get(0) - Point2::new(0.25, 0.0)).norm() < 1e-12);
        assert!((coords.get(2) - Point2::new(0.75, 0.5)).norm() < 1e-12);
    }

    #[test]
    fn test_raw_layout() {
        let island = unit_square("A", 0.5);
        let layout = Layout::new(vec![("A".into(), LayoutTransform::identity())], false);
        let coords = layout.texture_coordinates(&island).unwrap();
        assert_eq!(coords.get(2), Point2::new(5.5, 5.5));
    }

    #[test]
    fn test_unknown_island() {
        let layout = Layout::new(Vec::new(), true);
        assert!(layout.is_empty());
        assert!(layout.transform_for(&unit_square("B", 1.0)).is_none());
    }

    #[test]
    fn test_island_bounds() {
        let b = IslandBounds::new("A", Point2::new(1.0, 2.0), Point2::new(4.0, 3.0));
        assert_eq!(b.width(), 3.0);
        assert_eq!(b.height(), 1.0);
        assert_eq!(b.area(), 3.0);
    }
}
