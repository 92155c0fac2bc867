//! A UV island: a source mesh together with its unwrapped coordinates.

use std::cell::OnceCell;

use nalgebra::Point2;

use crate::algo::pack::{IslandBounds, LayoutTransform};
use crate::error::{Result, UnwrapError};
use crate::mesh::TriMesh;

use super::method::Unwrapper;
use super::uv::UVMap;

/// Quantities derived from the UV coordinates, computed on first use.
#[derive(Debug, Clone, Default)]
struct Derived {
    uv_area: OnceCell<f64>,
    mesh_area: OnceCell<f64>,
    normal_transform: OnceCell<Option<LayoutTransform>>,
    normalised_uv: OnceCell<Option<UVMap>>,
    normalised_bounds: OnceCell<Option<(Point2<f64>, Point2<f64>)>>,
}

/// An unwrapped mesh.
///
/// Area-normalised coordinates rescale the UVs so that UV area equals mesh
/// area and move the bounding box to the origin. Packing islands in these
/// coordinates gives every island the same texel density.
///
/// # Example
///
/// ```
/// use unfurl::algo::parameterize::{PlaneProjection, UVMesh};
/// use unfurl::mesh::TriMesh;
/// use nalgebra::{Point3, Vector3};
///
/// let mesh = TriMesh::new(
///     vec![Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0), Point3::new(0.0, 2.0, 0.0)],
///     vec![[0, 1, 2]],
/// ).unwrap();
/// let mut island = UVMesh::new("Face1", mesh);
/// island.unwrap_with(&unfurl::algo::parameterize::UnwrapMethod::Plane(PlaneProjection::new(Vector3::z()))).unwrap();
///
/// assert!(island.valid());
/// assert!((island.uv_area() - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct UVMesh {
    id: String,
    mesh: TriMesh,
    uv: UVMap,
    derived: Derived,
}

impl UVMesh {
    /// An island that has not been unwrapped yet.
    pub fn new(id: impl Into<String>, mesh: TriMesh) -> Self {
        Self {
            id: id.into(),
            mesh,
            uv: UVMap::zeros(0),
            derived: Derived::default(),
        }
    }

    /// An island with known UV coordinates.
    ///
    /// # Errors
    ///
    /// [`UnwrapError::InvalidParameter`] if `uv` does not match the vertex count.
    pub fn with_uv(id: impl Into<String>, mesh: TriMesh, uv: UVMap) -> Result<Self> {
        let mut island = Self::new(id, mesh);
        island.set_uv(uv)?;
        Ok(island)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mesh(&self) -> &TriMesh {
        &self.mesh
    }

    pub fn uv(&self) -> &UVMap {
        &self.uv
    }

    /// Replace the UV coordinates and drop all derived quantities.
    pub fn set_uv(&mut self, uv: UVMap) -> Result<()> {
        if uv.len() != self.mesh.num_vertices() {
            return Err(UnwrapError::invalid_param(
                "uv",
                uv.len(),
                format!("expected {} coordinates", self.mesh.num_vertices()),
            ));
        }
        self.uv = uv;
        self.invalidate();
        Ok(())
    }

    /// Unwrap the mesh with `method` and store the result.
    pub fn unwrap_with<U: Unwrapper + ?Sized>(&mut self, method: &U) -> Result<()> {
        let uv = method.unwrap(&self.mesh)?;
        self.set_uv(uv)
    }

    /// Drop all cached derived quantities.
    pub fn invalidate(&mut self) {
        self.derived = Derived::default();
    }

    /// True once there is one UV coordinate per vertex.
    pub fn valid(&self) -> bool {
        !self.uv.is_empty() && self.uv.len() == self.mesh.num_vertices()
    }

    /// Total triangle area in UV space, zero until the island is unwrapped.
    pub fn uv_area(&self) -> f64 {
        *self.derived.uv_area.get_or_init(|| {
            if self.valid() {
                self.uv.total_area(self.mesh.triangles())
            } else {
                0.0
            }
        })
    }

    /// Total triangle area of the source mesh.
    pub fn mesh_area(&self) -> f64 {
        *self.derived.mesh_area.get_or_init(|| self.mesh.surface_area())
    }

    /// Bounding box of the raw UV coordinates.
    pub fn bounds(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        self.uv.bounding_box()
    }

    /// Transform from raw to area-normalised UV coordinates.
    ///
    /// `None` when the island is not unwrapped or has zero UV area.
    pub fn normal_transform(&self) -> Option<LayoutTransform> {
        *self.derived.normal_transform.get_or_init(|| {
            if !self.valid() {
                return None;
            }
            let uv_area = self.uv_area();
            if uv_area <= 0.0 {
                return None;
            }
            let (min, _) = self.bounds()?;
            let scale = (self.mesh_area() / uv_area).sqrt();
            Some(LayoutTransform::new(-min.x * scale, -min.y * scale, scale))
        })
    }

    /// Area-normalised UV coordinates.
    pub fn normalised_uv(&self) -> Option<&UVMap> {
        self.derived
            .normalised_uv
            .get_or_init(|| {
                let transform = self.normal_transform()?;
                Some(self.uv.transformed(&transform.to_matrix()))
            })
            .as_ref()
    }

    /// Bounding box of the area-normalised coordinates. The minimum is the
    /// origin up to rounding.
    pub fn normalised_bounds(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        *self
            .derived
            .normalised_bounds
            .get_or_init(|| self.normalised_uv()?.bounding_box())
    }

    /// Normalised bounds in the form consumed by the packers.
    pub fn island_bounds(&self) -> Option<IslandBounds> {
        let (min, max) = self.normalised_bounds()?;
        Some(IslandBounds::new(self.id.clone(), min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    /// A 2 x 1 rectangle with its UVs squashed to 1 x 0.5.
    fn island() -> UVMesh {
        let mesh = TriMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        let uv = UVMap::new(vec![
            Point2::new(3.0, 1.0),
            Point2::new(4.0, 1.0),
            Point2::new(4.0, 1.5),
            Point2::new(3.0, 1.5),
        ]);
        UVMesh::with_uv("Face1", mesh, uv).unwrap()
    }

    #[test]
    fn test_areas() {
        let island = island();
        assert!((island.uv_area() - 0.5).abs() < 1e-12);
        assert!((island.mesh_area() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_normal_transform() {
        let island = island();
        let t = island.normal_transform().unwrap();
        assert!((t.scale - 2.0).abs() < 1e-12);
        assert!((t.offset_x + 6.0).abs() < 1e-12);
        assert!((t.offset_y + 2.0).abs() < 1e-12);

        let (min, max) = island.normalised_bounds().unwrap();
        assert!(min.coords.norm() < 1e-12);
        assert!((max - Point2::new(2.0, 1.0)).norm() < 1e-12);

        let normalised = island.normalised_uv().unwrap();
        assert!((normalised.total_area(island.mesh().triangles()) - island.mesh_area()).abs() < 1e-12);
    }

    #[test]
    fn test_set_uv_invalidates() {
        let mut island = island();
        assert!((island.uv_area() - 0.5).abs() < 1e-12);

        let doubled = island.uv().transformed(&LayoutTransform::new(0.0, 0.0, 2.0).to_matrix());
        island.set_uv(doubled).unwrap();
        assert!((island.uv_area() - 2.0).abs() < 1e-12);
        assert!((island.normal_transform().unwrap().scale - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_not_unwrapped() {
        let island = UVMesh::new("Face1", island().mesh().clone());
        assert!(!island.valid());
        assert_eq!(island.uv_area(), 0.0);
        assert!(island.normal_transform().is_none());
        assert!(island.normalised_uv().is_none());
        assert!(island.island_bounds().is_none());
    }

    #[test]
    fn test_uv_length_mismatch() {
        let mut island = island();
        assert!(matches!(
            island.set_uv(UVMap::zeros(3)),
            Err(UnwrapError::InvalidParameter { name: "uv", .. })
        ));
    }

    #[test]
    fn test_collapsed_uv_has_no_transform() {
        let mut island = island();
        island.set_uv(UVMap::zeros(4)).unwrap();
        assert!(island.valid());
        assert_eq!(island.uv_area(), 0.0);
        assert!(island.normal_transform().is_none());
    }
}
