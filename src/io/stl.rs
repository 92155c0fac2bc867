//! STL support, binary and ASCII.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use nalgebra::Point3;

use crate::error::{Result, UnwrapError};
use crate::mesh::TriMesh;

/// Load a mesh from an STL file.
///
/// Identical corner positions are shared between triangles. Triangles that
/// collapse onto a repeated vertex are dropped.
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriMesh> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| UnwrapError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let vertices: Vec<Point3<f64>> = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();
    let triangles: Vec<[usize; 3]> = stl
        .faces
        .iter()
        .map(|f| f.vertices)
        .filter(|[a, b, c]| a != b && b != c && a != c)
        .collect();

    if triangles.is_empty() {
        return Err(UnwrapError::LoadError {
            path: path.to_path_buf(),
            message: "STL file contains no valid triangles".to_string(),
        });
    }

    log::debug!(
        "loaded {} vertices and {} triangles from {}",
        vertices.len(),
        triangles.len(),
        path.display()
    );
    TriMesh::new(vertices, triangles)
}

/// Save a mesh to a binary STL file.
pub fn save<P: AsRef<Path>>(mesh: &TriMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let vertex = |p: &Point3<f64>| stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32]);
    let triangles: Vec<stl_io::Triangle> = (0..mesh.num_triangles())
        .map(|t| {
            let [p0, p1, p2] = mesh.triangle_points(t);
            let n = mesh.triangle_normal(t);
            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [vertex(&p0), vertex(&p1), vertex(&p2)],
            }
        })
        .collect();

    stl_io::write_stl(&mut writer, triangles.iter())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_shares_vertices() {
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

        let path = std::env::temp_dir().join(format!("unfurl_stl_{}.stl", std::process::id()));
        save(&mesh, &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_vertices(), 4);
        assert_eq!(loaded.num_triangles(), 2);
        assert!((loaded.surface_area() - 1.0).abs() < 1e-6);
    }
}
