//! PLY (Stanford polygon) support.
//!
//! Texture coordinates are read from and written to the `s`/`t` vertex
//! properties; `u`/`v` and `texture_u`/`texture_v` are accepted on load.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::{Point2, Point3};
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::algo::parameterize::UVMap;
use crate::error::{Result, UnwrapError};
use crate::mesh::TriMesh;

const UV_NAMES: [(&str, &str); 3] = [("s", "t"), ("u", "v"), ("texture_u", "texture_v")];

/// Load a mesh from a PLY file. Polygons are fan triangulated.
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriMesh> {
    load_with_uv(path).map(|(mesh, _)| mesh)
}

/// Load a mesh and, when every vertex carries them, its texture coordinates.
pub fn load_with_uv<P: AsRef<Path>>(path: P) -> Result<(TriMesh, Option<UVMap>)> {
    let path = path.as_ref();
    let load_error = |message: &str| UnwrapError::LoadError {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(&mut reader).map_err(|e| UnwrapError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error("PLY file has no vertex element"))?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    let mut uvs: Option<Vec<Point2<f64>>> = Some(Vec::with_capacity(vertex_element.len()));
    for vertex in vertex_element {
        let coord = |name: &str| {
            get_float_property(vertex, name)
                .ok_or_else(|| load_error(&format!("vertex missing {name} coordinate")))
        };
        vertices.push(Point3::new(coord("x")?, coord("y")?, coord("z")?));

        let uv = UV_NAMES.iter().find_map(|(u, v)| {
            Some(Point2::new(get_float_property(vertex, u)?, get_float_property(vertex, v)?))
        });
        uvs = match (uvs, uv) {
            (Some(mut list), Some(uv)) => {
                list.push(uv);
                Some(list)
            }
            _ => None,
        };
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| load_error("PLY file has no face element"))?;

    let mut triangles: Vec<[usize; 3]> = Vec::with_capacity(face_element.len());
    for face in face_element {
        let indices = get_list_property(face, "vertex_indices")
            .or_else(|| get_list_property(face, "vertex_index"))
            .ok_or_else(|| load_error("face missing vertex_indices property"))?;

        if indices.len() >= 3 {
            for i in 1..indices.len() - 1 {
                triangles.push([indices[0], indices[i], indices[i + 1]]);
            }
        }
    }

    if triangles.is_empty() {
        return Err(load_error("PLY file contains no faces"));
    }

    let mesh = TriMesh::new(vertices, triangles)?;
    Ok((mesh, uvs.map(UVMap::new)))
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

/// Save a mesh as ASCII PLY, with `s`/`t` texture coordinates if given.
///
/// # Errors
///
/// [`UnwrapError::InvalidParameter`] if `uv` does not match the vertex count.
pub fn save<P: AsRef<Path>>(mesh: &TriMesh, uv: Option<&UVMap>, path: P) -> Result<()> {
    if let Some(uv) = uv {
        if uv.len() != mesh.num_vertices() {
            return Err(UnwrapError::invalid_param(
                "uv",
                uv.len(),
                format!("expected {} coordinates", mesh.num_vertices()),
            ));
        }
    }

    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by unfurl")?;
    writeln!(writer, "element vertex {}", mesh.num_vertices())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    if uv.is_some() {
        writeln!(writer, "property double s")?;
        writeln!(writer, "property double t")?;
    }
    writeln!(writer, "element face {}", mesh.num_triangles())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;

    for (i, p) in mesh.vertices().iter().enumerate() {
        match uv {
            Some(uv) => {
                let st = uv.get(i);
                writeln!(writer, "{} {} {} {} {}", p.x, p.y, p.z, st.x, st.y)?;
            }
            None => writeln!(writer, "{} {} {}", p.x, p.y, p.z)?,
        }
    }
    for [a, b, c] in mesh.triangles() {
        writeln!(writer, "3 {} {} {}", a, b, c)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> TriMesh {
        TriMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    fn temp_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("unfurl_{}_{}.ply", tag, std::process::id()))
    }

    #[test]
    fn test_round_trip_with_uv() {
        let mesh = square();
        let uv = UVMap::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 0.0),
            Point2::new(0.5, 0.5),
            Point2::new(0.0, 0.5),
        ]);
        let path = temp_path("uv");
        save(&mesh, Some(&uv), &path).unwrap();
        let (loaded, loaded_uv) = load_with_uv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, mesh);
        assert_eq!(loaded_uv.unwrap().get(2), Point2::new(0.5, 0.5));
    }

    #[test]
    fn test_no_uv() {
        let path = temp_path("plain");
        save(&square(), None, &path).unwrap();
        let (loaded, uv) = load_with_uv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_triangles(), 2);
        assert!(uv.is_none());
    }

    #[test]
    fn test_uv_length_checked() {
        let result = save(&square(), Some(&UVMap::zeros(3)), temp_path("bad"));
        assert!(matches!(result, Err(UnwrapError::InvalidParameter { .. })));
    }
}
