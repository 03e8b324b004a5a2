//! Indexed triangle meshes and STL interchange.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::GeometryError;

/// An indexed triangle surface mesh.
///
/// This is the payload carried across the external-tool process boundary:
/// both the exported input artifact and the imported output artifact are
/// flattened to/from this representation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<[f32; 3]>,
    /// Vertex indices, three per triangle.
    pub triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the mesh carries no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Read a mesh from an STL file (binary or ASCII).
    pub fn read_stl(path: &Path) -> Result<Self, GeometryError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let indexed = stl_io::read_stl(&mut reader).map_err(|e| GeometryError::StlParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let vertices = indexed
            .vertices
            .iter()
            .map(|v| [v[0], v[1], v[2]])
            .collect();
        let triangles = indexed
            .faces
            .iter()
            .map(|f| {
                [
                    f.vertices[0] as u32,
                    f.vertices[1] as u32,
                    f.vertices[2] as u32,
                ]
            })
            .collect();

        let mesh = Self {
            vertices,
            triangles,
        };

        tracing::debug!(
            path = %path.display(),
            triangles = mesh.triangle_count(),
            vertices = mesh.vertex_count(),
            "Read STL mesh"
        );

        Ok(mesh)
    }

    /// Write the mesh to a binary STL file, recomputing facet normals.
    pub fn write_stl(&self, path: &Path) -> Result<(), GeometryError> {
        if self.is_empty() {
            return Err(GeometryError::EmptyMesh);
        }

        let triangles: Vec<stl_io::Triangle> = self
            .triangles
            .iter()
            .map(|t| {
                let v0 = self.vertices[t[0] as usize];
                let v1 = self.vertices[t[1] as usize];
                let v2 = self.vertices[t[2] as usize];
                stl_io::Triangle {
                    normal: stl_io::Normal::new(facet_normal(v0, v1, v2)),
                    vertices: [
                        stl_io::Vertex::new(v0),
                        stl_io::Vertex::new(v1),
                        stl_io::Vertex::new(v2),
                    ],
                }
            })
            .collect();

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        stl_io::write_stl(&mut writer, triangles.iter())?;

        tracing::debug!(
            path = %path.display(),
            triangles = self.triangle_count(),
            "Wrote STL mesh"
        );

        Ok(())
    }
}

/// Unit facet normal, or zero for degenerate facets.
fn facet_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > f32::EPSILON {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 0.0, 0.0]
    }
}

/// Build a unit cube mesh (12 triangles, outward winding).
///
/// Used as a well-formed closed surface in tests and demos.
pub fn unit_cube() -> TriangleMesh {
    let vertices = vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    let triangles = vec![
        // bottom (z = 0, normal -z)
        [0, 2, 1],
        [0, 3, 2],
        // top (z = 1, normal +z)
        [4, 5, 6],
        [4, 6, 7],
        // front (y = 0, normal -y)
        [0, 1, 5],
        [0, 5, 4],
        // right (x = 1, normal +x)
        [1, 2, 6],
        [1, 6, 5],
        // back (y = 1, normal +y)
        [2, 3, 7],
        [2, 7, 6],
        // left (x = 0, normal -x)
        [3, 0, 4],
        [3, 4, 7],
    ];
    TriangleMesh {
        vertices,
        triangles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mesh() {
        let mesh = TriangleMesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_unit_cube_counts() {
        let cube = unit_cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn test_write_empty_mesh_fails() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("empty.stl");
        let result = TriangleMesh::new().write_stl(&path);
        assert!(matches!(result, Err(GeometryError::EmptyMesh)));
    }

    #[test]
    fn test_stl_roundtrip_preserves_topology() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("cube.stl");

        let cube = unit_cube();
        cube.write_stl(&path).expect("write");

        let read = TriangleMesh::read_stl(&path).expect("read");
        assert_eq!(read.triangle_count(), cube.triangle_count());
        // STL flattens shared vertices; the reader re-indexes them
        assert_eq!(read.vertex_count(), cube.vertex_count());
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let result = TriangleMesh::read_stl(Path::new("/nonexistent/mesh.stl"));
        assert!(matches!(result, Err(GeometryError::Io(_))));
    }

    #[test]
    fn test_read_garbage_is_parse_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("garbage.stl");
        std::fs::write(&path, b"not an stl file at all").expect("write");

        let result = TriangleMesh::read_stl(&path);
        assert!(matches!(result, Err(GeometryError::StlParse { .. })));
    }

    #[test]
    fn test_facet_normal_unit_length() {
        let n = facet_normal([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert!((n[2] - 1.0).abs() < 1e-6);
    }
}
