//! Boundary-representation shapes reconstructed from triangle meshes.
//!
//! A [`Shape`] is a faceted B-rep shell: welded vertices, triangular faces
//! and an edge adjacency table. Reconstruction welds mesh vertices within a
//! linear tolerance and drops degenerate facets; solid construction verifies
//! the shell is a closed manifold and orients it outward.

use std::collections::HashMap;

use crate::error::GeometryError;
use crate::mesh::TriangleMesh;

/// A faceted boundary-representation shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    /// Welded vertex positions.
    vertices: Vec<[f32; 3]>,
    /// Triangular faces, indices into `vertices`.
    faces: Vec<[u32; 3]>,
    /// Edges bounding exactly one face.
    open_edges: usize,
    /// Edges bounding more than two faces.
    over_shared_edges: usize,
}

impl Shape {
    /// An empty shape (no faces, no volume).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reconstruct a shape from mesh topology.
    ///
    /// Vertices closer than `tolerance` are welded to a single shape vertex;
    /// facets that collapse under welding are discarded. With `sew` disabled
    /// every facet keeps its own vertices and no shell connectivity is built.
    pub fn from_mesh(
        mesh: &TriangleMesh,
        tolerance: f32,
        sew: bool,
    ) -> Result<Self, GeometryError> {
        if mesh.is_empty() {
            return Err(GeometryError::EmptyMesh);
        }

        let mut vertices: Vec<[f32; 3]> = Vec::new();
        let mut faces: Vec<[u32; 3]> = Vec::new();

        if sew {
            // Quantize positions into tolerance-sized cells; points landing
            // in the same cell collapse to one shape vertex.
            let inv = 1.0 / tolerance.max(f32::EPSILON);
            let mut cells: HashMap<[i64; 3], u32> = HashMap::new();
            let mut remap: Vec<u32> = Vec::with_capacity(mesh.vertices.len());

            for v in &mesh.vertices {
                let key = [
                    (v[0] * inv).round() as i64,
                    (v[1] * inv).round() as i64,
                    (v[2] * inv).round() as i64,
                ];
                let idx = *cells.entry(key).or_insert_with(|| {
                    let idx = vertices.len() as u32;
                    vertices.push(*v);
                    idx
                });
                remap.push(idx);
            }

            for t in &mesh.triangles {
                let f = [
                    remap[t[0] as usize],
                    remap[t[1] as usize],
                    remap[t[2] as usize],
                ];
                // Degenerate under welding
                if f[0] == f[1] || f[1] == f[2] || f[2] == f[0] {
                    continue;
                }
                faces.push(f);
            }
        } else {
            for t in &mesh.triangles {
                let base = vertices.len() as u32;
                vertices.push(mesh.vertices[t[0] as usize]);
                vertices.push(mesh.vertices[t[1] as usize]);
                vertices.push(mesh.vertices[t[2] as usize]);
                faces.push([base, base + 1, base + 2]);
            }
        }

        let (open_edges, over_shared_edges) = edge_stats(&faces);

        tracing::debug!(
            faces = faces.len(),
            vertices = vertices.len(),
            open_edges,
            over_shared_edges,
            "Reconstructed shape from mesh"
        );

        Ok(Self {
            vertices,
            faces,
            open_edges,
            over_shared_edges,
        })
    }

    /// Number of faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether the shape carries no faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Number of edges bounding exactly one face.
    pub fn free_edge_count(&self) -> usize {
        self.open_edges
    }

    /// Whether every edge bounds exactly two faces.
    pub fn is_closed(&self) -> bool {
        !self.is_empty() && self.open_edges == 0 && self.over_shared_edges == 0
    }

    /// Whether no edge bounds more than two faces.
    pub fn is_manifold(&self) -> bool {
        self.over_shared_edges == 0
    }

    /// Whether the shape is a closed solid shell.
    pub fn is_solid(&self) -> bool {
        self.is_closed()
    }

    /// Signed enclosed volume (divergence theorem over the facets).
    ///
    /// Positive for outward-wound closed shells; meaningless for open shapes.
    pub fn volume(&self) -> f64 {
        let mut total = 0.0f64;
        for f in &self.faces {
            let a = self.vertices[f[0] as usize];
            let b = self.vertices[f[1] as usize];
            let c = self.vertices[f[2] as usize];
            total += signed_tetra_volume(a, b, c);
        }
        total
    }

    /// Build a closed solid from this shape.
    ///
    /// Verifies the shell is a closed manifold that encloses volume and
    /// returns an outward-oriented copy (winding flipped when the signed
    /// volume is negative).
    pub fn make_solid(&self) -> Result<Shape, GeometryError> {
        if self.is_empty() {
            return Err(GeometryError::EmptyShape);
        }
        if self.over_shared_edges > 0 {
            return Err(GeometryError::NonManifold {
                edges: self.over_shared_edges,
            });
        }
        if self.open_edges > 0 {
            return Err(GeometryError::NotClosed {
                open_edges: self.open_edges,
            });
        }

        let volume = self.volume();
        if volume.abs() < f64::EPSILON {
            return Err(GeometryError::ZeroVolume);
        }

        let mut solid = self.clone();
        if volume < 0.0 {
            for f in &mut solid.faces {
                f.swap(1, 2);
            }
        }
        Ok(solid)
    }

    /// Tessellate the shape back into a triangle mesh.
    pub fn to_mesh(&self) -> TriangleMesh {
        TriangleMesh {
            vertices: self.vertices.clone(),
            triangles: self.faces.clone(),
        }
    }
}

/// Count open (single-face) and over-shared (>2 faces) edges.
fn edge_stats(faces: &[[u32; 3]]) -> (usize, usize) {
    let mut counts: HashMap<(u32, u32), u32> = HashMap::new();
    for f in faces {
        for (a, b) in [(f[0], f[1]), (f[1], f[2]), (f[2], f[0])] {
            let key = if a < b { (a, b) } else { (b, a) };
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    let open = counts.values().filter(|&&c| c == 1).count();
    let over = counts.values().filter(|&&c| c > 2).count();
    (open, over)
}

/// Signed volume of the tetrahedron (origin, a, b, c).
fn signed_tetra_volume(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> f64 {
    let (ax, ay, az) = (a[0] as f64, a[1] as f64, a[2] as f64);
    let (bx, by, bz) = (b[0] as f64, b[1] as f64, b[2] as f64);
    let (cx, cy, cz) = (c[0] as f64, c[1] as f64, c[2] as f64);
    (ax * (by * cz - bz * cy) - ay * (bx * cz - bz * cx) + az * (bx * cy - by * cx)) / 6.0
}
