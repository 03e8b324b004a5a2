//! Reconstructing a solid from an imported mesh.

use tracing::info;

use meshbridge_document::Document;
use meshbridge_geometry::Shape;

use crate::error::PipelineError;
use crate::registry::IntermediateRegistry;

/// Linear tolerance for mesh-to-shape reconstruction, in length units.
pub const SHAPE_TOLERANCE: f32 = 0.1;

/// Whether facets are sewn into a connected shell during reconstruction.
pub const SEW_FACES: bool = true;

/// Builds boundary-representation shapes and solids from imported meshes.
pub struct SolidBuilder;

impl SolidBuilder {
    /// Convert a mesh feature's topology into a shape feature.
    ///
    /// The new feature is marked not pending recompute and registered as an
    /// intermediate. Fails with [`PipelineError::InvalidMeshObject`] when the
    /// object is absent, not mesh-bearing, or carries an empty mesh.
    pub fn shape_from_mesh(
        doc: &mut Document,
        mesh_object: &str,
        registry: &mut IntermediateRegistry,
    ) -> Result<String, PipelineError> {
        let invalid = || PipelineError::InvalidMeshObject {
            name: mesh_object.to_string(),
        };

        let mesh = doc
            .get(mesh_object)
            .and_then(|o| o.mesh())
            .ok_or_else(invalid)?;
        if mesh.is_empty() {
            return Err(invalid());
        }

        let shape = Shape::from_mesh(mesh, SHAPE_TOLERANCE, SEW_FACES).map_err(|_| invalid())?;

        let name = doc.add_shape("PartShape", shape);
        if let Some(obj) = doc.get_mut(&name) {
            obj.purge_touched();
        }
        registry.register(&name);

        info!(source = %mesh_object, shape = %name, "Created shape from mesh");
        Ok(name)
    }

    /// Produce a closed solid from a shape feature.
    ///
    /// Returns the new solid feature's name together with the solid shape
    /// value, so the caller can assign it by value to the target object.
    pub fn solid_from_shape(
        doc: &mut Document,
        shape_object: &str,
        registry: &mut IntermediateRegistry,
    ) -> Result<(String, Shape), PipelineError> {
        let shape = doc
            .get(shape_object)
            .and_then(|o| o.shape())
            .ok_or(PipelineError::SolidificationFailed {
                source: meshbridge_geometry::GeometryError::EmptyShape,
            })?;

        let solid = shape
            .make_solid()
            .map_err(|source| PipelineError::SolidificationFailed { source })?;

        let name = doc.add_shape("Solid", solid.clone());
        if let Some(obj) = doc.get_mut(&name) {
            obj.purge_touched();
        }
        registry.register(&name);

        info!(
            source = %shape_object,
            solid = %name,
            volume = solid.volume(),
            "Created solid from shape"
        );
        Ok((name, solid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshbridge_geometry::mesh::unit_cube;

    #[test]
    fn test_shape_from_cube_mesh() {
        let mut doc = Document::new("Test");
        let mesh_name = doc.add_mesh("Imported", unit_cube());
        let mut registry = IntermediateRegistry::new();

        let shape_name =
            SolidBuilder::shape_from_mesh(&mut doc, &mesh_name, &mut registry).expect("shape");

        let obj = doc.get(&shape_name).expect("object");
        assert!(obj.shape().expect("shape").is_closed());
        assert!(!obj.is_touched());
        assert_eq!(registry.names(), [shape_name]);
    }

    #[test]
    fn test_shape_from_absent_object() {
        let mut doc = Document::new("Test");
        let mut registry = IntermediateRegistry::new();
        let result = SolidBuilder::shape_from_mesh(&mut doc, "Missing", &mut registry);
        assert!(matches!(
            result,
            Err(PipelineError::InvalidMeshObject { .. })
        ));
    }

    #[test]
    fn test_shape_from_shape_bearing_object() {
        let mut doc = Document::new("Test");
        let name = doc.add_shape("Target", Shape::empty());
        let mut registry = IntermediateRegistry::new();
        let result = SolidBuilder::shape_from_mesh(&mut doc, &name, &mut registry);
        assert!(matches!(
            result,
            Err(PipelineError::InvalidMeshObject { .. })
        ));
    }

    #[test]
    fn test_shape_from_empty_mesh() {
        let mut doc = Document::new("Test");
        let name = doc.add_mesh("Empty", meshbridge_geometry::TriangleMesh::new());
        let mut registry = IntermediateRegistry::new();
        let result = SolidBuilder::shape_from_mesh(&mut doc, &name, &mut registry);
        assert!(matches!(
            result,
            Err(PipelineError::InvalidMeshObject { .. })
        ));
    }

    #[test]
    fn test_solid_from_closed_shape() {
        let mut doc = Document::new("Test");
        let mesh_name = doc.add_mesh("Imported", unit_cube());
        let mut registry = IntermediateRegistry::new();

        let shape_name =
            SolidBuilder::shape_from_mesh(&mut doc, &mesh_name, &mut registry).expect("shape");
        let (solid_name, solid) =
            SolidBuilder::solid_from_shape(&mut doc, &shape_name, &mut registry).expect("solid");

        assert!(solid.is_solid());
        assert!((solid.volume() - 1.0).abs() < 1e-4);
        assert_eq!(registry.len(), 2);
        assert!(!doc.get(&solid_name).expect("object").is_touched());
    }

    #[test]
    fn test_open_shape_fails_but_stays_registered() {
        let mut open = unit_cube();
        open.triangles.truncate(10);

        let mut doc = Document::new("Test");
        let mesh_name = doc.add_mesh("Imported", open);
        let mut registry = IntermediateRegistry::new();

        let shape_name =
            SolidBuilder::shape_from_mesh(&mut doc, &mesh_name, &mut registry).expect("shape");
        let result = SolidBuilder::solid_from_shape(&mut doc, &shape_name, &mut registry);

        assert!(matches!(
            result,
            Err(PipelineError::SolidificationFailed { .. })
        ));
        // The intermediate shape feature remains tracked for cleanup.
        assert_eq!(registry.names(), [shape_name]);
    }
}
