//! Document-resident feature objects.

use meshbridge_geometry::{Shape, TriangleMesh};

/// The feature kind of a document object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A mesh-bearing feature.
    MeshFeature,
    /// A shape-bearing (part) feature.
    PartFeature,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MeshFeature => write!(f, "MeshFeature"),
            Self::PartFeature => write!(f, "PartFeature"),
        }
    }
}

/// The geometric payload of a document object.
///
/// Mesh-bearing vs shape-bearing is a closed set of variants; callers match
/// on capability instead of probing attributes at runtime.
#[derive(Debug, Clone)]
pub enum ObjectData {
    /// Triangle mesh payload.
    Mesh(TriangleMesh),
    /// Boundary-representation payload.
    Shape(Shape),
}

impl ObjectData {
    /// The feature kind this payload implies.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Mesh(_) => ObjectKind::MeshFeature,
            Self::Shape(_) => ObjectKind::PartFeature,
        }
    }
}

/// A named feature object resident in a [`crate::Document`].
#[derive(Debug, Clone)]
pub struct DocumentObject {
    /// Unique object name within the document.
    name: String,
    /// Geometric payload.
    data: ObjectData,
    /// Whether the object is pending recompute.
    touched: bool,
}

impl DocumentObject {
    pub(crate) fn new(name: String, data: ObjectData) -> Self {
        Self {
            name,
            data,
            touched: true,
        }
    }

    /// The object's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The object's feature kind.
    pub fn kind(&self) -> ObjectKind {
        self.data.kind()
    }

    /// The object's geometric payload.
    pub fn data(&self) -> &ObjectData {
        &self.data
    }

    /// Mesh payload, if this is a mesh-bearing feature.
    pub fn mesh(&self) -> Option<&TriangleMesh> {
        match &self.data {
            ObjectData::Mesh(mesh) => Some(mesh),
            ObjectData::Shape(_) => None,
        }
    }

    /// Shape payload, if this is a shape-bearing feature.
    pub fn shape(&self) -> Option<&Shape> {
        match &self.data {
            ObjectData::Shape(shape) => Some(shape),
            ObjectData::Mesh(_) => None,
        }
    }

    /// Assign a shape payload by value, replacing the previous payload.
    pub fn set_shape(&mut self, shape: Shape) {
        self.data = ObjectData::Shape(shape);
        self.touched = true;
    }

    /// Whether the object is pending recompute.
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Mark the object as not pending recompute.
    pub fn purge_touched(&mut self) {
        self.touched = false;
    }
}
