//! The document: an insertion-ordered table of named feature objects.

use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

use meshbridge_geometry::{GeometryError, Shape, TriangleMesh};

use crate::object::{DocumentObject, ObjectData, ObjectKind};

/// Errors from document operations.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A mesh file could not be loaded into the document.
    #[error("failed to load mesh file: {0}")]
    MeshLoad(#[from] GeometryError),
}

/// Sanitize an object name: alphanumerics and underscores only.
///
/// Mirrors the host convention of deriving object names from file stems;
/// whitespace and punctuation become underscores so a name derived from a
/// path stem always matches the object the import created.
pub fn sanitize_name(raw: &str) -> String {
    let sanitized: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    if sanitized.is_empty() {
        "Unnamed".to_string()
    } else {
        sanitized
    }
}

/// A host document holding named feature objects in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Human-readable document label.
    label: String,
    /// Object table, insertion-ordered.
    objects: IndexMap<String, DocumentObject>,
}

impl Document {
    /// Create an empty document.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            objects: IndexMap::new(),
        }
    }

    /// The document label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of objects in the document.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the document holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Add a mesh feature; returns the unique name assigned to it.
    pub fn add_mesh(&mut self, base: &str, mesh: TriangleMesh) -> String {
        self.add_object(base, ObjectData::Mesh(mesh))
    }

    /// Add a shape (part) feature; returns the unique name assigned to it.
    pub fn add_shape(&mut self, base: &str, shape: Shape) -> String {
        self.add_object(base, ObjectData::Shape(shape))
    }

    /// Load a mesh file and add it as a mesh feature named after the file's
    /// sanitized stem; returns the name assigned to the new object.
    pub fn insert_mesh_file(&mut self, path: &Path) -> Result<String, DocumentError> {
        let mesh = TriangleMesh::read_stl(path)?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Mesh");
        let name = self.add_mesh(stem, mesh);

        tracing::debug!(
            document = %self.label,
            object = %name,
            path = %path.display(),
            "Inserted mesh file into document"
        );

        Ok(name)
    }

    fn add_object(&mut self, base: &str, data: ObjectData) -> String {
        let name = self.unique_name(base);
        let object = DocumentObject::new(name.clone(), data);
        self.objects.insert(name.clone(), object);
        name
    }

    /// Derive a unique object name from a base: the sanitized base itself,
    /// or `Base001`, `Base002`, ... on collision.
    fn unique_name(&self, base: &str) -> String {
        let base = sanitize_name(base);
        if !self.objects.contains_key(&base) {
            return base;
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{base}{n:03}");
            if !self.objects.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Look up an object by name.
    pub fn get(&self, name: &str) -> Option<&DocumentObject> {
        self.objects.get(name)
    }

    /// Look up an object by name, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut DocumentObject> {
        self.objects.get_mut(name)
    }

    /// Remove an object by name.
    ///
    /// Returns `false` when no such object exists; removal of an absent
    /// object is not an error.
    pub fn remove(&mut self, name: &str) -> bool {
        let removed = self.objects.shift_remove(name).is_some();
        if removed {
            tracing::debug!(document = %self.label, object = %name, "Removed object");
        }
        removed
    }

    /// Iterate over the objects in insertion order.
    pub fn objects(&self) -> impl Iterator<Item = &DocumentObject> {
        self.objects.values()
    }

    /// Object names in insertion order.
    pub fn object_names(&self) -> Vec<String> {
        self.objects.keys().cloned().collect()
    }

    /// Objects of a given kind, in insertion order.
    pub fn objects_of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &DocumentObject> {
        self.objects.values().filter(move |o| o.kind() == kind)
    }

    /// Recompute the document: clear all pending flags.
    ///
    /// Returns the number of objects that were pending.
    pub fn recompute(&mut self) -> usize {
        let mut count = 0;
        for object in self.objects.values_mut() {
            if object.is_touched() {
                object.purge_touched();
                count += 1;
            }
        }
        tracing::debug!(document = %self.label, recomputed = count, "Recomputed document");
        count
    }
}
