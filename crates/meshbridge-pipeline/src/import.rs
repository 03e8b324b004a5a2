//! Importing processed mesh artifacts back into the host document.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use meshbridge_document::{Document, ObjectKind, sanitize_name};

use crate::error::PipelineError;
use crate::registry::IntermediateRegistry;

/// Imports a mesh artifact into a document and locates the resulting entity.
pub struct MeshImporter;

impl MeshImporter {
    /// Load `path` into the document and return the name of the imported
    /// mesh feature.
    ///
    /// The expected entity name is derived from the artifact's file stem
    /// (sanitized the same way the document names imported objects); the
    /// search considers only mesh features. Every object the import step
    /// creates, matched or auxiliary, is registered for cleanup.
    pub fn import(
        doc: &mut Document,
        path: &Path,
        registry: &mut IntermediateRegistry,
    ) -> Result<String, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::MissingOutputArtifact {
                path: path.to_path_buf(),
            });
        }

        let before: HashSet<String> = doc.object_names().into_iter().collect();

        doc.insert_mesh_file(path)?;

        for name in doc.object_names() {
            if !before.contains(&name) {
                registry.register(&name);
            }
        }

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("Mesh");
        let expected = sanitize_name(stem);
        debug!(expected = %expected, "Scanning document for imported entity");

        let found = doc
            .objects_of_kind(ObjectKind::MeshFeature)
            .find(|o| o.name() == expected)
            .map(|o| o.name().to_string());

        match found {
            Some(name) => {
                info!(object = %name, path = %path.display(), "Imported processed mesh");
                Ok(name)
            }
            None => Err(PipelineError::ImportedEntityNotFound { name: expected }),
        }
    }
}
