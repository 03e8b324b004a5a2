//! Registry of intermediate document objects owned by one pipeline run.

use tracing::debug;

use meshbridge_document::Document;

/// Ordered registry of document objects created during a pipeline run.
///
/// Every registered object is removed from the document exactly once during
/// cleanup; objects that have already vanished are swallowed silently.
#[derive(Debug, Default)]
pub struct IntermediateRegistry {
    /// Object names in registration order.
    names: Vec<String>,
}

impl IntermediateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object for cleanup.
    pub fn register(&mut self, name: impl Into<String>) {
        let name = name.into();
        debug!(object = %name, "Registered intermediate object");
        self.names.push(name);
    }

    /// Number of currently registered objects.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Remove every registered object from the document.
    ///
    /// Each name is drained, so the removal happens exactly once per object
    /// and a second cleanup call is a no-op. Returns the number of objects
    /// actually removed.
    pub fn cleanup(&mut self, doc: &mut Document) -> usize {
        let mut removed = 0;
        for name in self.names.drain(..) {
            if doc.remove(&name) {
                removed += 1;
            } else {
                debug!(object = %name, "Intermediate object already absent");
            }
        }
        removed
    }
}
