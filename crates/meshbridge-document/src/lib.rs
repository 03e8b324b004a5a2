//! # MeshBridge Document
//!
//! The host document object model the conversion pipeline collaborates with:
//! an insertion-ordered table of named feature objects, each carrying either
//! mesh or boundary-representation data. The pipeline receives a document
//! handle explicitly; there is no process-global active document.

pub mod document;
pub mod object;

pub use document::{Document, DocumentError, sanitize_name};
pub use object::{DocumentObject, ObjectData, ObjectKind};
