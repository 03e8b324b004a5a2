//! Processing requests and canonical parameter encoding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the solidify transform script.
pub const SOLIDIFY_SCRIPT: &str = "solidify.py";

/// A primitive parameter value forwarded to the external transform script.
///
/// Values are stringified canonically for the process boundary: floats use
/// the shortest round-trip decimal form, booleans render as lowercase
/// `true`/`false` (accepted by the script's case-insensitive truthy parse).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptParam {
    /// A floating-point value.
    Float(f64),
    /// An integer value.
    Int(i64),
    /// A boolean value.
    Bool(bool),
    /// A free-form text value.
    Text(String),
}

impl fmt::Display for ScriptParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

/// An immutable request to run one external transform over one source object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingRequest {
    /// Name of the source object in the host document.
    source: String,
    /// Identifier of the transform script to run.
    script: String,
    /// Ordered positional parameters appended after the artifact paths.
    params: Vec<ScriptParam>,
}

impl ProcessingRequest {
    /// Build a request for an arbitrary transform script.
    pub fn new(
        source: impl Into<String>,
        script: impl Into<String>,
        params: Vec<ScriptParam>,
    ) -> Self {
        Self {
            source: source.into(),
            script: script.into(),
            params,
        }
    }

    /// Build the canonical solidify request: thickness, then remesh flag.
    pub fn solidify(source: impl Into<String>, thickness: f64, remesh_before: bool) -> Self {
        Self::new(
            source,
            SOLIDIFY_SCRIPT,
            vec![
                ScriptParam::Float(thickness),
                ScriptParam::Bool(remesh_before),
            ],
        )
    }

    /// The source object name.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The transform script identifier.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// The ordered parameters.
    pub fn params(&self) -> &[ScriptParam] {
        &self.params
    }

    /// Stringify the parameters in order for the argument vector.
    pub fn encoded_params(&self) -> Vec<String> {
        self.params.iter().map(|p| p.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_encoding_is_shortest_roundtrip() {
        assert_eq!(ScriptParam::Float(2.5).to_string(), "2.5");
        assert_eq!(ScriptParam::Float(1.0).to_string(), "1");
        assert_eq!(ScriptParam::Float(0.25).to_string(), "0.25");
    }

    #[test]
    fn test_bool_encoding_is_lowercase_truthy_token() {
        let truthy = ["true", "1", "yes"];
        let encoded = ScriptParam::Bool(true).to_string();
        assert!(truthy.contains(&encoded.to_lowercase().as_str()));
        assert_eq!(ScriptParam::Bool(false).to_string(), "false");
    }

    #[test]
    fn test_solidify_request_parameter_order() {
        let request = ProcessingRequest::solidify("Part", 2.5, true);
        assert_eq!(request.source(), "Part");
        assert_eq!(request.script(), SOLIDIFY_SCRIPT);
        assert_eq!(request.encoded_params(), vec!["2.5", "true"]);
    }

    #[test]
    fn test_int_and_text_params() {
        let request = ProcessingRequest::new(
            "Part",
            "custom.py",
            vec![ScriptParam::Int(-3), ScriptParam::Text("voxel".into())],
        );
        assert_eq!(request.encoded_params(), vec!["-3", "voxel"]);
    }
}
