//! Declared parameters and the derived metadata document
//!
//! Editor code declares parameters (name, optional description, optional
//! type tag). [`ParameterMetadata::from_declared`] turns one declaration set
//! into the canonical `parameters` document that gets persisted with a view:
//! exactly one record per declared name, with missing fields filled from
//! defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Type tag applied when a declaration carries none
pub const DEFAULT_PARAMETER_TYPE: &str = "string";

/// A parameter as declared in editor code
///
/// Both fields are optional at the declaration site; defaults are applied
/// only when the metadata document is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredParameter {
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Type tag, e.g. `"string"` or `"number"`
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
}

impl DeclaredParameter {
    /// Declaration with neither description nor type
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the type tag
    #[must_use]
    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = Some(param_type.into());
        self
    }
}

/// Declaration set keyed by parameter name
///
/// Ordered map so derived documents are stable regardless of the order the
/// editor reported declarations in.
pub type DeclaredParameters = BTreeMap<String, DeclaredParameter>;

/// One parameter record inside a metadata document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Description, empty string when the declaration had none
    pub description: String,
    /// Type tag, [`DEFAULT_PARAMETER_TYPE`] when the declaration had none
    #[serde(rename = "type")]
    pub param_type: String,
}

/// The `parameters` portion of a view's metadata document
///
/// # Invariants
/// - Exactly one record per declared parameter name
/// - Building is idempotent and independent of declaration order
/// - An empty document serializes to `{}` (the `parameters` key is omitted)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterMetadata {
    /// Parameter records keyed by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, ParameterSpec>,
}

impl ParameterMetadata {
    /// Empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the document from a declaration set
    ///
    /// `None` (no declarations available at all) yields an empty document,
    /// same as an empty set. Missing descriptions become `""`, missing type
    /// tags become [`DEFAULT_PARAMETER_TYPE`].
    #[must_use]
    pub fn from_declared(declared: Option<&DeclaredParameters>) -> Self {
        let mut metadata = Self::new();
        let Some(declared) = declared else {
            return metadata;
        };
        for (name, declaration) in declared {
            metadata.set_parameter(
                name.clone(),
                declaration.description.clone().unwrap_or_default(),
                declaration
                    .param_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PARAMETER_TYPE.to_string()),
            );
        }
        metadata
    }

    /// Insert or overwrite one parameter record
    pub fn set_parameter(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        param_type: impl Into<String>,
    ) {
        self.parameters.insert(
            name.into(),
            ParameterSpec {
                description: description.into(),
                param_type: param_type.into(),
            },
        );
    }

    /// True when no parameters are recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Number of recorded parameters
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }
}
