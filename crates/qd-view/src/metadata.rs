//! Metadata documents and reconciliation
//!
//! A view's metadata travels as a serialized JSON object of which the save
//! workflow owns exactly one field: `parameters`. [`MetadataDocument`] is the
//! parse-once representation (raw text is parsed at the entry point, never
//! re-checked mid-flow), and [`MetadataReconciler`] replaces the parameters
//! field while leaving every other field untouched, in its original order.

use crate::params::{DeclaredParameters, ParameterMetadata};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

/// Metadata field owned by the save workflow
pub const PARAMETERS_KEY: &str = "parameters";

/// Indentation for serialized metadata documents (4 spaces, diff-friendly)
const METADATA_INDENT: &[u8] = b"    ";

/// Errors raised while parsing or serializing metadata documents
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// Persisted document is not a JSON object. Fatal for the attempt that
    /// hit it; the stored artifact is never touched.
    #[error("malformed metadata document: {0}")]
    Parse(#[source] serde_json::Error),

    /// Document could not be serialized
    #[error("metadata serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Parsed metadata document
///
/// Wraps the full field map so unrelated fields (owners, editor settings,
/// anything future versions add) survive a reconcile byte-for-byte, in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataDocument {
    fields: Map<String, Value>,
}

impl MetadataDocument {
    /// Empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a serialized document
    ///
    /// # Errors
    /// [`MetadataError::Parse`] if `raw` is not a JSON object
    pub fn parse(raw: &str) -> Result<Self, MetadataError> {
        let fields = serde_json::from_str(raw).map_err(MetadataError::Parse)?;
        Ok(Self { fields })
    }

    /// Build a document holding only the given parameter set
    ///
    /// # Errors
    /// [`MetadataError::Serialize`] if the parameter set cannot be serialized
    pub fn from_parameters(metadata: &ParameterMetadata) -> Result<Self, MetadataError> {
        let mut document = Self::new();
        document.set_parameters(metadata)?;
        Ok(document)
    }

    /// Replace the `parameters` field
    ///
    /// An empty parameter set removes the field entirely, so a document with
    /// no declared parameters serializes to `{}`. All other fields are left
    /// alone.
    ///
    /// # Errors
    /// [`MetadataError::Serialize`] if the parameter set cannot be serialized
    pub fn set_parameters(&mut self, metadata: &ParameterMetadata) -> Result<(), MetadataError> {
        if metadata.is_empty() {
            self.fields.remove(PARAMETERS_KEY);
            return Ok(());
        }
        let value = serde_json::to_value(&metadata.parameters).map_err(MetadataError::Serialize)?;
        self.fields.insert(PARAMETERS_KEY.to_string(), value);
        Ok(())
    }

    /// Field lookup
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `parameters` field, if present
    #[inline]
    #[must_use]
    pub fn parameters(&self) -> Option<&Value> {
        self.get(PARAMETERS_KEY)
    }

    /// Number of top-level fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the document has no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serialize with 4-space indentation
    ///
    /// # Errors
    /// [`MetadataError::Serialize`] on serializer failure
    pub fn to_pretty_string(&self) -> Result<String, MetadataError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(METADATA_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.fields
            .serialize(&mut serializer)
            .map_err(MetadataError::Serialize)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Reconciles persisted metadata with freshly declared parameters
///
/// # Workflow
/// 1. Parse the existing document, or start from an empty one
/// 2. Replace its `parameters` field with the set derived from `fresh`
/// 3. Serialize back with 4-space indentation
///
/// Step 1 failing is fatal for the surrounding update: the error propagates
/// and the caller must not fall through to persistence.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataReconciler;

impl MetadataReconciler {
    /// Create a reconciler
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Reconcile `existing` metadata with `fresh` declarations
    ///
    /// # Arguments
    /// * `existing` - serialized document from the stored view, if any
    /// * `fresh` - declaration set selected from the editor, if any
    ///
    /// # Returns
    /// The serialized reconciled document
    ///
    /// # Errors
    /// * [`MetadataError::Parse`] - `existing` is not a JSON object
    /// * [`MetadataError::Serialize`] - serializer failure
    pub fn reconcile(
        &self,
        existing: Option<&str>,
        fresh: Option<&DeclaredParameters>,
    ) -> Result<String, MetadataError> {
        let mut document = match existing {
            Some(raw) => MetadataDocument::parse(raw)?,
            None => MetadataDocument::new(),
        };
        document.set_parameters(&ParameterMetadata::from_declared(fresh))?;
        document.to_pretty_string()
    }
}
