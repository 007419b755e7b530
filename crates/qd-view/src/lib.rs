//! Querydesk View Artifacts
//!
//! The persisted artifact model for the query workbench.
//!
//! # Core Concepts
//!
//! - [`View`]: Named, versioned artifact bundling code and metadata
//! - [`ViewSteps`]: Executable payload with its own type tag
//! - [`ParameterMetadata`]: Parameter document derived from editor declarations
//! - [`MetadataDocument`]: Parse-once representation of persisted metadata
//! - [`MetadataReconciler`]: Replaces the `parameters` field, preserving the rest
//!
//! # Example
//!
//! ```rust,ignore
//! use qd_view::{MetadataReconciler, View, ViewSteps, ViewType};
//!
//! // Reconcile stored metadata with the latest declarations
//! let metadata = MetadataReconciler::new().reconcile(stored, Some(&declared))?;
//!
//! let view = View::new("vitals", "1.0.0", ViewType::Query, steps, "description")
//!     .with_metadata(metadata);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod metadata;
mod params;
mod view;

// Re-exports
pub use metadata::{MetadataDocument, MetadataError, MetadataReconciler, PARAMETERS_KEY};
pub use params::{
    DeclaredParameter, DeclaredParameters, ParameterMetadata, ParameterSpec,
    DEFAULT_PARAMETER_TYPE,
};
pub use view::{View, ViewSteps, ViewType};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
