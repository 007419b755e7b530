//! Error types for the save workflow
//!
//! Covers every way a submission can fail:
//! - Form validation violations
//! - Update requested with no view attached
//! - Metadata reconciliation failures
//! - Remote persistence failures

use crate::services::StoreError;
use crate::tab::TabId;
use crate::validation::ValidationError;
use qd_view::MetadataError;

/// Main workflow error type
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Form fields failed validation; nothing was touched
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Update requested for a tab with no attached view
    #[error("no view attached to tab {0}")]
    MissingView(TabId),

    /// Stored metadata could not be reconciled
    #[error("metadata reconciliation failed: {0}")]
    Metadata(#[from] MetadataError),

    /// Remote persistence call failed
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl WorkflowError {
    /// Check if resubmitting the same form could succeed
    ///
    /// Persistence failures are transient from the dialog's point of view;
    /// everything else needs user edits or repaired data first.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Check if the failure was surfaced through the notifier
    ///
    /// Validation and metadata failures stay inline with the dialog; only
    /// persistence failures raise a notification.
    #[inline]
    #[must_use]
    pub fn is_notified(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
