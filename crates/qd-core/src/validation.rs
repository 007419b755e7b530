//! Form validation gate
//!
//! Per-field rule lists evaluated before any submission side effect. A field
//! is valid when every rule passes; a form is valid when every field is.
//! Violations are returned to the caller for inline display and never go
//! through the notifier.

use crate::config::WorkbenchConfig;
use crate::form::{SaveForm, SnippetForm};
use crate::services::SnippetRegistry;
use std::sync::Arc;

/// Fields the gate knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    /// View or snippet name
    Name,
}

/// A single validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Value must be non-empty
    Required,
    /// Value must be at least this many characters (empty values pass;
    /// [`FieldRule::Required`] owns that case)
    MinLength(usize),
    /// Value must not collide with a stored snippet name
    UniqueSnippetName,
}

/// One failed rule on one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldViolation {
    /// Field the rule ran against
    pub field: FormField,
    /// Rule that failed
    pub rule: FieldRule,
}

/// Validation outcome carrying every violated rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("form validation failed: {} rule violations", .violations.len())]
pub struct ValidationError {
    /// All violations, in rule order per field
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// True if any violation is recorded against `field`
    #[must_use]
    pub fn field_invalid(&self, field: FormField) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// True if `rule` appears among the violations
    #[must_use]
    pub fn violated(&self, rule: FieldRule) -> bool {
        self.violations.iter().any(|v| v.rule == rule)
    }
}

/// Validates dialog forms before the workflow touches any collaborator
///
/// View names carry no client-side uniqueness rule: name collisions are the
/// store's to reject. Snippet names are checked against the local registry
/// because snippets never go through the store.
pub struct FormValidationGate {
    registry: Arc<dyn SnippetRegistry>,
    min_name_length: usize,
}

impl FormValidationGate {
    /// Create a gate backed by the given registry
    #[must_use]
    pub fn new(registry: Arc<dyn SnippetRegistry>, config: &WorkbenchConfig) -> Self {
        Self {
            registry,
            min_name_length: config.min_name_length,
        }
    }

    /// Validate the save-view form
    ///
    /// Only the name is checked; description and version are free-form.
    ///
    /// # Errors
    /// [`ValidationError`] listing every violated rule
    pub fn validate_save_form(&self, form: &SaveForm) -> Result<(), ValidationError> {
        self.check(
            FormField::Name,
            &form.name,
            &[
                FieldRule::Required,
                FieldRule::MinLength(self.min_name_length),
            ],
        )
    }

    /// Validate the save-snippet form
    ///
    /// # Errors
    /// [`ValidationError`] listing every violated rule
    pub fn validate_snippet_form(&self, form: &SnippetForm) -> Result<(), ValidationError> {
        self.check(
            FormField::Name,
            &form.name,
            &[
                FieldRule::Required,
                FieldRule::MinLength(self.min_name_length),
                FieldRule::UniqueSnippetName,
            ],
        )
    }

    fn check(
        &self,
        field: FormField,
        value: &str,
        rules: &[FieldRule],
    ) -> Result<(), ValidationError> {
        let violations: Vec<FieldViolation> = rules
            .iter()
            .filter(|rule| !self.passes(value, **rule))
            .map(|rule| FieldViolation { field, rule: *rule })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }

    fn passes(&self, value: &str, rule: FieldRule) -> bool {
        match rule {
            FieldRule::Required => !value.is_empty(),
            FieldRule::MinLength(min) => value.is_empty() || value.chars().count() >= min,
            FieldRule::UniqueSnippetName => !self.registry.exists(value),
        }
    }
}
