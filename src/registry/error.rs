//! Error types for the template registry

use thiserror::Error;

/// Errors raised by registry lookups and synchronization
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Requested variable has no declaration on the template
    #[error("variable '{name}' not found in template '{template}'")]
    VariableNotFound { name: String, template: String },

    /// Requested value does not exist in the value set
    #[error("value for '{name}' not found in value set '{value_set}'")]
    ValueNotFound { name: String, value_set: String },

    /// Requested value set does not exist on the template
    #[error("value set '{hostname}' not found in template '{template}'")]
    ValueSetNotFound { hostname: String, template: String },

    /// Rename target is already declared on the template
    #[error("variable '{name}' already exists in template '{template}'")]
    DuplicateVariable { name: String, template: String },

    /// A value set with the same hostname already exists
    #[error("value set '{hostname}' already exists in template '{template}'")]
    DuplicateValueSet { hostname: String, template: String },

    /// A template with the same name already exists in the project
    #[error("template '{name}' already exists in project '{project}'")]
    DuplicateTemplate { name: String, project: String },

    /// Value reconciliation was invoked on an unbound value set. This is a
    /// misuse of the API, not a recoverable data condition.
    #[error("no template bound to value set '{value_set}', cannot copy variable definitions")]
    TemplateNotBound { value_set: String },
}
