//! Template and value-set registry
//!
//! Keeps the two linked collections of the data model consistent: the
//! variable declarations attached to a template and, per dependent value
//! set, the variable values. Discovery adds missing declarations, value
//! sets are reconciled against the declaration set, and renames move
//! values without losing them. All names are normalized before use as
//! lookup keys.

mod error;
mod project;
mod template;
mod value_set;

pub use error::RegistryError;
pub use project::Project;
pub use template::{ConfigTemplate, VariableDeclaration, HOSTNAME_VARIABLE};
pub use value_set::{TemplateValue, TemplateValueSet};
