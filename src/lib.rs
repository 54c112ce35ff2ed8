//! confgen - device configuration generation from variable templates
//!
//! This library turns configuration templates with `${ name }` placeholders
//! into per-device configuration files. It discovers the variables a
//! template references, keeps variable declarations and per-device value
//! sets in sync, and renders the final text with conditional blocks,
//! comment stripping and blank-line normalization.
//!
//! # Example
//!
//! ```rust
//! use confgen::ConfigTemplate;
//!
//! let mut template = ConfigTemplate::with_content(
//!     "router-base",
//!     "host: ${hostname}\nport: ${port}",
//! );
//! template.add_value_set("r1").unwrap();
//! template.value_set_mut("r1").unwrap().update_value("port", "22");
//!
//! let output = template.render_value_set("r1").unwrap();
//! assert_eq!(output, "host: r1\nport: 22");
//! ```

pub mod error;
pub mod generator;
pub mod parser;
pub mod registry;
pub mod renderer;
pub mod slug;

pub use error::{Span, SyntaxError};
pub use generator::{ConfigGenerator, UnknownVariableError};
pub use parser::{discover_variables, parse_template, SyntaxConfig, TemplateAst};
pub use registry::{
    ConfigTemplate, Project, RegistryError, TemplateValue, TemplateValueSet, VariableDeclaration,
    HOSTNAME_VARIABLE,
};
pub use renderer::RenderOptions;
pub use slug::variable_name_slug;

use std::collections::BTreeMap;

use thiserror::Error;

/// Errors that can occur while generating device configurations
#[derive(Debug, Error)]
pub enum Error {
    /// The template body could not be compiled
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A registry lookup or synchronization failed
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Render a template source against a name to value mapping with default
/// syntax and options.
///
/// # Example
///
/// ```rust
/// use std::collections::BTreeMap;
///
/// let mut values = BTreeMap::new();
/// values.insert("hostname".to_string(), "r1".to_string());
///
/// let output = confgen::render("host: ${ hostname }", &values).unwrap();
/// assert_eq!(output, "host: r1");
/// ```
pub fn render(source: &str, values: &BTreeMap<String, String>) -> Result<String, SyntaxError> {
    let ast = parser::parse_template(source, &SyntaxConfig::default())?;
    Ok(renderer::render(&ast, values, &RenderOptions::default()))
}
