//! Configuration generator
//!
//! Couples placeholder discovery with the renderer: the generator owns a
//! template source string and a working set of variable values, re-reads
//! the referenced variable names whenever the source changes, and produces
//! the final configuration text.

use std::collections::BTreeMap;

use log::error;
use thiserror::Error;

use crate::error::SyntaxError;
use crate::parser::{discover_variables, parse_template, SyntaxConfig};
use crate::renderer::{self, RenderOptions};

/// Lookup of a variable name the generator has never seen
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("variable '{name}' is not known to the generator")]
pub struct UnknownVariableError {
    /// The name as it was requested
    pub name: String,
}

/// Variable-substituting configuration generator.
///
/// Setting the template source (re)discovers the referenced placeholder
/// names; every discovered name starts with an empty value. Values can be
/// set for names the source does not reference, which is how value-set
/// data such as `hostname` reaches the renderer.
///
/// # Example
///
/// ```rust
/// use confgen::ConfigGenerator;
///
/// let mut generator = ConfigGenerator::new("interface ${ port }");
/// assert_eq!(generator.template_variables(), vec!["port"]);
///
/// generator.set_variable_value("port", "GigabitEthernet0/1");
/// assert_eq!(generator.render().unwrap(), "interface GigabitEthernet0/1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigGenerator {
    template_string: String,
    variables: BTreeMap<String, String>,
    syntax: SyntaxConfig,
}

impl ConfigGenerator {
    /// Create a generator and discover the variables of `template_string`
    pub fn new(template_string: impl Into<String>) -> Self {
        let mut generator = Self::default();
        generator.set_template_string(template_string);
        generator
    }

    /// Use non-default comment markers
    pub fn with_syntax(mut self, syntax: SyntaxConfig) -> Self {
        self.syntax = syntax;
        self
    }

    /// The current template source
    pub fn template_string(&self) -> &str {
        &self.template_string
    }

    /// Replace the template source. The working values are cleared and
    /// discovery runs again, so every referenced name is present with an
    /// empty value afterwards.
    pub fn set_template_string(&mut self, template_string: impl Into<String>) {
        self.template_string = template_string.into();
        self.variables.clear();
        for name in discover_variables(&self.template_string) {
            self.add_variable(&name);
        }
    }

    /// The known variable names in lexicographic order
    pub fn template_variables(&self) -> Vec<&str> {
        self.variables.keys().map(String::as_str).collect()
    }

    /// Create a variable with an empty value
    pub fn add_variable(&mut self, name: &str) {
        self.set_variable_value(name, "");
    }

    /// Set the value of a variable, creating it if absent
    pub fn set_variable_value(&mut self, name: &str, value: impl Into<String>) {
        self.variables.insert(name.to_string(), value.into());
    }

    /// Read the current value of a variable
    pub fn get_variable_value(&self, name: &str) -> Result<&str, UnknownVariableError> {
        self.variables
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| UnknownVariableError {
                name: name.to_string(),
            })
    }

    /// Render the template with blank lines stripped
    pub fn render(&self) -> Result<String, SyntaxError> {
        self.render_with_options(&RenderOptions::default())
    }

    /// Render the template with explicit options
    pub fn render_with_options(&self, options: &RenderOptions) -> Result<String, SyntaxError> {
        let ast = parse_template(&self.template_string, &self.syntax).map_err(|err| {
            error!("template syntax error: {}", err);
            err
        })?;
        Ok(renderer::render(&ast, &self.variables, options))
    }
}
