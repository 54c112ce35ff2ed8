//! Configuration templates and their variable declarations

use std::collections::BTreeMap;

use log::debug;

use crate::generator::ConfigGenerator;
use crate::parser::discover_variables;
use crate::registry::error::RegistryError;
use crate::registry::value_set::TemplateValueSet;
use crate::slug::variable_name_slug;
use crate::Error;

/// Reserved variable carried by every template and value set
pub const HOSTNAME_VARIABLE: &str = "hostname";

const HOSTNAME_DESCRIPTION: &str =
    "the hostname of the device (also used as name for the template value set)";

/// A declared variable: normalized name plus a user-facing description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclaration {
    name: String,
    description: String,
}

impl VariableDeclaration {
    /// Normalized variable name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A configuration template: source text, the variables declared on it and
/// the value sets created from it.
///
/// The declaration set tracks the source: whenever the content changes,
/// discovery runs and every referenced placeholder gets a declaration. The
/// `hostname` variable is always declared, whether or not the source
/// mentions it. Replacing the content with different text drops all value
/// sets, since their values cannot be assumed to fit the new body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTemplate {
    name: String,
    content: String,
    variables: BTreeMap<String, VariableDeclaration>,
    value_sets: BTreeMap<String, TemplateValueSet>,
}

impl ConfigTemplate {
    /// Create a template with empty content
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_content(name, "")
    }

    /// Create a template and run discovery on `content`
    pub fn with_content(name: impl Into<String>, content: impl Into<String>) -> Self {
        let mut template = Self {
            name: name.into(),
            content: String::new(),
            variables: BTreeMap::new(),
            value_sets: BTreeMap::new(),
        };
        template.set_content(content);
        template
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The template source text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the template source.
    ///
    /// If the new content differs from the old, every dependent value set
    /// is deleted. Discovery then reconciles the declaration set against
    /// the new text.
    pub fn set_content(&mut self, content: impl Into<String>) {
        let content = content.into();
        if self.content != content {
            if !self.value_sets.is_empty() {
                debug!(
                    "content of template '{}' changed, dropping {} value sets",
                    self.name,
                    self.value_sets.len()
                );
            }
            self.value_sets.clear();
        }
        self.content = content;
        self.sync_variables_from_content();
    }

    fn sync_variables_from_content(&mut self) {
        self.update_variable(HOSTNAME_VARIABLE, HOSTNAME_DESCRIPTION);

        for name in discover_variables(&self.content) {
            if name != HOSTNAME_VARIABLE {
                self.update_variable(&name, "");
            }
        }
    }

    /// Add or update a variable declaration. The name is normalized first;
    /// an existing declaration only has its description overwritten. The
    /// normalized name actually used is returned.
    pub fn update_variable(&mut self, raw_name: &str, description: &str) -> String {
        let name = variable_name_slug(raw_name);
        match self.variables.get_mut(&name) {
            Some(declaration) => declaration.description = description.to_string(),
            None => {
                self.variables.insert(
                    name.clone(),
                    VariableDeclaration {
                        name: name.clone(),
                        description: description.to_string(),
                    },
                );
            }
        }
        name
    }

    /// Membership test under normalization
    pub fn is_variable_defined(&self, name: &str) -> bool {
        self.variables.contains_key(&variable_name_slug(name))
    }

    /// Look up a declaration by (raw or normalized) name
    pub fn variable(&self, name: &str) -> Result<&VariableDeclaration, RegistryError> {
        let key = variable_name_slug(name);
        self.variables
            .get(&key)
            .ok_or_else(|| RegistryError::VariableNotFound {
                name: key,
                template: self.name.clone(),
            })
    }

    /// All declared names in lexicographic order
    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.keys().map(String::as_str).collect()
    }

    /// All declarations, ordered by name
    pub fn variables(&self) -> impl Iterator<Item = &VariableDeclaration> {
        self.variables.values()
    }

    /// Rename a declared variable and move its value in every dependent
    /// value set, keeping the stored value.
    ///
    /// Fails if the old name is not declared or the new name already is.
    /// Returns the normalized new name.
    pub fn rename_variable(&mut self, old_name: &str, new_name: &str) -> Result<String, RegistryError> {
        let old = variable_name_slug(old_name);
        let new = variable_name_slug(new_name);

        if !self.variables.contains_key(&old) {
            return Err(RegistryError::VariableNotFound {
                name: old,
                template: self.name.clone(),
            });
        }
        if new == old {
            return Ok(new);
        }
        if self.variables.contains_key(&new) {
            return Err(RegistryError::DuplicateVariable {
                name: new,
                template: self.name.clone(),
            });
        }

        if let Some(mut declaration) = self.variables.remove(&old) {
            declaration.name = new.clone();
            self.variables.insert(new.clone(), declaration);
        }

        for value_set in self.value_sets.values_mut() {
            match value_set.remove_value(&old) {
                Some(value) => {
                    value_set.update_value(&new, value);
                }
                // reconciliation guarantees a value entry per declaration,
                // so a missing old value means the caller skipped it
                None => debug_assert!(
                    false,
                    "value set '{}' has no value for '{}'",
                    value_set.hostname(),
                    old
                ),
            }
        }

        Ok(new)
    }

    /// Create a value set bound to this template and copy the current
    /// declarations into it. The `hostname` value starts as the value
    /// set's own hostname, everything else starts empty.
    pub fn add_value_set(&mut self, hostname: &str) -> Result<(), RegistryError> {
        if self.value_sets.contains_key(hostname) {
            return Err(RegistryError::DuplicateValueSet {
                hostname: hostname.to_string(),
                template: self.name.clone(),
            });
        }

        let mut value_set = TemplateValueSet::bound(hostname, &self.name);
        value_set.copy_variables_from_template(self.variables.values())?;
        self.value_sets.insert(hostname.to_string(), value_set);
        Ok(())
    }

    /// Look up a value set by hostname
    pub fn value_set(&self, hostname: &str) -> Result<&TemplateValueSet, RegistryError> {
        self.value_sets
            .get(hostname)
            .ok_or_else(|| RegistryError::ValueSetNotFound {
                hostname: hostname.to_string(),
                template: self.name.clone(),
            })
    }

    /// Mutable lookup of a value set by hostname
    pub fn value_set_mut(&mut self, hostname: &str) -> Result<&mut TemplateValueSet, RegistryError> {
        self.value_sets
            .get_mut(hostname)
            .ok_or_else(|| RegistryError::ValueSetNotFound {
                hostname: hostname.to_string(),
                template: self.name.clone(),
            })
    }

    /// Delete a value set. Returns whether one existed.
    pub fn remove_value_set(&mut self, hostname: &str) -> bool {
        self.value_sets.remove(hostname).is_some()
    }

    /// Hostnames of all value sets in lexicographic order
    pub fn value_set_hostnames(&self) -> Vec<&str> {
        self.value_sets.keys().map(String::as_str).collect()
    }

    /// All value sets, ordered by hostname
    pub fn value_sets(&self) -> impl Iterator<Item = &TemplateValueSet> {
        self.value_sets.values()
    }

    /// Re-apply the current declarations to every value set. Call after
    /// declaring variables by hand; existing values are preserved.
    pub fn reconcile_value_sets(&mut self) -> Result<(), RegistryError> {
        for value_set in self.value_sets.values_mut() {
            value_set.copy_variables_from_template(self.variables.values())?;
        }
        Ok(())
    }

    /// Check a hostname for use as a new value set name
    pub fn valid_value_set_hostname(&self, hostname: &str) -> bool {
        !hostname.is_empty() && !self.value_sets.contains_key(hostname)
    }

    /// Render the configuration for one device from its value set
    pub fn render_value_set(&self, hostname: &str) -> Result<String, Error> {
        let value_set = self.value_set(hostname)?;

        let mut generator = ConfigGenerator::new(&self.content);
        for value in value_set.values() {
            generator.set_variable_value(value.name(), value.value());
        }

        Ok(generator.render()?)
    }
}
