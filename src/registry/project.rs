//! Project container for configuration templates

use std::collections::BTreeMap;

use crate::registry::error::RegistryError;
use crate::registry::template::ConfigTemplate;

/// Named root container that owns configuration templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    name: String,
    templates: BTreeMap<String, ConfigTemplate>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            templates: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a template; its name must be unique within the project
    pub fn add_template(&mut self, template: ConfigTemplate) -> Result<(), RegistryError> {
        if self.templates.contains_key(template.name()) {
            return Err(RegistryError::DuplicateTemplate {
                name: template.name().to_string(),
                project: self.name.clone(),
            });
        }
        self.templates.insert(template.name().to_string(), template);
        Ok(())
    }

    pub fn template(&self, name: &str) -> Option<&ConfigTemplate> {
        self.templates.get(name)
    }

    pub fn template_mut(&mut self, name: &str) -> Option<&mut ConfigTemplate> {
        self.templates.get_mut(name)
    }

    /// Delete a template and everything it owns. Returns whether one
    /// existed.
    pub fn remove_template(&mut self, name: &str) -> bool {
        self.templates.remove(name).is_some()
    }

    /// Template names in lexicographic order
    pub fn template_names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    /// Check a name for use as a new template name
    pub fn valid_template_name(&self, name: &str) -> bool {
        !name.is_empty() && !self.templates.contains_key(name)
    }
}
