//! Per-device variable values

use std::collections::BTreeMap;

use crate::registry::error::RegistryError;
use crate::registry::template::{VariableDeclaration, HOSTNAME_VARIABLE};
use crate::slug::variable_name_slug;

/// One stored variable value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateValue {
    name: String,
    value: String,
}

impl TemplateValue {
    /// Normalized variable name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The set of variable values for one device, identified by hostname.
///
/// A value set is bound to the template it was created from; reconciling it
/// against that template's declarations guarantees a value entry for every
/// declared variable. The `hostname` value always mirrors the set's own
/// hostname. Names are normalized on every write and lookup, so
/// `"Mgmt IP"` and `"mgmt_ip"` address the same entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateValueSet {
    hostname: String,
    template: Option<String>,
    values: BTreeMap<String, TemplateValue>,
}

impl TemplateValueSet {
    /// Create a value set that is not bound to any template
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            template: None,
            values: BTreeMap::new(),
        }
    }

    pub(crate) fn bound(hostname: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            template: Some(template.into()),
            values: BTreeMap::new(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Name of the template this set is bound to
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Add or update a value. The name is normalized first; the normalized
    /// form actually used is returned.
    pub fn update_value(&mut self, raw_name: &str, value: impl Into<String>) -> String {
        let name = variable_name_slug(raw_name);
        let value = value.into();
        match self.values.get_mut(&name) {
            Some(entry) => entry.value = value,
            None => {
                self.values.insert(
                    name.clone(),
                    TemplateValue {
                        name: name.clone(),
                        value,
                    },
                );
            }
        }
        name
    }

    /// Read a value by (raw or normalized) variable name
    pub fn value(&self, name: &str) -> Result<&str, RegistryError> {
        let key = variable_name_slug(name);
        self.values
            .get(&key)
            .map(|entry| entry.value.as_str())
            .ok_or_else(|| RegistryError::ValueNotFound {
                name: key,
                value_set: self.hostname.clone(),
            })
    }

    /// Membership test under normalization
    pub fn is_value_defined(&self, name: &str) -> bool {
        self.values.contains_key(&variable_name_slug(name))
    }

    /// All value names in lexicographic order
    pub fn value_names(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    /// All values, ordered by name
    pub fn values(&self) -> impl Iterator<Item = &TemplateValue> {
        self.values.values()
    }

    pub(crate) fn remove_value(&mut self, name: &str) -> Option<String> {
        self.values
            .remove(&variable_name_slug(name))
            .map(|entry| entry.value)
    }

    /// Ensure this set has a value entry for every given declaration.
    ///
    /// Existing values are preserved, missing ones are created empty, and
    /// the `hostname` value is always forced to the set's own hostname.
    /// Calling this twice in a row changes nothing. Fails on a value set
    /// with no bound template.
    pub fn copy_variables_from_template<'a>(
        &mut self,
        variables: impl IntoIterator<Item = &'a VariableDeclaration>,
    ) -> Result<(), RegistryError> {
        if self.template.is_none() {
            return Err(RegistryError::TemplateNotBound {
                value_set: self.hostname.clone(),
            });
        }

        let hostname_value = self.hostname.clone();
        self.update_value(HOSTNAME_VARIABLE, hostname_value);

        for declaration in variables {
            if !self.is_value_defined(declaration.name()) {
                self.update_value(declaration.name(), "");
            }
        }

        Ok(())
    }
}
