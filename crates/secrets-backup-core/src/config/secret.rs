//! `SECRET__*` option group

use super::ConfigError;

/// Raw secret selector options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretOptions {
    pub name: String,
    pub namespace: String,
    pub label_key: String,
    pub label_value: String,
}

/// How the secrets to back up are picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSelection {
    /// A single secret by exact name
    ByName(String),
    /// Every secret carrying `key=value`
    ByLabel { key: String, value: String },
}

/// Validated secret selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretSelector {
    pub namespace: String,
    pub selection: SecretSelection,
}

/// The one list predicate sent to the cluster API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFilter {
    /// Field selector, e.g. `metadata.name=db-creds`
    Field(String),
    /// Label selector, e.g. `app=web`
    Label(String),
}

impl SecretOptions {
    pub(crate) fn validate(&self) -> Result<SecretSelector, ConfigError> {
        let has_name = !self.name.is_empty();
        let has_key = !self.label_key.is_empty();
        let has_value = !self.label_value.is_empty();

        let selection = match (has_name, has_key, has_value) {
            (true, false, false) => SecretSelection::ByName(self.name.clone()),
            (false, true, true) => SecretSelection::ByLabel {
                key: self.label_key.clone(),
                value: self.label_value.clone(),
            },
            _ => return Err(ConfigError::AmbiguousSecretSelector),
        };

        if self.namespace.is_empty() {
            return Err(ConfigError::MissingSecretNamespace);
        }

        Ok(SecretSelector {
            namespace: self.namespace.clone(),
            selection,
        })
    }
}

impl SecretSelection {
    /// The list predicate matching this selection
    pub fn filter(&self) -> ListFilter {
        match self {
            Self::ByName(name) => ListFilter::Field(format!("metadata.name={}", name)),
            Self::ByLabel { key, value } => ListFilter::Label(format!("{}={}", key, value)),
        }
    }
}

impl std::fmt::Display for SecretSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByName(name) => write!(f, "name {}", name),
            Self::ByLabel { key, value } => write!(f, "label {}={}", key, value),
        }
    }
}
