use std::{fmt, sync::Arc};

use clic_types::{Provider, SpecError};
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::{ExecProvider, LambdaProvider, NoopProvider, RestProvider};

/// Builds a provider from the raw value found under its discriminator key.
/// Constructors report shape mismatches as errors and never panic.
pub type ProviderConstructor = Box<dyn Fn(&Value) -> Result<Arc<dyn Provider>, SpecError> + Send + Sync>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("provider '{0}' is already registered")]
    Duplicate(String),
    #[error("provider name must not be empty")]
    EmptyName,
}

/// Discriminator name to provider constructor.
///
/// Populated once at start-up and then handed to the resolver by reference;
/// the resolver never consults global state.
#[derive(Default)]
pub struct ProviderRegistry {
    constructors: IndexMap<String, ProviderConstructor>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `exec`, `lambda`, `rest` and `noop`
    /// providers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, fn(&Value) -> Result<Arc<dyn Provider>, SpecError>); 4] = [
            (super::exec::KIND, ExecProvider::from_value),
            (super::lambda::KIND, LambdaProvider::from_value),
            (super::rest::KIND, RestProvider::from_value),
            (super::noop::KIND, NoopProvider::from_value),
        ];
        for (name, constructor) in builtins {
            registry.constructors.insert(name.to_string(), Box::new(constructor));
        }
        registry
    }

    /// Registers `constructor` under `name`. The providers it builds must
    /// report `name` as their [`Provider::kind`], since that is the key they
    /// serialize under; a mismatch is reported when the constructor first runs.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> Result<(), RegistrationError>
    where
        F: Fn(&Value) -> Result<Arc<dyn Provider>, SpecError> + Send + Sync + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        if self.constructors.contains_key(&name) {
            return Err(RegistrationError::Duplicate(name));
        }
        debug!(provider = %name, "registered provider");
        self.constructors.insert(name, Box::new(constructor));
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Runs the constructor registered under `name`, or `None` when nothing is
    /// registered under it.
    pub fn construct(&self, name: &str, raw: &Value) -> Option<Result<Arc<dyn Provider>, SpecError>> {
        let constructor = self.constructors.get(name)?;
        Some(constructor(raw).and_then(|provider| {
            if provider.kind() == name {
                Ok(provider)
            } else {
                Err(SpecError::InvalidProvider {
                    provider: name.to_string(),
                    reason: format!("constructor built a '{}' provider", provider.kind()),
                })
            }
        }))
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry").field("providers", &self.names().collect::<Vec<_>>()).finish()
    }
}
