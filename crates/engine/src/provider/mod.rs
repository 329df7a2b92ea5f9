//! Provider registry and the built-in providers.
//!
//! Modules:
//! - `registry`: discriminator name to constructor mapping
//! - `exec`: local process invocation
//! - `lambda`: remote function invocation
//! - `rest`: HTTP request
//! - `noop`: does nothing; binds empty commands and placeholders

mod exec;
mod lambda;
mod noop;
mod registry;
mod rest;

pub use exec::ExecProvider;
pub use lambda::LambdaProvider;
pub use noop::NoopProvider;
pub use registry::{ProviderConstructor, ProviderRegistry, RegistrationError};
pub use rest::RestProvider;

use clic_types::{ResolvedValues, SpecError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Decodes a provider body into its declared shape. A null body (e.g. a bare
/// `exec:` key in YAML) decodes to the shape's default.
pub(crate) fn decode_provider<T>(kind: &str, raw: &Value) -> Result<T, SpecError>
where
    T: DeserializeOwned + Default,
{
    if raw.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(raw.clone()).map_err(|error| SpecError::ProviderDecode {
        provider: kind.to_string(),
        reason: error.to_string(),
    })
}

pub(crate) fn invalid(kind: &str, reason: impl Into<String>) -> SpecError {
    SpecError::InvalidProvider {
        provider: kind.to_string(),
        reason: reason.into(),
    }
}

/// Substitutes `template`, logging any placeholder left unresolved.
pub(crate) fn inject_logged(kind: &str, values: &ResolvedValues, template: &str) -> String {
    let unresolved = values.unresolved(template);
    if !unresolved.is_empty() {
        debug!(provider = %kind, template = %template, unresolved = ?unresolved, "leaving unresolved placeholders verbatim");
    }
    values.inject(template)
}
