//! The provider contract and the payloads providers hand to external invokers.

use std::{fmt::Debug, sync::Arc};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{FlagSource, InvocationError, ParameterSet, ResolvedValues, SpecError};

/// The polymorphic leaf behavior of a command.
///
/// A provider is constructed from the raw value found under its discriminator
/// key and is immutable afterwards: resolving parameters and preparing an
/// invocation never touch the provider itself, so one resolved command can be
/// dispatched any number of times.
pub trait Provider: Debug + Send + Sync {
    /// Discriminator key this provider is registered under.
    fn kind(&self) -> &str;

    /// Parameters surfaced as flags by the presentation layer.
    fn parameters(&self) -> ParameterSet;

    /// Checks the provider's own contract and returns a normalized copy.
    fn validate(&self) -> Result<Arc<dyn Provider>, SpecError>;

    /// The provider's body in the canonical input schema.
    fn to_spec_value(&self) -> Value;

    /// Builds the fully substituted payload for one invocation.
    fn prepare(&self, values: &ResolvedValues) -> Result<Invocation, InvocationError>;

    /// Resolves this provider's parameters against `source` and prepares the
    /// resulting invocation.
    fn resolve(&self, source: &dyn FlagSource) -> Result<Invocation, InvocationError> {
        let values = self.parameters().resolve_values(source)?;
        self.prepare(&values)
    }
}

impl PartialEq for dyn Provider {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.to_spec_value() == other.to_spec_value()
    }
}

/// A ready-to-execute payload. Executing it is the job of an external invoker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum Invocation {
    Exec(ExecInvocation),
    Remote(RemoteInvocation),
    Http(HttpInvocation),
    Noop,
}

/// Local process invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecInvocation {
    pub path: String,
    pub args: Vec<String>,
}

/// Remote function invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteInvocation {
    pub target: String,
    pub payload: Map<String, Value>,
}

/// HTTP request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpInvocation {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default)]
    pub print_status: bool,
}
