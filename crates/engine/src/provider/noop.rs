use std::sync::Arc;

use clic_types::{Invocation, InvocationError, ParameterSet, Provider, ResolvedValues, SpecError};
use serde_json::{Map, Value};

pub const KIND: &str = "noop";

/// A provider that does nothing. Any properties it is given are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoopProvider;

impl NoopProvider {
    pub fn from_value(_raw: &Value) -> Result<Arc<dyn Provider>, SpecError> {
        Ok(Arc::new(NoopProvider))
    }
}

impl Provider for NoopProvider {
    fn kind(&self) -> &str {
        KIND
    }

    fn parameters(&self) -> ParameterSet {
        ParameterSet::default()
    }

    fn validate(&self) -> Result<Arc<dyn Provider>, SpecError> {
        Ok(Arc::new(NoopProvider))
    }

    fn to_spec_value(&self) -> Value {
        Value::Object(Map::new())
    }

    fn prepare(&self, _values: &ResolvedValues) -> Result<Invocation, InvocationError> {
        Ok(Invocation::Noop)
    }
}
