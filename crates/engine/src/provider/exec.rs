use std::sync::Arc;

use clic_types::{ExecInvocation, Invocation, InvocationError, ParameterSet, Provider, ResolvedValues, SpecError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode_provider, inject_logged, invalid};

pub const KIND: &str = "exec";

/// Runs a local executable with a templated argument vector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExecProvider {
    #[serde(default, alias = "name")]
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "ParameterSet::is_empty")]
    pub params: ParameterSet,
}

impl ExecProvider {
    pub fn from_value(raw: &Value) -> Result<Arc<dyn Provider>, SpecError> {
        Ok(Arc::new(decode_provider::<ExecProvider>(KIND, raw)?))
    }
}

impl Provider for ExecProvider {
    fn kind(&self) -> &str {
        KIND
    }

    fn parameters(&self) -> ParameterSet {
        self.params.clone()
    }

    fn validate(&self) -> Result<Arc<dyn Provider>, SpecError> {
        if self.path.trim().is_empty() {
            return Err(invalid(KIND, "missing path"));
        }
        Ok(Arc::new(ExecProvider {
            path: self.path.clone(),
            args: self.args.clone(),
            params: self.params.validate()?,
        }))
    }

    fn to_spec_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn prepare(&self, values: &ResolvedValues) -> Result<Invocation, InvocationError> {
        Ok(Invocation::Exec(ExecInvocation {
            path: inject_logged(KIND, values, &self.path),
            args: self.args.iter().map(|arg| inject_logged(KIND, values, arg)).collect(),
        }))
    }
}
