use std::sync::Arc;

use clic_types::{Invocation, InvocationError, ParameterSet, Provider, RemoteInvocation, ResolvedValues, SpecError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode_provider, inject_logged, invalid};

pub const KIND: &str = "lambda";

/// Invokes a remote function; resolved request parameters become the payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LambdaProvider {
    #[serde(default, alias = "target")]
    pub arn: String,
    #[serde(default, skip_serializing_if = "ParameterSet::is_empty")]
    pub request_params: ParameterSet,
}

impl LambdaProvider {
    pub fn from_value(raw: &Value) -> Result<Arc<dyn Provider>, SpecError> {
        Ok(Arc::new(decode_provider::<LambdaProvider>(KIND, raw)?))
    }
}

impl Provider for LambdaProvider {
    fn kind(&self) -> &str {
        KIND
    }

    fn parameters(&self) -> ParameterSet {
        self.request_params.clone()
    }

    fn validate(&self) -> Result<Arc<dyn Provider>, SpecError> {
        if self.arn.trim().is_empty() {
            return Err(invalid(KIND, "missing ARN"));
        }
        Ok(Arc::new(LambdaProvider {
            arn: self.arn.clone(),
            request_params: self.request_params.validate()?,
        }))
    }

    fn to_spec_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn prepare(&self, values: &ResolvedValues) -> Result<Invocation, InvocationError> {
        Ok(Invocation::Remote(RemoteInvocation {
            target: inject_logged(KIND, values, &self.arn),
            payload: values.json_object(&self.request_params),
        }))
    }
}
