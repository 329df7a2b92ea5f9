use std::sync::Arc;

use clic_types::{HttpInvocation, Invocation, InvocationError, ParameterSet, Provider, ResolvedValues, SpecError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::{decode_provider, inject_logged, invalid};

pub const KIND: &str = "rest";

const METHODS: [&str; 9] = ["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "TRACE", "CONNECT"];
const DEFAULT_CONTENT_TYPE: (&str, &str) = ("Content-Type", "application/json");

/// Issues an HTTP request. Query parameters are appended to the endpoint and
/// body parameters form a JSON object body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RestProvider {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "ParameterSet::is_empty")]
    pub query_params: ParameterSet,
    #[serde(default, skip_serializing_if = "ParameterSet::is_empty")]
    pub body_params: ParameterSet,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub print_status: bool,
}

impl RestProvider {
    pub fn from_value(raw: &Value) -> Result<Arc<dyn Provider>, SpecError> {
        Ok(Arc::new(decode_provider::<RestProvider>(KIND, raw)?))
    }

    fn request_url(&self, values: &ResolvedValues) -> Result<String, InvocationError> {
        let endpoint = inject_logged(KIND, values, &self.endpoint);
        let mut url = Url::parse(&endpoint).map_err(|error| InvocationError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            reason: error.to_string(),
        })?;
        if !self.query_params.is_empty() {
            let mut query = url.query_pairs_mut();
            for parameter in &self.query_params {
                if let Some(value) = values.get(&parameter.name) {
                    query.append_pair(&parameter.name, &value.to_string());
                }
            }
        }
        Ok(url.to_string())
    }
}

impl Provider for RestProvider {
    fn kind(&self) -> &str {
        KIND
    }

    /// Query parameters followed by body parameters.
    fn parameters(&self) -> ParameterSet {
        self.query_params.concat(&self.body_params)
    }

    fn validate(&self) -> Result<Arc<dyn Provider>, SpecError> {
        let method = self.method.trim().to_ascii_uppercase();
        if method.is_empty() {
            return Err(invalid(KIND, "missing method"));
        }
        if self.endpoint.trim().is_empty() {
            return Err(invalid(KIND, "missing endpoint"));
        }
        if !METHODS.contains(&method.as_str()) {
            return Err(invalid(KIND, format!("unsupported method '{}'", self.method)));
        }
        let query_params = self.query_params.validate()?;
        let body_params = self.body_params.validate()?;
        // Both sets surface as flags on the same command.
        query_params.concat(&body_params).validate()?;

        Ok(Arc::new(RestProvider {
            method,
            endpoint: self.endpoint.clone(),
            headers: self.headers.clone(),
            query_params,
            body_params,
            print_status: self.print_status,
        }))
    }

    fn to_spec_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn prepare(&self, values: &ResolvedValues) -> Result<Invocation, InvocationError> {
        let url = self.request_url(values)?;

        let mut headers = IndexMap::from([(DEFAULT_CONTENT_TYPE.0.to_string(), DEFAULT_CONTENT_TYPE.1.to_string())]);
        for (name, value) in &self.headers {
            // Header names are case-insensitive; the authored spelling wins.
            headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
            headers.insert(name.clone(), inject_logged(KIND, values, value));
        }

        let body = (!self.body_params.is_empty()).then(|| Value::Object(values.json_object(&self.body_params)));

        Ok(Invocation::Http(HttpInvocation {
            method: self.method.clone(),
            url,
            headers,
            body,
            print_status: self.print_status,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use clic_types::{NoFlags, ParamValue};
    use serde_json::json;

    use super::*;

    fn validated(raw: Value) -> Arc<dyn Provider> {
        RestProvider::from_value(&raw).expect("decode rest").validate().expect("valid rest")
    }

    #[test]
    fn requires_method_and_endpoint() {
        let missing_method = RestProvider::from_value(&json!({"endpoint": "https://example.com"})).unwrap();
        assert_eq!(missing_method.validate().unwrap_err().to_string(), "invalid rest provider: missing method");

        let missing_endpoint = RestProvider::from_value(&json!({"method": "GET"})).unwrap();
        assert_eq!(missing_endpoint.validate().unwrap_err().to_string(), "invalid rest provider: missing endpoint");
    }

    #[test]
    fn rejects_unknown_methods_and_normalizes_case() {
        let unknown = RestProvider::from_value(&json!({"method": "FETCH", "endpoint": "https://example.com"})).unwrap();
        assert!(unknown.validate().is_err());

        let lower = validated(json!({"method": "post", "endpoint": "https://example.com"}));
        assert_eq!(lower.to_spec_value()["method"], json!("POST"));
    }

    #[test]
    fn rejects_names_shared_by_query_and_body() {
        let rest = RestProvider::from_value(&json!({
            "method": "POST",
            "endpoint": "https://example.com",
            "query_params": [{"name": "id", "type": "string"}],
            "body_params": [{"name": "id", "type": "string"}]
        }))
        .unwrap();
        assert!(rest.validate().is_err());
    }

    #[test]
    fn builds_request_with_query_body_and_headers() {
        let rest = validated(json!({
            "method": "POST",
            "endpoint": "https://api.example.com/users/{{params.user_id}}",
            "headers": {"Authorization": "Bearer {{params.token}}"},
            "query_params": [{"name": "user_id", "type": "string", "required": true}, {"name": "verbose", "type": "bool"}],
            "body_params": [{"name": "token", "type": "string", "default": "t0k"}, {"name": "limit", "type": "int", "default": 10}],
            "print_status": true
        }));

        let flags = HashMap::from([("user-id".to_string(), ParamValue::String("42".into()))]);
        let Invocation::Http(http) = rest.resolve(&flags).unwrap() else {
            panic!("expected http invocation");
        };

        assert_eq!(http.method, "POST");
        assert_eq!(http.url, "https://api.example.com/users/42?user_id=42&verbose=false");
        assert_eq!(http.headers.get("Content-Type").map(String::as_str), Some("application/json"));
        assert_eq!(http.headers.get("Authorization").map(String::as_str), Some("Bearer t0k"));
        assert_eq!(http.body, Some(json!({"token": "t0k", "limit": 10})));
        assert!(http.print_status);
    }

    #[test]
    fn authored_headers_replace_defaults_regardless_of_case() {
        let rest = validated(json!({
            "method": "POST",
            "endpoint": "https://example.com",
            "headers": {"content-type": "text/plain", "Accept": "text/plain"}
        }));
        let Invocation::Http(http) = rest.resolve(&NoFlags).unwrap() else {
            panic!("expected http invocation");
        };
        let headers: Vec<_> = http.headers.iter().map(|(name, value)| (name.as_str(), value.as_str())).collect();
        assert_eq!(headers, vec![("content-type", "text/plain"), ("Accept", "text/plain")]);
    }

    #[test]
    fn accepts_every_standard_method() {
        for method in ["get", "HEAD", "post", "PUT", "patch", "DELETE", "options", "trace", "CONNECT"] {
            let rest = validated(json!({"method": method, "endpoint": "https://example.com"}));
            assert_eq!(rest.to_spec_value()["method"], json!(method.to_ascii_uppercase()));
        }
    }

    #[test]
    fn omits_body_without_body_params() {
        let rest = validated(json!({"method": "GET", "endpoint": "https://example.com/status"}));
        let Invocation::Http(http) = rest.resolve(&NoFlags).unwrap() else {
            panic!("expected http invocation");
        };
        assert_eq!(http.url, "https://example.com/status");
        assert_eq!(http.body, None);
    }

    #[test]
    fn unparseable_endpoint_fails_preparation() {
        let rest = validated(json!({"method": "GET", "endpoint": "{{params.host}}/status"}));
        assert!(matches!(rest.resolve(&NoFlags), Err(InvocationError::InvalidEndpoint { .. })));
    }
}
