//! Typed command parameters.
//!
//! A [`Parameter`] is declared by a provider and surfaces as one CLI flag. Its
//! declaration is kept exactly as authored (the `type` string and the raw
//! `default` value) so that an unknown type or a mistyped default is a
//! validation error rather than a decode error. [`Parameter::validate`]
//! returns a normalized copy whose default has been narrowed to the declared
//! type.

use std::{fmt, str::FromStr};

use clic_util::to_flag_name;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FlagSource, ResolveError, ResolvedValues, SpecError};

/// The four recognised parameter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Bool,
    Int,
    Number,
    String,
}

impl ParamType {
    pub const ALL: [ParamType; 4] = [Self::Bool, Self::Int, Self::Number, Self::String];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Number => "number",
            Self::String => "string",
        }
    }

    /// Value an optional parameter takes when it declares no default.
    pub fn zero_value(&self) -> ParamValue {
        match self {
            Self::Bool => ParamValue::Bool(false),
            Self::Int => ParamValue::Int(0),
            Self::Number => ParamValue::Number(0.0),
            Self::String => ParamValue::String(String::new()),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|param_type| param_type.as_str() == s)
            .ok_or_else(|| SpecError::InvalidParameter(format!("unknown parameter type '{s}'")))
    }
}

/// A concrete, type-correct parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Number(f64),
    String(String),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::Bool(_) => ParamType::Bool,
            Self::Int(_) => ParamType::Int,
            Self::Number(_) => ParamType::Number,
            Self::String(_) => ParamType::String,
        }
    }

    /// Narrows a decoded JSON value to `param_type`.
    ///
    /// Decoders hand integers back as floats in some formats, so an `int`
    /// accepts any number with a zero fractional part. Returns `None` when the
    /// JSON kind does not match the declared type.
    pub fn from_json(param_type: ParamType, value: &Value) -> Option<Self> {
        match param_type {
            ParamType::Bool => value.as_bool().map(Self::Bool),
            ParamType::Int => {
                if let Some(int) = value.as_i64() {
                    return Some(Self::Int(int));
                }
                let float = value.as_f64()?;
                let in_range = float >= i64::MIN as f64 && float < i64::MAX as f64;
                (float.fract() == 0.0 && in_range).then_some(Self::Int(float as i64))
            }
            ParamType::Number => value.as_f64().map(Self::Number),
            ParamType::String => value.as_str().map(|text| Self::String(text.to_string())),
        }
    }

    /// Converts this value to `param_type`, widening `int` to `number` and
    /// narrowing integral numbers to `int`.
    pub fn coerce_to(self, param_type: ParamType) -> Option<Self> {
        match (self, param_type) {
            (value, target) if value.param_type() == target => Some(value),
            (Self::Int(int), ParamType::Number) => Some(Self::Number(int as f64)),
            (Self::Number(float), ParamType::Int) => ParamValue::from_json(ParamType::Int, &Value::from(float)),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Int(int) => Value::from(*int),
            Self::Number(float) => serde_json::Number::from_f64(*float).map(Value::Number).unwrap_or(Value::Null),
            Self::String(text) => Value::String(text.clone()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Int(int) => write!(f, "{int}"),
            Self::Number(float) => write!(f, "{float}"),
            Self::String(text) => f.write_str(text),
        }
    }
}

/// A named, typed, optionally defaulted parameter declared by a provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// One of `bool`, `int`, `number`, `string`, as authored.
    #[serde(default)]
    pub r#type: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Raw default as decoded; only meaningful when `required` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            r#type: param_type.as_str().to_string(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The parameter name as a CLI flag (`_` becomes `-`).
    pub fn cli_flag_name(&self) -> String {
        to_flag_name(&self.name)
    }

    pub fn param_type(&self) -> Result<ParamType, SpecError> {
        if self.r#type.is_empty() {
            return Err(SpecError::InvalidParameter(format!("param '{}' missing type", self.name)));
        }
        ParamType::from_str(&self.r#type)
            .map_err(|_| SpecError::InvalidParameter(format!("unknown type '{}' for param '{}'", self.r#type, self.name)))
    }

    /// The declared default narrowed to the declared type.
    pub fn typed_default(&self) -> Result<Option<ParamValue>, SpecError> {
        let Some(raw_default) = &self.default else {
            return Ok(None);
        };
        let param_type = self.param_type()?;
        ParamValue::from_json(param_type, raw_default).map(Some).ok_or_else(|| {
            SpecError::InvalidParameter(format!(
                "invalid default value '{}' for param '{}' (type {})",
                raw_default, self.name, param_type
            ))
        })
    }

    /// Value assigned before any explicit flag is consulted: the typed default,
    /// or the type's zero value. Required parameters have none.
    pub fn initial_value(&self) -> Result<Option<ParamValue>, SpecError> {
        if self.required {
            return Ok(None);
        }
        let param_type = self.param_type()?;
        Ok(Some(self.typed_default()?.unwrap_or_else(|| param_type.zero_value())))
    }

    /// Checks the declaration and returns a normalized copy.
    pub fn validate(&self) -> Result<Parameter, SpecError> {
        if self.name.is_empty() {
            return Err(SpecError::InvalidParameter("param missing name".to_string()));
        }
        if self.name.contains('-') || self.name.chars().any(char::is_whitespace) {
            return Err(SpecError::InvalidParameter(format!(
                "param name '{}' must not contain dashes or whitespace",
                self.name
            )));
        }
        self.param_type()?;
        if self.required && self.default.is_some() {
            return Err(SpecError::InvalidParameter(format!(
                "required param '{}' cannot have default value",
                self.name
            )));
        }
        let default = self.typed_default()?.map(|value| value.to_json());

        Ok(Parameter {
            name: self.name.clone(),
            description: self.description.clone(),
            r#type: self.r#type.clone(),
            required: self.required,
            default,
        })
    }
}

/// Ordered parameters owned by one provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet(Vec<Parameter>);

impl ParameterSet {
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self(parameters)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.0.iter().find(|parameter| parameter.name == name)
    }

    pub fn find_by_flag(&self, flag_name: &str) -> Option<&Parameter> {
        self.0.iter().find(|parameter| parameter.cli_flag_name() == flag_name)
    }

    /// Both sets, in order, as one set.
    pub fn concat(&self, other: &ParameterSet) -> ParameterSet {
        ParameterSet(self.0.iter().chain(other.0.iter()).cloned().collect())
    }

    /// Validates every parameter, fail-fast, and rejects duplicate names.
    pub fn validate(&self) -> Result<ParameterSet, SpecError> {
        let mut validated: Vec<Parameter> = Vec::with_capacity(self.0.len());
        for parameter in &self.0 {
            let parameter = parameter.validate()?;
            if validated.iter().any(|existing| existing.name == parameter.name) {
                return Err(SpecError::InvalidParameter(format!("duplicate param '{}'", parameter.name)));
            }
            validated.push(parameter);
        }
        Ok(ParameterSet(validated))
    }

    /// Computes this invocation's values without touching the declarations.
    ///
    /// Optional parameters start from their default (or zero value) and are
    /// overridden by any flag the source reports as explicitly set. Required
    /// parameters must come from the source.
    pub fn resolve_values(&self, source: &dyn FlagSource) -> Result<ResolvedValues, ResolveError> {
        let mut values = ResolvedValues::default();
        for parameter in &self.0 {
            let param_type = parameter.param_type()?;
            let value = match source.explicit_value(&parameter.cli_flag_name(), param_type) {
                Some(explicit) => explicit.coerce_to(param_type).ok_or_else(|| ResolveError::TypeMismatch {
                    name: parameter.name.clone(),
                    expected: param_type,
                })?,
                None => parameter
                    .initial_value()?
                    .ok_or_else(|| ResolveError::MissingRequired(parameter.name.clone()))?,
            };
            values.insert(parameter.name.clone(), value);
        }
        Ok(values)
    }
}

impl From<Vec<Parameter>> for ParameterSet {
    fn from(parameters: Vec<Parameter>) -> Self {
        Self(parameters)
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
