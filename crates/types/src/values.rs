//! Per-invocation parameter values.

use std::collections::HashMap;

use clic_util::{extract_placeholder_names, substitute_placeholders};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{ParamType, ParamValue, ParameterSet};

/// Reports which flags the presentation layer saw explicitly set.
///
/// Keys are CLI flag names (see [`crate::Parameter::cli_flag_name`]). A flag
/// that was not set on the command line must yield `None`, even when the
/// presentation layer knows a default for it.
pub trait FlagSource {
    fn explicit_value(&self, flag_name: &str, param_type: ParamType) -> Option<ParamValue>;
}

/// A source with nothing set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFlags;

impl FlagSource for NoFlags {
    fn explicit_value(&self, _flag_name: &str, _param_type: ParamType) -> Option<ParamValue> {
        None
    }
}

impl FlagSource for HashMap<String, ParamValue> {
    fn explicit_value(&self, flag_name: &str, _param_type: ParamType) -> Option<ParamValue> {
        self.get(flag_name).cloned()
    }
}

impl FlagSource for IndexMap<String, ParamValue> {
    fn explicit_value(&self, flag_name: &str, _param_type: ParamType) -> Option<ParamValue> {
        self.get(flag_name).cloned()
    }
}

/// Parameter name to resolved value, in declaration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ResolvedValues {
    values: IndexMap<String, ParamValue>,
}

impl ResolvedValues {
    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ParamValue> {
        self.values.iter()
    }

    /// Replaces `{{params.<name>}}` tokens with stringified values. Tokens
    /// naming an unresolved parameter are kept as written.
    pub fn inject(&self, template: &str) -> String {
        substitute_placeholders(template, |name| self.values.get(name).map(ToString::to_string))
    }

    /// Placeholder names referenced by `template` that have no value here.
    pub fn unresolved(&self, template: &str) -> Vec<String> {
        extract_placeholder_names(template)
            .into_iter()
            .filter(|name| !self.values.contains_key(name))
            .collect()
    }

    pub fn inject_all(&self, templates: &[String]) -> Vec<String> {
        templates.iter().map(|template| self.inject(template)).collect()
    }

    /// JSON object holding the values of `parameters`, keyed by parameter name.
    pub fn json_object(&self, parameters: &ParameterSet) -> Map<String, Value> {
        parameters
            .iter()
            .filter_map(|parameter| {
                self.values
                    .get(&parameter.name)
                    .map(|value| (parameter.name.clone(), value.to_json()))
            })
            .collect()
    }
}

impl FromIterator<(String, ParamValue)> for ResolvedValues {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
