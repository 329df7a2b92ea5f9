//! `{{params.<name>}}` placeholder scanning and substitution.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{params\.([^{}\s]+)\}\}").expect("placeholder pattern is valid"));

/// Renders the placeholder token referencing `parameter_name`.
pub fn placeholder_for(parameter_name: &str) -> String {
    format!("{{{{params.{parameter_name}}}}}")
}

/// Lists the parameter names referenced by a template, in first-seen order.
pub fn extract_placeholder_names(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for captures in PLACEHOLDER_PATTERN.captures_iter(template) {
        let name = &captures[1];
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Replaces every placeholder for which `lookup` yields a value.
///
/// Placeholders whose name `lookup` does not know are left verbatim.
pub fn substitute_placeholders<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    PLACEHOLDER_PATTERN
        .replace_all(template, |captures: &Captures| lookup(&captures[1]).unwrap_or_else(|| captures[0].to_string()))
        .into_owned()
}
