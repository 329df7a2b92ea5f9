//! Schema policies for the two behaviors that are a deployment choice.

use serde::{Deserialize, Serialize};

/// Whether `description` is mandatory on apps and commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaMode {
    #[default]
    Strict,
    Permissive,
}

/// What to do with a command that has neither a provider nor subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyCommandPolicy {
    #[default]
    Reject,
    /// Bind the registered `noop` provider.
    Noop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecPolicy {
    pub schema_mode: SchemaMode,
    pub empty_command: EmptyCommandPolicy,
}

impl SpecPolicy {
    pub fn requires_description(&self) -> bool {
        self.schema_mode == SchemaMode::Strict
    }
}
