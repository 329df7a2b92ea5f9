//! # Command Resolution
//!
//! Turns a generic decoded tree (maps and sequences only) into typed
//! [`App`]/[`Command`] values. Command documents carry no explicit type tag:
//! the resolver infers what each node is from which keys it carries besides
//! `name` and `description`.
//!
//! - `subcommands` makes the node an interior node; its children are resolved
//!   recursively.
//! - Otherwise exactly one remaining key must name a registered provider, and
//!   the value under that key is handed to the provider's constructor.
//! - A node with no remaining keys is handled per [`EmptyCommandPolicy`].
//!
//! Resolution only shapes the tree; invariants such as name uniqueness are
//! enforced afterwards by [`crate::validate`].

use clic_types::{App, Command, CommandBody, EmptyCommandPolicy, SpecError, SpecPolicy};
use serde_json::{Map, Value};
use tracing::debug;

use crate::provider::ProviderRegistry;

const NAME_KEY: &str = "name";
const DESCRIPTION_KEY: &str = "description";
const COMMANDS_KEY: &str = "commands";
const SUBCOMMANDS_KEY: &str = "subcommands";
const NOOP_PROVIDER: &str = "noop";

/// Resolves a decoded app document.
///
/// Top-level keys other than `name`, `description` and `commands` are ignored.
pub fn resolve_app(raw: &Value, registry: &ProviderRegistry, policy: &SpecPolicy) -> Result<App, SpecError> {
    let document = as_mapping(raw, "app document")?;
    let name = metadata_field(document, NAME_KEY, "app")?;
    let description = metadata_field(document, DESCRIPTION_KEY, "app")?;

    for key in document.keys().filter(|key| ![NAME_KEY, DESCRIPTION_KEY, COMMANDS_KEY].contains(&key.as_str())) {
        debug!(app = %name, key = %key, "ignoring unrecognised app key");
    }

    let commands = match document.get(COMMANDS_KEY) {
        None | Some(Value::Null) => Vec::new(),
        Some(raw_commands) => resolve_commands(raw_commands, registry, policy, &format!("app '{name}' commands"))?,
    };

    Ok(App {
        name,
        description,
        commands,
    })
}

/// Resolves one command node and, recursively, its subcommands.
pub fn resolve_command(raw: &Value, registry: &ProviderRegistry, policy: &SpecPolicy) -> Result<Command, SpecError> {
    let node = as_mapping(raw, "command")?;
    let name = metadata_field(node, NAME_KEY, "command")?;
    let description = metadata_field(node, DESCRIPTION_KEY, "command")?;

    let remaining: Vec<&String> = node
        .keys()
        .filter(|key| key.as_str() != NAME_KEY && key.as_str() != DESCRIPTION_KEY)
        .collect();

    let body = if remaining.is_empty() {
        resolve_empty_command(&name, registry, policy)?
    } else if let Some(raw_children) = node.get(SUBCOMMANDS_KEY) {
        resolve_subcommands(&name, &remaining, raw_children, registry, policy)?
    } else {
        resolve_provider(&name, &remaining, node, registry)?
    };

    Ok(Command { name, description, body })
}

fn resolve_empty_command(name: &str, registry: &ProviderRegistry, policy: &SpecPolicy) -> Result<CommandBody, SpecError> {
    match policy.empty_command {
        EmptyCommandPolicy::Reject => Err(SpecError::InvalidCommand(format!(
            "command '{name}' must declare either a provider or subcommands"
        ))),
        EmptyCommandPolicy::Noop => {
            debug!(command = %name, "binding noop provider to empty command");
            let provider = registry.construct(NOOP_PROVIDER, &Value::Null).ok_or_else(|| {
                SpecError::InvalidCommand(format!(
                    "command '{name}' is empty and no '{NOOP_PROVIDER}' provider is registered"
                ))
            })??;
            Ok(CommandBody::Provider(provider))
        }
    }
}

fn resolve_subcommands(
    name: &str,
    remaining: &[&String],
    raw_children: &Value,
    registry: &ProviderRegistry,
    policy: &SpecPolicy,
) -> Result<CommandBody, SpecError> {
    if let Some(extra) = remaining.iter().find(|key| key.as_str() != SUBCOMMANDS_KEY) {
        if registry.is_registered(extra) {
            return Err(SpecError::InvalidCommand(format!(
                "command '{name}' declares both subcommands and a '{extra}' provider"
            )));
        }
        return Err(SpecError::UnknownProvider {
            command: name.to_string(),
            key: extra.to_string(),
        });
    }

    let children = match raw_children {
        Value::Null => Vec::new(),
        other => resolve_commands(other, registry, policy, &format!("command '{name}' subcommands"))?,
    };
    debug!(command = %name, subcommands = children.len(), "resolved command group");
    Ok(CommandBody::Subcommands(children))
}

fn resolve_provider(
    name: &str,
    remaining: &[&String],
    node: &Map<String, Value>,
    registry: &ProviderRegistry,
) -> Result<CommandBody, SpecError> {
    if let Some(unknown) = remaining.iter().find(|key| !registry.is_registered(key)) {
        return Err(SpecError::UnknownProvider {
            command: name.to_string(),
            key: unknown.to_string(),
        });
    }
    if remaining.len() > 1 {
        return Err(SpecError::AmbiguousProvider {
            command: name.to_string(),
            providers: remaining.iter().map(|key| key.to_string()).collect(),
        });
    }

    let kind = remaining[0].as_str();
    let raw_provider = node.get(kind).unwrap_or(&Value::Null);
    let provider = registry.construct(kind, raw_provider).ok_or_else(|| SpecError::UnknownProvider {
        command: name.to_string(),
        key: kind.to_string(),
    })??;
    debug!(command = %name, provider = %kind, "resolved provider");
    Ok(CommandBody::Provider(provider))
}

fn resolve_commands(
    raw: &Value,
    registry: &ProviderRegistry,
    policy: &SpecPolicy,
    context: &str,
) -> Result<Vec<Command>, SpecError> {
    let Value::Array(items) = raw else {
        return Err(SpecError::Decode(format!("{context} must be a sequence")));
    };
    items.iter().map(|item| resolve_command(item, registry, policy)).collect()
}

fn as_mapping<'a>(raw: &'a Value, what: &str) -> Result<&'a Map<String, Value>, SpecError> {
    raw.as_object()
        .ok_or_else(|| SpecError::Decode(format!("{what} must be a mapping, found {}", kind_of(raw))))
}

/// Reads an optional string metadata field; absent or null reads as empty.
fn metadata_field(node: &Map<String, Value>, key: &str, owner: &str) -> Result<String, SpecError> {
    match node.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(SpecError::Decode(format!(
            "{owner} field '{key}' must be a string, found {}",
            kind_of(other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
