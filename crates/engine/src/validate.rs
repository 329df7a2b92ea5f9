//! Validation pipeline.
//!
//! Walks a resolved app top-down and returns a normalized copy, or the first
//! violation found. Nothing is mutated in place, so validating an already
//! validated app yields an equal app.

use std::collections::HashSet;

use clic_types::{App, Command, CommandBody, SpecError, SpecPolicy};
use tracing::debug;

pub fn validate_app(app: &App, policy: &SpecPolicy) -> Result<App, SpecError> {
    if app.name.trim().is_empty() {
        return Err(SpecError::InvalidApp("missing name".to_string()));
    }
    if policy.requires_description() && app.description.trim().is_empty() {
        return Err(SpecError::InvalidApp(format!("app '{}' missing description", app.name)));
    }

    let commands = validate_siblings(&app.commands, policy, &[])?;
    debug!(app = %app.name, commands = commands.len(), "validated app");

    Ok(App {
        name: app.name.clone(),
        description: app.description.clone(),
        commands,
    })
}

pub fn validate_command(command: &Command, policy: &SpecPolicy) -> Result<Command, SpecError> {
    validate_node(command, policy, &[])
}

fn validate_siblings(commands: &[Command], policy: &SpecPolicy, parent_path: &[&str]) -> Result<Vec<Command>, SpecError> {
    let mut seen = HashSet::new();
    let mut validated = Vec::with_capacity(commands.len());
    for command in commands {
        let command = validate_node(command, policy, parent_path)?;
        if !seen.insert(command.name.clone()) {
            return Err(SpecError::InvalidCommand(format!(
                "duplicate command '{}'",
                display_path(parent_path, &command.name)
            )));
        }
        validated.push(command);
    }
    Ok(validated)
}

fn validate_node(command: &Command, policy: &SpecPolicy, parent_path: &[&str]) -> Result<Command, SpecError> {
    let name = command.name.trim();
    if name.is_empty() {
        let location = if parent_path.is_empty() {
            String::new()
        } else {
            format!(" under '{}'", parent_path.join(" "))
        };
        return Err(SpecError::InvalidCommand(format!("command{location} missing name")));
    }
    let path = display_path(parent_path, name);
    if name.chars().any(char::is_whitespace) {
        return Err(SpecError::InvalidCommand(format!("command name '{path}' must not contain whitespace")));
    }
    if policy.requires_description() && command.description.trim().is_empty() {
        return Err(SpecError::InvalidCommand(format!("command '{path}' missing description")));
    }

    let body = match &command.body {
        CommandBody::Provider(provider) => CommandBody::Provider(provider.validate()?),
        CommandBody::Subcommands(children) if children.is_empty() => {
            return Err(SpecError::InvalidCommand(format!(
                "command '{path}' must declare either a provider or subcommands"
            )));
        }
        CommandBody::Subcommands(children) => {
            let mut child_path = parent_path.to_vec();
            child_path.push(name);
            CommandBody::Subcommands(validate_siblings(children, policy, &child_path)?)
        }
    };

    Ok(Command {
        name: name.to_string(),
        description: command.description.clone(),
        body,
    })
}

fn display_path(parent_path: &[&str], name: &str) -> String {
    parent_path.iter().copied().chain(std::iter::once(name)).collect::<Vec<_>>().join(" ")
}
