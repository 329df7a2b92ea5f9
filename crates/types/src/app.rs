//! The resolved app model: an app owns a tree of commands, each of which is
//! either an interior node with subcommands or a leaf bound to one provider.

use std::sync::Arc;

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::Provider;

/// Root specification of one CLI application.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct App {
    pub name: String,
    pub description: String,
    pub commands: Vec<Command>,
}

/// A named node in the command tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: String,
    pub description: String,
    pub body: CommandBody,
}

/// What a command does: run a provider, or group subcommands.
#[derive(Debug, Clone)]
pub enum CommandBody {
    Provider(Arc<dyn Provider>),
    Subcommands(Vec<Command>),
}

impl PartialEq for CommandBody {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Provider(left), Self::Provider(right)) => **left == **right,
            (Self::Subcommands(left), Self::Subcommands(right)) => left == right,
            _ => false,
        }
    }
}

impl App {
    pub fn new(name: impl Into<String>, description: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            commands,
        }
    }

    /// Finds a command by its name path from the root, e.g. `["db", "migrate"]`.
    pub fn find_command(&self, path: &[&str]) -> Option<&Command> {
        let (first, rest) = path.split_first()?;
        let mut current = self.commands.iter().find(|command| command.name == *first)?;
        for segment in rest {
            current = current.subcommands()?.iter().find(|command| command.name == *segment)?;
        }
        Some(current)
    }

    /// Name paths of every leaf command, depth first in declaration order.
    pub fn leaf_paths(&self) -> Vec<Vec<String>> {
        let mut paths = Vec::new();
        for command in &self.commands {
            collect_leaf_paths(command, &mut Vec::new(), &mut paths);
        }
        paths
    }
}

fn collect_leaf_paths(command: &Command, prefix: &mut Vec<String>, paths: &mut Vec<Vec<String>>) {
    prefix.push(command.name.clone());
    match &command.body {
        CommandBody::Provider(_) => paths.push(prefix.clone()),
        CommandBody::Subcommands(children) => {
            for child in children {
                collect_leaf_paths(child, prefix, paths);
            }
        }
    }
    prefix.pop();
}

impl Command {
    pub fn leaf(name: impl Into<String>, description: impl Into<String>, provider: Arc<dyn Provider>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            body: CommandBody::Provider(provider),
        }
    }

    pub fn group(name: impl Into<String>, description: impl Into<String>, subcommands: Vec<Command>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            body: CommandBody::Subcommands(subcommands),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.body, CommandBody::Provider(_))
    }

    pub fn provider(&self) -> Option<&Arc<dyn Provider>> {
        match &self.body {
            CommandBody::Provider(provider) => Some(provider),
            CommandBody::Subcommands(_) => None,
        }
    }

    pub fn subcommands(&self) -> Option<&[Command]> {
        match &self.body {
            CommandBody::Provider(_) => None,
            CommandBody::Subcommands(children) => Some(children),
        }
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("description", &self.description)?;
        match &self.body {
            CommandBody::Provider(provider) => map.serialize_entry(provider.kind(), &provider.to_spec_value())?,
            CommandBody::Subcommands(children) => map.serialize_entry("subcommands", children)?,
        }
        map.end()
    }
}
