//! Spec merger: combines app fragments (e.g. one per file) into one app.
//!
//! All fragments must carry the same app name. Commands are unioned in
//! fragment order. Command groups declared by several fragments are merged
//! recursively; any other name collision at the same position is a conflict,
//! whichever order the fragments arrive in.

use std::collections::HashSet;

use clic_types::{App, Command, CommandBody, MergeConflict, SpecError};
use tracing::debug;

pub fn merge_apps(fragments: Vec<App>) -> Result<App, SpecError> {
    let mut fragments = fragments.into_iter();
    let Some(mut merged) = fragments.next() else {
        return Err(MergeConflict::NoFragments.into());
    };

    for fragment in fragments {
        if fragment.name != merged.name {
            return Err(MergeConflict::NameMismatch {
                expected: merged.name.clone(),
                found: fragment.name,
            }
            .into());
        }
        if merged.description.is_empty() {
            merged.description = fragment.description;
        }
        merge_commands(&mut merged.commands, fragment.commands, &[])?;
    }

    debug!(app = %merged.name, commands = merged.commands.len(), "merged app fragments");
    Ok(merged)
}

fn merge_commands(target: &mut Vec<Command>, incoming: Vec<Command>, parent_path: &[String]) -> Result<(), SpecError> {
    // A repeated name inside one fragment must not be folded into an earlier
    // fragment's group; it is rejected here as validation would reject it.
    let mut seen = HashSet::new();
    if let Some(duplicate) = incoming.iter().find(|command| !seen.insert(command.name.as_str())) {
        let mut path = parent_path.to_vec();
        path.push(duplicate.name.clone());
        return Err(SpecError::InvalidCommand(format!("duplicate command '{}'", path.join(" "))));
    }

    for command in incoming {
        let Some(existing) = target.iter_mut().find(|existing| existing.name == command.name) else {
            target.push(command);
            continue;
        };

        let mut path = parent_path.to_vec();
        path.push(command.name.clone());

        match (&mut existing.body, command.body) {
            (CommandBody::Subcommands(existing_children), CommandBody::Subcommands(children)) => {
                debug!(command = %path.join(" "), "merging command group");
                if existing.description.is_empty() {
                    existing.description = command.description;
                }
                merge_commands(existing_children, children, &path)?;
            }
            _ => return Err(MergeConflict::DuplicateCommand(path.join(" ")).into()),
        }
    }
    Ok(())
}
