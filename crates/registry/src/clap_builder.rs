use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand, parser::ValueSource, value_parser};
use clic_types::{App, Command, CommandBody, FlagSource, Invocation, InvocationError, ParamType, ParamValue, Parameter};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Builds a complete Clap command tree from a validated app.
///
/// The root command is named after the app. Command groups become subcommand
/// containers that require a subcommand; leaf commands get one long flag per
/// provider parameter.
///
/// # Examples
///
/// ```rust
/// use clic_engine::ProviderRegistry;
/// use clic_registry::{build_clap, load_app_from_bytes};
/// use clic_types::SpecPolicy;
///
/// let document = br#"{"name":"greeter","description":"d","commands":[
///     {"name":"hello","description":"say hello","exec":{"path":"echo"}}
/// ]}"#;
/// let app = load_app_from_bytes(document, &ProviderRegistry::with_defaults(), &SpecPolicy::default()).unwrap();
/// let clap_command = build_clap(&app);
/// assert_eq!(clap_command.get_name(), "greeter");
/// ```
pub fn build_clap(app: &App) -> ClapCommand {
    let mut root = ClapCommand::new(leak(&app.name))
        .about(app.description.clone())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .disable_help_subcommand(declares_help_command(&app.commands));

    for command in &app.commands {
        root = root.subcommand(build_command(command));
    }

    root
}

fn build_command(command: &Command) -> ClapCommand {
    let mut clap_command = ClapCommand::new(leak(&command.name)).about(command.description.clone());

    match &command.body {
        CommandBody::Subcommands(children) => {
            clap_command = clap_command
                .subcommand_required(true)
                .arg_required_else_help(true)
                .disable_help_subcommand(declares_help_command(children));
            for child in children {
                clap_command = clap_command.subcommand(build_command(child));
            }
        }
        CommandBody::Provider(provider) => {
            let parameters = provider.parameters();
            let declares_help_flag = parameters.iter().any(|parameter| parameter.cli_flag_name() == HELP);
            clap_command = clap_command.disable_help_flag(declares_help_flag);
            for parameter in &parameters {
                clap_command = clap_command.arg(build_flag_argument(parameter));
            }
        }
    }

    clap_command
}

/// Name clap reserves for its generated `--help` flag and `help` subcommand.
/// A declared command or parameter of that name takes precedence.
const HELP: &str = "help";

fn declares_help_command(commands: &[Command]) -> bool {
    commands.iter().any(|command| command.name == HELP)
}

/// Builds a single flag argument for a parameter.
///
/// Parameters were validated before the tree is built, so an unreadable type
/// falls back to a plain string flag.
fn build_flag_argument(parameter: &Parameter) -> Arg {
    let name = leak(&parameter.cli_flag_name());
    let mut arg = Arg::new(name).long(name).required(parameter.required);

    arg = match parameter.param_type().unwrap_or(ParamType::String) {
        ParamType::Bool => arg.action(ArgAction::SetTrue),
        ParamType::Int => arg.action(ArgAction::Set).value_parser(value_parser!(i64)),
        ParamType::Number => arg.action(ArgAction::Set).value_parser(value_parser!(f64)),
        ParamType::String => arg.action(ArgAction::Set),
    };

    arg = add_default_value(arg, parameter);
    arg.help(generate_help_text(parameter))
}

/// Shows a declared default in help output. Boolean flags are skipped since
/// `SetTrue` already defaults to false.
fn add_default_value(arg: Arg, parameter: &Parameter) -> Arg {
    match parameter.typed_default() {
        Ok(Some(ParamValue::Bool(_))) | Ok(None) | Err(_) => arg,
        Ok(Some(default)) => arg.default_value(leak(&default.to_string())),
    }
}

fn generate_help_text(parameter: &Parameter) -> String {
    if parameter.description.is_empty() {
        format!("type: {}", parameter.r#type)
    } else {
        parameter.description.clone()
    }
}

/// Leaks a string to satisfy the `'static` names clap builders require. The
/// tree is built once per process.
fn leak(value: &str) -> &'static str {
    Box::leak(value.to_string().into_boxed_str())
}

/// Reports flags the user actually typed. Values clap filled in from
/// defaults are not explicit.
pub struct ArgMatchesSource<'a> {
    matches: &'a ArgMatches,
}

impl<'a> ArgMatchesSource<'a> {
    pub fn new(matches: &'a ArgMatches) -> Self {
        Self { matches }
    }
}

impl FlagSource for ArgMatchesSource<'_> {
    fn explicit_value(&self, flag_name: &str, param_type: ParamType) -> Option<ParamValue> {
        if self.matches.value_source(flag_name) != Some(ValueSource::CommandLine) {
            return None;
        }
        match param_type {
            ParamType::Bool => self.matches.try_get_one::<bool>(flag_name).ok().flatten().copied().map(ParamValue::Bool),
            ParamType::Int => self.matches.try_get_one::<i64>(flag_name).ok().flatten().copied().map(ParamValue::Int),
            ParamType::Number => self.matches.try_get_one::<f64>(flag_name).ok().flatten().copied().map(ParamValue::Number),
            ParamType::String => self
                .matches
                .try_get_one::<String>(flag_name)
                .ok()
                .flatten()
                .cloned()
                .map(ParamValue::String),
        }
    }
}

/// A leaf command ready for an external invoker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedCommand {
    pub path: Vec<String>,
    pub invocation: Invocation,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no command given for '{0}'")]
    MissingSubcommand(String),
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("command '{path}': {source}")]
    Invocation { path: String, source: InvocationError },
}

/// Walks the matched subcommand chain down to a leaf, resolves its
/// parameters from the matched flags, and prepares the invocation.
pub fn prepare_from_matches(app: &App, matches: &ArgMatches) -> Result<PreparedCommand, DispatchError> {
    let mut commands = app.commands.as_slice();
    let mut current_matches = matches;
    let mut path: Vec<String> = Vec::new();

    loop {
        let Some((name, sub_matches)) = current_matches.subcommand() else {
            let location = if path.is_empty() { app.name.clone() } else { path.join(" ") };
            return Err(DispatchError::MissingSubcommand(location));
        };
        path.push(name.to_string());
        let command = commands
            .iter()
            .find(|command| command.name == name)
            .ok_or_else(|| DispatchError::UnknownCommand(path.join(" ")))?;

        match &command.body {
            CommandBody::Subcommands(children) => {
                commands = children;
                current_matches = sub_matches;
            }
            CommandBody::Provider(provider) => {
                debug!(command = %path.join(" "), provider = %provider.kind(), "preparing invocation");
                let invocation = provider
                    .resolve(&ArgMatchesSource::new(sub_matches))
                    .map_err(|source| DispatchError::Invocation {
                        path: path.join(" "),
                        source,
                    })?;
                return Ok(PreparedCommand { path, invocation });
            }
        }
    }
}
