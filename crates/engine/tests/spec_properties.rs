use std::{collections::HashMap, sync::Arc};

use clic_engine::{ProviderRegistry, assemble_app, decode_app, merge_apps, validate_app};
use clic_types::{
    App, ErrorKind, ExecInvocation, FlagSource, Invocation, InvocationError, MergeConflict, NoFlags, ParamType, ParamValue,
    ParameterSet, Provider, ResolvedValues, SpecError, SpecPolicy,
};
use serde_json::{Value, json};

fn decode(document: &str) -> Result<App, SpecError> {
    let policy = SpecPolicy::default();
    let app = decode_app(document.as_bytes(), &ProviderRegistry::with_defaults(), &policy)?;
    validate_app(&app, &policy)
}

fn load_fixture(name: &str) -> App {
    let document = match name {
        "yaml" => include_str!("data/greeter.yaml"),
        _ => include_str!("data/greeter.json"),
    };
    decode(document).expect("fixture is valid")
}

fn flags(pairs: &[(&str, ParamValue)]) -> HashMap<String, ParamValue> {
    pairs.iter().map(|(name, value)| (name.to_string(), value.clone())).collect()
}

#[test]
fn minimal_document_has_no_commands() {
    let app = decode(r#"{"name":"app","description":"d"}"#).unwrap();
    assert_eq!(app.name, "app");
    assert!(app.commands.is_empty());
}

#[test]
fn json_and_yaml_fixtures_resolve_to_the_same_app() {
    assert_eq!(load_fixture("json"), load_fixture("yaml"));
}

#[test]
fn validating_a_normalized_app_is_a_no_op() {
    let app = load_fixture("yaml");
    assert_eq!(validate_app(&app, &SpecPolicy::default()).unwrap(), app);
}

#[test]
fn serialized_app_decodes_back_to_itself() {
    let app = load_fixture("yaml");
    let serialized = serde_json::to_string(&app).unwrap();
    assert_eq!(decode(&serialized).unwrap(), app);
}

#[test]
fn provider_and_subcommands_together_are_rejected() {
    let error = decode(
        r#"{"name":"app","description":"d","commands":[
            {"name":"x","description":"d","exec":{"path":"ls"},"subcommands":[{"name":"y","description":"d","noop":{}}]}
        ]}"#,
    )
    .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidCommandSpec);
}

#[test]
fn command_with_neither_provider_nor_subcommands_is_rejected() {
    let error = decode(r#"{"name":"app","description":"d","commands":[{"name":"x","description":"d"}]}"#).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidCommandSpec);

    let error = decode(r#"{"name":"app","description":"d","commands":[{"name":"x","description":"d","subcommands":[]}]}"#)
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidCommandSpec);
}

#[test]
fn required_parameter_with_default_is_rejected() {
    for (param_type, default) in [("bool", "true"), ("int", "1"), ("number", "1.5"), ("string", "\"x\"")] {
        let document = format!(
            r#"{{"name":"app","description":"d","commands":[{{"name":"x","description":"d","exec":{{"path":"ls","params":[
                {{"name":"p","type":"{param_type}","required":true,"default":{default}}}
            ]}}}}]}}"#
        );
        let error = decode(&document).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidParameterSpec, "{param_type}");
    }
}

#[test]
fn int_default_decoded_as_float_resolves_to_integer() {
    let app = load_fixture("json");
    let hello = app.find_command(&["hello"]).and_then(|command| command.provider()).unwrap();
    let values = hello.parameters().resolve_values(&flags(&[("name", ParamValue::String("ada".into()))])).unwrap();
    assert_eq!(values.get("times"), Some(&ParamValue::Int(5)));
}

#[test]
fn string_default_on_int_parameter_is_rejected() {
    let error = decode(
        r#"{"name":"app","description":"d","commands":[{"name":"x","description":"d","exec":{"path":"ls","params":[
            {"name":"count","type":"int","default":"5"}
        ]}}]}"#,
    )
    .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidParameterSpec);
}

#[test]
fn exec_arguments_are_substituted() {
    let app = decode(
        r#"{"name":"app","description":"d","commands":[{"name":"say","description":"d","exec":{
            "path":"echo","args":["{{params.greeting}}"],"params":[{"name":"greeting","type":"string","required":true}]
        }}]}"#,
    )
    .unwrap();
    let provider = app.find_command(&["say"]).and_then(|command| command.provider()).unwrap();
    let invocation = provider.resolve(&flags(&[("greeting", ParamValue::String("hello".into()))])).unwrap();
    assert_eq!(
        invocation,
        Invocation::Exec(ExecInvocation {
            path: "echo".into(),
            args: vec!["hello".into()],
        })
    );
}

#[test]
fn resolution_never_mutates_the_tree() {
    let app = load_fixture("yaml");
    let before = app.clone();
    let hello = app.find_command(&["hello"]).and_then(|command| command.provider()).unwrap();

    let first = hello
        .resolve(&flags(&[("name", ParamValue::String("ada".into())), ("greeting", ParamValue::String("hi".into()))]))
        .unwrap();
    let second = hello.resolve(&flags(&[("name", ParamValue::String("bob".into()))])).unwrap();

    let Invocation::Exec(first) = first else { panic!("expected exec") };
    let Invocation::Exec(second) = second else { panic!("expected exec") };
    assert_eq!(first.args, vec!["hi", "ada"]);
    assert_eq!(second.args, vec!["hello", "bob"]);
    assert_eq!(app, before);
}

#[test]
fn missing_required_flag_fails_resolution() {
    let app = load_fixture("yaml");
    let hello = app.find_command(&["hello"]).and_then(|command| command.provider()).unwrap();
    assert!(matches!(hello.resolve(&NoFlags), Err(InvocationError::Resolve(_))));
}

#[test]
fn rest_and_lambda_fixture_commands_prepare_payloads() {
    let app = load_fixture("yaml");

    let api = app.find_command(&["api"]).and_then(|command| command.provider()).unwrap();
    let Invocation::Http(http) = api.resolve(&flags(&[("lang", ParamValue::String("fr".into()))])).unwrap() else {
        panic!("expected http invocation");
    };
    assert_eq!(http.method, "GET");
    assert_eq!(http.url, "https://api.example.com/greetings/fr?lang=fr");

    let greet = app.find_command(&["remote", "greet"]).and_then(|command| command.provider()).unwrap();
    let Invocation::Remote(remote) = greet.resolve(&flags(&[("dry-run", ParamValue::Bool(true))])).unwrap() else {
        panic!("expected remote invocation");
    };
    assert_eq!(Value::Object(remote.payload), json!({"dry_run": true}));
}

#[test]
fn fragments_declaring_the_same_command_conflict() {
    let policy = SpecPolicy::default();
    let registry = ProviderRegistry::with_defaults();
    let fragment = br#"{"name":"app","description":"d","commands":[{"name":"build","description":"d","noop":{}}]}"#;
    let first = decode_app(fragment, &registry, &policy).unwrap();
    let second = decode_app(fragment, &registry, &policy).unwrap();

    let error = merge_apps(vec![first, second]).unwrap_err();
    assert_eq!(error, SpecError::MergeConflict(MergeConflict::DuplicateCommand("build".into())));
    assert!(error.to_string().contains("build"));
}

#[test]
fn fragments_with_different_names_conflict() {
    let policy = SpecPolicy::default();
    let registry = ProviderRegistry::with_defaults();
    let app = decode_app(br#"{"name":"app","description":"d"}"#, &registry, &policy).unwrap();
    let tool = decode_app(b"name: tool\ndescription: d\n", &registry, &policy).unwrap();

    let error = assemble_app(vec![app, tool], &policy).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("'app'") && message.contains("'tool'"), "{message}");
}

#[test]
fn unknown_provider_key_is_named() {
    let error = decode(r#"{"name":"app","description":"d","commands":[{"name":"x","description":"d","unknown":{}}]}"#)
        .unwrap_err();
    assert!(matches!(error, SpecError::UnknownProvider { ref key, .. } if key == "unknown"));
}

#[test]
fn flag_names_round_trip_to_parameter_names() {
    let app = load_fixture("yaml");
    for path in app.leaf_paths() {
        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
        let provider = app.find_command(&segments).and_then(|command| command.provider()).unwrap();
        for parameter in &provider.parameters() {
            let flag = parameter.cli_flag_name();
            assert_eq!(provider.parameters().find_by_flag(&flag).map(|found| found.name.clone()), Some(parameter.name.clone()));
            assert_eq!(clic_util::from_flag_name(&flag), parameter.name);
        }
    }
}

#[test]
fn empty_input_is_its_own_error() {
    assert_eq!(decode("").unwrap_err(), SpecError::EmptyInput);
}

#[test]
fn malformed_input_is_a_decode_error() {
    let error = decode(r#"{"name":"app","#).unwrap_err();
    assert!(error.is_decode_error());
}

/// A provider registered from outside the engine.
#[derive(Debug)]
struct Echo {
    message: String,
}

impl Provider for Echo {
    fn kind(&self) -> &str {
        "echo"
    }

    fn parameters(&self) -> ParameterSet {
        ParameterSet::default()
    }

    fn validate(&self) -> Result<Arc<dyn Provider>, SpecError> {
        Ok(Arc::new(Echo {
            message: self.message.clone(),
        }))
    }

    fn to_spec_value(&self) -> Value {
        Value::String(self.message.clone())
    }

    fn prepare(&self, _values: &ResolvedValues) -> Result<Invocation, InvocationError> {
        Ok(Invocation::Noop)
    }
}

struct Explicit;

impl FlagSource for Explicit {
    fn explicit_value(&self, _flag_name: &str, param_type: ParamType) -> Option<ParamValue> {
        Some(param_type.zero_value())
    }
}

#[test]
fn custom_providers_plug_in_without_resolver_changes() {
    let mut registry = ProviderRegistry::with_defaults();
    registry
        .register("echo", |raw: &Value| {
            let message = raw.as_str().ok_or_else(|| SpecError::ProviderDecode {
                provider: "echo".into(),
                reason: "expected a string".into(),
            })?;
            Ok(Arc::new(Echo {
                message: message.to_string(),
            }) as Arc<dyn Provider>)
        })
        .unwrap();

    let policy = SpecPolicy::default();
    let document = br#"{"name":"app","description":"d","commands":[{"name":"x","description":"d","echo":"hi"}]}"#;
    let app = validate_app(&decode_app(document, &registry, &policy).unwrap(), &policy).unwrap();
    let provider = app.find_command(&["x"]).and_then(|command| command.provider()).unwrap();
    assert_eq!(provider.kind(), "echo");
    assert_eq!(provider.resolve(&Explicit).unwrap(), Invocation::Noop);

    let bad = br#"{"name":"app","description":"d","commands":[{"name":"x","description":"d","echo":5}]}"#;
    assert!(decode_app(bad, &registry, &policy).unwrap_err().is_decode_error());
}
