//! End-to-end tests for the `valkey-demo` execute entrypoint.

use rstest::rstest;
use serde_json::{json, Value};

use valkey_demo::application::{execute, Action, ApplicationError, GlobalOptions};
use valkey_demo::domain::{DispatchError, Outcome};

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|s| s.to_string()).collect()
}

fn action(tokens: &[&str]) -> Action {
    match execute(&args(tokens)).expect("execute") {
        Outcome::Completed(action) => action,
        Outcome::Help(help) => panic!("unexpected help for {:?}: {}", tokens, help.path),
    }
}

fn json(tokens: &[&str]) -> Value {
    serde_json::from_str(&action(tokens).to_json().unwrap()).unwrap()
}

fn dispatch_error(tokens: &[&str]) -> DispatchError {
    match execute(&args(tokens)) {
        Err(ApplicationError::Dispatch(e)) => e,
        other => panic!("expected dispatch error for {:?}, got {:?}", tokens, other),
    }
}

#[test]
fn given_full_up_invocation_when_executing_then_emits_every_field() {
    // Act
    let value = json(&[
        "--region",
        "us-west-2",
        "--profile",
        "default",
        "--dry-run",
        "up",
        "--instance-type",
        "t3.micro",
        "--spot",
        "--ssm",
        "--run-id",
        "123",
    ]);

    // Assert
    assert_eq!(
        value,
        json!({
            "action": "up",
            "region": "us-west-2",
            "profile": "default",
            "dry_run": true,
            "instance_type": "t3.micro",
            "spot": true,
            "ssm": true,
            "run_id": "123"
        })
    );
}

#[test]
fn given_down_with_region_when_executing_then_other_globals_are_zero() {
    let value = json(&["--region", "us-east-1", "down"]);

    assert_eq!(
        value,
        json!({"action": "down", "region": "us-east-1", "profile": "", "dry_run": false})
    );
}

#[rstest]
#[case(&["up"], "up")]
#[case(&["down"], "down")]
#[case(&["list"], "list")]
#[case(&["--dry-run", "list"], "list")]
#[case(&["--profile=p", "up", "--instance-type=t3.small"], "up")]
fn given_subcommand_when_executing_then_action_matches(
    #[case] tokens: &[&str],
    #[case] expected: &str,
) {
    let action = action(tokens);

    assert_eq!(action.name(), expected);
    assert_eq!(json(tokens)["action"], expected);
}

#[test]
fn given_adjacent_bool_flags_when_executing_then_neither_consumes_the_other() {
    let action = action(&["up", "--spot", "--ssm"]);

    match action {
        Action::Up { spot, ssm, instance_type, .. } => {
            assert!(spot);
            assert!(ssm);
            assert_eq!(instance_type, "");
        }
        other => panic!("expected up, got {:?}", other),
    }
}

#[rstest]
#[case(&["--region", "eu-west-1", "--profile", "ops", "--dry-run", "down"])]
#[case(&["down", "--region", "eu-west-1", "--profile", "ops", "--dry-run"])]
#[case(&["--region=eu-west-1", "down", "--dry-run", "--profile=ops"])]
fn given_root_flags_before_or_after_subcommand_when_executing_then_honoured(
    #[case] tokens: &[&str],
) {
    let action = action(tokens);

    assert_eq!(
        action.globals(),
        &GlobalOptions {
            region: "eu-west-1".into(),
            profile: "ops".into(),
            dry_run: true,
        }
    );
}

#[test]
fn given_numeric_run_id_when_executing_then_kept_as_string() {
    let value = json(&["up", "--run-id", "123"]);

    assert_eq!(value["run_id"], Value::String("123".into()));
}

#[test]
fn given_bool_with_inline_literal_when_executing_then_parsed() {
    let value = json(&["--dry-run=false", "up", "--spot=true", "--ssm=0"]);

    assert_eq!(value["dry_run"], false);
    assert_eq!(value["spot"], true);
    assert_eq!(value["ssm"], false);
}

#[rstest]
#[case(&["deploy"], DispatchError::UnknownCommand("deploy".into()))]
#[case(&["--region", "eu", "Up"], DispatchError::UnknownCommand("Up".into()))]
#[case(&["up", "--bogus"], DispatchError::UnknownFlag("--bogus".into()))]
#[case(&["--bogus", "up"], DispatchError::UnknownFlag("--bogus".into()))]
#[case(&["down", "--spot"], DispatchError::UnknownFlag("--spot".into()))]
#[case(&["up", "--instance-type"], DispatchError::MissingFlagValue("instance-type".into()))]
#[case(&["up", "--region"], DispatchError::MissingFlagValue("region".into()))]
#[case(
    &["up", "--spot=maybe"],
    DispatchError::MalformedBooleanValue { flag: "spot".into(), value: "maybe".into() }
)]
#[case(&[], DispatchError::MissingCommand("valkey-demo".into()))]
#[case(&["--region", "eu"], DispatchError::MissingCommand("valkey-demo".into()))]
fn given_invalid_invocation_when_executing_then_fails_without_payload(
    #[case] tokens: &[&str],
    #[case] expected: DispatchError,
) {
    assert_eq!(dispatch_error(tokens), expected);
}

#[test]
fn given_value_flag_followed_by_dash_token_when_executing_then_token_is_the_value() {
    let value = json(&["up", "--run-id", "--spot"]);

    assert_eq!(value["run_id"], "--spot");
    assert_eq!(value["spot"], false);
}

#[rstest]
#[case(&["--help"], "valkey-demo")]
#[case(&["-h", "bogus", "--nope"], "valkey-demo")]
#[case(&["up", "--help"], "valkey-demo up")]
#[case(&["--region", "eu", "down", "--bogus", "-h"], "valkey-demo down")]
#[case(&["up", "--instance-type", "-h"], "valkey-demo up")]
#[case(&["--region", "-h"], "valkey-demo")]
fn given_help_token_anywhere_when_executing_then_help_wins(
    #[case] tokens: &[&str],
    #[case] expected_path: &str,
) {
    match execute(&args(tokens)).expect("help never fails") {
        Outcome::Help(help) => assert_eq!(help.path, expected_path),
        Outcome::Completed(action) => panic!("handler ran: {:?}", action),
    }
}

#[test]
fn given_root_help_when_rendering_then_lists_subcommands() {
    let Outcome::Help(help) = execute(&args(&["--help"])).unwrap() else {
        panic!("expected help");
    };

    let names: Vec<_> = help.commands.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["up", "down", "list"]);
    assert!(help.to_string().contains("Launch an EC2 demo host"));
    assert!(help.usage().ends_with("<command>"));
}

#[test]
fn given_parallel_callers_when_executing_then_results_are_independent() {
    let results: Vec<Action> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                scope.spawn(move || {
                    let region = format!("region-{}", i);
                    let run_id = i.to_string();
                    action(&["--region", region.as_str(), "up", "--run-id", run_id.as_str()])
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (i, action) in results.iter().enumerate() {
        let value: Value = serde_json::from_str(&action.to_json().unwrap()).unwrap();
        assert_eq!(value["region"], format!("region-{}", i));
        assert_eq!(value["run_id"], i.to_string());
    }
}
