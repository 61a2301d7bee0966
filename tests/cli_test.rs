//! Tests for the process driver: streams and exit codes.

use std::ffi::OsString;

use serde_json::Value;

use valkey_demo::cli::{collect_args, run, run_os};
use valkey_demo::exitcode;
use valkey_demo::util::testing;

fn invoke(tokens: &[&str]) -> (i32, String, String) {
    testing::init_test_setup();
    let args: Vec<String> = tokens.iter().map(|s| s.to_string()).collect();
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = run(&args, &mut out, &mut err);
    (
        code,
        String::from_utf8(out).expect("utf8 stdout"),
        String::from_utf8(err).expect("utf8 stderr"),
    )
}

#[test]
fn given_valid_invocation_when_running_then_prints_one_json_line() {
    let (code, out, err) = invoke(&["--region", "us-east-1", "list"]);

    assert_eq!(code, exitcode::OK);
    assert!(err.is_empty());
    assert_eq!(out.lines().count(), 1);
    let value: Value = serde_json::from_str(out.trim_end()).unwrap();
    assert_eq!(value["action"], "list");
    assert_eq!(value["region"], "us-east-1");
}

#[test]
fn given_unknown_command_when_running_then_exit_one_with_message() {
    let (code, out, err) = invoke(&["deploy"]);

    assert_eq!(code, exitcode::FAILURE);
    assert!(out.is_empty());
    assert!(err.contains("unknown command: deploy"), "stderr: {}", err);
}

#[test]
fn given_missing_flag_value_when_running_then_exit_one() {
    let (code, out, err) = invoke(&["up", "--instance-type"]);

    assert_eq!(code, 1);
    assert!(out.is_empty());
    assert!(err.contains("instance-type"), "stderr: {}", err);
}

#[test]
fn given_help_with_malformed_flags_when_running_then_help_and_exit_zero() {
    let (code, out, err) = invoke(&["up", "--spot=maybe", "--help"]);

    assert_eq!(code, exitcode::OK);
    assert!(err.is_empty());
    assert!(out.contains("valkey-demo up - Launch an EC2 demo host"));
    assert!(out.contains("--instance-type string"));
    assert!(out.contains("--dry-run"));
}

#[test]
fn given_utf8_os_args_when_running_then_dispatches_normally() {
    let raw = ["--region", "eu-west-1", "down"].map(OsString::from);
    let mut out = Vec::new();
    let mut err = Vec::new();

    let code = run_os(raw, &mut out, &mut err);

    assert_eq!(code, exitcode::OK);
    assert!(err.is_empty());
    assert!(String::from_utf8(out).unwrap().contains(r#""region":"eu-west-1""#));
}

#[cfg(unix)]
#[test]
fn given_non_utf8_argument_when_running_then_rejected_with_exit_one() {
    use std::os::unix::ffi::OsStringExt;

    // Arrange: a region value that is not valid UTF-8
    let raw = vec![
        OsString::from("--region"),
        OsString::from_vec(vec![0x65, 0x75, 0xff]),
        OsString::from("down"),
    ];
    let mut out = Vec::new();
    let mut err = Vec::new();

    // Act
    let code = run_os(raw.clone(), &mut out, &mut err);

    // Assert
    assert_eq!(code, exitcode::FAILURE);
    assert!(out.is_empty(), "no payload for rejected arguments");
    let err = String::from_utf8(err).unwrap();
    assert!(err.contains("not valid UTF-8"), "stderr: {}", err);
    assert!(collect_args(raw).is_err());
}
