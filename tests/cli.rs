use std::process::{Command, Output};

use serde_json::Value;

fn rustytok(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rustytok"))
        .args(args)
        .env_remove("RAPIDAPI_KEY")
        .env_remove("RUST_LOG")
        .env("RUSTYTOK_ENDPOINT", "http://127.0.0.1:9/index")
        .output()
        .expect("failed to run rustytok")
}

fn error_line(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let last = stderr.lines().last().expect("stderr is empty");
    let json: Value = serde_json::from_str(last).expect("last stderr line is not JSON");
    json["error"].as_str().expect("missing error field").to_string()
}

#[test]
fn no_arguments_is_an_error() {
    let output = rustytok(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(error_line(&output).contains("missing URL"));
}

#[test]
fn non_http_argument_is_rejected() {
    let output = rustytok(&["tiktok.com/@user/video/123"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(error_line(&output).contains("invalid URL"));
}

#[test]
fn unknown_media_kind_is_rejected() {
    let output = rustytok(&["https://www.tiktok.com/@user/video/123", "gif"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(error_line(&output).contains("unknown media kind"));
}

#[test]
fn missing_api_key_is_rejected() {
    let output = rustytok(&["https://www.tiktok.com/@user/video/123", "audio"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(error_line(&output).contains("API key"));
}

#[test]
fn unknown_flag_is_reported_as_json() {
    let output = rustytok(&["--bogus"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(error_line(&output).contains("--bogus"));
}
