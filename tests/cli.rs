use std::fs;
use std::path::Path;

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn write_config(dir: &Path, api_key: &str) -> std::path::PathBuf {
    let path = dir.join("config.json");
    let body = json!({
        "apiKey": api_key,
        "logger": {
            "info": "\u{1b}[34m",
            "warn": "\u{1b}[33m",
            "error": "\u{1b}[31m"
        }
    });
    fs::write(&path, body.to_string()).expect("write config");
    path
}

fn shortify(config: &Path, api_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("shortify").expect("binary exists");
    cmd.env("SHORTIFY_CONFIG", config)
        .env("SHORTIFY_API_URL", api_url)
        .env_remove("SHORTENER_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn get_issues_one_request_and_prints_json() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(dir.path(), "K");
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1-get-short-url")
            .query_param("sid", "abc123")
            .header("x-api-key", "K");
        then.status(200).json_body(json!({
            "url": "https://google.com",
            "shortUrl": "https://sh.rt/abc123",
            "sid": "abc123",
            "expiry": "12h",
            "expireAt": "2024-01-01T12:00:00.000Z",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }));
    });

    shortify(&config, &server.base_url())
        .args(["get", "-s", "abc123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sid\": \"abc123\""));

    mock.assert();
}

#[test]
fn get_with_hyphenated_sid_is_rejected_offline() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(dir.path(), "K");

    // Nothing listens on port 9: a request would surface as exit code 3.
    shortify(&config, "http://127.0.0.1:9/")
        .args(["get", "-s", "abc-123"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("[ERROR]: Invalid short ID")
                .and(predicate::str::contains("shortify --help")),
        );
}

#[test]
fn environment_key_overrides_stored_key() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(dir.path(), "");
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1-delete-short-url")
            .query_param("sid", "abc123")
            .header("x-api-key", "from-env");
        then.status(200).json_body(json!({"isDeleted": true}));
    });

    shortify(&config, &server.base_url())
        .env("SHORTENER_API_KEY", "from-env")
        .args(["delete", "--sid", "abc123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"isDeleted\": true"));

    mock.assert();
}

#[test]
fn shorten_without_api_key_fails_before_sending() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(dir.path(), "");

    shortify(&config, "http://127.0.0.1:9/")
        .args(["https://google.com", "-e", "1d"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No API key configured"));
}

#[test]
fn config_and_logger_updates_merge() {
    let dir = TempDir::new().expect("temp dir");
    let config = dir.path().join("nested").join("config.json");

    shortify(&config, "http://127.0.0.1:9/")
        .args(["config", "--api-key", "K"])
        .assert()
        .success()
        .stdout(predicate::str::contains("API key has been updated successfully."));

    shortify(&config, "http://127.0.0.1:9/")
        .args(["logger", "--warn", "green"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Warn logger color updated"));

    let stored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config).expect("config written"))
            .expect("valid JSON");
    assert_eq!(stored["apiKey"], "K");
    assert_eq!(stored["logger"]["warn"], "\u{1b}[32m");
    assert_eq!(stored["logger"]["info"], "\u{1b}[34m");
}

#[test]
fn invalid_logger_color_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(dir.path(), "K");
    let before = fs::read_to_string(&config).expect("config");

    shortify(&config, "http://127.0.0.1:9/")
        .args(["logger", "--info", "not-a-color"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid color for Info logger"));

    assert_eq!(fs::read_to_string(&config).expect("config"), before);
}

#[test]
fn unknown_flag_gets_error_tag_and_hint() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(dir.path(), "K");

    shortify(&config, "http://127.0.0.1:9/")
        .args(["get", "--bogus"])
        .assert()
        .code(2)
        .stderr(
            predicate::str::contains("[ERROR]:")
                .and(predicate::str::contains("--bogus"))
                .and(predicate::str::contains("shortify --help")),
        );
}

#[test]
fn version_and_help_succeed() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(dir.path(), "K");

    shortify(&config, "http://127.0.0.1:9/")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));

    shortify(&config, "http://127.0.0.1:9/")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shorten your favorite URL"));
}
