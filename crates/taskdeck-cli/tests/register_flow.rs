//! Integration tests for account registration.


use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A valid registration posts the camelCase payload and routes to sign-in.
#[tokio::test]
async fn test_register_success_routes_to_sign_in() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/sign-up"))
        .and(body_json(serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": "difference",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args([
            "register",
            "--first-name",
            "Ada",
            "--last-name",
            "Lovelace",
            "--email",
            "ada@example.com",
            "--password",
            "difference",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Please sign in"));

    // Registration alone grants no session.
    assert!(fixtures::credential_contents(&home).is_none());
}

/// Validation failures are caught client-side; no request is sent.
#[tokio::test]
async fn test_register_validation_blocks_dispatch() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/sign-up"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args([
            "register",
            "--first-name",
            "Al",
            "--email",
            "not-an-email",
            "--password",
            "short",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("First name must be at least 3"))
        .stderr(predicate::str::contains("Email address is not valid"))
        .stderr(predicate::str::contains("Password must be at least 8"));
}

/// The last name is optional and may be omitted entirely.
#[tokio::test]
async fn test_register_without_last_name() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/sign-up"))
        .and(body_json(serde_json::json!({
            "firstName": "Ada",
            "lastName": "",
            "email": "ada@example.com",
            "password": "difference",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args([
            "register",
            "--first-name",
            "Ada",
            "--email",
            "ada@example.com",
            "--password",
            "difference",
        ])
        .assert()
        .success();
}

/// Server rejections surface the server-provided message.
#[tokio::test]
async fn test_register_surfaces_server_message() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/sign-up"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(serde_json::json!({"message": "email already registered"})),
        )
        .mount(&server)
        .await;

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args([
            "register",
            "--first-name",
            "Ada",
            "--email",
            "ada@example.com",
            "--password",
            "difference",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("email already registered"));
}
