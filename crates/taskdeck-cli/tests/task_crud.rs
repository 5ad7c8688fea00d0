//! Integration tests for task CRUD against a mock task API.


use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fixtures::{seed_credential, task_json};

/// List renders every task with id, state, and priority.
#[tokio::test]
async fn test_list_renders_tasks() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();
    seed_credential(&home, "tok1");

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            task_json(1, "Buy milk", false, "low"),
            task_json(2, "File taxes", true, "high"),
        ])))
        .mount(&server)
        .await;

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args(["tasks", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Buy milk"))
        .stdout(predicate::str::contains("File taxes"))
        .stdout(predicate::str::contains("[x]"))
        .stdout(predicate::str::contains("2 tasks, 1 completed"));
}

/// `--json` emits the raw list for scripting.
#[tokio::test]
async fn test_list_json_output() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();
    seed_credential(&home, "tok1");

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([task_json(1, "Buy milk", false, "low")])),
        )
        .mount(&server)
        .await;

    let output = cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args(["tasks", "list", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed[0]["id"], serde_json::json!(1));
    assert_eq!(parsed[0]["title"], serde_json::json!("Buy milk"));
}

/// Task commands without a credential redirect to sign-in and never hit
/// the network.
#[tokio::test]
async fn test_protected_route_requires_sign_in() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&server)
        .await;

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args(["tasks", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

/// Add posts the draft and reports the server-assigned id.
#[tokio::test]
async fn test_add_creates_task() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();
    seed_credential(&home, "tok1");

    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(header("authorization", "Bearer tok1"))
        .and(body_json(serde_json::json!({
            "title": "Buy milk",
            "description": "two liters",
            "completed": false,
            "priority": "medium",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 3,
            "title": "Buy milk",
            "description": "two liters",
            "completed": false,
            "priority": "medium",
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args([
            "tasks",
            "add",
            "--title",
            "Buy milk",
            "--description",
            "two liters",
            "--priority",
            "medium",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created task 3."));
}

/// Adding with an empty title and description sends no request at all.
#[tokio::test]
async fn test_add_blank_sends_no_request() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();
    seed_credential(&home, "tok1");

    Mock::given(method("POST"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args(["tasks", "add", "--title", "   ", "--description", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to save"));
}

/// Edit merges the given fields into the current task and PUTs the full
/// payload.
#[tokio::test]
async fn test_edit_merges_fields() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();
    seed_credential(&home, "tok1");

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            serde_json::json!({
                "id": 2,
                "title": "File taxes",
                "description": "before April",
                "completed": false,
                "priority": "low",
            }),
        ])))
        .mount(&server)
        .await;

    // Unspecified fields keep their current values.
    Mock::given(method("PUT"))
        .and(path("/tasks/2"))
        .and(body_json(serde_json::json!({
            "title": "File taxes",
            "description": "before April",
            "completed": false,
            "priority": "high",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 2,
            "title": "File taxes",
            "description": "before April",
            "completed": false,
            "priority": "high",
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args(["tasks", "edit", "2", "--priority", "high"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated task 2."))
        .stdout(predicate::str::contains("high"));
}

/// Done is an edit that flips the completed flag.
#[tokio::test]
async fn test_done_marks_completed() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();
    seed_credential(&home, "tok1");

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([task_json(1, "Buy milk", false, "low")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/tasks/1"))
        .and(body_json(serde_json::json!({
            "title": "Buy milk",
            "description": "",
            "completed": true,
            "priority": "low",
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(task_json(1, "Buy milk", true, "low")),
        )
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args(["tasks", "done", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x]"));
}

/// Editing an id that does not exist fails before any PUT goes out.
#[tokio::test]
async fn test_edit_unknown_id_fails() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();
    seed_credential(&home, "tok1");

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args(["tasks", "edit", "42", "--title", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task 42 not found."));
}

/// Delete issues the DELETE and reports the removal.
#[tokio::test]
async fn test_rm_deletes_task() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();
    seed_credential(&home, "tok1");

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([task_json(5, "Old chore", false, "low")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/tasks/5"))
        .and(header("authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args(["tasks", "rm", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted task 5."));
}

/// A 401 on a task operation clears the credential and redirects to
/// sign-in; the response body is discarded.
#[tokio::test]
async fn test_401_clears_credential_and_redirects() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();
    seed_credential(&home, "stale-tok");

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"message": "token expired"})),
        )
        .mount(&server)
        .await;

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args(["tasks", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session expired"));

    assert!(fixtures::credential_contents(&home).is_none());
}

/// Other HTTP failures report the server message and leave the credential
/// in place for a manual retry.
#[tokio::test]
async fn test_server_error_preserves_credential() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();
    seed_credential(&home, "tok1");

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({"message": "boom"})),
        )
        .mount(&server)
        .await;

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args(["tasks", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("boom"));

    let stored = fixtures::credential_contents(&home).unwrap();
    assert!(stored.contains("tok1"));
}

/// An unknown priority is rejected before anything is dispatched.
#[tokio::test]
async fn test_unknown_priority_rejected() {
    let server = MockServer::start().await;
    let home = tempdir().unwrap();
    seed_credential(&home, "tok1");

    Mock::given(method("POST"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    cargo_bin_cmd!("taskdeck")
        .env("TASKDECK_HOME", home.path())
        .env("TASKDECK_BASE_URL", server.uri())
        .args(["tasks", "add", "--title", "x", "--priority", "urgent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown priority"));
}
