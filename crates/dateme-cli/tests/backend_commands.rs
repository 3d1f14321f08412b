//! Backend-facing commands run against a mocked Supabase project.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

const USER: &str = "0b1c2d3e-0000-4000-8000-000000000001";
const CONV: &str = "6f1c8a52-1f0e-4b8c-9a51-2f1f1d0b7a10";

/// A signed-in user with one conversation holding two messages.
async fn backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("apikey", "anon"))
        .and(header("Authorization", "Bearer jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": USER })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/conversations"))
        .and(query_param("user_id", format!("eq.{USER}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": CONV,
            "title": "Missing Alex...",
            "preview": "Distance is hard...",
            "user_preferences": {
                "name": "Sam", "partnerName": "Alex", "tone": "romantic",
                "mood": "Playful", "loveLanguage": "Quality Time"
            },
            "created_at": "2025-02-01T10:00:00Z",
            "updated_at": "2025-02-02T10:00:00Z"
        }])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/messages"))
        .and(query_param("conversation_id", format!("eq.{CONV}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "11111111-1111-4111-8111-111111111111",
                "content": "Hi there! How are you two doing?",
                "sender_type": "assistant",
                "image_url": null,
                "mood": "Playful",
                "created_at": "2025-02-01T10:00:00Z"
            },
            {
                "id": "22222222-2222-4222-8222-222222222222",
                "content": "Look at us",
                "sender_type": "user",
                "image_url": "https://img.example/us.jpg",
                "mood": "Playful",
                "created_at": "2025-02-01T10:01:00Z"
            }
        ])))
        .mount(&server)
        .await;

    server
}

/// A `dateme` invocation that only knows the Supabase settings.
fn dateme(dir: &TempDir, server: &MockServer) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("dateme").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("DATEME_OPENAI_KEY")
        .env_remove("RUST_LOG")
        .env("DATEME_SUPABASE_URL", server.uri())
        .env("DATEME_SUPABASE_KEY", "anon")
        .env("DATEME_ACCESS_TOKEN", "jwt");
    cmd
}

fn preferences_patch(preferences: serde_json::Value) -> MockBuilder {
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/conversations"))
        .and(query_param("id", format!("eq.{CONV}")))
        .and(header("Prefer", "return=minimal"))
        .and(body_partial_json(json!({ "user_preferences": preferences })))
}

#[tokio::test(flavor = "multi_thread")]
async fn conversations_renders_table() {
    let server = backend().await;
    let dir = TempDir::new().unwrap();

    dateme(&dir, &server)
        .arg("conversations")
        .assert()
        .success()
        .stdout(predicate::str::contains("Title"))
        .stdout(predicate::str::contains("Mood"))
        .stdout(predicate::str::contains(CONV))
        .stdout(predicate::str::contains("Missing Alex..."))
        .stdout(predicate::str::contains("Playful"))
        .stdout(predicate::str::contains("2025-02-02 10:00"));
}

#[tokio::test(flavor = "multi_thread")]
async fn history_prints_messages_in_order() {
    let server = backend().await;
    let dir = TempDir::new().unwrap();

    dateme(&dir, &server)
        .args(["history", "--conversation", CONV])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[2025-02-01 10:00] Dateme \u{1F604}: Hi there!",
        ))
        .stdout(predicate::str::contains("You \u{1F604}: Look at us"))
        .stdout(predicate::str::contains("    [image] https://img.example/us.jpg"));
}

#[tokio::test(flavor = "multi_thread")]
async fn mood_patches_preferences_without_openai_key() {
    let server = backend().await;
    preferences_patch(json!({ "mood": "Flirty", "partnerName": "Alex" }))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    dateme(&dir, &server)
        .args(["mood", "--conversation", CONV, "--mood", "Flirty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mood set to"))
        .stdout(predicate::str::contains("Flirty"));
}

#[tokio::test(flavor = "multi_thread")]
async fn mbti_patches_partner_type() {
    let server = backend().await;
    preferences_patch(json!({ "partnerMbtiType": "ISFJ", "mood": "Playful" }))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    dateme(&dir, &server)
        .args(["mbti", "--conversation", CONV, "--for", "partner", "--type", "isfj"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ISFJ"));
}

#[tokio::test(flavor = "multi_thread")]
async fn quiz_result_saved_to_conversation() {
    let server = backend().await;
    preferences_patch(json!({ "mbtiType": "INFP" }))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let answers = vec!["1"; 20].join(",");

    dateme(&dir, &server)
        .args(["quiz", "--answers", answers.as_str(), "--conversation", CONV])
        .assert()
        .success()
        .stdout(predicate::str::contains("Your personality type: INFP"))
        .stdout(predicate::str::contains(format!("Saved to conversation {CONV}.")));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_preference_write_shows_notice() {
    let server = backend().await;
    preferences_patch(json!({ "mood": "Serious" }))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    dateme(&dir, &server)
        .args(["mood", "--conversation", CONV, "--mood", "Serious"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Something went wrong while saving. Please try again.",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn expired_session_shows_sign_in_notice_for_chat() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(401).set_body_string("JWT expired"))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    dateme(&dir, &server)
        .env("DATEME_OPENAI_KEY", "sk-test")
        .args(["chat", "--message", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "You are not signed in. Please sign in again and retry.",
        ))
        .stderr(predicate::str::contains("JWT expired"));
}

#[tokio::test(flavor = "multi_thread")]
async fn expired_session_shows_sign_in_notice_for_mood() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    dateme(&dir, &server)
        .args(["mood", "--conversation", CONV, "--mood", "Romantic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sign in"));
}
