//! Tests for registration with the background welcome clip.

mod common;

use std::sync::Arc;

use acima::audio::{AudioDeliveryService, PlaybackOutcome};
use acima::flow::register_and_welcome;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{client_for, fast_audio_config, Behavior, MockPlayer};

fn registered(ok: bool) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "ok": ok,
        "child": {"id": 7, "nome": "Ana", "ano": 2, "email_responsavel": "ana@x.com"}
    }))
}

#[tokio::test]
async fn accepted_registration_starts_welcome_clip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(registered(true))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/audio/Ana.mp3"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let cache = TempDir::new().unwrap();
    let client = client_for(&server.uri());
    let player = Arc::new(MockPlayer::new());
    let audio = AudioDeliveryService::new(client.clone(), player.clone(), &fast_audio_config(cache.path()));

    let registration = register_and_welcome(&client, &audio, "Ana", "2º Ano", "ana@x.com")
        .await
        .unwrap();

    assert!(registration.accepted());
    let outcome = registration.welcome.expect("welcome clip").await.unwrap();
    let expected = format!("{}/audio/Ana.mp3", server.uri());
    assert!(matches!(outcome, PlaybackOutcome::Streamed { ref url } if url.as_str() == expected));
}

#[tokio::test]
async fn rejected_registration_plays_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(registered(false))
        .mount(&server)
        .await;

    let cache = TempDir::new().unwrap();
    let client = client_for(&server.uri());
    let player = Arc::new(MockPlayer::new());
    let audio = AudioDeliveryService::new(client.clone(), player.clone(), &fast_audio_config(cache.path()));

    let registration = register_and_welcome(&client, &audio, "Ana", "2º Ano", "ana@x.com")
        .await
        .unwrap();

    assert!(!registration.accepted());
    assert!(registration.welcome.is_none());
    assert!(player.played().is_empty());
}

#[tokio::test]
async fn backend_rejection_is_returned_and_no_clip_starts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"detail": "email inválido"})))
        .mount(&server)
        .await;

    let cache = TempDir::new().unwrap();
    let client = client_for(&server.uri());
    let player = Arc::new(MockPlayer::new());
    let audio = AudioDeliveryService::new(client.clone(), player.clone(), &fast_audio_config(cache.path()));

    let err = register_and_welcome(&client, &audio, "Ana", "2º Ano", "x")
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(422));
    assert_eq!(err.message(), "email inválido");
    assert!(player.played().is_empty());
}

#[tokio::test]
async fn welcome_clip_failure_does_not_affect_registration() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(registered(true))
        .mount(&server)
        .await;

    let cache = TempDir::new().unwrap();
    let client = client_for(&server.uri());
    let player = Arc::new(MockPlayer::new().always(Behavior::FailStart));
    let audio = AudioDeliveryService::new(client.clone(), player.clone(), &fast_audio_config(cache.path()));

    let registration = register_and_welcome(&client, &audio, "Ana", "2º Ano", "ana@x.com")
        .await
        .unwrap();

    assert_eq!(registration.response.child.as_ref().map(|c| c.id), Some(7));
    let outcome = registration.welcome.expect("welcome clip").await.unwrap();
    assert!(!outcome.is_playing());
}
