//! HTTP client behaviour against a mock campaign API.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use urbansoccer_client::{ClientConfig, HttpCampaignClient, SetupError};
use urbansoccer_core::backend::{CampaignBackend, SpeechSynthesizer};
use urbansoccer_core::error::ClientError;
use urbansoccer_core::turn::GameResult;
use urbansoccer_test_support::StaticIdentity;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpCampaignClient {
    HttpCampaignClient::new(
        ClientConfig::new(server.uri()),
        Arc::new(StaticIdentity::signed_in()),
    )
    .unwrap()
}

fn turn_body() -> serde_json::Value {
    json!({
        "narration": "Kickoff!",
        "availableCards": [
            {"actionId": "pass", "label": "Pass"},
            {"actionId": "shoot", "label": "Shoot", "description": "Go for goal"}
        ],
        "gameState": {"score": 0, "opponentScore": 0}
    })
}

#[tokio::test]
async fn test_start_session_fetches_first_turn_with_bearer_token() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns/c1/start"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(turn_body()))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    // Act
    let payload = client.start_session("c1").await.unwrap();

    // Assert
    assert_eq!(payload.narration, "Kickoff!");
    assert_eq!(payload.available_cards.len(), 2);
    assert_eq!(payload.available_cards[1].action_id, "shoot");
    assert!(!payload.is_game_over);
}

#[tokio::test]
async fn test_every_request_carries_a_request_id() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns/c1/resume"))
        .respond_with(ResponseTemplate::new(200).set_body_json(turn_body()))
        .mount(&server)
        .await;
    let client = client_for(&server);

    // Act
    client.resume_session("c1").await.unwrap();
    client.resume_session("c1").await.unwrap();

    // Assert
    let requests = server.received_requests().await.unwrap();
    let ids: Vec<Uuid> = requests
        .iter()
        .map(|r| {
            let raw = r.headers.get("x-request-id").unwrap().to_str().unwrap();
            Uuid::parse_str(raw).unwrap()
        })
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_resume_tolerates_null_fields() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns/c1/resume"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "narration": null,
            "availableCards": null,
            "gameState": null
        })))
        .mount(&server)
        .await;

    // Act
    let payload = client_for(&server).resume_session("c1").await.unwrap();

    // Assert
    assert!(payload.narration.is_empty());
    assert!(payload.available_cards.is_empty());
    assert!(!payload.is_coherent());
}

#[tokio::test]
async fn test_submit_action_posts_action_id() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/campaigns/c1/play"))
        .and(body_json(json!({"actionId": "shoot"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "narration": "Goal! Final whistle.",
            "availableCards": [],
            "isGameOver": true,
            "result": "win"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Act
    let payload = client_for(&server)
        .submit_action("c1", "shoot")
        .await
        .unwrap();

    // Assert
    assert!(payload.is_game_over);
    assert_eq!(payload.result, Some(GameResult::Win));
}

#[tokio::test]
async fn test_reset_session_posts_to_reset_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/campaigns/c1/reset"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).reset_session("c1").await;

    assert_eq!(result, Ok(()));
}

#[tokio::test]
async fn test_base_url_path_prefix_is_preserved() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/campaigns/c1/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(turn_body()))
        .expect(1)
        .mount(&server)
        .await;
    let client = HttpCampaignClient::new(
        ClientConfig::new(format!("{}/api/", server.uri())),
        Arc::new(StaticIdentity::signed_in()),
    )
    .unwrap();

    // Act
    let result = client.start_session("c1").await;

    // Assert
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_signed_out_requests_carry_no_authorization_header() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns/c1/start"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Not authenticated"})),
        )
        .mount(&server)
        .await;
    let client = HttpCampaignClient::new(
        ClientConfig::new(server.uri()),
        Arc::new(StaticIdentity::signed_out()),
    )
    .unwrap();

    // Act
    let result = client.start_session("c1").await;

    // Assert
    assert_eq!(result, Err(ClientError::Unauthorized));
    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_not_found_carries_server_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns/gone/resume"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Campaign not found"})),
        )
        .mount(&server)
        .await;

    let result = client_for(&server).resume_session("gone").await;

    assert_eq!(
        result,
        Err(ClientError::NotFound("Campaign not found".to_owned()))
    );
}

#[tokio::test]
async fn test_bad_request_is_an_invalid_action() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/campaigns/c1/play"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Card already played"})),
        )
        .mount(&server)
        .await;

    let result = client_for(&server).submit_action("c1", "pass").await;

    assert_eq!(
        result,
        Err(ClientError::InvalidAction {
            detail: Some("Card already played".to_owned()),
        })
    );
}

#[tokio::test]
async fn test_bad_request_on_start_is_unknown_with_server_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns/c1/start"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Campaign is archived"})),
        )
        .mount(&server)
        .await;

    let result = client_for(&server).start_session("c1").await;

    assert_eq!(
        result,
        Err(ClientError::Unknown {
            status: Some(400),
            detail: Some("Campaign is archived".to_owned()),
        })
    );
}

#[tokio::test]
async fn test_validation_errors_are_rendered_field_by_field() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/campaigns/c1/play"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [
                {"loc": ["body", "actionId"], "msg": "field required", "type": "missing"}
            ]
        })))
        .mount(&server)
        .await;

    // Act
    let result = client_for(&server).submit_action("c1", "").await;

    // Assert
    assert_eq!(
        result,
        Err(ClientError::Unknown {
            status: Some(422),
            detail: Some("actionId: field required".to_owned()),
        })
    );
}

#[tokio::test]
async fn test_server_error_without_body_gets_generic_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns/c1/start"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client_for(&server).start_session("c1").await;

    let error = result.unwrap_err();
    assert_eq!(error.user_message(), "Internal server error.");
    assert!(error.is_retryable());
}

#[tokio::test]
async fn test_malformed_success_body_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns/c1/start"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client_for(&server).start_session("c1").await;

    assert!(matches!(result, Err(ClientError::Unknown { status: None, .. })));
}

#[tokio::test]
async fn test_slow_backend_times_out_as_connectivity() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns/c1/start"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(turn_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let config = ClientConfig {
        api_timeout: Duration::from_millis(100),
        ..ClientConfig::new(server.uri())
    };
    let client = HttpCampaignClient::new(config, Arc::new(StaticIdentity::signed_in())).unwrap();

    // Act
    let result = client.start_session("c1").await;

    // Assert
    assert_eq!(
        result,
        Err(ClientError::Connectivity("request timed out".to_owned()))
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_connectivity() {
    let client = HttpCampaignClient::new(
        ClientConfig::new("http://127.0.0.1:9"),
        Arc::new(StaticIdentity::signed_in()),
    )
    .unwrap();

    let result = client.start_session("c1").await;

    assert!(matches!(result, Err(ClientError::Connectivity(_))));
}

#[tokio::test]
async fn test_synthesize_speech_returns_audio_bytes_and_mime() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/narration/speak"))
        .and(body_json(json!({"text": "Kickoff!"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(vec![0xFF, 0xFB, 0x90, 0x00]),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Act
    let clip = client_for(&server)
        .synthesize_speech("Kickoff!")
        .await
        .unwrap();

    // Assert
    assert_eq!(clip.data.as_ref(), &[0xFF, 0xFB, 0x90, 0x00]);
    assert_eq!(clip.content_type.as_deref(), Some("audio/mpeg"));
    assert!(clip.is_playable());
}

#[tokio::test]
async fn test_speech_uses_its_own_timeout() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/narration/speak"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(vec![1, 2, 3])
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let config = ClientConfig {
        speech_timeout: Duration::from_millis(100),
        ..ClientConfig::new(server.uri())
    };
    let client = HttpCampaignClient::new(config, Arc::new(StaticIdentity::signed_in())).unwrap();

    // Act
    let result = client.synthesize_speech("Kickoff!").await;

    // Assert
    assert!(matches!(result, Err(ClientError::Connectivity(_))));
}

#[test]
fn test_rejects_unparseable_base_url() {
    let result = HttpCampaignClient::new(
        ClientConfig::new("not a url"),
        Arc::new(StaticIdentity::signed_in()),
    );

    assert!(matches!(result, Err(SetupError::InvalidUrl { .. })));
}

#[test]
fn test_rejects_base_url_that_cannot_carry_a_path() {
    let result = HttpCampaignClient::new(
        ClientConfig::new("mailto:coach@example.com"),
        Arc::new(StaticIdentity::signed_in()),
    );

    assert!(matches!(result, Err(SetupError::InvalidUrl { .. })));
}
