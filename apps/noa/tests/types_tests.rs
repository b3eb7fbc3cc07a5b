//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use noa::api::{
    AnswerRequest, AnswerResponse, CatalogResponse, DeleteResponse, HealthResponse, LogResponse,
    StartRequest, StartResponse, StateResponse, SummaryJson,
};
use noa_core::{
    Author, CompletionSummary, MessageId, SequencerState, StageId, TriageMessage, TriageStage,
    primitives::{MAX_ANSWER_LENGTH, MAX_SESSION_ID_LENGTH},
};

fn sample_message() -> TriageMessage {
    TriageMessage {
        id: MessageId(1),
        author: Author::Noa,
        content: "Como você se chama?".to_string(),
        timestamp: chrono::DateTime::UNIX_EPOCH,
        stage_id: StageId::new("acolhimento"),
    }
}

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn health_response_round_trip() {
    let json = r#"{"status":"healthy","version":"1.0.0"}"#;
    let health: HealthResponse = serde_json::from_str(json).unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, "1.0.0");
}

// =============================================================================
// START REQUEST TESTS
// =============================================================================

#[test]
fn start_request_deserialization() {
    let json = r#"{"session_id":"sessao-1"}"#;
    let request: StartRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.session_id, "sessao-1");
}

#[test]
fn start_request_valid_id() {
    let request = StartRequest {
        session_id: "  sessao-1  ".to_string(),
    };
    let id = request.to_session_id().unwrap();
    assert_eq!(id.as_str(), "sessao-1");
}

#[test]
fn start_request_empty_id_is_rejected() {
    let request = StartRequest {
        session_id: "   ".to_string(),
    };
    assert!(request.to_session_id().is_err());
}

#[test]
fn start_request_oversized_id_is_rejected() {
    let request = StartRequest {
        session_id: "x".repeat(MAX_SESSION_ID_LENGTH + 1),
    };
    assert!(request.to_session_id().is_err());
}

// =============================================================================
// START RESPONSE TESTS
// =============================================================================

#[test]
fn start_response_success_serialization() {
    let response =
        StartResponse::success(sample_message(), SequencerState::InStage { index: 0 }, 0);

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"success\":true"));
    assert!(json.contains("\"author\":\"noa\""));
    assert!(json.contains("\"phase\":\"in_stage\""));
    assert!(json.contains("\"index\":0"));
    assert!(json.contains("\"progress\":0"));
}

#[test]
fn start_response_error_has_no_message() {
    let response = StartResponse::error("Start failed: session already exists: x");
    assert!(!response.success);
    assert!(response.message.is_none());
    assert!(response.error.is_some());
}

// =============================================================================
// ANSWER REQUEST TESTS
// =============================================================================

#[test]
fn answer_request_empty_text_is_allowed() {
    let request = AnswerRequest {
        text: String::new(),
    };
    assert!(request.validate().is_ok());
}

#[test]
fn answer_request_oversized_text_is_rejected() {
    let request = AnswerRequest {
        text: "a".repeat(MAX_ANSWER_LENGTH + 1),
    };
    assert!(request.validate().is_err());
}

// =============================================================================
// ANSWER RESPONSE TESTS
// =============================================================================

#[test]
fn answer_response_success_serialization() {
    let response = AnswerResponse::success(
        vec![sample_message()],
        SequencerState::AwaitingConsent { index: 1 },
        25,
        None,
    );

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"phase\":\"awaiting_consent\""));
    assert!(json.contains("\"progress\":25"));
    // Absent summaries are omitted from the wire entirely.
    assert!(!json.contains("\"summary\""));
}

#[test]
fn answer_response_with_summary() {
    let summary = CompletionSummary {
        stages_traversed: 3,
        message_count: 6,
        started_at: chrono::DateTime::UNIX_EPOCH,
        completed_at: chrono::DateTime::UNIX_EPOCH + chrono::Duration::seconds(83),
    };
    let response = AnswerResponse::success(
        vec![],
        SequencerState::Completed,
        100,
        Some(SummaryJson::new(&summary, "• Queixas: dor\n".to_string())),
    );

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"phase\":\"completed\""));
    assert!(json.contains("\"stages_traversed\":3"));
    assert!(json.contains("\"elapsed_seconds\":83"));
    assert!(json.contains("\"elapsed\":\"01:23\""));
    assert!(json.contains("• Queixas: dor"));
}

#[test]
fn answer_response_round_trips_summary() {
    let json = r#"{
        "success": true,
        "messages": [],
        "state": {"phase": "completed"},
        "progress": 100,
        "summary": {
            "stages_traversed": 5,
            "message_count": 12,
            "elapsed_seconds": 61,
            "elapsed": "01:01",
            "narrative": "• Acolhimento: Maria\n"
        },
        "error": null
    }"#;
    let response: AnswerResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.state, Some(SequencerState::Completed));
    let summary = response.summary.unwrap();
    assert_eq!(summary.stages_traversed, 5);
    assert_eq!(summary.elapsed, "01:01");
}

// =============================================================================
// STATE / LOG / DELETE RESPONSE TESTS
// =============================================================================

#[test]
fn state_response_serialization() {
    let response = StateResponse::success(SequencerState::Cancelled, 40);
    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"phase\":\"cancelled\""));
    assert!(json.contains("\"progress\":40"));
}

#[test]
fn log_response_carries_messages_in_order() {
    let mut second = sample_message();
    second.id = MessageId(2);
    second.author = Author::Paciente;
    second.content = "Maria".to_string();

    let response = LogResponse::success(vec![sample_message(), second]);
    let json = serde_json::to_string(&response).unwrap();
    let parsed: LogResponse = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.messages.len(), 2);
    assert_eq!(parsed.messages[0].id, MessageId(1));
    assert_eq!(parsed.messages[1].author, Author::Paciente);
}

#[test]
fn delete_response_shapes() {
    let ok = DeleteResponse::success(6);
    assert_eq!(ok.messages_recorded, Some(6));

    let err = DeleteResponse::error("Discard failed: unknown session: x");
    assert!(!err.success);
    assert!(err.messages_recorded.is_none());
}

// =============================================================================
// CATALOG RESPONSE TESTS
// =============================================================================

#[test]
fn catalog_response_counts_stages() {
    let stages = vec![
        TriageStage::new("acolhimento", "Acolhimento", "Olá!"),
        TriageStage::new("queixas", "Queixas", "O que trouxe você aqui?"),
    ];
    let response = CatalogResponse::success(stages);
    assert_eq!(response.stage_count, 2);

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"requires_consent\":false"));
    assert!(json.contains("\"id\":\"acolhimento\""));
}
