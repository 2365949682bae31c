//! HTTP integration tests for the Wayfare assistant API.
//!
//! Everything runs against the in-memory collaborators, so no database is
//! needed. Full dialogue flows go through the inner functions; endpoint
//! dispatch (routing, extractors, headers) goes through axum `oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wayfare_core::models::Flight;
use wayfare_core::WayfareConfig;
use wayfare_server::http::{
    build_router, chat_inner, confirm_payment_inner, health_inner, seats_inner, ChatRequest,
    ConfirmPaymentRequest, SeatsRequest, USER_HEADER,
};
use wayfare_server::state::AppState;

fn config() -> WayfareConfig {
    serde_json::from_value(json!({
        "service": {"socket_path": "/tmp/wayfare-it.sock", "log_level": "info"},
        "database": {"url": "postgresql://localhost/wayfare", "max_connections": 1},
        "storage": {"backend": "memory"}
    }))
    .unwrap()
}

fn flights() -> Vec<Flight> {
    serde_json::from_value(json!([
        {
            "id": "f-6e201", "airline": "IndiGo", "flightNumber": "6E201",
            "departureCity": "Chennai", "departureCityCode": "MAA",
            "arrivalCity": "Delhi", "arrivalCityCode": "DEL",
            "departureTime": "06:15", "arrivalTime": "09:05", "price": 4500.0,
            "seats": {"economy": 180, "business": 12, "first": null},
            "aircraft": {"make": "Airbus", "model": "A320"}
        },
        {
            "id": "f-ai540", "airline": "Air India", "flightNumber": "AI540",
            "departureCity": "Chennai", "departureCityCode": "MAA",
            "arrivalCity": "Delhi", "arrivalCityCode": "DEL",
            "departureTime": "19:30", "arrivalTime": "22:20", "price": 6100.0
        }
    ]))
    .unwrap()
}

fn state() -> Arc<AppState> {
    Arc::new(AppState::in_memory(config(), flights()))
}

async fn chat(state: &AppState, session: &str, message: &str, user: Option<&str>) -> Value {
    let (status, body) = chat_inner(
        state,
        ChatRequest {
            message: Some(message.to_string()),
            session_id: Some(session.to_string()),
        },
        user.map(str::to_string),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "chat {:?} failed: {}", message, body);
    body
}

/// Walk one passenger through to an auto-assigned seat.
async fn book_one(state: &AppState, session: &str) -> Value {
    for msg in [
        "Flights from Chennai to Delhi tomorrow",
        "1",
        "1",
        "Rahul Sharma",
        "34",
        "male",
        "window front",
    ] {
        chat(state, session, msg, None).await;
    }
    chat(state, session, "auto", None).await
}

async fn send(app: axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn post(uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
}

// ===========================================================================
// Endpoint dispatch
// ===========================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = health_inner(&state()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["flights"], "memory");
    assert_eq!(body["socket"], "/tmp/wayfare-it.sock");
}

#[tokio::test]
async fn test_version_endpoint() {
    let req = Request::builder()
        .method("GET")
        .uri("/version")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(build_router(state()), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["protocol"], "wayfare/1");
}

#[tokio::test]
async fn test_chat_endpoint_returns_reply() {
    let payload = json!({"message": "Flights from Chennai to Delhi", "sessionId": "web-1"});
    let req = post("/assistant/chat")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = send(build_router(state()), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], "web-1");
    assert_eq!(body["resultsCount"], 2);
    assert!(body["reply"].as_str().unwrap().contains("IndiGo 6E201"));
}

#[tokio::test]
async fn test_chat_endpoint_missing_message_is_400() {
    let payload = json!({"sessionId": "web-1"});
    let req = post("/assistant/chat")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = send(build_router(state()), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "message is required");
}

#[tokio::test]
async fn test_seats_endpoint_unknown_session_is_404() {
    let payload = json!({"sessionId": "ghost", "seats": ["E1A"]});
    let req = post("/assistant/seats")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, _) = send(build_router(state()), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ===========================================================================
// Dialogue flows
// ===========================================================================

#[tokio::test]
async fn test_full_booking_with_authenticated_user() {
    let state = state();
    let assigned = book_one(&state, "s-auth").await;
    assert_eq!(assigned["bookingDraft"]["selectedSeats"], json!(["E1A"]));
    assert_eq!(assigned["bookingDraft"]["totalAmount"], 4500.0);

    let confirmed = chat(&state, "s-auth", "confirm", Some("user-42")).await;
    assert_eq!(confirmed["navigateTo"]["path"], "/payment");
    assert_eq!(confirmed["bookingDraft"]["readyForPayment"], true);
    assert!(confirmed["bookingDraft"]["bookingId"].is_string());

    let (status, body) = confirm_payment_inner(
        &state,
        ConfirmPaymentRequest {
            session_id: Some("s-auth".to_string()),
            payment_result: Some(json!({"ref": "pay-1"})),
        },
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["booking"]["paymentStatus"], "Paid");
    assert_eq!(body["booking"]["id"], confirmed["bookingDraft"]["bookingId"]);
    assert!(state.engine.sessions().get("s-auth").await.is_none());
}

#[tokio::test]
async fn test_payment_without_identity_is_401() {
    let state = state();
    book_one(&state, "s-anon").await;
    let confirmed = chat(&state, "s-anon", "yes", None).await;
    assert!(confirmed["bookingDraft"]["bookingId"].is_null());

    let app = build_router(state.clone());
    let payload = json!({"sessionId": "s-anon", "paymentResult": {"ref": "pay-2"}});
    let req = post("/assistant/confirm-payment")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, _) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = post("/assistant/confirm-payment")
        .header(USER_HEADER, "user-9")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["userId"], "user-9");
}

#[tokio::test]
async fn test_manual_seat_submission() {
    let state = state();
    for msg in [
        "Flights from Chennai to Delhi",
        "2",
        "1",
        "Asha Rao",
        "29",
        "female",
        "aisle",
        "manual",
    ] {
        chat(&state, "s-manual", msg, None).await;
    }
    let opened = chat(&state, "s-manual", "choose seats", None).await;
    assert_eq!(opened["navigateTo"]["path"], "/seat-booking");
    assert_eq!(opened["navigateTo"]["state"]["allowManualSelect"], true);

    let (status, body) = seats_inner(
        &state,
        SeatsRequest {
            session_id: Some("s-manual".to_string()),
            seats: vec!["e7c".to_string()],
        },
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["bookingDraft"]["selectedSeats"], json!(["E7C"]));
    assert_eq!(body["bookingDraft"]["stage"], "seat_assignment");

    let (status, _) = seats_inner(
        &state,
        SeatsRequest {
            session_id: Some("s-manual".to_string()),
            seats: vec!["E7C".to_string(), "E7D".to_string()],
        },
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_without_ready_draft_is_400() {
    let state = state();
    chat(&state, "s-early", "hello", None).await;
    let (status, _) = confirm_payment_inner(
        &state,
        ConfirmPaymentRequest {
            session_id: Some("s-early".to_string()),
            payment_result: None,
        },
        Some("user-1".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
