//! HTTP API against a game on a manual clock

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use crashline::api::ApiServer;
use crashline::config::ApiConfig;
use crashline::game::{ManualClock, ScriptedEntropy};
use crashline::{CrashGame, GameConfig, GameHandle};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(points: &[f64]) -> (Router, GameHandle, ManualClock) {
    let clock = ManualClock::new();
    let game = CrashGame::with_parts(
        &GameConfig::default(),
        Arc::new(clock.clone()),
        ScriptedEntropy::from_crash_points(points.iter().copied()),
    );
    let handle = GameHandle::new(game, 64);
    let app = ApiServer::new(ApiConfig::default(), handle.clone()).create_app();
    (app, handle, clock)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_round_and_request_id() {
    let (app, _game, _clock) = app(&[2.0]);

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let (_, body) = send(&app, get("/health")).await;
    assert_eq!(body["status"], "Running");
    assert_eq!(body["round_id"], 1);
    assert_eq!(body["phase"], "betting");
    assert!(body.get("halted").is_none());
}

#[tokio::test]
async fn test_wager_commands() {
    let (app, game, _clock) = app(&[2.0]);

    let (status, body) = send(&app, post("/wager", json!({ "amount": 50.0 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accepted"], true);
    assert_eq!(body["balance"], 950.0);
    assert_eq!(body["wager"]["amount"], 50.0);
    assert_eq!(body["wager"]["status"], "live");
    assert!(body.get("reason").is_none());

    let (_, body) = send(&app, post("/wager", json!({ "amount": 10.0 }))).await;
    assert_eq!(body["accepted"], false);
    assert!(body["reason"].as_str().unwrap().contains("already"));
    assert_eq!(body["balance"], 950.0);

    let (_, body) = send(&app, post("/wager/cancel", json!({}))).await;
    assert_eq!(body["accepted"], true);
    assert_eq!(body["balance"], 1000.0);
    assert!(body["wager"].is_null());

    let (_, body) = send(&app, get("/balance")).await;
    assert_eq!(body["balance"], 1000.0);
    assert_eq!(game.metrics().snapshot().rejections, 1);
}

#[tokio::test]
async fn test_cash_out_syncs_to_clock() {
    let (app, _game, clock) = app(&[5.0]);
    send(&app, post("/wager", json!({ "amount": 100.0 }))).await;

    // no tick runs in this test; the command brings the round up to date
    clock.advance_ms(5_000 + 2_000);
    let (_, state) = send(&app, get("/state")).await;
    assert_eq!(state["phase"], "betting");

    let (_, body) = send(&app, post("/cashout", json!({}))).await;
    assert_eq!(body["accepted"], true);
    assert_eq!(body["wager"]["status"], "cashed_out");
    let multiplier = body["wager"]["multiplier"].as_f64().unwrap();
    assert!(multiplier > 1.2 && multiplier < 1.25);

    let (_, player) = send(&app, get("/player")).await;
    assert!(player["potential_payout"].is_null());
    assert!((player["balance"].as_f64().unwrap() - (900.0 + 100.0 * multiplier)).abs() < 1e-9);

    let (_, state) = send(&app, get("/state")).await;
    assert_eq!(state["phase"], "running");
    assert!(state.get("crash_point").is_none());
}

#[tokio::test]
async fn test_malformed_wager_is_bad_request() {
    let (app, _game, _clock) = app(&[2.0]);

    let request = Request::builder()
        .method("POST")
        .uri("/wager")
        .header("content-type", "application/json")
        .header("x-request-id", "req-42")
        .body(Body::from("{\"amount\": \"lots\"}"))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["request_id"], "req-42");
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_history_and_metrics_endpoints() {
    let (app, game, clock) = app(&[1.0]);

    let (_, body) = send(&app, get("/history")).await;
    assert_eq!(body["history"], json!([]));

    clock.advance_ms(5_000);
    game.tick().unwrap();

    let (_, body) = send(&app, get("/history")).await;
    assert_eq!(body["history"], json!([1.0]));

    let (status, body) = send(&app, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rounds_started"], 1);
    assert_eq!(body["rounds_crashed"], 1);
}

#[tokio::test]
async fn test_halted_game_is_unavailable() {
    let (app, game, clock) = app(&[]);
    clock.advance_ms(5_000);
    assert!(game.tick().is_err());

    let (status, body) = send(&app, post("/wager", json!({ "amount": 10.0 }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");

    let (_, health) = send(&app, get("/health")).await;
    assert_eq!(health["status"], "Halted");
    assert!(health["halted"].as_str().unwrap().contains("exhausted"));
}
