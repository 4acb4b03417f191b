use api::{routes::routes, state::AppState};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use db::test_utils::setup_test_db;
use serde_json::Value;
use services::clock::{Clock, MockClock};
use std::sync::Arc;
use tower::ServiceExt;

/// Monday 10 November 2025, 09:30 UTC.
pub fn class_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 10, 9, 30, 0).unwrap()
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub clock: Arc<MockClock>,
}

impl TestApp {
    pub fn advance(&self, minutes: i64) {
        self.clock.advance(Duration::minutes(minutes));
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}

/// App over a fresh in-memory database, with the clock parked at the start
/// of the Monday lecture.
pub async fn make_test_app() -> TestApp {
    let db = setup_test_db().await;
    let clock = Arc::new(MockClock::new(class_start()));
    let state = AppState::new(db, clock.clone() as Arc<dyn Clock>);
    let app = Router::new().nest("/api", routes(state.clone()));

    TestApp { app, state, clock }
}
