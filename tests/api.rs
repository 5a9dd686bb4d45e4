//! HTTP behavior of the lifecycle, event and poll routes over the in-memory store.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use matchday_back::{
    build_router,
    config::AppConfig,
    dao::{
        event_store::{EventStore, MemoryEventStore},
        models::ParticipantEntity,
    },
    services::notification_service::NotificationDispatcher,
    state::{AppState, SharedState, clock::FixedClock},
};
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime, macros::datetime};
use tower::ServiceExt;
use uuid::Uuid;

const CREATED_AT: OffsetDateTime = datetime!(2026-10-18 09:00 UTC);

struct TestApp {
    state: SharedState,
    store: MemoryEventStore,
    clock: Arc<FixedClock>,
}

impl TestApp {
    async fn new() -> Self {
        let clock = Arc::new(FixedClock::new(CREATED_AT));
        let state = AppState::with_clock(
            AppConfig::default(),
            NotificationDispatcher::disabled(),
            clock.clone(),
        );
        let store = MemoryEventStore::new();
        state.set_event_store(Arc::new(store.clone())).await;
        Self {
            state,
            store,
            clock,
        }
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = build_router(self.state.clone())
            .oneshot(request)
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn create_event(&self) -> Value {
        let (status, body) = self
            .send(
                "POST",
                "/events",
                Some(json!({
                    "name": "Sunday league",
                    "date": "2026-10-18",
                    "start_time": "19:30",
                    "duration_minutes": 90
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    async fn participant(&self, event_id: Uuid, user_id: Option<Uuid>) -> Uuid {
        let participant = ParticipantEntity {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            display_name: "player".into(),
        };
        self.store.insert_participant(participant.clone()).await;
        participant.id
    }
}

fn uuid_field(value: &Value, field: &str) -> Uuid {
    value[field]
        .as_str()
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .expect("uuid field")
}

#[tokio::test]
async fn healthcheck_reports_ok_with_a_store() {
    let app = TestApp::new().await;
    let (status, body) = app.send("GET", "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn created_event_is_readable_by_code() {
    let app = TestApp::new().await;
    let created = app.create_event().await;
    let code = created["code"].as_str().expect("code");
    assert_eq!(code.len(), 6);

    let (status, body) = app.send("GET", &format!("/events/{code}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["windows"]["poll_opens_at"], "2026-10-18T21:10:00Z");
}

#[tokio::test]
async fn invalid_event_payload_is_rejected() {
    let app = TestApp::new().await;
    let (status, _) = app
        .send(
            "POST",
            "/events",
            Some(json!({ "name": "", "duration_minutes": 90 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn full_poll_cycle_over_http() {
    let app = TestApp::new().await;
    let created = app.create_event().await;
    let code = created["code"].as_str().expect("code").to_owned();
    let event_id = uuid_field(&created, "id");
    let user_id = Uuid::new_v4();
    let voter = app.participant(event_id, None).await;
    let star = app.participant(event_id, Some(user_id)).await;

    // Nothing exists before the poll window.
    let (status, _) = app
        .send("GET", &format!("/events/{code}/award-poll"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.clock.set(datetime!(2026-10-18 21:15 UTC));
    let (status, tick) = app.send("POST", "/lifecycle/tick", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tick["finished"], 1);

    let (status, poll) = app
        .send("GET", &format!("/events/{code}/award-poll"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(poll["accepting_votes"], true);
    let poll_id = uuid_field(&poll, "id");

    let (status, _) = app
        .send(
            "POST",
            &format!("/award-polls/{poll_id}/votes"),
            Some(json!({
                "voter_participant_id": voter,
                "target_participant_id": star
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            "POST",
            &format!("/award-polls/{poll_id}/votes"),
            Some(json!({
                "voter_participant_id": Uuid::new_v4(),
                "target_participant_id": star
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Reading after the close finalizes lazily without a tick.
    app.clock.set(datetime!(2026-10-18 21:41 UTC));
    let (status, poll) = app
        .send("GET", &format!("/events/{code}/award-poll"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(poll["finalized"], true);
    assert_eq!(poll["winner_participant_id"], json!(star));

    let (status, _) = app
        .send(
            "POST",
            &format!("/award-polls/{poll_id}/votes"),
            Some(json!({
                "voter_participant_id": voter,
                "target_participant_id": star
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, award) = app
        .send("GET", &format!("/users/{user_id}/award"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(award["count"], 1);
    assert_eq!(award["level"], 1);

    // Reads repeated after finalization never count the win twice.
    app.send("GET", &format!("/events/{code}/award-poll"), None)
        .await;
    let (_, award) = app
        .send("GET", &format!("/users/{user_id}/award"), None)
        .await;
    assert_eq!(award["count"], 1);

    app.clock.advance(Duration::hours(2));
    let (status, tick) = app.send("GET", "/lifecycle/tick", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tick["resets"], 1);

    let (_, event) = app.send("GET", &format!("/events/{code}"), None).await;
    assert_eq!(event["status"], "open");
    assert_eq!(event["id"], created["id"]);
    assert!(event["windows"].is_null());

    // Recycling the roster leaves earned awards in place.
    let (status, award) = app
        .send("GET", &format!("/users/{user_id}/award"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(award["count"], 1);
    assert_eq!(award["level"], 1);
}

#[tokio::test]
async fn reschedule_is_refused_once_finished() {
    let app = TestApp::new().await;
    let created = app.create_event().await;
    let code = created["code"].as_str().expect("code").to_owned();

    let (status, body) = app
        .send(
            "PUT",
            &format!("/events/{code}/schedule"),
            Some(json!({ "date": "2026-10-18", "start_time": "20:00" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["start_time"], "20:00");

    app.clock.set(datetime!(2026-10-18 21:35 UTC));
    app.send("POST", "/lifecycle/tick", None).await;

    let (status, _) = app
        .send(
            "PUT",
            &format!("/events/{code}/schedule"),
            Some(json!({ "date": "2026-10-25", "start_time": "20:00" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_award_is_not_found() {
    let app = TestApp::new().await;
    let (status, _) = app
        .send("GET", &format!("/users/{}/award", Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn subscription_is_stored() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            "POST",
            "/subscriptions",
            Some(json!({ "endpoint": "https://push.example/device-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["endpoint"], "https://push.example/device-1");
    assert_eq!(app.store.list_subscriptions().await.expect("list").len(), 1);
}

#[tokio::test]
async fn degraded_mode_answers_service_unavailable() {
    let app = TestApp::new().await;
    app.state.clear_event_store().await;

    let (status, _) = app.send("POST", "/lifecycle/tick", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = app.send("GET", "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
}
