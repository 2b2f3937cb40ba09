//! Record-replay round trip for the remote strategy.
//!
//! 1. Drive the remote repository through a recording transport whose inner
//!    transport plays the server.
//! 2. Replay the written cassette and assert identical outputs.
//! 3. Replay a second time and assert determinism.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, TimeZone, Utc};

use taskdeck::adapters::memory::{FixedClock, ScriptedTransport};
use taskdeck::adapters::recording::RecordingTransport;
use taskdeck::adapters::replaying::ReplayingTransport;
use taskdeck::cassette::{Cassette, CassetteRecorder};
use taskdeck::context::AppContext;
use taskdeck::ports::{HttpResponse, HttpTransport, Method, TaskRepository};
use taskdeck::task::{NewTask, Priority, TaskStatus};
use taskdeck::Error;

const BASE_URL: &str = "http://localhost:8080";

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at(Utc.with_ymd_and_hms(2025, 10, 30, 9, 0, 0).unwrap()))
}

fn server_responses() -> Vec<HttpResponse> {
    vec![
        HttpResponse::new(
            200,
            r#"{"token":"jwt-1","type":"Bearer","id":1,"name":"Demo User","email":"demo@example.com","role":"USER"}"#,
        ),
        HttpResponse::new(
            200,
            r#"[{"id":7,"title":"Fix Critical Bug","status":"IN_PROGRESS","priority":"URGENT",
               "dueDate":"2025-10-27T00:00:00","completed":false,"overdue":true,
               "createdAt":"2025-10-25T14:00:00","updatedAt":"2025-10-30T16:00:00"}]"#,
        ),
        HttpResponse::new(
            201,
            r#"{"id":8,"title":"Write spec","status":"TODO","priority":"HIGH",
               "dueDate":"2025-10-26T00:00:00","completed":false,
               "createdAt":"2025-10-30T09:00:00","updatedAt":"2025-10-30T09:00:00"}"#,
        ),
        HttpResponse::new(
            200,
            r#"{"id":8,"title":"Write spec","status":"DONE","priority":"HIGH",
               "dueDate":"2025-10-26T00:00:00","completed":true,
               "createdAt":"2025-10-30T09:00:00","updatedAt":"2025-10-30T09:05:00"}"#,
        ),
    ]
}

/// Runs one session and returns what the caller observed.
async fn exercise(ctx: &AppContext) -> (String, Vec<String>, u64, bool) {
    let session = ctx.session_store().login("demo@example.com", "demo123").await.unwrap();
    let titles = ctx.tasks().list().await.unwrap().into_iter().map(|t| t.title).collect();
    let due = NaiveDate::from_ymd_opt(2025, 10, 26).unwrap();
    let created = ctx
        .tasks()
        .create(NewTask::new("Write spec", due).with_priority(Priority::High))
        .await
        .unwrap();
    let completed = ctx.tasks().complete(created.id).await.unwrap();
    assert_eq!(completed.status, TaskStatus::Done);
    (session.user.role, titles, created.id, completed.completed)
}

async fn replay(path: &Path) -> (String, Vec<String>, u64, bool) {
    let transport = Arc::new(ReplayingTransport::from_file(path).unwrap());
    let ctx = AppContext::remote(BASE_URL, transport.clone(), clock());
    let outputs = exercise(&ctx).await;
    assert_eq!(transport.remaining(), 0);
    outputs
}

#[tokio::test]
async fn record_then_replay_produces_identical_outputs() {
    let dir = std::env::temp_dir().join("taskdeck_record_replay_test");
    let _ = std::fs::remove_dir_all(&dir);
    let cassette_path = dir.join("session.cassette.yaml");

    // Phase 1: record against a scripted server.
    let recorder =
        Arc::new(Mutex::new(CassetteRecorder::new(&cassette_path, "roundtrip", BASE_URL)));
    let server: Arc<dyn HttpTransport> = Arc::new(ScriptedTransport::new(server_responses()));
    let recording = Arc::new(RecordingTransport::new(server, Arc::clone(&recorder)));
    let ctx = AppContext::remote(BASE_URL, recording, clock());
    let recorded = exercise(&ctx).await;
    drop(ctx);

    let written = recorder.lock().unwrap().save().unwrap();
    assert_eq!(written, cassette_path);
    assert_eq!(recorded, ("user".to_string(), vec!["Fix Critical Bug".to_string()], 8, true));

    let cassette = Cassette::load(&cassette_path).unwrap();
    let calls: Vec<_> = cassette.exchanges.iter().map(|e| (e.method, e.path.as_str())).collect();
    assert_eq!(
        calls,
        vec![
            (Method::Post, "/api/auth/login"),
            (Method::Get, "/api/tasks"),
            (Method::Post, "/api/tasks"),
            (Method::Patch, "/api/tasks/8/complete"),
        ]
    );

    // Phase 2: replay and compare.
    let first = replay(&cassette_path).await;
    assert_eq!(first, recorded, "replay differs from recording");

    // Phase 3: a second replay is identical.
    let second = replay(&cassette_path).await;
    assert_eq!(first, second, "replays differ");

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn replayed_unauthorized_response_clears_session() {
    let dir = std::env::temp_dir().join("taskdeck_replay_expired_test");
    let _ = std::fs::remove_dir_all(&dir);
    let cassette_path = dir.join("expired.cassette.yaml");

    let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&cassette_path, "expired", BASE_URL)));
    let server: Arc<dyn HttpTransport> = Arc::new(ScriptedTransport::new(vec![
        server_responses().remove(0),
        HttpResponse::new(401, r#"{"error":"Unauthorized"}"#),
    ]));
    let ctx = AppContext::remote(
        BASE_URL,
        Arc::new(RecordingTransport::new(server, Arc::clone(&recorder))),
        clock(),
    );
    ctx.session_store().login("demo@example.com", "demo123").await.unwrap();
    assert!(ctx.tasks().list().await.is_err());
    drop(ctx);
    recorder.lock().unwrap().save().unwrap();

    let transport = Arc::new(ReplayingTransport::from_file(&cassette_path).unwrap());
    let ctx = AppContext::remote(BASE_URL, transport, clock());
    ctx.session_store().login("demo@example.com", "demo123").await.unwrap();
    assert!(ctx.session.is_authenticated());

    let err = ctx.tasks().list().await.unwrap_err();
    assert!(matches!(err, Error::SessionExpired));
    assert!(!ctx.session.is_authenticated());

    // The cassette is exhausted; further calls fail as network errors.
    assert!(matches!(ctx.tasks().list().await, Err(Error::Network(_))));

    let _ = std::fs::remove_dir_all(&dir);
}
