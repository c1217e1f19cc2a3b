use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use camino::Utf8PathBuf;
use spark_app_core::{
    AppCommand, AppKernel, AppState, AppStore, BootState, ConnectionState, DomainEvent,
    FilePersistence, PlanTransport, RunPhase, TransportEvent, TransportSink,
};
use spark_core::stats::Summarize;
use spark_core::PlanRequest;
use spark_infra::{SseTransport, TransportError, TransportErrorKind};
use tokio::sync::mpsc;

const BACKEND_STREAM: &str = concat!(
    "data: {\"type\": \"session\", \"session_id\": \"sess-1\"}\n\n",
    "data: {\"type\": \"trace\", \"data\": {\"agent\": \"Supervisor\", \"calling_collaborator\": \"course-catalog-agent\"}}\n\n",
    "data: {\"type\": \"trace\", \"data\": {\"agent\": \"Supervisor\", \"collaborator_response\": {\"agent\": \"course-catalog-agent\", \"output\": \"=== COURSE CATALOG ===\\nCourse #1:\\nCode: CS 4347\\nName: Database Systems\\nCredits: 3\\n\"}}}\n\n",
    "data: {\"type\": \"chunk\", \"text\": \"Take CS 4347.\"}\n\n",
    "data: {\"type\": \"done\"}\n\n",
);

#[derive(Clone)]
struct Mock {
    body: &'static str,
    status: StatusCode,
    seen: Arc<Mutex<Vec<String>>>,
}

async fn start_mock_server(body: &'static str, status: StatusCode) -> (SocketAddr, Mock) {
    let mock = Mock {
        body,
        status,
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/api/plan",
            post({
                let mock = mock.clone();
                move |request: String| async move {
                    mock.seen.lock().unwrap().push(request);
                    (
                        mock.status,
                        [(header::CONTENT_TYPE, "text/event-stream")],
                        mock.body,
                    )
                        .into_response()
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, mock)
}

async fn run(
    transport: &SseTransport,
    request: PlanRequest,
) -> (anyhow::Result<()>, Vec<TransportEvent>) {
    let (tx, mut rx) = mpsc::channel(64);
    let sink = TransportSink::new(uuid::Uuid::new_v4(), tx);
    let outcome = transport.run_plan(request, sink).await;
    let mut events = Vec::new();
    while let Ok(DomainEvent::Transport { ev, .. }) = rx.try_recv() {
        events.push(ev);
    }
    (outcome, events)
}

#[tokio::test]
async fn streams_a_backend_plan_and_posts_the_request() {
    let (addr, mock) = start_mock_server(BACKEND_STREAM, StatusCode::OK).await;
    let transport = SseTransport::new(&format!("http://{addr}/")).unwrap();
    transport.connect().await.expect("health check");

    let mut request = PlanRequest {
        goal: "Database engineer".into(),
        session_id: Some("sess-0".into()),
        ..Default::default()
    };
    request
        .extra_context
        .insert("user_major".into(), "Computer Science".into());
    let (outcome, events) = run(&transport, request).await;
    outcome.expect("stream should finish");

    assert_eq!(events.first(), Some(&TransportEvent::Connected));
    let Some(TransportEvent::PlanComplete(result)) = events.last() else {
        panic!("expected plan_complete, got {events:?}");
    };
    assert_eq!(result.session_id, "sess-1");
    assert_eq!(result.final_plan, "Take CS 4347.");
    let courses = spark_core::formats::parse_course_plan(result.course_plan.as_deref().unwrap())
        .expect("course blob parses");
    assert_eq!(courses.courses[0].code, "CS 4347");
    assert!(!courses.stats().is_empty());

    let posted: serde_json::Value =
        serde_json::from_str(&mock.seen.lock().unwrap()[0]).unwrap();
    assert_eq!(posted["goal"], "Database engineer");
    assert_eq!(posted["session_id"], "sess-0");
    assert_eq!(posted["extra_context"]["user_major"], "Computer Science");
}

#[tokio::test]
async fn stream_cut_short_is_an_error() {
    let body = "data: {\"type\": \"chunk\", \"text\": \"partial\"}\n\n";
    let (addr, _mock) = start_mock_server(body, StatusCode::OK).await;
    let transport = SseTransport::new(&format!("http://{addr}")).unwrap();

    let (outcome, events) = run(&transport, PlanRequest::default()).await;
    let err = outcome.unwrap_err();
    let err = err.downcast_ref::<TransportError>().unwrap();
    assert_eq!(err.kind(), TransportErrorKind::Protocol);
    assert_eq!(events, vec![TransportEvent::Connected]);
}

#[tokio::test]
async fn server_error_status_is_reported() {
    let (addr, _mock) = start_mock_server("overloaded", StatusCode::SERVICE_UNAVAILABLE).await;
    let transport = SseTransport::new(&format!("http://{addr}")).unwrap();

    let (outcome, events) = run(&transport, PlanRequest::default()).await;
    let err = outcome.unwrap_err();
    assert!(format!("{err:#}").contains("503"));
    assert!(events.is_empty());
}

#[test]
fn rejects_non_http_urls() {
    let err = SseTransport::new("ftp://planner").unwrap_err();
    assert_eq!(err.kind(), TransportErrorKind::Config);
    assert!(SseTransport::new("not a url").is_err());
}

#[test]
fn kernel_drives_a_live_plan_to_completion() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (addr, _mock) = rt.block_on(start_mock_server(BACKEND_STREAM, StatusCode::OK));

    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let transport = SseTransport::new(&format!("http://{addr}")).unwrap();
    let state = AppState {
        boot: BootState::Ready,
        ..Default::default()
    };
    let mut kernel = AppKernel::new(
        AppStore::new(state),
        transport,
        FilePersistence::with_root(root.clone()),
        FilePersistence::with_root(root),
    );

    kernel.dispatch(AppCommand::Connect);
    kernel.dispatch(AppCommand::StartPlan {
        goal: "Database engineer".into(),
    });

    let deadline = Instant::now() + Duration::from_secs(5);
    let state = loop {
        kernel.tick();
        let state = kernel.store.state();
        if state.run.phase == RunPhase::Completed && state.connection == ConnectionState::Connected
        {
            break state;
        }
        assert!(Instant::now() < deadline, "plan did not complete: {:?}", state.run);
        std::thread::sleep(Duration::from_millis(10));
    };

    assert_eq!(state.session_id.as_deref(), Some("sess-1"));
    assert!(state.run.running_agents.is_empty());
    // user goal, course catalog call, final plan
    assert_eq!(state.chat.len(), 3);
    assert!(state.result.unwrap().course_plan.is_some());
}
