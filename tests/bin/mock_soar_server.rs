use axum::{
    extract::{Path, Query, Request},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration as ChronoDuration, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const MOCK_TOKEN: &str = "test_token";
const MOCK_VERSION: &str = "6.2.1.305";

// Listing playbooks is slowed down so tests can observe out-of-order completion.
const PLAYBOOK_LIST_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Serialize)]
struct MockContainer {
    id: u64,
    name: String,
    label: String,
    severity: String,
    status: String,
    owner_name: Option<String>,
    create_time: String,
    artifact_count: u32,
}

#[derive(Debug, Clone, Serialize)]
struct MockPlaybook {
    id: u64,
    name: String,
    repo: u64,
    active: bool,
    tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct MockActionRun {
    id: u64,
    action: String,
    status: String,
    container: u64,
    message: String,
}

#[derive(Deserialize, Debug)]
struct MockPlaybookRunInput {
    container_id: Option<u64>,
    playbook_id: Option<u64>,
    scope: Option<String>,
    run: Option<bool>,
}

#[derive(Deserialize, Debug)]
struct PageQuery {
    page: Option<usize>,
    page_size: Option<usize>,
}

struct MockData {
    containers: BTreeMap<u64, MockContainer>,
    playbooks: BTreeMap<u64, MockPlaybook>,
    action_runs: BTreeMap<u64, MockActionRun>,
    next_playbook_run_id: u64,
}

static MOCK_DATA: Lazy<Mutex<MockData>> = Lazy::new(|| {
    let now = Utc::now();
    let timestamp = |minutes_ago: i64| {
        (now - ChronoDuration::minutes(minutes_ago)).to_rfc3339_opts(SecondsFormat::Millis, true)
    };

    let mut containers = BTreeMap::new();
    containers.insert(
        1,
        MockContainer {
            id: 1,
            name: "Suspicious Outbound Connection".to_string(),
            label: "events".to_string(),
            severity: "high".to_string(),
            status: "new".to_string(),
            owner_name: None,
            create_time: timestamp(90),
            artifact_count: 3,
        },
    );
    containers.insert(
        2,
        MockContainer {
            id: 2,
            name: "Phishing Email Reported by User".to_string(),
            label: "email".to_string(),
            severity: "medium".to_string(),
            status: "open".to_string(),
            owner_name: Some("analyst1".to_string()),
            create_time: timestamp(30),
            artifact_count: 5,
        },
    );

    let mut playbooks = BTreeMap::new();
    playbooks.insert(
        10,
        MockPlaybook {
            id: 10,
            name: "investigate_ip".to_string(),
            repo: 2,
            active: true,
            tags: vec!["enrichment".to_string()],
        },
    );
    playbooks.insert(
        11,
        MockPlaybook {
            id: 11,
            name: "phishing_triage".to_string(),
            repo: 2,
            active: true,
            tags: vec!["email".to_string(), "triage".to_string()],
        },
    );

    let mut action_runs = BTreeMap::new();
    action_runs.insert(
        500,
        MockActionRun {
            id: 500,
            action: "geolocate ip".to_string(),
            status: "success".to_string(),
            container: 1,
            message: "1 action succeeded".to_string(),
        },
    );

    Mutex::new(MockData {
        containers,
        playbooks,
        action_runs,
        next_playbook_run_id: 1000,
    })
});

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"failed": true, "message": "Requested item not found"})),
    )
        .into_response()
}

fn listing(items: Vec<Value>, page: usize, page_size: usize) -> Value {
    let count = items.len();
    let page_size = page_size.max(1);
    let num_pages = count.div_ceil(page_size);
    let data: Vec<Value> = items
        .into_iter()
        .skip(page * page_size)
        .take(page_size)
        .collect();
    json!({"count": count, "num_pages": num_pages, "data": data})
}

fn to_values<T: Serialize>(items: impl Iterator<Item = T>) -> Vec<Value> {
    items
        .map(|item| serde_json::to_value(item).unwrap_or(Value::Null))
        .collect()
}

async fn require_token(request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get("ph-auth-token")
        .and_then(|v| v.to_str().ok());
    let bearer = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if token != Some(MOCK_TOKEN) || bearer != Some(MOCK_TOKEN) {
        warn!("Rejecting request with missing or invalid token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"failed": true, "message": "Authentication failed"})),
        )
            .into_response();
    }

    next.run(request).await
}

async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn version() -> impl IntoResponse {
    info!("GET /rest/version");
    Json(json!({"version": MOCK_VERSION}))
}

async fn list_containers(Query(query): Query<PageQuery>) -> impl IntoResponse {
    info!("GET /rest/container {:?}", query);
    let data = MOCK_DATA.lock().unwrap();
    Json(listing(
        to_values(data.containers.values().cloned()),
        query.page.unwrap_or(0),
        query.page_size.unwrap_or(10),
    ))
}

async fn get_container(Path(id): Path<String>) -> Response {
    info!("GET /rest/container/{}", id);
    let data = MOCK_DATA.lock().unwrap();
    match id.parse::<u64>().ok().and_then(|id| data.containers.get(&id)) {
        Some(container) => Json(container.clone()).into_response(),
        None => {
            warn!("Container not found: {}", id);
            not_found()
        }
    }
}

async fn list_playbooks(Query(query): Query<PageQuery>) -> impl IntoResponse {
    info!("GET /rest/playbook {:?}", query);
    tokio::time::sleep(PLAYBOOK_LIST_DELAY).await;
    let playbooks = {
        let data = MOCK_DATA.lock().unwrap();
        to_values(data.playbooks.values().cloned())
    };
    Json(listing(playbooks, query.page.unwrap_or(0), query.page_size.unwrap_or(10)))
}

async fn run_playbook(Json(payload): Json<MockPlaybookRunInput>) -> Response {
    info!("POST /rest/playbook_run with payload: {:?}", payload);

    let (Some(container_id), Some(playbook_id)) = (payload.container_id, payload.playbook_id)
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"failed": true, "message": "container_id and playbook_id are required"})),
        )
            .into_response();
    };
    if payload.run != Some(true) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"failed": true, "message": "run must be true"})),
        )
            .into_response();
    }

    let mut data = MOCK_DATA.lock().unwrap();
    if !data.containers.contains_key(&container_id) || !data.playbooks.contains_key(&playbook_id) {
        return not_found();
    }

    let run_id = data.next_playbook_run_id;
    data.next_playbook_run_id += 1;
    info!(
        "Started playbook {} on container {} with scope {:?} as run {}",
        playbook_id, container_id, payload.scope, run_id
    );

    Json(json!({
        "playbook_run_id": run_id,
        "message": format!("playbook_run_id:{}", run_id),
        "scope": payload.scope,
    }))
    .into_response()
}

async fn list_actions(Query(query): Query<PageQuery>) -> impl IntoResponse {
    info!("GET /rest/action {:?}", query);
    let actions = vec![
        json!({"id": 1, "action": "geolocate ip", "type": "investigate", "app": "MaxMind"}),
        json!({"id": 2, "action": "block ip", "type": "contain", "app": "Palo Alto Networks Firewall"}),
    ];
    Json(listing(actions, query.page.unwrap_or(0), query.page_size.unwrap_or(10)))
}

async fn get_action_run(Path(id): Path<String>) -> Response {
    info!("GET /rest/action_run/{}", id);
    let data = MOCK_DATA.lock().unwrap();
    match id.parse::<u64>().ok().and_then(|id| data.action_runs.get(&id)) {
        Some(run) => Json(run.clone()).into_response(),
        None => not_found(),
    }
}

async fn list_assets(Query(query): Query<PageQuery>) -> impl IntoResponse {
    info!("GET /rest/asset {:?}", query);
    let assets = vec![
        json!({"id": 1, "name": "maxmind", "product_vendor": "MaxMind", "product_name": "GeoIP2"}),
        json!({"id": 2, "name": "pan_fw", "product_vendor": "Palo Alto Networks", "product_name": "Firewall"}),
        json!({"id": 3, "name": "splunk_es", "product_vendor": "Splunk", "product_name": "Splunk Enterprise"}),
    ];
    Json(listing(assets, query.page.unwrap_or(0), query.page_size.unwrap_or(10)))
}

async fn system_info() -> impl IntoResponse {
    info!("GET /rest/system_info");
    Json(json!({
        "base_url": "https://soar.mock.local",
        "time_zone": "UTC",
        "version": MOCK_VERSION,
    }))
}

async fn catch_all(method: axum::http::Method, uri: axum::http::Uri) -> impl IntoResponse {
    warn!("Unhandled request: {} {}", method, uri.path());
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "failed": true,
            "message": format!("No handler for: {} {}", method, uri.path()),
        })),
    )
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Starting Mock Splunk SOAR Server...");

    let rest = Router::new()
        .route("/version", get(version))
        .route("/container", get(list_containers))
        .route("/container/:id", get(get_container))
        .route("/playbook", get(list_playbooks))
        .route("/playbook_run", post(run_playbook))
        .route("/action", get(list_actions))
        .route("/action_run/:id", get(get_action_run))
        .route("/asset", get(list_assets))
        .route("/system_info", get(system_info))
        .layer(middleware::from_fn(require_token));

    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/rest", rest)
        .fallback(catch_all);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    println!("MOCK_SERVER_PORT={}", port);
    info!("Mock server listening on 127.0.0.1:{}", port);

    axum::serve(listener, app).await.unwrap();
}
