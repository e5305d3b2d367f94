//! In-process stand-in for the company backend.
//!
//! Binds `127.0.0.1:0`, checks the bearer header on every request, and
//! records what it received so tests can assert on the wire format.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use bizdesk_core::session::{MemoryTokenStore, SessionConfig, SessionManager};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

/// One request as seen by the stub.
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub query: HashMap<String, String>,
    pub fields: BTreeMap<String, String>,
    /// Part name -> (file name, content type, bytes).
    pub files: BTreeMap<String, (String, String, Vec<u8>)>,
}

#[derive(Clone)]
struct StubState {
    expected_token: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubServer {
    /// Start a stub that accepts only `expected_token`.
    pub async fn start(expected_token: &str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            expected_token: expected_token.to_string(),
            requests: requests.clone(),
        };

        let app = Router::new()
            .route(
                "/app/",
                get(list_companies).post(add_company).delete(delete_company),
            )
            .route("/updateCompany/{id}", put(update_company))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

/// Mint an HS256 token for user `user_id`, valid for an hour.
pub fn mint(user_id: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    encode(
        &Header::default(),
        &json!({ "exp": now + 3600, "iat": now, "data": { "id": user_id, "username": "admin" } }),
        &EncodingKey::from_secret(b"server-side-secret"),
    )
    .unwrap()
}

/// A session signed in with `token`.
pub fn signed_in(token: &str) -> Arc<SessionManager> {
    let session = SessionManager::new(
        SessionConfig::new("http://localhost:3000"),
        Arc::new(MemoryTokenStore::new()),
    );
    assert!(session.login(token).is_authenticated());
    Arc::new(session)
}

pub fn signed_out() -> Arc<SessionManager> {
    Arc::new(SessionManager::new(
        SessionConfig::new("http://localhost:3000"),
        Arc::new(MemoryTokenStore::new()),
    ))
}

pub fn stored_company() -> Value {
    json!({
        "id": 1,
        "com_name": "Rajib Electricals",
        "address": "12 Park Street",
        "gst": "19ABCDE1234F1Z5",
        "phone": null,
        "email": "office@example.com",
        "logo": "/uploads/1.png"
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn authorized(state: &StubState, headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {}", state.expected_token);
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected)
}

fn record(state: &StubState, recorded: Recorded) {
    state.requests.lock().unwrap().push(recorded);
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Invalid token" })),
    )
        .into_response()
}

async fn read_multipart(mut multipart: Multipart, recorded: &mut Recorded) {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.unwrap().to_vec();
                recorded.files.insert(name, (file_name, content_type, bytes));
            }
            None => {
                let text = field.text().await.unwrap();
                recorded.fields.insert(name, text);
            }
        }
    }
}

fn company_from(id: i64, recorded: &Recorded) -> Value {
    let logo = recorded
        .files
        .get("logo")
        .map(|(file_name, _, _)| format!("/uploads/{file_name}"));
    json!({
        "id": id,
        "com_name": recorded.fields.get("company_name"),
        "address": recorded.fields.get("address"),
        "gst": recorded.fields.get("gst"),
        "phone": recorded.fields.get("phone"),
        "email": recorded.fields.get("email"),
        "logo": logo
    })
}

async fn list_companies(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(
        &state,
        Recorded {
            method: "GET",
            path: "/app/".into(),
            query: query.clone(),
            ..Recorded::default()
        },
    );
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    if query.get("action").map(String::as_str) != Some("companyDetails") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    Json(json!([stored_company()])).into_response()
}

async fn add_company(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    multipart: Multipart,
) -> Response {
    let mut recorded = Recorded {
        method: "POST",
        path: "/app/".into(),
        query,
        ..Recorded::default()
    };
    read_multipart(multipart, &mut recorded).await;
    record(&state, recorded.clone());

    if !authorized(&state, &headers) {
        return unauthorized();
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "message": "Company added successfully",
            "company": company_from(2, &recorded)
        })),
    )
        .into_response()
}

async fn update_company(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Response {
    let mut recorded = Recorded {
        method: "PUT",
        path: format!("/updateCompany/{id}"),
        ..Recorded::default()
    };
    read_multipart(multipart, &mut recorded).await;
    record(&state, recorded.clone());

    if !authorized(&state, &headers) {
        return unauthorized();
    }
    Json(json!({
        "message": "Company updated successfully",
        "company": company_from(id, &recorded)
    }))
    .into_response()
}

/// Id 404 answers with an empty 404; id 500 with a JSON error message.
async fn delete_company(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(
        &state,
        Recorded {
            method: "DELETE",
            path: "/app/".into(),
            query: query.clone(),
            ..Recorded::default()
        },
    );
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    match query.get("id").map(String::as_str) {
        Some("404") => StatusCode::NOT_FOUND.into_response(),
        Some("500") => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Database unavailable" })),
        )
            .into_response(),
        _ => Json(json!({ "message": "Company deleted successfully" })).into_response(),
    }
}
