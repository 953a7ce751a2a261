//! `GET /sessions/{key}`: initialize, update and echo the caller's session.

use std::collections::BTreeMap;

use axum::{
    Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite, SignedCookieJar};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::PrettyJson;
use crate::AppState;
use crate::config::{ResponseShape, SessionConfig};
use crate::error::AppError;
use crate::session::{SessionField, SessionRecord, UnknownField};

pub fn router() -> Router<AppState> {
    Router::new().route("/sessions/{key}", get(show_session))
}

// ─────────────────────────────────────────────────────────────────────────────
// Response DTOs (fields kept in alphabetical order)
// ─────────────────────────────────────────────────────────────────────────────

/// All session fields with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub count: u64,
    pub goodnight: String,
    pub hello: String,
}

impl From<&SessionRecord> for SessionSnapshot {
    fn from(record: &SessionRecord) -> Self {
        Self {
            count: record.count(),
            goodnight: record.goodnight().to_string(),
            hello: record.hello().to_string(),
        }
    }
}

/// Body for the `summary` and `snapshot` shapes.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub message: String,
    pub session: SessionSnapshot,
}

/// Body for the `field` shape.
#[derive(Debug, Serialize)]
pub struct FieldResponse {
    pub cookies: BTreeMap<String, String>,
    pub session_accessed: bool,
    pub session_key: String,
    pub session_value: Value,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handler
// ─────────────────────────────────────────────────────────────────────────────

/// GET /sessions/{key}
///
/// Always refreshes the session cookie, including on the `field` shape's 404.
async fn show_session(
    State(state): State<AppState>,
    Path(key): Path<String>,
    signed: SignedCookieJar,
    cookies: CookieJar,
) -> (SignedCookieJar, Response) {
    let settings = &state.config.session;
    let route = state.config.route;

    let presented = signed
        .get(&settings.cookie_name)
        .map(|cookie| cookie.value().to_owned());
    let (session, created) = state.sessions.resolve(presented.as_deref());

    let record = session.with_record(|record| {
        record.ensure_defaults();
        if route.increments() && key == SessionField::Count.as_str() {
            record.increment_count();
        }
        record.clone()
    });

    debug!(
        name: "session.accessed",
        session_id = %session.id(),
        key = %key,
        created,
        count = record.count(),
        "Session accessed"
    );

    let response = render(route.shape, &key, &record, request_cookies(&cookies))
        .unwrap_or_else(IntoResponse::into_response);
    let signed = signed.add(session_cookie(settings, session.id()));

    (signed, response)
}

/// Render the body for `shape` from an already-updated record.
pub fn render(
    shape: ResponseShape,
    key: &str,
    record: &SessionRecord,
    cookies: BTreeMap<String, String>,
) -> Result<Response, AppError> {
    match shape {
        ResponseShape::Summary => PrettyJson(SummaryResponse {
            message: format!("Session accessed for key: {key}"),
            session: record.into(),
        })
        .try_into_response(),
        ResponseShape::Snapshot => PrettyJson(SummaryResponse {
            message: format!("Session data retrieved for key: {key}"),
            session: record.into(),
        })
        .try_into_response(),
        ResponseShape::Field => {
            let field: SessionField = key
                .parse()
                .map_err(|UnknownField(name)| AppError::UnknownKey(name))?;
            let value = record
                .get(field)
                .ok_or_else(|| AppError::UnknownKey(key.to_string()))?;

            PrettyJson(FieldResponse {
                cookies,
                session_accessed: true,
                session_key: field.as_str().to_string(),
                session_value: value,
            })
            .try_into_response()
        }
    }
}

/// Every cookie on the request, raw values, sorted by name.
fn request_cookies(jar: &CookieJar) -> BTreeMap<String, String> {
    jar.iter()
        .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
        .collect()
}

fn session_cookie(settings: &SessionConfig, id: &str) -> Cookie<'static> {
    Cookie::build((settings.cookie_name.clone(), id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.secure_cookie)
        .build()
}
