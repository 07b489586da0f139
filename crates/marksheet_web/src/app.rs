//! HTTP routes for the marks form.
//!
//! # Responsibility
//! - Map `GET /`, `POST /add` and `GET /healthz` onto core use-cases.
//! - Carry write notices to the read page through the redirect query string.
//!
//! # Invariants
//! - Core calls run on the blocking pool; handlers never block the reactor.
//! - Every write outcome, including validation failures, is a 303 redirect.
//! - Logged events never include user-entered names.

use crate::render::render_page;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{RawQuery, State};
use axum::response::{Html, Redirect};
use axum::routing::{get, post};
use axum::Router;
use log::{error, info};
use marksheet_core::{
    sqlite_service, Notice, NoticeLevel, Record, RecordForm, StoreConfig, RECENT_RECORDS_LIMIT,
};
use std::sync::Arc;

/// Shared state for axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    store: Arc<StoreConfig>,
}

impl AppState {
    pub fn new(store: StoreConfig) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Build the axum router (separated for testing).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/add", post(add))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Notice carried in the read endpoint query string.
#[derive(Debug, Default)]
struct NoticeParams {
    level: Option<String>,
    message: Option<String>,
}

impl NoticeParams {
    /// Reads the first `level` and `message`; repeats and unknown keys are ignored.
    fn from_query(query: Option<&str>) -> Self {
        let query = query.unwrap_or_default().as_bytes();
        Self {
            level: first_value(query, "level"),
            message: first_value(query, "message"),
        }
    }

    fn into_notice(self) -> Option<Notice> {
        let message = self.message.filter(|message| !message.trim().is_empty())?;
        let level = self
            .level
            .as_deref()
            .and_then(NoticeLevel::parse)
            .unwrap_or(NoticeLevel::Info);
        Some(Notice { level, message })
    }
}

/// Returns the first value bound to `key` in an urlencoded string.
///
/// Decoding is lossy: malformed escapes and invalid UTF-8 never fail.
fn first_value(input: &[u8], key: &str) -> Option<String> {
    url::form_urlencoded::parse(input)
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

/// Decodes a write-form body, keeping the first `name` and `marks`.
///
/// Absent fields decode as empty strings and fail validation downstream.
fn decode_record_form(body: &[u8]) -> RecordForm {
    RecordForm {
        name: first_value(body, "name").unwrap_or_default(),
        marks: first_value(body, "marks").unwrap_or_default(),
    }
}

/// Returns the read endpoint URL carrying `notice`.
pub fn notice_location(notice: &Notice) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("level", notice.level.as_str())
        .append_pair("message", &notice.message)
        .finish();
    format!("/?{query}")
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(State(state): State<AppState>, RawQuery(query): RawQuery) -> Html<String> {
    let mut notices: Vec<Notice> = NoticeParams::from_query(query.as_deref())
        .into_notice()
        .into_iter()
        .collect();

    let store = Arc::clone(&state.store);
    let listed = tokio::task::spawn_blocking(move || {
        let recent = sqlite_service(&store).list_recent(RECENT_RECORDS_LIMIT);
        let notice = recent.error_notice();
        (recent.records, notice)
    })
    .await;

    let records: Vec<Record> = match listed {
        Ok((records, read_notice)) => {
            notices.extend(read_notice);
            records
        }
        Err(err) => {
            error!(
                "event=page_render module=web status=error error_code=worker_failed error={}",
                err
            );
            notices.push(Notice::error("DB read error: request worker failed"));
            Vec::new()
        }
    };

    Html(render_page(&records, &notices))
}

async fn add(State(state): State<AppState>, body: Result<Bytes, BytesRejection>) -> Redirect {
    let form = match body {
        Ok(body) => decode_record_form(&body),
        Err(err) => {
            error!(
                "event=record_submit module=web status=error error_code=body_unreadable error={}",
                err
            );
            RecordForm::default()
        }
    };

    let store = Arc::clone(&state.store);
    let submitted = tokio::task::spawn_blocking(move || sqlite_service(&store).submit(&form)).await;

    let notice = match submitted {
        Ok(notice) => notice,
        Err(err) => {
            error!(
                "event=record_submit module=web status=error error_code=worker_failed error={}",
                err
            );
            Notice::error("Insert error: request worker failed")
        }
    };

    info!(
        "event=record_submit module=web status=done level={}",
        notice.level.as_str()
    );
    Redirect::to(&notice_location(&notice))
}
