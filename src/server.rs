//! HTTP boundary.
//!
//! ```text
//! POST /api/summarize   JSON {theme, length_mode, language, mode}
//! GET  /api/stats       request counters
//! GET  /api/health      liveness + credential count
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{info, warn};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

use crate::error::Error;
use crate::pipeline::Summarizer;
use crate::providers::ChatTransport;
use crate::request::{ErrorResponse, Language, Length, Mode, SummaryRequest};
use crate::wiki::WikiSource;

/// Body of `POST /api/summarize`. Everything is optional at the wire
/// level so missing fields produce our own messages.
#[derive(Debug, Default, Deserialize)]
pub struct SummarizeBody
{   #[serde(default)]
    pub theme: Option<String>
  , #[serde(default)]
    pub length_mode: Option<String>
  , #[serde(default)]
    pub language: Option<String>
  , #[serde(default)]
    pub mode: Option<String>
}

impl SummarizeBody
{   /// Unknown length, language or mode fall back to their defaults;
    /// only the theme can reject the request.
    pub fn into_request(self) -> Result<SummaryRequest, Error>
    {   let theme = self.theme.unwrap_or_default();
        if theme.trim().is_empty()
        {   return Err(Error::Validation("Theme is required".to_string()));
        }

        let length = match self.length_mode.as_deref()
        {   None => Length::default()
          , Some(token) => Length::from_wire(token).unwrap_or_else(|| {
              warn!("Unknown length_mode '{}', using default", token);
              Length::default()
            })
        };
        let language = match self.language.as_deref()
        {   None => Language::default()
          , Some(code) => Language::from_code(code).unwrap_or_else(|| {
              warn!("Unsupported language '{}', falling back to English", code);
              Language::En
            })
        };
        let mode = match self.mode.as_deref()
        {   None => Mode::default()
          , Some(name) => Mode::from_name(name).unwrap_or_else(|| {
              warn!("Unknown mode '{}', using general", name);
              Mode::General
            })
        };

        SummaryRequest::new(&theme, length, language, mode)
    }
}

pub fn router<T, W>(service: Arc<Summarizer<T, W>>) -> Router
where T: ChatTransport + 'static
    , W: WikiSource + 'static
{   Router::new()
        .route("/api/summarize", post(summarize::<T, W>))
        .route("/api/stats",     get(stats::<T, W>))
        .route("/api/health",    get(health::<T, W>))
        .with_state(service)
}

/// Bind and serve until Ctrl-C.
pub async fn serve<T, W>(
  service: Arc<Summarizer<T, W>>
, port: u16
) -> Result<(), Error>
where T: ChatTransport + 'static
    , W: WikiSource + 'static
{   let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Other(format!("bind failed on {}: {}", addr, e)))?;

    info!("Summarizer listening on {}", addr);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .map_err(|e| Error::Other(format!("server error: {}", e)))
}

fn failure(status: StatusCode, e: &Error) -> Response
{   (status, Json(ErrorResponse::from(e))).into_response()
}

/// POST /api/summarize
async fn summarize<T, W>(
    State(service): State<Arc<Summarizer<T, W>>>,
    body: Result<Json<SummarizeBody>, JsonRejection>,
) -> Response
where T: ChatTransport + 'static
    , W: WikiSource + 'static
{   let body = match body
    {   Ok(Json(body)) => body
      , Err(rejection) => {
          warn!("Rejected summarize body: {}", rejection.body_text());
          let e = Error::Validation(rejection.body_text());
          return failure(StatusCode::BAD_REQUEST, &e);
        }
    };

    let request = match body.into_request()
    {   Ok(request) => request
      , Err(e) => return failure(StatusCode::BAD_REQUEST, &e)
    };

    match service.process(&request).await
    {   Ok(response) => (StatusCode::OK, Json(response)).into_response()
      , Err(e) if e.is_validation() => failure(StatusCode::BAD_REQUEST, &e)
      , Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, &e)
    }
}

/// GET /api/stats
async fn stats<T, W>(State(service): State<Arc<Summarizer<T, W>>>) -> Response
where T: ChatTransport + 'static
    , W: WikiSource + 'static
{   (StatusCode::OK, Json(service.stats())).into_response()
}

/// GET /api/health
async fn health<T, W>(State(service): State<Arc<Summarizer<T, W>>>) -> Response
where T: ChatTransport + 'static
    , W: WikiSource + 'static
{   let body = json!({
        "status": "ok",
        "credentials": service.key_pool().size(),
    });
    (StatusCode::OK, Json(body)).into_response()
}
