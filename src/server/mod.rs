//! HTTP read surface over the retrieval service.
//!
//! Every route maps to exactly one retrieval call:
//! - `GET /` random record as a minimal HTML page
//! - `GET /get[/:position]` one record as plain text (random if no position)
//! - `GET /fortune[/:upto]` bulk dump in fortune-file format (`<text>\n%\n`)
//! - `GET /count` population size
//!
//! Absence maps to 404, store failures to 500. The server never mutates the
//! store.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;

use crate::error::{AppError, Result};
use crate::services::RetrievalService;

type AppState = State<Arc<RetrievalService>>;

/// Build the application router.
pub fn router(service: Arc<RetrievalService>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/get", get(get_random))
        .route("/get/:position", get(get_at))
        .route("/fortune", get(fortune_all))
        .route("/fortune/:upto", get(fortune_upto))
        .route("/count", get(count))
        .with_state(service)
}

/// Bind and serve until the process is stopped.
pub async fn serve(service: Arc<RetrievalService>, bind: &str, port: u16) -> Result<()> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    log::info!("Listening on http://{bind}:{port}/");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Render a sequence of records as a standard fortune file.
pub fn fortune_format(texts: &[String]) -> String {
    texts.iter().map(|t| format!("{t}\n%\n")).collect()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn render_page(text: &str, position: usize) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>fortuned</title></head>\n\
         <body>\n<blockquote>{}</blockquote>\n<p><a href=\"/get/{position}\">#{position}</a></p>\n\
         </body>\n</html>\n",
        escape_html(text)
    )
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "no record\n").into_response()
}

fn internal_error(e: AppError) -> Response {
    log::error!("Request failed: {e}");
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error\n").into_response()
}

async fn home(State(service): AppState) -> Response {
    match service.pick_random().await {
        Ok(Some((text, position))) => Html(render_page(&text, position)).into_response(),
        Ok(None) => not_found(),
        Err(e) => internal_error(e),
    }
}

async fn get_random(State(service): AppState) -> Response {
    match service.pick(None).await {
        Ok(Some(text)) => format!("{text}\n").into_response(),
        Ok(None) => not_found(),
        Err(e) => internal_error(e),
    }
}

async fn get_at(State(service): AppState, Path(position): Path<usize>) -> Response {
    match service.pick_at(position).await {
        Ok(Some(text)) => format!("{text}\n").into_response(),
        Ok(None) => not_found(),
        Err(e) => internal_error(e),
    }
}

async fn fortune_all(State(service): AppState) -> Response {
    match service.dump(None).await {
        Ok(texts) => fortune_format(&texts).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn fortune_upto(State(service): AppState, Path(upto): Path<usize>) -> Response {
    match service.dump(Some(upto)).await {
        Ok(texts) => fortune_format(&texts).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn count(State(service): AppState) -> Response {
    match service.population().await {
        Ok(n) => format!("{n}\n").into_response(),
        Err(e) => internal_error(e),
    }
}
