/*
newscast HTTP boundary: a Rocket server exposing briefing generation.
*/

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rocket::http::{ContentType, Header, Status};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{get, post, routes, State};
use serde::{Deserialize, Serialize};

use common::Config;

use crate::error::BriefingError;
use crate::pipeline::BriefingPipeline;

/// Application state stored inside Rocket managed state.
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub pipeline: Arc<BriefingPipeline>,
}

/// Request body for briefing generation.
#[derive(Deserialize)]
pub struct NewsRequest {
    pub topics: Vec<String>,
}

/// Response structure for `/api/v1/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
}

/// Audio payload served as a file attachment.
#[derive(rocket::Responder)]
pub struct AudioAttachment {
    bytes: Vec<u8>,
    content_type: ContentType,
    disposition: Header<'static>,
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

/// Status endpoint returning simple JSON with uptime.
#[get("/api/v1/status")]
async fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let uptime = (Utc::now() - state.started_at).num_seconds();
    Json(StatusResponse {
        status: "ok",
        uptime_seconds: uptime,
    })
}

/// Generate one audio briefing for the requested topics and return it as an
/// mp3 attachment. Pipeline errors surface as a JSON `detail` body.
#[post("/generate-news-audio", data = "<request>")]
async fn generate_news_audio(
    state: &State<AppState>,
    request: Json<NewsRequest>,
) -> Result<AudioAttachment, Custom<Json<serde_json::Value>>> {
    let artifact = state
        .pipeline
        .generate_briefing(&request.topics)
        .await
        .map_err(|e| {
            let status = match e {
                BriefingError::EmptyScript => Status::UnprocessableEntity,
                _ => Status::InternalServerError,
            };
            Custom(status, Json(serde_json::json!({ "detail": e.to_string() })))
        })?;

    let content_type =
        ContentType::parse_flexible(artifact.media_type).unwrap_or(ContentType::Binary);

    Ok(AudioAttachment {
        bytes: artifact.bytes,
        content_type,
        disposition: Header::new(
            "Content-Disposition",
            "attachment; filename=news-summary.mp3",
        ),
    })
}

/// Launch the Rocket server, merging bind address and port from the
/// `[server]` section of the configuration.
pub async fn launch_rocket(pipeline: Arc<BriefingPipeline>, config: &Config) -> Result<()> {
    let state = AppState {
        started_at: Utc::now(),
        pipeline,
    };

    let mut fig = rocket::Config::figment();
    if let Some(server) = &config.server {
        if let Some(bind) = &server.bind {
            fig = fig.merge(("address", bind.clone()));
        }
        if let Some(port) = server.port {
            fig = fig.merge(("port", port));
        }
    }

    tracing::info!("Starting Rocket HTTP server");
    rocket::custom(fig)
        .manage(state)
        .mount("/", routes![health, status, generate_news_audio])
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
