//! Local web server for the thumbnail form.
//!
//! Serves the single-page form and the JSON API it calls. Gateway work runs
//! on spawned tasks, so a client that disconnects mid-request does not leave
//! the form stuck in a loading state.

use crate::models::{
    ErrorResponse, ImageRequest, ImageResponse, PromptEdit, PromptRequest, PromptResponse,
};
use crate::studio::ThumbnailStudio;
use crate::{Error, Result};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

const INDEX_HTML: &str = include_str!("../static/index.html");
const MAX_BODY_BYTES: u64 = 64 * 1024;

/// All routes, with rejections recovered into JSON error replies.
pub fn routes(
    studio: Arc<ThumbnailStudio>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let with_studio = warp::any().map(move || studio.clone());

    let index = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::html(INDEX_HTML));

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| "Server is running");

    let state_route = warp::path!("api" / "state")
        .and(warp::get())
        .and(with_studio.clone())
        .and_then(get_state);

    let prompt_route = warp::path!("api" / "prompt")
        .and(warp::post())
        .and(with_studio.clone())
        .and(json_body::<PromptRequest>())
        .and_then(generate_prompt);

    let edit_route = warp::path!("api" / "prompt")
        .and(warp::put())
        .and(with_studio.clone())
        .and(json_body::<PromptEdit>())
        .and_then(edit_prompt);

    let image_route = warp::path!("api" / "image")
        .and(warp::post())
        .and(with_studio)
        .and(json_body::<ImageRequest>())
        .and_then(generate_image);

    index
        .or(health)
        .or(state_route)
        .or(prompt_route)
        .or(edit_route)
        .or(image_route)
        .recover(handle_rejection)
        .with(warp::log("thumbnail_strategist::http"))
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(studio: Arc<ThumbnailStudio>, addr: SocketAddr) -> Result<()> {
    serve_with_shutdown(studio, addr, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    })
    .await
}

pub async fn serve_with_shutdown<S>(
    studio: Arc<ThumbnailStudio>,
    addr: SocketAddr,
    shutdown: S,
) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let (bound, server) =
        warp::serve(routes(studio)).try_bind_with_graceful_shutdown(addr, shutdown)?;
    info!("Thumbnail form available at http://{}", bound);
    server.await;
    info!("Server stopped");
    Ok(())
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Busy(_) => StatusCode::CONFLICT,
        Error::Gateway(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_reply(status: StatusCode, message: String) -> Response {
    warp::reply::with_status(
        warp::reply::json(&ErrorResponse { error: message }),
        status,
    )
    .into_response()
}

fn reply_for<T: serde::Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(body) => warp::reply::json(&body).into_response(),
        Err(e) => {
            let status = status_for(&e);
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                error!("Request failed: {}", e);
            }
            error_reply(status, e.to_string())
        }
    }
}

async fn get_state(studio: Arc<ThumbnailStudio>) -> std::result::Result<Response, Infallible> {
    Ok(warp::reply::json(&studio.snapshot().await).into_response())
}

async fn generate_prompt(
    studio: Arc<ThumbnailStudio>,
    body: PromptRequest,
) -> std::result::Result<Response, Infallible> {
    let outcome =
        tokio::spawn(async move { studio.request_prompt(&body.title, &body.keywords).await })
            .await;
    let result = outcome
        .map_err(Error::from)
        .and_then(|r| r)
        .map(|prompt| PromptResponse { prompt });
    Ok(reply_for(result))
}

async fn edit_prompt(
    studio: Arc<ThumbnailStudio>,
    body: PromptEdit,
) -> std::result::Result<Response, Infallible> {
    Ok(warp::reply::json(&studio.edit_prompt(&body.prompt).await).into_response())
}

async fn generate_image(
    studio: Arc<ThumbnailStudio>,
    body: ImageRequest,
) -> std::result::Result<Response, Infallible> {
    let outcome = tokio::spawn(async move { studio.request_image(&body.prompt).await }).await;
    let result = outcome
        .map_err(Error::from)
        .and_then(|r| r)
        .map(|image_url| ImageResponse { image_url });
    Ok(reply_for(result))
}

async fn handle_rejection(err: Rejection) -> std::result::Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", e),
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large".to_string(),
        )
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected a JSON body".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(error_reply(status, message))
}
