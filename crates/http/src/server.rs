//! Axum routes serving a node's groups to its peers

use crate::pool::HttpPool;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use meshcache_core::Error;
use std::sync::Arc;
use tracing::{debug, warn};

pub(crate) fn router(pool: Arc<HttpPool>) -> Router {
    let path = format!("{}:group/:key", pool.config().base_path);
    Router::new().route(&path, get(get_value)).with_state(pool)
}

/// `GET {base_path}{group}/{key}`: the value as octet-stream bytes.
///
/// The group lookup and read-through run on a blocking thread; the
/// core cache is synchronous and a miss may stall on a loader.
async fn get_value(
    State(pool): State<Arc<HttpPool>>,
    Path((group, key)): Path<(String, String)>,
) -> Response {
    debug!(%group, %key, "peer request");

    let Some(group_handle) = pool.registry().group(&group) else {
        return (StatusCode::NOT_FOUND, format!("no such group: {group}")).into_response();
    };

    let request_key = key.clone();
    let result = tokio::task::spawn_blocking(move || group_handle.get(&request_key)).await;

    match result {
        Ok(Ok(snapshot)) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            snapshot.to_vec(),
        )
            .into_response(),
        Ok(Err(err @ Error::InvalidKey { .. })) => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Ok(Err(err)) => {
            warn!(%group, %key, %err, "load failed while serving peer");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
        Err(join_err) => {
            warn!(%group, %key, %join_err, "load task panicked");
            (StatusCode::INTERNAL_SERVER_ERROR, "load task failed").into_response()
        }
    }
}
