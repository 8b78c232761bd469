//! HTTP routes.
//!
//! | Method | Path                        | Response                                 |
//! |--------|-----------------------------|------------------------------------------|
//! | `GET`  | `/streams/v1/index.json`    | Index over the default index streams     |
//! | `GET`  | `/streams/v1/index2.json`   | Index over every configured stream       |
//! | `GET`  | `/streams/v1/{slug}.json`   | Product catalog of one stream            |
//! | `GET`  | `/{stream-key}/{file}`      | Artifact download, optionally throttled  |
//!
//! Unknown streams, invalid paths and missing files are a bare `404`.
//! Generation failures are logged and answered with a bare `500`.

use crate::error::{Error, ErrorKind};
use crate::throttle::throttled;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use exn::{Exn, ResultExt};
use simplestreams_catalog::Generator;
use simplestreams_storage::error::ErrorKind as StorageErrorKind;
use std::ops::Deref;
use std::path::{Component, Path as StoragePath};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

const ARCHIVE_CONTENT_TYPE: &str = "application/tar+gzip";

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct AppState {
    generator: Arc<Generator>,
    /// Bytes per second.
    rate_limit: Option<u64>,
}
impl AppState {
    pub fn new(generator: Arc<Generator>, rate_limit: Option<u64>) -> Self {
        Self { generator, rate_limit }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/streams/v1/{document}", get(document))
        .route("/{stream}/{file}", get(download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

struct ApiError(Error);
impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &*self.0 {
            ErrorKind::NotFound => StatusCode::NOT_FOUND.into_response(),
            _ => {
                tracing::error!("{:?}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            },
        }
    }
}

fn not_found() -> ApiError {
    ApiError(Exn::from(ErrorKind::NotFound))
}

async fn document(State(state): State<AppState>, Path(document): Path<String>) -> ApiResult<Response> {
    let generator = &state.generator;
    let name = document.strip_suffix(".json").ok_or_else(not_found)?;
    let response = match name {
        "index" => {
            let index = generator.build_index(&generator.index_streams()).await.or_raise(|| ErrorKind::Generation)?;
            Json(index).into_response()
        },
        "index2" => {
            let streams: Vec<_> = generator.streams().collect();
            let index = generator.build_index(&streams).await.or_raise(|| ErrorKind::Generation)?;
            Json(index).into_response()
        },
        slug => {
            let stream = generator.stream_by_slug(slug).ok_or_else(not_found)?;
            let catalog = generator.build_catalog(stream).await.or_raise(|| ErrorKind::Generation)?;
            Json(catalog).into_response()
        },
    };
    Ok(response)
}

async fn download(
    State(state): State<AppState>,
    Path((stream, file)): Path<(String, String)>,
) -> ApiResult<Response> {
    let stream = state.generator.stream(&stream).ok_or_else(not_found)?;
    // Exactly one normal component: no traversal into sibling streams.
    let mut components = StoragePath::new(&file).components();
    if !matches!((components.next(), components.next()), (Some(Component::Normal(_)), None)) {
        return Err(not_found());
    }

    let path = stream.directory().join(&file);
    let backend = state.generator.backend();
    let info = match backend.stat(&path).await {
        Ok(info) if !info.is_dir() => info,
        Ok(_) => return Err(not_found()),
        Err(e) if matches!(e.deref(), StorageErrorKind::NotFound(_) | StorageErrorKind::InvalidPath(_)) => {
            return Err(not_found());
        },
        Err(e) => Err(e).or_raise(|| ErrorKind::Storage)?,
    };
    let reader = backend.open(&path).await.or_raise(|| ErrorKind::Storage)?;
    tracing::debug!(path = %path.display(), size = info.size, rate = ?state.rate_limit, "Sending artifact");

    let headers = [
        (header::CONTENT_TYPE, ARCHIVE_CONTENT_TYPE.to_string()),
        (header::CONTENT_LENGTH, info.size.to_string()),
    ];
    Ok((headers, Body::from_stream(throttled(reader, state.rate_limit))).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde_json::Value;
    use simplestreams_config::Config;
    use simplestreams_storage::backend::MockBackend;
    use tower::ServiceExt;

    const ARTIFACT: &str = "released/juju-2.9.42-linux-amd64.tgz";

    fn app(backend: MockBackend) -> Router {
        let generator = Generator::new(&Config::default(), Arc::new(backend)).unwrap();
        router(AppState::new(Arc::new(generator), None))
    }

    fn backend() -> MockBackend {
        MockBackend::with_files([
            (ARTIFACT, Vec::from(*b"tarball")),
            ("proposed/juju-3.0-rc1-linux-arm64.tgz", Vec::from(*b"proposed")),
        ])
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    async fn get_json(app: Router, uri: &str) -> Value {
        let (status, headers, body) = get(app, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_default_index() {
        let index = get_json(app(backend()), "/streams/v1/index.json").await;
        assert_eq!(index["format"], "index:1.0");
        let streams = index["index"].as_object().unwrap();
        assert_eq!(streams.keys().collect::<Vec<_>>(), vec!["com.ubuntu.juju:released:tools"]);
        assert_eq!(
            streams["com.ubuntu.juju:released:tools"]["products"],
            serde_json::json!(["com.ubuntu.juju:centos:amd64", "com.ubuntu.juju:ubuntu:amd64"])
        );
    }

    #[tokio::test]
    async fn test_full_index() {
        let index = get_json(app(backend()), "/streams/v1/index2.json").await;
        let streams = index["index"].as_object().unwrap();
        assert_eq!(streams.len(), 4);
        assert_eq!(
            streams["com.ubuntu.juju:proposed:tools"]["path"],
            "streams/v1/com.ubuntu.juju-proposed-tools.json"
        );
    }

    #[tokio::test]
    async fn test_catalog_by_slug() {
        let catalog = get_json(app(backend()), "/streams/v1/com.ubuntu.juju-released-tools.json").await;
        assert_eq!(catalog["content_id"], "com.ubuntu.juju:released:tools");
        let product = &catalog["products"]["com.ubuntu.juju:ubuntu:amd64"];
        let group = product["versions"].as_object().unwrap().values().next().unwrap();
        assert_eq!(group["items"]["2.9.42-ubuntu-amd64"]["path"], "released-tools/juju-2.9.42-linux-amd64.tgz");
        assert_eq!(group["items"]["2.9.42-ubuntu-amd64"]["size"], 7);
    }

    #[tokio::test]
    async fn test_unknown_documents() {
        for uri in [
            "/streams/v1/com.ubuntu.juju-nightly-tools.json",
            "/streams/v1/index.txt",
            "/streams/v1/released-tools.json",
        ] {
            let (status, _, body) = get(app(backend()), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn test_generation_failure_is_500() {
        let app = app(backend().with_failing(["released"]));
        let (status, _, body) = get(app, "/streams/v1/com.ubuntu.juju-released-tools.json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_download() {
        let (status, headers, body) = get(app(backend()), "/released-tools/juju-2.9.42-linux-amd64.tgz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], ARCHIVE_CONTENT_TYPE);
        assert_eq!(headers[header::CONTENT_LENGTH], "7");
        assert_eq!(body, b"tarball");
    }

    #[tokio::test]
    async fn test_download_not_found() {
        for uri in [
            "/nightly-tools/juju-2.9.42-linux-amd64.tgz",
            "/released-tools/juju-9.9.9-linux-amd64.tgz",
            "/released-tools/..%2Fproposed%2Fjuju-3.0-rc1-linux-arm64.tgz",
            "/released-tools/..",
            "/proposed-tools/juju-2.9.42-linux-amd64.tgz",
        ] {
            let (status, _, _) = get(app(backend()), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        }
    }
}
