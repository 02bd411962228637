// HTTP server module - accepts webhook deliveries and hands them to the pipeline

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, ALLOW, CONTENT_TYPE};
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::BrandingError;
use crate::pipeline::{BrandingPipeline, PipelineResponse};

pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Attach the permissive CORS headers every response carries
fn apply_cors(response: &mut Response<Full<Bytes>>) {
    let headers = response.headers_mut();
    headers.insert(
        http::header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        http::header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        http::header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
}

fn json_response(pipeline_response: &PipelineResponse) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(pipeline_response.to_json()));
    *response.status_mut() =
        StatusCode::from_u16(pipeline_response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn preflight_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}

/// Read the whole body, rejecting anything larger than `max_body_size`.
async fn read_body<B>(body: B, max_body_size: usize) -> Result<Bytes, BrandingError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, max_body_size).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(
            BrandingError::RejectedInput(format!(
                "Request body exceeds {} bytes",
                max_body_size
            )),
        ),
        Err(e) => Err(BrandingError::RejectedInput(format!(
            "Failed to read request body: {}",
            e
        ))),
    }
}

/// Route one request: OPTIONS preflight, POST to the pipeline, anything else 405.
///
/// The request path is not inspected.
pub async fn handle_request<B>(
    request: Request<B>,
    pipeline: &BrandingPipeline,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let span = tracing::info_span!("webhook", method = %method, request_id = %request_id);

    async move {
        let start = Instant::now();

        let mut response = match method {
            Method::OPTIONS => preflight_response(),
            Method::POST => {
                let max_body_size = pipeline.config().server.max_body_size;
                match read_body(request.into_body(), max_body_size).await {
                    Ok(body) => json_response(&pipeline.handle(&body).await),
                    Err(err) => {
                        tracing::warn!(error = %err, "Rejected request body");
                        json_response(&PipelineResponse::from_error(&err))
                    }
                }
            }
            other => {
                let err = BrandingError::MethodNotAllowed(other.to_string());
                tracing::warn!(error = %err, "Method not allowed");
                let mut response = json_response(&PipelineResponse::from_error(&err));
                response
                    .headers_mut()
                    .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
                response
            }
        };

        apply_cors(&mut response);
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        tracing::info!(
            status = response.status().as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );

        response
    }
    .instrument(span)
    .await
}

/// Accept connections until `shutdown` resolves.
///
/// Each connection is served on its own task; connections already accepted
/// are allowed to finish.
pub async fn serve<F>(
    listener: TcpListener,
    pipeline: Arc<BrandingPipeline>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(address = %addr, "Listening for webhook deliveries");
    }

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, remote_addr) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept connection");
                        continue;
                    }
                };

                let pipeline = pipeline.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |request| {
                        let pipeline = pipeline.clone();
                        async move { Ok::<_, Infallible>(handle_request(request, &pipeline).await) }
                    });

                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        tracing::debug!(remote = %remote_addr, error = %e, "Connection closed with error");
                    }
                });
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received, no longer accepting connections");
                break;
            }
        }
    }

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
