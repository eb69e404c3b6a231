use std::{convert::Infallible, net::SocketAddr};

use anyhow::Result;
use hyper::{
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server, StatusCode,
};
use tokio::sync::broadcast;

async fn serve(req: Request<Body>) -> Result<Response<Body>, hyper::http::Error> {
    if req.method() != Method::GET || req.uri().path() != "/metrics" {
        return Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::empty());
    }
    let mut buf = Vec::new();
    match relay_telemetry::metric::scrape(&mut buf) {
        Ok(()) => Response::builder()
            .status(StatusCode::OK)
            .header(
                hyper::header::CONTENT_TYPE,
                "application/openmetrics-text; version=1.0.0; charset=utf-8",
            )
            .body(Body::from(buf)),
        Err(err) => Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Body::from(err.to_string())),
    }
}

/// Serve `GET /metrics` until shutdown.
pub async fn start_metrics_server(
    listen_addr: SocketAddr,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let server = Server::try_bind(&listen_addr)?.serve(make_service_fn(|_| async {
        Ok::<_, Infallible>(service_fn(serve))
    }));
    log::info!("metrics server listening on http://{}", server.local_addr());
    server
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;
    log::info!("metrics server stopped");
    Ok(())
}
