// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! HTTP liveness listener

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioIo, TokioTimer};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::error::Result;

pub const GREETING: &str = "Hello World !!!";
pub const HEALTHY: &str = "Server is ready and healthy";

const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Bind the listener; the caller only starts syncing once this succeeded
#[instrument]
pub async fn bind(address: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(address).await?;
    info!("Server is listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accept connections until `cancel` fires or accepting fails
pub async fn serve(listener: TcpListener, cancel: CancellationToken) -> Result<()> {
    loop {
        let (stream, peer) = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            accepted = listener.accept() => accepted?,
        };

        tokio::spawn(handle_connection(TokioIo::new(stream), peer));
    }
}

async fn handle_connection(io: TokioIo<tokio::net::TcpStream>, peer: SocketAddr) {
    let service = service_fn(|req: Request<hyper::body::Incoming>| async move {
        Ok::<_, Infallible>(route(&req))
    });

    if let Err(e) = http1::Builder::new()
        .timer(TokioTimer::new())
        .header_read_timeout(HEADER_READ_TIMEOUT)
        .serve_connection(io, service)
        .await
    {
        debug!("Connection from {} ended with error: {}", peer, e);
    }
}

/// Answer a request by path, regardless of method
pub fn route<B>(req: &Request<B>) -> Response<Full<Bytes>> {
    match req.uri().path() {
        "/" => text(StatusCode::OK, GREETING),
        "/healthz" => text(StatusCode::OK, HEALTHY),
        _ => text(StatusCode::NOT_FOUND, "404 page not found"),
    }
}

fn text(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
