/*
 * server.rs
 * Copyright (C) 2026 the Tesserae authors
 *
 * This file is part of Tesserae, an embeddable HTTP/1.1 and HTTP/2 server core.
 *
 * Tesserae is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Tesserae is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Tesserae.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Connection acceptor: binds a listener, spawns one tokio task per accepted
//! connection, and picks HTTP/1.1 vs HTTP/2 by ALPN when TLS is configured,
//! plaintext HTTP/1.1 otherwise (HTTP/2 without prior TLS negotiation, "h2c", is
//! out of scope — see DESIGN.md).

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

use crate::dispatch::Dispatcher;
use crate::error::HttpError;
use crate::protocol::http::{h1, H2Connection};
use crate::router::Router;
use crate::tls::TlsConfig;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8000;
/// Default idle watchdog, applied to the initial read of a plaintext HTTP/1.1
/// connection.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything the acceptor needs, separate from the router so a `ServerConfig`
/// can be constructed before the route table is finalized.
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub tls: Option<TlsConfig>,
    pub idle_timeout: Duration,
}

impl ServerConfig {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            tls: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(([0, 0, 0, 0], DEFAULT_PORT).into())
    }
}

/// Owns the listener and the shared, read-only state every connection task
/// borrows: `Arc<Router>` (via the dispatcher) and `Arc<ServerConfig>` only.
pub struct Server {
    config: Arc<ServerConfig>,
    dispatcher: Arc<Dispatcher>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    pub fn new(config: ServerConfig, router: Router) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(Dispatcher::new(Arc::new(router))),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Bind and serve until `shutdown()` is called or the listener errors.
    pub async fn serve(&self) -> io::Result<()> {
        let listener = TcpListener::bind(self.config.addr).await?;
        tracing::info!(addr = %self.config.addr, "listening");

        let acceptor = match &self.config.tls {
            Some(tls) => Some(tls.build_acceptor()?),
            None => None,
        };

        let mut shutdown_rx = self.shutdown_rx.clone();
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = accepted?;
                    let dispatcher = self.dispatcher.clone();
                    let config = self.config.clone();
                    let acceptor = acceptor.clone();
                    let shutdown_rx = self.shutdown_rx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer, acceptor, config, dispatcher, shutdown_rx).await {
                            tracing::warn!(peer = %peer, error = %e, "connection ended with error");
                        }
                    });
                }
                _ = shutdown_rx.changed() => {
                    tracing::info!("shutdown requested, no longer accepting connections");
                    return Ok(());
                }
            }
        }
    }

    /// Signal the accept loop to stop. In-flight connections run to completion
    /// (GOAWAY is sent by each HTTP/2 connection's own error/close path).
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    acceptor: Option<tokio_rustls::TlsAcceptor>,
    config: Arc<ServerConfig>,
    dispatcher: Arc<Dispatcher>,
    shutdown_rx: watch::Receiver<bool>,
) -> io::Result<()> {
    let _ = stream.set_nodelay(true);

    match acceptor {
        Some(acceptor) => {
            let tls_stream = acceptor.accept(stream).await?;
            let is_h2 = tls_stream
                .get_ref()
                .1
                .alpn_protocol()
                .map(|p| p == b"h2")
                .unwrap_or(false);
            if is_h2 {
                tracing::debug!(peer = %peer, "negotiated h2 over TLS");
                H2Connection::new(tls_stream, dispatcher)
                    .with_shutdown(shutdown_rx)
                    .run()
                    .await
                    .map_err(h2_to_io)
            } else {
                tracing::debug!(peer = %peer, "negotiated http/1.1 over TLS");
                serve_h1(tls_stream, &config, &dispatcher).await
            }
        }
        None => serve_h1(stream, &config, &dispatcher).await,
    }
}

/// One request per connection: read up to `MAX_REQUEST_SIZE` bytes bounded by
/// the idle watchdog, parse, dispatch, write the response, close. Persistent
/// connections and keep-alive pipelining are not supported.
async fn serve_h1<S>(
    mut stream: S,
    config: &ServerConfig,
    dispatcher: &Dispatcher,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = Vec::with_capacity(4096);
    let read = tokio::time::timeout(config.idle_timeout, read_request_head(&mut stream, &mut buf))
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "idle watchdog expired"))??;
    if !read {
        return Ok(());
    }

    let response = match h1::parse_request(&buf) {
        Ok(request) => dispatcher.dispatch(&request).await,
        Err(e) => error_response(&e),
    };

    let bytes = h1::serialize_response(&response);
    stream.write_all(&bytes).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Read until the request head's blank line is seen, the body (per Content-Length)
/// is fully buffered, or `MAX_REQUEST_SIZE` is exceeded. Returns `false` on a clean
/// EOF with nothing read (idle connection closing).
async fn read_request_head<S: AsyncRead + Unpin>(stream: &mut S, buf: &mut Vec<u8>) -> io::Result<bool> {
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(!buf.is_empty());
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > h1::MAX_REQUEST_SIZE {
            return Ok(true);
        }
        if find_double_crlf(buf).is_some() {
            return Ok(true);
        }
    }
}

fn find_double_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn error_response(err: &HttpError) -> crate::message::Response {
    crate::message::Response::with_reason(err.status_code(), err.reason_phrase())
}

fn h2_to_io(e: crate::error::H2Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}
