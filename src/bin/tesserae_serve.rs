/*
 * tesserae_serve.rs
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

//! Standalone demo host: wires a minimal router and runs the server. Stands in for
//! the external process the library itself never becomes — hot-reload, favicon
//! routes, and packaging are this binary's business, not the core's.

use std::process::ExitCode;

use tesserae::dispatch::{Handler, HandlerReturn, Param};
use tesserae::message::Response;
use tesserae::router::Router;
use tesserae::server::{Server, ServerConfig};

#[tokio::main]
async fn main() -> ExitCode {
    tesserae::logging::init_tracing();

    let router = Router::builder()
        .get(
            "/",
            Handler::sync(|_req, _args| HandlerReturn::Immediate(Response::text(200, "tesserae"))),
        )
        .get(
            "/favicon.ico",
            Handler::sync(|_req, _args| HandlerReturn::Immediate(Response::new(204))),
        )
        .post(
            "/echo",
            Handler::text(vec![Param::str("message")], |_req, args| {
                args.get("message")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string()
            }),
        )
        .build();

    let config = ServerConfig::default();
    let server = Server::new(config, router);

    match server.serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server exited with error");
            ExitCode::FAILURE
        }
    }
}
