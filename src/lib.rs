/*
 * lib.rs
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

//! Tesserae: an embeddable HTTP/1.1 and HTTP/2 server core.
//!
//! A caller builds a [`Router`], wraps it with a [`server::ServerConfig`] (plaintext
//! or TLS-terminated, in which case HTTP/2 is negotiated over ALPN), and runs a
//! [`server::Server`]. Route handlers are registered through [`Handler`] and
//! [`Param`]; the dispatcher binds declared parameters out of form/JSON bodies and
//! carries request cookies through to the response automatically.
//!
//! This crate never installs a global `tracing` subscriber — see [`logging`] for the
//! convenience the standalone binary uses.

pub mod dispatch;
pub mod error;
pub mod logging;
pub mod message;
pub mod protocol;
pub mod router;
pub mod server;
pub mod tls;

pub use dispatch::{ArgValue, BoundArgs, Dispatcher, Handler, HandlerReturn, Param, ParamKind};
pub use error::{H2Error, HttpError};
pub use message::{Body, CookieJar, Method, Morsel, Request, Response};
pub use protocol::http::{
    h1, h2, hpack, parse_request, serialize_response, H2Connection, H2Settings, CONNECTION_PREFACE,
    MAX_REQUEST_SIZE,
};
pub use router::{Lookup, Router, RouterBuilder};
pub use server::{Server, ServerConfig, DEFAULT_IDLE_TIMEOUT, DEFAULT_PORT};
pub use tls::TlsConfig;
