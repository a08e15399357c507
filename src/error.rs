/*
 * error.rs
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

//! HTTP error taxonomy: each variant carries its own status code so the H1 and
//! H2 pipelines can both turn a domain error into a response without a side table.

use thiserror::Error;

/// Domain errors raised by the router, codecs, or dispatcher, each mapped to an HTTP status.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("request URI too long")]
    UriTooLong,

    #[error("request entity too large")]
    RequestEntityTooLarge,

    #[error("internal server error: {0}")]
    InternalServerError(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl HttpError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            HttpError::BadRequest(_) => 400,
            HttpError::Unauthorized => 401,
            HttpError::NotFound => 404,
            HttpError::MethodNotAllowed => 405,
            HttpError::UriTooLong => 414,
            HttpError::RequestEntityTooLarge => 413,
            HttpError::InternalServerError(_) => 500,
            HttpError::NotImplemented(_) => 501,
        }
    }

    /// Reason phrase matching `status_code()`.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            HttpError::BadRequest(_) => "Bad Request",
            HttpError::Unauthorized => "Unauthorized",
            HttpError::NotFound => "Not Found",
            HttpError::MethodNotAllowed => "Method Not Allowed",
            HttpError::UriTooLong => "URI Too Long",
            HttpError::RequestEntityTooLarge => "Request Entity Too Large",
            HttpError::InternalServerError(_) => "Internal Server Error",
            HttpError::NotImplemented(_) => "Not Implemented",
        }
    }
}

pub type Result<T> = std::result::Result<T, HttpError>;

/// HTTP/2 connection-level error codes (RFC 7540 §7), used by the frame codec and FSM.
#[derive(Debug, Error)]
pub enum H2Error {
    #[error("stream {stream_id} error {code:#x}: {message}")]
    Stream {
        stream_id: u32,
        code: u32,
        message: String,
    },
    #[error("connection error {code:#x}: {message}")]
    Connection { code: u32, message: String },
}

impl H2Error {
    pub fn stream(stream_id: u32, code: u32, message: impl Into<String>) -> Self {
        H2Error::Stream {
            stream_id,
            code,
            message: message.into(),
        }
    }

    pub fn connection(code: u32, message: impl Into<String>) -> Self {
        H2Error::Connection {
            code,
            message: message.into(),
        }
    }
}
