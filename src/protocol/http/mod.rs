/*
 * mod.rs
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

//! HTTP server wire protocol: HTTP/1.1, HTTP/2, and HPACK.
//!
//! No external `h2` crate — the frame parser/writer, the connection state machine,
//! and HPACK are implemented directly against RFC 7540/7541 rather than reaching
//! for one.

pub mod h1;
pub mod h2;
pub mod hpack;

pub use h1::{parse_request, serialize_response, MAX_REQUEST_SIZE};
pub use h2::{H2Connection, H2Settings, CONNECTION_PREFACE};
