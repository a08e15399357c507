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

//! HTTP/1.1 (RFC 7230, subset): request parser plus response serializer.

mod parser;
mod writer;

pub use parser::{parse_request, MAX_REQUEST_SIZE};
pub use writer::serialize_response;
