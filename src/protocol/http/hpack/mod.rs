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

//! HPACK (RFC 7541): static table, dynamic table, Huffman coding, and the decoder/
//! encoder pair each HTTP/2 connection owns one of, per direction.

mod decoder;
mod encoder;
mod huffman;
mod static_table;

pub use decoder::{Decoder, Header, HeaderHandler};
pub use encoder::{encode_request_headers, Encoder};
pub use static_table::{STATIC_TABLE, STATIC_TABLE_SIZE};
