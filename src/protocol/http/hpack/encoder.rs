/*
 * encoder.rs
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

//! HPACK encoder (RFC 7541). Encodes header lists using static table indexing,
//! Huffman encoding, and a dynamic table mirroring the decoder's bookkeeping, so a
//! response's stable headers (`:status`, `content-type`, `server`, ...) emitted
//! across many streams on one connection get indexed after their first appearance.

use std::collections::VecDeque;
use std::io;

use bytes::BufMut;

use super::huffman;
use super::static_table::{STATIC_TABLE, STATIC_TABLE_SIZE};

struct DynEntry {
    name: String,
    value: String,
}

/// Stateful HPACK encoder: one per HTTP/2 connection, one direction.
pub struct Encoder {
    dynamic_table: VecDeque<DynEntry>,
    max_size: usize,
}

impl Encoder {
    pub fn new(max_size: usize) -> Self {
        Self {
            dynamic_table: VecDeque::new(),
            max_size,
        }
    }

    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        self.evict_to(max_size);
    }

    /// Encode response headers: `:status` first (as the source always orders it),
    /// then the remaining headers in the order supplied.
    pub fn encode_response_headers(
        &mut self,
        status: u16,
        headers: &[(&str, &str)],
        out: &mut impl BufMut,
    ) -> io::Result<()> {
        let status_str = status.to_string();
        self.encode_header(":status", &status_str, out)?;
        for &(name, value) in headers {
            self.encode_header(name, value, out)?;
        }
        Ok(())
    }

    /// Encode one header, consulting the static table, then this encoder's own
    /// dynamic table, before falling back to a literal-with-incremental-indexing
    /// representation (so the next occurrence on this connection can be indexed).
    pub fn encode_header(&mut self, name: &str, value: &str, out: &mut impl BufMut) -> io::Result<()> {
        if let Some(idx) = find_static_exact(name, value) {
            encode_indexed(idx, out);
            return Ok(());
        }
        if let Some(idx) = self.find_dynamic_exact(name, value) {
            encode_indexed(STATIC_TABLE_SIZE + idx, out);
            return Ok(());
        }
        if let Some(idx) = find_static_name(name) {
            encode_literal_with_indexing(idx, value.as_bytes(), out)?;
        } else if let Some(idx) = self.find_dynamic_name(name) {
            encode_literal_with_indexing(STATIC_TABLE_SIZE + idx, value.as_bytes(), out)?;
        } else {
            encode_literal_new_name_with_indexing(name.as_bytes(), value.as_bytes(), out)?;
        }
        self.add_to_dynamic(name.to_string(), value.to_string());
        Ok(())
    }

    fn find_dynamic_exact(&self, name: &str, value: &str) -> Option<usize> {
        self.dynamic_table
            .iter()
            .position(|e| e.name == name && e.value == value)
    }

    fn find_dynamic_name(&self, name: &str) -> Option<usize> {
        self.dynamic_table.iter().position(|e| e.name == name)
    }

    fn add_to_dynamic(&mut self, name: String, value: String) {
        let entry_size = name.len() + value.len() + 32;
        while self.dynamic_size() + entry_size > self.max_size && !self.dynamic_table.is_empty() {
            self.dynamic_table.pop_back();
        }
        if self.dynamic_size() + entry_size <= self.max_size {
            self.dynamic_table.push_front(DynEntry { name, value });
        }
    }

    fn dynamic_size(&self) -> usize {
        self.dynamic_table
            .iter()
            .map(|e| e.name.len() + e.value.len() + 32)
            .sum()
    }

    fn evict_to(&mut self, max: usize) {
        while self.dynamic_size() > max && !self.dynamic_table.is_empty() {
            self.dynamic_table.pop_back();
        }
    }
}

/// Stateless encode of a request header list, with no dynamic table — kept for
/// one-shot encodes (tests, and any caller that never amortizes across a connection).
pub fn encode_request_headers(headers: &[(&str, &str)], out: &mut impl BufMut) -> io::Result<()> {
    for &(name, value) in headers {
        if let Some(idx) = find_static_exact(name, value) {
            encode_indexed(idx, out);
        } else if let Some(idx) = find_static_name(name) {
            encode_literal_without_indexing(idx, value.as_bytes(), out)?;
        } else {
            encode_literal_new_name(name.as_bytes(), value.as_bytes(), out)?;
        }
    }
    Ok(())
}

fn find_static_exact(name: &str, value: &str) -> Option<usize> {
    STATIC_TABLE
        .iter()
        .position(|&(n, v)| n == name && v == Some(value))
}

fn find_static_name(name: &str) -> Option<usize> {
    STATIC_TABLE.iter().position(|&(n, _)| n == name)
}

/// Indexed header field (RFC 7541 6.1): 1-bit prefix + 7-bit index.
fn encode_indexed(index: usize, out: &mut impl BufMut) {
    encode_integer(index as u64, 7, 0x80, out);
}

/// Literal with incremental indexing, name from table index (RFC 7541 6.2.1).
/// Prefix: 01, 6-bit index for name.
fn encode_literal_with_indexing(name_index: usize, value: &[u8], out: &mut impl BufMut) -> io::Result<()> {
    encode_integer(name_index as u64, 6, 0x40, out);
    encode_string_huffman(value, out);
    Ok(())
}

/// Literal with incremental indexing, new name (RFC 7541 6.2.1).
fn encode_literal_new_name_with_indexing(name: &[u8], value: &[u8], out: &mut impl BufMut) -> io::Result<()> {
    out.put_u8(0x40);
    encode_string_huffman(name, out);
    encode_string_huffman(value, out);
    Ok(())
}

/// Literal without indexing, name from static table index (RFC 7541 6.2.2).
/// Prefix: 0000, 4-bit index for name.
fn encode_literal_without_indexing(name_index: usize, value: &[u8], out: &mut impl BufMut) -> io::Result<()> {
    encode_integer(name_index as u64, 4, 0x00, out);
    encode_string_huffman(value, out);
    Ok(())
}

/// Literal without indexing, new name (RFC 7541 6.2.2).
fn encode_literal_new_name(name: &[u8], value: &[u8], out: &mut impl BufMut) -> io::Result<()> {
    out.put_u8(0x00);
    encode_string_huffman(name, out);
    encode_string_huffman(value, out);
    Ok(())
}

/// Encode a string with Huffman if it saves space, plain otherwise.
fn encode_string_huffman(s: &[u8], out: &mut impl BufMut) {
    let huff_len = huffman::encoded_length(s);
    if huff_len < s.len() {
        let encoded = huffman::encode(s);
        encode_integer(encoded.len() as u64, 7, 0x80, out);
        out.put_slice(&encoded);
    } else {
        encode_integer(s.len() as u64, 7, 0x00, out);
        out.put_slice(s);
    }
}

fn encode_integer(mut value: u64, nbits: u8, prefix: u8, out: &mut impl BufMut) {
    let max_prefix = (1u64 << nbits) - 1;
    if value < max_prefix {
        out.put_u8(prefix | value as u8);
        return;
    }
    out.put_u8(prefix | max_prefix as u8);
    value -= max_prefix;
    while value >= 128 {
        out.put_u8(0x80 | (value % 128) as u8);
        value /= 128;
    }
    out.put_u8(value as u8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::http::hpack::{Decoder, HeaderHandler};

    struct CollectHeaders(Vec<(String, String)>);
    impl HeaderHandler for CollectHeaders {
        fn header(&mut self, name: &str, value: &str) {
            self.0.push((name.to_string(), value.to_string()));
        }
    }

    fn roundtrip_headers(input: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut buf = bytes::BytesMut::new();
        encode_request_headers(input, &mut buf).unwrap();
        let mut decoder = Decoder::new(4096);
        let mut collector = CollectHeaders(Vec::new());
        let mut cursor = &buf[..];
        decoder.decode(&mut cursor, &mut collector).unwrap();
        collector.0
    }

    #[test]
    fn roundtrip_get_request() {
        let headers = &[
            (":method", "GET"),
            (":scheme", "https"),
            (":authority", "example.com"),
            (":path", "/"),
        ];
        let decoded = roundtrip_headers(headers);
        assert_eq!(decoded.len(), 4);
        assert_eq!(decoded[0], (":method".into(), "GET".into()));
        assert_eq!(decoded[1], (":scheme".into(), "https".into()));
        assert_eq!(decoded[2], (":authority".into(), "example.com".into()));
        assert_eq!(decoded[3], (":path".into(), "/".into()));
    }

    #[test]
    fn static_table_exact_match_uses_indexed() {
        let mut buf = bytes::BytesMut::new();
        encode_request_headers(&[(":method", "GET")], &mut buf).unwrap();
        assert_eq!(buf[0], 0x82);
    }

    #[test]
    fn stateful_encoder_response_roundtrip() {
        let mut encoder = Encoder::new(4096);
        let mut buf = bytes::BytesMut::new();
        encoder
            .encode_response_headers(200, &[("content-type", "text/plain")], &mut buf)
            .unwrap();

        let mut decoder = Decoder::new(4096);
        let mut collector = CollectHeaders(Vec::new());
        let mut cursor = &buf[..];
        decoder.decode(&mut cursor, &mut collector).unwrap();
        assert_eq!(collector.0[0], (":status".into(), "200".into()));
        assert_eq!(collector.0[1], ("content-type".into(), "text/plain".into()));
    }

    #[test]
    fn stateful_encoder_indexes_repeated_header_on_second_call() {
        let mut encoder = Encoder::new(4096);
        let mut first = bytes::BytesMut::new();
        encoder
            .encode_response_headers(200, &[("content-type", "text/plain")], &mut first)
            .unwrap();

        let mut second = bytes::BytesMut::new();
        encoder
            .encode_response_headers(200, &[("content-type", "text/plain")], &mut second)
            .unwrap();

        // Both headers are now in the dynamic table, so the second block should be
        // all indexed header fields (high bit set on every leading byte).
        assert_ne!(first, second);
        let mut cursor = &second[..];
        while !cursor.is_empty() {
            let b = cursor[0];
            assert!(b & 0x80 != 0, "expected indexed representation, got {:#x}", b);
            cursor = &cursor[1..];
        }
    }

    #[test]
    fn encode_integer_at_max_prefix() {
        let mut buf = bytes::BytesMut::new();
        encode_integer(127, 7, 0x00, &mut buf);
        assert_eq!(buf[0], 0x7f);
        assert_eq!(buf[1], 0);
    }
}
