/*
 * parser.rs
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

//! HTTP/1.1 request parser. Parses a single bounded buffer in one pass: the
//! connection reads up to `MAX_REQUEST_SIZE` bytes, then this module splits head
//! from body on the first `\r\n\r\n` and builds a complete `Request`.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::HttpError;
use crate::message::{Body, CookieJar, HeaderSet, Method, Request};

/// Bound on the initial read; a request head plus body exceeding this is rejected
/// as `RequestEntityTooLarge`.
pub const MAX_REQUEST_SIZE: usize = 8000;

fn header_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\S+?):\s*(.+)$").expect("static header regex"))
}

/// Parse one HTTP/1.1 request out of `buf`. `buf` must already be bounded to
/// `MAX_REQUEST_SIZE` bytes by the caller; this function does not read further.
pub fn parse_request(buf: &[u8]) -> Result<Request, HttpError> {
    if buf.len() > MAX_REQUEST_SIZE {
        return Err(HttpError::RequestEntityTooLarge);
    }

    let head_end = find_double_crlf(buf)
        .ok_or_else(|| HttpError::BadRequest("request head missing terminating blank line".into()))?;
    let head = std::str::from_utf8(&buf[..head_end])
        .map_err(|_| HttpError::BadRequest("request head is not valid UTF-8".into()))?;
    let body_bytes = &buf[head_end + 4..];

    let mut lines = head.split("\r\n");
    let start_line = lines
        .next()
        .ok_or_else(|| HttpError::BadRequest("missing request line".into()))?;
    let (method, uri, version) = parse_start_line(start_line)?;
    if uri.len() > MAX_REQUEST_SIZE {
        return Err(HttpError::UriTooLong);
    }

    let mut headers = HeaderSet::new();
    let mut cookies = CookieJar::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let Some(caps) = header_line_re().captures(line) else {
            continue;
        };
        let name = &caps[1];
        let value = &caps[2];
        if name.eq_ignore_ascii_case("cookie") {
            for (k, v) in CookieJar::parse(value).iter() {
                cookies.set(k, v);
            }
        } else {
            headers.append(name, value);
        }
    }

    if headers.contains("transfer-encoding") {
        return Err(HttpError::NotImplemented("chunked transfer-encoding".into()));
    }

    if let Some(raw_len) = headers.get("content-length") {
        let declared: usize = raw_len
            .trim()
            .parse()
            .map_err(|_| HttpError::BadRequest("Content-Length is not a valid integer".into()))?;
        if declared != body_bytes.len() {
            return Err(HttpError::BadRequest(
                "Content-Length disagrees with observed body size".into(),
            ));
        }
    }

    let body = select_request_body(&headers, body_bytes)?;

    let mut request = Request::new(method, uri);
    request.version = version;
    request.headers = headers;
    request.cookies = cookies;
    request.body = body;
    Ok(request)
}

fn parse_start_line(line: &str) -> Result<(Method, String, String), HttpError> {
    let mut parts = line.splitn(3, ' ');
    let method = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HttpError::BadRequest("missing request method".into()))?;
    let uri = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HttpError::BadRequest("missing request target".into()))?;
    let version = parts.next().unwrap_or("HTTP/1.1");
    Ok((Method::parse(method), uri.to_string(), version.to_string()))
}

/// Body selection table: request-direction rows only, since this module never
/// parses a response.
fn select_request_body(headers: &HeaderSet, body_bytes: &[u8]) -> Result<Body, HttpError> {
    match headers.get("content-type") {
        None => {
            let text = String::from_utf8_lossy(body_bytes);
            Ok(Body::FormUrlEncoded {
                fields: parse_form_urlencoded(&text),
            })
        }
        Some(ct) if ct.starts_with("application/json") => {
            if body_bytes.is_empty() {
                Ok(Body::Json { value: serde_json::Value::Null })
            } else {
                let value = serde_json::from_slice(body_bytes)
                    .map_err(|e| HttpError::BadRequest(format!("invalid JSON body: {e}")))?;
                Ok(Body::Json { value })
            }
        }
        Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
            let text = String::from_utf8_lossy(body_bytes);
            Ok(Body::FormUrlEncoded {
                fields: parse_form_urlencoded(&text),
            })
        }
        Some(other) => Err(HttpError::BadRequest(format!("unsupported Content-Type: {other}"))),
    }
}

fn parse_form_urlencoded(text: &str) -> std::collections::BTreeMap<String, String> {
    let mut fields = std::collections::BTreeMap::new();
    for pair in text.split('&') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((k, v)) => {
                fields.insert(urldecode(k), urldecode(v));
            }
            None => {
                fields.insert(urldecode(pair), String::new());
            }
        }
    }
    fields
}

fn urldecode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(bytes[i]);
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn find_double_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_get_with_no_body() {
        let raw = b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let req = parse_request(raw).unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.uri, "/hello");
        assert_eq!(req.headers.get("host"), Some("example.com"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn routes_cookie_header_into_jar_not_headers() {
        let raw = b"GET /x HTTP/1.1\r\nCookie: a=1; b=2\r\n\r\n";
        let req = parse_request(raw).unwrap();
        assert!(!req.headers.contains("cookie"));
        assert_eq!(req.cookies.get("a"), Some("1"));
        assert_eq!(req.cookies.get("b"), Some("2"));
    }

    #[test]
    fn parses_form_urlencoded_body() {
        let raw = b"POST /add HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 7\r\n\r\na=1&b=2";
        let req = parse_request(raw).unwrap();
        match req.body {
            Body::FormUrlEncoded { fields } => {
                assert_eq!(fields.get("a").map(|s| s.as_str()), Some("1"));
                assert_eq!(fields.get("b").map(|s| s.as_str()), Some("2"));
            }
            _ => panic!("expected FormUrlEncoded body"),
        }
    }

    #[test]
    fn parses_json_body() {
        let raw = b"POST /j HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 11\r\n\r\n{\"a\":\"one\"}";
        let req = parse_request(raw).unwrap();
        match req.body {
            Body::Json { value } => assert_eq!(value["a"], "one"),
            _ => panic!("expected Json body"),
        }
    }

    #[test]
    fn content_length_mismatch_is_bad_request() {
        let raw = b"POST /x HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 99\r\n\r\na=1";
        let err = parse_request(raw).unwrap_err();
        assert!(matches!(err, HttpError::BadRequest(_)));
    }

    #[test]
    fn transfer_encoding_is_not_implemented() {
        let raw = b"POST /x HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n";
        let err = parse_request(raw).unwrap_err();
        assert!(matches!(err, HttpError::NotImplemented(_)));
    }

    #[test]
    fn oversized_buffer_is_entity_too_large() {
        let mut raw = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n".to_vec();
        raw.extend(std::iter::repeat(b'a').take(MAX_REQUEST_SIZE));
        let err = parse_request(&raw).unwrap_err();
        assert!(matches!(err, HttpError::RequestEntityTooLarge));
    }

    #[test]
    fn incomplete_head_is_bad_request() {
        let raw = b"GET / HTTP/1.1\r\nHost: x";
        let err = parse_request(raw).unwrap_err();
        assert!(matches!(err, HttpError::BadRequest(_)));
    }
}
