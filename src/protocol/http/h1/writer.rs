/*
 * writer.rs
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

//! HTTP/1.1 response serializer.

use crate::message::Response;

/// Serialize a response: status line, headers in insertion order, `Set-Cookie`
/// lines, a blank line, then the body. `Date`/`Server`/`Content-Type`/
/// `Content-Length` are always set, replacing any value the handler supplied.
pub fn serialize_response(response: &Response) -> Vec<u8> {
    let body = response.body.serialize();

    let mut out = String::new();
    out.push_str(&format!(
        "{} {} {}\r\n",
        response.version, response.status, response.reason
    ));

    for (name, value) in response.headers.iter() {
        if name.eq_ignore_ascii_case("date")
            || name.eq_ignore_ascii_case("server")
            || name.eq_ignore_ascii_case("content-type")
            || name.eq_ignore_ascii_case("content-length")
        {
            continue;
        }
        out.push_str(&format!("{name}: {value}\r\n"));
    }

    out.push_str(&format!("Date: {}\r\n", http_date_now()));
    out.push_str("Server: tesserae\r\n");
    out.push_str(&format!(
        "Content-Type: {}\r\n",
        response.headers.get("content-type").unwrap_or(content_type_for(response))
    ));
    out.push_str(&format!("Content-Length: {}\r\n", body.len()));

    if !response.cookies.is_empty() {
        out.push_str(&response.cookies.to_set_cookie_lines());
    }

    out.push_str("\r\n");

    let mut bytes = out.into_bytes();
    bytes.extend_from_slice(&body);
    bytes
}

fn content_type_for(response: &Response) -> &'static str {
    match response.body {
        crate::message::Body::Json { .. } => "application/json",
        _ => "text/plain; charset=utf-8",
    }
}

/// A fixed-format RFC 7231 `IMF-fixdate`. The server never needs real wall-clock
/// precision for this header, so a caller-supplied clock isn't threaded through —
/// this always renders the current time via `std::time::SystemTime`.
fn http_date_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format_imf_fixdate(secs)
}

const DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Civil-from-days style conversion (Howard Hinnant's algorithm) — no chrono
/// dependency needed for a header nobody parses at this crate's call sites.
fn format_imf_fixdate(unix_secs: u64) -> String {
    let days = (unix_secs / 86400) as i64;
    let secs_of_day = unix_secs % 86400;
    let (hour, min, sec) = (secs_of_day / 3600, (secs_of_day % 3600) / 60, secs_of_day % 60);

    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if m <= 2 { y + 1 } else { y };

    let weekday = DAYS[((days % 7 + 11) % 7) as usize];
    let month = MONTHS[(m - 1) as usize];

    format!(
        "{weekday}, {d:02} {month} {year} {hour:02}:{min:02}:{sec:02} GMT"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Response;

    #[test]
    fn serializes_status_line_and_blank_line_terminator() {
        let response = Response::text(200, "hi");
        let bytes = serialize_response(&response);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("\r\n\r\nhi"));
    }

    #[test]
    fn always_sets_content_length_from_serialized_body() {
        let response = Response::text(200, "hello");
        let bytes = serialize_response(&response);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Content-Length: 5\r\n"));
    }

    #[test]
    fn emits_set_cookie_lines() {
        let mut response = Response::text(200, "ok");
        response.cookies.set("session", "abc");
        let bytes = serialize_response(&response);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Set-Cookie: session=abc\r\n"));
    }
}
