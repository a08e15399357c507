/*
 * message.rs
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

//! The generic message model: header set with a sidecar cookie jar, tagged body
//! variants, and the Request/Response wrappers the dispatcher and codecs pass around.

use std::collections::BTreeMap;
use std::fmt;

/// HTTP request method. `Other` covers methods the distilled spec does not special-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    Other(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
            Method::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Method {
        match s {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            "PATCH" => Method::Patch,
            other => Method::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `Set-Cookie`/`Cookie` entry. Only name/value are modeled: attributes
/// (`Path`, `HttpOnly`, ...) are outside the distilled spec's scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Morsel {
    pub name: String,
    pub value: String,
}

/// Cookie jar: serializes/deserializes separately from the header map because the
/// `Cookie` header uses its own grammar (`name=value; name2=value2`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    morsels: Vec<Morsel>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.morsels.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.morsels
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.morsels.iter().any(|m| m.name == name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(m) = self.morsels.iter_mut().find(|m| m.name == name) {
            m.value = value;
        } else {
            self.morsels.push(Morsel { name, value });
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.morsels.iter().map(|m| (m.name.as_str(), m.value.as_str()))
    }

    /// Parse a `Cookie: a=1; b=2` header value into a jar.
    pub fn parse(value: &str) -> CookieJar {
        let mut jar = CookieJar::new();
        for part in value.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some((name, value)) = part.split_once('=') {
                jar.set(name.trim(), value.trim());
            }
        }
        jar
    }

    /// Serialize as a request `Cookie` header value (used only if a client path needs it).
    pub fn to_cookie_header(&self) -> String {
        self.morsels
            .iter()
            .map(|m| format!("{}={}", m.name, m.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Serialize as one `Set-Cookie` line per morsel, CRLF-terminated, for response output.
    pub fn to_set_cookie_lines(&self) -> String {
        let mut out = String::new();
        for m in &self.morsels {
            out.push_str("Set-Cookie: ");
            out.push_str(&m.name);
            out.push('=');
            out.push_str(&m.value);
            out.push_str("\r\n");
        }
        out
    }
}

/// An ordered, case-insensitive-lookup header map. Insertion order is preserved
/// for serialization; lookups normalize to lowercase without allocating the stored key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Insert, replacing an existing value for the same (case-insensitive) name in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Append without deduplicating — used for multi-value headers during parse.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Tagged request/response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    FormUrlEncoded { fields: BTreeMap<String, String> },
    Json { value: serde_json::Value },
    Raw { bytes: Vec<u8> },
    None,
}

impl Body {
    /// True for `None` and for form/JSON bodies carrying no keys.
    pub fn is_empty(&self) -> bool {
        match self {
            Body::None => true,
            Body::FormUrlEncoded { fields } => fields.is_empty(),
            Body::Json { value } => value.is_null(),
            Body::Raw { bytes } => bytes.is_empty(),
        }
    }

    /// The key→value map used for handler argument binding: FormUrlEncoded
    /// fields directly, or a JSON object's string-valued top-level keys.
    pub fn as_bindable_map(&self) -> BTreeMap<String, String> {
        match self {
            Body::FormUrlEncoded { fields } => fields.clone(),
            Body::Json {
                value: serde_json::Value::Object(map),
            } => map
                .iter()
                .map(|(k, v)| (k.clone(), json_scalar_to_string(v)))
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Body::None => Vec::new(),
            Body::Raw { bytes } => bytes.clone(),
            Body::FormUrlEncoded { fields } => fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&")
                .into_bytes(),
            Body::Json { value } => serde_json::to_vec(value).unwrap_or_default(),
        }
    }
}

fn json_scalar_to_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// An HTTP request: start line (method, URI, version), headers, cookies, and body.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub uri: String,
    pub version: String,
    pub headers: HeaderSet,
    pub cookies: CookieJar,
    pub body: Body,
}

impl Request {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            version: "HTTP/1.1".to_string(),
            headers: HeaderSet::new(),
            cookies: CookieJar::new(),
            body: Body::None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.uri.is_empty() && self.headers.is_empty() && self.body.is_empty()
    }
}

/// An HTTP response: version, status code, reason phrase, headers, cookies, and body.
#[derive(Debug, Clone)]
pub struct Response {
    pub version: String,
    pub status: u16,
    pub reason: String,
    pub headers: HeaderSet,
    pub cookies: CookieJar,
    pub body: Body,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            version: "HTTP/1.1".to_string(),
            status,
            reason: reason_phrase(status).to_string(),
            headers: HeaderSet::new(),
            cookies: CookieJar::new(),
            body: Body::None,
        }
    }

    pub fn with_reason(status: u16, reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            ..Self::new(status)
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        let mut r = Self::new(status);
        r.body = Body::Raw {
            bytes: body.into().into_bytes(),
        };
        r
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Canonical reason phrase for the status codes this crate emits.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Request Entity Too Large",
        414 => "URI Too Long",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_set_is_case_insensitive() {
        let mut h = HeaderSet::new();
        h.set("Content-Type", "text/plain");
        assert_eq!(h.get("content-type"), Some("text/plain"));
        assert_eq!(h.get("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn header_set_preserves_insertion_order() {
        let mut h = HeaderSet::new();
        h.set("B", "2");
        h.set("A", "1");
        let names: Vec<&str> = h.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn header_set_replaces_in_place() {
        let mut h = HeaderSet::new();
        h.set("A", "1");
        h.set("B", "2");
        h.set("A", "3");
        let values: Vec<&str> = h.iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec!["3", "2"]);
    }

    #[test]
    fn cookie_jar_parses_multiple_pairs() {
        let jar = CookieJar::parse("a=1; b=2");
        assert_eq!(jar.get("a"), Some("1"));
        assert_eq!(jar.get("b"), Some("2"));
    }

    #[test]
    fn body_is_empty_uses_corrected_predicate() {
        assert!(Body::None.is_empty());
        assert!(Body::FormUrlEncoded {
            fields: BTreeMap::new()
        }
        .is_empty());
        let mut fields = BTreeMap::new();
        fields.insert("a".to_string(), "1".to_string());
        assert!(!Body::FormUrlEncoded { fields }.is_empty());
    }

    #[test]
    fn body_bindable_map_from_form() {
        let mut fields = BTreeMap::new();
        fields.insert("a".to_string(), "1".to_string());
        fields.insert("b".to_string(), "2".to_string());
        let body = Body::FormUrlEncoded { fields };
        let map = body.as_bindable_map();
        assert_eq!(map.get("a").map(|s| s.as_str()), Some("1"));
        assert_eq!(map.get("b").map(|s| s.as_str()), Some("2"));
    }

    #[test]
    fn body_bindable_map_from_json_object() {
        let value: serde_json::Value = serde_json::json!({"a": 1, "b": "2"});
        let body = Body::Json { value };
        let map = body.as_bindable_map();
        assert_eq!(map.get("a").map(|s| s.as_str()), Some("1"));
        assert_eq!(map.get("b").map(|s| s.as_str()), Some("2"));
    }
}
