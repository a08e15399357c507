/*
 * router.rs
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

//! URI+method → handler router. Literal paths hit a `HashMap` fast path; everything
//! else falls through to an ordered list of compiled regexes, tried in registration order.
//!
//! Ported from the source's `RouteRecord` (a `UserDict` with a sidecar regex dict): the
//! dual literal/regex storage becomes a single `Vec<Entry>` plus a literal index, per
//! the "Route record with dual literal/regex storage" design note.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use regex::Regex;

use crate::dispatch::Handler;
use crate::error::HttpError;
use crate::message::Method;

enum Matcher {
    Exact(String),
    Regex(Regex),
}

struct Entry {
    matcher: Matcher,
    handler: Arc<Handler>,
    methods: HashSet<String>,
}

/// Default alphabet for a path pattern supplied without its own anchors, matching the
/// source's historical `URI = r'/?[0-9a-zA-Z]*?/?'` default.
const DEFAULT_PATTERN_ALPHABET: &str = "[0-9a-zA-Z/]*";

/// Process-wide route table. Built once via [`RouterBuilder`], then wrapped in
/// an `Arc` and shared read-only across every connection task.
pub struct Router {
    literal_index: HashMap<String, usize>,
    entries: Vec<Entry>,
}

/// What a successful lookup, or a method mismatch, returns to the dispatcher.
pub enum Lookup<'a> {
    Found {
        handler: &'a Arc<Handler>,
        allowed_methods: &'a HashSet<String>,
    },
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Literal map probed first; on miss, regex entries tried in registration order
    /// and the first full match wins. Patterns are anchored at both ends.
    pub fn find(&self, method: &Method, uri: &str) -> Result<Lookup<'_>, HttpError> {
        let path = uri.split('?').next().unwrap_or(uri);

        let entry = if let Some(&idx) = self.literal_index.get(path) {
            Some(&self.entries[idx])
        } else {
            self.entries
                .iter()
                .find(|e| matches!(&e.matcher, Matcher::Regex(re) if re.is_match(path)))
        };

        let entry = entry.ok_or(HttpError::NotFound)?;
        if !entry.methods.contains(method.as_str()) {
            return Err(HttpError::MethodNotAllowed);
        }
        Ok(Lookup::Found {
            handler: &entry.handler,
            allowed_methods: &entry.methods,
        })
    }
}

/// Builds a [`Router`]. Registration ordering matters for regex entries: later
/// registrations never shadow earlier ones.
pub struct RouterBuilder {
    literal_index: HashMap<String, usize>,
    entries: Vec<Entry>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self {
            literal_index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Register `path` (literal or regex pattern) for one or more methods.
    ///
    /// A path is treated as a literal when it contains none of `.*+?()[]{}|^$\`;
    /// otherwise it is compiled as a regex, anchored at both ends (leading `^` and
    /// trailing `$` appended when absent, so a pattern can't match a prefix or
    /// suffix of an unrelated path).
    pub fn route(
        mut self,
        methods: impl IntoIterator<Item = Method>,
        path: impl AsRef<str>,
        handler: Handler,
    ) -> Self {
        let path = path.as_ref();
        let methods: HashSet<String> = methods.into_iter().map(|m| m.as_str().to_string()).collect();
        let handler = Arc::new(handler);

        if is_literal_path(path) {
            let idx = self.entries.len();
            self.entries.push(Entry {
                matcher: Matcher::Exact(path.to_string()),
                handler,
                methods,
            });
            self.literal_index.insert(path.to_string(), idx);
        } else {
            let pattern = anchor_pattern(path);
            let re = Regex::new(&pattern)
                .unwrap_or_else(|e| panic!("invalid route pattern {:?}: {}", path, e));
            self.entries.push(Entry {
                matcher: Matcher::Regex(re),
                handler,
                methods,
            });
        }
        self
    }

    pub fn get(self, path: impl AsRef<str>, handler: Handler) -> Self {
        self.route([Method::Get], path, handler)
    }

    pub fn post(self, path: impl AsRef<str>, handler: Handler) -> Self {
        self.route([Method::Post], path, handler)
    }

    pub fn put(self, path: impl AsRef<str>, handler: Handler) -> Self {
        self.route([Method::Put], path, handler)
    }

    pub fn delete(self, path: impl AsRef<str>, handler: Handler) -> Self {
        self.route([Method::Delete], path, handler)
    }

    pub fn patch(self, path: impl AsRef<str>, handler: Handler) -> Self {
        self.route([Method::Patch], path, handler)
    }

    pub fn build(self) -> Router {
        Router {
            literal_index: self.literal_index,
            entries: self.entries,
        }
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn is_literal_path(path: &str) -> bool {
    !path.contains(['.', '*', '+', '?', '(', ')', '[', ']', '{', '}', '|', '^', '$', '\\'])
}

/// Anchor a bare pattern at both ends. A pattern with no recognizable body (empty after
/// stripping anchors) falls back to the source's default alphabet.
fn anchor_pattern(path: &str) -> String {
    let body = if path.is_empty() {
        DEFAULT_PATTERN_ALPHABET
    } else {
        path
    };
    let needs_start = !body.starts_with('^');
    let needs_end = !body.ends_with('$');
    let mut out = String::with_capacity(body.len() + 2);
    if needs_start {
        out.push('^');
    }
    out.push_str(body);
    if needs_end {
        out.push('$');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::HandlerReturn;
    use crate::message::Response;

    fn noop_handler() -> Handler {
        Handler::sync(|_req, _args| HandlerReturn::Immediate(Response::text(200, "ok")))
    }

    #[test]
    fn literal_route_matches_exactly() {
        let router = Router::builder().get("/hello", noop_handler()).build();
        assert!(matches!(
            router.find(&Method::Get, "/hello"),
            Ok(Lookup::Found { .. })
        ));
        assert!(matches!(
            router.find(&Method::Get, "/nope"),
            Err(HttpError::NotFound)
        ));
    }

    #[test]
    fn method_not_allowed_when_path_matches_but_method_does_not() {
        let router = Router::builder().get("/x", noop_handler()).build();
        assert!(matches!(
            router.find(&Method::Post, "/x"),
            Err(HttpError::MethodNotAllowed)
        ));
    }

    #[test]
    fn regex_route_is_full_match_anchored() {
        let router = Router::builder()
            .get(r"/items/\d+", noop_handler())
            .build();
        assert!(matches!(
            router.find(&Method::Get, "/items/42"),
            Ok(Lookup::Found { .. })
        ));
        // Not a full match: trailing garbage must not match due to end anchor.
        assert!(matches!(
            router.find(&Method::Get, "/items/42/extra"),
            Err(HttpError::NotFound)
        ));
    }

    #[test]
    fn earlier_regex_registration_is_not_shadowed_by_later_one() {
        let router = Router::builder()
            .get(r"/items/1", noop_handler())
            .get(r"/items/\d+", noop_handler())
            .build();
        // Both entries match "/items/1"; registration order picks the first.
        assert!(matches!(
            router.find(&Method::Get, "/items/1"),
            Ok(Lookup::Found { .. })
        ));
    }

    #[test]
    fn literal_fast_path_is_probed_before_regex_entries() {
        let router = Router::builder()
            .get(r"/items/\d+", noop_handler())
            .get("/items/1", noop_handler())
            .build();
        // Registered second, but literal map wins the probe regardless of order.
        assert!(matches!(
            router.find(&Method::Get, "/items/1"),
            Ok(Lookup::Found { .. })
        ));
    }

    #[test]
    fn query_string_is_stripped_before_matching() {
        let router = Router::builder().get("/search", noop_handler()).build();
        assert!(matches!(
            router.find(&Method::Get, "/search?q=rust"),
            Ok(Lookup::Found { .. })
        ));
    }
}
