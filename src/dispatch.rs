/*
 * dispatch.rs
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

//! Handler registration and dispatch.
//!
//! The source binds arguments by introspecting an arbitrary callable's `inspect.signature`
//! at request time. Rust has no such reflection, so per the "Dynamic parameter binding"
//! design note this is re-architected as a declared parameter schema captured once, at
//! registration time, and consulted on every request.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::HttpError;
use crate::message::{Body, Request, Response};
use crate::router::{Lookup, Router};

/// Declared type for one handler parameter, used to coerce the matching body value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Str,
    Int,
    Json,
}

/// One declared handler parameter: a name to match against body keys, plus its kind.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
}

impl Param {
    pub fn str(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            kind: ParamKind::Str,
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            kind: ParamKind::Int,
        }
    }

    pub fn json(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            kind: ParamKind::Json,
        }
    }
}

/// A coerced argument value, ready to hand to a handler body.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Json(serde_json::Value),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

/// Arguments bound for one dispatch: declared parameters present in the body, by name.
#[derive(Debug, Clone, Default)]
pub struct BoundArgs {
    values: BTreeMap<String, ArgValue>,
}

impl BoundArgs {
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }
}

/// Tagged handler return (the "Handler polymorphism" design note): a handler either
/// answers immediately or returns a pending future the dispatcher awaits.
pub enum HandlerReturn {
    Immediate(Response),
    Pending(BoxFuture<'static, Response>),
}

type HandlerFn = dyn Fn(&Request, &BoundArgs) -> HandlerReturn + Send + Sync;

/// A registered route target: declared parameter schema plus the callable itself.
pub struct Handler {
    wants_request: bool,
    params: Vec<Param>,
    func: Box<HandlerFn>,
}

impl Handler {
    /// A handler with no declared parameters beyond an optional `request`.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&Request, &BoundArgs) -> HandlerReturn + Send + Sync + 'static,
    {
        Handler {
            wants_request: false,
            params: Vec::new(),
            func: Box::new(f),
        }
    }

    /// A handler that wants the parsed request bound to a `request` parameter.
    pub fn with_request<F>(f: F) -> Self
    where
        F: Fn(&Request, &BoundArgs) -> HandlerReturn + Send + Sync + 'static,
    {
        Handler {
            wants_request: true,
            params: Vec::new(),
            func: Box::new(f),
        }
    }

    /// A handler with a declared body-argument schema.
    pub fn with_params<F>(params: Vec<Param>, f: F) -> Self
    where
        F: Fn(&Request, &BoundArgs) -> HandlerReturn + Send + Sync + 'static,
    {
        Handler {
            wants_request: false,
            params,
            func: Box::new(f),
        }
    }

    /// Convenience: a synchronous handler returning plain text, wrapped as a `Raw` body
    /// with status 200.
    pub fn text<F>(params: Vec<Param>, f: F) -> Self
    where
        F: Fn(&Request, &BoundArgs) -> String + Send + Sync + 'static,
    {
        Handler::with_params(params, move |req, args| {
            HandlerReturn::Immediate(Response::text(200, f(req, args)))
        })
    }

    /// Convenience: an async handler returning plain text, boxed into `HandlerReturn::Pending`.
    pub fn text_async<F, Fut>(params: Vec<Param>, f: Arc<F>) -> Self
    where
        F: Fn(Request, BoundArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = String> + Send + 'static,
    {
        Handler::with_params(params, move |req, args| {
            let f = f.clone();
            let req = req.clone();
            let args = args.clone();
            let fut: Pin<Box<dyn Future<Output = Response> + Send>> = Box::pin(async move {
                Response::text(200, f(req, args).await)
            });
            HandlerReturn::Pending(fut)
        })
    }
}

/// Router lookup, argument binding, invocation, cookie carryover.
pub struct Dispatcher {
    router: Arc<Router>,
}

impl Dispatcher {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    pub async fn dispatch(&self, request: &Request) -> Response {
        match self.dispatch_inner(request).await {
            Ok(response) => response,
            Err(e) => error_response(&e),
        }
    }

    async fn dispatch_inner(&self, request: &Request) -> Result<Response, HttpError> {
        let (handler, params, wants_request) = {
            let Lookup::Found {
                handler,
                allowed_methods: _,
            } = self.router.find(&request.method, &request.uri)?;
            (handler.clone(), handler.params.clone(), handler.wants_request)
        };

        let args = bind_args(&params, &request.body)?;
        let _ = wants_request; // request is always passed to the handler closure itself

        let mut response = match (handler.func)(request, &args) {
            HandlerReturn::Immediate(r) => r,
            HandlerReturn::Pending(fut) => fut.await,
        };

        carry_over_cookies(request, &mut response);
        Ok(response)
    }
}

/// Bind each declared parameter to a matching body key, coerced to its declared kind.
/// Missing parameters remain unbound; unexpected body keys are dropped.
fn bind_args(params: &[Param], body: &Body) -> Result<BoundArgs, HttpError> {
    let map = body.as_bindable_map();
    let mut values = BTreeMap::new();
    for param in params {
        let Some(raw) = map.get(&param.name) else {
            continue;
        };
        let value = match param.kind {
            ParamKind::Str => ArgValue::Str(raw.clone()),
            ParamKind::Int => {
                let n: i64 = raw.parse().map_err(|_| {
                    HttpError::InternalServerError(format!(
                        "parameter {:?} expected an integer, got {:?}",
                        param.name, raw
                    ))
                })?;
                ArgValue::Int(n)
            }
            ParamKind::Json => {
                let v: serde_json::Value = serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.clone()));
                ArgValue::Json(v)
            }
        };
        values.insert(param.name.clone(), value);
    }
    Ok(BoundArgs { values })
}

/// Turn a domain error into the response the H1/H2 pipelines actually send.
pub fn error_response(err: &HttpError) -> Response {
    Response::with_reason(err.status_code(), err.reason_phrase())
}

/// Every morsel present in the request's jar but absent from the response's jar
/// is copied into the response.
fn carry_over_cookies(request: &Request, response: &mut Response) {
    for (name, value) in request.cookies.iter() {
        if !response.cookies.contains(name) {
            response.cookies.set(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Method;
    use std::collections::BTreeMap as Map;

    fn form_body(pairs: &[(&str, &str)]) -> Body {
        let mut fields = Map::new();
        for (k, v) in pairs {
            fields.insert(k.to_string(), v.to_string());
        }
        Body::FormUrlEncoded { fields }
    }

    #[tokio::test]
    async fn dispatch_binds_form_fields_by_name() {
        let router = Router::builder()
            .post(
                "/add",
                Handler::text(vec![Param::int("a"), Param::int("b")], |_req, args| {
                    let a = args.get("a").and_then(|v| v.as_int()).unwrap_or(0);
                    let b = args.get("b").and_then(|v| v.as_int()).unwrap_or(0);
                    (a + b).to_string()
                }),
            )
            .build();
        let dispatcher = Dispatcher::new(Arc::new(router));
        let mut req = Request::new(Method::Post, "/add");
        req.body = form_body(&[("a", "1"), ("b", "2")]);

        let response = dispatcher.dispatch(&req).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body.serialize(), b"3");
    }

    #[tokio::test]
    async fn dispatch_maps_router_miss_to_404() {
        let router = Router::builder().build();
        let dispatcher = Dispatcher::new(Arc::new(router));
        let req = Request::new(Method::Get, "/nope");
        let response = dispatcher.dispatch(&req).await;
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn dispatch_carries_over_unset_cookies() {
        let router = Router::builder()
            .get("/x", Handler::text(vec![], |_req, _args| "ok".to_string()))
            .build();
        let dispatcher = Dispatcher::new(Arc::new(router));
        let mut req = Request::new(Method::Get, "/x");
        req.cookies.set("session", "abc123");

        let response = dispatcher.dispatch(&req).await;
        assert_eq!(response.cookies.get("session"), Some("abc123"));
    }

    #[tokio::test]
    async fn dispatch_int_coercion_failure_becomes_internal_server_error() {
        let router = Router::builder()
            .post(
                "/n",
                Handler::text(vec![Param::int("a")], |_req, _args| "ignored".to_string()),
            )
            .build();
        let dispatcher = Dispatcher::new(Arc::new(router));
        let mut req = Request::new(Method::Post, "/n");
        req.body = form_body(&[("a", "not-a-number")]);
        let response = dispatcher.dispatch(&req).await;
        assert_eq!(response.status, 500);
    }
}
