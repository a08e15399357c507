/*
 * scenarios.rs
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

//! End-to-end scenarios (S1-S6): the H1 codec exercised directly on in-memory
//! buffers, and the H2 connection FSM exercised over a `tokio::io::duplex` pair
//! with a peer that speaks the wire protocol through the same frame/HPACK types
//! the server uses.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

use tesserae::dispatch::{Dispatcher, Handler, HandlerReturn, Param};
use tesserae::h1;
use tesserae::h2::{H2Connection, H2FrameHandler, H2Parser, H2Writer, CONNECTION_PREFACE};
use tesserae::hpack::{encode_request_headers, Decoder, HeaderHandler};
use tesserae::message::Response;
use tesserae::router::Router;

fn echo_router() -> Router {
    Router::builder()
        .get(
            "/hello",
            Handler::sync(|_req, _args| HandlerReturn::Immediate(Response::text(200, "hi"))),
        )
        .get(
            "/x",
            Handler::sync(|_req, _args| HandlerReturn::Immediate(Response::text(200, "ok"))),
        )
        .post(
            "/add",
            Handler::text(vec![Param::str("a"), Param::str("b")], |_req, args| {
                let a = args.get("a").and_then(|v| v.as_str()).unwrap_or("");
                let b = args.get("b").and_then(|v| v.as_str()).unwrap_or("");
                format!("{a}{b}")
            }),
        )
        .get(
            "/",
            Handler::sync(|_req, _args| HandlerReturn::Immediate(Response::text(200, "test1"))),
        )
        .build()
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(echo_router()))
}

#[tokio::test]
async fn s1_h1_get_exact_route_returns_body() {
    let request = h1::parse_request(b"GET /hello HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
    let response = dispatcher().dispatch(&request).await;
    let bytes = h1::serialize_response(&response);
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("Content-Length: 2\r\n"));
    assert!(text.ends_with("\r\n\r\nhi"));
}

#[tokio::test]
async fn s2_h1_no_routes_is_404() {
    let router = Router::builder().build();
    let dispatcher = Dispatcher::new(Arc::new(router));
    let request = h1::parse_request(b"GET /nope HTTP/1.1\r\n\r\n").unwrap();
    let response = dispatcher.dispatch(&request).await;
    let bytes = h1::serialize_response(&response);
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.starts_with("HTTP/1.1 404 Not Found"));
}

#[tokio::test]
async fn s3_h1_wrong_method_is_405() {
    let request = h1::parse_request(b"POST /x HTTP/1.1\r\n\r\n").unwrap();
    let response = dispatcher().dispatch(&request).await;
    let bytes = h1::serialize_response(&response);
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.starts_with("HTTP/1.1 405 Method Not Allowed"));
}

#[tokio::test]
async fn s4_h1_form_body_binding_concatenates_args() {
    let raw = b"POST /add HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 7\r\n\r\na=1&b=2";
    let request = h1::parse_request(raw).unwrap();
    let response = dispatcher().dispatch(&request).await;
    assert_eq!(response.body.serialize(), b"12");
}

/// Collects the frame-level events this test cares about, ignoring the rest —
/// a client-side stand-in for `EventCollector` in the connection module, built
/// from the same public `H2FrameHandler` trait the server implements against.
#[derive(Default)]
struct ClientCollector {
    settings: Vec<(bool, Vec<(u16, u32)>)>,
    headers: Vec<(u32, bool, bool, Bytes)>,
    data: Vec<(u32, bool, Bytes)>,
}

impl H2FrameHandler for ClientCollector {
    fn data_frame_received(&mut self, stream_id: u32, end_stream: bool, data: Bytes) {
        self.data.push((stream_id, end_stream, data));
    }

    fn headers_frame_received(
        &mut self,
        stream_id: u32,
        end_stream: bool,
        end_headers: bool,
        _stream_dependency: u32,
        _exclusive: bool,
        _weight: u8,
        header_block_fragment: Bytes,
    ) {
        self.headers.push((stream_id, end_stream, end_headers, header_block_fragment));
    }

    fn priority_frame_received(&mut self, _stream_id: u32, _stream_dependency: u32, _exclusive: bool, _weight: u8) {}
    fn rst_stream_frame_received(&mut self, _stream_id: u32, _error_code: u32) {}

    fn settings_frame_received(&mut self, ack: bool, settings: Vec<(u16, u32)>) {
        self.settings.push((ack, settings));
    }

    fn push_promise_frame_received(
        &mut self,
        _stream_id: u32,
        _promised_stream_id: u32,
        _end_headers: bool,
        _header_block_fragment: Bytes,
    ) {
    }
    fn ping_frame_received(&mut self, _ack: bool, _opaque_data: u64) {}
    fn goaway_frame_received(&mut self, _last_stream_id: u32, _error_code: u32, _debug_data: Bytes) {}
    fn window_update_frame_received(&mut self, _stream_id: u32, _window_size_increment: u32) {}
    fn continuation_frame_received(&mut self, _stream_id: u32, _end_headers: bool, _header_block_fragment: Bytes) {}
    fn frame_error(&mut self, error_code: u32, stream_id: u32, message: String) {
        panic!("unexpected frame error {error_code:#x} on stream {stream_id}: {message}");
    }
}

/// Read from `client` until `collector` has accumulated at least `want_settings`
/// SETTINGS frames and `want_headers` HEADERS frames, or the deadline elapses.
async fn pump_until(
    client: &mut DuplexStream,
    parser: &mut H2Parser,
    collector: &mut ClientCollector,
    want_settings: usize,
    want_headers: usize,
    want_data: usize,
) {
    let mut buf = bytes::BytesMut::with_capacity(4096);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while collector.settings.len() < want_settings
        || collector.headers.len() < want_headers
        || collector.data.len() < want_data
    {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            panic!("timed out waiting for h2 frames from server");
        }
        let n = tokio::time::timeout(remaining, client.read_buf(&mut buf))
            .await
            .expect("read timed out")
            .expect("read failed");
        if n == 0 {
            panic!("server closed the connection before sending expected frames");
        }
        parser.receive(&mut buf, collector).expect("frame parse error");
    }
}

#[tokio::test]
async fn s5_h2_preface_and_settings_round_trip() {
    let (mut client, server) = tokio::io::duplex(16 * 1024);
    let dispatcher = Arc::new(dispatcher());
    tokio::spawn(async move {
        let _ = H2Connection::new(server, dispatcher).run().await;
    });

    client.write_all(CONNECTION_PREFACE).await.unwrap();
    let mut w = H2Writer::new();
    w.write_settings(&[]).unwrap();
    client.write_all(&w.take_buffer()).await.unwrap();

    let mut parser = H2Parser::new();
    let mut collector = ClientCollector::default();
    pump_until(&mut client, &mut parser, &mut collector, 2, 0, 0).await;

    assert!(collector.settings.iter().any(|(ack, _)| !ack), "expected a non-ACK SETTINGS frame from the server");
    assert!(collector.settings.iter().any(|(ack, _)| *ack), "expected a SETTINGS ACK frame from the server");
}

#[tokio::test]
async fn s6_h2_get_root_returns_status_and_body() {
    let (mut client, server) = tokio::io::duplex(16 * 1024);
    let dispatcher = Arc::new(dispatcher());
    tokio::spawn(async move {
        let _ = H2Connection::new(server, dispatcher).run().await;
    });

    client.write_all(CONNECTION_PREFACE).await.unwrap();

    let mut w = H2Writer::new();
    w.write_settings(&[]).unwrap();

    let mut header_block = bytes::BytesMut::new();
    encode_request_headers(
        &[
            (":method", "GET"),
            (":scheme", "https"),
            (":path", "/"),
            (":authority", "x"),
        ],
        &mut header_block,
    )
    .unwrap();
    w.write_headers(1, &header_block, true, true).unwrap();
    client.write_all(&w.take_buffer()).await.unwrap();

    let mut parser = H2Parser::new();
    let mut collector = ClientCollector::default();
    pump_until(&mut client, &mut parser, &mut collector, 0, 1, 1).await;

    let (stream_id, end_stream, end_headers, block) = &collector.headers[0];
    assert_eq!(*stream_id, 1);
    assert!(!end_stream, "response HEADERS must not carry END_STREAM when a body follows");
    assert!(end_headers);

    struct StatusCollector(Option<String>);
    impl HeaderHandler for StatusCollector {
        fn header(&mut self, name: &str, value: &str) {
            if name == ":status" {
                self.0 = Some(value.to_string());
            }
        }
    }
    let mut decoder = Decoder::new(4096);
    let mut status = StatusCollector(None);
    let mut cursor = &block[..];
    decoder.decode(&mut cursor, &mut status).unwrap();
    assert_eq!(status.0.as_deref(), Some("200"));

    let (data_stream_id, end_stream, payload) = &collector.data[0];
    assert_eq!(*data_stream_id, 1);
    assert!(end_stream);
    assert_eq!(&payload[..], b"test1");
}
