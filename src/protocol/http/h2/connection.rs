/*
 * connection.rs
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

//! HTTP/2 connection FSM: preface, settings exchange, per-stream state table,
//! flow control, and request delivery into the dispatcher.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{mpsc, watch};

use crate::dispatch::Dispatcher;
use crate::error::H2Error;
use crate::message::{Body, HeaderSet, Method, Request, Response};

use super::frame::*;
use super::handler::H2FrameHandler;
use super::parser::H2Parser;
use super::stream::{PseudoHeaders, Stream, StreamState};
use super::writer::H2Writer;
use super::CONNECTION_PREFACE;
use crate::protocol::http::hpack::{Decoder as HpackDecoder, Encoder as HpackEncoder, HeaderHandler};

const DEFAULT_HEADER_TABLE_SIZE: usize = 4096;
const DEFAULT_INITIAL_WINDOW_SIZE: i64 = 65535;
/// How long a connection keeps serving in-flight streams after graceful shutdown
/// sends GOAWAY, before force-closing.
const SHUTDOWN_GRACE_PERIOD: std::time::Duration = std::time::Duration::from_secs(5);

/// Negotiated SETTINGS values, one side's worth.
#[derive(Debug, Clone, Copy)]
pub struct H2Settings {
    pub header_table_size: usize,
    pub max_concurrent_streams: u32,
    pub initial_window_size: i64,
    pub max_frame_size: usize,
    pub max_header_list_size: u32,
}

impl Default for H2Settings {
    fn default() -> Self {
        Self {
            header_table_size: DEFAULT_HEADER_TABLE_SIZE,
            max_concurrent_streams: 128,
            initial_window_size: DEFAULT_INITIAL_WINDOW_SIZE,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            max_header_list_size: 16384,
        }
    }
}

impl H2Settings {
    fn as_wire_pairs(&self) -> Vec<(u16, u32)> {
        vec![
            (SETTINGS_HEADER_TABLE_SIZE, self.header_table_size as u32),
            (SETTINGS_MAX_CONCURRENT_STREAMS, self.max_concurrent_streams),
            (SETTINGS_INITIAL_WINDOW_SIZE, self.initial_window_size as u32),
            (SETTINGS_MAX_FRAME_SIZE, self.max_frame_size as u32),
            (SETTINGS_MAX_HEADER_LIST_SIZE, self.max_header_list_size),
        ]
    }
}

enum FrameEvent {
    Data { stream_id: u32, end_stream: bool, data: Bytes },
    Headers { stream_id: u32, end_stream: bool, end_headers: bool, header_block: Bytes },
    Priority,
    RstStream { stream_id: u32 },
    Settings { ack: bool, settings: Vec<(u16, u32)> },
    PushPromise,
    Ping { ack: bool, opaque_data: u64 },
    GoAway,
    WindowUpdate { stream_id: u32, increment: u32 },
    Continuation { stream_id: u32, end_headers: bool, header_block: Bytes },
    FrameError { error_code: u32, stream_id: u32, message: String },
}

#[derive(Default)]
struct EventCollector(Vec<FrameEvent>);

impl H2FrameHandler for EventCollector {
    fn data_frame_received(&mut self, stream_id: u32, end_stream: bool, data: Bytes) {
        self.0.push(FrameEvent::Data { stream_id, end_stream, data });
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
        self.0.push(FrameEvent::Headers {
            stream_id,
            end_stream,
            end_headers,
            header_block: header_block_fragment,
        });
    }

    fn priority_frame_received(&mut self, _stream_id: u32, _stream_dependency: u32, _exclusive: bool, _weight: u8) {
        // Priority is stored, never enforced (Non-goal: priority trees beyond storage).
        self.0.push(FrameEvent::Priority);
    }

    fn rst_stream_frame_received(&mut self, stream_id: u32, _error_code: u32) {
        self.0.push(FrameEvent::RstStream { stream_id });
    }

    fn settings_frame_received(&mut self, ack: bool, settings: Vec<(u16, u32)>) {
        self.0.push(FrameEvent::Settings { ack, settings });
    }

    fn push_promise_frame_received(
        &mut self,
        _stream_id: u32,
        _promised_stream_id: u32,
        _end_headers: bool,
        _header_block_fragment: Bytes,
    ) {
        self.0.push(FrameEvent::PushPromise);
    }

    fn ping_frame_received(&mut self, ack: bool, opaque_data: u64) {
        self.0.push(FrameEvent::Ping { ack, opaque_data });
    }

    fn goaway_frame_received(&mut self, _last_stream_id: u32, _error_code: u32, _debug_data: Bytes) {
        self.0.push(FrameEvent::GoAway);
    }

    fn window_update_frame_received(&mut self, stream_id: u32, window_size_increment: u32) {
        self.0.push(FrameEvent::WindowUpdate {
            stream_id,
            increment: window_size_increment,
        });
    }

    fn continuation_frame_received(&mut self, stream_id: u32, end_headers: bool, header_block_fragment: Bytes) {
        self.0.push(FrameEvent::Continuation {
            stream_id,
            end_headers,
            header_block: header_block_fragment,
        });
    }

    fn frame_error(&mut self, error_code: u32, stream_id: u32, message: String) {
        self.0.push(FrameEvent::FrameError { error_code, stream_id, message });
    }
}

struct HeaderCollector {
    pseudo: PseudoHeaders,
    headers: HeaderSet,
}

impl HeaderHandler for HeaderCollector {
    fn header(&mut self, name: &str, value: &str) {
        match name {
            ":method" => self.pseudo.method = Some(Method::parse(value)),
            ":scheme" => self.pseudo.scheme = Some(value.to_string()),
            ":path" => self.pseudo.path = Some(value.to_string()),
            ":authority" => self.pseudo.authority = Some(value.to_string()),
            _ => self.headers.append(name, value),
        }
    }
}

/// Accumulates HEADERS + CONTINUATION fragments for the one stream allowed to have
/// an "open header block" at a time.
struct OpenHeaderBlock {
    stream_id: u32,
    end_stream: bool,
    buf: BytesMut,
}

/// Drives one HTTP/2 connection end to end: reads frames, maintains the stream
/// table and flow-control windows, and invokes the dispatcher on complete requests.
pub struct H2Connection<IO> {
    io: IO,
    parser: H2Parser,
    decoder: HpackDecoder,
    encoder: HpackEncoder,
    local_settings: H2Settings,
    peer_settings: H2Settings,
    streams: HashMap<u32, Stream>,
    conn_recv_window: i64,
    conn_send_window: i64,
    highest_processed_stream: u32,
    open_header_block: Option<OpenHeaderBlock>,
    dispatcher: Arc<Dispatcher>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<IO> H2Connection<IO>
where
    IO: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(io: IO, dispatcher: Arc<Dispatcher>) -> Self {
        let local_settings = H2Settings::default();
        Self {
            io,
            parser: H2Parser::new(),
            decoder: HpackDecoder::new(local_settings.header_table_size),
            encoder: HpackEncoder::new(DEFAULT_HEADER_TABLE_SIZE),
            peer_settings: H2Settings::default(),
            conn_recv_window: local_settings.initial_window_size,
            conn_send_window: DEFAULT_INITIAL_WINDOW_SIZE,
            local_settings,
            streams: HashMap::new(),
            highest_processed_stream: 0,
            open_header_block: None,
            dispatcher,
            shutdown: None,
        }
    }

    /// Observe the server's shutdown signal: on change, send GOAWAY and start the
    /// grace-period countdown instead of serving forever.
    pub fn with_shutdown(mut self, rx: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(rx);
        self
    }

    /// Run the connection to completion: preface, settings exchange, then the frame
    /// loop until the peer sends GOAWAY, a connection error occurs, or the socket closes.
    pub async fn run(mut self) -> Result<(), H2Error> {
        self.read_preface().await?;

        let (writer_tx, mut writer_rx) = mpsc::unbounded_channel::<Bytes>();
        let (mut read_half, mut write_half) = tokio::io::split(self.io);

        // Single writer task: the only task that ever calls write on this connection,
        // preserving FIFO order across streams.
        let writer_task = tokio::spawn(async move {
            while let Some(chunk) = writer_rx.recv().await {
                if write_half.write_all(&chunk).await.is_err() {
                    break;
                }
            }
            let _ = write_half.shutdown().await;
        });

        let mut initial = H2Writer::new();
        initial
            .write_settings(&self.local_settings.as_wire_pairs())
            .map_err(|e| H2Error::connection(ERROR_INTERNAL_ERROR, e.to_string()))?;
        let _ = writer_tx.send(initial.take_buffer());

        let mut buf = BytesMut::with_capacity(16 * 1024);
        let mut deadline: Option<tokio::time::Instant> = None;
        let result = 'read_loop: loop {
            if let Some(by) = deadline {
                if tokio::time::Instant::now() >= by {
                    tracing::info!("shutdown grace period elapsed, force-closing h2 connection");
                    break Ok(());
                }
            }

            let read = match (&mut self.shutdown, deadline) {
                (Some(rx), None) => {
                    tokio::select! {
                        r = read_half.read_buf(&mut buf) => r,
                        changed = rx.changed() => {
                            if changed.is_ok() && *rx.borrow() {
                                tracing::info!("graceful shutdown requested, sending GOAWAY");
                                let mut w = H2Writer::new();
                                if w.write_goaway(self.highest_processed_stream, ERROR_NO_ERROR, &[]).is_ok() {
                                    let _ = writer_tx.send(w.take_buffer());
                                }
                                deadline = Some(tokio::time::Instant::now() + SHUTDOWN_GRACE_PERIOD);
                            }
                            continue;
                        }
                    }
                }
                (_, Some(by)) => {
                    let remaining = by.saturating_duration_since(tokio::time::Instant::now());
                    match tokio::time::timeout(remaining, read_half.read_buf(&mut buf)).await {
                        Ok(r) => r,
                        Err(_) => continue,
                    }
                }
                (None, None) => read_half.read_buf(&mut buf).await,
            };

            let n = match read {
                Ok(0) => break Ok(()),
                Ok(n) => n,
                Err(e) => break Err(H2Error::connection(ERROR_INTERNAL_ERROR, e.to_string())),
            };
            tracing::debug!(bytes = n, "h2 read");

            let mut collector = EventCollector::default();
            if let Err(e) = self.parser.receive(&mut buf, &mut collector) {
                break Err(H2Error::connection(ERROR_INTERNAL_ERROR, e.to_string()));
            }

            for event in collector.0 {
                match self.handle_event(event, &writer_tx).await {
                    Ok(()) => {}
                    Err(H2Error::Stream { stream_id, code, message }) => {
                        tracing::warn!(stream_id, code, message, "h2 stream error");
                        let mut w = H2Writer::new();
                        let _ = w.write_rst_stream(stream_id, code);
                        let _ = writer_tx.send(w.take_buffer());
                        self.streams.remove(&stream_id);
                    }
                    Err(e @ H2Error::Connection { .. }) => break 'read_loop result_from(e),
                }
            }
        };

        if let Err(ref e) = result {
            tracing::warn!(error = %e, "h2 connection error, sending GOAWAY");
            let mut w = H2Writer::new();
            let code = match &result {
                Err(H2Error::Connection { code, .. }) => *code,
                _ => ERROR_INTERNAL_ERROR,
            };
            if w.write_goaway(self.highest_processed_stream, code, &[]).is_ok() {
                let _ = writer_tx.send(w.take_buffer());
            }
        }

        drop(writer_tx);
        let _ = writer_task.await;
        result
    }

    async fn read_preface(&mut self) -> Result<(), H2Error> {
        let mut preface = [0u8; 24];
        self.io
            .read_exact(&mut preface)
            .await
            .map_err(|e| H2Error::connection(ERROR_PROTOCOL_ERROR, e.to_string()))?;
        if preface != *CONNECTION_PREFACE {
            return Err(H2Error::connection(ERROR_PROTOCOL_ERROR, "bad connection preface"));
        }
        Ok(())
    }

    async fn handle_event(
        &mut self,
        event: FrameEvent,
        writer_tx: &mpsc::UnboundedSender<Bytes>,
    ) -> Result<(), H2Error> {
        // Ordering guarantee (c): while a header block is open, only HEADERS/
        // CONTINUATION for that same stream may appear.
        if let Some(open) = &self.open_header_block {
            let allowed = matches!(
                &event,
                FrameEvent::Continuation { stream_id, .. } if *stream_id == open.stream_id
            );
            if !allowed {
                return Err(H2Error::connection(
                    ERROR_PROTOCOL_ERROR,
                    "frame received while a header block was open",
                ));
            }
        }

        match event {
            FrameEvent::Data { stream_id, end_stream, data } => self.on_data(stream_id, end_stream, data),
            FrameEvent::Headers { stream_id, end_stream, end_headers, header_block } => {
                self.on_headers_start(stream_id, end_stream, end_headers, header_block, writer_tx).await
            }
            FrameEvent::Continuation { stream_id, end_headers, header_block } => {
                self.on_continuation(stream_id, end_headers, header_block, writer_tx).await
            }
            FrameEvent::Priority => Ok(()),
            FrameEvent::RstStream { stream_id } => {
                self.streams.remove(&stream_id);
                Ok(())
            }
            FrameEvent::Settings { ack, settings } => self.on_settings(ack, settings, writer_tx),
            FrameEvent::PushPromise => Err(H2Error::connection(
                ERROR_PROTOCOL_ERROR,
                "server received PUSH_PROMISE, which it never sends and does not accept",
            )),
            FrameEvent::Ping { ack, opaque_data } => {
                if !ack {
                    let mut w = H2Writer::new();
                    let _ = w.write_ping(opaque_data, true);
                    let _ = writer_tx.send(w.take_buffer());
                }
                Ok(())
            }
            FrameEvent::GoAway => Err(H2Error::connection(ERROR_NO_ERROR, "peer sent GOAWAY")),
            FrameEvent::WindowUpdate { stream_id, increment } => {
                self.on_window_update(stream_id, increment)
            }
            FrameEvent::FrameError { error_code, stream_id, message } => {
                if stream_id == 0 {
                    Err(H2Error::connection(error_code, message))
                } else {
                    Err(H2Error::stream(stream_id, error_code, message))
                }
            }
        }
    }

    fn on_data(&mut self, stream_id: u32, end_stream: bool, data: Bytes) -> Result<(), H2Error> {
        let window_debit = data.len() as i64;
        let stream = self
            .streams
            .get_mut(&stream_id)
            .ok_or_else(|| H2Error::connection(ERROR_PROTOCOL_ERROR, "DATA on unknown stream"))?;
        stream.pending_data.extend_from_slice(&data);
        stream.recv_window -= window_debit;
        self.conn_recv_window -= window_debit;
        if end_stream {
            stream.end_stream_seen = true;
        }
        if stream.recv_window < 0 || self.conn_recv_window < 0 {
            return Err(H2Error::connection(ERROR_FLOW_CONTROL_ERROR, "recv window went negative"));
        }
        Ok(())
    }

    async fn on_headers_start(
        &mut self,
        stream_id: u32,
        end_stream: bool,
        end_headers: bool,
        header_block: Bytes,
        writer_tx: &mpsc::UnboundedSender<Bytes>,
    ) -> Result<(), H2Error> {
        self.streams
            .entry(stream_id)
            .or_insert_with(|| Stream::new(stream_id, self.local_settings.initial_window_size));
        self.highest_processed_stream = self.highest_processed_stream.max(stream_id);

        if end_headers {
            self.decode_and_apply(stream_id, end_stream, &header_block, writer_tx).await
        } else {
            let mut buf = BytesMut::with_capacity(header_block.len());
            buf.extend_from_slice(&header_block);
            self.open_header_block = Some(OpenHeaderBlock { stream_id, end_stream, buf });
            Ok(())
        }
    }

    async fn on_continuation(
        &mut self,
        stream_id: u32,
        end_headers: bool,
        header_block: Bytes,
        writer_tx: &mpsc::UnboundedSender<Bytes>,
    ) -> Result<(), H2Error> {
        let open = self
            .open_header_block
            .as_mut()
            .filter(|o| o.stream_id == stream_id)
            .ok_or_else(|| H2Error::connection(ERROR_PROTOCOL_ERROR, "CONTINUATION with no open header block"))?;
        open.buf.extend_from_slice(&header_block);

        if end_headers {
            let open = self.open_header_block.take().unwrap();
            self.decode_and_apply(open.stream_id, open.end_stream, &open.buf, writer_tx).await
        } else {
            Ok(())
        }
    }

    async fn decode_and_apply(
        &mut self,
        stream_id: u32,
        end_stream: bool,
        header_block: &[u8],
        writer_tx: &mpsc::UnboundedSender<Bytes>,
    ) -> Result<(), H2Error> {
        let mut collector = HeaderCollector {
            pseudo: PseudoHeaders::default(),
            headers: HeaderSet::new(),
        };
        let mut cursor = header_block;
        self.decoder
            .decode(&mut cursor, &mut collector)
            .map_err(|e| H2Error::connection(ERROR_COMPRESSION_ERROR, e.to_string()))?;

        let stream = self
            .streams
            .get_mut(&stream_id)
            .ok_or_else(|| H2Error::connection(ERROR_PROTOCOL_ERROR, "HEADERS on unknown stream"))?;
        stream.pending_pseudo = collector.pseudo;
        for (name, value) in collector.headers.iter() {
            stream.pending_headers.append(name, value);
        }
        stream.state = StreamState::Open;
        if end_stream {
            stream.end_stream_seen = true;
        }

        if stream.is_request_ready() {
            self.serve_request(stream_id, writer_tx).await?;
        }
        Ok(())
    }

    fn on_settings(
        &mut self,
        ack: bool,
        settings: Vec<(u16, u32)>,
        writer_tx: &mpsc::UnboundedSender<Bytes>,
    ) -> Result<(), H2Error> {
        if ack {
            return Ok(());
        }
        for (id, value) in settings {
            match id {
                SETTINGS_HEADER_TABLE_SIZE => self.encoder.set_max_size(value as usize),
                SETTINGS_MAX_CONCURRENT_STREAMS => self.peer_settings.max_concurrent_streams = value,
                SETTINGS_INITIAL_WINDOW_SIZE => self.peer_settings.initial_window_size = value as i64,
                SETTINGS_MAX_FRAME_SIZE => {
                    if !(MIN_MAX_FRAME_SIZE..=MAX_MAX_FRAME_SIZE).contains(&(value as usize)) {
                        return Err(H2Error::connection(ERROR_PROTOCOL_ERROR, "invalid SETTINGS_MAX_FRAME_SIZE"));
                    }
                    self.peer_settings.max_frame_size = value as usize;
                }
                SETTINGS_MAX_HEADER_LIST_SIZE => self.peer_settings.max_header_list_size = value,
                _ => {}
            }
        }
        let mut w = H2Writer::new();
        let _ = w.write_settings_ack();
        let _ = writer_tx.send(w.take_buffer());
        Ok(())
    }

    fn on_window_update(&mut self, stream_id: u32, increment: u32) -> Result<(), H2Error> {
        if stream_id == 0 {
            self.conn_send_window += increment as i64;
        } else if let Some(s) = self.streams.get_mut(&stream_id) {
            s.send_window += increment as i64;
        }
        Ok(())
    }

    async fn serve_request(&mut self, stream_id: u32, writer_tx: &mpsc::UnboundedSender<Bytes>) -> Result<(), H2Error> {
        let request = {
            let stream = self.streams.get(&stream_id).expect("stream exists");
            build_request(stream)
        };

        let response = self.dispatcher.dispatch(&request).await;
        self.write_response(stream_id, response, writer_tx)
    }

    /// Emit HEADERS (+ CONTINUATION if the header block exceeds the peer's frame
    /// size) followed by DATA frames, splitting on `peer_settings.max_frame_size`.
    fn write_response(
        &mut self,
        stream_id: u32,
        response: Response,
        writer_tx: &mpsc::UnboundedSender<Bytes>,
    ) -> Result<(), H2Error> {
        let header_pairs: Vec<(String, String)> = response
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let header_refs: Vec<(&str, &str)> = header_pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

        let mut header_block = BytesMut::new();
        self.encoder
            .encode_response_headers(response.status, &header_refs, &mut header_block)
            .map_err(|e| H2Error::stream(stream_id, ERROR_COMPRESSION_ERROR, e.to_string()))?;

        let body = response.body.serialize();
        let max_frame = self.peer_settings.max_frame_size;

        let mut w = H2Writer::new();
        let body_empty = body.is_empty();
        emit_headers_chunked(&mut w, stream_id, &header_block, body_empty, max_frame)
            .map_err(|e| H2Error::stream(stream_id, ERROR_INTERNAL_ERROR, e.to_string()))?;

        if !body_empty {
            let mut offset = 0;
            while offset < body.len() {
                let end = (offset + max_frame).min(body.len());
                let end_stream = end == body.len();
                w.write_data(stream_id, &body[offset..end], end_stream)
                    .map_err(|e| H2Error::stream(stream_id, ERROR_INTERNAL_ERROR, e.to_string()))?;
                offset = end;
            }
        }

        // The whole response (headers plus all DATA, ending in END_STREAM) is queued
        // above in one shot, so the stream has no pending frames left the moment this
        // returns — evict it now rather than leaving a `Closed` entry to accumulate
        // for the life of the connection.
        self.streams.remove(&stream_id);
        let _ = writer_tx.send(w.take_buffer());
        Ok(())
    }
}

fn emit_headers_chunked(
    w: &mut H2Writer,
    stream_id: u32,
    header_block: &[u8],
    end_stream: bool,
    max_frame: usize,
) -> std::io::Result<()> {
    if header_block.len() <= max_frame {
        return w.write_headers(stream_id, header_block, end_stream, true);
    }
    let (first, rest) = header_block.split_at(max_frame);
    w.write_headers(stream_id, first, end_stream, false)?;
    let mut remaining = rest;
    while remaining.len() > max_frame {
        let (chunk, next) = remaining.split_at(max_frame);
        w.write_continuation(stream_id, chunk, false)?;
        remaining = next;
    }
    w.write_continuation(stream_id, remaining, true)
}

fn build_request(stream: &Stream) -> Request {
    let method = stream.pending_pseudo.method.clone().unwrap_or(Method::Get);
    let path = stream.pending_pseudo.path.clone().unwrap_or_else(|| "/".to_string());
    let mut request = Request::new(method, path);
    request.version = "HTTP/2".to_string();
    for (name, value) in stream.pending_headers.iter() {
        if name.eq_ignore_ascii_case("cookie") {
            for (k, v) in crate::message::CookieJar::parse(value).iter() {
                request.cookies.set(k, v);
            }
        } else {
            request.headers.append(name, value);
        }
    }

    let content_type = request.headers.get("content-type").map(|s| s.to_string());
    request.body = match content_type.as_deref() {
        Some("application/json") => {
            let value = serde_json::from_slice(&stream.pending_data).unwrap_or(serde_json::Value::Null);
            Body::Json { value }
        }
        Some("application/x-www-form-urlencoded") => {
            let text = String::from_utf8_lossy(&stream.pending_data);
            Body::FormUrlEncoded {
                fields: parse_form_body(&text),
            }
        }
        _ if stream.pending_data.is_empty() => Body::None,
        _ => Body::Raw { bytes: stream.pending_data.clone() },
    };
    request
}

fn parse_form_body(text: &str) -> std::collections::BTreeMap<String, String> {
    let mut fields = std::collections::BTreeMap::new();
    for pair in text.split('&') {
        if pair.is_empty() {
            continue;
        }
        if let Some((k, v)) = pair.split_once('=') {
            fields.insert(k.to_string(), v.to_string());
        } else {
            fields.insert(pair.to_string(), String::new());
        }
    }
    fields
}

fn result_from(e: H2Error) -> Result<(), H2Error> {
    Err(e)
}
