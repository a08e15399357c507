/*
 * stream.rs
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

//! One entry of the per-connection stream table.

use crate::message::{HeaderSet, Method};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Open,
    HalfClosedLocal,
    HalfClosedRemote,
    Closed,
}

/// Per-stream state accumulated while a request's HEADERS/DATA frames arrive.
pub struct Stream {
    pub id: u32,
    pub state: StreamState,
    pub recv_window: i64,
    pub send_window: i64,
    pub pending_headers: HeaderSet,
    pub pending_pseudo: PseudoHeaders,
    pub pending_data: Vec<u8>,
    pub end_stream_seen: bool,
}

/// The four pseudo-headers a request HEADERS frame carries (RFC 7540 §8.1.2.3).
#[derive(Debug, Clone, Default)]
pub struct PseudoHeaders {
    pub method: Option<Method>,
    pub scheme: Option<String>,
    pub path: Option<String>,
    pub authority: Option<String>,
}

impl Stream {
    pub fn new(id: u32, initial_window: i64) -> Self {
        Self {
            id,
            state: StreamState::Idle,
            recv_window: initial_window,
            send_window: initial_window,
            pending_headers: HeaderSet::new(),
            pending_pseudo: PseudoHeaders::default(),
            pending_data: Vec::new(),
            end_stream_seen: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state == StreamState::Closed
    }

    /// A stream is "request-ready" once it has seen END_STREAM and has a complete
    /// pseudo-header set.
    pub fn is_request_ready(&self) -> bool {
        self.end_stream_seen
            && self.pending_pseudo.method.is_some()
            && self.pending_pseudo.path.is_some()
    }
}
