/*
 * logging.rs
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

//! Ambient logging setup. The library only ever emits `tracing` events — it
//! never installs a global subscriber itself, so an embedding application can
//! choose its own. `init_tracing` is a convenience for the standalone binary and
//! for tests that want readable output.

use tracing_subscriber::EnvFilter;

/// Install a `tracing-subscriber` `fmt` layer filtered by `RUST_LOG` (default
/// `info`). Intended for `src/bin/tesserae_serve.rs`, not for library callers who
/// already run their own subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
