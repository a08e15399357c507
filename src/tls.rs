/*
 * tls.rs
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

//! Server-side TLS context construction: builds a server `ServerConfig` from a PEM
//! certificate chain and private key and accepts incoming connections with
//! `TlsAcceptor`, advertising `h2, http/1.1` via ALPN.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::server::ServerConfig;
use rustls_pemfile::{certs, private_key};
use tokio_rustls::TlsAcceptor;

/// How the caller supplies TLS material: a cert/key file pair, or an already-built
/// `rustls::ServerConfig` for callers who need finer control (client auth, OCSP, ...).
#[derive(Clone)]
pub enum TlsConfig {
    CertAndKey { cert_path: PathBuf, key_path: PathBuf },
    Prebuilt(Arc<ServerConfig>),
}

impl TlsConfig {
    pub fn from_paths(cert_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        TlsConfig::CertAndKey {
            cert_path: cert_path.into(),
            key_path: key_path.into(),
        }
    }

    /// Build the `rustls::ServerConfig` and wrap it in a `TlsAcceptor`. TLS 1.0/1.1
    /// are unreachable through rustls already (it only speaks 1.2/1.3); this also
    /// disables TLS-record compression, which rustls does not implement at all, so
    /// the only thing left to configure is ALPN order.
    pub fn build_acceptor(&self) -> io::Result<TlsAcceptor> {
        let config = match self {
            TlsConfig::CertAndKey { cert_path, key_path } => build_server_config(cert_path, key_path)?,
            TlsConfig::Prebuilt(config) => config.clone(),
        };
        Ok(TlsAcceptor::from(config))
    }
}

fn build_server_config(cert_path: &Path, key_path: &Path) -> io::Result<Arc<ServerConfig>> {
    let cert_chain = load_certs(cert_path)?;
    let key = load_private_key(key_path)?;

    let mut config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert_chain, key)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
    Ok(Arc::new(config))
}

fn load_certs(path: &Path) -> io::Result<Vec<rustls::pki_types::CertificateDer<'static>>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    certs(&mut reader).collect::<Result<Vec<_>, _>>()
}

fn load_private_key(path: &Path) -> io::Result<rustls::pki_types::PrivateKeyDer<'static>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    private_key(&mut reader)?.ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, "no private key found in PEM file")
    })
}
