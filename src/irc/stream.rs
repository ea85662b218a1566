//! Client stream abstraction.
//!
//! Provides a unified stream type for both plaintext and TLS connections to
//! the IRC server, so the framed read loop is agnostic to transport security.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tracing::{info, warn};

use crate::error::ConnectionError;

/// A plaintext or TLS-encrypted connection to the IRC server.
pub enum BotStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl BotStream {
    pub fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }
}

/// Open a TCP connection and upgrade it to TLS when requested.
pub async fn connect(host: &str, port: u16, tls: bool) -> Result<BotStream, ConnectionError> {
    let tcp = TcpStream::connect((host, port)).await?;
    tcp.set_nodelay(true)?;

    if !tls {
        return Ok(BotStream::Plain(tcp));
    }

    let mut roots = RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs();
    for cert in certs.certs {
        if let Err(e) = roots.add(cert) {
            warn!("Failed to add root cert: {}", e);
        }
    }
    for e in &certs.errors {
        warn!("Error loading native certs: {}", e);
    }

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    let connector = TlsConnector::from(Arc::new(config));
    let server_name =
        ServerName::try_from(host.to_string()).map_err(|e| ConnectionError::Tls(e.to_string()))?;

    let stream = connector.connect(server_name, tcp).await?;
    info!(host = %host, "TLS handshake completed");
    Ok(BotStream::Tls(Box::new(stream)))
}

impl AsyncRead for BotStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            BotStream::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            BotStream::Tls(stream) => Pin::new(stream.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for BotStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            BotStream::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            BotStream::Tls(stream) => Pin::new(stream.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            BotStream::Plain(stream) => Pin::new(stream).poll_flush(cx),
            BotStream::Tls(stream) => Pin::new(stream.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            BotStream::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            BotStream::Tls(stream) => Pin::new(stream.as_mut()).poll_shutdown(cx),
        }
    }
}
