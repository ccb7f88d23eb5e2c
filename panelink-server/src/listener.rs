//! The TCP accept loop handing each panel connection to the handshake.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::errors::{Error, Result};
use crate::session::Session;
use crate::settings::Settings;

/// Accepts panel connections on `settings.listen_port`, one session per
/// connection. No session state survives a reconnect.
pub struct PanelListener {
    listener: TcpListener,
    settings: Settings,
    cancel: CancellationToken,
}

impl PanelListener {
    /// Bind the configured port. Sessions accepted later are tied to a child
    /// of `cancel`.
    pub async fn bind(settings: Settings, cancel: &CancellationToken) -> Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", settings.listen_port)).await?;
        Ok(Self { listener, settings, cancel: cancel.child_token() })
    }

    /// The bound address (useful when `listen_port` is 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept the next panel connection and run its handshake to completion.
    pub async fn accept(&self) -> Result<Session> {
        let (stream, addr) = tokio::select! {
            _ = self.cancel.cancelled() => return Err(Error::cancelled()),
            accepted = self.listener.accept() => accepted?,
        };
        tracing::info!(%addr, "panel connected, starting handshake");
        Session::establish(stream, self.settings.clone(), &self.cancel).await
    }
}
