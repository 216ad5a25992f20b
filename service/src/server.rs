//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Telnet listener façade
//!
//! Binds the TCP (optionally TLS) listener, accepts clients, stamps the
//! transport facts into a fresh capability record, and spawns a
//! [`Connection`] per accept. Reverse DNS and application dispatch stay
//! with the embedder.

use crate::capabilities::Capabilities;
use crate::config::ServiceConfig;
use crate::connection::Connection;
use crate::error::Result;
use crate::handler::SessionHandler;
use crate::options::OptionRegistry;
use crate::types::{SessionId, ShutdownCause, ShutdownHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;
use tracing::{debug, error, info, warn};

/// Accepting listener for one portal endpoint.
///
/// # Example
///
/// ```no_run
/// use mudgate_service::{ServiceConfig, SessionHandler, TelnetService};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct MyHandler;
///
/// #[async_trait]
/// impl SessionHandler for MyHandler {}
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = TelnetService::bind(ServiceConfig::default()).await?;
///     service.run(Arc::new(MyHandler)).await?;
///     Ok(())
/// }
/// ```
pub struct TelnetService {
    config: ServiceConfig,
    listener: TcpListener,
    local_addr: SocketAddr,
    tls: Option<TlsAcceptor>,
    shutdown: ShutdownHandle,
    next_session: AtomicU64,
}

impl TelnetService {
    /// Binds the configured address. TLS, when configured, is applied per
    /// accept; a bind failure is the only startup error.
    pub async fn bind(config: ServiceConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_address).await?;
        let local_addr = listener.local_addr()?;
        let tls = config.tls.clone().map(TlsAcceptor::from);
        info!(
            "telnet{} service bound to {local_addr}",
            if tls.is_some() { "s" } else { "" }
        );
        Ok(Self {
            config,
            listener,
            local_addr,
            tls,
            shutdown: ShutdownHandle::new(),
            next_session: AtomicU64::new(0),
        })
    }

    /// The bound address (useful when binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// A handle that stops the accept loop and drains every session when
    /// triggered.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Stops the service, draining all sessions gracefully.
    pub fn shutdown(&self) {
        self.shutdown.trigger(ShutdownCause::GracefulShutdown);
    }

    /// Accepts clients until shutdown. Each accepted connection negotiates
    /// with the default option registry and is announced to `handler` once
    /// its negotiation settles.
    pub async fn run(&self, handler: Arc<dyn SessionHandler>) -> Result<()> {
        info!("telnet service accepting on {}", self.local_addr);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("telnet service shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((socket, peer)) => self.accept(socket, peer, handler.clone()),
                    Err(err) => {
                        error!("accept failed: {err}");
                        // Avoid spinning on a persistent accept error.
                        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    }
                },
            }
        }
    }

    fn accept(&self, socket: TcpStream, peer: SocketAddr, handler: Arc<dyn SessionHandler>) {
        let id = SessionId::new(self.next_session.fetch_add(1, Ordering::Relaxed) + 1);
        let session_name = format!("{}-{}", self.config.session_prefix, id.as_u64());

        let mut capabilities = Capabilities {
            session_name: session_name.clone(),
            host_port: peer.port(),
            ..Capabilities::default()
        };
        capabilities.host_address = Some(peer.ip());

        let shutdown = self.shutdown.child();
        debug!(%peer, %session_name, "accepted connection");

        match &self.tls {
            Some(acceptor) => {
                capabilities.encryption = true;
                let acceptor = acceptor.clone();
                let config = self.config.clone();
                tokio::spawn(async move {
                    match acceptor.accept(socket).await {
                        Ok(stream) => {
                            Connection::spawn(
                                stream,
                                OptionRegistry::with_defaults(),
                                capabilities,
                                &config,
                                handler,
                                shutdown,
                            );
                        }
                        Err(err) => warn!(%peer, "TLS handshake failed: {err}"),
                    }
                });
            }
            None => {
                Connection::spawn(
                    socket,
                    OptionRegistry::with_defaults(),
                    capabilities,
                    &self.config,
                    handler,
                    shutdown,
                );
            }
        }
    }
}

impl std::fmt::Debug for TelnetService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetService")
            .field("local_addr", &self.local_addr)
            .field("tls", &self.tls.is_some())
            .field("shutting_down", &self.shutdown.is_cancelled())
            .finish()
    }
}
