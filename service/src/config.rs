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

//! Portal service configuration
//!
//! # Examples
//!
//! ```
//! use mudgate_service::ServiceConfig;
//! use std::time::Duration;
//!
//! let config = ServiceConfig::new("0.0.0.0:4000".parse().unwrap())
//!     .with_session_prefix("telnet")
//!     .with_negotiation_timeout(Duration::from_millis(500));
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_rustls::rustls;

/// Configuration for a [`TelnetService`](crate::TelnetService) listener and
/// the connections it spawns.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Address the listener binds to
    pub bind_address: SocketAddr,

    /// Prefix for generated session names (`<prefix>-<n>`)
    pub session_prefix: String,

    /// Bytes read from the socket per reader pass
    pub read_chunk_size: usize,

    /// How long the negotiation barrier waits for every registered option to
    /// settle before handing the session to the application anyway
    pub negotiation_timeout: Duration,

    /// Capacity of the per-session application input queue
    pub input_queue_capacity: usize,

    /// TLS configuration; when set, every accept completes a TLS handshake
    /// and the session's `encryption` capability is true
    pub tls: Option<Arc<rustls::ServerConfig>>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 4000)),
            session_prefix: "telnet".to_string(),
            read_chunk_size: 1024,
            negotiation_timeout: Duration::from_millis(500),
            input_queue_capacity: 64,
            tls: None,
        }
    }
}

impl ServiceConfig {
    /// Creates a configuration listening on the given address.
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            ..Self::default()
        }
    }

    /// Set the session name prefix
    pub fn with_session_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.session_prefix = prefix.into();
        self
    }

    /// Set the reader chunk size
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    /// Set the negotiation barrier timeout
    pub fn with_negotiation_timeout(mut self, timeout: Duration) -> Self {
        self.negotiation_timeout = timeout;
        self
    }

    /// Set the application input queue capacity
    pub fn with_input_queue_capacity(mut self, capacity: usize) -> Self {
        self.input_queue_capacity = capacity;
        self
    }

    /// Enable TLS with the given rustls configuration
    pub fn with_tls(mut self, tls: Arc<rustls::ServerConfig>) -> Self {
        self.tls = Some(tls);
        self
    }
}
