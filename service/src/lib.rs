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

//! # Mudgate Telnet Portal Service
//!
//! A Telnet protocol engine for MUD-style interactive text servers. The
//! service terminates TCP (optionally TLS) connections, negotiates the MUD
//! option set — NAWS, MTTS, MSSP, MCCP2/MCCP3 compression, GMCP — and
//! presents the embedding application with a clean channel of received
//! lines, structured out-of-band sends, and a live capability record.
//!
//! # Architecture
//!
//! ```text
//! TelnetService            accept loop, TLS, capability stamping
//!     ↓
//! Connection               three tasks per session:
//!     reader               socket → inflate? → codec → dispatch
//!     writer               queue → codec → deflate? → socket → hooks
//!     negotiator           start options, barrier, hand off to app
//!     ↓
//! SessionHandle            recv lines, send text/GMCP/MSSP, watch
//!                          capabilities, request shutdown
//! ```
//!
//! Option negotiation is hook-driven: each option carries independent
//! local/remote half-states plus an [`OptionBehavior`] whose callbacks
//! mutate the session's [`Capabilities`] as negotiation side effects. The
//! application observes those capabilities through a watch channel and is
//! handed the session once startup negotiation settles (bounded by the
//! configured timeout).
//!
//! # Example
//!
//! ```no_run
//! use mudgate_service::{ServiceConfig, SessionHandle, SessionHandler, TelnetService};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl SessionHandler for Echo {
//!     async fn on_session_ready(&self, session: SessionHandle) {
//!         while let Some(command) = session.recv().await {
//!             session.send_text(&format!("{}\n", command.text));
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = TelnetService::bind(ServiceConfig::default()).await?;
//!     service.run(Arc::new(Echo)).await?;
//!     Ok(())
//! }
//! ```

#![warn(
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

mod capabilities;
mod config;
mod connection;
mod error;
mod handler;
mod options;
mod server;
mod text;
mod types;

pub use capabilities::{
    Capabilities, CapabilityHandle, CapabilityUpdate, CapabilityWatch, ColorMode,
};
pub use config::ServiceConfig;
pub use connection::{Connection, SessionHandle};
pub use error::{Result, ServiceError};
pub use handler::SessionHandler;
pub use options::{
    EorOption, GmcpOption, LinemodeOption, Mccp2Option, Mccp3Option, MsspOption, MttsOption,
    NawsOption, OptionBehavior, OptionHalf, OptionInstance, OptionPerspective, OptionProfile,
    OptionRegistry, ReceiveContext, SendContext, Settled, SgaOption,
};
pub use server::TelnetService;
pub use text::normalize;
pub use types::{ClientCommand, SessionId, ShutdownCause, ShutdownHandle};
