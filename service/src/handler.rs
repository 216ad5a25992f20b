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

//! Handler trait connecting the portal to its embedding application

use crate::connection::SessionHandle;
use crate::types::ShutdownCause;
use async_trait::async_trait;

/// Application-side callbacks for session lifecycle events.
///
/// All methods are async with default no-op implementations.
///
/// # Example
///
/// ```no_run
/// use mudgate_service::{SessionHandler, SessionHandle};
/// use async_trait::async_trait;
///
/// struct GameLink;
///
/// #[async_trait]
/// impl SessionHandler for GameLink {
///     async fn on_session_ready(&self, session: SessionHandle) {
///         session.send_text("Welcome!\n");
///         while let Some(command) = session.recv().await {
///             // feed the game
///             let _ = command.text;
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait SessionHandler: Send + Sync + 'static {
    /// Called once a session's startup negotiation has settled or timed
    /// out. The session's capabilities are as complete as they will get
    /// without further client traffic.
    async fn on_session_ready(&self, _session: SessionHandle) {}

    /// Called after a session's tasks have fully unwound.
    async fn on_session_closed(&self, _session: SessionHandle, _cause: ShutdownCause) {}
}
