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

//! Core types shared across the portal service.

use bytes::Bytes;
use mudgate_telnetcodec::TelnetMessage;
use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Unique identifier for a session (monotonically increasing, never reused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Create a new session ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying u64 value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Why a session ended. The embedding application observes this through
/// [`SessionHandle::shutdown_cause`](crate::SessionHandle::shutdown_cause).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// The peer closed its side; the reader saw EOF.
    ReaderEof,
    /// The service is draining all sessions.
    GracefulShutdown,
    /// The embedding application asked this one session to close.
    ApplicationRequest,
}

impl fmt::Display for ShutdownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReaderEof => write!(f, "reader_eof"),
            Self::GracefulShutdown => write!(f, "graceful_shutdown"),
            Self::ApplicationRequest => write!(f, "application_request"),
        }
    }
}

/// Cancellation token paired with a one-shot cause record.
///
/// Triggering is idempotent; the first cause wins. Child handles cancel when
/// their parent cancels, which is how a service shutdown drains every
/// session — a child cancelled that way reports `GracefulShutdown`.
#[derive(Clone, Debug, Default)]
pub struct ShutdownHandle {
    token: CancellationToken,
    cause: Arc<OnceLock<ShutdownCause>>,
}

impl ShutdownHandle {
    /// Creates an untriggered handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a handle that also cancels whenever `self` does.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            cause: Arc::new(OnceLock::new()),
        }
    }

    /// Cancels the handle, recording `cause` if none was recorded yet.
    pub fn trigger(&self, cause: ShutdownCause) {
        let _ = self.cause.set(cause);
        self.token.cancel();
    }

    /// Completes once the handle is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Whether the handle has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The recorded cause, once cancelled. A cancellation inherited from a
    /// parent carries no local cause and reads as a graceful shutdown.
    pub fn cause(&self) -> Option<ShutdownCause> {
        self.cause.get().copied().or_else(|| {
            self.token
                .is_cancelled()
                .then_some(ShutdownCause::GracefulShutdown)
        })
    }
}

/// One received line of client input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientCommand {
    /// The line text, CR/LF stripped, lossily decoded as UTF-8.
    pub text: String,
}

/// An item queued for the writer task.
#[derive(Clone, Debug)]
pub(crate) enum Outbound {
    /// A typed Telnet message; send hooks fire after it hits the transport.
    Message(TelnetMessage),
    /// Pre-encoded bytes from `send_text` (already normalized and escaped).
    Raw(Bytes),
}

pub(crate) type OutboundSender = mpsc::UnboundedSender<Outbound>;
pub(crate) type OutboundReceiver = mpsc::UnboundedReceiver<Outbound>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cause_strings() {
        assert_eq!(ShutdownCause::ReaderEof.to_string(), "reader_eof");
        assert_eq!(
            ShutdownCause::GracefulShutdown.to_string(),
            "graceful_shutdown"
        );
        assert_eq!(
            ShutdownCause::ApplicationRequest.to_string(),
            "application_request"
        );
    }

    #[test]
    fn first_trigger_wins() {
        let handle = ShutdownHandle::new();
        assert_eq!(handle.cause(), None);
        handle.trigger(ShutdownCause::ReaderEof);
        handle.trigger(ShutdownCause::ApplicationRequest);
        assert_eq!(handle.cause(), Some(ShutdownCause::ReaderEof));
    }

    #[test]
    fn parent_cancel_reads_as_graceful() {
        let parent = ShutdownHandle::new();
        let child = parent.child();
        parent.trigger(ShutdownCause::GracefulShutdown);
        assert!(child.is_cancelled());
        assert_eq!(child.cause(), Some(ShutdownCause::GracefulShutdown));
    }
}
