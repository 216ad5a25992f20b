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

//! Per-connection protocol engine
//!
//! Three tasks cooperate per connection:
//!
//! - the **reader** pulls socket chunks through the optional MCCP3 inflater
//!   into a read buffer, decodes Telnet messages off its front, and
//!   dispatches them — option traffic to the registry, data to the line
//!   assembler feeding the application input queue;
//! - the **writer** drains the outbound queue, serializes each item,
//!   passes it through the optional MCCP2 deflater, writes it, and then
//!   fires the option send-hooks (which is how MCCP2 switches compression
//!   on immediately *after* its activation frame);
//! - the **negotiator** kicks off every registered option and waits — with
//!   a hard timeout — for all of them to settle before handing the session
//!   to the application.
//!
//! Each piece of mutable state is owned by exactly one task; the tasks meet
//! only at the option registry (briefly locked around hook dispatch), the
//! capability watch channel, and the queues.

use crate::capabilities::{Capabilities, CapabilityHandle, CapabilityUpdate, CapabilityWatch};
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::handler::SessionHandler;
use crate::options::{OptionRegistry, ReceiveContext, SendContext};
use crate::text;
use crate::types::{ClientCommand, Outbound, OutboundReceiver, OutboundSender};
use crate::types::{ShutdownCause, ShutdownHandle};
use bytes::{Bytes, BytesMut};
use mudgate_compress::{Deflater, Inflater};
use mudgate_telnetcodec::{TelnetCodec, TelnetMessage, consts, gmcp::GmcpMessage, mssp::ServerStatus};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{Mutex, mpsc};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, error, trace, warn};

type SharedRegistry = Arc<Mutex<OptionRegistry>>;

///
/// The application-facing side of one live connection.
///
/// Cloneable; clones share the same session. Handed to the
/// [`SessionHandler`] once startup negotiation settles (or times out).
///
#[derive(Clone)]
pub struct SessionHandle {
    capabilities: CapabilityHandle,
    outbound: OutboundSender,
    input: Arc<Mutex<mpsc::Receiver<ClientCommand>>>,
    shutdown: ShutdownHandle,
}

impl SessionHandle {
    /// Receives the next line of client input. `None` once the connection
    /// is gone and the queue has drained.
    pub async fn recv(&self) -> Option<ClientCommand> {
        self.input.lock().await.recv().await
    }

    /// Queues application text for the client. The text is CRLF-normalized
    /// and IAC-escaped before it is framed.
    pub fn send_text(&self, text: &str) {
        let _ = self
            .outbound
            .send(Outbound::Raw(text::normalize(text.as_bytes())));
    }

    /// Queues a GMCP message. Silently dropped unless the client negotiated
    /// GMCP.
    pub fn send_gmcp(&self, package: &str, data: Option<Value>) {
        if !self.capabilities.snapshot().gmcp {
            trace!("client has no GMCP, dropping {package}");
            return;
        }
        let message = GmcpMessage::new(package, data);
        let _ = self.outbound.send(Outbound::Message(TelnetMessage::SubNegotiate(
            consts::option::GMCP,
            message.to_bytes(),
        )));
    }

    /// Queues an MSSP status table. Silently dropped unless the client
    /// negotiated MSSP; an empty table sends nothing.
    pub fn send_mssp(&self, status: &ServerStatus) {
        if !self.capabilities.snapshot().mssp {
            trace!("client has no MSSP, dropping status table");
            return;
        }
        if status.is_empty() {
            return;
        }
        let _ = self.outbound.send(Outbound::Message(TelnetMessage::SubNegotiate(
            consts::option::MSSP,
            status.to_bytes(),
        )));
    }

    /// A point-in-time copy of the session's capabilities.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities.snapshot()
    }

    /// A live view that observes every capability change.
    pub fn watch_capabilities(&self) -> CapabilityWatch {
        self.capabilities.subscribe()
    }

    /// Merges capability updates, the same mutator option handlers use.
    pub fn change_capabilities<I>(&self, updates: I)
    where
        I: IntoIterator<Item = CapabilityUpdate>,
    {
        self.capabilities.apply(updates);
    }

    /// Requests connection termination with the given cause.
    pub fn shutdown(&self, cause: ShutdownCause) {
        self.shutdown.trigger(cause);
    }

    /// Why the session ended, once it has.
    pub fn shutdown_cause(&self) -> Option<ShutdownCause> {
        self.shutdown.cause()
    }

    /// Completes once the session's shutdown has been signalled.
    pub async fn closed(&self) {
        self.shutdown.cancelled().await;
    }

    /// The session's generated name.
    pub fn session_name(&self) -> String {
        self.capabilities.snapshot().session_name
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session_name", &self.session_name())
            .field("closed", &self.shutdown.is_cancelled())
            .finish()
    }
}

///
/// Factory for per-connection task groups.
///
pub struct Connection;

impl Connection {
    /// Splits `stream` and launches the reader, writer, and negotiation
    /// tasks for one connection, returning its [`SessionHandle`].
    ///
    /// The same handle is delivered to `handler` once negotiation settles;
    /// triggering `shutdown` (directly, from a parent handle, or by reader
    /// EOF) winds down all three tasks, after which the handler's closed
    /// callback fires.
    pub fn spawn<S>(
        stream: S,
        registry: OptionRegistry,
        initial: Capabilities,
        config: &ServiceConfig,
        handler: Arc<dyn SessionHandler>,
        shutdown: ShutdownHandle,
    ) -> SessionHandle
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let session_name = initial.session_name.clone();
        let capabilities = CapabilityHandle::new(initial);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (input_tx, input_rx) = mpsc::channel(config.input_queue_capacity.max(1));
        let registry: SharedRegistry = Arc::new(Mutex::new(registry));
        let (read_half, write_half) = tokio::io::split(stream);

        let handle = SessionHandle {
            capabilities: capabilities.clone(),
            outbound: outbound_tx.clone(),
            input: Arc::new(Mutex::new(input_rx)),
            shutdown: shutdown.clone(),
        };

        let reader = ReaderTask {
            stream: read_half,
            codec: TelnetCodec::new(),
            read_buffer: BytesMut::new(),
            app_data: BytesMut::new(),
            inflater: None,
            registry: registry.clone(),
            capabilities: capabilities.clone(),
            outbound: outbound_tx.clone(),
            input: input_tx,
            shutdown: shutdown.clone(),
            chunk_size: config.read_chunk_size.max(1),
        };
        let writer = WriterTask {
            stream: write_half,
            codec: TelnetCodec::new(),
            deflater: None,
            registry: registry.clone(),
            capabilities,
            outbound: outbound_rx,
            shutdown: shutdown.clone(),
        };

        let reader_task = tokio::spawn(reader.run());
        let writer_task = tokio::spawn(writer.run());
        let negotiation_task = tokio::spawn(run_negotiation(
            registry,
            outbound_tx,
            config.negotiation_timeout,
            handler.clone(),
            handle.clone(),
            shutdown.clone(),
        ));

        // Supervisor: once the task trio unwinds, tell the application why.
        let session = handle.clone();
        tokio::spawn(async move {
            let _ = reader_task.await;
            let _ = writer_task.await;
            let _ = negotiation_task.await;
            let cause = shutdown.cause().unwrap_or(ShutdownCause::GracefulShutdown);
            debug!(session = %session_name, %cause, "connection closed");
            handler.on_session_closed(session, cause).await;
        });

        handle
    }
}

/// Calls `start()` on every registered option, waits for the whole set to
/// settle — bounded by the configured timeout, whose expiry is not an
/// error — then hands the session to the application.
async fn run_negotiation(
    registry: SharedRegistry,
    outbound: OutboundSender,
    timeout: Duration,
    handler: Arc<dyn SessionHandler>,
    handle: SessionHandle,
    shutdown: ShutdownHandle,
) {
    let signals = {
        let mut registry = registry.lock().await;
        registry.start_all(&outbound);
        registry.settled_signals()
    };

    let barrier = futures::future::join_all(signals.iter().map(|signal| signal.wait()));
    tokio::select! {
        _ = shutdown.cancelled() => return,
        outcome = tokio::time::timeout(timeout, barrier) => {
            if outcome.is_err() {
                debug!("negotiation window expired, continuing with settled options");
            }
        }
    }

    handler.on_session_ready(handle).await;
}

/// Reader task: socket → (inflate) → read buffer → codec → dispatch.
struct ReaderTask<S> {
    stream: ReadHalf<S>,
    codec: TelnetCodec,
    read_buffer: BytesMut,
    app_data: BytesMut,
    inflater: Option<Inflater>,
    registry: SharedRegistry,
    capabilities: CapabilityHandle,
    outbound: OutboundSender,
    input: mpsc::Sender<ClientCommand>,
    shutdown: ShutdownHandle,
    chunk_size: usize,
}

impl<S: AsyncRead + Send> ReaderTask<S> {
    async fn run(mut self) {
        let mut chunk = vec![0u8; self.chunk_size];
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return,
                read = self.stream.read(&mut chunk) => match read {
                    Ok(0) => {
                        debug!("peer closed the connection");
                        self.shutdown.trigger(ShutdownCause::ReaderEof);
                        return;
                    }
                    Ok(n) => self.ingest(&chunk[..n]).await,
                    Err(err) => {
                        error!("read failed: {err}");
                    }
                },
            }
        }
    }

    /// Feeds one raw chunk through decompression into the read buffer, then
    /// drains every complete message off the buffer's front.
    async fn ingest(&mut self, data: &[u8]) {
        if let Some(inflater) = self.inflater.as_mut() {
            match inflater.inflate(data) {
                Ok(inflated) => {
                    self.read_buffer.extend_from_slice(&inflated.data);
                    if let Some(rest) = inflated.trailing {
                        debug!("inbound compression stream ended");
                        self.end_inbound_inflate();
                        self.read_buffer.extend_from_slice(&rest);
                    }
                }
                Err(err) => {
                    warn!("inbound compression broke, discarding chunk: {err}");
                    self.end_inbound_inflate();
                }
            }
        } else {
            self.read_buffer.extend_from_slice(data);
        }

        loop {
            match self.codec.decode(&mut self.read_buffer) {
                Ok(Some(message)) => self.dispatch(message).await,
                Ok(None) => break,
                Err(err) => {
                    error!("decode failed: {err}");
                    break;
                }
            }
        }
    }

    /// Drops the inflater and tells the peer compression is off.
    fn end_inbound_inflate(&mut self) {
        self.inflater = None;
        self.capabilities
            .apply([CapabilityUpdate::Mccp3Enabled(false)]);
        let _ = self.outbound.send(Outbound::Message(TelnetMessage::Negotiate(
            consts::WONT,
            consts::option::MCCP3,
        )));
    }

    async fn dispatch(&mut self, message: TelnetMessage) {
        trace!("dispatching {message}");
        match message {
            TelnetMessage::Data(bytes) => self.handle_data(&bytes).await,
            TelnetMessage::Command(_) => {}
            TelnetMessage::Negotiate(command, option) => {
                self.handle_negotiate(command, option).await;
            }
            TelnetMessage::SubNegotiate(option, payload) => {
                self.handle_subnegotiate(option, &payload).await;
            }
        }
    }

    /// Line assembler: split the app-data buffer at LF, strip trailing
    /// CR/LF, decode lossily, drop keep-alive `IDLE` lines, enqueue.
    async fn handle_data(&mut self, bytes: &[u8]) {
        self.app_data.extend_from_slice(bytes);
        while let Some(pos) = self.app_data.iter().position(|&b| b == consts::LF) {
            let raw = self.app_data.split_to(pos + 1);
            let mut end = raw.len() - 1;
            while end > 0 && (raw[end - 1] == consts::CR || raw[end - 1] == consts::LF) {
                end -= 1;
            }
            let text = String::from_utf8_lossy(&raw[..end]).into_owned();
            if text == "IDLE" {
                continue;
            }
            let _ = self.input.send(ClientCommand { text }).await;
        }
    }

    async fn handle_negotiate(&mut self, command: u8, option: u8) {
        let mut registry = self.registry.lock().await;
        if let Some(instance) = registry.get_mut(option) {
            let settled = instance.settled();
            let mut ctx = ReceiveContext {
                code: option,
                capabilities: &self.capabilities,
                outbound: &self.outbound,
                settled: &settled,
                read_buffer: &mut self.read_buffer,
                inflater: &mut self.inflater,
            };
            instance.receive_negotiate(command, &mut ctx);
        } else {
            // Refuse options nobody registered; stray refusals are dropped.
            match command {
                consts::WILL => {
                    let _ = self.outbound.send(Outbound::Message(TelnetMessage::Negotiate(
                        consts::DONT,
                        option,
                    )));
                }
                consts::DO => {
                    let _ = self.outbound.send(Outbound::Message(TelnetMessage::Negotiate(
                        consts::WONT,
                        option,
                    )));
                }
                _ => {}
            }
        }
    }

    async fn handle_subnegotiate(&mut self, option: u8, payload: &[u8]) {
        let mut registry = self.registry.lock().await;
        if let Some(instance) = registry.get_mut(option) {
            let settled = instance.settled();
            let mut ctx = ReceiveContext {
                code: option,
                capabilities: &self.capabilities,
                outbound: &self.outbound,
                settled: &settled,
                read_buffer: &mut self.read_buffer,
                inflater: &mut self.inflater,
            };
            instance.receive_subnegotiate(&mut ctx, payload);
        } else {
            trace!(
                "dropping subnegotiation for unregistered option {}",
                consts::option_name(option)
            );
        }
    }
}

/// Writer task: outbound queue → codec → (deflate) → socket → send hooks.
struct WriterTask<S> {
    stream: WriteHalf<S>,
    codec: TelnetCodec,
    deflater: Option<Deflater>,
    registry: SharedRegistry,
    capabilities: CapabilityHandle,
    outbound: OutboundReceiver,
    shutdown: ShutdownHandle,
}

impl<S: AsyncWrite + Send> WriterTask<S> {
    async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    // Close errors during teardown are of no interest.
                    let _ = self.stream.shutdown().await;
                    return;
                }
                item = self.outbound.recv() => match item {
                    None => {
                        let _ = self.stream.shutdown().await;
                        return;
                    }
                    Some(item) => {
                        if let Err(err) = self.transmit(item).await {
                            error!("write failed: {err}");
                            return;
                        }
                    }
                },
            }
        }
    }

    async fn transmit(&mut self, item: Outbound) -> Result<()> {
        let mut wire = BytesMut::new();
        match &item {
            Outbound::Message(message) => {
                self.codec.encode(message.clone(), &mut wire)?;
            }
            Outbound::Raw(bytes) => wire.extend_from_slice(bytes),
        }

        let payload: Bytes = match self.deflater.as_mut() {
            Some(deflater) => Bytes::from(deflater.compress(&wire)?),
            None => wire.freeze(),
        };
        self.stream.write_all(&payload).await?;

        // Hooks fire after the bytes are with the transport but before the
        // flush, so MCCP2's activation frame is the last plain write.
        if let Outbound::Message(message) = &item {
            match message {
                TelnetMessage::Negotiate(command, option) => {
                    let mut registry = self.registry.lock().await;
                    if let Some(instance) = registry.get_mut(*option) {
                        let mut ctx = SendContext {
                            capabilities: &self.capabilities,
                            deflater: &mut self.deflater,
                        };
                        instance.sent_negotiate(&mut ctx, *command);
                    }
                }
                TelnetMessage::SubNegotiate(option, payload) => {
                    let mut registry = self.registry.lock().await;
                    if let Some(instance) = registry.get_mut(*option) {
                        let mut ctx = SendContext {
                            capabilities: &self.capabilities,
                            deflater: &mut self.deflater,
                        };
                        instance.sent_subnegotiate(&mut ctx, payload);
                    }
                }
                _ => {}
            }
        }

        self.stream.flush().await?;
        Ok(())
    }
}
