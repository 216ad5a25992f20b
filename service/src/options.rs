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

//! Option negotiation state machine and registry
//!
//! Every negotiable option carries two independent half-states: `local`
//! (what we do) and `remote` (what the peer does), each driven by the
//! WILL/WONT/DO/DONT exchange. The generic transition matrix lives on
//! [`OptionInstance`]; per-option side effects live behind the
//! [`OptionBehavior`] trait, whose hooks receive explicit contexts instead
//! of a back-reference to the connection.
//!
//! Hooks run synchronously: everything they can do — enqueue an outbound
//! message, mutate the capability record, settle the startup barrier —
//! completes without suspending.

use crate::capabilities::{CapabilityHandle, CapabilityUpdate};
use crate::types::{Outbound, OutboundSender};
use bytes::{Bytes, BytesMut};
use mudgate_compress::{Deflater, Inflater};
use mudgate_telnetcodec::{TelnetMessage, consts};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

mod eor;
mod gmcp;
mod linemode;
mod mccp;
mod mssp;
mod mtts;
mod naws;
mod sga;

pub use self::eor::EorOption;
pub use self::gmcp::GmcpOption;
pub use self::linemode::LinemodeOption;
pub use self::mccp::{Mccp2Option, Mccp3Option};
pub use self::mssp::MsspOption;
pub use self::mtts::MttsOption;
pub use self::naws::NawsOption;
pub use self::sga::SgaOption;

/// One side of an option: enabled once negotiation confirms it, negotiating
/// while our request is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptionHalf {
    /// The option is confirmed active on this side.
    pub enabled: bool,
    /// We sent a request and no terminal response has arrived yet.
    pub negotiating: bool,
}

/// The local and remote halves of one option.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptionPerspective {
    /// What we do
    pub local: OptionHalf,
    /// What the peer does
    pub remote: OptionHalf,
}

/// Static descriptor of an option: its code, which sides we support, and
/// which sides we proactively request at connection start.
///
/// `start_local` implies `support_local`, likewise remote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptionProfile {
    /// Wire option code
    pub code: u8,
    /// We are willing to perform this option ourselves
    pub support_local: bool,
    /// We are willing to let the peer perform it
    pub support_remote: bool,
    /// Send `WILL` at connection start
    pub start_local: bool,
    /// Send `DO` at connection start
    pub start_remote: bool,
}

/// One-shot signal that an option's startup negotiation resolved — enabled,
/// rejected, or its sub-exchange completed. The negotiation barrier waits on
/// the whole registry's worth of these, bounded by a timeout.
#[derive(Clone, Debug)]
pub struct Settled {
    tx: Arc<watch::Sender<bool>>,
}

impl Settled {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fires the signal. Idempotent.
    pub fn settle(&self) {
        self.tx.send_replace(true);
    }

    /// Whether the signal has fired.
    pub fn is_settled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Completes once the signal fires.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so wait_for cannot fail.
        let _ = rx.wait_for(|settled| *settled).await;
    }
}

/// Context handed to receive-side hooks (negotiation transitions and inbound
/// subnegotiations), which run on the reader task.
pub struct ReceiveContext<'a> {
    pub(crate) code: u8,
    pub(crate) capabilities: &'a CapabilityHandle,
    pub(crate) outbound: &'a OutboundSender,
    pub(crate) settled: &'a Settled,
    /// Raw read buffer; MCCP3 rewrites it when inbound compression starts.
    pub(crate) read_buffer: &'a mut BytesMut,
    /// Reader-owned inflater slot; MCCP3 installs into it.
    pub(crate) inflater: &'a mut Option<Inflater>,
}

impl ReceiveContext<'_> {
    /// The session's capability record.
    pub fn capabilities(&self) -> &CapabilityHandle {
        self.capabilities
    }

    /// Merges capability updates, notifying watchers.
    pub fn change_capabilities<I>(&self, updates: I)
    where
        I: IntoIterator<Item = CapabilityUpdate>,
    {
        self.capabilities.apply(updates);
    }

    /// Enqueues `IAC <command> <code>` for this option.
    pub fn send_negotiate(&self, command: u8) {
        let _ = self.outbound.send(Outbound::Message(TelnetMessage::Negotiate(
            command, self.code,
        )));
    }

    /// Enqueues `IAC SB <code> <payload> IAC SE`.
    pub fn send_subnegotiate(&self, payload: Bytes) {
        let _ = self.outbound.send(Outbound::Message(TelnetMessage::SubNegotiate(
            self.code, payload,
        )));
    }

    /// Marks this option's startup negotiation as resolved.
    pub fn settle(&self) {
        self.settled.settle();
    }
}

/// Context handed to send-side hooks, which run on the writer task after the
/// message's bytes reached the transport.
pub struct SendContext<'a> {
    pub(crate) capabilities: &'a CapabilityHandle,
    /// Writer-owned deflater slot; MCCP2 installs into it.
    pub(crate) deflater: &'a mut Option<Deflater>,
}

impl SendContext<'_> {
    /// The session's capability record.
    pub fn capabilities(&self) -> &CapabilityHandle {
        self.capabilities
    }

    /// Merges capability updates, notifying watchers.
    pub fn change_capabilities<I>(&self, updates: I)
    where
        I: IntoIterator<Item = CapabilityUpdate>,
    {
        self.capabilities.apply(updates);
    }
}

/// Per-option side effects.
///
/// Defaults are no-ops except for the enable/reject hooks, which settle the
/// startup barrier — an option with no sub-exchange is done the moment its
/// negotiation confirms or fails.
pub trait OptionBehavior: Send {
    /// Static descriptor for this option.
    fn profile(&self) -> OptionProfile;

    /// Our side was confirmed on (peer sent `DO`).
    fn at_local_enable(&mut self, ctx: &mut ReceiveContext<'_>) {
        ctx.settle();
    }

    /// Our side was turned off (peer sent `DONT` while enabled).
    fn at_local_disable(&mut self, _ctx: &mut ReceiveContext<'_>) {}

    /// Our pending `WILL` was refused.
    fn at_local_reject(&mut self, ctx: &mut ReceiveContext<'_>) {
        ctx.settle();
    }

    /// The peer's side was confirmed on (peer sent `WILL`).
    fn at_remote_enable(&mut self, ctx: &mut ReceiveContext<'_>) {
        ctx.settle();
    }

    /// The peer's side was turned off (peer sent `WONT` while enabled).
    fn at_remote_disable(&mut self, _ctx: &mut ReceiveContext<'_>) {}

    /// Our pending `DO` was refused.
    fn at_remote_reject(&mut self, ctx: &mut ReceiveContext<'_>) {
        ctx.settle();
    }

    /// A subnegotiation arrived for this option. Payload is raw; interior
    /// `IAC IAC` pairs are not collapsed.
    fn at_receive_subnegotiate(&mut self, _ctx: &mut ReceiveContext<'_>, _payload: &[u8]) {}

    /// One of our own negotiation messages just hit the transport.
    fn at_send_negotiate(&mut self, _ctx: &mut SendContext<'_>, _command: u8) {}

    /// One of our own subnegotiations just hit the transport. MCCP2 turns
    /// compression on here, so the activation frame itself goes out plain.
    fn at_send_subnegotiate(&mut self, _ctx: &mut SendContext<'_>, _payload: &[u8]) {}
}

/// One option's full negotiation state for one connection: descriptor,
/// half-state pair, settled signal, and behavior.
pub struct OptionInstance {
    profile: OptionProfile,
    perspective: OptionPerspective,
    settled: Settled,
    behavior: Box<dyn OptionBehavior>,
}

impl OptionInstance {
    /// Wraps a behavior. The profile's start flags must not exceed its
    /// support flags.
    pub fn new(behavior: Box<dyn OptionBehavior>) -> Self {
        let profile = behavior.profile();
        debug_assert!(
            !profile.start_local || profile.support_local,
            "start_local requires support_local"
        );
        debug_assert!(
            !profile.start_remote || profile.support_remote,
            "start_remote requires support_remote"
        );
        Self {
            profile,
            perspective: OptionPerspective::default(),
            settled: Settled::new(),
            behavior,
        }
    }

    /// Wire option code.
    pub fn code(&self) -> u8 {
        self.profile.code
    }

    /// Static descriptor.
    pub fn profile(&self) -> OptionProfile {
        self.profile
    }

    /// Current half-state pair.
    pub fn perspective(&self) -> OptionPerspective {
        self.perspective
    }

    /// This option's settled signal.
    pub fn settled(&self) -> Settled {
        self.settled.clone()
    }

    /// Connection-start kick-off: request the sides this option starts.
    /// An option that requests nothing has nothing to wait for and settles
    /// immediately, so it never pins the negotiation barrier to its timeout.
    pub(crate) fn start(&mut self, outbound: &OutboundSender) {
        if self.profile.start_local {
            let _ = outbound.send(Outbound::Message(TelnetMessage::Negotiate(
                consts::WILL,
                self.profile.code,
            )));
            self.perspective.local.negotiating = true;
        }
        if self.profile.start_remote {
            let _ = outbound.send(Outbound::Message(TelnetMessage::Negotiate(
                consts::DO,
                self.profile.code,
            )));
            self.perspective.remote.negotiating = true;
        }
        if !self.profile.start_local && !self.profile.start_remote {
            self.settled.settle();
        }
    }

    /// Applies one inbound negotiation verb to the matching half-state and
    /// fires the behavior's transition hooks.
    ///
    /// A confirming verb for an already-enabled half is a no-op: each
    /// enable/disable hook fires at most once per state change.
    pub(crate) fn receive_negotiate(&mut self, command: u8, ctx: &mut ReceiveContext<'_>) {
        match command {
            consts::WILL => {
                if self.profile.support_remote {
                    if !self.perspective.remote.enabled {
                        self.perspective.remote.enabled = true;
                        if !self.perspective.remote.negotiating {
                            ctx.send_negotiate(consts::DO);
                        }
                        self.perspective.remote.negotiating = false;
                        self.behavior.at_remote_enable(ctx);
                    }
                } else {
                    ctx.send_negotiate(consts::DONT);
                }
            }
            consts::DO => {
                if self.profile.support_local {
                    if !self.perspective.local.enabled {
                        self.perspective.local.enabled = true;
                        if !self.perspective.local.negotiating {
                            ctx.send_negotiate(consts::WILL);
                        }
                        self.perspective.local.negotiating = false;
                        self.behavior.at_local_enable(ctx);
                    }
                } else {
                    ctx.send_negotiate(consts::DONT);
                }
            }
            consts::WONT => {
                if self.profile.support_remote {
                    if self.perspective.remote.enabled {
                        self.perspective.remote.enabled = false;
                        self.behavior.at_remote_disable(ctx);
                    }
                    if self.perspective.remote.negotiating {
                        self.perspective.remote.negotiating = false;
                        self.behavior.at_remote_reject(ctx);
                    }
                }
            }
            consts::DONT => {
                if self.profile.support_local {
                    if self.perspective.local.enabled {
                        self.perspective.local.enabled = false;
                        self.behavior.at_local_disable(ctx);
                    }
                    if self.perspective.local.negotiating {
                        self.perspective.local.negotiating = false;
                        self.behavior.at_local_reject(ctx);
                    }
                }
            }
            _ => {}
        }
    }

    pub(crate) fn receive_subnegotiate(&mut self, ctx: &mut ReceiveContext<'_>, payload: &[u8]) {
        self.behavior.at_receive_subnegotiate(ctx, payload);
    }

    pub(crate) fn sent_negotiate(&mut self, ctx: &mut SendContext<'_>, command: u8) {
        self.behavior.at_send_negotiate(ctx, command);
    }

    pub(crate) fn sent_subnegotiate(&mut self, ctx: &mut SendContext<'_>, payload: &[u8]) {
        self.behavior.at_send_subnegotiate(ctx, payload);
    }
}

impl std::fmt::Debug for OptionInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionInstance")
            .field("profile", &self.profile)
            .field("perspective", &self.perspective)
            .field("settled", &self.settled.is_settled())
            .finish()
    }
}

/// The set of options one connection negotiates, keyed and iterated by
/// option code.
#[derive(Debug, Default)]
pub struct OptionRegistry {
    options: BTreeMap<u8, OptionInstance>,
}

impl OptionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the full MUD option set: SGA, MTTS, EOR,
    /// NAWS, LINEMODE, MSSP, MCCP2, MCCP3, and GMCP.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register(Box::new(SgaOption))
            .register(Box::new(MttsOption::new()))
            .register(Box::new(EorOption))
            .register(Box::new(NawsOption))
            .register(Box::new(LinemodeOption))
            .register(Box::new(MsspOption))
            .register(Box::new(Mccp2Option))
            .register(Box::new(Mccp3Option))
            .register(Box::new(GmcpOption));
        registry
    }

    /// Registers a behavior, replacing any previous one for the same code.
    pub fn register(&mut self, behavior: Box<dyn OptionBehavior>) -> &mut Self {
        let instance = OptionInstance::new(behavior);
        self.options.insert(instance.code(), instance);
        self
    }

    /// Registered option codes in ascending order.
    pub fn codes(&self) -> impl Iterator<Item = u8> + '_ {
        self.options.keys().copied()
    }

    /// Looks up one option's state.
    pub fn get(&self, code: u8) -> Option<&OptionInstance> {
        self.options.get(&code)
    }

    pub(crate) fn get_mut(&mut self, code: u8) -> Option<&mut OptionInstance> {
        self.options.get_mut(&code)
    }

    /// Kicks off negotiation for every option, in registry order.
    pub(crate) fn start_all(&mut self, outbound: &OutboundSender) {
        for instance in self.options.values_mut() {
            instance.start(outbound);
        }
    }

    /// Settled signals for the negotiation barrier.
    pub(crate) fn settled_signals(&self) -> Vec<Settled> {
        self.options.values().map(OptionInstance::settled).collect()
    }
}
