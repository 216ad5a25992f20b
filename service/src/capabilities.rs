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

//! Per-session capability record
//!
//! Option handlers mutate this record as negotiation side effects; the rest
//! of the application observes it through a `tokio::sync::watch` channel,
//! so every mutation doubles as a change notification.
//!
//! Feature bits are monotone within a session — once a client has proven it
//! speaks GMCP it never un-speaks it — with the single exception of the two
//! `*_enabled` compression bits, which track live stream state and may
//! toggle off when a compression stream ends.

use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::watch;

/// Color depth the client is known to support, ordered by richness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColorMode {
    /// No color support proven
    #[default]
    None,
    /// Basic 16-color ANSI
    Standard,
    /// 256-color palettes
    EightBit,
    /// 24-bit truecolor
    TrueColor,
}

/// Observable, negotiated properties of one live session.
#[derive(Clone, Debug, PartialEq)]
pub struct Capabilities {
    /// Generated session name, unique per listener
    pub session_name: String,
    /// Transport is TLS
    pub encryption: bool,
    /// Peer address
    pub host_address: Option<IpAddr>,
    /// Peer port
    pub host_port: u16,
    /// Reverse-DNS names for the peer, filled in by the embedder
    pub host_names: Vec<String>,
    /// Best proven color depth
    pub color: ColorMode,
    /// Client answers NAWS window-size reports
    pub naws: bool,
    /// Client speaks MTTS
    pub mtts: bool,
    /// Client accepts MSSP status tables
    pub mssp: bool,
    /// Client accepted MCCP2 (outbound compression)
    pub mccp2: bool,
    /// Client accepted MCCP3 (inbound compression)
    pub mccp3: bool,
    /// Outbound compression is live right now
    pub mccp2_enabled: bool,
    /// Inbound compression is live right now
    pub mccp3_enabled: bool,
    /// Client speaks GMCP
    pub gmcp: bool,
    /// Window width in columns
    pub width: u16,
    /// Window height in rows
    pub height: u16,
    /// Text encoding the client asked for
    pub encoding: String,
    /// Client software name from MTTS
    pub client_name: String,
    /// Client software version from MTTS
    pub client_version: String,
    /// Client is a VT100-style terminal
    pub vt100: bool,
    /// Client is a proxy gateway
    pub proxy: bool,
    /// Client is driven by a screen reader
    pub screenreader: bool,
    /// Client supports xterm mouse tracking
    pub mouse_tracking: bool,
    /// Client supports the OSC color palette
    pub osc_color_palette: bool,
    /// Client speaks MNES
    pub mnes: bool,
    /// Client speaks MSLP
    pub mslp: bool,
    /// Client reports TLS support via MTTS
    pub encryption_client: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            session_name: String::new(),
            encryption: false,
            host_address: None,
            host_port: 0,
            host_names: Vec::new(),
            color: ColorMode::default(),
            naws: false,
            mtts: false,
            mssp: false,
            mccp2: false,
            mccp3: false,
            mccp2_enabled: false,
            mccp3_enabled: false,
            gmcp: false,
            width: 80,
            height: 24,
            encoding: "ascii".to_string(),
            client_name: String::new(),
            client_version: String::new(),
            vt100: false,
            proxy: false,
            screenreader: false,
            mouse_tracking: false,
            osc_color_palette: false,
            mnes: false,
            mslp: false,
            encryption_client: false,
        }
    }
}

/// One known-key delta applied through
/// [`CapabilityHandle::apply`]. Unknown keys cannot be expressed, which is
/// the strict-build behavior: embedders extend this enum, not a string map.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum CapabilityUpdate {
    SessionName(String),
    Encryption(bool),
    HostAddress(IpAddr),
    HostPort(u16),
    HostNames(Vec<String>),
    Color(ColorMode),
    Naws(bool),
    Mtts(bool),
    Mssp(bool),
    Mccp2(bool),
    Mccp3(bool),
    Mccp2Enabled(bool),
    Mccp3Enabled(bool),
    Gmcp(bool),
    Width(u16),
    Height(u16),
    Encoding(String),
    ClientName(String),
    ClientVersion(String),
    Vt100(bool),
    Proxy(bool),
    Screenreader(bool),
    MouseTracking(bool),
    OscColorPalette(bool),
    Mnes(bool),
    Mslp(bool),
    EncryptionClient(bool),
}

/// Live read-only view of a session's capabilities.
pub type CapabilityWatch = watch::Receiver<Capabilities>;

/// Shared mutator for one session's capability record.
///
/// Cloned into every option context and the session handle; all mutation
/// funnels through [`apply`](CapabilityHandle::apply) so watchers observe
/// each batch as one change.
#[derive(Clone, Debug)]
pub struct CapabilityHandle {
    tx: Arc<watch::Sender<Capabilities>>,
}

impl CapabilityHandle {
    /// Wraps an initial record.
    pub fn new(initial: Capabilities) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// A point-in-time copy of the record.
    pub fn snapshot(&self) -> Capabilities {
        self.tx.borrow().clone()
    }

    /// A watch receiver that observes every subsequent change.
    pub fn subscribe(&self) -> CapabilityWatch {
        self.tx.subscribe()
    }

    /// Merges a batch of updates into the record, notifying watchers once.
    pub fn apply<I>(&self, updates: I)
    where
        I: IntoIterator<Item = CapabilityUpdate>,
    {
        self.tx.send_modify(|caps| {
            for update in updates {
                apply_update(caps, update);
            }
        });
    }
}

fn apply_update(caps: &mut Capabilities, update: CapabilityUpdate) {
    use CapabilityUpdate::*;
    match update {
        SessionName(value) => caps.session_name = value,
        Encryption(value) => caps.encryption |= value,
        HostAddress(value) => caps.host_address = Some(value),
        HostPort(value) => caps.host_port = value,
        HostNames(value) => caps.host_names = value,
        Color(value) => caps.color = value,
        Naws(value) => caps.naws |= value,
        Mtts(value) => caps.mtts |= value,
        Mssp(value) => caps.mssp |= value,
        Mccp2(value) => caps.mccp2 |= value,
        Mccp3(value) => caps.mccp3 |= value,
        // Live compression state is the one non-monotone pair.
        Mccp2Enabled(value) => caps.mccp2_enabled = value,
        Mccp3Enabled(value) => caps.mccp3_enabled = value,
        Gmcp(value) => caps.gmcp |= value,
        Width(value) => caps.width = value,
        Height(value) => caps.height = value,
        Encoding(value) => caps.encoding = value,
        ClientName(value) => caps.client_name = value,
        ClientVersion(value) => caps.client_version = value,
        Vt100(value) => caps.vt100 |= value,
        Proxy(value) => caps.proxy |= value,
        Screenreader(value) => caps.screenreader |= value,
        MouseTracking(value) => caps.mouse_tracking |= value,
        OscColorPalette(value) => caps.osc_color_palette |= value,
        Mnes(value) => caps.mnes |= value,
        Mslp(value) => caps.mslp |= value,
        EncryptionClient(value) => caps.encryption_client |= value,
    }
}
