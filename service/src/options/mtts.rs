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

use crate::capabilities::{CapabilityUpdate, ColorMode};
use crate::options::{OptionBehavior, OptionProfile, ReceiveContext};
use bytes::Bytes;
use mudgate_telnetcodec::{consts, mtts};
use tracing::debug;

/// Mud Terminal Type Standard — a three-step pull.
///
/// Once the client confirms the option, the portal requests reports one at
/// a time: client name (`"Mudlet 4.17"`), terminal type
/// (`"XTERM-256COLOR"`), then the `MTTS <bitfield>` feature summary. Each
/// answer raises capability floors; a client repeating its previous answer
/// has nothing left to say and the exchange settles early.
pub struct MttsOption {
    requests_sent: u32,
    last_received: String,
}

impl MttsOption {
    /// Creates the option in its pre-request state.
    pub fn new() -> Self {
        Self {
            requests_sent: 0,
            last_received: String::new(),
        }
    }

    fn request(&mut self, ctx: &ReceiveContext<'_>) {
        self.requests_sent += 1;
        ctx.send_subnegotiate(Bytes::from_static(mtts::request()));
    }

    /// First report: client name, optionally followed by a version.
    fn handle_name(&self, ctx: &ReceiveContext<'_>, report: &str) {
        let (name, version) = match report.split_once(' ') {
            Some((name, version)) => (name, Some(version)),
            None => (report, None),
        };

        let mut updates = vec![CapabilityUpdate::ClientName(name.to_string())];
        if let Some(version) = version {
            updates.push(CapabilityUpdate::ClientVersion(version.to_string()));
        }

        // Anything that speaks MTTS at all can do basic ANSI.
        let mut max_color = ColorMode::Standard;
        let upper = name.to_uppercase();
        if mtts::EIGHT_BIT_CLIENTS.contains(&upper.as_str()) {
            max_color = max_color.max(ColorMode::EightBit);
        }
        if upper == "MUDLET" && version.is_some_and(|v| v.starts_with("1.1")) {
            max_color = max_color.max(ColorMode::EightBit);
        }

        if max_color != ctx.capabilities().snapshot().color {
            updates.push(CapabilityUpdate::Color(max_color));
        }
        ctx.change_capabilities(updates);
    }

    /// Second report: terminal type.
    fn handle_ttype(&self, ctx: &ReceiveContext<'_>, report: &str) {
        let first = report.split('-').next().unwrap_or(report);

        let current = ctx.capabilities().snapshot().color;
        let mut max_color = current;

        if max_color < ColorMode::EightBit
            && (first.ends_with("-256COLOR")
                || (first.ends_with("XTERM") && !first.ends_with("-COLOR")))
        {
            max_color = ColorMode::EightBit;
        }

        let mut updates = Vec::new();
        match first.to_uppercase().as_str() {
            "DUMB" | "ANSI" => {}
            "VT100" => updates.push(CapabilityUpdate::Vt100(true)),
            "XTERM" => max_color = max_color.max(ColorMode::EightBit),
            _ => {}
        }

        if max_color != current {
            updates.push(CapabilityUpdate::Color(max_color));
        }
        if !updates.is_empty() {
            ctx.change_capabilities(updates);
        }
    }

    /// Third report: the `MTTS <bitfield>` feature summary.
    fn handle_standard(&self, ctx: &ReceiveContext<'_>, report: &str) {
        let Some(bits) = mtts::parse_bitfield(report) else {
            debug!("discarding malformed MTTS bitfield report {report:?}");
            return;
        };

        let current = ctx.capabilities().snapshot().color;
        let mut max_color = current;
        let mut updates = Vec::new();

        if bits & mtts::ENCRYPTION != 0 {
            updates.push(CapabilityUpdate::EncryptionClient(true));
        }
        if bits & mtts::MSLP != 0 {
            updates.push(CapabilityUpdate::Mslp(true));
        }
        if bits & mtts::MNES != 0 {
            updates.push(CapabilityUpdate::Mnes(true));
        }
        if bits & mtts::TRUECOLOR != 0 {
            max_color = max_color.max(ColorMode::TrueColor);
        }
        if bits & mtts::PROXY != 0 {
            updates.push(CapabilityUpdate::Proxy(true));
        }
        if bits & mtts::SCREENREADER != 0 {
            updates.push(CapabilityUpdate::Screenreader(true));
        }
        if bits & mtts::OSC_COLOR_PALETTE != 0 {
            updates.push(CapabilityUpdate::OscColorPalette(true));
        }
        if bits & mtts::MOUSE_TRACKING != 0 {
            updates.push(CapabilityUpdate::MouseTracking(true));
        }
        if bits & mtts::XTERM_256 != 0 {
            max_color = max_color.max(ColorMode::EightBit);
        }
        if bits & mtts::UTF8 != 0 {
            updates.push(CapabilityUpdate::Encoding("utf-8".to_string()));
        }
        if bits & mtts::VT100 != 0 {
            updates.push(CapabilityUpdate::Vt100(true));
        }
        if bits & mtts::ANSI != 0 {
            max_color = max_color.max(ColorMode::Standard);
        }

        if max_color != current {
            updates.push(CapabilityUpdate::Color(max_color));
        }
        ctx.change_capabilities(updates);
    }
}

impl Default for MttsOption {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionBehavior for MttsOption {
    fn profile(&self) -> OptionProfile {
        OptionProfile {
            code: consts::option::MTTS,
            support_local: false,
            support_remote: true,
            start_local: false,
            start_remote: true,
        }
    }

    fn at_remote_enable(&mut self, ctx: &mut ReceiveContext<'_>) {
        ctx.change_capabilities([CapabilityUpdate::Mtts(true)]);
        self.request(ctx);
    }

    fn at_receive_subnegotiate(&mut self, ctx: &mut ReceiveContext<'_>, payload: &[u8]) {
        let Some(report) = mtts::parse_reply(payload) else {
            return;
        };

        // A repeated report means the client has cycled; stop asking.
        if report == self.last_received {
            ctx.settle();
            return;
        }

        match self.requests_sent {
            1 => {
                self.handle_name(ctx, &report);
                self.request(ctx);
            }
            2 => {
                self.handle_ttype(ctx, &report);
                self.request(ctx);
            }
            3 => {
                self.handle_standard(ctx, &report);
                ctx.settle();
            }
            _ => {}
        }
        self.last_received = report;
    }
}
