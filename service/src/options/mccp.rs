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

//! Mud Client Compression Protocol, both directions.
//!
//! MCCP2 compresses server-to-client: after the client confirms, the portal
//! emits an empty `SB MCCP2` whose terminating `IAC SE` is the last
//! uncompressed byte on the wire — the deflater is installed by the
//! send-hook that fires right after those bytes reach the transport.
//!
//! MCCP3 compresses client-to-server: the client announces the switch with
//! an empty `SB MCCP3`, and every byte after that frame's terminator is
//! deflate data. Whatever already sat in the read buffer behind the frame
//! must therefore be inflated in place before parsing continues.

use crate::capabilities::CapabilityUpdate;
use crate::options::{OptionBehavior, OptionProfile, ReceiveContext, SendContext};
use bytes::Bytes;
use mudgate_compress::{Deflater, Inflater};
use mudgate_telnetcodec::consts;
use tracing::{debug, warn};

/// Outbound compression (server to client).
pub struct Mccp2Option;

impl OptionBehavior for Mccp2Option {
    fn profile(&self) -> OptionProfile {
        OptionProfile {
            code: consts::option::MCCP2,
            support_local: true,
            support_remote: false,
            start_local: true,
            start_remote: false,
        }
    }

    fn at_local_enable(&mut self, ctx: &mut ReceiveContext<'_>) {
        ctx.change_capabilities([CapabilityUpdate::Mccp2(true)]);
        ctx.settle();
        // The activation frame; compression starts the moment it is sent.
        ctx.send_subnegotiate(Bytes::new());
    }

    fn at_send_subnegotiate(&mut self, ctx: &mut SendContext<'_>, _payload: &[u8]) {
        if !ctx.capabilities().snapshot().mccp2_enabled {
            ctx.change_capabilities([CapabilityUpdate::Mccp2Enabled(true)]);
            *ctx.deflater = Some(Deflater::new());
            debug!("outbound compression active");
        }
    }
}

/// Inbound compression (client to server).
pub struct Mccp3Option;

impl OptionBehavior for Mccp3Option {
    fn profile(&self) -> OptionProfile {
        OptionProfile {
            code: consts::option::MCCP3,
            support_local: true,
            support_remote: false,
            start_local: true,
            start_remote: false,
        }
    }

    fn at_local_enable(&mut self, ctx: &mut ReceiveContext<'_>) {
        ctx.change_capabilities([CapabilityUpdate::Mccp3(true)]);
        ctx.settle();
    }

    fn at_receive_subnegotiate(&mut self, ctx: &mut ReceiveContext<'_>, _payload: &[u8]) {
        if ctx.capabilities().snapshot().mccp3_enabled {
            return;
        }
        ctx.change_capabilities([CapabilityUpdate::Mccp3Enabled(true)]);
        debug!("inbound compression active");

        // Bytes already buffered behind the activation frame arrived after
        // its terminator and are compressed; inflate them in place.
        let mut inflater = Inflater::new();
        let buffered = ctx.read_buffer.split();
        match inflater.inflate(&buffered) {
            Ok(inflated) => {
                ctx.read_buffer.extend_from_slice(&inflated.data);
                match inflated.trailing {
                    None => *ctx.inflater = Some(inflater),
                    Some(rest) => {
                        // The peer's stream already ended; fall straight
                        // back to plaintext.
                        ctx.change_capabilities([CapabilityUpdate::Mccp3Enabled(false)]);
                        ctx.send_negotiate(consts::WONT);
                        ctx.read_buffer.extend_from_slice(&rest);
                    }
                }
            }
            Err(err) => {
                warn!("inbound compression failed to start: {err}");
                ctx.change_capabilities([CapabilityUpdate::Mccp3Enabled(false)]);
                ctx.send_negotiate(consts::WONT);
            }
        }
    }
}
