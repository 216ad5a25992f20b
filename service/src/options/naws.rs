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

use crate::capabilities::CapabilityUpdate;
use crate::options::{OptionBehavior, OptionProfile, ReceiveContext};
use mudgate_telnetcodec::{consts, naws::WindowSize};
use tracing::debug;

/// Negotiate About Window Size. The portal asks the client to report its
/// window; each report updates the `width`/`height` capabilities.
pub struct NawsOption;

impl OptionBehavior for NawsOption {
    fn profile(&self) -> OptionProfile {
        OptionProfile {
            code: consts::option::NAWS,
            support_local: false,
            support_remote: true,
            start_local: false,
            start_remote: true,
        }
    }

    fn at_remote_enable(&mut self, ctx: &mut ReceiveContext<'_>) {
        ctx.change_capabilities([CapabilityUpdate::Naws(true)]);
        ctx.settle();
    }

    fn at_receive_subnegotiate(&mut self, ctx: &mut ReceiveContext<'_>, payload: &[u8]) {
        match WindowSize::decode(payload) {
            Ok(size) => {
                ctx.change_capabilities([
                    CapabilityUpdate::Width(size.cols),
                    CapabilityUpdate::Height(size.rows),
                ]);
            }
            Err(_) => {
                debug!("ignoring NAWS report of {} bytes", payload.len());
            }
        }
    }
}
