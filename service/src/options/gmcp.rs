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
use mudgate_telnetcodec::consts;
use tracing::trace;

/// Generic Mud Communication Protocol. Negotiation flips the `gmcp`
/// capability; outbound messages go through
/// [`SessionHandle::send_gmcp`](crate::SessionHandle::send_gmcp). The core
/// prescribes no inbound handling — clients rarely volunteer GMCP before
/// the application asks, and what they do send is application business.
pub struct GmcpOption;

impl OptionBehavior for GmcpOption {
    fn profile(&self) -> OptionProfile {
        OptionProfile {
            code: consts::option::GMCP,
            support_local: true,
            support_remote: false,
            start_local: true,
            start_remote: false,
        }
    }

    fn at_local_enable(&mut self, ctx: &mut ReceiveContext<'_>) {
        ctx.change_capabilities([CapabilityUpdate::Gmcp(true)]);
        ctx.settle();
    }

    fn at_receive_subnegotiate(&mut self, _ctx: &mut ReceiveContext<'_>, payload: &[u8]) {
        trace!("ignoring {} byte inbound GMCP payload", payload.len());
    }
}
