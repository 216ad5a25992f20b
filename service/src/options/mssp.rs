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

/// Mud Server Status Protocol. Negotiation only flips the `mssp`
/// capability; the status table itself goes out through
/// [`SessionHandle::send_mssp`](crate::SessionHandle::send_mssp) once the
/// application decides what to publish.
pub struct MsspOption;

impl OptionBehavior for MsspOption {
    fn profile(&self) -> OptionProfile {
        OptionProfile {
            code: consts::option::MSSP,
            support_local: true,
            support_remote: false,
            start_local: true,
            start_remote: false,
        }
    }

    fn at_local_enable(&mut self, ctx: &mut ReceiveContext<'_>) {
        ctx.settle();
        ctx.change_capabilities([CapabilityUpdate::Mssp(true)]);
    }
}
