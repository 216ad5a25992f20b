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

use crate::options::{OptionBehavior, OptionProfile};
use mudgate_telnetcodec::consts;

/// End-of-Record placeholder. Registered so inbound negotiation gets a
/// well-formed refusal instead of the unknown-option fallback; the portal
/// never emits EOR prompts itself.
pub struct EorOption;

impl OptionBehavior for EorOption {
    fn profile(&self) -> OptionProfile {
        OptionProfile {
            code: consts::option::EOR,
            support_local: false,
            support_remote: false,
            start_local: false,
            start_remote: false,
        }
    }
}
