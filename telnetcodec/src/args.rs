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

//! Typed subnegotiation payloads for the options the portal speaks.
//!
//! The frame codec hands payloads over raw; these modules give each option
//! its wire format. MCCP2/MCCP3 activation subnegotiations are empty and
//! need no module here.

/// GMCP (Generic Mud Communication Protocol) message payloads
pub mod gmcp;
/// MSSP (Mud Server Status Protocol) key/value tables
pub mod mssp;
/// MTTS (Mud Terminal Type Standard) request/reply framing and bitfield
pub mod mtts;
/// NAWS (Negotiate About Window Size) window dimensions
pub mod naws;
