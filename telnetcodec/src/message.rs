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

use crate::consts;
use bytes::Bytes;

///
/// A single decoded unit of the Telnet stream.
///
/// The decoder produces exactly one of these per call; the encoder turns each
/// back into wire bytes. Data runs carry application bytes with the IAC
/// escaping already unfolded; subnegotiation payloads are handed over raw
/// (interior `IAC IAC` pairs are NOT collapsed — option handlers that care
/// must un-double them).
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetMessage {
    /// A run of opaque application bytes.
    Data(Bytes),
    /// A single-byte command such as NOP or GA.
    Command(u8),
    /// A `WILL`/`WONT`/`DO`/`DONT` exchange for the given option.
    Negotiate(u8, u8),
    /// Option-specific payload framed by `IAC SB <option> ... IAC SE`.
    SubNegotiate(u8, Bytes),
}

impl TelnetMessage {
    /// Number of bytes this message occupies on the wire, before IAC doubling.
    pub fn encoded_len(&self) -> usize {
        match self {
            TelnetMessage::Data(bytes) => bytes.len(),
            TelnetMessage::Command(_) => 2,
            TelnetMessage::Negotiate(_, _) => 3,
            TelnetMessage::SubNegotiate(_, payload) => 5 + payload.len(),
        }
    }
}

impl std::fmt::Display for TelnetMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetMessage::Data(bytes) => write!(f, "Data[{} bytes]", bytes.len()),
            TelnetMessage::Command(command) => {
                write!(f, "IAC {}", consts::command_name(*command))
            }
            TelnetMessage::Negotiate(command, option) => write!(
                f,
                "IAC {} {}",
                consts::command_name(*command),
                consts::option_name(*option)
            ),
            TelnetMessage::SubNegotiate(option, payload) => write!(
                f,
                "IAC SB {} [{} bytes] IAC SE",
                consts::option_name(*option),
                payload.len()
            ),
        }
    }
}
