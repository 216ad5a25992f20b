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

//! Mud Terminal Type Standard
//!
//! MTTS rides on the terminal-type option (24). The server pulls three
//! reports out of the client by repeating `IAC SB MTTS SEND IAC SE`; the
//! client answers `IAC SB MTTS IS <text> IAC SE` with, in order, its name,
//! its terminal type, and an `MTTS <bitfield>` feature report. A client that
//! has nothing further to say repeats its last answer.
//!
//! <https://tintin.mudhalla.net/protocols/mtts/>

/// Reply prefix: the payload carries a terminal-type report.
pub const IS: u8 = 0;
/// Request prefix: ask the client for its next report.
pub const SEND: u8 = 1;

/// Client supports ANSI color codes.
pub const ANSI: u32 = 1;
/// Client is a VT100 terminal.
pub const VT100: u32 = 2;
/// Client uses UTF-8 encoding.
pub const UTF8: u32 = 4;
/// Client supports xterm 256 color palettes.
pub const XTERM_256: u32 = 8;
/// Client supports xterm mouse tracking.
pub const MOUSE_TRACKING: u32 = 16;
/// Client supports the OSC color palette.
pub const OSC_COLOR_PALETTE: u32 = 32;
/// Client is using a screen reader.
pub const SCREENREADER: u32 = 64;
/// Client is a proxy gateway.
pub const PROXY: u32 = 128;
/// Client supports 24-bit truecolor.
pub const TRUECOLOR: u32 = 256;
/// Client supports the Mud New-Environ Standard.
pub const MNES: u32 = 512;
/// Client supports the Mud Server Link Protocol.
pub const MSLP: u32 = 1024;
/// Client supports TLS.
pub const ENCRYPTION: u32 = 2048;

/// Clients known to speak 256 colors without saying so in their ttype.
pub const EIGHT_BIT_CLIENTS: &[&str] = &[
    "ATLANTIS",
    "CMUD",
    "KILDCLIENT",
    "MUDLET",
    "MUSHCLIENT",
    "PUTTY",
    "BEIP",
    "POTATO",
    "TINYFUGUE",
];

/// The one-byte `SEND` request payload.
pub fn request() -> &'static [u8] {
    &[SEND]
}

/// Extracts the text of an `IS` reply, or `None` if the payload is empty or
/// not a reply. Malformed UTF-8 is replaced rather than rejected.
pub fn parse_reply(payload: &[u8]) -> Option<String> {
    match payload.split_first() {
        Some((&IS, rest)) => Some(String::from_utf8_lossy(rest).into_owned()),
        _ => None,
    }
}

/// Parses the third-report bitfield: the text must read `MTTS <number>`.
pub fn parse_bitfield(report: &str) -> Option<u32> {
    report.strip_prefix("MTTS ")?.trim().parse().ok()
}
