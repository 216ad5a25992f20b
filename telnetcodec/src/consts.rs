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

//! Telnet wire constants (RFC 854 plus the MUD option set).

/// No Operation / padding byte
pub const NUL: u8 = 0;
/// Bell
pub const BEL: u8 = 7;
/// Line Feed
pub const LF: u8 = 10;
/// Carriage Return
pub const CR: u8 = 13;
/// End of Record command (prompt marker)
pub const EOR: u8 = 239;
/// Subnegotiation End
pub const SE: u8 = 240;
/// No Operation command
pub const NOP: u8 = 241;
/// Go Ahead
pub const GA: u8 = 249;
/// Subnegotiation Begin
pub const SB: u8 = 250;
/// Sender wants to enable an option on its side
pub const WILL: u8 = 251;
/// Sender refuses or disables an option on its side
pub const WONT: u8 = 252;
/// Sender asks the peer to enable an option
pub const DO: u8 = 253;
/// Sender asks the peer to disable an option
pub const DONT: u8 = 254;
/// Interpret As Command escape
pub const IAC: u8 = 255;

/// Negotiable option codes.
pub mod option {
    /// Suppress Go Ahead (RFC 858)
    pub const SGA: u8 = 3;
    /// Mud Terminal Type Standard (terminal-type option, RFC 1091)
    pub const MTTS: u8 = 24;
    /// End of Record option (RFC 885)
    pub const EOR: u8 = 25;
    /// Negotiate About Window Size (RFC 1073)
    pub const NAWS: u8 = 31;
    /// Line mode (RFC 1184)
    pub const LINEMODE: u8 = 34;
    /// Mud New-Environ Standard
    pub const MNES: u8 = 39;
    /// Mud Server Data Protocol
    pub const MSDP: u8 = 69;
    /// Mud Server Status Protocol
    pub const MSSP: u8 = 70;
    /// Mud Client Compression Protocol v2 (server to client)
    pub const MCCP2: u8 = 86;
    /// Mud Client Compression Protocol v3 (client to server)
    pub const MCCP3: u8 = 87;
    /// Mud eXtension Protocol
    pub const MXP: u8 = 91;
    /// Generic Mud Communication Protocol
    pub const GMCP: u8 = 201;
}

/// Human-readable name for a negotiation verb or command byte, for logging.
pub fn command_name(code: u8) -> &'static str {
    match code {
        EOR => "EOR",
        SE => "SE",
        NOP => "NOP",
        GA => "GA",
        SB => "SB",
        WILL => "WILL",
        WONT => "WONT",
        DO => "DO",
        DONT => "DONT",
        IAC => "IAC",
        _ => "?",
    }
}

/// Human-readable name for an option code, for logging.
pub fn option_name(code: u8) -> &'static str {
    match code {
        option::SGA => "SGA",
        option::MTTS => "MTTS",
        option::EOR => "EOR",
        option::NAWS => "NAWS",
        option::LINEMODE => "LINEMODE",
        option::MNES => "MNES",
        option::MSDP => "MSDP",
        option::MSSP => "MSSP",
        option::MCCP2 => "MCCP2",
        option::MCCP3 => "MCCP3",
        option::MXP => "MXP",
        option::GMCP => "GMCP",
        _ => "?",
    }
}
