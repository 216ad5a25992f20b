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

//! # Mudgate Telnet Codec
//!
//! Frame-level Telnet (RFC 854) encoding and decoding for the mudgate
//! portal, covering the MUD option set (NAWS, MTTS, MSSP, MCCP2/3, GMCP).
//!
//! ## Overview
//!
//! The heart of the crate is [`parse`], a pure resumable decoder: given a
//! byte buffer it returns how many bytes to consume and at most one
//! [`TelnetMessage`] — a data run, a single-byte command, a three-byte
//! negotiation, or a subnegotiation payload. Feeding it a partial sequence
//! yields `(0, None)` until the rest arrives, so it can sit directly on a
//! socket read buffer no matter how the stream is chunked.
//!
//! [`TelnetCodec`] wraps the same logic in `tokio_util`'s [`Decoder`] and
//! [`Encoder`] traits. The connection engine drives `decode` by hand against
//! its own buffer rather than through `Framed`, because MCCP3 requires
//! splicing decompressed bytes into the middle of that buffer.
//!
//! The codec never errors on malformed input: unknown commands surface as
//! [`TelnetMessage::Command`] and policy (reject, ignore, log) belongs to the
//! dispatcher.
//!
//! ## Wire format
//!
//! - 2-byte commands: `IAC <command>`
//! - 3-byte negotiation: `IAC <WILL|WONT|DO|DONT> <option>`
//! - Subnegotiation: `IAC SB <option> <payload...> IAC SE`
//! - Literal `0xFF` in data is escaped by doubling: `IAC IAC`
//!
//! Subnegotiation payloads are delivered raw — interior `IAC IAC` pairs are
//! not collapsed, matching what the per-option parsers in [`mod@args`]
//! expect.
//!
//! [`Decoder`]: tokio_util::codec::Decoder
//! [`Encoder`]: tokio_util::codec::Encoder

#![warn(
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

mod args;
mod codec;
pub mod consts;
mod message;
mod result;

pub use self::args::{gmcp, mssp, mtts, naws};
pub use self::codec::{TelnetCodec, parse};
pub use self::message::TelnetMessage;
pub use self::result::{CodecError, CodecResult};
