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

use crate::result::CodecError;
use crate::{TelnetMessage, consts};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

/// Parse one Telnet message from the front of `input`.
///
/// Returns `(advance, message)` where `advance` is the number of bytes
/// consumed. `(0, None)` means the buffer holds an incomplete sequence;
/// callers keep the bytes and try again once more arrive. The function is
/// pure: it never mutates `input` and never fails — malformed sequences come
/// back as [`TelnetMessage::Command`] or [`TelnetMessage::Data`] for the
/// dispatch layer to police.
///
/// Resumability contract: removing `advance` bytes and calling again
/// processes any finite concatenation of well-formed messages without
/// stalling, regardless of how the stream was chunked.
pub fn parse(input: &[u8]) -> (usize, Option<TelnetMessage>) {
    if input.is_empty() {
        return (0, None);
    }

    if input[0] != consts::IAC {
        // Plain data run up to the next IAC (or the end of the buffer).
        let end = input
            .iter()
            .position(|&byte| byte == consts::IAC)
            .unwrap_or(input.len());
        return (
            end,
            Some(TelnetMessage::Data(Bytes::copy_from_slice(&input[..end]))),
        );
    }

    if input.len() < 2 {
        // A lone IAC means nothing yet.
        return (0, None);
    }

    match input[1] {
        consts::IAC => {
            // Escaped IAC: one literal 0xFF data byte.
            (2, Some(TelnetMessage::Data(Bytes::from_static(&[consts::IAC]))))
        }
        consts::WILL | consts::WONT | consts::DO | consts::DONT => {
            if input.len() < 3 {
                (0, None)
            } else {
                (3, Some(TelnetMessage::Negotiate(input[1], input[2])))
            }
        }
        consts::SB => match scan_subnegotiation_end(input) {
            Some(end) if end >= 5 => (
                end,
                Some(TelnetMessage::SubNegotiate(
                    input[2],
                    Bytes::copy_from_slice(&input[3..end - 2]),
                )),
            ),
            _ => (0, None),
        },
        command => (2, Some(TelnetMessage::Command(command))),
    }
}

/// Find the end of an `IAC SB ...` sequence, scanning from the option byte
/// for an unescaped `IAC SE`. Interior `IAC IAC` pairs are stepped over.
/// Returns the total length including the terminator, or `None` if the
/// terminator has not arrived yet.
fn scan_subnegotiation_end(input: &[u8]) -> Option<usize> {
    let mut i = 2;
    while i + 1 < input.len() {
        if input[i] == consts::IAC {
            if input[i + 1] == consts::SE {
                return Some(i + 2);
            }
            if input[i + 1] == consts::IAC {
                i += 2;
                continue;
            }
        }
        i += 1;
    }
    None
}

///
/// Stateless codec over [`parse`], fitting the `tokio_util` [`Decoder`] and
/// [`Encoder`] traits.
///
/// All framing state lives in the caller's buffer: `decode` consumes exactly
/// the bytes of the message it returns, so the connection engine can drive it
/// directly against its own read buffer (which it must, to splice
/// decompressed bytes in mid-stream when MCCP3 activates).
///
#[derive(Clone, Copy, Debug, Default)]
pub struct TelnetCodec;

impl TelnetCodec {
    /// Creates a new `TelnetCodec`.
    pub fn new() -> TelnetCodec {
        TelnetCodec
    }
}

impl Decoder for TelnetCodec {
    type Item = TelnetMessage;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<TelnetMessage>, Self::Error> {
        let (advance, message) = parse(src);
        if advance > 0 {
            src.advance(advance);
        }
        if let Some(TelnetMessage::Command(command)) = &message {
            if consts::command_name(*command) == "?" {
                warn!("received unknown command {command:#04X}");
            }
        }
        Ok(message)
    }
}

impl Encoder<TelnetMessage> for TelnetCodec {
    type Error = CodecError;

    /// Serializes a message to wire bytes.
    ///
    /// `Data` runs have every IAC byte doubled. Subnegotiation payloads are
    /// written verbatim between `IAC SB <option>` and `IAC SE`; per Telnet
    /// convention a handler that wants a literal IAC inside a payload must
    /// pre-escape it.
    fn encode(&mut self, item: TelnetMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            TelnetMessage::Data(bytes) => {
                dst.reserve(bytes.len() + 4);
                for &byte in bytes.iter() {
                    if byte == consts::IAC {
                        dst.put_u8(consts::IAC);
                    }
                    dst.put_u8(byte);
                }
            }
            TelnetMessage::Command(command) => {
                dst.reserve(2);
                dst.put_u8(consts::IAC);
                dst.put_u8(command);
            }
            TelnetMessage::Negotiate(command, option) => {
                dst.reserve(3);
                dst.put_u8(consts::IAC);
                dst.put_u8(command);
                dst.put_u8(option);
            }
            TelnetMessage::SubNegotiate(option, payload) => {
                dst.reserve(5 + payload.len());
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::SB);
                dst.put_u8(option);
                dst.put_slice(&payload);
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::SE);
            }
        }
        Ok(())
    }
}
