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

//! Stream-level codec properties: any well-formed message sequence must
//! decode completely, producing the same messages, under any chunking of
//! the wire bytes.

use bytes::{Bytes, BytesMut};
use mudgate_telnetcodec::{TelnetCodec, TelnetMessage, consts};
use proptest::prelude::*;
use tokio_util::codec::{Decoder, Encoder};

/// Encode a message list to one contiguous wire buffer.
fn encode_all(messages: &[TelnetMessage]) -> BytesMut {
    let mut codec = TelnetCodec::new();
    let mut wire = BytesMut::new();
    for message in messages {
        codec.encode(message.clone(), &mut wire).expect("encode ok");
    }
    wire
}

/// Feed the wire buffer to the decoder in the given chunk sizes, collecting
/// every decoded message.
fn decode_chunked(wire: &[u8], chunks: &[usize]) -> Vec<TelnetMessage> {
    let mut codec = TelnetCodec::new();
    let mut buffer = BytesMut::new();
    let mut out = Vec::new();
    let mut offset = 0;
    for &chunk in chunks {
        let end = (offset + chunk.max(1)).min(wire.len());
        buffer.extend_from_slice(&wire[offset..end]);
        offset = end;
        while let Some(message) = codec.decode(&mut buffer).expect("decode ok") {
            out.push(message);
        }
    }
    buffer.extend_from_slice(&wire[offset..]);
    while let Some(message) = codec.decode(&mut buffer).expect("decode ok") {
        out.push(message);
    }
    assert!(buffer.is_empty(), "decoder stalled with residue {buffer:?}");
    out
}

/// Adjacent data runs merge or split freely across chunk boundaries, so
/// compare the data *content* and the non-data messages in order.
fn canonical(messages: &[TelnetMessage]) -> (Vec<u8>, Vec<TelnetMessage>) {
    let mut data = Vec::new();
    let mut rest = Vec::new();
    for message in messages {
        match message {
            TelnetMessage::Data(bytes) => data.extend_from_slice(bytes),
            other => rest.push(other.clone()),
        }
    }
    (data, rest)
}

fn arb_message() -> impl Strategy<Value = TelnetMessage> {
    prop_oneof![
        proptest::collection::vec(any::<u8>(), 1..40)
            .prop_map(|bytes| TelnetMessage::Data(Bytes::from(bytes))),
        // Commands that are not negotiation verbs, SB, or IAC itself.
        prop_oneof![Just(consts::NOP), Just(consts::GA), Just(consts::EOR)]
            .prop_map(TelnetMessage::Command),
        (
            prop_oneof![
                Just(consts::WILL),
                Just(consts::WONT),
                Just(consts::DO),
                Just(consts::DONT)
            ],
            any::<u8>(),
        )
            .prop_map(|(verb, option)| TelnetMessage::Negotiate(verb, option)),
        // Subnegotiation option codes and payloads carry no unescaped IAC,
        // as real option handlers produce.
        (
            0u8..=254,
            proptest::collection::vec(0u8..=254, 0..30),
        )
            .prop_map(|(option, payload)| {
                TelnetMessage::SubNegotiate(option, Bytes::from(payload))
            }),
    ]
}

proptest! {
    #[test]
    fn any_chunking_decodes_the_full_stream(
        messages in proptest::collection::vec(arb_message(), 0..12),
        chunks in proptest::collection::vec(1usize..17, 0..64),
    ) {
        let wire = encode_all(&messages);
        let decoded = decode_chunked(&wire, &chunks);
        prop_assert_eq!(canonical(&decoded), canonical(&messages));
    }

    #[test]
    fn data_round_trips_through_iac_doubling(bytes in proptest::collection::vec(any::<u8>(), 0..200)) {
        let original = TelnetMessage::Data(Bytes::from(bytes.clone()));
        let wire = encode_all(std::slice::from_ref(&original));
        let decoded = decode_chunked(&wire, &[wire.len().max(1)]);
        let (data, rest) = canonical(&decoded);
        prop_assert!(rest.is_empty());
        prop_assert_eq!(data, bytes);
    }
}

#[test]
fn interleaved_session_transcript_decodes() {
    // A realistic login burst: banner text, option negotiation, a NAWS
    // report, and a command line, all in one segment.
    let mut wire = BytesMut::new();
    wire.extend_from_slice(b"Welcome to Moonshae\r\n");
    wire.extend_from_slice(&[consts::IAC, consts::WILL, consts::option::MSSP]);
    wire.extend_from_slice(&[consts::IAC, consts::DO, consts::option::NAWS]);
    wire.extend_from_slice(&[
        consts::IAC,
        consts::SB,
        consts::option::NAWS,
        0x00,
        0x50,
        0x00,
        0x18,
        consts::IAC,
        consts::SE,
    ]);
    wire.extend_from_slice(b"look\r\n");

    let decoded = decode_chunked(&wire, &[wire.len()]);
    assert_eq!(
        decoded,
        vec![
            TelnetMessage::Data(Bytes::from_static(b"Welcome to Moonshae\r\n")),
            TelnetMessage::Negotiate(consts::WILL, consts::option::MSSP),
            TelnetMessage::Negotiate(consts::DO, consts::option::NAWS),
            TelnetMessage::SubNegotiate(
                consts::option::NAWS,
                Bytes::from_static(&[0x00, 0x50, 0x00, 0x18]),
            ),
            TelnetMessage::Data(Bytes::from_static(b"look\r\n")),
        ]
    );
}
