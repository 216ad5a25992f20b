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

//! Mud Server Status Protocol
//!
//! MSSP publishes server metadata to the client as a flat series of
//! key/value pairs: each key is prefixed with `VAR` (0x01) and each value
//! with `VAL` (0x02).
//!
//! <https://tintin.mudhalla.net/protocols/mssp/>

use crate::consts;
use bytes::{BufMut, Bytes, BytesMut};
use std::collections::BTreeMap;

/// Key prefix byte
pub const VAR: u8 = 1;
/// Value prefix byte
pub const VAL: u8 = 2;

/// An ordered key/value table of server metadata.
///
/// Keys sort lexicographically so the encoded payload is deterministic. An
/// empty table encodes to nothing — callers skip the subnegotiation entirely.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerStatus(BTreeMap<String, String>);

impl ServerStatus {
    /// Creates an empty status table.
    pub fn new() -> ServerStatus {
        ServerStatus::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inserts or replaces an entry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Encodes the table to its wire payload. Bytes that would corrupt the
    /// framing (NUL, IAC, VAR, VAL) are stripped from keys and values.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::new();
        for (key, value) in &self.0 {
            out.put_u8(VAR);
            put_filtered(&mut out, key);
            out.put_u8(VAL);
            put_filtered(&mut out, value);
        }
        out.freeze()
    }
}

fn put_filtered(dst: &mut BytesMut, text: &str) {
    for &byte in text.as_bytes() {
        if byte != consts::NUL && byte != consts::IAC && byte != VAR && byte != VAL {
            dst.put_u8(byte);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ServerStatus {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ServerStatus(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_encodes_nothing() {
        assert!(ServerStatus::new().to_bytes().is_empty());
    }

    #[test]
    fn entries_encode_in_key_order() {
        let mut status = ServerStatus::new();
        status.set("PLAYERS", "52").set("NAME", "Moonshae");
        let mut expected = vec![VAR];
        expected.extend_from_slice(b"NAME");
        expected.push(VAL);
        expected.extend_from_slice(b"Moonshae");
        expected.push(VAR);
        expected.extend_from_slice(b"PLAYERS");
        expected.push(VAL);
        expected.extend_from_slice(b"52");
        assert_eq!(&status.to_bytes()[..], &expected[..]);
    }

    #[test]
    fn framing_bytes_are_stripped() {
        let mut status = ServerStatus::new();
        status.set("NA\u{1}ME", "va\u{2}lue");
        let encoded = status.to_bytes();
        assert_eq!(encoded.iter().filter(|&&b| b == VAR).count(), 1);
        assert_eq!(encoded.iter().filter(|&&b| b == VAL).count(), 1);
    }
}
