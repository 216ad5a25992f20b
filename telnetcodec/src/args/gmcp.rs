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

//! Generic Mud Communication Protocol
//!
//! GMCP carries out-of-band structured data. Each message is an ASCII
//! package name, optionally followed by a single space and a UTF-8 JSON
//! document:
//!
//! ```text
//! Core.Hello {"client":"Mudlet","version":"4.17"}
//! Char.Vitals {"hp":100,"maxhp":120}
//! Core.Ping
//! ```
//!
//! <https://tintin.mudhalla.net/protocols/gmcp/>

use bytes::{BufMut, Bytes, BytesMut};
use serde_json::Value;

/// A GMCP message: package name plus optional JSON payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GmcpMessage {
    package: String,
    data: Option<Value>,
}

impl GmcpMessage {
    /// Creates a message with a JSON payload.
    pub fn new(package: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            package: package.into(),
            data,
        }
    }

    /// Creates a bare command message (no payload).
    pub fn command(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            data: None,
        }
    }

    /// The package name, e.g. `Char.Vitals`.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The JSON payload, if any.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Encodes to the subnegotiation payload form.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.package.len() + 2);
        out.put_slice(self.package.as_bytes());
        if let Some(data) = &self.data {
            out.put_u8(b' ');
            out.put_slice(data.to_string().as_bytes());
        }
        out.freeze()
    }

    /// Parses an inbound payload. Returns `None` when the payload is not
    /// UTF-8 or the part after the first space is not valid JSON.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(payload).ok()?;
        match text.split_once(' ') {
            Some((package, json)) => Some(Self {
                package: package.to_string(),
                data: Some(serde_json::from_str(json).ok()?),
            }),
            None => Some(Self::command(text.trim_end())),
        }
    }
}

impl std::fmt::Display for GmcpMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            Some(data) => write!(f, "{} {}", self.package, data),
            None => write!(f, "{}", self.package),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_encodes_bare_package() {
        let msg = GmcpMessage::command("Core.Ping");
        assert_eq!(&msg.to_bytes()[..], b"Core.Ping");
    }

    #[test]
    fn data_is_space_separated_json() {
        let msg = GmcpMessage::new("Char.Vitals", Some(json!({"hp": 100})));
        assert_eq!(&msg.to_bytes()[..], br#"Char.Vitals {"hp":100}"#);
    }

    #[test]
    fn parse_round_trips() {
        let msg = GmcpMessage::new("Core.Hello", Some(json!({"client": "Mudlet"})));
        let parsed = GmcpMessage::parse(&msg.to_bytes()).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn parse_rejects_broken_json() {
        assert_eq!(GmcpMessage::parse(b"Core.Hello {nope"), None);
    }

    #[test]
    fn parse_bare_command() {
        let parsed = GmcpMessage::parse(b"Core.KeepAlive").unwrap();
        assert_eq!(parsed.package(), "Core.KeepAlive");
        assert!(parsed.data().is_none());
    }
}
