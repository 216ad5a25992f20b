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

//! Negotiate About Window Size
//!

use crate::result::{CodecError, CodecResult};
use crate::consts;
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

/// Terminal window dimensions carried by a NAWS subnegotiation.
///
/// The wire form is four bytes, big-endian: two for columns, two for rows.
/// Clients report `0` for a dimension they cannot measure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    /// Columns (characters per line)
    pub cols: u16,
    /// Rows (lines)
    pub rows: u16,
}

impl WindowSize {
    /// Creates a new `WindowSize`.
    pub fn new(cols: u16, rows: u16) -> Self {
        WindowSize { cols, rows }
    }

    /// Decodes a NAWS payload. The payload must be exactly four bytes;
    /// anything else is malformed.
    pub fn decode(payload: &[u8]) -> CodecResult<WindowSize> {
        if payload.len() != 4 {
            return Err(CodecError::MalformedSubnegotiation {
                option: consts::option::NAWS,
                reason: format!("expected 4 bytes, got {}", payload.len()),
            });
        }
        Ok(WindowSize {
            cols: BigEndian::read_u16(&payload[0..2]),
            rows: BigEndian::read_u16(&payload[2..4]),
        })
    }

    /// Writes the four-byte big-endian payload.
    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<usize> {
        writer.write_u16::<BigEndian>(self.cols)?;
        writer.write_u16::<BigEndian>(self.rows)?;
        Ok(4)
    }
}

impl Default for WindowSize {
    /// The traditional 80x24 terminal, used until the client reports a size.
    fn default() -> Self {
        WindowSize { cols: 80, rows: 24 }
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.cols, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_standard_terminal() {
        let size = WindowSize::decode(&[0x00, 0x50, 0x00, 0x18]).unwrap();
        assert_eq!(size, WindowSize::new(80, 24));
    }

    #[test]
    fn decode_wide_terminal() {
        let size = WindowSize::decode(&[0x01, 0x00, 0x00, 0x32]).unwrap();
        assert_eq!(size, WindowSize::new(256, 50));
    }

    #[test]
    fn decode_rejects_wrong_length() {
        assert!(WindowSize::decode(&[0x00, 0x50, 0x00]).is_err());
        assert!(WindowSize::decode(&[0x00, 0x50, 0x00, 0x18, 0x00]).is_err());
    }

    #[test]
    fn write_round_trip() {
        let size = WindowSize::new(120, 40);
        let mut out = Vec::new();
        assert_eq!(size.write(&mut out).unwrap(), 4);
        assert_eq!(WindowSize::decode(&out).unwrap(), size);
    }
}
