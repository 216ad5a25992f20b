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

//! Outbound text normalization

use bytes::{BufMut, Bytes, BytesMut};
use mudgate_telnetcodec::consts;

/// Prepares application text for the wire.
///
/// - every LF is preceded by exactly one CR (inserted when missing)
/// - consecutive CRs collapse to one; a lone CR is preserved
/// - IAC (0xFF) bytes are doubled
/// - everything else passes through verbatim
pub fn normalize(input: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(input.len() + 8);
    let mut previous_was_cr = false;
    for &byte in input {
        match byte {
            consts::CR => {
                if !previous_was_cr {
                    out.put_u8(consts::CR);
                }
                previous_was_cr = true;
            }
            consts::LF => {
                if !previous_was_cr {
                    out.put_u8(consts::CR);
                }
                out.put_u8(consts::LF);
                previous_was_cr = false;
            }
            consts::IAC => {
                out.put_u8(consts::IAC);
                out.put_u8(consts::IAC);
                previous_was_cr = false;
            }
            _ => {
                out.put_u8(byte);
                previous_was_cr = false;
            }
        }
    }
    out.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_lf_gains_cr() {
        assert_eq!(&normalize(b"one\ntwo\n")[..], b"one\r\ntwo\r\n");
    }

    #[test]
    fn existing_crlf_is_untouched() {
        assert_eq!(&normalize(b"line\r\n")[..], b"line\r\n");
    }

    #[test]
    fn duplicate_cr_before_lf_collapses() {
        assert_eq!(&normalize(b"line\r\r\n")[..], b"line\r\n");
    }

    #[test]
    fn lone_cr_is_preserved_once() {
        assert_eq!(&normalize(b"a\rb")[..], b"a\rb");
        assert_eq!(&normalize(b"a\r\r\rb")[..], b"a\rb");
    }

    #[test]
    fn trailing_cr_survives() {
        assert_eq!(&normalize(b"prompt\r")[..], b"prompt\r");
    }

    #[test]
    fn iac_is_doubled() {
        assert_eq!(&normalize(&[b'x', 0xFF, b'y'])[..], &[b'x', 0xFF, 0xFF, b'y']);
    }

    #[test]
    fn cr_state_resets_after_iac() {
        // CR, IAC, LF: the IAC breaks the CR pairing, so the LF gets its own CR.
        assert_eq!(
            &normalize(&[0x0D, 0xFF, 0x0A])[..],
            &[0x0D, 0xFF, 0xFF, 0x0D, 0x0A]
        );
    }
}
