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

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors surfaced by the codec layer.
///
/// The frame decoder itself never fails — malformed input stalls or comes
/// back as a command/data message for the dispatcher to police. This type
/// exists for the `Decoder`/`Encoder` trait contracts and for the typed
/// subnegotiation argument parsers.
#[derive(Debug, Error)]
pub enum CodecError {
    /// I/O error from the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A subnegotiation payload did not match its option's wire format
    #[error("malformed subnegotiation for option {option}: {reason}")]
    MalformedSubnegotiation {
        /// Option code the payload belonged to
        option: u8,
        /// What was wrong with it
        reason: String,
    },
}
