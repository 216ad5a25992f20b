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

//! # Mudgate MCCP Stream Adapters
//!
//! Zlib adapters for the Mud Client Compression Protocol. MCCP turns
//! compression on *mid-connection*, at an exact byte boundary: the
//! activation subnegotiation's `IAC SE` is the last uncompressed byte, and
//! everything after it belongs to a single continuous zlib stream. That
//! rules out whole-stream wrappers — the connection needs stateful
//! compressors it can instantiate at the activation instant and feed
//! chunk by chunk, which is what [`Deflater`] and [`Inflater`] are.
//!
//! ## Outbound (MCCP2)
//!
//! [`Deflater`] compresses each outbound write and ends it with a zlib sync
//! flush, so every write is immediately decodable by the peer — a must for
//! an interactive protocol where a prompt may sit in its own TCP segment.
//!
//! ## Inbound (MCCP3)
//!
//! [`Inflater`] inflates inbound chunks and watches for the logical end of
//! the peer's stream: any bytes after a zlib stream end are plaintext again
//! and come back in [`Inflated::trailing`] so the connection can drop back
//! to uncompressed parsing. Corrupt input surfaces as an error; MCCP
//! mandates the receiver then abandons compression rather than the
//! connection.
//!
//! Each connection owns at most one of each, created when the matching MCCP
//! option activates and dropped with the connection.

#![warn(
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use thiserror::Error;

/// Zlib compression level used for MCCP2 streams.
const MCCP_LEVEL: u32 = 9;

/// Output headroom reserved per state-machine step.
const CHUNK_RESERVE: usize = 1024;

/// Errors from the zlib state machines.
#[derive(Debug, Error)]
pub enum CompressionError {
    /// The deflate stream rejected input or internal state went bad.
    #[error("deflate error: {0}")]
    Deflate(#[from] flate2::CompressError),
    /// The inflate stream hit corrupt or truncated input.
    #[error("inflate error: {0}")]
    Inflate(#[from] flate2::DecompressError),
}

///
/// Outbound zlib stream for MCCP2.
///
/// One continuous deflate stream per connection. Every [`compress`] call
/// ends with a sync flush so the produced bytes always decode to the full
/// input so far.
///
/// [`compress`]: Deflater::compress
///
pub struct Deflater {
    raw: Compress,
}

impl Deflater {
    /// Creates a level-9 zlib deflate stream (the MCCP convention).
    pub fn new() -> Deflater {
        Deflater {
            raw: Compress::new(Compression::new(MCCP_LEVEL), true),
        }
    }

    /// Compresses one outbound write, sync-flushed.
    pub fn compress(&mut self, input: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let mut out = Vec::with_capacity(input.len() / 2 + CHUNK_RESERVE);
        let start_in = self.raw.total_in();
        loop {
            let consumed = usize::try_from(self.raw.total_in() - start_in).unwrap_or(usize::MAX);
            out.reserve(CHUNK_RESERVE);
            self.raw
                .compress_vec(&input[consumed..], &mut out, FlushCompress::Sync)?;
            let consumed = usize::try_from(self.raw.total_in() - start_in).unwrap_or(usize::MAX);
            // The flush is complete once all input is in and deflate left
            // spare output space on the table.
            if consumed == input.len() && out.len() < out.capacity() {
                return Ok(out);
            }
        }
    }
}

impl Default for Deflater {
    fn default() -> Self {
        Deflater::new()
    }
}

impl std::fmt::Debug for Deflater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deflater")
            .field("total_in", &self.raw.total_in())
            .field("total_out", &self.raw.total_out())
            .finish()
    }
}

/// Result of feeding one inbound chunk through an [`Inflater`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Inflated {
    /// Decompressed bytes.
    pub data: Vec<u8>,
    /// Plaintext remainder after a zlib stream end, if the peer's stream
    /// finished inside this chunk. `Some` also signals that the inflater is
    /// spent and must be dropped.
    pub trailing: Option<Vec<u8>>,
}

///
/// Inbound zlib stream for MCCP3.
///
/// One continuous inflate stream per connection, fed chunk by chunk as
/// reads arrive.
///
pub struct Inflater {
    raw: Decompress,
}

impl Inflater {
    /// Creates a zlib inflate stream expecting the standard header.
    pub fn new() -> Inflater {
        Inflater {
            raw: Decompress::new(true),
        }
    }

    /// Inflates one inbound chunk.
    ///
    /// Returns the decompressed bytes plus, when the peer's stream ended
    /// inside this chunk, the unconsumed plaintext remainder. An error means
    /// the stream is corrupt; the caller must drop the inflater and fall
    /// back to plaintext.
    pub fn inflate(&mut self, input: &[u8]) -> Result<Inflated, CompressionError> {
        let mut data = Vec::with_capacity(input.len().saturating_mul(2) + CHUNK_RESERVE);
        let start_in = self.raw.total_in();
        loop {
            let consumed = usize::try_from(self.raw.total_in() - start_in).unwrap_or(usize::MAX);
            data.reserve(CHUNK_RESERVE);
            let status = self
                .raw
                .decompress_vec(&input[consumed..], &mut data, FlushDecompress::None)?;
            let consumed = usize::try_from(self.raw.total_in() - start_in).unwrap_or(usize::MAX);
            match status {
                Status::StreamEnd => {
                    return Ok(Inflated {
                        data,
                        trailing: Some(input[consumed..].to_vec()),
                    });
                }
                Status::Ok | Status::BufError => {
                    if consumed == input.len() && data.len() < data.capacity() {
                        return Ok(Inflated {
                            data,
                            trailing: None,
                        });
                    }
                }
            }
        }
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Inflater::new()
    }
}

impl std::fmt::Debug for Inflater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inflater")
            .field("total_in", &self.raw.total_in())
            .field("total_out", &self.raw.total_out())
            .finish()
    }
}
