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

//! Error types for the portal service

use thiserror::Error;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Portal service error types.
///
/// Per-task errors are logged and recovered where possible; nothing typed
/// crosses the application boundary except through the listener entry
/// points (`bind`, `run`).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// I/O error from the underlying stream or listener
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protocol error from the codec layer
    #[error("protocol error: {0}")]
    Codec(#[from] mudgate_telnetcodec::CodecError),

    /// Compression error from an MCCP stream
    #[error("compression error: {0}")]
    Compression(#[from] mudgate_compress::CompressionError),
}
