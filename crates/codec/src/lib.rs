// Binary codecs for the Circuit SysEx exchange format
// Transmission-safe bit packing plus a bounds-checked record reader/writer

pub mod cursor;
pub mod low7;
pub mod nybble;

pub use cursor::{ByteOrder, ByteWriter, Cursor, Record};
pub use low7::Low7Decoder;
pub use nybble::NybbleDecoder;

use thiserror::Error;

/// Errors raised while decoding transport encodings or device records
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A read asked for more bytes than the buffer still holds
    #[error("unexpected end of data: wanted {wanted} bytes, {available} available")]
    UnexpectedEnd { wanted: usize, available: usize },

    /// A low7 high-bits byte was the last byte of the input
    #[error("extra high bits byte without payload")]
    DanglingHighBits,

    /// The nybble stream ended on an unpaired nybble
    #[error("nybble decoder expects an even number of nybbles")]
    OddNybbleCount,

    /// CRC-32 of the remaining bytes differs from the transmitted one
    #[error("wrong CRC: expected {expected:08x}, computed {computed:08x}")]
    ChecksumMismatch { expected: u32, computed: u32 },
}
