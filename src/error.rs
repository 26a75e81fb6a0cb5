//! The fatal error type shared by the whole decode path.
//!
//! A ZLIB/DEFLATE decoder surfaces enough distinct failure modes (bad header, truncated
//! input, corrupt Huffman tree, bad checksum, ...) that callers benefit from telling them
//! apart, so this enum keeps one variant per failure mode behind a terse
//! `safety_check!(cond, err)` call-site macro.

use std::fmt;

/// Every fatal condition the codec can raise. No operation returns a partial result: once
/// one of these is produced, the caller's buffer is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZlibError {
    /// Fewer than 6 bytes were given to `decompress`, or a bit read ran past the end of
    /// the input.
    ShortInput,
    /// `CM != 8`, `CINFO > 7`, `FDICT == 1`, or `(CMF * 256 + FLG) % 31 != 0`.
    BadHeader,
    /// A block header declared `BTYPE == 3` (reserved).
    BadBlockType,
    /// A stored block's `LEN` and `NLEN` fields are not bitwise complements.
    BadStoredBlock,
    /// The bit stream matched no valid prefix in a Huffman decode table.
    BadHuffmanCode,
    /// A literal/length symbol of 286 or greater was decoded.
    BadLengthSymbol,
    /// A back-reference distance was zero or exceeded the bytes produced so far.
    BadDistance,
    /// A dynamic header declared a code length greater than 15.
    TooManyBits,
    /// The Adler-32 of the inflated payload did not match the trailer.
    ChecksumMismatch,
    /// Reserved for FFI-style callers that can hand in something other than a byte
    /// buffer; unreachable from safe Rust, since `compress`/`decompress` take `&[u8]`.
    BadInputType,
}

impl fmt::Display for ZlibError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ZlibError::ShortInput => "input too short to contain a valid ZLIB stream",
            ZlibError::BadHeader => "invalid ZLIB header (CMF/FLG check failed)",
            ZlibError::BadBlockType => "reserved DEFLATE block type (BTYPE = 3)",
            ZlibError::BadStoredBlock => "stored block LEN does not match ~NLEN",
            ZlibError::BadHuffmanCode => "bit stream matches no valid Huffman prefix",
            ZlibError::BadLengthSymbol => "literal/length symbol out of range",
            ZlibError::BadDistance => "back-reference distance is zero or out of range",
            ZlibError::TooManyBits => "Huffman code length exceeds 15 bits",
            ZlibError::ChecksumMismatch => "Adler-32 checksum mismatch",
            ZlibError::BadInputType => "input is not a byte buffer",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ZlibError {}

/// Early-return with a specific [`ZlibError`] variant when `cond` is false.
#[macro_export]
macro_rules! safety_check {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err);
        }
    };
}
