//! A from-scratch ZLIB (RFC 1950) / DEFLATE (RFC 1951) codec: `compress` and
//! `decompress` over whole in-memory buffers. No streaming, no preset dictionaries,
//! no compression levels, no gzip framing — one call in, one buffer out.

#[macro_use]
extern crate static_assertions;

pub mod adler32;
pub mod bit_reader;
pub mod bit_writer;
pub mod deflate_constants;
pub mod deflate_decode;
pub mod deflate_encode;
pub mod error;
pub mod huffman;
pub mod lz77;
pub mod zlib;

pub use error::ZlibError;

/// Compress `data` into a complete ZLIB stream (header, one DEFLATE block, Adler-32
/// trailer). Never fails.
pub fn compress(data: &[u8]) -> Vec<u8> {
    zlib::compress(data)
}

/// Decompress a complete ZLIB stream produced by [`compress`] (or any conforming
/// single-block encoder).
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, ZlibError> {
    zlib::decompress(data)
}
