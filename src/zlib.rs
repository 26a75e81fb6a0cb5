//! The ZLIB container (RFC 1950, §4.9): a 2-byte header, the DEFLATE payload, and a
//! 4-byte big-endian Adler-32 trailer. This is the thin facade the system description
//! calls an "external collaborator" rather than core engineering — it only concatenates
//! what the core already produces/consumes.

use crate::adler32::adler32;
use crate::deflate_decode::deflate_decompress;
use crate::deflate_encode::deflate_compress;
use crate::error::ZlibError;
use crate::safety_check;

const ZLIB_CM_DEFLATE: u16 = 8;
const ZLIB_CINFO_32K_WINDOW: u16 = 7;
const ZLIB_FLEVEL: u16 = 2;

/// Compress `data` into a complete ZLIB stream: header, one final dynamic-Huffman
/// DEFLATE block, and the Adler-32 trailer of `data`.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let payload = deflate_compress(data);
    let checksum = adler32(data, 1);

    let mut out = Vec::with_capacity(2 + payload.len() + 4);
    out.extend_from_slice(&zlib_header());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&checksum.to_be_bytes());

    log::debug!(
        "zlib::compress: {} bytes -> {} bytes (adler32=0x{checksum:08X})",
        data.len(),
        out.len()
    );
    out
}

/// Decompress a complete ZLIB stream, validating the header and the Adler-32 trailer.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, ZlibError> {
    safety_check!(data.len() >= 6, ZlibError::ShortInput);

    let cmf = data[0];
    let flg = data[1];
    validate_header(cmf, flg)?;

    let payload = &data[2..data.len() - 4];
    let out = deflate_decompress(payload)?;

    let expected = u32::from_be_bytes(data[data.len() - 4..].try_into().unwrap());
    let actual = adler32(&out, 1);
    log::debug!("zlib::decompress: expected adler32=0x{expected:08X} actual=0x{actual:08X}");
    safety_check!(actual == expected, ZlibError::ChecksumMismatch);

    Ok(out)
}

fn zlib_header() -> [u8; 2] {
    let cmf = ((ZLIB_CINFO_32K_WINDOW << 4) | ZLIB_CM_DEFLATE) as u8;
    let mut flg = (ZLIB_FLEVEL << 6) as u8; // FDICT (bit 5) left at 0
    let check = 31 - (((cmf as u16) * 256 + flg as u16) % 31);
    let check = if check == 31 { 0 } else { check };
    flg |= check as u8;
    [cmf, flg]
}

fn validate_header(cmf: u8, flg: u8) -> Result<(), ZlibError> {
    let cm = cmf & 0x0F;
    let cinfo = cmf >> 4;
    let fdict = (flg >> 5) & 1;

    safety_check!(cm == ZLIB_CM_DEFLATE as u8, ZlibError::BadHeader);
    safety_check!(cinfo <= 7, ZlibError::BadHeader);
    safety_check!(fdict == 0, ZlibError::BadHeader);
    safety_check!(((cmf as u16) * 256 + flg as u16) % 31 == 0, ZlibError::BadHeader);
    Ok(())
}
