//! The deflate orchestrator's decode half (§4.8): the inflate state machine over stored,
//! fixed-Huffman, and dynamic-Huffman blocks.
//!
//! Dispatches on `BFINAL`/`BTYPE`, expands the dynamic header's precode-length
//! permutation and run-length codes into literal/length and distance code lengths, and
//! caches the built static tables across consecutive static blocks so a run of them
//! doesn't rebuild the same decoder repeatedly. See `huffman.rs`'s module doc for why the
//! decode table itself is a single flat table rather than a two-level scheme.

use crate::bit_reader::BitReader;
use crate::deflate_constants::{
    fixed_dist_lengths, fixed_litlen_lengths, CODE_LENGTH_ORDER,
    DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN, DEFLATE_BLOCKTYPE_STATIC_HUFFMAN,
    DEFLATE_BLOCKTYPE_UNCOMPRESSED, DEFLATE_NUM_PRECODE_SYMS, DIST_BASE, DIST_EXTRA_BITS,
    LENGTH_BASE, LENGTH_EXTRA_BITS,
};
use crate::error::ZlibError;
use crate::huffman::HuffmanDecoder;
use crate::safety_check;

const END_OF_BLOCK: u16 = 256;

/// Decompress a raw DEFLATE payload (no ZLIB header/trailer) into its original bytes.
pub fn deflate_decompress(data: &[u8]) -> Result<Vec<u8>, ZlibError> {
    let mut reader = BitReader::new(data);
    let mut out: Vec<u8> = Vec::with_capacity(data.len() * 3 + 32);

    let mut static_tables: Option<(HuffmanDecoder, HuffmanDecoder)> = None;

    loop {
        let bfinal = reader.read_bits(1)?;
        let btype = reader.read_bits(2)?;

        log::trace!("deflate block: btype={btype} bfinal={bfinal} out_so_far={}", out.len());

        match btype {
            x if x == DEFLATE_BLOCKTYPE_UNCOMPRESSED => {
                decode_stored_block(&mut reader, &mut out)?;
            }
            x if x == DEFLATE_BLOCKTYPE_STATIC_HUFFMAN => {
                if static_tables.is_none() {
                    let litlen = HuffmanDecoder::build(&fixed_litlen_lengths())?;
                    let dist = HuffmanDecoder::build(&fixed_dist_lengths())?;
                    static_tables = Some((litlen, dist));
                }
                let (litlen, dist) = static_tables.as_ref().unwrap();
                decode_huffman_block_body(&mut reader, litlen, dist, &mut out)?;
            }
            x if x == DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN => {
                let (litlen, dist) = read_dynamic_header(&mut reader)?;
                decode_huffman_block_body(&mut reader, &litlen, &dist, &mut out)?;
            }
            _ => return Err(ZlibError::BadBlockType),
        }

        if bfinal != 0 {
            break;
        }
    }

    log::debug!("deflate_decompress: produced {} bytes", out.len());
    Ok(out)
}

fn decode_stored_block(reader: &mut BitReader, out: &mut Vec<u8>) -> Result<(), ZlibError> {
    reader.align();
    let len_bytes = reader.read_aligned_bytes(2)?;
    let len = u16::from_le_bytes([len_bytes[0], len_bytes[1]]);
    let nlen_bytes = reader.read_aligned_bytes(2)?;
    let nlen = u16::from_le_bytes([nlen_bytes[0], nlen_bytes[1]]);

    safety_check!(len == !nlen, ZlibError::BadStoredBlock);

    let bytes = reader.read_aligned_bytes(len as usize)?;
    out.extend_from_slice(bytes);
    Ok(())
}

/// Read the dynamic header of §4.7.1/§4.8 and build the two resulting decoders.
fn read_dynamic_header(reader: &mut BitReader) -> Result<(HuffmanDecoder, HuffmanDecoder), ZlibError> {
    let hlit = reader.read_bits(5)? as usize + 257;
    let hdist = reader.read_bits(5)? as usize + 1;
    let hclen = reader.read_bits(4)? as usize + 4;

    let mut precode_lens = [0u8; DEFLATE_NUM_PRECODE_SYMS];
    for &sym in CODE_LENGTH_ORDER.iter().take(hclen) {
        precode_lens[sym] = reader.read_bits(3)? as u8;
    }
    let precode_decoder = HuffmanDecoder::build(&precode_lens)?;

    let total = hlit + hdist;
    let mut lens = vec![0u8; total];
    let mut i = 0;
    while i < total {
        let sym = precode_decoder.decode(reader)?;
        match sym {
            0..=15 => {
                lens[i] = sym as u8;
                i += 1;
            }
            16 => {
                safety_check!(i != 0, ZlibError::BadHuffmanCode);
                let rep = 3 + reader.read_bits(2)? as usize;
                safety_check!(i + rep <= total, ZlibError::BadHuffmanCode);
                let prev = lens[i - 1];
                for l in &mut lens[i..i + rep] {
                    *l = prev;
                }
                i += rep;
            }
            17 => {
                let rep = 3 + reader.read_bits(3)? as usize;
                safety_check!(i + rep <= total, ZlibError::BadHuffmanCode);
                i += rep;
            }
            18 => {
                let rep = 11 + reader.read_bits(7)? as usize;
                safety_check!(i + rep <= total, ZlibError::BadHuffmanCode);
                i += rep;
            }
            _ => return Err(ZlibError::BadHuffmanCode),
        }
    }

    let litlen_lens = &lens[..hlit];
    let dist_lens = &lens[hlit..];

    let litlen_decoder = HuffmanDecoder::build(litlen_lens)?;
    let dist_decoder = HuffmanDecoder::build(dist_lens)?;
    Ok((litlen_decoder, dist_decoder))
}

/// Decode the body of a Huffman-coded block (§4.8.1): literals, matches, end-of-block.
fn decode_huffman_block_body(
    reader: &mut BitReader,
    litlen: &HuffmanDecoder,
    dist: &HuffmanDecoder,
    out: &mut Vec<u8>,
) -> Result<(), ZlibError> {
    loop {
        let sym = litlen.decode(reader)?;

        if sym < 256 {
            out.push(sym as u8);
            continue;
        }
        if sym == END_OF_BLOCK {
            return Ok(());
        }

        let i = (sym as usize) - 257;
        safety_check!(i < LENGTH_BASE.len(), ZlibError::BadLengthSymbol);
        let extra = reader.read_bits(LENGTH_EXTRA_BITS[i] as u32)?;
        let length = LENGTH_BASE[i] as usize + extra as usize;

        let dsym = dist.decode(reader)? as usize;
        safety_check!(dsym < DIST_BASE.len(), ZlibError::BadDistance);
        let dextra = reader.read_bits(DIST_EXTRA_BITS[dsym] as u32)?;
        let distance = DIST_BASE[dsym] as usize + dextra as usize;

        safety_check!(distance >= 1 && distance <= out.len(), ZlibError::BadDistance);

        let start = out.len() - distance;
        for k in 0..length {
            let b = out[start + k];
            out.push(b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deflate_encode::deflate_compress;

    #[test]
    fn round_trip_various_inputs() {
        let inputs: [&[u8]; 6] = [
            b"",
            b"a",
            b"Hello World",
            b"the quick brown fox jumps over the lazy dog, the quick brown fox",
            &[0u8; 70000],
            &[7u8; 32769],
        ];
        for data in inputs {
            let compressed = deflate_compress(data);
            let decompressed = deflate_decompress(&compressed).unwrap();
            assert_eq!(decompressed, data);
        }
    }

    /// Hand-assembles a `BTYPE=1` (fixed Huffman) block using the fixed code lengths of
    /// §4.8 directly, bypassing the dynamic-Huffman encoder entirely.
    fn write_fixed_symbol(
        w: &mut crate::bit_writer::BitWriter,
        codes: &[u16],
        lens: &[u8],
        sym: usize,
    ) {
        let len = lens[sym] as u32;
        let code = crate::huffman::reverse_bits(codes[sym] as u32, len);
        w.write_bits(code, len);
    }

    #[test]
    fn fixed_huffman_block_decodes_literals_and_a_match() {
        use crate::deflate_constants::{dist_to_code, length_to_code};
        use crate::huffman::canonical_codes;

        let litlen_lens = fixed_litlen_lengths();
        let dist_lens = fixed_dist_lengths();
        let litlen_codes = canonical_codes(&litlen_lens);
        let dist_codes = canonical_codes(&dist_lens);

        let mut w = crate::bit_writer::BitWriter::new();
        w.write_bits(1, 1); // BFINAL
        w.write_bits(1, 2); // BTYPE = fixed Huffman

        // Literal 'a', then a length-3/distance-1 back-reference so the decoded output
        // is "aaaa" - exercises both the literal path and the length/distance path
        // through the fixed tables.
        write_fixed_symbol(&mut w, &litlen_codes, &litlen_lens, b'a' as usize);

        let lc = length_to_code(3);
        write_fixed_symbol(&mut w, &litlen_codes, &litlen_lens, 257 + lc);
        w.write_bits(3 - LENGTH_BASE[lc] as u32, LENGTH_EXTRA_BITS[lc] as u32);

        let dc = dist_to_code(1);
        write_fixed_symbol(&mut w, &dist_codes, &dist_lens, dc);
        w.write_bits(1 - DIST_BASE[dc] as u32, DIST_EXTRA_BITS[dc] as u32);

        write_fixed_symbol(&mut w, &litlen_codes, &litlen_lens, END_OF_BLOCK as usize);

        let bytes = w.finish();
        let out = deflate_decompress(&bytes).unwrap();
        assert_eq!(out, b"aaaa");
    }

    #[test]
    fn reserved_block_type_fails() {
        let mut w = crate::bit_writer::BitWriter::new();
        w.write_bits(1, 1);
        w.write_bits(3, 2);
        let bytes = w.finish();
        assert!(deflate_decompress(&bytes).is_err());
    }

    #[test]
    fn stored_block_len_nlen_mismatch_fails() {
        let mut w = crate::bit_writer::BitWriter::new();
        w.write_bits(1, 1);
        w.write_bits(0, 2);
        w.align();
        let bytes_so_far = w.byte_len();
        let mut bytes = w.finish();
        bytes.resize(bytes_so_far + 4, 0);
        bytes[bytes_so_far] = 5;
        bytes[bytes_so_far + 1] = 0;
        bytes[bytes_so_far + 2] = 0; // should be !5 = 0xFFFA
        bytes[bytes_so_far + 3] = 0;
        assert_eq!(deflate_decompress(&bytes), Err(ZlibError::BadStoredBlock));
    }

    #[test]
    fn stored_block_zero_len_round_trips_empty() {
        let mut w = crate::bit_writer::BitWriter::new();
        w.write_bits(1, 1);
        w.write_bits(0, 2);
        w.align();
        let len: u16 = 0;
        w.write_bits(len as u32, 16);
        w.write_bits((!len) as u32, 16);
        let bytes = w.finish();
        assert_eq!(deflate_decompress(&bytes).unwrap(), Vec::<u8>::new());
    }
}
