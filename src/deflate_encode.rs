//! The deflate orchestrator's encode half (§4.7): turns a byte buffer into a single
//! `BFINAL=1, BTYPE=2` dynamic-Huffman block.
//!
//! The block-header bit layout (BFINAL/BTYPE) and the run-length policy for the
//! code-length alphabet follow §4.7/§4.7.1 directly; the overall shape is tokenize, then
//! count symbol frequencies, then build the two Huffman trees, then emit the header
//! followed by the token stream.

use crate::bit_writer::BitWriter;
use crate::deflate_constants::{
    dist_to_code, length_to_code, CODE_LENGTH_ORDER, DEFLATE_NUM_LITLEN_SYMS,
    DEFLATE_NUM_OFFSET_SYMS, DEFLATE_NUM_PRECODE_SYMS, DIST_EXTRA_BITS, LENGTH_EXTRA_BITS,
};
use crate::huffman::{build_huffman_codes, reverse_bits, HuffmanCodes};
use crate::lz77::{tokenize, Token};

const END_OF_BLOCK: usize = 256;

/// Compress `data` into a single dynamic-Huffman DEFLATE block. Never fails: the match
/// finder and Huffman builder both handle every input, including the empty buffer.
pub fn deflate_compress(data: &[u8]) -> Vec<u8> {
    let tokens = tokenize(data);
    log::trace!("deflate_compress: {} input bytes -> {} tokens", data.len(), tokens.len());

    let mut litlen_freq = vec![0u32; DEFLATE_NUM_LITLEN_SYMS + 2];
    let mut dist_freq = vec![0u32; DEFLATE_NUM_OFFSET_SYMS];
    litlen_freq[END_OF_BLOCK] = 1;

    for t in &tokens {
        match *t {
            Token::Literal(b) => litlen_freq[b as usize] += 1,
            Token::Match { length, distance } => {
                let lc = length_to_code(length as usize);
                litlen_freq[257 + lc] += 1;
                let dc = dist_to_code(distance as usize);
                dist_freq[dc] += 1;
            }
        }
    }

    let litlen_codes = build_huffman_codes(&litlen_freq);
    // Distance alphabet must always contain at least one code (even if unused) so the
    // dynamic header has something to transmit; RFC 1951 allows a single dummy code.
    if dist_freq.iter().all(|&f| f == 0) {
        dist_freq[0] = 1;
    }
    let dist_codes = build_huffman_codes(&dist_freq);

    let mut w = BitWriter::with_capacity(data.len() / 2 + 64);

    w.write_bits(1, 1); // BFINAL
    w.write_bits(2, 2); // BTYPE = dynamic Huffman

    write_dynamic_header(&mut w, &litlen_codes, &dist_codes);

    for t in &tokens {
        match *t {
            Token::Literal(b) => write_symbol(&mut w, &litlen_codes, b as usize),
            Token::Match { length, distance } => {
                let lc = length_to_code(length as usize);
                write_symbol(&mut w, &litlen_codes, 257 + lc);
                w.write_bits(
                    (length as u32) - crate::deflate_constants::LENGTH_BASE[lc] as u32,
                    LENGTH_EXTRA_BITS[lc] as u32,
                );

                let dc = dist_to_code(distance as usize);
                write_symbol(&mut w, &dist_codes, dc);
                w.write_bits(
                    distance - crate::deflate_constants::DIST_BASE[dc] as u32,
                    DIST_EXTRA_BITS[dc] as u32,
                );
            }
        }
    }

    write_symbol(&mut w, &litlen_codes, END_OF_BLOCK);
    let out = w.finish();
    log::debug!(
        "deflate_compress: {} bytes -> {} bytes ({:.1}%)",
        data.len(),
        out.len(),
        if data.is_empty() { 100.0 } else { 100.0 * out.len() as f64 / data.len() as f64 }
    );
    out
}

#[inline]
fn write_symbol(w: &mut BitWriter, codes: &HuffmanCodes, sym: usize) {
    let len = codes.len[sym] as u32;
    let code = reverse_bits(codes.code[sym] as u32, len);
    w.write_bits(code, len);
}

/// Emit the dynamic header of §4.7.1: run-length-encode the concatenated literal/length
/// and distance code lengths over the 19-symbol code-length alphabet, build its tree,
/// and transmit both the tree and the encoded lengths.
fn write_dynamic_header(w: &mut BitWriter, litlen: &HuffmanCodes, dist: &HuffmanCodes) {
    let hlit = DEFLATE_NUM_LITLEN_SYMS; // 286 symbols transmitted (257 + 29)
    let hdist = DEFLATE_NUM_OFFSET_SYMS; // 30 symbols transmitted

    let mut cl: Vec<u8> = Vec::with_capacity(hlit + hdist);
    cl.extend_from_slice(&litlen.len[..hlit]);
    cl.extend_from_slice(&dist.len[..hdist]);

    let rle = run_length_encode(&cl);

    let mut cl_freq = vec![0u32; DEFLATE_NUM_PRECODE_SYMS];
    for &(sym, _, _) in &rle {
        cl_freq[sym] += 1;
    }
    let cl_codes = build_huffman_codes(&cl_freq);

    // HCLEN: scan the fixed order from the back for the last symbol with a non-zero
    // code-length-alphabet length (§4.7.1).
    let mut last_nonzero = 0usize;
    for (i, &sym) in CODE_LENGTH_ORDER.iter().enumerate() {
        if cl_codes.len[sym] != 0 {
            last_nonzero = i;
        }
    }
    // Index of the last transmitted order slot; always at least 3 so at least 4 lengths
    // (the protocol minimum) go out even when the precode alphabet is nearly empty.
    let last_order_idx = last_nonzero.max(3);
    let hclen = last_order_idx - 3;

    w.write_bits((hlit - 257) as u32, 5);
    w.write_bits((hdist - 1) as u32, 5);
    w.write_bits(hclen as u32, 4);

    for &sym in &CODE_LENGTH_ORDER[..last_order_idx + 1] {
        w.write_bits(cl_codes.len[sym] as u32, 3);
    }

    for (sym, extra_val, extra_bits) in rle {
        write_symbol(w, &cl_codes, sym);
        if extra_bits > 0 {
            w.write_bits(extra_val, extra_bits);
        }
    }
}

/// Run-length encode `lens` over the code-length alphabet, returning
/// `(symbol, extra_bits_value, extra_bits_count)` triples, per §4.7.1's policy.
fn run_length_encode(lens: &[u8]) -> Vec<(usize, u32, u32)> {
    let mut out = Vec::new();
    let n = lens.len();
    let mut i = 0;
    while i < n {
        let v = lens[i];
        let mut run = 1;
        while i + run < n && lens[i + run] == v {
            run += 1;
        }

        if v == 0 {
            let mut r = run;
            while r >= 11 {
                let take = r.min(138);
                out.push((18, (take - 11) as u32, 7));
                r -= take;
            }
            while r >= 3 {
                let take = r.min(10);
                out.push((17, (take - 3) as u32, 3));
                r -= take;
            }
            for _ in 0..r {
                out.push((0, 0, 0));
            }
        } else {
            out.push((v as usize, 0, 0));
            let mut r = run - 1;
            while r >= 3 {
                let take = r.min(6);
                out.push((16, (take - 3) as u32, 2));
                r -= take;
            }
            for _ in 0..r {
                out.push((v as usize, 0, 0));
            }
        }

        i += run;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_length_encodes_long_zero_runs_with_symbol_18() {
        let mut lens = vec![0u8; 138];
        lens.push(5);
        let rle = run_length_encode(&lens);
        assert_eq!(rle[0], (18, 127, 7));
        assert_eq!(rle[1], (5, 0, 0));
    }

    #[test]
    fn run_length_encodes_repeat_previous_with_symbol_16() {
        let lens = vec![7u8, 7, 7, 7, 7];
        let rle = run_length_encode(&lens);
        assert_eq!(rle[0], (7, 0, 0));
        assert_eq!(rle[1], (16, 1, 2));
    }

    #[test]
    fn compress_empty_is_nonempty_stream() {
        let out = deflate_compress(b"");
        assert!(!out.is_empty());
    }
}
