//! Adler-32, RFC 1950's trailer checksum.
//!
//! Delegates to the `adler` crate rather than inlining the `s1`/`s2` update loop by
//! hand.

use adler::Adler32;

/// `adler32(bytes, initial)`: continues an Adler-32 computation from `initial` (pass `1`
/// to start a new one) over `bytes`. Matches §4.3 exactly: for empty input this returns
/// `initial` unchanged.
pub fn adler32(bytes: &[u8], initial: u32) -> u32 {
    let mut hasher = Adler32::from_checksum(initial);
    hasher.write_slice(bytes);
    hasher.checksum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_one() {
        assert_eq!(adler32(b"", 1), 1);
    }

    #[test]
    fn wikipedia_example() {
        assert_eq!(adler32(b"Wikipedia", 1), 0x11E6_0398);
    }

    #[test]
    fn depends_only_on_bytes_and_length() {
        let a = adler32(b"hello world", 1);
        let b = adler32(b"hello world", 1);
        assert_eq!(a, b);
        let c = adler32(b"hello worlD", 1);
        assert_ne!(a, c);
    }

    #[test]
    fn can_continue_from_prior_checksum() {
        let whole = adler32(b"hello world", 1);
        let partial = adler32(b"hello ", 1);
        let continued = adler32(b"world", partial);
        assert_eq!(whole, continued);
    }
}
