//! Byte codec and offset math for the ledger format.
//!
//! The header is a single big-endian `u64`; each XID owns one status byte
//! after it. These helpers are pure and shared by the manager, the file
//! helpers, and the CLI.

use crate::types::Xid;

/// Length of the counter header in bytes.
pub const HEADER_LEN: u64 = 8;

/// Length of one XID's status field in bytes.
pub const STATUS_FIELD_LEN: u64 = 1;

/// Encodes a counter as 8 big-endian bytes.
#[must_use]
pub const fn encode_u64(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decodes 8 big-endian bytes into a counter.
#[must_use]
pub const fn decode_header(bytes: &[u8; 8]) -> u64 {
    u64::from_be_bytes(*bytes)
}

/// Decodes a big-endian counter from a slice.
///
/// Returns `None` unless the slice is exactly 8 bytes long.
#[must_use]
pub fn decode_u64(bytes: &[u8]) -> Option<u64> {
    let array: &[u8; 8] = bytes.try_into().ok()?;
    Some(decode_header(array))
}

/// Returns the byte offset of `xid`'s status field.
///
/// Returns `None` for [`Xid::SUPER`], which has no stored byte, and for
/// XIDs whose offset does not fit in a `u64`.
#[must_use]
pub const fn status_offset(xid: Xid) -> Option<u64> {
    let Some(index) = xid.as_u64().checked_sub(1) else {
        return None;
    };
    match index.checked_mul(STATUS_FIELD_LEN) {
        Some(body) => HEADER_LEN.checked_add(body),
        None => None,
    }
}

/// Returns the file length implied by a header counter, or `None` if it
/// cannot be represented.
#[must_use]
pub const fn expected_len(counter: u64) -> Option<u64> {
    match counter.checked_mul(STATUS_FIELD_LEN) {
        Some(body) => HEADER_LEN.checked_add(body),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn last_status_byte_ends_the_file(counter in 1u64..u64::MAX / 2) {
            let last = status_offset(Xid::new(counter)).unwrap();
            prop_assert_eq!(expected_len(counter), Some(last + STATUS_FIELD_LEN));
        }

        #[test]
        fn header_decodes_what_it_encodes(value in any::<u64>()) {
            prop_assert_eq!(decode_u64(&encode_u64(value)), Some(value));
        }
    }

    #[test]
    fn header_is_big_endian() {
        assert_eq!(encode_u64(1), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(encode_u64(0x0102_0304_0506_0708), [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(decode_header(&[0, 0, 0, 0, 0, 0, 1, 0]), 256);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        assert_eq!(decode_u64(&[0; 7]), None);
        assert_eq!(decode_u64(&[0; 9]), None);
        assert_eq!(decode_u64(&encode_u64(77)), Some(77));
    }

    #[test]
    fn first_xid_follows_header() {
        assert_eq!(status_offset(Xid::new(1)), Some(8));
        assert_eq!(status_offset(Xid::new(2)), Some(9));
        assert_eq!(status_offset(Xid::new(100)), Some(107));
    }

    #[test]
    fn super_and_huge_xids_have_no_offset() {
        assert_eq!(status_offset(Xid::SUPER), None);
        assert_eq!(status_offset(Xid::new(u64::MAX)), None);
        assert_eq!(status_offset(Xid::new(u64::MAX - 7)), Some(u64::MAX));
    }

    #[test]
    fn expected_len_matches_counter() {
        assert_eq!(expected_len(0), Some(8));
        assert_eq!(expected_len(5), Some(13));
        assert_eq!(expected_len(u64::MAX), None);
    }
}
