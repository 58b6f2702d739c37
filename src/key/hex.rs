//! Hex byte-pair secrets
//!
//! Pairs may be written bare (`ab`) or with a `0x` prefix (`0xab`) and may be
//! separated by spaces. A prefix is only recognized where a new pair starts.

use super::{KeyError, MIN_HEX_KEY_LEN};
use crate::storage::KEY_CAPACITY;

pub(super) fn decode(field: &[u8]) -> Result<Vec<u8>, KeyError> {
    let mut key = Vec::with_capacity(KEY_CAPACITY);
    let mut pending: Option<u8> = None;
    let mut i = 0;

    while i < field.len() {
        let ch = field[i];

        if ch == b' ' {
            i += 1;
            continue;
        }

        if pending.is_none() && ch == b'0' && matches!(field.get(i + 1), Some(b'x' | b'X')) {
            i += 2;
            continue;
        }

        let nibble = nibble(ch).ok_or(KeyError::HexCharacter(ch))?;
        match pending.take() {
            None => pending = Some(nibble),
            Some(high) => {
                if key.len() == KEY_CAPACITY {
                    return Err(KeyError::TooLong(KEY_CAPACITY + 1));
                }
                key.push((high << 4) | nibble);
            }
        }

        i += 1;
    }

    if pending.is_some() {
        return Err(KeyError::UnpairedNibble);
    }
    if key.len() < MIN_HEX_KEY_LEN {
        return Err(KeyError::TooShort(key.len()));
    }

    Ok(key)
}

fn nibble(ch: u8) -> Option<u8> {
    (ch as char).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_prefix_and_bare_pairs() {
        let key = decode(b"0x01 02 0X03 04050607 0x08").unwrap();
        assert_eq!(key, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_prefix_inside_pair_is_rejected() {
        // '1' is pending, so "0x" is not a prefix and 'x' is invalid
        assert_eq!(
            decode(b"10xab 00 00 00 00 00 00 00"),
            Err(KeyError::HexCharacter(b'x'))
        );
    }

    #[test]
    fn test_capacity() {
        let max = "ab".repeat(KEY_CAPACITY);
        assert_eq!(decode(max.as_bytes()).unwrap().len(), KEY_CAPACITY);

        let over = "ab".repeat(KEY_CAPACITY + 1);
        assert!(matches!(decode(over.as_bytes()), Err(KeyError::TooLong(_))));
    }

    #[test]
    fn test_only_spaces() {
        assert_eq!(decode(b"    "), Err(KeyError::TooShort(0)));
    }
}
