//! Base32 secrets (RFC 4648 alphabet)
//!
//! Padding is optional and lower case input is accepted, matching how
//! authenticator secrets are usually shown to users.

use data_encoding::BASE32_NOPAD;

use super::{KeyError, MAX_BASE32_INPUT};

pub(super) fn decode(payload: &[u8]) -> Result<Vec<u8>, KeyError> {
    let unpadded = payload
        .iter()
        .rposition(|b| *b != b'=')
        .map_or(&payload[..0], |last| &payload[..=last]);

    if unpadded.is_empty() {
        return Err(KeyError::Empty);
    }
    if unpadded.len() > MAX_BASE32_INPUT {
        return Err(KeyError::TooLong(unpadded.len() * 5 / 8));
    }

    let upper = unpadded.to_ascii_uppercase();
    let key = BASE32_NOPAD.decode(&upper).map_err(|_| KeyError::Base32)?;

    if key.is_empty() {
        return Err(KeyError::Empty);
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc4648_vectors() {
        assert_eq!(decode(b"MY======").unwrap(), b"f");
        assert_eq!(decode(b"MZXQ====").unwrap(), b"fo");
        assert_eq!(decode(b"MZXW6===").unwrap(), b"foo");
        assert_eq!(decode(b"MZXW6YQ=").unwrap(), b"foob");
        assert_eq!(decode(b"MZXW6YTB").unwrap(), b"fooba");
    }

    #[test]
    fn test_lower_case_and_missing_padding() {
        assert_eq!(decode(b"mzxw6ytboi").unwrap(), b"foobar");
    }

    #[test]
    fn test_sample_secret_from_document_header() {
        let key = decode(b"MFRGGZDFMYYTEMZUGU3DOOBZGA======").unwrap();
        assert_eq!(key, b"abcdef1234567890");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(decode(b"========"), Err(KeyError::Empty));
        assert_eq!(decode(b"MZXW6YT1"), Err(KeyError::Base32));
        // 65 characters would decode past 320 bits
        let long = "A".repeat(MAX_BASE32_INPUT + 1);
        assert!(matches!(decode(long.as_bytes()), Err(KeyError::TooLong(_))));
    }

    #[test]
    fn test_full_capacity_secret() {
        let input = "A".repeat(MAX_BASE32_INPUT);
        assert_eq!(decode(input.as_bytes()).unwrap(), vec![0u8; 40]);
    }
}
