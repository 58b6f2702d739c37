//! Profile line parser
//!
//! A line is `name, interval, digits, key`. Fields are checked in that
//! order and the first failure decides the reported code.

use crate::key::{self, KeyDecode};
use crate::storage::{
    Digits, ProfileName, ProfileRecord, RecordError, MAX_INTERVAL, MIN_INTERVAL,
};

use super::diagnostics::{Diagnostic, ResultCode};

/// What a single line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParsedLine {
    /// Not a profile line (wrong number of separators)
    Skip,
    /// Profile line with an invalid field
    Rejected(Diagnostic),
    /// Complete new profile
    New(ProfileRecord),
    /// Profile line whose key is `***`
    Unchanged(ProfileName),
}

/// Parses one line, without its terminator.
pub(crate) fn parse(line: &[u8]) -> ParsedLine {
    let fields: Vec<&[u8]> = line.split(|b| *b == b',').collect();
    let [name, interval, digits, key] = match fields.as_slice() {
        [a, b, c, d] => [*a, *b, *c, *d],
        _ => return ParsedLine::Skip,
    };

    let reject = |code| ParsedLine::Rejected(Diagnostic::new(code, name));

    let profile_name = match ProfileName::new(name) {
        Ok(n) => n,
        Err(e) => return reject(result_code_for(&e)),
    };

    let interval = match parse_number(interval) {
        None => return reject(ResultCode::IntervalNumericError),
        Some(v) if !(MIN_INTERVAL..=MAX_INTERVAL).contains(&v) => {
            return reject(ResultCode::IntervalError)
        }
        Some(v) => v,
    };

    let digits = match parse_number(digits) {
        None => return reject(ResultCode::DigitsNumericError),
        Some(v) => match Digits::from_value(v) {
            Ok(d) => d,
            Err(_) => return reject(ResultCode::DigitsError),
        },
    };

    match key::decode(key) {
        KeyDecode::Unchanged => ParsedLine::Unchanged(profile_name),
        KeyDecode::Invalid(_) => reject(ResultCode::KeyError),
        KeyDecode::Raw(secret) => match ProfileRecord::new(profile_name, interval, digits, secret)
        {
            Ok(record) => ParsedLine::New(record),
            Err(e) => reject(result_code_for(&e)),
        },
    }
}

fn result_code_for(error: &RecordError) -> ResultCode {
    match error {
        // the appliance reports an overlong name with the interval code
        RecordError::NameTooLong(_) => ResultCode::IntervalError,
        RecordError::InvalidNameByte => ResultCode::NameError,
        RecordError::IntervalOutOfRange(_) => ResultCode::IntervalError,
        RecordError::InvalidDigits(_) => ResultCode::DigitsError,
        RecordError::KeyTooLong(_) => ResultCode::KeyError,
    }
}

/// Parses a numeric field made of digits and spaces.
///
/// Returns `None` if any other character is present. Leading spaces are
/// skipped and the value ends at the first space after the digits. A field
/// without digits reads as 0. Large values saturate.
fn parse_number(field: &[u8]) -> Option<u32> {
    if !field.iter().all(|b| b.is_ascii_digit() || *b == b' ') {
        return None;
    }

    let value = field
        .iter()
        .skip_while(|b| **b == b' ')
        .take_while(|b| b.is_ascii_digit())
        .fold(0u32, |acc, b| {
            acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
        });

    Some(value)
}
