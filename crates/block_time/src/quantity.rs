//! EVM JSON-RPC quantity encoding: `0x`-prefixed, big-endian, no padding.
use std::borrow::Cow;

use crate::error::ParseError;

/// Parses an optionally `0x`-prefixed hex quantity into a `u64`.
///
/// Leading zeros are accepted; signs, whitespace and anything wider than
/// 64 bits are rejected.
pub fn hex_to_u64(input: &str) -> Result<u64, ParseError> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    if digits.is_empty() {
        return Err(ParseError::EmptyHex);
    }

    // `hex::decode` only works on whole bytes.
    let padded: Cow<'_, str> = if digits.len() % 2 == 1 {
        Cow::Owned(format!("0{digits}"))
    } else {
        Cow::Borrowed(digits)
    };
    let bytes = hex::decode(padded.as_ref()).map_err(|_| ParseError::InvalidHex {
        input: input.to_string(),
    })?;

    let significant = match bytes.iter().position(|b| *b != 0) {
        Some(first) => &bytes[first..],
        None => return Ok(0),
    };
    if significant.len() > 8 {
        return Err(ParseError::HexOverflow {
            input: input.to_string(),
        });
    }

    let mut be = [0u8; 8];
    be[8 - significant.len()..].copy_from_slice(significant);
    Ok(u64::from_be_bytes(be))
}

/// Renders `value` as an EVM quantity, e.g. `0x1b4`.
pub fn u64_to_hex(value: u64) -> String {
    format!("{value:#x}")
}
