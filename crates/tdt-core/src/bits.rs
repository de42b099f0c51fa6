//! Bit-codec: 5/6/7/8-bit character compaction, directional bit-padding, and
//! decimal ↔ binary conversion over bit-strings (`"0"`/`"1"` characters).
//!
//! Everything here is a pure function; none of it touches a [`crate::model::Field`]
//! or a [`crate::model::TokenMap`] directly, so it is straightforward to test in
//! isolation and to extend with new compaction widths later.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::errors::{Result, TdtError};
use crate::model::PadDir;

fn round_up(len: usize, multiple: usize) -> usize {
    if multiple == 0 {
        return len;
    }
    len.div_ceil(multiple)
        .checked_mul(multiple)
        .unwrap_or(len)
}

/// Strips directional bit-padding from `bits`.
///
/// `compaction_bits` is the field's compaction width (5/6/7/8) when the field is
/// character-compacted, or `0` for a plain numeric field. When non-zero, the kept
/// length is rounded *up* to a multiple of `compaction_bits` so a partially-padded
/// final character is never cut off mid-character.
pub fn strip_bit_padding(bits: &str, dir: PadDir, compaction_bits: usize) -> String {
    if bits.is_empty() {
        return String::new();
    }

    match dir {
        PadDir::Right => {
            let keep_len = match bits.rfind('1') {
                Some(idx) => idx + 1,
                None => 0,
            };
            let keep_len = if compaction_bits >= 4 {
                round_up(keep_len, compaction_bits).min(bits.len())
            } else {
                keep_len
            };
            bits[..keep_len].to_string()
        }
        PadDir::Left => {
            let start = match bits.find('1') {
                Some(idx) => idx,
                None => bits.len(),
            };
            let start = if compaction_bits >= 4 {
                let kept = bits.len() - start;
                let rounded = round_up(kept, compaction_bits);
                bits.len().saturating_sub(rounded)
            } else {
                start
            };
            bits[start..].to_string()
        }
    }
}

/// Converts a bit-string into a character string by slicing it into `k`-bit chunks
/// (`k` ∈ {5,6,7,8}) and interpreting each chunk as an unsigned byte (zero-extended
/// to 8 bits). Per ISO 15962: 5-bit chunks are offset by `+64`; 6-bit chunks `< 32`
/// are offset by `+64`; 7- and 8-bit chunks are emitted as-is.
pub fn binary_to_string(bits: &str, k: u8) -> Result<String> {
    if !matches!(k, 5 | 6 | 7 | 8) {
        return Err(TdtError::UnsupportedCompaction(k));
    }
    validate_binary(bits)?;

    let k = k as usize;
    if bits.len() % k != 0 {
        return Err(TdtError::InvalidBinary(bits.to_string()));
    }

    let mut out = String::with_capacity(bits.len() / k);
    for chunk in bits.as_bytes().chunks(k) {
        let chunk = std::str::from_utf8(chunk).unwrap();
        let value = u32::from_str_radix(chunk, 2).map_err(|_| TdtError::InvalidBinary(bits.to_string()))?;

        let byte = match k {
            5 => value + 64,
            6 => {
                if value < 32 {
                    value + 64
                } else {
                    value
                }
            }
            _ => value,
        };

        out.push(byte as u8 as char);
    }

    Ok(out)
}

/// Inverse of [`binary_to_string`]: each character's code point modulo `2^k` is
/// rendered as a zero-padded `k`-bit binary string.
pub fn string_to_binary(text: &str, k: u8) -> Result<String> {
    if !matches!(k, 5 | 6 | 7 | 8) {
        return Err(TdtError::UnsupportedCompaction(k));
    }

    let modulus = 1u32 << k;
    let mut out = String::with_capacity(text.chars().count() * k as usize);
    for ch in text.chars() {
        let code = ch as u32 % modulus;
        out.push_str(&format!("{:0width$b}", code, width = k as usize));
    }

    Ok(out)
}

/// Interprets `bits` as a non-negative integer and renders it as a decimal string.
/// The empty bit-string maps to `"0"`. Uses an arbitrary-precision integer so
/// tag lengths well beyond 64 bits (96-bit EPCs and up) never overflow.
pub fn bin_to_dec(bits: &str) -> Result<String> {
    if bits.is_empty() {
        return Ok("0".to_string());
    }
    validate_binary(bits)?;

    let value = BigUint::parse_bytes(bits.as_bytes(), 2)
        .ok_or_else(|| TdtError::InvalidBinary(bits.to_string()))?;
    Ok(value.to_str_radix(10))
}

/// Inverse of [`bin_to_dec`]: the minimum-width binary representation of a
/// non-negative decimal string. The empty string maps to `"0"`.
pub fn dec_to_bin(dec: &str) -> Result<String> {
    if dec.is_empty() {
        return Ok("0".to_string());
    }

    let value = BigUint::parse_bytes(dec.as_bytes(), 10)
        .ok_or_else(|| TdtError::InvalidArgument(format!("{dec:?} is not a decimal integer")))?;

    if value.is_zero() {
        return Ok("0".to_string());
    }

    Ok(value.to_str_radix(2))
}

fn validate_binary(bits: &str) -> Result<()> {
    if bits.bytes().all(|b| b == b'0' || b == b'1') {
        Ok(())
    } else {
        Err(TdtError::InvalidBinary(bits.to_string()))
    }
}

/// Prepends/appends `ch` to `s` until it reaches exactly `req_len` characters.
/// A no-op when `s` is already at least `req_len` characters long.
pub fn apply_pad_char(s: &str, dir: PadDir, ch: char, req_len: usize) -> String {
    let len = s.chars().count();
    if len >= req_len {
        return s.to_string();
    }
    let pad: String = std::iter::repeat(ch).take(req_len - len).collect();
    match dir {
        PadDir::Left => pad + s,
        PadDir::Right => s.to_string() + &pad,
    }
}

/// Removes a consecutive run of `ch` from the given side of `s`.
pub fn strip_pad_char(s: &str, dir: PadDir, ch: char) -> String {
    match dir {
        PadDir::Left => s.trim_start_matches(ch).to_string(),
        PadDir::Right => s.trim_end_matches(ch).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bit_padding_right_numeric() {
        assert_eq!(strip_bit_padding("00101000", PadDir::Right, 0), "00101");
    }

    #[test]
    fn test_strip_bit_padding_right_rounded() {
        // last 1 at index 5 (0-based) -> keep_len 6, rounded up to multiple of 8 -> 8
        assert_eq!(strip_bit_padding("00101000", PadDir::Right, 8), "00101000");
    }

    #[test]
    fn test_strip_bit_padding_left_numeric() {
        assert_eq!(strip_bit_padding("00010100", PadDir::Left, 0), "10100");
    }

    #[test]
    fn test_strip_bit_padding_all_zero() {
        assert_eq!(strip_bit_padding("0000", PadDir::Right, 0), "");
        assert_eq!(strip_bit_padding("0000", PadDir::Left, 0), "");
    }

    #[test]
    fn test_binary_to_string_7bit() {
        // 'A' = 0x41 = 65 = 1000001
        assert_eq!(binary_to_string("1000001", 7).unwrap(), "A");
    }

    #[test]
    fn test_binary_to_string_5bit_digit() {
        // ISO 15962: 5-bit value 1 -> char 1+64 = 65 = 'A'
        assert_eq!(binary_to_string("00001", 5).unwrap(), "A");
    }

    #[test]
    fn test_binary_to_string_6bit_below_32() {
        assert_eq!(binary_to_string("000001", 6).unwrap(), "A");
    }

    #[test]
    fn test_binary_to_string_6bit_above_32() {
        // 6-bit value 32 ('space' region) is emitted as-is: 32 = ' '
        assert_eq!(binary_to_string("100000", 6).unwrap(), " ");
    }

    #[test]
    fn test_string_to_binary_roundtrip_7bit() {
        let bits = string_to_binary("Hi", 7).unwrap();
        assert_eq!(binary_to_string(&bits, 7).unwrap(), "Hi");
    }

    #[test]
    fn test_unsupported_compaction() {
        assert_eq!(
            binary_to_string("0000", 3).unwrap_err(),
            TdtError::UnsupportedCompaction(3)
        );
    }

    #[test]
    fn test_bin_to_dec_empty() {
        assert_eq!(bin_to_dec("").unwrap(), "0");
    }

    #[test]
    fn test_bin_to_dec_basic() {
        assert_eq!(bin_to_dec("1010").unwrap(), "10");
    }

    #[test]
    fn test_bin_to_dec_96_bits_no_overflow() {
        let bits = "1".to_string() + &"0".repeat(95);
        let dec = bin_to_dec(&bits).unwrap();
        assert_eq!(dec, (BigUint::from(1u8) << 95u32).to_str_radix(10));
    }

    #[test]
    fn test_dec_to_bin_basic() {
        assert_eq!(dec_to_bin("10").unwrap(), "1010");
    }

    #[test]
    fn test_dec_to_bin_empty() {
        assert_eq!(dec_to_bin("").unwrap(), "0");
    }

    #[test]
    fn test_apply_pad_char_left() {
        assert_eq!(apply_pad_char("42", PadDir::Left, '0', 5), "00042");
    }

    #[test]
    fn test_apply_pad_char_noop() {
        assert_eq!(apply_pad_char("12345", PadDir::Left, '0', 3), "12345");
    }

    #[test]
    fn test_strip_pad_char_right() {
        assert_eq!(strip_pad_char("42000", PadDir::Right, '0'), "42");
    }

    #[test]
    fn test_padding_symmetry() {
        let x = "123";
        let padded = apply_pad_char(x, PadDir::Left, '0', 8);
        assert_eq!(strip_pad_char(&padded, PadDir::Left, '0'), x);
    }
}
