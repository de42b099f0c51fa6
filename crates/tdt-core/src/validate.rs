//! Field validator (C2): character-set and decimal-range checks shared by the
//! tokenizer (C5) and the emitter (C6).

use num_bigint::BigInt;
use regex::Regex;

use crate::errors::{Result, TdtError};
use crate::model::Field;

/// Checks `token` against `field.character_set`, if set. The charset fragment is
/// wrapped as `^<charset>*$` (a trailing `*` is not duplicated if already present).
/// A field with no declared character set accepts any value.
pub fn check_charset(field: &Field, token: &str) -> Result<()> {
    let Some(pattern) = field.character_set_pattern() else {
        return Ok(());
    };

    let re = Regex::new(&pattern).map_err(|e| {
        TdtError::InvalidSchemeFile(format!(
            "field {:?} has an invalid characterSet regex {:?}: {e}",
            field.name, field.character_set
        ))
    })?;

    if re.is_match(token) {
        Ok(())
    } else {
        Err(TdtError::InvalidCharacterSet {
            field: field.name.clone(),
            value: token.to_string(),
            charset: field.character_set.clone().unwrap_or_default(),
        })
    }
}

/// Checks `token` against `field.decimal_minimum`/`decimal_maximum`, if both are
/// set and `token` parses as a decimal integer. Either bound being absent means
/// that bound is not enforced.
pub fn check_range(field: &Field, token: &str) -> Result<()> {
    let (Some(min), Some(max)) = (&field.decimal_minimum, &field.decimal_maximum) else {
        return Ok(());
    };

    let Ok(value) = token.parse::<BigInt>() else {
        return Ok(());
    };
    let min_value: BigInt = min
        .parse()
        .map_err(|_| TdtError::InvalidSchemeFile(format!("decimalMinimum {min:?} is not an integer")))?;
    let max_value: BigInt = max
        .parse()
        .map_err(|_| TdtError::InvalidSchemeFile(format!("decimalMaximum {max:?} is not an integer")))?;

    if value < min_value {
        return Err(TdtError::BelowMinimum {
            field: field.name.clone(),
            value: token.to_string(),
            minimum: min.clone(),
        });
    }
    if value > max_value {
        return Err(TdtError::AboveMaximum {
            field: field.name.clone(),
            value: token.to_string(),
            maximum: max.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(character_set: Option<&str>, min: Option<&str>, max: Option<&str>) -> Field {
        Field {
            name: "filter".to_string(),
            seq: 1,
            length: None,
            character_set: character_set.map(str::to_string),
            decimal_minimum: min.map(str::to_string),
            decimal_maximum: max.map(str::to_string),
            pad_dir: None,
            pad_char: None,
            bit_pad_dir: None,
            compaction: None,
        }
    }

    #[test]
    fn test_charset_pass() {
        let f = field(Some("[0-9]"), None, None);
        assert!(check_charset(&f, "1234").is_ok());
    }

    #[test]
    fn test_charset_fail() {
        let f = field(Some("[0-9]"), None, None);
        assert_eq!(
            check_charset(&f, "12a4").unwrap_err(),
            TdtError::InvalidCharacterSet {
                field: "filter".to_string(),
                value: "12a4".to_string(),
                charset: "[0-9]".to_string(),
            }
        );
    }

    #[test]
    fn test_charset_empty_ok_when_unset() {
        let f = field(None, None, None);
        assert!(check_charset(&f, "anything").is_ok());
    }

    #[test]
    fn test_range_pass() {
        let f = field(None, Some("0"), Some("7"));
        assert!(check_range(&f, "3").is_ok());
    }

    #[test]
    fn test_range_above_maximum() {
        let f = field(None, Some("0"), Some("7"));
        assert_eq!(
            check_range(&f, "8").unwrap_err(),
            TdtError::AboveMaximum {
                field: "filter".to_string(),
                value: "8".to_string(),
                maximum: "7".to_string(),
            }
        );
    }

    #[test]
    fn test_range_below_minimum() {
        let f = field(None, Some("1"), Some("7"));
        assert_eq!(
            check_range(&f, "0").unwrap_err(),
            TdtError::BelowMinimum {
                field: "filter".to_string(),
                value: "0".to_string(),
                minimum: "1".to_string(),
            }
        );
    }

    #[test]
    fn test_range_unbounded_when_absent() {
        let f = field(None, None, Some("7"));
        assert!(check_range(&f, "999999").is_ok());
    }
}
