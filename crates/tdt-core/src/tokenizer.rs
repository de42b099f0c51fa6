//! Tokenizer (C5): regex-captures an identifier into named fields per its input
//! option, decoding BINARY fields (compaction + bit-padding) or validating text
//! fields directly (§4.5).

use crate::bits::{apply_pad_char, bin_to_dec, binary_to_string, strip_bit_padding, strip_pad_char};
use crate::errors::{Result, TdtError};
use crate::model::{Level, LevelType, SchemeOption, TokenMap};
use crate::validate::{check_charset, check_range};

/// Tokenizes `identifier` against `input_option`, reconciling BINARY
/// text-padding against the corresponding field of `output_option` (§4.5).
pub fn tokenize(
    identifier: &str,
    input_level: &Level,
    input_option: &SchemeOption,
    output_option: &SchemeOption,
) -> Result<TokenMap> {
    let captures = input_option.pattern.captures(identifier).ok_or_else(|| TdtError::NoMatch {
        identifier: identifier.to_string(),
    })?;

    let mut tokens = TokenMap::new();

    for field in &input_option.fields {
        let raw = captures.get(field.seq).map(|m| m.as_str()).unwrap_or("").to_string();

        let token = if input_level.level_type == LevelType::Binary {
            let mut token = if let Some(compaction) = field.compaction {
                let mut bits = raw;
                if field.bit_pad_dir.is_some() {
                    let dir = field.bit_pad_dir.unwrap();
                    bits = strip_bit_padding(&bits, dir, compaction.bits() as usize);
                }
                let text = binary_to_string(&bits, compaction.bits())?;
                check_charset(field, &text)?;
                text
            } else {
                let mut bits = raw;
                if let Some(dir) = field.bit_pad_dir {
                    bits = strip_bit_padding(&bits, dir, 0);
                }
                let dec = bin_to_dec(&bits)?;
                if !dec.is_empty() {
                    check_range(field, &dec)?;
                }
                dec
            };

            let output_field = output_option.field_by_name(&field.name);
            token = reconcile_text_padding(field, output_field, token)?;
            token
        } else {
            check_charset(field, &raw)?;
            check_range(field, &raw)?;
            raw
        };

        tokens.insert_new(field.name.clone(), token)?;
    }

    Ok(tokens)
}

/// Reconciles input/output text-padding declarations on a BINARY field (§4.5):
/// it is a scheme-file error for both sides to declare padding, applying
/// `stripPadChar` when only the input does, and `applyPadChar` when only the
/// output does.
fn reconcile_text_padding(
    input_field: &crate::model::Field,
    output_field: Option<&crate::model::Field>,
    token: String,
) -> Result<String> {
    let input_pad = input_field.pad_dir.is_some();
    let output_pad = output_field.is_some_and(|f| f.pad_dir.is_some());

    match (input_pad, output_pad) {
        (true, true) => Err(TdtError::InvalidSchemeFile(format!(
            "field {:?} declares text padding on both its input and output representation",
            input_field.name
        ))),
        (true, false) => {
            let dir = input_field.pad_dir.unwrap();
            let ch = input_field.pad_char.unwrap_or(' ');
            Ok(strip_pad_char(&token, dir, ch))
        }
        (false, true) => {
            let output_field = output_field.unwrap();
            let dir = output_field.pad_dir.unwrap();
            let ch = output_field.pad_char.unwrap_or(' ');
            let len = output_field.length.unwrap_or(token.chars().count());
            Ok(apply_pad_char(&token, dir, ch, len))
        }
        (false, false) => Ok(token),
    }
}
