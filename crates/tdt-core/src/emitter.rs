//! Emitter (C6): renders a populated [`TokenMap`] into the output
//! representation's grammar — either a literal/field-reference text template,
//! or a BINARY bit-string built by compacting and bit-padding each field in
//! turn (§4.6).

use percent_encoding::percent_decode_str;

use crate::bits::{apply_pad_char, dec_to_bin, string_to_binary};
use crate::errors::{Result, TdtError};
use crate::model::{Field, GrammarToken, LevelType, PadDir, SchemeOption, TokenMap};
use crate::validate::{check_charset, check_range};

/// Renders `tokens` against `output_option`'s grammar for `output_level`.
pub fn emit(tokens: &TokenMap, output_level: &LevelType, output_option: &SchemeOption) -> Result<String> {
    if *output_level == LevelType::Binary {
        emit_binary(tokens, output_option)
    } else {
        emit_text(tokens, *output_level, output_option)
    }
}

fn field_value<'a>(tokens: &'a TokenMap, field: &Field) -> Result<&'a String> {
    tokens.get(&field.name).ok_or_else(|| {
        TdtError::InvalidSchemeFile(format!("output field {:?} has no bound value", field.name))
    })
}

fn emit_text(tokens: &TokenMap, output_level: LevelType, output_option: &SchemeOption) -> Result<String> {
    let mut out = String::new();

    for token in &output_option.grammar {
        match token {
            GrammarToken::Literal(lit) => out.push_str(lit),
            GrammarToken::FieldRef(name) => {
                let field = output_option
                    .field_by_name(name)
                    .ok_or_else(|| TdtError::InvalidSchemeFile(format!("grammar references unknown field {name:?}")))?;
                let value = field_value(tokens, field)?;

                let rendered = if matches!(output_level, LevelType::TagEncoding | LevelType::PureIdentity) {
                    percent_decode_str(value)
                        .decode_utf8()
                        .map_err(|e| {
                            TdtError::InvalidArgument(format!(
                                "field {name:?} value {value:?} is not valid UTF-8 after percent-decoding: {e}"
                            ))
                        })?
                        .into_owned()
                } else {
                    value.clone()
                };

                check_charset(field, &rendered)?;
                check_range(field, &rendered)?;

                let rendered = match (field.pad_dir, field.length) {
                    (Some(dir), Some(len)) => apply_pad_char(&rendered, dir, field.pad_char.unwrap_or(' '), len),
                    _ => rendered,
                };

                out.push_str(&rendered);
            }
        }
    }

    Ok(out)
}

fn emit_binary(tokens: &TokenMap, output_option: &SchemeOption) -> Result<String> {
    let mut out = String::new();

    for field in &output_option.fields {
        let value = field_value(tokens, field)?.clone();

        let value = match (field.pad_dir, field.pad_char, field.length) {
            (Some(dir), Some(ch), Some(len)) => apply_pad_char(&value, dir, ch, len),
            _ => value,
        };

        let mut bits = match field.compaction {
            Some(compaction) => {
                check_charset(field, &value)?;
                string_to_binary(&value, compaction.bits())?
            }
            None => {
                check_range(field, &value)?;
                dec_to_bin(&value)?
            }
        };

        if let Some(len) = field.length {
            let dir = field.bit_pad_dir.unwrap_or(PadDir::Left);
            bits = apply_pad_char(&bits, dir, '0', len);
            if bits.len() != len {
                return Err(TdtError::InvalidSchemeFile(format!(
                    "field {:?} value {:?} encodes to {} bits, expected exactly {len}",
                    field.name,
                    value,
                    bits.len()
                )));
            }
        }

        out.push_str(&bits);
    }

    Ok(out)
}
