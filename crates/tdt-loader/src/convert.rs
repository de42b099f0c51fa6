//! Converts deserialized XML wire shapes into `tdt-core`'s data model,
//! rejecting structurally invalid scheme files at load time rather than
//! deferring to translation time.

use regex::Regex;
use tdt_core::errors::{Result, TdtError};
use tdt_core::model::{Compaction, Field, GrammarToken, Level, LevelType, PadDir, Rule, RuleType, Scheme, SchemeOption};

use crate::xml::{FieldXml, LevelXml, OptionXml, RuleXml, SchemeXml};

fn invalid(path: &str, reason: impl Into<String>) -> TdtError {
    TdtError::InvalidSchemeFile(format!("{path}: {}", reason.into()))
}

pub fn convert_scheme(xml: SchemeXml, path: &str) -> Result<Scheme> {
    let mut levels = Vec::with_capacity(xml.levels.len());
    for level in xml.levels {
        levels.push(convert_level(level, path)?);
    }

    Ok(Scheme {
        name: xml.name,
        tag_length: xml.tag_length,
        option_key: xml.option_key,
        levels,
    })
}

fn convert_level(xml: LevelXml, path: &str) -> Result<Level> {
    let level_type: LevelType = xml.level_type.parse()?;

    let mut options = Vec::with_capacity(xml.options.len());
    for option in xml.options {
        options.push(convert_option(option, path)?);
    }

    let mut rules = Vec::with_capacity(xml.rules.len());
    for rule in xml.rules {
        rules.push(convert_rule(rule, path)?);
    }

    Ok(Level {
        level_type,
        prefix_match: xml.prefix_match,
        options,
        rules,
    })
}

fn convert_option(xml: OptionXml, path: &str) -> Result<SchemeOption> {
    let pattern = Regex::new(&xml.pattern).map_err(|e| invalid(path, format!("invalid pattern /{}/ : {e}", xml.pattern)))?;

    let mut fields = Vec::with_capacity(xml.fields.len());
    for field in xml.fields {
        fields.push(convert_field(field, path)?);
    }

    let grammar = parse_grammar(&xml.grammar);

    Ok(SchemeOption {
        option_key: xml.option_key,
        pattern,
        pattern_source: xml.pattern,
        fields,
        grammar,
    })
}

fn parse_grammar(raw: &str) -> Vec<GrammarToken> {
    raw.split_whitespace()
        .map(|tok| {
            if let Some(lit) = tok.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
                GrammarToken::Literal(lit.to_string())
            } else {
                GrammarToken::FieldRef(tok.to_string())
            }
        })
        .collect()
}

fn convert_field(xml: FieldXml, path: &str) -> Result<Field> {
    let pad_dir = convert_pad_dir(xml.pad_dir.as_deref(), path)?;
    let bit_pad_dir = convert_pad_dir(xml.bit_pad_dir.as_deref(), path)?;
    let pad_char = match xml.pad_char {
        Some(s) => Some(
            s.chars()
                .next()
                .ok_or_else(|| invalid(path, format!("field {:?} has an empty padChar", xml.name)))?,
        ),
        None => None,
    };
    let compaction = match xml.compaction {
        Some(n) => Some(Compaction::from_bits(n)?),
        None => None,
    };

    Ok(Field {
        name: xml.name,
        seq: xml.seq,
        length: xml.length,
        character_set: xml.character_set,
        decimal_minimum: xml.decimal_minimum,
        decimal_maximum: xml.decimal_maximum,
        pad_dir,
        pad_char,
        bit_pad_dir,
        compaction,
    })
}

fn convert_pad_dir(raw: Option<&str>, path: &str) -> Result<Option<PadDir>> {
    match raw {
        None => Ok(None),
        Some("LEFT") => Ok(Some(PadDir::Left)),
        Some("RIGHT") => Ok(Some(PadDir::Right)),
        Some(other) => Err(invalid(path, format!("unknown padDir/bitPadDir {other:?}, expected LEFT or RIGHT"))),
    }
}

fn convert_rule(xml: RuleXml, path: &str) -> Result<Rule> {
    let rule_type = match xml.rule_type.as_str() {
        "EXTRACT" => RuleType::Extract,
        "FORMAT" => RuleType::Format,
        other => return Err(invalid(path, format!("unknown rule type {other:?}, expected EXTRACT or FORMAT"))),
    };

    Ok(Rule {
        rule_type,
        function: xml.function,
        new_field_name: xml.new_field_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grammar_mixed_tokens() {
        let grammar = parse_grammar("'urn:epc:id:sgtin:' company '.' itemref '.' serial");
        assert_eq!(
            grammar,
            vec![
                GrammarToken::Literal("urn:epc:id:sgtin:".to_string()),
                GrammarToken::FieldRef("company".to_string()),
                GrammarToken::Literal(".".to_string()),
                GrammarToken::FieldRef("itemref".to_string()),
                GrammarToken::Literal(".".to_string()),
                GrammarToken::FieldRef("serial".to_string()),
            ]
        );
    }

    #[test]
    fn test_convert_pad_dir_rejects_unknown() {
        assert!(convert_pad_dir(Some("SIDEWAYS"), "test.xml").is_err());
    }

    #[test]
    fn test_convert_field_rejects_bad_compaction() {
        let xml = FieldXml {
            name: "serial".to_string(),
            seq: 1,
            length: None,
            character_set: None,
            decimal_minimum: None,
            decimal_maximum: None,
            pad_dir: None,
            pad_char: None,
            bit_pad_dir: None,
            compaction: Some(3),
        };
        assert!(convert_field(xml, "test.xml").is_err());
    }
}
