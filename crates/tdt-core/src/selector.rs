//! Scheme selector (C4): resolves the unique `(scheme, level, option)` an input
//! identifier belongs to, and the `(level, option)` an output representation
//! should take within the same scheme (§4.4).

use crate::errors::{Result, TdtError};
use crate::hints::Hints;
use crate::model::{LevelType, SchemeSet};

/// Indices into a [`SchemeSet`] identifying one `(Scheme, Level, SchemeOption)`
/// triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub scheme_idx: usize,
    pub level_idx: usize,
    pub option_idx: usize,
}

/// Selects the input `(scheme, level, option)` for `identifier` given `hints`,
/// per the candidate rules of §4.4. Fails with [`TdtError::NoMatch`] if no
/// triple matches, or [`TdtError::AmbiguousMatch`] if more than one does.
pub fn select_input(scheme_set: &SchemeSet, identifier: &str, hints: &Hints) -> Result<Selection> {
    let mut candidates = Vec::new();

    for (scheme_idx, scheme) in scheme_set.schemes.iter().enumerate() {
        if let Some(wanted) = hints.tag_length() {
            if wanted != scheme.tag_length {
                continue;
            }
        }

        for (level_idx, level) in scheme.levels.iter().enumerate() {
            if level.prefix_match.is_empty() || !identifier.starts_with(&level.prefix_match) {
                continue;
            }

            for (option_idx, option) in level.options.iter().enumerate() {
                if !option.pattern.is_match(identifier) {
                    continue;
                }

                if !level.level_type.is_option_key_exempt() {
                    let have = scheme.option_key.as_deref().and_then(|key| hints.get(key));
                    if option.option_key.as_deref() != have {
                        continue;
                    }
                }

                candidates.push(Selection {
                    scheme_idx,
                    level_idx,
                    option_idx,
                });
            }
        }
    }

    match candidates.len() {
        0 => Err(TdtError::NoMatch {
            identifier: identifier.to_string(),
        }),
        1 => Ok(candidates[0]),
        n => {
            let describe = candidates
                .iter()
                .map(|c| {
                    let scheme = &scheme_set.schemes[c.scheme_idx];
                    format!("{}/{}", scheme.name, scheme.levels[c.level_idx].level_type)
                })
                .collect::<Vec<_>>()
                .join(", ");
            Err(TdtError::AmbiguousMatch {
                identifier: identifier.to_string(),
                count: n,
                candidates: describe,
            })
        }
    }
}

/// Selects the `(level, option)` within `scheme_idx` that represents
/// `target_level`, carrying forward the same `optionKey` as `input`. This is
/// the "Output selection" step of §4.4: same scheme, same option identity,
/// different level.
pub fn select_output(
    scheme_set: &SchemeSet,
    input: Selection,
    target_level: LevelType,
) -> Result<Selection> {
    let scheme = &scheme_set.schemes[input.scheme_idx];
    let input_option_key = scheme.levels[input.level_idx].options[input.option_idx]
        .option_key
        .clone();

    let mut found = None;
    for (level_idx, level) in scheme.levels.iter().enumerate() {
        if level.level_type != target_level {
            continue;
        }
        for (option_idx, option) in level.options.iter().enumerate() {
            if option.option_key == input_option_key {
                found = Some(Selection {
                    scheme_idx: input.scheme_idx,
                    level_idx,
                    option_idx,
                });
            }
        }
    }

    found.ok_or_else(|| {
        TdtError::InvalidSchemeFile(format!(
            "scheme {:?} has no {target_level} option matching optionKey {:?}",
            scheme.name, input_option_key
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, GrammarToken, Level, RuleType, Scheme, SchemeOption};
    use regex::Regex;

    fn simple_scheme() -> Scheme {
        let option = SchemeOption {
            option_key: Some("7".to_string()),
            pattern: Regex::new(r"^urn:x:(\d+)$").unwrap(),
            pattern_source: r"^urn:x:(\d+)$".to_string(),
            fields: vec![Field {
                name: "value".to_string(),
                seq: 1,
                length: None,
                character_set: None,
                decimal_minimum: None,
                decimal_maximum: None,
                pad_dir: None,
                pad_char: None,
                bit_pad_dir: None,
                compaction: None,
            }],
            grammar: vec![GrammarToken::FieldRef("value".to_string())],
        };

        let binary_option = SchemeOption {
            option_key: Some("7".to_string()),
            pattern: Regex::new(r"^([01]{8})$").unwrap(),
            pattern_source: r"^([01]{8})$".to_string(),
            fields: vec![Field {
                name: "value".to_string(),
                seq: 1,
                length: Some(8),
                character_set: None,
                decimal_minimum: None,
                decimal_maximum: None,
                pad_dir: None,
                pad_char: None,
                bit_pad_dir: None,
                compaction: None,
            }],
            grammar: vec![GrammarToken::FieldRef("value".to_string())],
        };

        Scheme {
            name: "TEST".to_string(),
            tag_length: 8,
            option_key: Some("companyprefixlength".to_string()),
            levels: vec![
                Level {
                    level_type: LevelType::PureIdentity,
                    prefix_match: "urn:x:".to_string(),
                    options: vec![option],
                    rules: Vec::new(),
                },
                Level {
                    level_type: LevelType::Binary,
                    prefix_match: String::new(),
                    options: vec![binary_option],
                    rules: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn test_select_input_unique_match() {
        let set = SchemeSet::new(vec![simple_scheme()]).unwrap();
        let hints = Hints::new();
        let sel = select_input(&set, "urn:x:42", &hints).unwrap();
        assert_eq!(sel.scheme_idx, 0);
        assert_eq!(set.schemes[sel.scheme_idx].levels[sel.level_idx].level_type, LevelType::PureIdentity);
    }

    #[test]
    fn test_select_input_no_match() {
        let set = SchemeSet::new(vec![simple_scheme()]).unwrap();
        let hints = Hints::new();
        assert!(matches!(
            select_input(&set, "urn:y:42", &hints),
            Err(TdtError::NoMatch { .. })
        ));
    }

    #[test]
    fn test_select_output_same_option_key() {
        let set = SchemeSet::new(vec![simple_scheme()]).unwrap();
        let hints = Hints::new();
        let input = select_input(&set, "urn:x:42", &hints).unwrap();
        let output = select_output(&set, input, LevelType::Binary).unwrap();
        assert_eq!(set.schemes[output.scheme_idx].levels[output.level_idx].level_type, LevelType::Binary);
    }

    #[test]
    fn test_ambiguous_match() {
        let mut scheme_a = simple_scheme();
        scheme_a.name = "A".to_string();
        let mut scheme_b = simple_scheme();
        scheme_b.name = "B".to_string();
        let set = SchemeSet::new(vec![scheme_a, scheme_b]).unwrap();
        let hints = Hints::new();
        assert!(matches!(
            select_input(&set, "urn:x:42", &hints),
            Err(TdtError::AmbiguousMatch { .. })
        ));
    }
}
