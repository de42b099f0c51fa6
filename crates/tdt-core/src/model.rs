//! Declarative data model for scheme files: [`Scheme`] → [`Level`] → [`SchemeOption`] →
//! ([`Field`], [`Rule`]).
//!
//! This is a pure in-memory representation; nothing here reads a file or parses XML
//! (that lives in the `tdt-loader` crate). A [`SchemeSet`] is an arena of [`Scheme`]s
//! addressed by index rather than a graph of parent back-references, so building one
//! never needs `Rc`/`Weak` or unsafe aliasing.

use regex::Regex;

use crate::errors::{Result, TdtError};

/// The representation a [`Level`] encodes an identifier as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelType {
    Binary,
    TagEncoding,
    PureIdentity,
    Legacy,
    LegacyAi,
    OnsHostname,
}

impl LevelType {
    /// The three levels for which option selection is driven by the regex match
    /// alone, never by an `optionKey` hint (§4.4).
    pub fn is_option_key_exempt(self) -> bool {
        matches!(
            self,
            LevelType::Binary | LevelType::TagEncoding | LevelType::PureIdentity
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LevelType::Binary => "BINARY",
            LevelType::TagEncoding => "TAG_ENCODING",
            LevelType::PureIdentity => "PURE_IDENTITY",
            LevelType::Legacy => "LEGACY",
            LevelType::LegacyAi => "LEGACY_AI",
            LevelType::OnsHostname => "ONS_HOSTNAME",
        }
    }
}

impl std::str::FromStr for LevelType {
    type Err = TdtError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BINARY" => Ok(LevelType::Binary),
            "TAG_ENCODING" => Ok(LevelType::TagEncoding),
            "PURE_IDENTITY" => Ok(LevelType::PureIdentity),
            "LEGACY" => Ok(LevelType::Legacy),
            "LEGACY_AI" => Ok(LevelType::LegacyAi),
            "ONS_HOSTNAME" => Ok(LevelType::OnsHostname),
            other => Err(TdtError::InvalidArgument(format!(
                "unknown level {other:?}, expected one of BINARY, TAG_ENCODING, PURE_IDENTITY, LEGACY, LEGACY_AI, ONS_HOSTNAME"
            ))),
        }
    }
}

impl std::fmt::Display for LevelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction a padding operation runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadDir {
    Left,
    Right,
}

/// Bit-per-character compaction width used to pack a text field into BINARY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compaction {
    Bit5,
    Bit6,
    Bit7,
    Bit8,
}

impl Compaction {
    pub fn bits(self) -> u8 {
        match self {
            Compaction::Bit5 => 5,
            Compaction::Bit6 => 6,
            Compaction::Bit7 => 7,
            Compaction::Bit8 => 8,
        }
    }

    pub fn from_bits(n: u8) -> Result<Self> {
        match n {
            5 => Ok(Compaction::Bit5),
            6 => Ok(Compaction::Bit6),
            7 => Ok(Compaction::Bit7),
            8 => Ok(Compaction::Bit8),
            other => Err(TdtError::UnsupportedCompaction(other)),
        }
    }
}

/// One named field within a [`SchemeOption`], describing how to extract, validate,
/// and (for BINARY) pad/compact its value.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    /// 1-based capturing-group index into the owning option's `pattern`.
    pub seq: usize,
    /// Length in decimal characters (text levels) or bits (BINARY level).
    pub length: Option<usize>,
    /// Character-set regex fragment; a trailing `*` is implied if absent.
    pub character_set: Option<String>,
    pub decimal_minimum: Option<String>,
    pub decimal_maximum: Option<String>,
    /// Text padding: only consulted when the owning level is not BINARY.
    pub pad_dir: Option<PadDir>,
    pub pad_char: Option<char>,
    /// Bit padding: only consulted when the owning level is BINARY.
    pub bit_pad_dir: Option<PadDir>,
    pub compaction: Option<Compaction>,
}

impl Field {
    pub fn character_set_pattern(&self) -> Option<String> {
        self.character_set.as_ref().map(|cs| {
            if cs.ends_with('*') {
                format!("^{cs}$")
            } else {
                format!("^{cs}*$")
            }
        })
    }
}

/// Whether a [`Rule`] runs during the EXTRACT pass (enriching input tokens) or the
/// FORMAT pass (deriving output-only tokens), see §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleType {
    Extract,
    Format,
}

/// A single derivation rule: `function` is parsed into a name and argument list by
/// [`crate::rules::parse_rule_call`]; its result is bound to `new_field_name`.
#[derive(Debug, Clone)]
pub struct Rule {
    pub rule_type: RuleType,
    pub function: String,
    pub new_field_name: String,
}

/// One token of an output grammar: either a literal to copy verbatim, or a field
/// name whose current token-map value should be emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarToken {
    Literal(String),
    FieldRef(String),
}

/// A disambiguated variant of a [`Level`] — e.g. a specific company-prefix length.
pub struct SchemeOption {
    /// Value the scheme's `optionKey` hint must equal to select this option
    /// (ignored for levels exempt per [`LevelType::is_option_key_exempt`]).
    pub option_key: Option<String>,
    pub pattern: Regex,
    pub pattern_source: String,
    pub fields: Vec<Field>,
    pub grammar: Vec<GrammarToken>,
}

impl std::fmt::Debug for SchemeOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemeOption")
            .field("option_key", &self.option_key)
            .field("pattern_source", &self.pattern_source)
            .field("fields", &self.fields)
            .field("grammar", &self.grammar)
            .finish()
    }
}

impl SchemeOption {
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One representation of a [`Scheme`]: BINARY, a URI form, a legacy string form, etc.
#[derive(Debug)]
pub struct Level {
    pub level_type: LevelType,
    /// Literal prefix an identifier must start with to be considered at this level.
    pub prefix_match: String,
    pub options: Vec<SchemeOption>,
    pub rules: Vec<Rule>,
}

/// A logical identifier family (SGTIN-96, SSCC-96, …): a tag length, the hint name
/// used to disambiguate its options, and its ordered representations.
#[derive(Debug)]
pub struct Scheme {
    pub name: String,
    pub tag_length: usize,
    pub option_key: Option<String>,
    pub levels: Vec<Level>,
}

impl Scheme {
    pub fn level(&self, level_type: LevelType) -> Option<(usize, &Level)> {
        self.levels
            .iter()
            .enumerate()
            .find(|(_, l)| l.level_type == level_type)
    }
}

/// The full, process-wide set of known schemes. Immutable once built; `refresh`
/// in [`crate::engine::Engine`] swaps in a whole new `SchemeSet` rather than
/// mutating this one in place.
#[derive(Debug)]
pub struct SchemeSet {
    pub schemes: Vec<Scheme>,
}

impl SchemeSet {
    /// Builds a `SchemeSet`, checking the invariants of §3 that span a whole
    /// scheme (duplicate scheme names, BINARY field-length sums, field `seq`
    /// bounds, and same-`optionKey` field-name agreement across levels).
    /// Per-field/per-option shape checks already happened while each `Scheme`
    /// was constructed (by the loader or by hand in tests).
    pub fn new(schemes: Vec<Scheme>) -> Result<Self> {
        let mut seen_names = std::collections::HashSet::new();
        for scheme in &schemes {
            if !seen_names.insert(scheme.name.clone()) {
                return Err(TdtError::InvalidSchemeFile(format!(
                    "duplicate scheme name {:?}",
                    scheme.name
                )));
            }

            let mut fields_by_option_key: std::collections::HashMap<Option<String>, std::collections::HashSet<String>> =
                std::collections::HashMap::new();

            for level in &scheme.levels {
                for option in &level.options {
                    for field in &option.fields {
                        if field.seq == 0 || field.seq > option.pattern.captures_len() - 1 {
                            return Err(TdtError::InvalidSchemeFile(format!(
                                "field {:?} in scheme {:?} references capture group {} but pattern /{}/ has {} groups",
                                field.name, scheme.name, field.seq, option.pattern_source, option.pattern.captures_len() - 1
                            )));
                        }
                    }

                    if level.level_type == LevelType::Binary {
                        let total: usize = option.fields.iter().filter_map(|f| f.length).sum();
                        if total != scheme.tag_length {
                            return Err(TdtError::InvalidSchemeFile(format!(
                                "BINARY option of scheme {:?} has fields summing to {} bits, expected tagLength {}",
                                scheme.name, total, scheme.tag_length
                            )));
                        }
                    }

                    let names: std::collections::HashSet<String> =
                        option.fields.iter().map(|f| f.name.clone()).collect();
                    match fields_by_option_key.get(&option.option_key) {
                        Some(expected) if *expected != names => {
                            return Err(TdtError::InvalidSchemeFile(format!(
                                "scheme {:?} has options with optionKey {:?} whose field sets disagree: {:?} vs {:?}",
                                scheme.name, option.option_key, expected, names
                            )));
                        }
                        Some(_) => {}
                        None => {
                            fields_by_option_key.insert(option.option_key.clone(), names);
                        }
                    }
                }
            }
        }

        Ok(SchemeSet { schemes })
    }

    pub fn scheme_by_name(&self, name: &str) -> Option<&Scheme> {
        self.schemes.iter().find(|s| s.name == name)
    }
}


/// Per-translation mapping from field name to its current string value (§3).
/// All values are kept as strings regardless of semantic type — per §9, this
/// sidesteps numeric-precision bugs in 96-bit-and-up tag math; conversion to an
/// integer only happens transiently inside arithmetic rule functions.
#[derive(Debug, Clone, Default)]
pub struct TokenMap(std::collections::HashMap<String, String>);

impl TokenMap {
    pub fn new() -> Self {
        TokenMap(std::collections::HashMap::new())
    }

    pub fn get(&self, name: &str) -> Option<&String> {
        self.0.get(name)
    }

    /// Inserts a new field, failing with [`TdtError::DuplicateField`] if the
    /// name is already bound — rules and tokenization alike must never silently
    /// overwrite an existing token (§4.3, §4.5).
    pub fn insert_new(&mut self, name: String, value: String) -> Result<()> {
        if self.0.contains_key(&name) {
            return Err(TdtError::DuplicateField(name));
        }
        self.0.insert(name, value);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Binds `name` to `value` only if `name` isn't already bound. Used to
    /// seed caller-supplied hints (e.g. `filter`) that a representation
    /// doesn't itself carry, without overwriting anything tokenization or an
    /// earlier rule already produced.
    pub fn insert_if_absent(&mut self, name: String, value: String) {
        self.0.entry(name).or_insert(value);
    }
}

/// Process-wide mapping from a GS1 index string to a GS1 company-prefix string,
/// used by the `tablelookup(...,"tdt64bitcpi",...)` rule function (§4.3).
#[derive(Debug, Clone, Default)]
pub struct CompanyPrefixTable(std::collections::HashMap<String, String>);

impl CompanyPrefixTable {
    pub fn new() -> Self {
        CompanyPrefixTable(std::collections::HashMap::new())
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        CompanyPrefixTable(entries.into_iter().collect())
    }

    pub fn get(&self, index: &str) -> Option<&String> {
        self.0.get(index)
    }

    pub fn insert(&mut self, index: String, company_prefix: String) {
        self.0.insert(index, company_prefix);
    }
}
