//! Wire shapes mirroring the EPCglobal TDT markup one attribute at a time.
//! These are purely deserialization targets; converting them into the core
//! data model (and validating the invariants that span a whole scheme) is
//! [`crate::convert`]'s job.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename = "epcTagDataTranslation")]
pub struct TdtDocumentXml {
    #[serde(rename = "scheme", default)]
    pub schemes: Vec<SchemeXml>,
}

#[derive(Debug, Deserialize)]
pub struct SchemeXml {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@tagLength")]
    pub tag_length: usize,
    #[serde(rename = "@optionKey")]
    pub option_key: Option<String>,
    #[serde(rename = "level", default)]
    pub levels: Vec<LevelXml>,
}

#[derive(Debug, Deserialize)]
pub struct LevelXml {
    #[serde(rename = "@type")]
    pub level_type: String,
    #[serde(rename = "@prefixMatch", default)]
    pub prefix_match: String,
    #[serde(rename = "option", default)]
    pub options: Vec<OptionXml>,
    #[serde(rename = "rule", default)]
    pub rules: Vec<RuleXml>,
}

#[derive(Debug, Deserialize)]
pub struct OptionXml {
    #[serde(rename = "@optionKey")]
    pub option_key: Option<String>,
    #[serde(rename = "@pattern")]
    pub pattern: String,
    #[serde(rename = "field", default)]
    pub fields: Vec<FieldXml>,
    #[serde(rename = "@grammar")]
    pub grammar: String,
}

#[derive(Debug, Deserialize)]
pub struct FieldXml {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@seq")]
    pub seq: usize,
    #[serde(rename = "@length")]
    pub length: Option<usize>,
    #[serde(rename = "@characterSet")]
    pub character_set: Option<String>,
    #[serde(rename = "@decimalMinimum")]
    pub decimal_minimum: Option<String>,
    #[serde(rename = "@decimalMaximum")]
    pub decimal_maximum: Option<String>,
    #[serde(rename = "@padDir")]
    pub pad_dir: Option<String>,
    #[serde(rename = "@padChar")]
    pub pad_char: Option<String>,
    #[serde(rename = "@bitPadDir")]
    pub bit_pad_dir: Option<String>,
    #[serde(rename = "@compaction")]
    pub compaction: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct RuleXml {
    #[serde(rename = "@type")]
    pub rule_type: String,
    #[serde(rename = "@function")]
    pub function: String,
    #[serde(rename = "@newFieldName")]
    pub new_field_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ManagerTranslationXml {
    #[serde(rename = "entry", default)]
    pub entries: Vec<EntryXml>,
}

#[derive(Debug, Deserialize)]
pub struct EntryXml {
    #[serde(rename = "@index")]
    pub index: String,
    #[serde(rename = "@companyPrefix")]
    pub company_prefix: String,
}
