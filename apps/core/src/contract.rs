//! Wire types for `_api/search/postquery`. Response fields default when the
//! service omits them or sends `null`.

use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirection(pub u8);

impl SortDirection {
    pub const ASCENDING: SortDirection = SortDirection(0);
    pub const DESCENDING: SortDirection = SortDirection(1);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SortEntry {
    pub property: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchRequest {
    #[serde(rename = "Querytext")]
    pub query_text: String,
    pub select_properties: Vec<String>,
    pub trim_duplicates: bool,
    pub summary_length: u32,
    pub row_limit: u32,
    pub start_row: usize,
    pub refinement_filters: Vec<String>,
    pub sort_list: Vec<SortEntry>,
    pub enable_query_rules: bool,
    pub enable_interleaving: bool,
    pub process_best_bets: bool,
    pub process_personal_favorites: bool,
    pub query_template: String,
    pub hit_highlighted_properties: Vec<String>,
    pub source_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostQueryBody<'a> {
    pub request: &'a SearchRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawSearchResponse {
    pub primary_query_result: Option<RawQueryResult>,
    pub secondary_query_results: Option<Vec<RawSecondaryQueryResult>>,
    pub spelling_suggestion: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawQueryResult {
    pub relevant_results: Option<RawRelevantResults>,
    pub refinement_results: Option<RawRefinementResults>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawRelevantResults {
    pub properties: Option<Vec<RawKeyValue>>,
    pub table: Option<RawTable>,
    pub total_rows: Option<u64>,
    pub result_title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawTable {
    #[serde(deserialize_with = "null_as_default")]
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawRow {
    #[serde(deserialize_with = "null_as_default")]
    pub cells: Vec<RawKeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawKeyValue {
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    pub value: Option<serde_json::Value>,
    pub value_type: Option<String>,
}

impl RawKeyValue {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: Some(serde_json::Value::String(value.to_string())),
            value_type: Some("Edm.String".to_string()),
        }
    }

    /// Cell value as text. Numbers and booleans are stringified; nulls,
    /// arrays and objects have no text.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self.value.as_ref()? {
            serde_json::Value::String(text) => Some(Cow::Borrowed(text)),
            serde_json::Value::Number(number) => Some(Cow::Owned(number.to_string())),
            serde_json::Value::Bool(flag) => Some(Cow::Owned(flag.to_string())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawRefinementResults {
    #[serde(deserialize_with = "null_as_default")]
    pub refiners: Vec<RawRefiner>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawRefiner {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub entries: Vec<RawRefinerEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawRefinerEntry {
    /// The service reports counts as either strings or numbers.
    pub refinement_count: Option<serde_json::Value>,
    pub refinement_name: Option<String>,
    pub refinement_token: Option<String>,
    pub refinement_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawSecondaryQueryResult {
    pub relevant_results: Option<RawRelevantResults>,
    pub special_term_results: Option<RawSpecialTermResults>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawSpecialTermResults {
    #[serde(deserialize_with = "null_as_default")]
    pub results: Vec<RawSpecialTermResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawSpecialTermResult {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}
