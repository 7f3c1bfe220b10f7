use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const FILE_TYPE_KEY: &str = "FileType";
pub const HTML_FILE_TYPE_KEY: &str = "HtmlFileType";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRow {
    properties: BTreeMap<String, String>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.properties.insert(key.to_string(), value.to_string());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn title(&self) -> Option<&str> {
        self.non_empty("Title")
    }

    pub fn path(&self) -> Option<&str> {
        self.non_empty("Path")
    }

    pub fn filename(&self) -> Option<&str> {
        self.non_empty("Filename")
    }

    pub fn file_type(&self) -> Option<&str> {
        self.non_empty(FILE_TYPE_KEY)
    }

    pub fn summary(&self) -> Option<&str> {
        self.non_empty("HitHighlightedSummary")
    }

    pub fn created_by(&self) -> Option<&str> {
        self.non_empty("CreatedBy")
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.non_empty("LastModifiedTime")
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.non_empty("Size").and_then(|raw| raw.trim().parse().ok())
    }

    pub fn is_page(&self) -> bool {
        matches!(
            self.file_type().map(str::to_ascii_lowercase).as_deref(),
            Some("aspx") | Some("page")
        )
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ResultRow {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultBlock {
    pub title: String,
    pub rows: Vec<ResultRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterComparisonOperator {
    Eq,
    Neq,
    Gt,
    Lt,
    Geq,
    Leq,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValue {
    pub name: String,
    pub value: String,
    pub count: i64,
    pub operator: FilterComparisonOperator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementFacet {
    pub name: String,
    pub values: Vec<FacetValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotedResult {
    pub title: String,
    pub url: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query_keywords: String,
    pub rows: Vec<ResultRow>,
    pub blocks: Vec<ResultBlock>,
    pub facets: Vec<RefinementFacet>,
    pub promoted: Vec<PromotedResult>,
    pub spelling_suggestion: Option<String>,
    pub query_modification: Option<String>,
    pub total_rows: u64,
}

impl SearchResults {
    pub fn empty(query: &str) -> Self {
        Self {
            query_keywords: query.to_string(),
            ..Default::default()
        }
    }
}
