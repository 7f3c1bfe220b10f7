use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::preference_store::{PreferenceStore, StoreError};

pub const FILE_TYPES_KEY: &str = "powerSearchFileTypes";
pub const SORT_ORDER_KEY: &str = "powerSearchSortOrder";
pub const HISTORY_KEY: &str = "powerSearchHistory";
pub const TEACHING_TIP_KEY: &str = "powerSearchTeachingPopoverShown";

pub const MAX_RECENT_SEARCHES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileTypeTag {
    All,
    Docx,
    Pptx,
    Xlsx,
    Pdf,
    Page,
    Images,
}

impl FileTypeTag {
    pub const CONCRETE: [FileTypeTag; 6] = [
        FileTypeTag::Docx,
        FileTypeTag::Pptx,
        FileTypeTag::Xlsx,
        FileTypeTag::Pdf,
        FileTypeTag::Page,
        FileTypeTag::Images,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Docx => "docx",
            Self::Pptx => "pptx",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
            Self::Page => "page",
            Self::Images => "images",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            "xlsx" => Some(Self::Xlsx),
            "pdf" => Some(Self::Pdf),
            "page" => Some(Self::Page),
            "images" => Some(Self::Images),
            _ => None,
        }
    }
}

impl fmt::Display for FileTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selected file-type filters. The `All` sentinel never coexists with a
/// concrete tag, and the set is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTypeSelection {
    tags: BTreeSet<FileTypeTag>,
}

impl Default for FileTypeSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl FileTypeSelection {
    pub fn all() -> Self {
        Self {
            tags: BTreeSet::from([FileTypeTag::All]),
        }
    }

    pub fn from_tags<I>(tags: I) -> Self
    where
        I: IntoIterator<Item = FileTypeTag>,
    {
        let tags: BTreeSet<FileTypeTag> = tags.into_iter().collect();
        if tags.is_empty() || tags.contains(&FileTypeTag::All) {
            return Self::all();
        }
        if FileTypeTag::CONCRETE.iter().all(|tag| tags.contains(tag)) {
            return Self::all();
        }
        Self { tags }
    }

    pub fn is_all(&self) -> bool {
        self.tags.contains(&FileTypeTag::All)
    }

    pub fn contains(&self, tag: FileTypeTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = FileTypeTag> + '_ {
        self.tags.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn toggle(&mut self, tag: FileTypeTag) {
        if tag == FileTypeTag::All {
            *self = Self::all();
            return;
        }

        self.tags.remove(&FileTypeTag::All);
        if !self.tags.remove(&tag) {
            self.tags.insert(tag);
        }

        if self.tags.is_empty() || self.tags.len() == FileTypeTag::CONCRETE.len() {
            *self = Self::all();
        }
    }

    pub fn fingerprint(&self) -> String {
        let mut names: Vec<&str> = self.tags.iter().map(|tag| tag.as_str()).collect();
        names.sort_unstable();
        names.join(",")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Relevance,
    Desc,
    Asc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Desc => "desc",
            Self::Asc => "asc",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "relevance" => Some(Self::Relevance),
            "desc" | "newest" => Some(Self::Desc),
            "asc" | "oldest" => Some(Self::Asc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentSearches {
    entries: Vec<String>,
}

impl RecentSearches {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut recent = Self::default();
        let collected: Vec<String> = entries.into_iter().collect();
        for entry in collected.into_iter().rev() {
            recent.push(&entry);
        }
        recent
    }

    pub fn push(&mut self, query: &str) -> bool {
        if query.trim().is_empty() {
            return false;
        }
        self.entries.retain(|entry| entry != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(MAX_RECENT_SEARCHES);
        true
    }

    pub fn remove(&mut self, query: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry != query);
        before != self.entries.len()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct Preferences<S> {
    store: S,
}

impl<S: PreferenceStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn file_types(&self) -> Result<FileTypeSelection, StoreError> {
        let stored = self.store.get(FILE_TYPES_KEY)?;
        let tags = stored
            .as_ref()
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(FileTypeTag::parse)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Ok(FileTypeSelection::from_tags(tags))
    }

    pub fn set_file_types(&mut self, selection: &FileTypeSelection) -> Result<(), StoreError> {
        let encoded: Vec<Value> = selection
            .tags()
            .map(|tag| Value::String(tag.as_str().to_string()))
            .collect();
        self.store.set(FILE_TYPES_KEY, Value::Array(encoded))
    }

    pub fn toggle_file_type(&mut self, tag: FileTypeTag) -> Result<FileTypeSelection, StoreError> {
        let mut selection = self.file_types()?;
        selection.toggle(tag);
        self.set_file_types(&selection)?;
        Ok(selection)
    }

    pub fn sort_order(&self) -> Result<SortOrder, StoreError> {
        let stored = self.store.get(SORT_ORDER_KEY)?;
        Ok(stored
            .as_ref()
            .and_then(Value::as_str)
            .and_then(SortOrder::parse)
            .unwrap_or_default())
    }

    pub fn set_sort_order(&mut self, order: SortOrder) -> Result<(), StoreError> {
        self.store
            .set(SORT_ORDER_KEY, Value::String(order.as_str().to_string()))
    }

    pub fn recent_searches(&self) -> Result<RecentSearches, StoreError> {
        let stored = self.store.get(HISTORY_KEY)?;
        let entries = stored
            .as_ref()
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Ok(RecentSearches::from_entries(entries))
    }

    pub fn record_search(&mut self, query: &str) -> Result<RecentSearches, StoreError> {
        let mut recent = self.recent_searches()?;
        if recent.push(query) {
            self.write_recent(&recent)?;
        }
        Ok(recent)
    }

    pub fn remove_recent_search(&mut self, query: &str) -> Result<RecentSearches, StoreError> {
        let mut recent = self.recent_searches()?;
        if recent.remove(query) {
            self.write_recent(&recent)?;
        }
        Ok(recent)
    }

    pub fn clear_recent_searches(&mut self) -> Result<(), StoreError> {
        self.store.remove(HISTORY_KEY)
    }

    pub fn teaching_tip_seen(&self) -> Result<bool, StoreError> {
        let stored = self.store.get(TEACHING_TIP_KEY)?;
        Ok(match stored {
            Some(Value::Bool(seen)) => seen,
            Some(Value::String(raw)) => raw == "true",
            _ => false,
        })
    }

    pub fn mark_teaching_tip_seen(&mut self) -> Result<(), StoreError> {
        self.store.set(TEACHING_TIP_KEY, Value::Bool(true))
    }

    fn write_recent(&mut self, recent: &RecentSearches) -> Result<(), StoreError> {
        let encoded: Vec<Value> = recent
            .entries()
            .iter()
            .map(|entry| Value::String(entry.clone()))
            .collect();
        self.store.set(HISTORY_KEY, Value::Array(encoded))
    }
}
