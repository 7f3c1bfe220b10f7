use std::fmt;

use crate::model::ResultRow;
use crate::query_builder::equals_predicate;

const DOCUMENT_TYPES: [&str; 3] = ["docx", "doc", "pdf"];
const PAGE_TYPES: [&str; 2] = ["aspx", "page"];

pub const SECTION_PREVIEW_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Documents,
    Pages,
    Other,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Documents, Section::Pages, Section::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::Pages => "pages",
            Self::Other => "other",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "documents" => Some(Self::Documents),
            "pages" => Some(Self::Pages),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Documents => "Files",
            Self::Pages => "Pages",
            Self::Other => "Other",
        }
    }

    pub fn refinement_filters(self) -> Vec<String> {
        let filter = match self {
            Self::Documents => or_of(DOCUMENT_TYPES.iter()),
            Self::Pages => or_of(PAGE_TYPES.iter()),
            Self::Other => format!("not({})", or_of(DOCUMENT_TYPES.iter().chain(PAGE_TYPES.iter()))),
        };
        vec![filter]
    }

    pub fn classify(file_type: Option<&str>) -> Self {
        let normalized = file_type.unwrap_or_default().to_ascii_lowercase();
        if DOCUMENT_TYPES.contains(&normalized.as_str()) {
            Self::Documents
        } else if PAGE_TYPES.contains(&normalized.as_str()) {
            Self::Pages
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for a drilled-into section name; unknown names are unconstrained.
pub fn section_refinement_filters(name: &str) -> Vec<String> {
    Section::parse(name)
        .map(Section::refinement_filters)
        .unwrap_or_default()
}

fn or_of<'a>(extensions: impl Iterator<Item = &'a &'static str>) -> String {
    let predicates: Vec<String> = extensions.map(|ext| equals_predicate(ext)).collect();
    format!("or({})", predicates.join(","))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionGroup<'a> {
    pub section: Section,
    pub rows: Vec<&'a ResultRow>,
}

impl SectionGroup<'_> {
    pub fn preview(&self) -> &[&ResultRow] {
        &self.rows[..self.rows.len().min(SECTION_PREVIEW_LEN)]
    }
}

/// Non-empty groups in display order.
pub fn group_rows<'a, I>(rows: I) -> Vec<SectionGroup<'a>>
where
    I: IntoIterator<Item = &'a ResultRow>,
{
    let rows: Vec<&ResultRow> = rows.into_iter().collect();
    Section::ALL
        .into_iter()
        .map(|section| SectionGroup {
            section,
            rows: rows
                .iter()
                .copied()
                .filter(|row| Section::classify(row.file_type()) == section)
                .collect(),
        })
        .filter(|group| !group.rows.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{section_refinement_filters, Section};

    #[test]
    fn section_filters_match_known_expressions() {
        assert_eq!(
            section_refinement_filters("documents"),
            vec![
                "or(FileType:equals(\"docx\"),FileType:equals(\"doc\"),FileType:equals(\"pdf\"))"
                    .to_string()
            ]
        );
        assert_eq!(
            section_refinement_filters("pages"),
            vec!["or(FileType:equals(\"aspx\"),FileType:equals(\"page\"))".to_string()]
        );
        assert_eq!(
            section_refinement_filters("other"),
            vec![concat!(
                "not(or(FileType:equals(\"docx\"),FileType:equals(\"doc\"),",
                "FileType:equals(\"pdf\"),FileType:equals(\"aspx\"),FileType:equals(\"page\")))"
            )
            .to_string()]
        );
        assert!(section_refinement_filters("archive").is_empty());
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(Section::classify(Some("PDF")), Section::Documents);
        assert_eq!(Section::classify(Some("aspx")), Section::Pages);
        assert_eq!(Section::classify(None), Section::Other);
    }
}
