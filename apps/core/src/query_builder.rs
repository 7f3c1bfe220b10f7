use crate::contract::{SearchRequest, SortDirection, SortEntry};
use crate::preferences::{FileTypeSelection, FileTypeTag, SortOrder};

pub const DEFAULT_SOURCE_ID: &str = "8413CD39-2156-4E00-B54D-11EFD9ABDB89";
pub const DEFAULT_SORT_PROPERTY: &str = "LastModifiedTime";

/// Boost cascade: title prefix, title, filename prefix, filename, leaf-name
/// prefix, then a substring fallback. Weights strictly decrease.
pub const DEFAULT_QUERY_TEMPLATE: &str = concat!(
    "{searchTerms}",
    " XRANK(cb=3.0) title:\"{searchTerms}*\"",
    " XRANK(cb=2.75) title:\"{searchTerms}\"",
    " XRANK(cb=2.25) filename:\"{searchTerms}*\"",
    " XRANK(cb=2.0) filename:\"{searchTerms}\"",
    " XRANK(cb=1.8) FileLeafRef:\"{searchTerms}*\"",
    " XRANK(cb=1.5) path:\"{searchTerms}\"",
    " OR title:\"*{searchTerms}*\"",
    " OR filename:\"*{searchTerms}*\"",
    " OR FileLeafRef:\"*{searchTerms}*\"",
);

pub const SELECT_PROPERTIES: [&str; 22] = [
    "Title",
    "Path",
    "Filename",
    "FileLeafRef",
    "FileType",
    "HtmlFileType",
    "FileExtension",
    "HitHighlightedSummary",
    "Description",
    "Author",
    "AuthorOWSUSER",
    "CreatedBy",
    "Created",
    "LastModifiedTime",
    "Size",
    "SiteName",
    "SiteTitle",
    "SPWebUrl",
    "ParentLink",
    "UniqueID",
    "NormListID",
    "owstaxidmetadataalltagsinfo",
];

pub const HIT_HIGHLIGHTED_PROPERTIES: [&str; 6] = [
    "Title",
    "Path",
    "Author",
    "Filename",
    "FileLeafRef",
    "Description",
];

pub const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "bmp", "ico", "tiff", "webp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTuning {
    pub row_limit: u32,
    pub summary_length: u32,
    pub trim_duplicates: bool,
    pub source_id: String,
    pub query_template: String,
    pub enable_query_rules: bool,
    pub enable_interleaving: bool,
    pub process_best_bets: bool,
    pub process_personal_favorites: bool,
    pub sort_property: String,
}

impl Default for SearchTuning {
    fn default() -> Self {
        Self {
            row_limit: 50,
            summary_length: 300,
            trim_duplicates: false,
            source_id: DEFAULT_SOURCE_ID.to_string(),
            query_template: DEFAULT_QUERY_TEMPLATE.to_string(),
            enable_query_rules: true,
            enable_interleaving: true,
            process_best_bets: true,
            process_personal_favorites: true,
            sort_property: DEFAULT_SORT_PROPERTY.to_string(),
        }
    }
}

pub fn build_request(
    query_text: &str,
    refinement_filters: &[String],
    sort: SortOrder,
    start_row: usize,
    tuning: &SearchTuning,
) -> SearchRequest {
    SearchRequest {
        query_text: query_text.to_string(),
        select_properties: SELECT_PROPERTIES.iter().map(|p| p.to_string()).collect(),
        trim_duplicates: tuning.trim_duplicates,
        summary_length: tuning.summary_length,
        row_limit: tuning.row_limit,
        start_row,
        refinement_filters: refinement_filters.to_vec(),
        sort_list: sort_list(sort, &tuning.sort_property),
        enable_query_rules: tuning.enable_query_rules,
        enable_interleaving: tuning.enable_interleaving,
        process_best_bets: tuning.process_best_bets,
        process_personal_favorites: tuning.process_personal_favorites,
        query_template: tuning.query_template.clone(),
        hit_highlighted_properties: HIT_HIGHLIGHTED_PROPERTIES
            .iter()
            .map(|p| p.to_string())
            .collect(),
        source_id: tuning.source_id.clone(),
    }
}

fn sort_list(sort: SortOrder, property: &str) -> Vec<SortEntry> {
    let direction = match sort {
        SortOrder::Relevance => return Vec::new(),
        SortOrder::Desc => SortDirection::DESCENDING,
        SortOrder::Asc => SortDirection::ASCENDING,
    };
    vec![SortEntry {
        property: property.to_string(),
        direction,
    }]
}

pub fn extensions_for(tag: FileTypeTag) -> &'static [&'static str] {
    match tag {
        FileTypeTag::All => &[],
        FileTypeTag::Docx => &["docx", "dotx"],
        FileTypeTag::Pptx => &["pptx", "potx", "ppsx"],
        FileTypeTag::Xlsx => &["xlsx", "xltx"],
        FileTypeTag::Pdf => &["pdf"],
        FileTypeTag::Page => &["aspx"],
        FileTypeTag::Images => &IMAGE_EXTENSIONS,
    }
}

pub fn equals_predicate(extension: &str) -> String {
    format!("FileType:equals(\"{extension}\")")
}

pub fn type_predicate(extensions: &[&str]) -> Option<String> {
    match extensions {
        [] => None,
        [single] => Some(equals_predicate(single)),
        many => Some(format!(
            "or({})",
            many.iter()
                .map(|ext| equals_predicate(ext))
                .collect::<Vec<_>>()
                .join(",")
        )),
    }
}

pub fn refinement_filters(selection: &FileTypeSelection) -> Vec<String> {
    if selection.is_all() {
        return Vec::new();
    }

    // Images first, then the document types in table order.
    let ordered = std::iter::once(FileTypeTag::Images).chain(
        FileTypeTag::CONCRETE
            .into_iter()
            .filter(|tag| *tag != FileTypeTag::Images),
    );

    let predicates: Vec<String> = ordered
        .filter(|tag| selection.contains(*tag))
        .filter_map(|tag| type_predicate(extensions_for(tag)))
        .collect();

    match predicates.len() {
        0 => Vec::new(),
        1 => predicates,
        _ => vec![format!("or({})", predicates.join(","))],
    }
}
