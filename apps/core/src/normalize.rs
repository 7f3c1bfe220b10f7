use std::borrow::Cow;

use crate::contract::{
    RawKeyValue, RawRefiner, RawRelevantResults, RawSearchResponse, RawSecondaryQueryResult,
};
use crate::model::{
    FacetValue, FilterComparisonOperator, PromotedResult, RefinementFacet, ResultBlock, ResultRow,
    SearchResults, FILE_TYPE_KEY, HTML_FILE_TYPE_KEY,
};

const REFINEMENT_VALUE_PREFIX: &str = "string;#";
const QUERY_MODIFICATION_KEY: &str = "QueryModification";

pub fn normalize_response(raw: &RawSearchResponse, query: &str) -> SearchResults {
    let mut results = SearchResults::empty(query);

    if let Some(primary) = &raw.primary_query_result {
        if let Some(relevant) = &primary.relevant_results {
            results.query_modification = query_modification(relevant);
            results.rows = fold_table(relevant);
            results.total_rows = relevant.total_rows.unwrap_or(0);
        }

        if let Some(refinement) = &primary.refinement_results {
            results.facets = refinement.refiners.iter().map(facet_from_refiner).collect();
        }
    }

    results.spelling_suggestion = raw
        .spelling_suggestion
        .as_ref()
        .filter(|suggestion| !suggestion.is_empty())
        .cloned();

    if let Some(secondary) = &raw.secondary_query_results {
        let (promoted, blocks) = secondary_results(secondary);
        results.promoted = promoted;
        results.blocks = blocks;
    }

    results
}

/// Two passes: the first occurrence of a key wins (an empty value may still
/// be replaced), then a non-empty `HtmlFileType` overrides `FileType`.
pub fn fold_row(cells: &[RawKeyValue]) -> ResultRow {
    let mut row = ResultRow::new();

    for cell in cells {
        if is_file_type_override(cell) {
            continue;
        }
        let Some(value) = cell.text() else {
            continue;
        };
        if row.get(&cell.key).map_or(true, str::is_empty) {
            row.insert(&cell.key, &value);
        }
    }

    if let Some(file_type) = cells
        .iter()
        .filter(|cell| is_file_type_override(cell))
        .filter_map(|cell| cell.text())
        .last()
    {
        row.insert(FILE_TYPE_KEY, &file_type);
    }

    row
}

fn is_file_type_override(cell: &RawKeyValue) -> bool {
    cell.key == HTML_FILE_TYPE_KEY && cell.text().is_some_and(|value| !value.is_empty())
}

fn fold_table(relevant: &RawRelevantResults) -> Vec<ResultRow> {
    relevant
        .table
        .as_ref()
        .map(|table| table.rows.iter().map(|row| fold_row(&row.cells)).collect())
        .unwrap_or_default()
}

fn query_modification(relevant: &RawRelevantResults) -> Option<String> {
    let matches: Vec<&RawKeyValue> = relevant
        .properties
        .iter()
        .flatten()
        .filter(|property| property.key == QUERY_MODIFICATION_KEY)
        .collect();

    match matches.as_slice() {
        [only] => only.text().map(Cow::into_owned),
        _ => None,
    }
}

fn facet_from_refiner(refiner: &RawRefiner) -> RefinementFacet {
    let values = refiner
        .entries
        .iter()
        .map(|entry| {
            let raw_name = entry.refinement_value.as_deref().unwrap_or_default();
            FacetValue {
                name: raw_name
                    .strip_prefix(REFINEMENT_VALUE_PREFIX)
                    .unwrap_or(raw_name)
                    .to_string(),
                value: entry.refinement_token.clone().unwrap_or_default(),
                count: parse_count(entry.refinement_count.as_ref()),
                operator: FilterComparisonOperator::Contains,
            }
        })
        .collect();

    RefinementFacet {
        name: refiner.name.clone(),
        values,
    }
}

fn parse_count(raw: Option<&serde_json::Value>) -> i64 {
    match raw {
        Some(serde_json::Value::Number(number)) => number.as_i64().unwrap_or(0),
        Some(serde_json::Value::String(text)) => {
            let trimmed = text.trim_start();
            let (sign, digits) = match trimmed.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
        }
        _ => 0,
    }
}

fn secondary_results(
    secondary: &[RawSecondaryQueryResult],
) -> (Vec<PromotedResult>, Vec<ResultBlock>) {
    let mut promoted = Vec::new();
    let mut blocks = Vec::new();

    for entry in secondary {
        if let Some(special) = &entry.special_term_results {
            promoted.extend(special.results.iter().map(|result| PromotedResult {
                title: result.title.clone().unwrap_or_default(),
                url: result.url.clone().unwrap_or_default(),
                description: result.description.clone().unwrap_or_default(),
            }));
        }

        if let Some(relevant) = &entry.relevant_results {
            let rows = fold_table(relevant);
            if !rows.is_empty() {
                blocks.push(ResultBlock {
                    title: relevant.result_title.clone().unwrap_or_default(),
                    rows,
                });
            }
        }
    }

    (promoted, blocks)
}
