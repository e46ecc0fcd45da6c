//! Sales volume table: units sold grouped by region.
//!
//! Region columns in sales exports are notoriously dirty: spreadsheets get
//! re-saved with signature blocks and role titles bleeding into data
//! columns. Grouping keys are therefore screened through a region
//! allow-list plus a pattern-based rejection of signature artifacts; if
//! every row would be screened out, the table falls back to one ungrouped
//! total rather than rendering nothing.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{EvidenceAtom, EvidencePayload, EvidenceType};

use super::{
    atoms_of_types, data_source_footer, find_negative_evidence, format_count, markdown_table,
    missing_marker, none_reported_table, placeholder_table, TableOutput,
};

const COLUMNS: &[&str] = &["Region", "Units Sold", "Share (%)"];

/// Recognized region groupings, matched case-insensitively against the
/// slug-normalized cell value.
const REGION_ALLOW_LIST: &[(&str, &str)] = &[
    ("eu", "EU"),
    ("europe", "Europe"),
    ("european_union", "EU"),
    ("us", "US"),
    ("usa", "US"),
    ("united_states", "US"),
    ("north_america", "North America"),
    ("canada", "Canada"),
    ("latam", "Latin America"),
    ("latin_america", "Latin America"),
    ("south_america", "Latin America"),
    ("apac", "APAC"),
    ("asia", "APAC"),
    ("asia_pacific", "APAC"),
    ("japan", "Japan"),
    ("china", "China"),
    ("middle_east", "Middle East"),
    ("africa", "Africa"),
    ("emea", "EMEA"),
    ("oceania", "Oceania"),
    ("australia", "Oceania"),
    ("uk", "UK"),
    ("united_kingdom", "UK"),
    ("germany", "Germany"),
    ("france", "France"),
    ("italy", "Italy"),
    ("spain", "Spain"),
    ("global", "Global"),
    ("worldwide", "Global"),
    ("row", "Rest of World"),
    ("rest_of_world", "Rest of World"),
];

/// Signature blocks and role titles that bleed into region columns when a
/// spreadsheet footer gets parsed as data.
static ARTIFACT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(signature|signed|approved|prepared by|reviewed|director|manager|officer|head of|president|ceo|vp\b|qa/ra|regulatory affairs|dr\.)",
    )
    .expect("artifact pattern is valid")
});

fn canonical_region(raw: &str) -> Option<&'static str> {
    let slug = raw.trim().to_lowercase().replace(char::is_whitespace, "_");
    REGION_ALLOW_LIST
        .iter()
        .find(|(key, _)| *key == slug)
        .map(|(_, display)| *display)
}

pub fn generate_sales_table(atoms: &[EvidenceAtom]) -> TableOutput {
    let matched = atoms_of_types(atoms, &[EvidenceType::SalesVolume]);
    if matched.is_empty() {
        return placeholder_table(COLUMNS);
    }
    if let Some(negative) = find_negative_evidence(&matched) {
        return none_reported_table(COLUMNS, negative);
    }

    // region display name -> summed units; BTreeMap keeps ties stable
    let mut groups: BTreeMap<String, f64> = BTreeMap::new();
    let mut ungrouped_total = 0.0;
    let mut any_grouped = false;

    for atom in &matched {
        let EvidencePayload::Sales(payload) = &atom.payload else {
            continue;
        };
        let quantity = payload.quantity.unwrap_or(0.0);
        ungrouped_total += quantity;

        match payload.region.as_deref() {
            None => {
                any_grouped = true;
                *groups.entry(missing_marker("region")).or_insert(0.0) += quantity;
            }
            Some(raw) => {
                if let Some(region) = canonical_region(raw) {
                    any_grouped = true;
                    *groups.entry(region.to_string()).or_insert(0.0) += quantity;
                } else if ARTIFACT_PATTERN.is_match(raw) {
                    tracing::warn!(region = raw, "Excluding signature artifact from sales grouping");
                } else {
                    tracing::warn!(region = raw, "Excluding unrecognized region from sales grouping");
                }
            }
        }
    }

    let ids: Vec<String> = matched.iter().map(|a| a.atom_id.clone()).collect();

    // All rows screened out: fall back to one ungrouped total
    if !any_grouped {
        let rows = vec![vec![
            "All Regions".to_string(),
            format_count(ungrouped_total),
            "100.0".to_string(),
        ]];
        return TableOutput {
            markdown: markdown_table(COLUMNS, &rows),
            data_source_footer: data_source_footer(&ids),
            evidence_atom_ids: ids,
        };
    }

    let grouped_total: f64 = groups.values().sum();
    let mut entries: Vec<(String, f64)> = groups.into_iter().collect();
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut rows: Vec<Vec<String>> = entries
        .iter()
        .map(|(region, units)| {
            let share = if grouped_total > 0.0 {
                format!("{:.1}", units / grouped_total * 100.0)
            } else {
                "0.0".to_string()
            };
            vec![region.clone(), format_count(*units), share]
        })
        .collect();
    rows.push(vec![
        "**Total**".to_string(),
        format!("**{}**", format_count(grouped_total)),
        "**100.0**".to_string(),
    ]);

    TableOutput {
        markdown: markdown_table(COLUMNS, &rows),
        data_source_footer: data_source_footer(&ids),
        evidence_atom_ids: ids,
    }
}
