//! Report table generators, one per table family.
//!
//! Every generator follows the same contract: filter the atom set to the
//! family's evidence types, then render a GitHub-flavored markdown table
//! plus a data-source footer citing the contributing atom ids. Three rules
//! are shared across all families:
//!
//! - an empty match set renders the fixed "No data available" placeholder;
//! - a negative-evidence atom (an explicit "confirmed zero occurrences"
//!   assertion) short-circuits to a "**None Reported**" row citing only
//!   that atom, taking precedence over any other matched atoms;
//! - missing field values render as a verbatim `[MISSING ...]` marker so
//!   evidence gaps stay auditable in the output.

pub mod capa;
pub mod complaints;
pub mod fsca;
pub mod incidents;
pub mod literature;
pub mod sales;

pub use capa::generate_capa_table;
pub use complaints::generate_complaints_table;
pub use fsca::generate_fsca_table;
pub use incidents::generate_incidents_table;
pub use literature::generate_literature_table;
pub use sales::generate_sales_table;

use crate::models::{AtomStatus, EvidenceAtom, EvidenceType};

/// How many atom ids the footer lists before truncating to `+N more`.
const FOOTER_ID_LIMIT: usize = 3;

#[derive(Debug, Clone)]
pub struct TableOutput {
    pub markdown: String,
    pub evidence_atom_ids: Vec<String>,
    pub data_source_footer: String,
}

/// Filter to the family's evidence types, skipping superseded atoms.
pub(crate) fn atoms_of_types<'a>(
    atoms: &'a [EvidenceAtom],
    types: &[EvidenceType],
) -> Vec<&'a EvidenceAtom> {
    atoms
        .iter()
        .filter(|a| types.contains(&a.evidence_type) && a.status != AtomStatus::Superseded)
        .collect()
}

/// First matched atom asserting explicit absence, if any. One invariant for
/// all families: a confirmed-zero assertion outranks every other atom.
pub(crate) fn find_negative_evidence<'a>(
    matched: &[&'a EvidenceAtom],
) -> Option<&'a EvidenceAtom> {
    matched.iter().find(|a| a.is_negative_evidence()).copied()
}

/// Render a GFM table: header row, separator, data rows.
pub(crate) fn markdown_table(columns: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    out.push_str("| ");
    out.push_str(&columns.join(" | "));
    out.push_str(" |\n|");
    for _ in columns {
        out.push_str("---|");
    }
    out.push('\n');
    for row in rows {
        out.push_str("| ");
        out.push_str(&row.join(" | "));
        out.push_str(" |\n");
    }
    out
}

/// `*Data Source: Evidence Atoms [id1, id2, id3 +N more]*` — the first
/// three ids then a count, a fixed contract for output stability.
pub(crate) fn data_source_footer(ids: &[String]) -> String {
    if ids.is_empty() {
        return "*Data Source: no evidence atoms uploaded*".to_string();
    }
    let shown = ids.iter().take(FOOTER_ID_LIMIT).cloned().collect::<Vec<_>>();
    let mut listing = shown.join(", ");
    if ids.len() > FOOTER_ID_LIMIT {
        listing.push_str(&format!(" +{} more", ids.len() - FOOTER_ID_LIMIT));
    }
    format!("*Data Source: Evidence Atoms [{listing}]*")
}

/// Fixed placeholder when no atoms of the family exist at all.
pub(crate) fn placeholder_table(columns: &[&str]) -> TableOutput {
    let mut row = vec!["No data available".to_string()];
    row.extend(std::iter::repeat("-".to_string()).take(columns.len().saturating_sub(1)));
    TableOutput {
        markdown: markdown_table(columns, &[row]),
        evidence_atom_ids: Vec::new(),
        data_source_footer: data_source_footer(&[]),
    }
}

/// "**None Reported**" row citing only the negative-evidence atom.
pub(crate) fn none_reported_table(columns: &[&str], atom: &EvidenceAtom) -> TableOutput {
    let mut row = vec!["**None Reported**".to_string()];
    row.extend(std::iter::repeat("-".to_string()).take(columns.len().saturating_sub(1)));
    let ids = vec![atom.atom_id.clone()];
    TableOutput {
        markdown: markdown_table(columns, &[row]),
        data_source_footer: data_source_footer(&ids),
        evidence_atom_ids: ids,
    }
}

/// Verbatim marker for a missing grouping or cell value, e.g.
/// `[MISSING REGION]`.
pub(crate) fn missing_marker(field: &str) -> String {
    format!("[MISSING {}]", field.replace('_', " ").to_uppercase())
}

/// Display a count: integers get thousands separators, fractions keep two
/// decimals.
pub(crate) fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        let raw = format!("{}", value as i64);
        let mut out = String::new();
        let bytes = raw.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            if i > 0 && (bytes.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(*b as char);
        }
        out
    } else {
        format!("{value:.2}")
    }
}

/// Cell helper: the value, or the `[MISSING ...]` marker.
pub(crate) fn cell_or_missing(value: Option<&str>, field: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => missing_marker(field),
    }
}
