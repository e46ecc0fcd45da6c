//! CAPA table: one row per corrective/preventive action, insertion order.

use crate::models::{EvidenceAtom, EvidencePayload, EvidenceType};

use super::{
    atoms_of_types, cell_or_missing, data_source_footer, find_negative_evidence, markdown_table,
    none_reported_table, placeholder_table, TableOutput,
};

const COLUMNS: &[&str] = &["CAPA ID", "Opened", "Status", "Closed", "Description"];

/// Keep descriptions table-friendly.
const DESCRIPTION_LIMIT: usize = 80;

fn truncate_description(text: &str) -> String {
    if text.chars().count() <= DESCRIPTION_LIMIT {
        return text.to_string();
    }
    let cut: String = text.chars().take(DESCRIPTION_LIMIT).collect();
    format!("{}...", cut.trim_end())
}

pub fn generate_capa_table(atoms: &[EvidenceAtom]) -> TableOutput {
    let matched = atoms_of_types(atoms, &[EvidenceType::CapaRecord]);
    if matched.is_empty() {
        return placeholder_table(COLUMNS);
    }
    if let Some(negative) = find_negative_evidence(&matched) {
        return none_reported_table(COLUMNS, negative);
    }

    let rows: Vec<Vec<String>> = matched
        .iter()
        .map(|atom| match &atom.payload {
            EvidencePayload::Capa(p) => vec![
                cell_or_missing(p.capa_id.as_deref(), "capa_id"),
                cell_or_missing(p.opened_date.as_deref(), "opened_date"),
                cell_or_missing(p.status.as_deref(), "status"),
                // An open CAPA legitimately has no closed date
                p.closed_date.clone().unwrap_or_else(|| "-".to_string()),
                cell_or_missing(
                    p.description.as_deref().map(truncate_description).as_deref(),
                    "description",
                ),
            ],
            _ => COLUMNS.iter().map(|_| "-".to_string()).collect(),
        })
        .collect();

    let ids: Vec<String> = matched.iter().map(|a| a.atom_id.clone()).collect();
    TableOutput {
        markdown: markdown_table(COLUMNS, &rows),
        data_source_footer: data_source_footer(&ids),
        evidence_atom_ids: ids,
    }
}
