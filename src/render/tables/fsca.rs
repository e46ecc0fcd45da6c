//! FSCA table: one row per field safety corrective action. No natural
//! ranking, so rows keep insertion order.

use crate::models::{EvidenceAtom, EvidencePayload, EvidenceType};

use super::{
    atoms_of_types, cell_or_missing, data_source_footer, find_negative_evidence, markdown_table,
    none_reported_table, placeholder_table, TableOutput,
};

const COLUMNS: &[&str] = &["FSCA ID", "Action Type", "Initiated", "Status", "Regions Affected"];

pub fn generate_fsca_table(atoms: &[EvidenceAtom]) -> TableOutput {
    let matched = atoms_of_types(atoms, &[EvidenceType::FscaRecord]);
    if matched.is_empty() {
        return placeholder_table(COLUMNS);
    }
    if let Some(negative) = find_negative_evidence(&matched) {
        return none_reported_table(COLUMNS, negative);
    }

    let rows: Vec<Vec<String>> = matched
        .iter()
        .map(|atom| match &atom.payload {
            EvidencePayload::Fsca(p) => vec![
                cell_or_missing(p.fsca_id.as_deref(), "fsca_id"),
                cell_or_missing(p.action_type.as_deref(), "action_type"),
                cell_or_missing(p.initiated_date.as_deref(), "initiated_date"),
                cell_or_missing(p.status.as_deref(), "status"),
                cell_or_missing(p.regions_affected.as_deref(), "regions_affected"),
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
