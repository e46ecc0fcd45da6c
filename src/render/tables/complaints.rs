//! Complaints table: counts by complaint type, with a complaints-per-1,000
//! units rate when sales atoms provide a denominator.

use std::collections::BTreeMap;

use crate::models::{EvidenceAtom, EvidencePayload, EvidenceType};

use super::{
    atoms_of_types, data_source_footer, find_negative_evidence, format_count, markdown_table,
    missing_marker, none_reported_table, placeholder_table, TableOutput,
};

const COLUMNS: &[&str] = &["Complaint Type", "Count", "Rate per 1,000 Units"];

/// Sum of sales quantities across the atom set, used as the rate
/// denominator. `None` when no sales atoms exist.
pub(crate) fn total_units(atoms: &[EvidenceAtom]) -> Option<f64> {
    let sales = atoms_of_types(atoms, &[EvidenceType::SalesVolume]);
    if sales.is_empty() {
        return None;
    }
    let total = sales
        .iter()
        .filter_map(|a| match &a.payload {
            EvidencePayload::Sales(p) => p.quantity,
            _ => None,
        })
        .sum();
    Some(total)
}

/// Complaints per 1,000 units, two decimals.
pub(crate) fn rate_per_thousand(complaints: f64, units: f64) -> Option<String> {
    if units <= 0.0 {
        return None;
    }
    Some(format!("{:.2}", complaints / units * 1000.0))
}

pub fn generate_complaints_table(atoms: &[EvidenceAtom]) -> TableOutput {
    let matched = atoms_of_types(atoms, &[EvidenceType::ComplaintRecord]);
    if matched.is_empty() {
        return placeholder_table(COLUMNS);
    }
    if let Some(negative) = find_negative_evidence(&matched) {
        return none_reported_table(COLUMNS, negative);
    }

    let units = total_units(atoms);

    let mut groups: BTreeMap<String, u64> = BTreeMap::new();
    for atom in &matched {
        let key = match &atom.payload {
            EvidencePayload::Complaint(p) => p
                .complaint_type
                .clone()
                .unwrap_or_else(|| missing_marker("complaint_type")),
            _ => missing_marker("complaint_type"),
        };
        *groups.entry(key).or_insert(0) += 1;
    }

    let total: u64 = groups.values().sum();
    let mut entries: Vec<(String, u64)> = groups.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    let rate_cell = |count: u64| -> String {
        units
            .and_then(|u| rate_per_thousand(count as f64, u))
            .unwrap_or_else(|| "N/A".to_string())
    };

    let mut rows: Vec<Vec<String>> = entries
        .iter()
        .map(|(kind, count)| vec![kind.clone(), format_count(*count as f64), rate_cell(*count)])
        .collect();
    rows.push(vec![
        "**Total**".to_string(),
        format!("**{}**", format_count(total as f64)),
        format!("**{}**", rate_cell(total)),
    ]);

    let ids: Vec<String> = matched.iter().map(|a| a.atom_id.clone()).collect();
    TableOutput {
        markdown: markdown_table(COLUMNS, &rows),
        data_source_footer: data_source_footer(&ids),
        evidence_atom_ids: ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::atom::test_fixtures::minimal_atom;
    use crate::models::{ComplaintPayload, SalesPayload};

    fn complaint(id: &str, kind: Option<&str>) -> EvidenceAtom {
        let mut atom = minimal_atom(
            EvidenceType::ComplaintRecord,
            EvidencePayload::Complaint(ComplaintPayload {
                complaint_id: Some(id.into()),
                complaint_type: kind.map(String::from),
                ..Default::default()
            }),
        );
        atom.atom_id = format!("complaint_record:{id:>012}");
        atom
    }

    fn sales(quantity: f64) -> EvidenceAtom {
        minimal_atom(
            EvidenceType::SalesVolume,
            EvidencePayload::Sales(SalesPayload {
                quantity: Some(quantity),
                ..Default::default()
            }),
        )
    }

    #[test]
    fn rate_is_complaints_per_thousand_units() {
        assert_eq!(rate_per_thousand(5.0, 2500.0).unwrap(), "2.00");
        assert_eq!(rate_per_thousand(3.0, 1000.0).unwrap(), "3.00");
        assert!(rate_per_thousand(3.0, 0.0).is_none());
    }

    #[test]
    fn groups_by_type_with_total_row() {
        let atoms = vec![
            complaint("C-1", Some("leak")),
            complaint("C-2", Some("leak")),
            complaint("C-3", Some("alarm_failure")),
        ];
        let out = generate_complaints_table(&atoms);
        assert!(out.markdown.contains("| leak | 2 | N/A |"));
        assert!(out.markdown.contains("| alarm_failure | 1 | N/A |"));
        assert!(out.markdown.contains("| **Total** | **3** | **N/A** |"));
    }

    #[test]
    fn rate_column_uses_sales_denominator() {
        let atoms = vec![
            complaint("C-1", Some("leak")),
            complaint("C-2", Some("leak")),
            complaint("C-3", Some("leak")),
            complaint("C-4", Some("leak")),
            complaint("C-5", Some("leak")),
            sales(2500.0),
        ];
        let out = generate_complaints_table(&atoms);
        assert!(out.markdown.contains("| **Total** | **5** | **2.00** |"));
        // Sales atoms provide the denominator but are not complaint evidence
        assert_eq!(out.evidence_atom_ids.len(), 5);
    }

    #[test]
    fn missing_type_gets_marker_group() {
        let atoms = vec![complaint("C-1", None)];
        let out = generate_complaints_table(&atoms);
        assert!(out.markdown.contains("[MISSING COMPLAINT TYPE]"));
    }

    #[test]
    fn negative_evidence_takes_precedence() {
        let negative = {
            let mut atom = complaint("NEG", None);
            if let EvidencePayload::Complaint(ref mut p) = atom.payload {
                p.is_negative_evidence = Some(true);
            }
            atom
        };
        let atoms = vec![negative.clone(), complaint("C-1", Some("leak"))];
        let out = generate_complaints_table(&atoms);
        assert!(out.markdown.contains("**None Reported**"));
        assert_eq!(out.evidence_atom_ids, vec![negative.atom_id]);
    }

    #[test]
    fn empty_set_renders_placeholder() {
        let out = generate_complaints_table(&[]);
        assert!(out.markdown.contains("No data available"));
        assert!(out.evidence_atom_ids.is_empty());
    }
}
