//! Serious incidents table: counts grouped by IMDRF device problem code.

use std::collections::BTreeMap;

use crate::models::{EvidenceAtom, EvidencePayload, EvidenceType, Severity};

use super::{
    atoms_of_types, data_source_footer, find_negative_evidence, format_count, markdown_table,
    missing_marker, none_reported_table, placeholder_table, TableOutput,
};

const COLUMNS: &[&str] = &["IMDRF Code", "Count", "Highest Severity"];

fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Low => 1,
        Severity::Medium => 2,
        Severity::High => 3,
        Severity::Critical => 4,
    }
}

pub fn generate_incidents_table(atoms: &[EvidenceAtom]) -> TableOutput {
    let matched = atoms_of_types(atoms, &[EvidenceType::SeriousIncidentRecord]);
    if matched.is_empty() {
        return placeholder_table(COLUMNS);
    }
    if let Some(negative) = find_negative_evidence(&matched) {
        return none_reported_table(COLUMNS, negative);
    }

    // imdrf code -> (count, highest severity seen)
    let mut groups: BTreeMap<String, (u64, Option<Severity>)> = BTreeMap::new();
    for atom in &matched {
        let (code, severity) = match &atom.payload {
            EvidencePayload::Incident(p) => (
                p.imdrf_code
                    .clone()
                    .unwrap_or_else(|| missing_marker("imdrf_code")),
                p.severity,
            ),
            _ => (missing_marker("imdrf_code"), None),
        };
        let entry = groups.entry(code).or_insert((0, None));
        entry.0 += 1;
        entry.1 = match (entry.1, severity) {
            (None, s) => s,
            (s, None) => s,
            (Some(a), Some(b)) => Some(if severity_rank(b) > severity_rank(a) { b } else { a }),
        };
    }

    let total: u64 = groups.values().map(|(count, _)| count).sum();
    let mut entries: Vec<(String, (u64, Option<Severity>))> = groups.into_iter().collect();
    entries.sort_by(|a, b| b.1 .0.cmp(&a.1 .0));

    let mut rows: Vec<Vec<String>> = entries
        .iter()
        .map(|(code, (count, severity))| {
            vec![
                code.clone(),
                format_count(*count as f64),
                severity
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| missing_marker("severity")),
            ]
        })
        .collect();
    rows.push(vec![
        "**Total**".to_string(),
        format!("**{}**", format_count(total as f64)),
        "-".to_string(),
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
    use crate::models::IncidentPayload;

    fn incident(id: &str, code: Option<&str>, severity: Option<Severity>) -> EvidenceAtom {
        let mut atom = minimal_atom(
            EvidenceType::SeriousIncidentRecord,
            EvidencePayload::Incident(IncidentPayload {
                incident_id: Some(id.into()),
                imdrf_code: code.map(String::from),
                severity,
                ..Default::default()
            }),
        );
        atom.atom_id = format!("serious_incident_record:{id:>012}");
        atom
    }

    #[test]
    fn groups_by_imdrf_code_keeping_highest_severity() {
        let atoms = vec![
            incident("I-1", Some("A0901"), Some(Severity::Medium)),
            incident("I-2", Some("A0901"), Some(Severity::Critical)),
            incident("I-3", Some("A0702"), Some(Severity::High)),
        ];
        let out = generate_incidents_table(&atoms);
        assert!(out.markdown.contains("| A0901 | 2 | critical |"));
        assert!(out.markdown.contains("| A0702 | 1 | high |"));
        assert!(out.markdown.contains("| **Total** | **3** | - |"));
    }

    #[test]
    fn missing_code_and_severity_render_markers() {
        let atoms = vec![incident("I-1", None, None)];
        let out = generate_incidents_table(&atoms);
        assert!(out.markdown.contains("[MISSING IMDRF CODE]"));
        assert!(out.markdown.contains("[MISSING SEVERITY]"));
    }

    #[test]
    fn negative_evidence_short_circuits() {
        let negative = {
            let mut atom = incident("NEG", None, None);
            if let EvidencePayload::Incident(ref mut p) = atom.payload {
                p.is_negative_evidence = Some(true);
            }
            atom
        };
        let atoms = vec![
            incident("I-1", Some("A0901"), Some(Severity::High)),
            negative.clone(),
        ];
        let out = generate_incidents_table(&atoms);
        assert!(out.markdown.contains("**None Reported**"));
        assert_eq!(out.evidence_atom_ids, vec![negative.atom_id]);
    }

    #[test]
    fn empty_set_renders_placeholder() {
        let out = generate_incidents_table(&[]);
        assert!(out.markdown.contains("No data available"));
    }
}
