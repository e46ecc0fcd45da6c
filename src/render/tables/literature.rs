//! Literature table: one row per retrieved article, insertion order.

use crate::models::{EvidenceAtom, EvidencePayload, EvidenceType};

use super::{
    atoms_of_types, cell_or_missing, data_source_footer, markdown_table, placeholder_table,
    TableOutput,
};

const COLUMNS: &[&str] = &["Title", "Source", "Published", "Safety Relevant"];

pub fn generate_literature_table(atoms: &[EvidenceAtom]) -> TableOutput {
    let matched = atoms_of_types(atoms, &[EvidenceType::LiteratureRecord]);
    if matched.is_empty() {
        return placeholder_table(COLUMNS);
    }

    let rows: Vec<Vec<String>> = matched
        .iter()
        .map(|atom| match &atom.payload {
            EvidencePayload::Literature(p) => vec![
                cell_or_missing(p.title.as_deref(), "title"),
                cell_or_missing(p.source.as_deref(), "source"),
                p.publication_date.clone().unwrap_or_else(|| "-".to_string()),
                match p.safety_relevant {
                    Some(true) => "yes".to_string(),
                    Some(false) => "no".to_string(),
                    None => "-".to_string(),
                },
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::atom::test_fixtures::minimal_atom;
    use crate::models::LiteraturePayload;

    fn article(id: &str, title: &str, relevant: Option<bool>) -> EvidenceAtom {
        let mut atom = minimal_atom(
            EvidenceType::LiteratureRecord,
            EvidencePayload::Literature(LiteraturePayload {
                reference_id: Some(id.into()),
                title: Some(title.into()),
                source: Some("J Med Eng Saf".into()),
                publication_date: Some("2024-04-15".into()),
                safety_relevant: relevant,
                ..Default::default()
            }),
        );
        atom.atom_id = format!("literature_record:{id:>012}");
        atom
    }

    #[test]
    fn one_row_per_article() {
        let atoms = vec![
            article("L-1", "Occlusion alarm review", Some(false)),
            article("L-2", "Case report: over-infusion", Some(true)),
        ];
        let out = generate_literature_table(&atoms);
        assert!(out.markdown.contains("| Occlusion alarm review | J Med Eng Saf | 2024-04-15 | no |"));
        assert!(out.markdown.contains("| Case report: over-infusion | J Med Eng Saf | 2024-04-15 | yes |"));
        assert_eq!(out.evidence_atom_ids.len(), 2);
    }

    #[test]
    fn missing_title_gets_marker() {
        let mut atom = article("L-3", "x", None);
        if let EvidencePayload::Literature(ref mut p) = atom.payload {
            p.title = None;
        }
        let out = generate_literature_table(&[atom]);
        assert!(out.markdown.contains("[MISSING TITLE]"));
    }

    #[test]
    fn empty_set_renders_placeholder() {
        let out = generate_literature_table(&[]);
        assert!(out.markdown.contains("No data available"));
        assert!(out.evidence_atom_ids.is_empty());
    }
}
