//! Document assembly: a linear walk over the template.
//!
//! Cover page, table of contents, then each section in template-declared
//! order, then the three fixed appendices. Section numbers are assigned
//! sequentially as sections are encountered, never pre-assigned; reordering
//! the template's slots changes the visible numbering, which is the
//! intended trade-off for a branch-free walk.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::models::{
    AtomStatus, EvidenceAtom, EvidenceType, SlotDefinition, SlotKind, SlotProposal, Template,
};

use super::narrative::generate_narrative;
use super::slot_map::{meets_minimum, relevant_atoms};
use super::tables::{
    self, generate_capa_table, generate_complaints_table, generate_fsca_table,
    generate_incidents_table, generate_literature_table, generate_sales_table, TableOutput,
};
use super::{CaseContext, RenderError};

/// Block separator between top-level sections.
const SECTION_BREAK: &str = "---";

/// Render a full report as an ordered list of markdown blocks, ready to be
/// concatenated with newlines by a document serializer.
pub fn assemble_document(
    template: &Template,
    atoms: &[EvidenceAtom],
    case: &CaseContext,
    proposals: &[SlotProposal],
) -> Result<Vec<String>, RenderError> {
    if template.slots.is_empty() {
        return Err(RenderError::EmptyTemplate(template.template_id.clone()));
    }

    tracing::info!(
        template_id = %template.template_id,
        slots = template.slots.len(),
        atoms = atoms.len(),
        "Assembling report"
    );

    let sections = group_sections(&template.slots);
    let mut blocks = Vec::new();

    blocks.extend(cover_page(template, case));
    blocks.push(SECTION_BREAK.to_string());
    blocks.extend(table_of_contents(&sections));

    for (number, (section_path, slots)) in sections.iter().enumerate() {
        blocks.push(SECTION_BREAK.to_string());
        blocks.push(format!("## {}. {}", number + 1, section_title(section_path)));

        for slot in slots {
            blocks.push(format!("### {}", slot.title));
            blocks.extend(render_slot(slot, atoms, case, proposals));
        }
    }

    blocks.push(SECTION_BREAK.to_string());
    blocks.extend(appendix_a(atoms));
    blocks.push(SECTION_BREAK.to_string());
    blocks.extend(appendix_b(template, atoms));
    blocks.push(SECTION_BREAK.to_string());
    blocks.extend(appendix_c(template, atoms));

    Ok(blocks)
}

/// Group slots by section path, preserving first-seen order.
fn group_sections(slots: &[SlotDefinition]) -> Vec<(String, Vec<&SlotDefinition>)> {
    let mut sections: Vec<(String, Vec<&SlotDefinition>)> = Vec::new();
    for slot in slots {
        match sections.iter_mut().find(|(path, _)| *path == slot.section_path) {
            Some((_, members)) => members.push(slot),
            None => sections.push((slot.section_path.clone(), vec![slot])),
        }
    }
    sections
}

/// Strip any author-supplied leading numbering; the assembler numbers
/// sections itself, as encountered.
fn section_title(section_path: &str) -> &str {
    let trimmed = section_path.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.');
    let trimmed = trimmed.trim_start();
    if trimmed.is_empty() {
        section_path
    } else {
        trimmed
    }
}

fn cover_page(template: &Template, case: &CaseContext) -> Vec<String> {
    let device = case
        .device_ref
        .device_name
        .clone()
        .unwrap_or_else(|| case.device_ref.device_code.clone());

    vec![
        format!("# {}", template.name),
        format!(
            "**Device:** {device} ({})",
            case.device_ref.device_code
        ),
        format!(
            "**Reporting Period:** {} to {}",
            case.psur_period.period_start, case.psur_period.period_end
        ),
        format!(
            "**Template:** {} v{}",
            template.template_id, template.version
        ),
        format!("**Generated:** {}", Utc::now().format("%Y-%m-%d")),
    ]
}

fn table_of_contents(sections: &[(String, Vec<&SlotDefinition>)]) -> Vec<String> {
    let mut toc = String::from("## Table of Contents\n");
    for (number, (section_path, _)) in sections.iter().enumerate() {
        toc.push_str(&format!("{}. {}\n", number + 1, section_title(section_path)));
    }
    let n = sections.len();
    toc.push_str(&format!("{}. Appendix A: Evidence Counts by Type\n", n + 1));
    toc.push_str(&format!("{}. Appendix B: Slot Evidence Mapping\n", n + 2));
    toc.push_str(&format!("{}. Appendix C: Qualification Summary\n", n + 3));
    vec![toc]
}

fn render_slot(
    slot: &SlotDefinition,
    atoms: &[EvidenceAtom],
    case: &CaseContext,
    proposals: &[SlotProposal],
) -> Vec<String> {
    match slot.slot_kind {
        SlotKind::Table => {
            let table = table_for_slot(slot, atoms);
            vec![table.markdown, table.data_source_footer]
        }
        SlotKind::Narrative | SlotKind::Admin | SlotKind::Metric => {
            let proposal = proposals.iter().find(|p| p.slot_id == slot.slot_id);
            generate_narrative(slot, atoms, case, proposal)
        }
    }
}

/// Route a TABLE slot to its family generator by required evidence type.
/// A slot naming no recognized family degrades to the generic placeholder
/// rather than failing the document.
fn table_for_slot(slot: &SlotDefinition, atoms: &[EvidenceAtom]) -> TableOutput {
    for required in &slot.evidence_requirements.required_types {
        let table = match required.as_str() {
            "sales_volume" => Some(generate_sales_table(atoms)),
            "complaint_record" => Some(generate_complaints_table(atoms)),
            "serious_incident_record" => Some(generate_incidents_table(atoms)),
            "fsca_record" => Some(generate_fsca_table(atoms)),
            "capa_record" => Some(generate_capa_table(atoms)),
            "literature_record" => Some(generate_literature_table(atoms)),
            _ => None,
        };
        if let Some(table) = table {
            return table;
        }
    }

    tracing::warn!(slot_id = %slot.slot_id, "TABLE slot names no known evidence family");
    let columns: Vec<&str> = slot
        .output_requirements
        .table_schema
        .as_ref()
        .map(|schema| schema.columns.iter().map(String::as_str).collect())
        .unwrap_or_else(|| vec!["Evidence", "Value"]);
    tables::placeholder_table(&columns)
}

fn appendix_a(atoms: &[EvidenceAtom]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for evidence_type in EvidenceType::all() {
        counts.insert(evidence_type.as_str(), 0);
    }
    for atom in atoms {
        *counts.entry(atom.evidence_type.as_str()).or_insert(0) += 1;
    }

    let rows: Vec<Vec<String>> = counts
        .iter()
        .map(|(evidence_type, count)| vec![evidence_type.to_string(), count.to_string()])
        .collect();

    vec![
        "## Appendix A: Evidence Counts by Type".to_string(),
        tables::markdown_table(&["Evidence Type", "Atom Count"], &rows),
    ]
}

fn appendix_b(template: &Template, atoms: &[EvidenceAtom]) -> Vec<String> {
    let rows: Vec<Vec<String>> = template
        .slots
        .iter()
        .map(|slot| {
            let matched = relevant_atoms(slot, atoms);
            let obligations = template
                .mapping
                .get(&slot.slot_id)
                .map(|ids| ids.join(", "))
                .unwrap_or_else(|| "-".to_string());
            vec![
                slot.slot_id.clone(),
                if slot.evidence_requirements.required_types.is_empty() {
                    "-".to_string()
                } else {
                    slot.evidence_requirements.required_types.join(", ")
                },
                matched.len().to_string(),
                obligations,
            ]
        })
        .collect();

    vec![
        "## Appendix B: Slot Evidence Mapping".to_string(),
        tables::markdown_table(
            &["Slot", "Required Evidence", "Matched Atoms", "Obligations"],
            &rows,
        ),
    ]
}

fn appendix_c(template: &Template, atoms: &[EvidenceAtom]) -> Vec<String> {
    let valid = atoms.iter().filter(|a| a.status == AtomStatus::Valid).count();
    let invalid = atoms.iter().filter(|a| a.status == AtomStatus::Invalid).count();

    let unmet: Vec<&SlotDefinition> = template
        .slots
        .iter()
        .filter(|slot| !meets_minimum(slot, atoms))
        .collect();

    let mut blocks = vec![
        "## Appendix C: Qualification Summary".to_string(),
        format!(
            "{} evidence atom(s) were considered for this report: {valid} valid, {invalid} invalid.",
            atoms.len()
        ),
    ];

    if unmet.is_empty() {
        blocks.push("All slots met their minimum evidence requirements.".to_string());
    } else {
        let mut listing = String::from("Slots below their minimum evidence requirement:\n");
        for slot in unmet {
            let justify = if slot.evidence_requirements.allow_empty_with_justification {
                "justification permitted"
            } else {
                "justification required"
            };
            listing.push_str(&format!(
                "- {} (minimum {}, {justify})\n",
                slot.slot_id, slot.evidence_requirements.min_atoms
            ));
        }
        blocks.push(listing);
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::atom::test_fixtures::{test_device, test_period};
    use crate::models::EvidenceRequirements;
    use crate::normalize::{normalize_row, RowContext};
    use serde_json::json;

    fn case() -> CaseContext {
        CaseContext {
            device_ref: test_device(),
            psur_period: test_period(),
        }
    }

    fn slot(slot_id: &str, section: &str, kind: SlotKind, types: &[&str]) -> SlotDefinition {
        SlotDefinition {
            slot_id: slot_id.into(),
            title: slot_id.replace('_', " "),
            section_path: section.into(),
            slot_kind: kind,
            required: true,
            evidence_requirements: EvidenceRequirements::from_types(types),
            output_requirements: Default::default(),
        }
    }

    fn template(slots: Vec<SlotDefinition>) -> Template {
        Template {
            template_id: "psur-eu-v1".into(),
            name: "EU MDR PSUR".into(),
            version: "1.0.0".into(),
            jurisdiction_scope: vec!["EU".into()],
            slots,
            mapping: Default::default(),
        }
    }

    #[test]
    fn empty_template_is_an_error() {
        let result = assemble_document(&template(vec![]), &[], &case(), &[]);
        assert!(matches!(result, Err(RenderError::EmptyTemplate(_))));
    }

    #[test]
    fn sections_numbered_as_encountered() {
        let t = template(vec![
            slot("A", "Safety Data", SlotKind::Narrative, &[]),
            slot("B", "Market Data", SlotKind::Narrative, &[]),
        ]);
        let blocks = assemble_document(&t, &[], &case(), &[]).unwrap();
        let joined = blocks.join("\n");
        assert!(joined.contains("## 1. Safety Data"));
        assert!(joined.contains("## 2. Market Data"));

        // Reordering the slots renumbers the sections
        let t = template(vec![
            slot("B", "Market Data", SlotKind::Narrative, &[]),
            slot("A", "Safety Data", SlotKind::Narrative, &[]),
        ]);
        let blocks = assemble_document(&t, &[], &case(), &[]).unwrap();
        let joined = blocks.join("\n");
        assert!(joined.contains("## 1. Market Data"));
        assert!(joined.contains("## 2. Safety Data"));
    }

    #[test]
    fn author_numbering_in_section_path_is_replaced() {
        let t = template(vec![slot(
            "A",
            "7. Conclusion Text",
            SlotKind::Narrative,
            &[],
        )]);
        let blocks = assemble_document(&t, &[], &case(), &[]).unwrap();
        let joined = blocks.join("\n");
        assert!(joined.contains("## 1. Conclusion Text"));
        assert!(!joined.contains("## 1. 7."));
    }

    #[test]
    fn document_has_cover_toc_and_appendices() {
        let t = template(vec![slot(
            "S1_COMPLAINT_TABLE",
            "Complaints",
            SlotKind::Table,
            &["complaint_record"],
        )]);
        let blocks = assemble_document(&t, &[], &case(), &[]).unwrap();
        let joined = blocks.join("\n");
        assert!(joined.starts_with("# EU MDR PSUR"));
        assert!(joined.contains("## Table of Contents"));
        assert!(joined.contains("Appendix A: Evidence Counts by Type"));
        assert!(joined.contains("## Appendix B: Slot Evidence Mapping"));
        assert!(joined.contains("## Appendix C: Qualification Summary"));
        assert!(blocks.iter().filter(|b| *b == SECTION_BREAK).count() >= 4);
    }

    #[test]
    fn table_slot_without_known_family_degrades_to_placeholder() {
        let t = template(vec![slot(
            "S1_MYSTERY_TABLE",
            "Mystery",
            SlotKind::Table,
            &["trend_report"],
        )]);
        let blocks = assemble_document(&t, &[], &case(), &[]).unwrap();
        let joined = blocks.join("\n");
        assert!(joined.contains("No data available"));
    }

    #[test]
    fn end_to_end_complaint_table_from_raw_row() {
        // Template with one TABLE slot requiring complaint_record, one raw
        // complaint row with severity "3": the rendered table must carry one
        // data row plus a Total row of 1, severity normalized to high.
        let ctx = RowContext {
            device_ref: test_device(),
            psur_period: test_period(),
            provenance: crate::models::atom::test_fixtures::test_provenance(),
        };
        let row: crate::normalize::RawRow = serde_json::from_value(json!({
            "complaint_id": "C-900",
            "device_code": "DEV-100",
            "complaint_date": "2024-02-01",
            "description": "Occlusion alarm failed",
            "severity": "3",
            "complaint_type": "alarm failure",
        }))
        .unwrap();
        let (atom, errors) =
            normalize_row(crate::models::EvidenceType::ComplaintRecord, &row, &ctx);
        assert!(errors.is_empty());
        match &atom.payload {
            crate::models::EvidencePayload::Complaint(p) => {
                assert_eq!(p.severity, Some(crate::models::Severity::High));
            }
            other => panic!("Wrong payload variant: {other:?}"),
        }

        let t = template(vec![slot(
            "S5_COMPLAINT_TABLE",
            "Complaints",
            SlotKind::Table,
            &["complaint_record"],
        )]);
        let blocks = assemble_document(&t, &[atom.clone()], &case(), &[]).unwrap();
        let joined = blocks.join("\n");
        assert!(joined.contains("| alarm_failure | 1 |"));
        assert!(joined.contains("| **Total** | **1** |"));
        assert!(joined.contains(&atom.atom_id));
    }

    #[test]
    fn proposal_replaces_narrative_slot_content() {
        let t = template(vec![slot(
            "S1_EXEC_SUMMARY",
            "Summary",
            SlotKind::Narrative,
            &[],
        )]);
        let proposal = SlotProposal {
            slot_id: "S1_EXEC_SUMMARY".into(),
            rendered_text: "Hand-written summary.".into(),
            atom_ids: vec![],
            obligation_ids: vec![],
        };
        let blocks = assemble_document(&t, &[], &case(), &[proposal]).unwrap();
        assert!(blocks.contains(&"Hand-written summary.".to_string()));
    }

    #[test]
    fn appendix_a_counts_by_type() {
        use crate::models::atom::test_fixtures::complaint_atom;
        let t = template(vec![slot("A", "S", SlotKind::Narrative, &[])]);
        let mut c2 = complaint_atom("C-2");
        c2.atom_id = "complaint_record:000000000002".into();
        let blocks = assemble_document(&t, &[complaint_atom("C-1"), c2], &case(), &[]).unwrap();
        let joined = blocks.join("\n");
        assert!(joined.contains("| complaint_record | 2 |"));
        assert!(joined.contains("| sales_volume | 0 |"));
    }
}
