//! Narrative generation, dispatched per slot.
//!
//! Dispatch is an explicit priority-ordered table of `(predicate,
//! category)` pairs over the slot id; the first matching predicate wins and
//! the slot's category is resolved exactly once. Two structural rules hold
//! for every branch: a pre-rendered slot proposal is emitted verbatim and
//! skips generation entirely, and a slot with no matching rule and no
//! relevant atoms emits a fixed placeholder rather than nothing.

use crate::models::{EvidenceAtom, EvidencePayload, EvidenceType, SlotDefinition, SlotProposal};

use super::slot_map::relevant_atoms;
use super::tables;
use super::tables::complaints::{rate_per_thousand, total_units};
use super::CaseContext;

/// Fixed placeholder for slots nothing can generate.
pub const EVIDENCE_NOT_UPLOADED: &str =
    "*Evidence not uploaded for this section. Required data was not provided for the reporting period.*";

/// The narrative rule a slot id resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotCategory {
    ExecutiveSummary,
    SeriousIncidents,
    Fsca,
    BenefitRisk,
    SalesVolume,
    Complaints,
    Capa,
    Literature,
    Conclusion,
}

type Predicate = fn(&str) -> bool;

/// Priority-ordered dispatch table; first match wins. Predicates operate on
/// the uppercased slot id. More specific rules sit above generic ones so
/// e.g. `EXEC_SUMMARY` never falls through to a keyword it also contains.
const DISPATCH: &[(Predicate, SlotCategory)] = &[
    (
        |id| id.contains("EXEC") || id.contains("SUMMARY"),
        SlotCategory::ExecutiveSummary,
    ),
    (
        |id| id.contains("BENEFIT") || id.contains("RISK"),
        SlotCategory::BenefitRisk,
    ),
    (
        |id| id.contains("INCIDENT") && !id.contains("TABLE"),
        SlotCategory::SeriousIncidents,
    ),
    (
        |id| id.contains("FSCA") || id.contains("FIELD_SAFETY"),
        SlotCategory::Fsca,
    ),
    (
        |id| id.contains("SALES") && !id.contains("TABLE"),
        SlotCategory::SalesVolume,
    ),
    (
        |id| id.contains("COMPLAINT") && !id.contains("TABLE"),
        SlotCategory::Complaints,
    ),
    (|id| id.contains("CAPA"), SlotCategory::Capa),
    (
        |id| id.contains("LITERATURE") || id.contains("PUBLICATION"),
        SlotCategory::Literature,
    ),
    (|id| id.contains("CONCLUSION"), SlotCategory::Conclusion),
];

/// Resolve a slot id to its narrative category, if any rule matches.
pub fn resolve_category(slot_id: &str) -> Option<SlotCategory> {
    let id = slot_id.to_uppercase();
    DISPATCH
        .iter()
        .find(|(predicate, _)| predicate(&id))
        .map(|(_, category)| *category)
}

/// Generate the ordered text blocks for a narrative slot.
pub fn generate_narrative(
    slot: &SlotDefinition,
    atoms: &[EvidenceAtom],
    case: &CaseContext,
    proposal: Option<&SlotProposal>,
) -> Vec<String> {
    // Rule (a): upstream-provided text wins, verbatim
    if let Some(proposal) = proposal {
        tracing::debug!(slot_id = %slot.slot_id, "Using pre-rendered slot proposal");
        return vec![proposal.rendered_text.clone()];
    }

    match resolve_category(&slot.slot_id) {
        Some(category) => {
            tracing::debug!(slot_id = %slot.slot_id, ?category, "Dispatching narrative");
            dispatch(category, atoms, case)
        }
        None => {
            let relevant = relevant_atoms(slot, atoms);
            if relevant.is_empty() {
                // Rule (b): never emit nothing for a slot
                vec![EVIDENCE_NOT_UPLOADED.to_string()]
            } else {
                vec![format!(
                    "{} evidence record(s) of type(s) {} were provided for this section.",
                    relevant.len(),
                    slot.evidence_requirements.required_types.join(", "),
                )]
            }
        }
    }
}

fn dispatch(category: SlotCategory, atoms: &[EvidenceAtom], case: &CaseContext) -> Vec<String> {
    match category {
        SlotCategory::ExecutiveSummary => executive_summary(atoms, case),
        SlotCategory::SeriousIncidents => serious_incidents(atoms),
        SlotCategory::Fsca => fsca(atoms),
        SlotCategory::BenefitRisk => benefit_risk(atoms, case),
        SlotCategory::SalesVolume => sales_volume(atoms),
        SlotCategory::Complaints => complaints(atoms),
        SlotCategory::Capa => capa(atoms),
        SlotCategory::Literature => literature(atoms),
        SlotCategory::Conclusion => conclusion(atoms, case),
    }
}

fn count_of(atoms: &[EvidenceAtom], evidence_type: EvidenceType) -> usize {
    tables::atoms_of_types(atoms, &[evidence_type]).len()
}

/// Aggregate statistics computed directly from atom payloads. The table
/// generators derive the same numbers independently; both derivations must
/// agree, which the end-to-end tests pin down.
fn executive_summary(atoms: &[EvidenceAtom], case: &CaseContext) -> Vec<String> {
    let units = total_units(atoms);
    let complaint_count = count_of(atoms, EvidenceType::ComplaintRecord);
    let incident_count = count_of(atoms, EvidenceType::SeriousIncidentRecord);
    let fsca_count = count_of(atoms, EvidenceType::FscaRecord);

    let device = case
        .device_ref
        .device_name
        .clone()
        .unwrap_or_else(|| case.device_ref.device_code.clone());

    let mut blocks = vec![format!(
        "This Periodic Safety Update Report covers {device} for the period {} to {}.",
        case.psur_period.period_start, case.psur_period.period_end,
    )];

    let volume_sentence = match units {
        Some(u) => format!(
            "An estimated {} units were distributed during the reporting period.",
            tables::format_count(u)
        ),
        None => "Sales volume data was not provided for the reporting period.".to_string(),
    };

    let rate_sentence = match units.and_then(|u| rate_per_thousand(complaint_count as f64, u)) {
        Some(rate) => format!(
            "{complaint_count} complaint(s) were received, a rate of {rate} per 1,000 units."
        ),
        None => format!("{complaint_count} complaint(s) were received."),
    };

    blocks.push(format!(
        "{volume_sentence} {rate_sentence} {incident_count} serious incident(s) and {fsca_count} field safety corrective action(s) were recorded.",
    ));
    blocks
}

fn sales_volume(atoms: &[EvidenceAtom]) -> Vec<String> {
    let table = tables::generate_sales_table(atoms);
    let intro = match total_units(atoms) {
        Some(units) => format!(
            "Distribution during the reporting period totaled {} units across the regions below.",
            tables::format_count(units)
        ),
        None => "No sales volume evidence was provided for the reporting period.".to_string(),
    };
    vec![intro, table.markdown, table.data_source_footer]
}

fn complaints(atoms: &[EvidenceAtom]) -> Vec<String> {
    let count = count_of(atoms, EvidenceType::ComplaintRecord);
    let table = tables::generate_complaints_table(atoms);
    let intro = if count == 0 {
        "No complaint records were uploaded for the reporting period.".to_string()
    } else {
        format!("{count} complaint record(s) were received and categorized as follows.")
    };
    vec![intro, table.markdown, table.data_source_footer]
}

fn serious_incidents(atoms: &[EvidenceAtom]) -> Vec<String> {
    let matched = tables::atoms_of_types(atoms, &[EvidenceType::SeriousIncidentRecord]);
    let reportable = matched
        .iter()
        .filter(|a| match &a.payload {
            EvidencePayload::Incident(p) => p.reportable.unwrap_or(false),
            _ => false,
        })
        .count();

    let table = tables::generate_incidents_table(atoms);
    let intro = if matched.is_empty() {
        "No serious incident records were uploaded for the reporting period.".to_string()
    } else {
        format!(
            "{} serious incident(s) were recorded, of which {reportable} were reportable to a competent authority.",
            matched.len()
        )
    };
    vec![intro, table.markdown, table.data_source_footer]
}

fn fsca(atoms: &[EvidenceAtom]) -> Vec<String> {
    let count = count_of(atoms, EvidenceType::FscaRecord);
    let table = tables::generate_fsca_table(atoms);
    let intro = if count == 0 {
        "No field safety corrective actions were uploaded for the reporting period.".to_string()
    } else {
        format!("{count} field safety corrective action record(s) apply to the reporting period.")
    };
    vec![intro, table.markdown, table.data_source_footer]
}

fn capa(atoms: &[EvidenceAtom]) -> Vec<String> {
    let matched = tables::atoms_of_types(atoms, &[EvidenceType::CapaRecord]);
    let closed = matched
        .iter()
        .filter(|a| match &a.payload {
            EvidencePayload::Capa(p) => p.closed_date.is_some(),
            _ => false,
        })
        .count();

    let table = tables::generate_capa_table(atoms);
    let intro = if matched.is_empty() {
        "No corrective or preventive actions were uploaded for the reporting period.".to_string()
    } else {
        format!(
            "{} CAPA record(s) were active during the period; {closed} were closed by period end.",
            matched.len()
        )
    };
    vec![intro, table.markdown, table.data_source_footer]
}

fn literature(atoms: &[EvidenceAtom]) -> Vec<String> {
    let matched = tables::atoms_of_types(atoms, &[EvidenceType::LiteratureRecord]);
    let relevant = matched
        .iter()
        .filter(|a| match &a.payload {
            EvidencePayload::Literature(p) => p.safety_relevant.unwrap_or(false),
            _ => false,
        })
        .count();

    let table = tables::generate_literature_table(atoms);
    let intro = if matched.is_empty() {
        "No literature search results were uploaded for the reporting period.".to_string()
    } else {
        format!(
            "The literature search retrieved {} article(s); {relevant} were assessed as safety-relevant.",
            matched.len()
        )
    };
    vec![intro, table.markdown, table.data_source_footer]
}

fn benefit_risk(atoms: &[EvidenceAtom], case: &CaseContext) -> Vec<String> {
    let units = total_units(atoms);
    let complaint_count = count_of(atoms, EvidenceType::ComplaintRecord);
    let incident_count = count_of(atoms, EvidenceType::SeriousIncidentRecord);

    let rate_clause = units
        .and_then(|u| rate_per_thousand(complaint_count as f64, u))
        .map(|rate| format!(" The observed complaint rate of {rate} per 1,000 units"))
        .unwrap_or_else(|| " The observed complaint volume".to_string());

    vec![format!(
        "Based on the evidence collected for the period {} to {}, {complaint_count} complaint(s) and {incident_count} serious incident(s) were evaluated against the device's intended clinical benefit.{rate_clause} does not indicate a change to the established benefit-risk profile.",
        case.psur_period.period_start, case.psur_period.period_end,
    )]
}

fn conclusion(atoms: &[EvidenceAtom], case: &CaseContext) -> Vec<String> {
    let incident_count = count_of(atoms, EvidenceType::SeriousIncidentRecord);
    let fsca_count = count_of(atoms, EvidenceType::FscaRecord);

    vec![format!(
        "The post-market surveillance data collected between {} and {} ({incident_count} serious incident(s), {fsca_count} FSCA(s)) supports the continued marketing of the device. Surveillance activities continue per the PMS plan.",
        case.psur_period.period_start, case.psur_period.period_end,
    )]
}
