//! Slot-to-evidence matching: exact evidence type membership, nothing fuzzy.

use crate::models::{EvidenceAtom, SlotDefinition};

/// Atoms whose evidence type is named by the slot's requirements.
/// Comparison is case-sensitive string equality against the wire names;
/// a typo'd type in a template simply matches nothing.
pub fn relevant_atoms<'a>(slot: &SlotDefinition, atoms: &'a [EvidenceAtom]) -> Vec<&'a EvidenceAtom> {
    atoms
        .iter()
        .filter(|atom| {
            slot.evidence_requirements
                .required_types
                .iter()
                .any(|t| t == atom.evidence_type.as_str())
        })
        .collect()
}

/// True when the slot's minimum atom count is satisfied.
pub fn meets_minimum(slot: &SlotDefinition, atoms: &[EvidenceAtom]) -> bool {
    relevant_atoms(slot, atoms).len() as u32 >= slot.evidence_requirements.min_atoms
}
