//! Row normalization: raw tabular rows in, evidence atoms out.
//!
//! One normalizer per evidence type. Every normalizer follows the same
//! shape: resolve canonical fields through the alias tables, coerce values,
//! collect a human-readable error string per missing or invalid required
//! field, then build the atom. An atom is always returned, marked
//! `invalid` when validation failed, so rejected rows stay auditable.

pub mod capa;
pub mod coerce;
pub mod complaint;
pub mod fields;
pub mod fsca;
pub mod hash;
pub mod incident;
pub mod literature;
pub mod sales;

pub use fields::{resolve_field, resolve_string, RawRow};

use chrono::Utc;
use serde_json::Value;

use crate::models::{
    AtomStatus, DeviceRef, EvidenceAtom, EvidencePayload, EvidenceType, PsurPeriod, Provenance,
};

/// Case-level context shared by every row of an upload batch.
#[derive(Debug, Clone)]
pub struct RowContext {
    pub device_ref: DeviceRef,
    pub psur_period: PsurPeriod,
    pub provenance: Provenance,
}

/// Normalize one raw row according to its evidence type.
pub fn normalize_row(
    evidence_type: EvidenceType,
    row: &RawRow,
    ctx: &RowContext,
) -> (EvidenceAtom, Vec<String>) {
    match evidence_type {
        EvidenceType::SalesVolume => sales::normalize_sales_row(row, ctx),
        EvidenceType::ComplaintRecord => complaint::normalize_complaint_row(row, ctx),
        EvidenceType::SeriousIncidentRecord => incident::normalize_incident_row(row, ctx),
        EvidenceType::FscaRecord => fsca::normalize_fsca_row(row, ctx),
        EvidenceType::CapaRecord => capa::normalize_capa_row(row, ctx),
        EvidenceType::LiteratureRecord => literature::normalize_literature_row(row, ctx),
    }
}

/// Validation errors for one row of a batch, keyed by input position.
#[derive(Debug, Clone)]
pub struct RowErrors {
    pub row_index: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Default)]
pub struct BatchResult {
    pub atoms: Vec<EvidenceAtom>,
    /// Rows that failed validation, in input row order.
    pub row_errors: Vec<RowErrors>,
}

/// Normalize an upload batch. Rows are independent; reported errors keep
/// input row order so a reviewer can line them up with the spreadsheet.
pub fn normalize_batch(
    evidence_type: EvidenceType,
    rows: &[RawRow],
    ctx: &RowContext,
) -> BatchResult {
    let mut result = BatchResult::default();
    for (row_index, row) in rows.iter().enumerate() {
        let (atom, errors) = normalize_row(evidence_type, row, ctx);
        if !errors.is_empty() {
            result.row_errors.push(RowErrors { row_index, errors });
        }
        result.atoms.push(atom);
    }
    tracing::info!(
        evidence_type = evidence_type.as_str(),
        rows = rows.len(),
        invalid = result.row_errors.len(),
        "Normalized upload batch"
    );
    result
}

/// Collapse duplicate atoms, keeping the first occurrence of each id.
/// Because ids are content-addressed, re-uploading the same file is a no-op.
pub fn dedup_atoms(atoms: Vec<EvidenceAtom>) -> Vec<EvidenceAtom> {
    let mut seen = std::collections::HashSet::new();
    atoms
        .into_iter()
        .filter(|atom| seen.insert(atom.atom_id.clone()))
        .collect()
}

/// Shared atom construction: hash the canonical payload, derive the id,
/// set status from the collected errors.
pub(crate) fn build_atom(
    evidence_type: EvidenceType,
    payload: EvidencePayload,
    period: PsurPeriod,
    ctx: &RowContext,
    errors: &[String],
) -> EvidenceAtom {
    let content_hash = hash::content_hash(&payload.to_value());
    let atom_id = hash::atom_id(evidence_type.as_str(), Some(&content_hash));

    EvidenceAtom {
        atom_id,
        evidence_type,
        version: 1,
        status: if errors.is_empty() {
            AtomStatus::Valid
        } else {
            AtomStatus::Invalid
        },
        psur_period: period,
        device_ref: ctx.device_ref.clone(),
        provenance: ctx.provenance.clone(),
        content_hash: Some(content_hash),
        payload,
        created_at: Utc::now(),
    }
}

/// Resolve the device code from the row, falling back to the case-level
/// device reference. Returns an error string when neither is usable.
pub(crate) fn device_code_or_context(
    row: &RawRow,
    ctx: &RowContext,
    errors: &mut Vec<String>,
) -> Option<String> {
    if let Some(code) = resolve_string(row, "device_code") {
        return Some(code);
    }
    if !ctx.device_ref.device_code.is_empty() {
        return Some(ctx.device_ref.device_code.clone());
    }
    errors.push("Missing required field: device_code".to_string());
    None
}

/// Resolve and coerce a required date field, pushing an error when the
/// column is absent or unparseable.
pub(crate) fn required_date(
    row: &RawRow,
    canonical: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    match resolve_field(row, canonical) {
        None => {
            errors.push(format!("Missing required field: {canonical}"));
            None
        }
        Some(value) => match coerce::to_iso_date(value) {
            Some(date) => Some(date),
            None => {
                errors.push(format!("Unparseable date for required field: {canonical}"));
                None
            }
        },
    }
}

/// Resolve a required text field, pushing an error when absent.
pub(crate) fn required_string(
    row: &RawRow,
    canonical: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    match resolve_string(row, canonical) {
        Some(s) => Some(s),
        None => {
            errors.push(format!("Missing required field: {canonical}"));
            None
        }
    }
}

/// Optional boolean field, absent unless the cell parses.
pub(crate) fn optional_bool(row: &RawRow, canonical: &str) -> Option<bool> {
    resolve_field(row, canonical).and_then(coerce::to_bool)
}

/// Optional date field, absent unless the cell parses.
pub(crate) fn optional_date(row: &RawRow, canonical: &str) -> Option<String> {
    resolve_field(row, canonical).and_then(coerce::to_iso_date)
}

/// Optional slug-normalized category field.
pub(crate) fn optional_slug(row: &RawRow, canonical: &str) -> Option<String> {
    resolve_field(row, canonical).and_then(coerce::normalize_enum)
}

pub(crate) fn optional_value<'a>(row: &'a RawRow, canonical: &str) -> Option<&'a Value> {
    resolve_field(row, canonical)
}
