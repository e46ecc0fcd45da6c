//! Complaint record normalizer.

use crate::models::{ComplaintPayload, EvidenceAtom, EvidencePayload, EvidenceType};

use super::coerce;
use super::fields::RawRow;
use super::{
    build_atom, device_code_or_context, optional_bool, optional_slug, optional_value,
    required_date, required_string, resolve_string, RowContext,
};

/// Required: complaint_id, device_code, complaint_date, description.
pub fn normalize_complaint_row(row: &RawRow, ctx: &RowContext) -> (EvidenceAtom, Vec<String>) {
    let mut errors = Vec::new();

    let complaint_id = required_string(row, "complaint_id", &mut errors);
    let device_code = device_code_or_context(row, ctx, &mut errors);
    let complaint_date = required_date(row, "complaint_date", &mut errors);
    let description = required_string(row, "description", &mut errors);

    let payload = EvidencePayload::Complaint(ComplaintPayload {
        complaint_id,
        device_code,
        complaint_date,
        description,
        severity: optional_value(row, "severity").and_then(coerce::normalize_severity),
        complaint_type: optional_slug(row, "complaint_type"),
        region: resolve_string(row, "region"),
        status: optional_slug(row, "status"),
        imdrf_code: resolve_string(row, "imdrf_code"),
        is_negative_evidence: optional_bool(row, "is_negative_evidence"),
    });

    let atom = build_atom(
        EvidenceType::ComplaintRecord,
        payload,
        ctx.psur_period.clone(),
        ctx,
        &errors,
    );
    (atom, errors)
}
