//! Field safety corrective action (FSCA) normalizer.

use crate::models::{EvidenceAtom, EvidencePayload, EvidenceType, FscaPayload};

use super::fields::RawRow;
use super::{
    build_atom, device_code_or_context, optional_bool, optional_slug, required_date,
    required_string, resolve_string, RowContext,
};

/// Required: fsca_id, device_code, action_type, initiated_date.
pub fn normalize_fsca_row(row: &RawRow, ctx: &RowContext) -> (EvidenceAtom, Vec<String>) {
    let mut errors = Vec::new();

    let fsca_id = required_string(row, "fsca_id", &mut errors);
    let device_code = device_code_or_context(row, ctx, &mut errors);
    let action_type = match optional_slug(row, "action_type") {
        Some(t) => Some(t),
        None => {
            errors.push("Missing required field: action_type".to_string());
            None
        }
    };
    let initiated_date = required_date(row, "initiated_date", &mut errors);

    let payload = EvidencePayload::Fsca(FscaPayload {
        fsca_id,
        device_code,
        action_type,
        initiated_date,
        status: optional_slug(row, "status"),
        description: resolve_string(row, "description"),
        regions_affected: resolve_string(row, "regions_affected"),
        is_negative_evidence: optional_bool(row, "is_negative_evidence"),
    });

    let atom = build_atom(
        EvidenceType::FscaRecord,
        payload,
        ctx.psur_period.clone(),
        ctx,
        &errors,
    );
    (atom, errors)
}
