//! Sales volume normalizer.
//!
//! Quantity cells arrive with thousands separators and the occasional
//! currency symbol; both are stripped before the numeric parse. A row's
//! effective period falls back to the case-level reporting period when the
//! export carries no period columns.

use crate::models::{EvidenceAtom, EvidencePayload, EvidenceType, PsurPeriod, SalesPayload};

use super::coerce;
use super::fields::RawRow;
use super::{
    build_atom, device_code_or_context, optional_date, resolve_field, resolve_string, RowContext,
};

/// Required: device_code, quantity. Region is optional; tables that group
/// by region render an explicit missing marker instead.
pub fn normalize_sales_row(row: &RawRow, ctx: &RowContext) -> (EvidenceAtom, Vec<String>) {
    let mut errors = Vec::new();

    let device_code = device_code_or_context(row, ctx, &mut errors);

    let quantity = match resolve_field(row, "quantity") {
        None => {
            errors.push("Missing required field: quantity".to_string());
            None
        }
        Some(value) => match coerce::parse_quantity(value) {
            Some(q) => Some(q),
            None => {
                errors.push("Invalid quantity: must be a non-negative number".to_string());
                None
            }
        },
    };

    // Row-level period wins; otherwise inherit the case period
    let row_start = optional_date(row, "period_start");
    let row_end = optional_date(row, "period_end");
    let period = match (&row_start, &row_end) {
        (Some(start), Some(end)) => PsurPeriod {
            period_start: start.clone(),
            period_end: end.clone(),
        },
        _ => ctx.psur_period.clone(),
    };

    let payload = EvidencePayload::Sales(SalesPayload {
        device_code,
        region: resolve_string(row, "region"),
        quantity,
        period_start: Some(period.period_start.clone()),
        period_end: Some(period.period_end.clone()),
        distribution_channel: resolve_string(row, "distribution_channel"),
    });

    let atom = build_atom(EvidenceType::SalesVolume, payload, period, ctx, &errors);
    (atom, errors)
}
