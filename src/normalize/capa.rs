//! Corrective and preventive action (CAPA) normalizer.

use crate::models::{CapaPayload, EvidenceAtom, EvidencePayload, EvidenceType};

use super::fields::RawRow;
use super::{
    build_atom, device_code_or_context, optional_bool, optional_date, optional_slug,
    required_date, required_string, resolve_string, RowContext,
};

/// Required: capa_id, device_code, opened_date, description.
pub fn normalize_capa_row(row: &RawRow, ctx: &RowContext) -> (EvidenceAtom, Vec<String>) {
    let mut errors = Vec::new();

    let capa_id = required_string(row, "capa_id", &mut errors);
    let device_code = device_code_or_context(row, ctx, &mut errors);
    let opened_date = required_date(row, "opened_date", &mut errors);
    let description = required_string(row, "description", &mut errors);

    let payload = EvidencePayload::Capa(CapaPayload {
        capa_id,
        device_code,
        opened_date,
        description,
        status: optional_slug(row, "status"),
        closed_date: optional_date(row, "closed_date"),
        root_cause: resolve_string(row, "root_cause"),
        effectiveness_verified: optional_bool(row, "effectiveness_verified"),
        is_negative_evidence: optional_bool(row, "is_negative_evidence"),
    });

    let atom = build_atom(
        EvidenceType::CapaRecord,
        payload,
        ctx.psur_period.clone(),
        ctx,
        &errors,
    );
    (atom, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AtomStatus;
    use crate::normalize::tests::test_context;
    use serde_json::json;

    fn row(value: serde_json::Value) -> RawRow {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn full_capa_row_normalizes() {
        let row = row(json!({
            "CAPA_No": "CAPA-31",
            "device_code": "DEV-100",
            "Date Opened": "2024-02-14",
            "Description": "Supplier seal material change",
            "Status": "Closed",
            "Date Closed": "2024-09-30",
            "Effectiveness Check": "yes",
        }));

        let (atom, errors) = normalize_capa_row(&row, &test_context());
        assert!(errors.is_empty());
        assert_eq!(atom.status, AtomStatus::Valid);

        match &atom.payload {
            EvidencePayload::Capa(p) => {
                assert_eq!(p.capa_id.as_deref(), Some("CAPA-31"));
                assert_eq!(p.status.as_deref(), Some("closed"));
                assert_eq!(p.closed_date.as_deref(), Some("2024-09-30"));
                assert_eq!(p.effectiveness_verified, Some(true));
            }
            other => panic!("Wrong payload variant: {other:?}"),
        }
    }

    #[test]
    fn open_capa_has_no_closed_date() {
        let row = row(json!({
            "capa_id": "CAPA-32",
            "device_code": "DEV-100",
            "opened_date": "2024-06-01",
            "description": "Labeling review",
            "status": "Open",
        }));
        let (atom, errors) = normalize_capa_row(&row, &test_context());
        assert!(errors.is_empty());
        match &atom.payload {
            EvidencePayload::Capa(p) => assert_eq!(p.closed_date, None),
            other => panic!("Wrong payload variant: {other:?}"),
        }
    }

    #[test]
    fn missing_capa_fields_invalid() {
        let row = row(json!({"status": "open"}));
        let (atom, errors) = normalize_capa_row(&row, &test_context());
        assert_eq!(atom.status, AtomStatus::Invalid);
        assert!(errors.iter().any(|e| e.contains("capa_id")));
        assert!(errors.iter().any(|e| e.contains("opened_date")));
        assert!(errors.iter().any(|e| e.contains("description")));
    }
}
