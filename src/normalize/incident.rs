//! Serious incident record normalizer.

use crate::models::{EvidenceAtom, EvidencePayload, EvidenceType, IncidentPayload};

use super::coerce;
use super::fields::RawRow;
use super::{
    build_atom, device_code_or_context, optional_bool, optional_slug, optional_value,
    required_date, required_string, resolve_string, RowContext,
};

/// Required: incident_id, device_code, incident_date, description.
pub fn normalize_incident_row(row: &RawRow, ctx: &RowContext) -> (EvidenceAtom, Vec<String>) {
    let mut errors = Vec::new();

    let incident_id = required_string(row, "incident_id", &mut errors);
    let device_code = device_code_or_context(row, ctx, &mut errors);
    let incident_date = required_date(row, "incident_date", &mut errors);
    let description = required_string(row, "description", &mut errors);

    let payload = EvidencePayload::Incident(IncidentPayload {
        incident_id,
        device_code,
        incident_date,
        description,
        imdrf_code: resolve_string(row, "imdrf_code"),
        severity: optional_value(row, "severity").and_then(coerce::normalize_severity),
        outcome: optional_slug(row, "outcome"),
        reportable: optional_bool(row, "reportable"),
        region: resolve_string(row, "region"),
        is_negative_evidence: optional_bool(row, "is_negative_evidence"),
    });

    let atom = build_atom(
        EvidenceType::SeriousIncidentRecord,
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
    use crate::models::{AtomStatus, Severity};
    use crate::normalize::tests::test_context;
    use serde_json::json;

    fn row(value: serde_json::Value) -> RawRow {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn full_incident_row_normalizes() {
        let row = row(json!({
            "MIR_ID": "INC-7",
            "device_code": "DEV-100",
            "Date of Event": "2024-05-20",
            "Event Description": "Patient over-infusion, hospitalization required",
            "IMDRF": "A0901",
            "Severity": "serious",
            "Reportable": "yes",
        }));

        let (atom, errors) = normalize_incident_row(&row, &test_context());
        assert!(errors.is_empty());
        assert_eq!(atom.status, AtomStatus::Valid);

        match &atom.payload {
            EvidencePayload::Incident(p) => {
                assert_eq!(p.incident_id.as_deref(), Some("INC-7"));
                assert_eq!(p.imdrf_code.as_deref(), Some("A0901"));
                assert_eq!(p.severity, Some(Severity::High));
                assert_eq!(p.reportable, Some(true));
            }
            other => panic!("Wrong payload variant: {other:?}"),
        }
    }

    #[test]
    fn negative_evidence_incident_row() {
        let row = row(json!({
            "incident_id": "NEG-2024",
            "device_code": "DEV-100",
            "incident_date": "2024-12-31",
            "description": "No serious incidents occurred during the period",
            "none_reported": true,
        }));
        let (atom, errors) = normalize_incident_row(&row, &test_context());
        assert!(errors.is_empty());
        assert!(atom.is_negative_evidence());
    }

    #[test]
    fn missing_incident_fields_invalid() {
        let row = row(json!({"outcome": "recovered"}));
        let (atom, errors) = normalize_incident_row(&row, &test_context());
        assert_eq!(atom.status, AtomStatus::Invalid);
        assert!(errors.iter().any(|e| e.contains("incident_id")));
        assert!(errors.iter().any(|e| e.contains("incident_date")));
    }
}
