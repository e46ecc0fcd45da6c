//! Evidence payload records, one per evidence type.
//!
//! The payload is a closed union: every evidence type this crate normalizes
//! has a typed record, and anything else on the wire lands in `Unknown` so a
//! consumer that does not recognize the type can still carry it through.
//! Optional fields serialize as explicit `null` (never dropped keys) so the
//! canonical hash serialization sees a stable key set.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::enums::Severity;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SalesPayload {
    pub device_code: Option<String>,
    pub region: Option<String>,
    pub quantity: Option<f64>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub distribution_channel: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ComplaintPayload {
    pub complaint_id: Option<String>,
    pub device_code: Option<String>,
    pub complaint_date: Option<String>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub complaint_type: Option<String>,
    pub region: Option<String>,
    pub status: Option<String>,
    pub imdrf_code: Option<String>,
    pub is_negative_evidence: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct IncidentPayload {
    pub incident_id: Option<String>,
    pub device_code: Option<String>,
    pub incident_date: Option<String>,
    pub description: Option<String>,
    pub imdrf_code: Option<String>,
    pub severity: Option<Severity>,
    pub outcome: Option<String>,
    pub reportable: Option<bool>,
    pub region: Option<String>,
    pub is_negative_evidence: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FscaPayload {
    pub fsca_id: Option<String>,
    pub device_code: Option<String>,
    pub action_type: Option<String>,
    pub initiated_date: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub regions_affected: Option<String>,
    pub is_negative_evidence: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CapaPayload {
    pub capa_id: Option<String>,
    pub device_code: Option<String>,
    pub opened_date: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub closed_date: Option<String>,
    pub root_cause: Option<String>,
    pub effectiveness_verified: Option<bool>,
    pub is_negative_evidence: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LiteraturePayload {
    pub reference_id: Option<String>,
    pub title: Option<String>,
    pub authors: Option<String>,
    pub source: Option<String>,
    pub publication_date: Option<String>,
    pub summary: Option<String>,
    pub safety_relevant: Option<bool>,
}

/// Closed union over evidence payload records.
#[derive(Debug, Clone, PartialEq)]
pub enum EvidencePayload {
    Sales(SalesPayload),
    Complaint(ComplaintPayload),
    Incident(IncidentPayload),
    Fsca(FscaPayload),
    Capa(CapaPayload),
    Literature(LiteraturePayload),
    /// Forward-compatibility carrier for types this crate does not normalize.
    Unknown { evidence_type: String, raw: Value },
}

impl EvidencePayload {
    pub fn evidence_type_str(&self) -> &str {
        match self {
            Self::Sales(_) => "sales_volume",
            Self::Complaint(_) => "complaint_record",
            Self::Incident(_) => "serious_incident_record",
            Self::Fsca(_) => "fsca_record",
            Self::Capa(_) => "capa_record",
            Self::Literature(_) => "literature_record",
            Self::Unknown { evidence_type, .. } => evidence_type,
        }
    }

    /// Wire form: the inner record's fields plus an `evidence_type` tag key.
    pub fn to_value(&self) -> Value {
        let mut obj = match self {
            Self::Sales(p) => serde_json::to_value(p),
            Self::Complaint(p) => serde_json::to_value(p),
            Self::Incident(p) => serde_json::to_value(p),
            Self::Fsca(p) => serde_json::to_value(p),
            Self::Capa(p) => serde_json::to_value(p),
            Self::Literature(p) => serde_json::to_value(p),
            Self::Unknown { raw, .. } => Ok(raw.clone()),
        }
        // Serialization of plain data records cannot fail
        .unwrap_or(Value::Null);

        if let Value::Object(ref mut map) = obj {
            map.insert(
                "evidence_type".to_string(),
                Value::String(self.evidence_type_str().to_string()),
            );
        }
        obj
    }

    /// Parse a wire object back into the union, routing on the
    /// `evidence_type` tag. Unrecognized or untyped objects land in
    /// `Unknown` rather than failing.
    pub fn from_value(value: Value) -> Self {
        let tag = value
            .get("evidence_type")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        let parsed = match tag.as_str() {
            "sales_volume" => serde_json::from_value(value.clone()).map(Self::Sales).ok(),
            "complaint_record" => serde_json::from_value(value.clone())
                .map(Self::Complaint)
                .ok(),
            "serious_incident_record" => serde_json::from_value(value.clone())
                .map(Self::Incident)
                .ok(),
            "fsca_record" => serde_json::from_value(value.clone()).map(Self::Fsca).ok(),
            "capa_record" => serde_json::from_value(value.clone()).map(Self::Capa).ok(),
            "literature_record" => serde_json::from_value(value.clone())
                .map(Self::Literature)
                .ok(),
            _ => None,
        };

        parsed.unwrap_or(Self::Unknown {
            evidence_type: tag,
            raw: value,
        })
    }
}

impl Serialize for EvidencePayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EvidencePayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complaint_payload_round_trips_through_wire_form() {
        let payload = EvidencePayload::Complaint(ComplaintPayload {
            complaint_id: Some("C-001".into()),
            device_code: Some("DEV-9".into()),
            complaint_date: Some("2024-03-01".into()),
            description: Some("Device alarm failure".into()),
            severity: Some(Severity::High),
            ..Default::default()
        });

        let value = payload.to_value();
        assert_eq!(value["evidence_type"], "complaint_record");
        assert_eq!(value["complaint_id"], "C-001");
        // Optional fields present as explicit null, not dropped
        assert!(value.as_object().unwrap().contains_key("region"));
        assert_eq!(value["region"], Value::Null);

        let back = EvidencePayload::from_value(value);
        assert_eq!(back, payload);
    }

    #[test]
    fn unknown_evidence_type_is_carried_not_rejected() {
        let value = serde_json::json!({
            "evidence_type": "trend_report",
            "signal": "elevated",
        });

        let payload = EvidencePayload::from_value(value.clone());
        match &payload {
            EvidencePayload::Unknown { evidence_type, raw } => {
                assert_eq!(evidence_type, "trend_report");
                assert_eq!(raw["signal"], "elevated");
            }
            other => panic!("Expected Unknown, got {other:?}"),
        }
        assert_eq!(payload.to_value()["evidence_type"], "trend_report");
    }

    #[test]
    fn missing_tag_lands_in_unknown() {
        let payload = EvidencePayload::from_value(serde_json::json!({"a": 1}));
        assert!(matches!(payload, EvidencePayload::Unknown { .. }));
    }

    #[test]
    fn serde_round_trip_preserves_variant() {
        let payload = EvidencePayload::Sales(SalesPayload {
            device_code: Some("DEV-1".into()),
            region: Some("eu".into()),
            quantity: Some(1200.0),
            ..Default::default()
        });

        let json = serde_json::to_string(&payload).unwrap();
        let back: EvidencePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }
}
