//! The evidence atom: a canonical, content-addressed, immutable record
//! derived from one source row of safety or compliance data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{AtomStatus, EvidenceType};
use super::payload::EvidencePayload;

/// Reporting window an atom belongs to. ISO `YYYY-MM-DD` bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PsurPeriod {
    pub period_start: String,
    pub period_end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceRef {
    pub device_code: String,
    pub device_name: Option<String>,
    pub udi_di: Option<String>,
}

/// Full lineage back to the originating file and upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provenance {
    pub source_system: String,
    pub source_file: String,
    pub source_file_hash: String,
    pub upload_id: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceAtom {
    pub atom_id: String,
    pub evidence_type: EvidenceType,
    pub version: u32,
    pub status: AtomStatus,
    pub psur_period: PsurPeriod,
    pub device_ref: DeviceRef,
    pub provenance: Provenance,
    /// SHA-256 of the canonical payload. `None` only on the legacy path
    /// where the atom id was randomly generated.
    pub content_hash: Option<String>,
    pub payload: EvidencePayload,
    pub created_at: DateTime<Utc>,
}

impl EvidenceAtom {
    /// True when the payload explicitly asserts zero occurrences for the
    /// period. Distinct from absence of data: this is uploaded evidence
    /// that nothing happened.
    pub fn is_negative_evidence(&self) -> bool {
        match &self.payload {
            EvidencePayload::Complaint(p) => p.is_negative_evidence.unwrap_or(false),
            EvidencePayload::Incident(p) => p.is_negative_evidence.unwrap_or(false),
            EvidencePayload::Fsca(p) => p.is_negative_evidence.unwrap_or(false),
            EvidencePayload::Capa(p) => p.is_negative_evidence.unwrap_or(false),
            EvidencePayload::Sales(_) | EvidencePayload::Literature(_) => false,
            EvidencePayload::Unknown { raw, .. } => raw
                .get("is_negative_evidence")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        }
    }
}
