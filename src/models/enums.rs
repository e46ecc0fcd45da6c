use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $s)]
                $variant
            ),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(EvidenceType {
    SalesVolume => "sales_volume",
    ComplaintRecord => "complaint_record",
    SeriousIncidentRecord => "serious_incident_record",
    FscaRecord => "fsca_record",
    CapaRecord => "capa_record",
    LiteratureRecord => "literature_record",
});

impl EvidenceType {
    /// All known evidence types, in the order report appendices list them.
    pub fn all() -> &'static [EvidenceType] {
        &[
            EvidenceType::SalesVolume,
            EvidenceType::ComplaintRecord,
            EvidenceType::SeriousIncidentRecord,
            EvidenceType::FscaRecord,
            EvidenceType::CapaRecord,
            EvidenceType::LiteratureRecord,
        ]
    }
}

str_enum!(AtomStatus {
    Valid => "valid",
    Invalid => "invalid",
    Superseded => "superseded",
});

str_enum!(Severity {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

str_enum!(SlotKind {
    Narrative => "NARRATIVE",
    Table => "TABLE",
    Admin => "ADMIN",
    Metric => "METRIC",
});

str_enum!(RenderAs {
    Markdown => "markdown",
    Table => "table",
    KeyValue => "key_value",
});
