//! Declarative report templates: an ordered list of named slots, each with
//! evidence requirements and a render directive.

use serde::{Deserialize, Serialize};

use super::enums::{RenderAs, SlotKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub template_id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub jurisdiction_scope: Vec<String>,
    pub slots: Vec<SlotDefinition>,
    /// slot_id -> regulatory obligation ids it satisfies. Informational;
    /// rendering works without it.
    #[serde(default)]
    pub mapping: std::collections::BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotDefinition {
    pub slot_id: String,
    pub title: String,
    /// Hierarchical grouping, e.g. "3. Safety Data / 3.1 Complaints".
    pub section_path: String,
    pub slot_kind: SlotKind,
    #[serde(default)]
    pub required: bool,
    pub evidence_requirements: EvidenceRequirements,
    #[serde(default)]
    pub output_requirements: OutputRequirements,
}

/// Canonical object form of a slot's evidence requirements.
///
/// Older templates carry a bare array of type names instead; that legacy
/// shape is accepted during deserialization only and migrated here, so the
/// rest of the crate never branches on it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EvidenceRequirements {
    pub required_types: Vec<String>,
    pub min_atoms: u32,
    pub allow_empty_with_justification: bool,
}

impl Default for EvidenceRequirements {
    fn default() -> Self {
        Self {
            required_types: Vec::new(),
            min_atoms: 0,
            allow_empty_with_justification: true,
        }
    }
}

impl EvidenceRequirements {
    pub fn from_types(types: &[&str]) -> Self {
        Self {
            required_types: types.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl<'de> Deserialize<'de> for EvidenceRequirements {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            // Legacy array form: just the required type names
            Types(Vec<String>),
            Object {
                #[serde(default)]
                required_types: Vec<String>,
                #[serde(default)]
                min_atoms: u32,
                #[serde(default = "default_true")]
                allow_empty_with_justification: bool,
            },
        }

        fn default_true() -> bool {
            true
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Types(required_types) => EvidenceRequirements {
                required_types,
                ..Default::default()
            },
            Wire::Object {
                required_types,
                min_atoms,
                allow_empty_with_justification,
            } => EvidenceRequirements {
                required_types,
                min_atoms,
                allow_empty_with_justification,
            },
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputRequirements {
    #[serde(default)]
    pub render_as: Option<RenderAs>,
    #[serde(default)]
    pub table_schema: Option<TableSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<String>,
}

/// Pre-rendered slot content produced upstream (wizard, reviewer edits).
/// When present for a slot, the narrative dispatcher emits it verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotProposal {
    pub slot_id: String,
    pub rendered_text: String,
    #[serde(default)]
    pub atom_ids: Vec<String>,
    #[serde(default)]
    pub obligation_ids: Vec<String>,
}
