//! Evidara: evidence normalization and PSUR report rendering.
//!
//! The pipeline has two halves. Normalization turns heterogeneous tabular
//! safety records (sales, complaints, incidents, FSCAs, CAPAs, literature)
//! into canonical, content-addressed evidence atoms. Rendering walks a
//! declarative template of slots and maps the atom set onto tables and
//! narrative sections, producing an ordered list of markdown blocks.
//!
//! Both halves are pure, synchronous transformations: given the same rows
//! or the same atom set and template, the output is identical.

pub mod config;
pub mod models;
pub mod normalize;
pub mod render;
pub mod template_repo;

pub use models::{EvidenceAtom, EvidencePayload, EvidenceType, Template};
pub use normalize::{normalize_batch, normalize_row, RowContext};
pub use render::{assemble_document, CaseContext};
pub use template_repo::TemplateRepository;
