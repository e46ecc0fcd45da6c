//! Report rendering: template slots in, ordered markdown blocks out.

pub mod assembler;
pub mod narrative;
pub mod slot_map;
pub mod tables;

pub use assembler::assemble_document;
pub use narrative::generate_narrative;
pub use slot_map::relevant_atoms;

use thiserror::Error;

use crate::models::{DeviceRef, PsurPeriod};

/// Case-level context the rendering stage needs for prose: which device,
/// which reporting window.
#[derive(Debug, Clone)]
pub struct CaseContext {
    pub device_ref: DeviceRef,
    pub psur_period: PsurPeriod,
}

/// Rendering errors are reserved for programmer-level misuse. Malformed
/// evidence degrades to placeholders and markers instead.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template {0} has no slots")]
    EmptyTemplate(String),
}
