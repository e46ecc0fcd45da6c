//! End-to-end pipeline driver: normalize upload batches from a JSON file,
//! render a report against a template, write the markdown to disk.
//!
//! Usage: evidara <batches.json> <template.json> <output.md>

use std::process::ExitCode;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use evidara::models::{DeviceRef, EvidenceType, PsurPeriod, Provenance, Template};
use evidara::normalize::{self, RawRow, RowContext};
use evidara::render::{assemble_document, CaseContext};

/// One upload batch: a set of raw rows plus the case context they share.
#[derive(Deserialize)]
struct UploadBatch {
    evidence_type: EvidenceType,
    device_ref: DeviceRef,
    psur_period: PsurPeriod,
    provenance: Provenance,
    rows: Vec<RawRow>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(evidara::config::default_log_filter())),
        )
        .init();

    tracing::info!("Evidara starting v{}", evidara::config::APP_VERSION);

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: evidara <batches.json> <template.json> <output.md>");
        return ExitCode::FAILURE;
    }

    match run(&args[1], &args[2], &args[3]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(batches_path: &str, template_path: &str, output_path: &str) -> Result<(), String> {
    let batches: Vec<UploadBatch> = read_json(batches_path)?;
    let template: Template = read_json(template_path)?;

    let mut atoms = Vec::new();
    let mut case: Option<CaseContext> = None;

    for batch in &batches {
        let ctx = RowContext {
            device_ref: batch.device_ref.clone(),
            psur_period: batch.psur_period.clone(),
            provenance: batch.provenance.clone(),
        };
        if case.is_none() {
            case = Some(CaseContext {
                device_ref: batch.device_ref.clone(),
                psur_period: batch.psur_period.clone(),
            });
        }

        let result = normalize::normalize_batch(batch.evidence_type, &batch.rows, &ctx);
        for row_errors in &result.row_errors {
            tracing::warn!(
                row = row_errors.row_index,
                errors = ?row_errors.errors,
                "Row failed validation (kept as invalid atom)"
            );
        }
        atoms.extend(result.atoms);
    }

    let case = case.ok_or_else(|| format!("No upload batches in {batches_path}"))?;
    let atoms = normalize::dedup_atoms(atoms);
    tracing::info!(atoms = atoms.len(), "Atom set after dedup");

    let blocks = assemble_document(&template, &atoms, &case, &[])
        .map_err(|e| format!("Rendering failed: {e}"))?;

    std::fs::write(output_path, blocks.join("\n\n"))
        .map_err(|e| format!("Cannot write {output_path}: {e}"))?;

    tracing::info!(output = output_path, blocks = blocks.len(), "Report written");
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, String> {
    let data = std::fs::read_to_string(path).map_err(|e| format!("Cannot read {path}: {e}"))?;
    serde_json::from_str(&data).map_err(|e| format!("Invalid JSON in {path}: {e}"))
}
