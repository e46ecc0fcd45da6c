//! Literature search record normalizer.

use crate::models::{EvidenceAtom, EvidencePayload, EvidenceType, LiteraturePayload};

use super::fields::RawRow;
use super::{
    build_atom, optional_bool, optional_date, required_string, resolve_string, RowContext,
};

/// Required: title, source. Publication metadata is frequently incomplete
/// in search exports, so everything else stays optional.
pub fn normalize_literature_row(row: &RawRow, ctx: &RowContext) -> (EvidenceAtom, Vec<String>) {
    let mut errors = Vec::new();

    let title = required_string(row, "title", &mut errors);
    let source = required_string(row, "source", &mut errors);

    let payload = EvidencePayload::Literature(LiteraturePayload {
        reference_id: resolve_string(row, "reference_id"),
        title,
        authors: resolve_string(row, "authors"),
        source,
        publication_date: optional_date(row, "publication_date"),
        summary: resolve_string(row, "summary"),
        safety_relevant: optional_bool(row, "safety_relevant"),
    });

    let atom = build_atom(
        EvidenceType::LiteratureRecord,
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
    fn full_literature_row_normalizes() {
        let row = row(json!({
            "Article Title": "Infusion pump occlusion alarms: a systematic review",
            "Journal": "J Med Eng Saf",
            "Authors": "Keller M, Osei A",
            "PMID": "38120441",
            "Pub Date": "2024-04-15",
            "Abstract": "Review of occlusion alarm reliability across 14 pump models.",
            "Safety Signal": "no",
        }));

        let (atom, errors) = normalize_literature_row(&row, &test_context());
        assert!(errors.is_empty());
        assert_eq!(atom.status, AtomStatus::Valid);

        match &atom.payload {
            EvidencePayload::Literature(p) => {
                assert_eq!(p.reference_id.as_deref(), Some("38120441"));
                assert_eq!(p.source.as_deref(), Some("J Med Eng Saf"));
                assert_eq!(p.publication_date.as_deref(), Some("2024-04-15"));
                assert_eq!(p.safety_relevant, Some(false));
            }
            other => panic!("Wrong payload variant: {other:?}"),
        }
    }

    #[test]
    fn missing_title_and_source_invalid() {
        let row = row(json!({"authors": "Someone"}));
        let (atom, errors) = normalize_literature_row(&row, &test_context());
        assert_eq!(atom.status, AtomStatus::Invalid);
        assert!(errors.iter().any(|e| e.contains("title")));
        assert!(errors.iter().any(|e| e.contains("source")));
    }
}
