//! Canonical field resolution over arbitrarily-named spreadsheet columns.
//!
//! Upstream systems export the same data under wildly different headers
//! ("Complaint ID", "case_id", "Ticket_No", ...). Each canonical field
//! carries an ordered alias list; resolution is a case-insensitive scan
//! that returns the first non-null, non-empty value. This indirection is
//! what lets one normalizer accept any source without per-source config.

use serde_json::Value;

/// A raw tabular row as uploaded: arbitrary column names to cell values.
pub type RawRow = serde_json::Map<String, Value>;

/// Ordered aliases per canonical field. First alias is the canonical name
/// itself; order matters when a row carries several candidate columns.
fn aliases_for(canonical: &str) -> &'static [&'static str] {
    match canonical {
        "complaint_id" => &[
            "complaint_id",
            "complaintid",
            "complaint_no",
            "case_id",
            "ticket_id",
            "reference",
            "record_id",
            "id",
        ],
        "device_code" => &[
            "device_code",
            "devicecode",
            "device_id",
            "device",
            "product_code",
            "catalog_number",
            "model",
            "sku",
        ],
        "complaint_date" => &[
            "complaint_date",
            "date_received",
            "received_date",
            "reported_date",
            "event_date",
            "date",
        ],
        "description" => &[
            "description",
            "complaint_description",
            "event_description",
            "details",
            "narrative",
            "issue",
            "summary_text",
        ],
        "severity" => &["severity", "severity_level", "criticality", "priority"],
        "complaint_type" => &[
            "complaint_type",
            "issue_type",
            "problem_type",
            "category",
            "type",
        ],
        "region" => &[
            "region",
            "sales_region",
            "country",
            "market",
            "territory",
            "geography",
        ],
        "status" => &["status", "case_status", "state"],
        "imdrf_code" => &[
            "imdrf_code",
            "imdrf",
            "device_problem_code",
            "problem_code",
            "mdr_code",
        ],
        "quantity" => &[
            "quantity",
            "units_sold",
            "units",
            "sales_units",
            "unit_count",
            "qty",
            "volume",
        ],
        "period_start" => &["period_start", "period_from", "start_date", "from"],
        "period_end" => &["period_end", "period_to", "end_date", "to"],
        "distribution_channel" => &["distribution_channel", "sales_channel", "channel"],
        "incident_id" => &[
            "incident_id",
            "incident_no",
            "mir_id",
            "case_id",
            "reference",
            "id",
        ],
        "incident_date" => &[
            "incident_date",
            "date_of_event",
            "occurrence_date",
            "event_date",
            "date",
        ],
        "outcome" => &["outcome", "patient_outcome", "result"],
        "reportable" => &["reportable", "is_reportable", "reported_to_authority"],
        "fsca_id" => &[
            "fsca_id",
            "fsca_no",
            "action_id",
            "recall_id",
            "fsn_id",
            "reference",
            "id",
        ],
        "action_type" => &["action_type", "fsca_type", "recall_type", "action", "type"],
        "initiated_date" => &[
            "initiated_date",
            "date_initiated",
            "issue_date",
            "start_date",
            "date",
        ],
        "regions_affected" => &[
            "regions_affected",
            "affected_regions",
            "countries_affected",
            "markets",
            "scope",
        ],
        "capa_id" => &["capa_id", "capa_no", "capa_number", "reference", "id"],
        "opened_date" => &[
            "opened_date",
            "date_opened",
            "open_date",
            "created_date",
            "date",
        ],
        "closed_date" => &[
            "closed_date",
            "date_closed",
            "close_date",
            "completion_date",
        ],
        "root_cause" => &["root_cause", "root_cause_analysis", "cause"],
        "effectiveness_verified" => &[
            "effectiveness_verified",
            "effectiveness_check",
            "effective",
            "verified",
        ],
        "reference_id" => &["reference_id", "citation_id", "pmid", "doi", "ref", "id"],
        "title" => &["title", "article_title", "paper_title", "publication_title"],
        "authors" => &["authors", "author_list", "author"],
        "source" => &["source", "journal", "publication", "source_name"],
        "publication_date" => &[
            "publication_date",
            "pub_date",
            "published",
            "year",
            "date",
        ],
        "summary" => &["summary", "abstract", "relevance_summary", "findings", "notes"],
        "safety_relevant" => &["safety_relevant", "safety_signal", "signal", "relevant"],
        "is_negative_evidence" => &[
            "is_negative_evidence",
            "negative_evidence",
            "none_reported",
            "no_events",
            "confirmed_zero",
        ],
        _ => &[],
    }
}

/// Column-header comparison: case-insensitive, with spaces and hyphens
/// treated as underscores so "Complaint ID" matches "complaint_id".
fn keys_match(key: &str, alias: &str) -> bool {
    let normalize = |c: char| match c {
        ' ' | '-' => '_',
        other => other.to_ascii_lowercase(),
    };
    key.trim().chars().map(normalize).eq(alias.chars().map(normalize))
}

/// Resolve a canonical field against a raw row.
///
/// Aliases are tried in order; for each, row keys are matched with
/// [`keys_match`]. The first non-null value wins; empty or
/// whitespace-only strings count as absent.
pub fn resolve_field<'a>(row: &'a RawRow, canonical: &str) -> Option<&'a Value> {
    for alias in aliases_for(canonical) {
        for (key, value) in row {
            if !keys_match(key, alias) {
                continue;
            }
            if value.is_null() {
                continue;
            }
            if let Some(s) = value.as_str() {
                if s.trim().is_empty() {
                    continue;
                }
            }
            return Some(value);
        }
    }
    None
}

/// Resolve a canonical field to a trimmed string, if it holds text.
/// Numbers are rendered to their natural string form so id columns that
/// arrive numeric (e.g. ticket numbers) still resolve.
pub fn resolve_string(row: &RawRow, canonical: &str) -> Option<String> {
    match resolve_field(row, canonical)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn resolves_exact_canonical_name() {
        let row = row(&[("complaint_id", json!("C-1"))]);
        assert_eq!(resolve_string(&row, "complaint_id").unwrap(), "C-1");
    }

    #[test]
    fn resolves_alias_case_insensitively() {
        let row = row(&[("Ticket_ID", json!("T-99"))]);
        assert_eq!(resolve_string(&row, "complaint_id").unwrap(), "T-99");
    }

    #[test]
    fn spreadsheet_headers_with_spaces_resolve() {
        let row = row(&[
            ("Complaint ID", json!("C-7")),
            ("Date Received", json!("2024-03-01")),
        ]);
        assert_eq!(resolve_string(&row, "complaint_id").unwrap(), "C-7");
        assert_eq!(resolve_string(&row, "complaint_date").unwrap(), "2024-03-01");
    }

    #[test]
    fn skips_null_and_empty_values() {
        let row = row(&[
            ("complaint_id", Value::Null),
            ("case_id", json!("   ")),
            ("reference", json!("REF-3")),
        ]);
        assert_eq!(resolve_string(&row, "complaint_id").unwrap(), "REF-3");
    }

    #[test]
    fn alias_order_beats_row_order() {
        // "case_id" outranks the generic "id" alias regardless of row layout
        let row = row(&[("id", json!("generic")), ("case_id", json!("specific"))]);
        assert_eq!(resolve_string(&row, "complaint_id").unwrap(), "specific");
    }

    #[test]
    fn unknown_canonical_field_resolves_nothing() {
        let row = row(&[("anything", json!("x"))]);
        assert!(resolve_field(&row, "not_a_field").is_none());
    }

    #[test]
    fn numeric_id_columns_resolve_as_strings() {
        let row = row(&[("Complaint_No", json!(10442))]);
        assert_eq!(resolve_string(&row, "complaint_id").unwrap(), "10442");
    }

    #[test]
    fn region_resolves_from_country_column() {
        let row = row(&[("Country", json!("Germany"))]);
        assert_eq!(resolve_string(&row, "region").unwrap(), "Germany");
    }
}
