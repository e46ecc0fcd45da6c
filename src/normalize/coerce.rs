//! Type coercers for raw cell values.
//!
//! Every function here degrades to `None` on unparseable input. Nothing in
//! the normalization path panics on bad data; a missing required value
//! becomes a validation error string, not an exception.

use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::models::Severity;

/// Spreadsheet serial epoch (the 1900 date system, Lotus-compatible).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Largest serial accepted: 9999-12-31 in the 1900 date system.
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Coerce a cell to an ISO `YYYY-MM-DD` date string.
///
/// Accepts ISO strings (pass-through), `M/D/YYYY`, a handful of common
/// export formats, and numeric spreadsheet date serials counted from
/// 1899-12-30.
pub fn to_iso_date(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            // Numeric strings are treated as spreadsheet serials
            if let Ok(serial) = s.parse::<f64>() {
                return serial_to_iso(serial);
            }
            parse_date_string(s)
        }
        Value::Number(n) => serial_to_iso(n.as_f64()?),
        _ => None,
    }
}

fn parse_date_string(s: &str) -> Option<String> {
    // ISO pass-through, including datetime prefixes like "2024-03-01T09:00:00"
    if s.len() >= 10 {
        if let Ok(d) = NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d") {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }

    const FORMATS: &[&str] = &[
        "%m/%d/%Y", // US export: 3/7/2024
        "%Y/%m/%d",
        "%d.%m.%Y", // continental European export
        "%d-%b-%Y", // 07-Mar-2024
        "%d %b %Y",
        "%B %d, %Y", // March 7, 2024
    ];

    for format in FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }
    None
}

fn serial_to_iso(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    let date = epoch.checked_add_signed(Duration::days(serial.trunc() as i64))?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// Coerce a cell to a boolean. Numbers are `!= 0`; recognized string
/// spellings are case-insensitive and trimmed; anything else is `None`.
pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64()? != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Map free-text or numeric severity vocabularies onto the 4-level enum.
/// Unrecognized input stays unmapped; the field is omitted, never defaulted.
pub fn normalize_severity(value: &Value) -> Option<Severity> {
    let text = match value {
        Value::String(s) => s.trim().to_lowercase(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    match text.as_str() {
        "1" | "low" | "minor" | "negligible" | "cosmetic" => Some(Severity::Low),
        "2" | "medium" | "moderate" => Some(Severity::Medium),
        "3" | "high" | "major" | "serious" | "significant" => Some(Severity::High),
        "4" | "critical" | "severe" | "life-threatening" | "life_threatening" | "death" => {
            Some(Severity::Critical)
        }
        _ => None,
    }
}

/// Generic slug normalization for free-text category fields: lowercase,
/// trim, collapse whitespace runs to underscores.
pub fn normalize_enum(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }
    let mut slug = String::with_capacity(s.len());
    let mut in_gap = false;
    for c in s.chars() {
        if c.is_whitespace() {
            in_gap = true;
        } else {
            if in_gap && !slug.is_empty() {
                slug.push('_');
            }
            in_gap = false;
            slug.push(c);
        }
    }
    Some(slug)
}

/// Parse a quantity cell: strips thousands separators and currency symbols
/// before the numeric parse. Negative quantities are rejected.
pub fn parse_quantity(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !matches!(c, ',' | '\'' | ' ' | '$' | '€' | '£' | '¥'))
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }?;

    if parsed.is_finite() && parsed >= 0.0 {
        Some(parsed)
    } else {
        None
    }
}
