//! Record adapters for the fixed ingestion resources.
//!
//! The knowledge base is a small set of JSON files with five known record
//! shapes: FAQ entries, service categories, programs, one organization
//! profile, and generic tabular rows converted from spreadsheets. Each
//! shape is a variant of the closed [`Record`] enum; adapter dispatch is a
//! pattern match on the variant, decoupled from file naming (the resource
//! manifest in the app crate maps filenames to a [`RecordKind`] once).
//!
//! [`Record::flatten`] normalizes a record into a `(text, metadata)` pair
//! ready for chunking. Unrecognized or empty records are skipped, never an
//! error: parsing is best-effort with empty-string defaults, because the
//! converted spreadsheets are full of missing cells and `"nan"` strings.

use serde::Deserialize;
use serde_json::Value;

use crate::models::Metadata;

/// The five record shapes the adapter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Faq,
    Service,
    Program,
    Organization,
    Tabular,
}

/// One question/answer pair.
#[derive(Debug, Clone, PartialEq)]
pub struct FaqRecord {
    pub question: String,
    pub answer: String,
}

/// One service category with its offerings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceRecord {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub short: String,
    #[serde(default)]
    pub offers: Vec<String>,
}

/// One program, with markup-bearing description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

/// Street address of the organization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub postal_code: String,
}

/// Opening hours of the organization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hours {
    #[serde(default)]
    pub monday_friday: String,
}

/// The single composite organization profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrgRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mission: String,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub hours: Option<Hours>,
    #[serde(default)]
    pub emails: serde_json::Map<String, Value>,
}

/// A parsed knowledge-base record.
#[derive(Debug, Clone)]
pub enum Record {
    Faq(FaqRecord),
    Service(ServiceRecord),
    Program(ProgramRecord),
    Organization(OrgRecord),
    Tabular(serde_json::Map<String, Value>),
}

/// Parse a JSON document into records of the given kind.
///
/// FAQ, service, program, and tabular resources are arrays; the
/// organization resource is a single object. Entries that are not objects,
/// or that fail to deserialize, are skipped.
pub fn parse_records(kind: RecordKind, data: &Value) -> Vec<Record> {
    match kind {
        RecordKind::Organization => {
            if data.is_object() {
                match serde_json::from_value::<OrgRecord>(data.clone()) {
                    Ok(org) => vec![Record::Organization(org)],
                    Err(_) => Vec::new(),
                }
            } else {
                Vec::new()
            }
        }
        _ => {
            let items = match data.as_array() {
                Some(items) => items,
                None => return Vec::new(),
            };
            items
                .iter()
                .filter_map(|item| parse_one(kind, item))
                .collect()
        }
    }
}

fn parse_one(kind: RecordKind, item: &Value) -> Option<Record> {
    let obj = item.as_object()?;
    match kind {
        RecordKind::Faq => Some(Record::Faq(FaqRecord {
            // Spreadsheet conversions emit "Unnamed: N" column headers.
            question: field_str(obj, &["q", "question", "Unnamed: 0"]),
            answer: field_str(obj, &["a", "answer", "Unnamed: 1"]),
        })),
        RecordKind::Service => serde_json::from_value(item.clone())
            .ok()
            .map(Record::Service),
        RecordKind::Program => serde_json::from_value(item.clone())
            .ok()
            .map(Record::Program),
        RecordKind::Tabular => Some(Record::Tabular(obj.clone())),
        RecordKind::Organization => None,
    }
}

/// First non-empty string value among the candidate keys, coercing
/// non-string scalars through their display form.
fn field_str(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> String {
    for key in keys {
        if let Some(v) = obj.get(*key) {
            let s = scalar_to_string(v);
            if !s.is_empty() {
                return s;
            }
        }
    }
    String::new()
}

fn scalar_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

impl Record {
    /// Flatten a record into a `(text, metadata)` pair for chunking.
    ///
    /// Returns `None` for records that carry no usable text (e.g. a
    /// tabular row of empty and `"nan"` cells).
    pub fn flatten(&self, source: &str) -> Option<(String, Metadata)> {
        match self {
            Record::Faq(faq) => {
                let text = format!("Question: {}\nAnswer: {}", faq.question, faq.answer);
                let mut meta = base_metadata(source, "faq");
                meta.insert("question".into(), faq.question.clone().into());
                meta.insert("answer".into(), faq.answer.clone().into());
                Some((text, meta))
            }
            Record::Service(service) => {
                let mut text = format!(
                    "Service Category: {}\nDescription: {}\n",
                    service.category, service.short
                );
                if !service.offers.is_empty() {
                    text.push_str("Offerings:\n");
                    let bullets: Vec<String> = service
                        .offers
                        .iter()
                        .map(|offer| format!("• {offer}"))
                        .collect();
                    text.push_str(&bullets.join("\n"));
                }
                let mut meta = base_metadata(source, "service");
                meta.insert("category".into(), service.category.clone().into());
                Some((text, meta))
            }
            Record::Program(program) => {
                let description = strip_tags(&program.description);
                let text = format!(
                    "Program: {}\nCategory: {}\nDescription: {}",
                    program.name, program.category, description
                );
                let mut meta = base_metadata(source, "program");
                meta.insert("name".into(), program.name.clone().into());
                meta.insert("category".into(), program.category.clone().into());
                Some((text, meta))
            }
            Record::Organization(org) => {
                let mut text = format!("Organization: {}\n", org.name);
                text.push_str(&format!("Mission: {}\n", org.mission));
                if let Some(address) = &org.address {
                    text.push_str(&format!(
                        "Address: {}, {}, {} {}\n",
                        address.street, address.city, address.province, address.postal_code
                    ));
                }
                if let Some(hours) = &org.hours {
                    text.push_str(&format!("Hours: {}\n", hours.monday_friday));
                }
                if !org.emails.is_empty() {
                    let pairs: Vec<String> = org
                        .emails
                        .iter()
                        .map(|(k, v)| format!("{k}: {}", scalar_to_string(v)))
                        .collect();
                    text.push_str(&format!("Emails: {}\n", pairs.join(", ")));
                }
                Some((text, base_metadata(source, "organization")))
            }
            Record::Tabular(row) => {
                let parts: Vec<String> = row
                    .values()
                    .map(scalar_to_string)
                    .filter(|s| !s.is_empty() && s != "nan")
                    .collect();
                let text = parts.join(" ");
                if text.trim().is_empty() {
                    None
                } else {
                    Some((text, base_metadata(source, "converted_data")))
                }
            }
        }
    }
}

fn base_metadata(source: &str, doc_type: &str) -> Metadata {
    let mut meta = Metadata::new();
    meta.insert("source".into(), source.into());
    meta.insert("type".into(), doc_type.into());
    meta
}

/// Remove markup tags: `<` followed by one or more non-`<` characters and
/// a closing `>`. Non-matching angle brackets are left in place.
pub fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(|c| c == '<' || c == '>') {
            Some(pos) if pos > 0 && after[pos..].starts_with('>') => {
                rest = &after[pos + 1..];
            }
            _ => {
                out.push('<');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_faq_flatten() {
        let records = parse_records(
            RecordKind::Faq,
            &json!([{"q": "How do I book an appointment?", "a": "Call our front desk."}]),
        );
        assert_eq!(records.len(), 1);
        let (text, meta) = records[0].flatten("faqs.json").unwrap();
        assert_eq!(
            text,
            "Question: How do I book an appointment?\nAnswer: Call our front desk."
        );
        assert_eq!(meta.get("type").unwrap(), "faq");
        assert_eq!(meta.get("source").unwrap(), "faqs.json");
        assert_eq!(meta.get("question").unwrap(), "How do I book an appointment?");
    }

    #[test]
    fn test_faq_unnamed_columns() {
        let records = parse_records(
            RecordKind::Faq,
            &json!([{"Unnamed: 0": "What is intake?", "Unnamed: 1": "Your first visit."}]),
        );
        let (text, _) = records[0].flatten("faq_converted.json").unwrap();
        assert!(text.starts_with("Question: What is intake?"));
        assert!(text.contains("Answer: Your first visit."));
    }

    #[test]
    fn test_service_flatten_with_offers() {
        let records = parse_records(
            RecordKind::Service,
            &json!([{
                "category": "Housing",
                "short": "Help finding a home",
                "offers": ["Rental search", "Landlord mediation"]
            }]),
        );
        let (text, meta) = records[0].flatten("services.json").unwrap();
        assert!(text.starts_with("Service Category: Housing\nDescription: Help finding a home\n"));
        assert!(text.contains("Offerings:\n• Rental search\n• Landlord mediation"));
        assert_eq!(meta.get("category").unwrap(), "Housing");
    }

    #[test]
    fn test_service_without_offers_has_no_offerings_block() {
        let records = parse_records(
            RecordKind::Service,
            &json!([{"category": "Legal", "short": "Free clinics"}]),
        );
        let (text, _) = records[0].flatten("services.json").unwrap();
        assert!(!text.contains("Offerings"));
    }

    #[test]
    fn test_program_markup_stripped() {
        let records = parse_records(
            RecordKind::Program,
            &json!([{
                "name": "Youth Circle",
                "category": "Youth",
                "description": "<p>Weekly <b>drop-in</b> group.</p>"
            }]),
        );
        let (text, meta) = records[0].flatten("programs.json").unwrap();
        assert!(text.contains("Description: Weekly drop-in group."));
        assert!(!text.contains('<'));
        assert_eq!(meta.get("name").unwrap(), "Youth Circle");
    }

    #[test]
    fn test_organization_flatten() {
        let records = parse_records(
            RecordKind::Organization,
            &json!({
                "name": "Harborline Family Services",
                "mission": "Supporting newcomers",
                "address": {"street": "12 Pier Ave", "city": "Toronto", "province": "ON", "postal_code": "M5V 1A1"},
                "hours": {"monday_friday": "Monday-Friday 9am-5pm"},
                "emails": {"general": "info@harborline.org"}
            }),
        );
        assert_eq!(records.len(), 1);
        let (text, meta) = records[0].flatten("org.json").unwrap();
        assert!(text.contains("Organization: Harborline Family Services"));
        assert!(text.contains("Address: 12 Pier Ave, Toronto, ON M5V 1A1"));
        assert!(text.contains("Hours: Monday-Friday 9am-5pm"));
        assert!(text.contains("Emails: general: info@harborline.org"));
        assert_eq!(meta.get("type").unwrap(), "organization");
    }

    #[test]
    fn test_tabular_filters_nan_and_null() {
        let records = parse_records(
            RecordKind::Tabular,
            &json!([{"a": "keep me", "b": "nan", "c": null, "d": 42}]),
        );
        let (text, meta) = records[0].flatten("contacts.json").unwrap();
        assert!(text.contains("keep me"));
        assert!(text.contains("42"));
        assert!(!text.contains("nan"));
        assert_eq!(meta.get("type").unwrap(), "converted_data");
    }

    #[test]
    fn test_tabular_all_empty_row_skipped() {
        let records = parse_records(RecordKind::Tabular, &json!([{"a": "nan", "b": null}]));
        assert!(records[0].flatten("contacts.json").is_none());
    }

    #[test]
    fn test_non_array_input_yields_nothing() {
        assert!(parse_records(RecordKind::Faq, &json!({"q": "lone object"})).is_empty());
        assert!(parse_records(RecordKind::Organization, &json!([1, 2])).is_empty());
    }

    #[test]
    fn test_non_object_entries_skipped() {
        let records = parse_records(RecordKind::Faq, &json!(["just a string", {"q": "ok", "a": "yes"}]));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_tags("no markup"), "no markup");
        // the pattern is not markup-aware: any <...> span goes
        assert_eq!(strip_tags("a < b and c > d"), "a  d");
        // non-greedy: inner tag wins, dangling open bracket survives
        assert_eq!(strip_tags("<a<b>"), "<a");
        assert_eq!(strip_tags("trailing <"), "trailing <");
    }
}
