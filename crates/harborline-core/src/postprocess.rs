//! Response post-processing and fallback extraction.
//!
//! Generated text arrives with two recurring defects: markup the model was
//! told not to emit (stray tag attributes rendered as literal text, broken
//! tag remnants around URLs, dangling angle brackets) and logical newlines
//! the display layer expects as `<br>` markers. [`postprocess`] runs:
//!
//! 1. strip markup artifacts, leaving `<br>` markers intact,
//! 2. convert newlines to `<br>`,
//! 3. strip a second time — the model sometimes echoes an
//!    already-substituted `<br>` wrapped in further malformed markup.
//!
//! Running [`postprocess`] on already-clean text is a no-op, so the service
//! can apply it unconditionally.
//!
//! When generation fails outright, [`extract_fallback`] pulls a usable
//! answer straight out of the top retrieved chunk so the caller always
//! gets a grounded, non-empty response.

use crate::messages;
use crate::models::{ContactInfo, Language, RetrievedDoc};

/// Clean a raw model response for display. Idempotent.
pub fn postprocess(raw: &str) -> String {
    let cleaned = strip_markup(raw);
    let broken = cleaned.replace("\r\n", "\n").replace('\n', "<br>");
    strip_markup(&broken)
}

/// Remove markup artifacts while preserving `<br>` line-break markers.
pub fn strip_markup(text: &str) -> String {
    remove_angle_artifacts(&remove_attr_runs(text))
}

/// Extract a grounded answer from the top retrieved chunk.
///
/// FAQ-shaped chunks yield the text after their `Answer:` marker; a bare
/// question fragment yields a localized contact referral; anything else is
/// returned as-is. Never returns an empty string for a non-empty chunk.
pub fn extract_fallback(doc: &RetrievedDoc, language: Language, contact: &ContactInfo) -> String {
    let text = doc.text.trim();

    if let Some(pos) = text.find("Answer:") {
        let answer = text[pos + "Answer:".len()..].trim();
        if !answer.is_empty() {
            return answer.to_string();
        }
        // Question with an empty answer cell — refer to the office.
        return messages::contact_referral(language, contact);
    }
    if text.contains("Question:") {
        return messages::contact_referral(language, contact);
    }
    text.to_string()
}

/// Remove `name="value"` attribute runs rendered as literal text, along
/// with the dangling `>` the broken tag leaves behind.
fn remove_attr_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while !rest.is_empty() {
        if let Some(len) = attr_run_len(rest) {
            rest = &rest[len..];
            loop {
                let trimmed = rest.trim_start();
                if let Some(next) = attr_run_len(trimmed) {
                    rest = &trimmed[next..];
                    continue;
                }
                rest = trimmed.strip_prefix('>').unwrap_or(trimmed);
                break;
            }
        } else {
            let ch = rest.chars().next().expect("non-empty");
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out
}

/// Length in bytes of an `ident="..."` attribute run at the start of `s`,
/// if one is present.
fn attr_run_len(s: &str) -> Option<usize> {
    let first = s.chars().next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    let mut end = first.len_utf8();
    for (i, c) in s.char_indices().skip(1) {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    let rest = &s[end..];
    if !rest.starts_with("=\"") {
        return None;
    }
    let close = rest[2..].find('"')?;
    Some(end + 2 + close + 1)
}

/// Drop remaining tags and stray angle brackets, keeping `<br>` markers.
fn remove_angle_artifacts(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while !rest.is_empty() {
        if let Some(after_br) = strip_br_prefix(rest) {
            out.push_str("<br>");
            rest = after_br;
            continue;
        }
        let ch = rest.chars().next().expect("non-empty");
        match ch {
            '<' => {
                let after = &rest[1..];
                match after.find(|c| c == '<' || c == '>') {
                    Some(pos) if pos > 0 && after[pos..].starts_with('>') => {
                        rest = &after[pos + 1..];
                    }
                    _ => rest = after,
                }
            }
            '>' => rest = &rest[1..],
            _ => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }
    out
}

/// Match a `<br>` marker (including `<br/>` and `<br />` spellings) at the
/// start of `s`, returning the remainder. The output is normalized to
/// `<br>`.
fn strip_br_prefix(s: &str) -> Option<&str> {
    for pat in ["<br>", "<br/>", "<br />"] {
        if s.get(..pat.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(pat))
        {
            return Some(&s[pat.len()..]);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> RetrievedDoc {
        RetrievedDoc {
            text: text.to_string(),
            score: 0.9,
            source: "faqs.json".to_string(),
            doc_type: "faq".to_string(),
            metadata: serde_json::json!({}),
        }
    }

    #[test]
    fn test_clean_text_untouched() {
        let text = "We offer housing support. Call us any weekday.";
        assert_eq!(postprocess(text), text);
    }

    #[test]
    fn test_newlines_become_break_markers() {
        assert_eq!(postprocess("line one\nline two"), "line one<br>line two");
        assert_eq!(postprocess("a\r\nb"), "a<br>b");
    }

    #[test]
    fn test_attribute_artifacts_removed() {
        let raw = r#"Website: href="x" target="y">www.example.org"#;
        assert_eq!(postprocess(raw), "Website: www.example.org");
    }

    #[test]
    fn test_tags_stripped_but_br_kept() {
        assert_eq!(postprocess("<p>Hello</p><br>Bye"), "Hello<br>Bye");
        assert_eq!(postprocess("one<br/>two<BR>three"), "one<br>two<br>three");
    }

    #[test]
    fn test_stray_brackets_removed() {
        assert_eq!(postprocess("a > b"), "a  b");
        assert_eq!(postprocess("end with <"), "end with ");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "plain answer",
            "multi\nline\nanswer",
            r#"Website: href="x" target="y">www.example.org"#,
            "<p>tagged</p>\nwith <br> marker",
            "• bullet one\n• bullet two",
        ];
        for raw in samples {
            let once = postprocess(raw);
            assert_eq!(postprocess(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_fallback_extracts_answer_section() {
        let d = doc("Question: When are you open?\nAnswer: Monday-Friday 9am-5pm.");
        let out = extract_fallback(&d, Language::En, &ContactInfo::default());
        assert_eq!(out, "Monday-Friday 9am-5pm.");
    }

    #[test]
    fn test_fallback_bare_question_refers_to_contact() {
        let contact = ContactInfo::default();
        let d = doc("Question: When are you open?");
        let out = extract_fallback(&d, Language::En, &contact);
        assert!(out.contains(&contact.email));
    }

    #[test]
    fn test_fallback_empty_answer_refers_to_contact() {
        let contact = ContactInfo::default();
        let d = doc("Question: When are you open?\nAnswer:");
        let out = extract_fallback(&d, Language::En, &contact);
        assert!(out.contains(&contact.phone));
    }

    #[test]
    fn test_fallback_plain_chunk_returned_as_is() {
        let d = doc("Organization: Harborline\nHours: 9am-5pm");
        let out = extract_fallback(&d, Language::En, &ContactInfo::default());
        assert_eq!(out, "Organization: Harborline\nHours: 9am-5pm");
    }
}
