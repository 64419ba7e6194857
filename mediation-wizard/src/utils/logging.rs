// Logging utilities
// Structured logging with JSON and human-readable formats

use log::Level;
use serde_json::json;
use std::collections::HashMap;

/// Mask sensitive data in logs
pub fn mask_sensitive(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }

    let visible = 4;
    let start: String = chars[..visible].iter().collect();
    let end: String = chars[chars.len() - visible..].iter().collect();

    format!("{}...{}", start, end)
}

/// Mask an email address, keeping the first character of the local part and the domain.
pub fn mask_email(email: &str) -> String {
    let e = email.trim();
    if e.is_empty() {
        return String::new();
    }
    match e.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        _ => "***".to_string(),
    }
}

/// Mask a phone number, keeping only the last two digits.
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return String::new();
    }
    if digits.len() <= 4 {
        return "***".to_string();
    }
    let tail: String = digits[digits.len() - 2..].iter().collect();
    format!("***{}", tail)
}

/// Mask a multipart field value by name. Fields that identify the complainant or the
/// organization are masked; everything else is left readable for troubleshooting.
pub fn mask_field(name: &str, value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    match name {
        "email" | "organization_email" => mask_email(value),
        "phone_number" | "organization_phone_number" => mask_phone(value),
        "first_name" | "last_name" | "organization_contact" | "organization_address" => {
            mask_sensitive(value)
        }
        _ => value.to_string(),
    }
}

/// Parse phase and step from log message
/// Extracts [PHASE: ...] and [STEP: ...] patterns
pub fn parse_log_metadata(message: &str) -> (Option<String>, Option<String>, String) {
    let (phase, cleaned_message) = extract_tag(message, "[PHASE:");
    let (step, cleaned_message) = extract_tag(&cleaned_message, "[STEP:");
    (phase, step, cleaned_message)
}

fn extract_tag(message: &str, tag: &str) -> (Option<String>, String) {
    let Some(start) = message.find(tag) else {
        return (None, message.to_string());
    };
    let Some(end) = message[start..].find(']') else {
        return (None, message.to_string());
    };
    let value = message[start + tag.len()..start + end].trim().to_string();
    let cleaned = format!("{} {}", &message[..start], &message[start + end + 1..])
        .trim()
        .to_string();
    (Some(value), cleaned)
}

/// Format log entry as JSON for structured logging
pub fn format_json_log(
    timestamp: &str,
    level: Level,
    target: &str,
    message: &str,
    phase: Option<&str>,
    step: Option<&str>,
    details: Option<&HashMap<String, serde_json::Value>>,
) -> String {
    let mut log_entry = json!({
        "timestamp": timestamp,
        "level": level.as_str(),
        "target": target,
        "message": message,
    });

    if let Some(phase) = phase {
        log_entry["phase"] = json!(phase);
    }

    if let Some(step) = step {
        log_entry["step"] = json!(step);
    }

    if let Some(details) = details {
        log_entry["details"] = json!(details);
    }

    serde_json::to_string(&log_entry).unwrap_or_else(|_| "{}".to_string())
}

/// Format log entry as human-readable text
pub fn format_human_readable_log(
    timestamp: &str,
    level: Level,
    target: &str,
    message: &str,
    phase: Option<&str>,
    step: Option<&str>,
) -> String {
    let mut log_line = format!("[{}] [{}]", timestamp, level.as_str());

    if let Some(phase) = phase {
        log_line.push_str(&format!(" [PHASE: {}]", phase));
    }

    if let Some(step) = step {
        log_line.push_str(&format!(" [STEP: {}]", step));
    }

    log_line.push_str(&format!(" [{}] {}", target, message));
    log_line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_log_metadata_extracts_phase_and_step() {
        let (phase, step, msg) =
            parse_log_metadata("[PHASE: wizard] [STEP: next] Moved to step 1");
        assert_eq!(phase.as_deref(), Some("wizard"));
        assert_eq!(step.as_deref(), Some("next"));
        assert_eq!(msg, "Moved to step 1");
    }

    #[test]
    fn parse_log_metadata_without_tags_is_unchanged() {
        let (phase, step, msg) = parse_log_metadata("plain message");
        assert!(phase.is_none());
        assert!(step.is_none());
        assert_eq!(msg, "plain message");
    }

    #[test]
    fn parse_log_metadata_ignores_unterminated_tag() {
        let (phase, _, msg) = parse_log_metadata("[PHASE: submit broken");
        assert!(phase.is_none());
        assert_eq!(msg, "[PHASE: submit broken");
    }

    #[test]
    fn json_log_carries_optional_fields() {
        let line = format_json_log(
            "2026-01-01T00:00:00Z",
            Level::Info,
            "mediation_wizard",
            "hello",
            Some("submit"),
            None,
            None,
        );
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["level"], "INFO");
        assert_eq!(v["phase"], "submit");
        assert!(v.get("step").is_none());
    }

    #[test]
    fn human_readable_log_includes_tags() {
        let line = format_human_readable_log(
            "2026-01-01 00:00:00.000",
            Level::Warn,
            "store",
            "corrupt session",
            Some("store"),
            Some("load"),
        );
        assert_eq!(
            line,
            "[2026-01-01 00:00:00.000] [WARN] [PHASE: store] [STEP: load] [store] corrupt session"
        );
    }

    #[test]
    fn mask_sensitive_short_values_fully_masked() {
        assert_eq!(mask_sensitive("Bill"), "***");
        assert_eq!(mask_sensitive("12345678"), "***");
    }

    #[test]
    fn mask_sensitive_long_values_partially_masked() {
        assert_eq!(mask_sensitive("abcdefghijklmnop"), "abcd...mnop");
        // multi-byte input must not panic on char boundaries
        assert_eq!(mask_sensitive("éééééééééé"), "éééé...éééé");
    }

    #[test]
    fn mask_email_keeps_domain_only() {
        assert_eq!(mask_email("bluebill@koena.net"), "b***@koena.net");
        assert_eq!(mask_email("not-an-email"), "***");
        assert_eq!(mask_email(""), "");
    }

    #[test]
    fn mask_phone_keeps_last_two_digits() {
        assert_eq!(mask_phone("+33612345678"), "***78");
        assert_eq!(mask_phone("123"), "***");
    }

    #[test]
    fn mask_field_leaves_non_personal_fields_readable() {
        assert_eq!(mask_field("urgency", "VERY_URGENT"), "VERY_URGENT");
        assert_eq!(mask_field("email", "bluebill@koena.net"), "b***@koena.net");
        assert!(!mask_field("last_name", "Bluebillington").contains("Bluebillington"));
    }
}
