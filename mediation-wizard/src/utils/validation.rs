// Input validation utilities

use log::error;
use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"^\S+@\S+\.\S+$";
const PHONE_PATTERN: &str = r"^\+?\d{9,15}$";
const URL_PATTERN: &str = r"^(https?://)?(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)$";

fn compiled(
    cell: &'static OnceLock<Option<Regex>>,
    pattern: &str,
    case_insensitive: bool,
) -> Option<&'static Regex> {
    cell.get_or_init(|| {
        RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| error!("[PHASE: validation] Failed to compile pattern {}: {}", pattern, e))
            .ok()
    })
    .as_ref()
}

/// Email shape check (`something@domain.tld`, no whitespace).
pub fn is_valid_email(value: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&RE, EMAIL_PATTERN, true)
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

/// Phone number: optional leading `+` then 9 to 15 digits.
pub fn is_valid_phone(value: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&RE, PHONE_PATTERN, false)
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

/// Web address with optional scheme and `www.` prefix.
pub fn is_valid_url(value: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&RE, URL_PATTERN, false)
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}
