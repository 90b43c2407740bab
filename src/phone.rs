//! Phone number normalization for authentication.
//!
//! Telegram contacts arrive in whatever shape the user's address book holds:
//! `+7 (999) 123-45-67`, `89991234567`, `9991234567`. Account records may be
//! just as inconsistent, so both sides are reduced to the bare subscriber
//! number before comparison: strip formatting, then drop a leading `+7` or
//! `8` national prefix.

/// Keep digits only, preserving a leading `+`.
pub fn normalize(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    for (index, ch) in raw.chars().enumerate() {
        if ch.is_ascii_digit() || (index == 0 && ch == '+') {
            result.push(ch);
        }
    }
    result
}

/// Reduce a phone number to its subscriber number.
///
/// `+79991234567`, `89991234567` and `9991234567` all reduce to
/// `9991234567`.
pub fn subscriber_number(raw: &str) -> String {
    let normalized = normalize(raw);

    if let Some(rest) = normalized.strip_prefix("+7") {
        rest.to_string()
    } else if let Some(rest) = normalized.strip_prefix('8') {
        rest.to_string()
    } else {
        normalized
    }
}
