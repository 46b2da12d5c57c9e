//! Display masking for secret values

/// Hide most of a secret for display.
///
/// Values of up to four characters are fully hidden; longer values keep
/// their first and last two characters. Counts Unicode scalar values, so
/// multi-byte characters are never split.
pub fn mask(value: &str) -> String {
    let len = value.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }

    let head: String = value.chars().take(2).collect();
    let tail: String = value.chars().skip(len - 2).collect();
    format!("{}{}{}", head, "*".repeat(len - 4), tail)
}
