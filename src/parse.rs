use regex::Regex;
use std::sync::LazyLock;

static EMAIL_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email format pattern is valid")
});

/// Loose syntax check of an email address.
///
/// Accepts `local@domain.tld` where the local part uses `[a-zA-Z0-9._%+-]`,
/// the domain uses `[a-zA-Z0-9.-]` and the TLD is two or more ASCII letters.
/// This is not an RFC 5322 parser: `a..b@x..com` passes, quoted local parts fail.
pub fn is_valid_format(email: &str) -> bool {
    EMAIL_FORMAT.is_match(email)
}

/// Returns the text after the first `@`, untouched
pub fn extract_domain(email: &str) -> Option<&str> {
    email.split('@').nth(1)
}
