//! Extension name validation.
//!
//! Extension names become Kubernetes object names, so they must be valid
//! DNS-1123 subdomains.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length of a DNS-1123 subdomain.
pub const DNS1123_SUBDOMAIN_MAX_LEN: usize = 253;

static DNS1123_SUBDOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("static regex must compile")
});

/// Validate an extension name against DNS-1123 subdomain syntax. Returns
/// every violation reason; an empty list means the name is valid.
pub fn validate_name(name: &str) -> Vec<String> {
    let mut reasons = Vec::new();

    if name.len() > DNS1123_SUBDOMAIN_MAX_LEN {
        reasons.push(format!(
            "must be no more than {} characters",
            DNS1123_SUBDOMAIN_MAX_LEN
        ));
    }
    if !DNS1123_SUBDOMAIN.is_match(name) {
        reasons.push(
            "a lowercase RFC 1123 subdomain must consist of lower case alphanumeric \
             characters, '-' or '.', and must start and end with an alphanumeric \
             character (e.g. 'example.com')"
                .to_string(),
        );
    }

    reasons
}
