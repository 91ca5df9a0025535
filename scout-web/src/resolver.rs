use std::sync::OnceLock;

use regex::Regex;
use scout_common::{DiscoveryError, OrganizationIdentity, Result};
use tracing::debug;

/// An `@` followed by a hostname-shaped run: letters, digits, `.` and `-`.
/// Letters include non-ASCII ones so internationalized domains pass through.
const DOMAIN_PATTERN: &str = r"@([\p{L}\p{N}.\-]+)";

fn domain_regex() -> Option<&'static Regex> {
    static DOMAIN_RE: OnceLock<Option<Regex>> = OnceLock::new();
    DOMAIN_RE
        .get_or_init(|| Regex::new(DOMAIN_PATTERN).ok())
        .as_ref()
}

/// Derive the organization behind `email`.
///
/// ```
/// use scout_web::resolver::resolve;
///
/// let identity = resolve("jane.doe@acme.com").unwrap();
/// assert_eq!(identity.domain, "acme.com");
/// assert_eq!(identity.display_name, "Acme");
/// assert!(resolve("jane.doe").is_err());
/// ```
pub fn resolve(email: &str) -> Result<OrganizationIdentity> {
    let domain = domain_regex()
        .and_then(|re| re.captures(email))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| DiscoveryError::InvalidFormat(email.to_string()))?;

    let identity = OrganizationIdentity::from_domain(domain);
    debug!(
        target: "scout.resolver",
        domain = %identity.domain,
        name = %identity.display_name,
        "resolver.identity"
    );
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_domain_after_at() {
        for (email, domain) in [
            ("user@domain.tld", "domain.tld"),
            ("first.last@mail.acme.co.uk", "mail.acme.co.uk"),
            ("ops@my-co.io", "my-co.io"),
            ("hr@bücher.de", "bücher.de"),
        ] {
            assert_eq!(resolve(email).unwrap().domain, domain, "{email}");
        }
    }

    #[test]
    fn hostname_run_stops_at_first_foreign_character() {
        assert_eq!(resolve("Jane <jane@acme.com>").unwrap().domain, "acme.com");
        assert_eq!(resolve("jane@acme.com, bob@other.org").unwrap().domain, "acme.com");
        assert_eq!(resolve("jane@acme.com/path").unwrap().domain, "acme.com");
    }

    #[test]
    fn rejects_strings_without_domain() {
        for email in ["", "jane", "jane.doe.acme.com", "jane@", "jane@ !"] {
            assert_eq!(
                resolve(email),
                Err(DiscoveryError::InvalidFormat(email.to_string())),
                "{email:?}"
            );
        }
    }

    #[test]
    fn domain_pattern_is_compiled_once() {
        let first = domain_regex().expect("pattern compiles");
        let second = domain_regex().expect("pattern compiles");
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn display_name_comes_from_first_label() {
        assert_eq!(resolve("a@acme.com").unwrap().display_name, "Acme");
        assert_eq!(resolve("a@my-co.io").unwrap().display_name, "My-co");
    }
}
