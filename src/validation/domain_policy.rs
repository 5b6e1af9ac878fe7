use crate::models::address::Address;
use crate::outcome::{ErrorKind, Outcome};

const NO_DOMAIN: &str = "No domain parsed from email, cannot check domain policy";

impl Outcome<Address> {
    /// Fails with `NotAllowed` when the domain ends with `tld`.
    ///
    /// The comparison is case-insensitive and ignores a leading dot. Any
    /// suffix counts, so multi-label TLDs such as `co.uk` can be blocked too.
    ///
    /// # Examples
    /// ```
    /// use email_sanitizer::models::address::Address;
    ///
    /// let blocked = Address::validator("a@b.edu").parse().disallow_tld("edu");
    /// assert!(blocked.is_failure());
    ///
    /// let allowed = Address::validator("a@b.com").parse().disallow_tld(".edu");
    /// assert!(allowed.is_success());
    /// ```
    pub fn disallow_tld(self, tld: &str) -> Self {
        self.then(|address| {
            let Some(domain) = address.domain() else {
                return Outcome::failure(ErrorKind::Empty, NO_DOMAIN);
            };

            let tld = tld.trim().trim_start_matches('.').to_lowercase();
            if tld.is_empty() {
                return Outcome::failure(ErrorKind::Empty, "No TLD provided to disallow");
            }

            if domain.to_lowercase().ends_with(&tld) {
                return Outcome::failure(
                    ErrorKind::NotAllowed,
                    format!("'{}' is not an allowed TLD", tld),
                );
            }

            Outcome::success(address)
        })
    }

    /// Blocklist: fails with `NotAllowed` when the domain is in `domains`.
    pub fn disallow_domains<S: AsRef<str>>(self, domains: &[S]) -> Self {
        self.then(|address| {
            let Some(domain) = address.domain() else {
                return Outcome::failure(ErrorKind::Empty, NO_DOMAIN);
            };

            if domains.is_empty() {
                return Outcome::failure(
                    ErrorKind::Empty,
                    "No domains disallowed. No list provided",
                );
            }

            if domains.iter().any(|blocked| blocked.as_ref() == domain) {
                return Outcome::failure(
                    ErrorKind::NotAllowed,
                    format!("'{}' is not an allowed domain", domain),
                );
            }

            Outcome::success(address)
        })
    }

    /// Allowlist: fails with `NotAllowed` unless the domain is in `domains`.
    ///
    /// An empty allowlist is an `Empty` error rather than "allow nothing".
    pub fn allow_domains<S: AsRef<str>>(self, domains: &[S]) -> Self {
        self.then(|address| {
            let Some(domain) = address.domain() else {
                return Outcome::failure(ErrorKind::Empty, NO_DOMAIN);
            };

            if domains.is_empty() {
                return Outcome::failure(
                    ErrorKind::Empty,
                    "No domains allowed. No list provided",
                );
            }

            if !domains.iter().any(|allowed| allowed.as_ref() == domain) {
                return Outcome::failure(
                    ErrorKind::NotAllowed,
                    format!("'{}' is not an allowed domain", domain),
                );
            }

            Outcome::success(address)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(input: &str) -> Outcome<Address> {
        Address::validator(input).validate_format().parse()
    }

    #[test]
    fn test_disallow_tld() {
        let outcome = parsed("a@b.edu").disallow_tld("edu");
        assert_eq!(outcome.error_kind(), Some(ErrorKind::NotAllowed));
        assert_eq!(outcome.error_message(), Some("'edu' is not an allowed TLD"));

        assert!(parsed("a@b.com").disallow_tld("edu").is_success());
    }

    #[test]
    fn test_disallow_tld_normalizes_input() {
        assert!(parsed("a@b.EDU").disallow_tld(" .Edu ").is_failure());
        assert!(parsed("a@shop.co.uk").disallow_tld("co.uk").is_failure());
    }

    #[test]
    fn test_disallow_empty_tld() {
        let outcome = parsed("a@b.com").disallow_tld(" . ");
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Empty));
    }

    #[test]
    fn test_disallow_domains() {
        let blocked = ["foo.bar", "bar.baz"];
        for input in ["example@foo.bar", "example@bar.baz"] {
            let outcome = parsed(input).disallow_domains(&blocked);
            assert_eq!(outcome.error_kind(), Some(ErrorKind::NotAllowed));
        }

        assert!(parsed("example@gmail.com").disallow_domains(&blocked).is_success());
    }

    #[test]
    fn test_allow_only_domains() {
        let allowed = vec!["foo.bar".to_string(), "bar.baz".to_string()];
        for input in ["example@gmail.com", "example@yahoo.com"] {
            let outcome = parsed(input).allow_domains(&allowed);
            assert_eq!(outcome.error_kind(), Some(ErrorKind::NotAllowed));
        }

        assert!(parsed("example@foo.bar").allow_domains(&allowed).is_success());
    }

    #[test]
    fn test_empty_lists_are_errors() {
        let empty: [&str; 0] = [];
        assert_eq!(
            parsed("a@b.com").allow_domains(&empty).error_kind(),
            Some(ErrorKind::Empty)
        );
        assert_eq!(
            parsed("a@b.com").disallow_domains(&empty).error_kind(),
            Some(ErrorKind::Empty)
        );
    }

    #[test]
    fn test_requires_parsed_domain() {
        let outcome = Address::validator("a@b.edu").disallow_tld("edu");
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Empty));
    }
}
