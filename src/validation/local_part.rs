use crate::models::address::Address;
use crate::outcome::{ErrorKind, Outcome};

/// Characters other than ASCII alphanumerics allowed in a local part
const LOCAL_SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~.";

/// Validates the local part (the text before the `@`).
///
/// Accepts ASCII letters, digits and the atext specials
/// `` !#$%&'*+-/=?^_`{|}~. ``, and rejects any run of consecutive dots. Quoted
/// local parts are not supported.
///
/// # Examples
/// ```
/// use email_sanitizer::validation::local_part::local_part_is_valid;
///
/// assert!(local_part_is_valid("first.last+tag"));
/// assert!(!local_part_is_valid("first..last"));
/// assert!(!local_part_is_valid("with space"));
/// ```
pub fn local_part_is_valid(local: &str) -> bool {
    if local.is_empty() {
        return false;
    }

    local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || LOCAL_SPECIALS.contains(c))
        && !local.contains("..")
}

impl Outcome<Address> {
    /// Fails with `InvalidFormat` unless the parsed local part is valid.
    ///
    /// Requires `validate_format` and `parse` to have run first.
    pub fn local_is_valid(self) -> Self {
        self.then(|address| {
            if !address.is_format_valid() {
                return Outcome::failure(
                    ErrorKind::InvalidFormat,
                    "Format validation must be done prior to checking the local part",
                );
            }

            let Some(local) = address.local_part() else {
                return Outcome::failure(
                    ErrorKind::InvalidFormat,
                    "Parsing must be done prior to checking the local part",
                );
            };

            if !local_part_is_valid(local) {
                return Outcome::failure(
                    ErrorKind::InvalidFormat,
                    "Invalid email format - local part",
                );
            }

            Outcome::success(address)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_special_chars() {
        assert!(local_part_is_valid("!#$%&'*+-/=?^_`{}|~"));
        assert!(local_part_is_valid("8==D~~~"));
        assert!(local_part_is_valid("{$$$$}"));
        assert!(local_part_is_valid("a.b.c"));
    }

    #[test]
    fn invalid_local_parts() {
        assert!(!local_part_is_valid(""));
        assert!(!local_part_is_valid("no..dots"));
        assert!(!local_part_is_valid("a...b"));
        assert!(!local_part_is_valid("comma,here"));
        assert!(!local_part_is_valid("\"quoted\""));
        assert!(!local_part_is_valid("tëst"));
    }

    #[test]
    fn test_step_accepts_odd_but_valid_locals() {
        for input in ["8==D~~~@fake.com", "{$$$$}@fake.com"] {
            let outcome = Address::validator(input)
                .validate_format()
                .parse()
                .local_is_valid();
            assert!(outcome.is_success(), "'{}' has a valid local part", input);
        }
    }

    #[test]
    fn test_step_rejects_consecutive_dots() {
        let outcome = Address::validator("a..b@example.com")
            .validate_format()
            .parse()
            .local_is_valid();

        assert_eq!(outcome.error_kind(), Some(ErrorKind::InvalidFormat));
        assert_eq!(
            outcome.error_message(),
            Some("Invalid email format - local part")
        );
    }

    #[test]
    fn test_requires_format_validation() {
        let outcome = Address::validator("a@example.com").parse().local_is_valid();
        assert_eq!(
            outcome.error_message(),
            Some("Format validation must be done prior to checking the local part")
        );
    }

    #[test]
    fn test_requires_parsing() {
        let outcome = Address::validator("a@example.com")
            .validate_format()
            .local_is_valid();
        assert_eq!(
            outcome.error_message(),
            Some("Parsing must be done prior to checking the local part")
        );
    }
}
