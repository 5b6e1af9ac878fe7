use crate::models::address::Address;
use crate::outcome::{ErrorKind, Outcome};

/// Checks the coarse shape of an email address.
///
/// The address must contain exactly one `@`, a non-empty local part before
/// it, and a domain after it that contains at least one `.`. This is not an
/// RFC 5322 grammar check.
///
/// # Examples
/// ```
/// use email_sanitizer::validation::format::is_valid_format;
///
/// assert!(is_valid_format("user@example.com"));
/// assert!(!is_valid_format("user@localhost"));
/// assert!(!is_valid_format("user@@example.com"));
/// ```
pub fn is_valid_format(address: &str) -> bool {
    let mut parts = address.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => !local.is_empty() && domain.contains('.'),
        _ => false,
    }
}

/// `true` if `value` is non-empty and at least `min` characters long
pub fn is_long_enough(value: &str, min: usize) -> bool {
    !value.is_empty() && value.chars().count() >= min
}

/// `true` if `value` is non-empty and exactly `length` characters long
pub fn is_length(value: &str, length: usize) -> bool {
    !value.is_empty() && value.chars().count() == length
}

/// Splits on the first `@`, requiring both sides to be non-empty.
fn split_parts(address: &str) -> Option<(String, String)> {
    address
        .split_once('@')
        .filter(|(local, domain)| !local.is_empty() && !domain.is_empty())
        .map(|(local, domain)| (local.to_string(), domain.to_string()))
}

impl Outcome<Address> {
    /// Marks the address as format-valid or fails with `InvalidFormat`.
    ///
    /// Running it again on an already validated address is a no-op.
    pub fn validate_format(self) -> Self {
        self.then(|address| {
            if address.is_format_valid() {
                return Outcome::success(address);
            }

            if address.normalized().is_empty() {
                return Outcome::failure(
                    ErrorKind::Empty,
                    "No email provided, cannot validate format",
                );
            }

            if !is_valid_format(address.normalized()) {
                return Outcome::failure(ErrorKind::InvalidFormat, "Invalid email format");
            }

            Outcome::success(address.with_format_valid())
        })
    }

    /// Splits the address into local part and domain on its first `@`.
    ///
    /// Parsing an already parsed address is a no-op.
    pub fn parse(self) -> Self {
        self.then(|address| {
            if address.is_parsed() {
                return Outcome::success(address);
            }

            if address.normalized().is_empty() {
                return Outcome::failure(ErrorKind::Empty, "Missing address, cannot parse");
            }

            match split_parts(address.normalized()) {
                Some((local, domain)) => Outcome::success(address.with_parts(local, domain)),
                None => Outcome::failure(
                    ErrorKind::InvalidFormat,
                    "Invalid email format, cannot parse",
                ),
            }
        })
    }

    /// Lower-cases the address together with any parsed parts.
    pub fn lower(self) -> Self {
        self.then(|address| {
            if address.normalized().is_empty() {
                return Outcome::failure(ErrorKind::Empty, "No email provided, cannot lowercase");
            }

            Outcome::success(address.lowercased())
        })
    }

    /// Trims surrounding whitespace from the address and any parsed parts.
    pub fn trim(self) -> Self {
        self.then(|address| {
            if address.normalized().is_empty() {
                return Outcome::failure(ErrorKind::Empty, "No email provided, cannot trim");
            }

            let address = address.trimmed();
            let emptied = address.local_part().is_some_and(str::is_empty)
                || address.domain().is_some_and(str::is_empty);

            if emptied {
                return Outcome::failure(
                    ErrorKind::InvalidFormat,
                    "Trimming left an empty local part or domain",
                );
            }

            Outcome::success(address)
        })
    }

    /// Baseline checks: present, at least five characters, well formed.
    ///
    /// On success the address comes back trimmed, lower-cased, format-valid
    /// and parsed.
    pub fn validate_basics(self) -> Self {
        self.ensure(
            |address| !address.normalized().is_empty(),
            ErrorKind::Empty,
            "No email address provided",
        )
        .ensure(
            |address| is_long_enough(address.normalized(), 5),
            ErrorKind::TooShort,
            "Invalid format - email is too short to be real",
        )
        .then(|address| {
            let message = format!(
                "Invalid format. This email '{}' can't be real",
                address.normalized()
            );
            Outcome::success(address).ensure(
                |address| is_valid_format(address.normalized()),
                ErrorKind::InvalidFormat,
                message,
            )
        })
        .then(|address| {
            let address = address.trimmed().lowercased();
            match split_parts(address.normalized()) {
                Some((local, domain)) if is_valid_format(address.normalized()) => {
                    Outcome::success(address.with_format_valid().with_parts(local, domain))
                }
                _ => {
                    let message = format!(
                        "Invalid format. This email '{}' can't be real once trimmed",
                        address.normalized()
                    );
                    Outcome::failure(ErrorKind::InvalidFormat, message)
                }
            }
        })
    }
}
