use crate::outcome::Outcome;
use serde::Serialize;
use std::fmt;

/// # Email Address Under Validation
///
/// The value threaded through a validation pipeline. Steps never mutate an
/// address in place: each one consumes the address it was given and hands a
/// new, fully populated value to the next step, so one address can be cloned
/// into several pipelines without interference.
///
/// ## Fields
/// - `raw`: the input exactly as supplied, never changed afterwards
/// - `normalized`: the working form, updated by the lower/trim steps
/// - `local_part` / `domain`: present only once the address is parsed
/// - `format_valid`: set by the format step
/// - `static_rank`: network-free risk score, 0 is best
///
/// ## Example JSON
/// ```json
/// {
///   "raw": " Foo@Example.com",
///   "normalized": "foo@example.com",
///   "local_part": "foo",
///   "domain": "example.com",
///   "format_valid": true,
///   "static_rank": 0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    raw: String,
    normalized: String,
    local_part: Option<String>,
    domain: Option<String>,
    format_valid: bool,
    static_rank: u32,
}

impl Address {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            normalized: raw.clone(),
            raw,
            local_part: None,
            domain: None,
            format_valid: false,
            static_rank: 0,
        }
    }

    /// Starts a validation pipeline for `raw`.
    ///
    /// # Examples
    /// ```
    /// use email_sanitizer::models::address::Address;
    ///
    /// let outcome = Address::validator("a@b.c").validate_format().parse();
    /// let address = outcome.value().unwrap();
    /// assert_eq!(address.local_part(), Some("a"));
    /// assert_eq!(address.domain(), Some("b.c"));
    /// ```
    pub fn validator(raw: impl Into<String>) -> Outcome<Address> {
        Outcome::success(Self::new(raw))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn local_part(&self) -> Option<&str> {
        self.local_part.as_deref()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Whether the address has been split into local part and domain
    pub fn is_parsed(&self) -> bool {
        self.local_part.is_some() && self.domain.is_some()
    }

    pub fn is_format_valid(&self) -> bool {
        self.format_valid
    }

    pub fn static_rank(&self) -> u32 {
        self.static_rank
    }

    pub(crate) fn with_format_valid(self) -> Self {
        Self {
            format_valid: true,
            ..self
        }
    }

    /// Both parts must be non-empty; callers check this before splitting.
    pub(crate) fn with_parts(self, local_part: String, domain: String) -> Self {
        Self {
            local_part: Some(local_part),
            domain: Some(domain),
            ..self
        }
    }

    pub(crate) fn with_static_rank(self, static_rank: u32) -> Self {
        Self {
            static_rank,
            ..self
        }
    }

    /// Case-folds the address and any parsed parts in a single transition.
    pub(crate) fn lowercased(self) -> Self {
        Self {
            normalized: self.normalized.to_lowercase(),
            local_part: self.local_part.map(|local| local.to_lowercase()),
            domain: self.domain.map(|domain| domain.to_lowercase()),
            ..self
        }
    }

    /// Trims the address and any parsed parts in a single transition.
    pub(crate) fn trimmed(self) -> Self {
        Self {
            normalized: self.normalized.trim().to_string(),
            local_part: self.local_part.map(|local| local.trim().to_string()),
            domain: self.domain.map(|domain| domain.trim().to_string()),
            ..self
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}
