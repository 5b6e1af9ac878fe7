/// Shape checks and normalization steps.
///
/// Provides `validate_format`, `parse`, `lower`, `trim` and `validate_basics`
/// on `Outcome<Address>`, plus the plain string predicates they use.
///
/// # Examples
/// ```
/// use email_sanitizer::models::address::Address;
///
/// let outcome = Address::validator("  Someone@Example.COM ")
///     .trim()
///     .lower()
///     .validate_format()
///     .parse();
///
/// let address = outcome.value().unwrap();
/// assert_eq!(address.domain(), Some("example.com"));
/// ```
pub mod format;

/// Local-part character rules.
pub mod local_part;

/// Known misspelled and squatted domains.
pub mod typos;

/// TLD and domain allow/deny lists.
pub mod domain_policy;

/// Heuristic risk scoring.
///
/// # Examples
/// ```
/// use email_sanitizer::validation::rank::{rank_address, REJECT_THRESHOLD};
///
/// assert_eq!(rank_address("jane@example.com").score, 0);
/// assert!(rank_address("reply@reply.craigslist.org").score >= REJECT_THRESHOLD);
/// ```
pub mod rank;

/// Temporary email services, checked against a downloaded list that is
/// cached for a configurable number of hours.
pub mod disposable;

/// Mail exchanger verification through DNS.
///
/// The step registers resolvers and bypass domains with a [`MailVerifier`]
/// and checks the address. Verified domains are remembered for the rest of
/// the process.
///
/// [`MailVerifier`]: dnsmx::MailVerifier
pub mod dnsmx;
