use crate::config::MxConfig;
use crate::models::address::Address;
use crate::outcome::Outcome;
use crate::validation::dnsmx::MailVerifier;
use futures::future::join_all;
use tracing::debug;

/// Runs the standard pipeline on a single address.
///
/// Steps, in order: format, parse, lower, trim, local part, common typos,
/// rank, MX verification. The first failing step decides the result.
///
/// # Arguments
/// * `raw` - The address as entered
/// * `verifier` - MX capability shared by every call
/// * `config` - Optional resolver and bypass settings for the MX step
///
/// # Returns
/// The enriched [`Address`] (parsed, normalized, ranked) or the first failure.
pub async fn full_validation<V>(
    raw: &str,
    verifier: &V,
    config: Option<&MxConfig>,
) -> Outcome<Address>
where
    V: MailVerifier + ?Sized,
{
    let outcome = Address::validator(raw)
        .validate_format()
        .parse()
        .lower()
        .trim()
        .local_is_valid()
        .common_typos()
        .rank()
        .verify_mx(verifier, config)
        .await;

    if let Some(failure) = outcome.error() {
        debug!("'{}' failed validation: {}", raw, failure);
    }
    outcome
}

/// Runs [`full_validation`] for every address concurrently.
///
/// Results come back in input order.
pub async fn validate_all<V, S>(
    addresses: &[S],
    verifier: &V,
    config: Option<&MxConfig>,
) -> Vec<Outcome<Address>>
where
    V: MailVerifier + ?Sized,
    S: AsRef<str>,
{
    let validations = addresses
        .iter()
        .map(|raw| full_validation(raw.as_ref(), verifier, config))
        .collect::<Vec<_>>();

    join_all(validations).await
}
