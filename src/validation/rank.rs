use crate::models::address::Address;
use crate::outcome::{ErrorKind, Outcome};
use crate::validation::local_part::local_part_is_valid;
use serde::Serialize;
use tracing::debug;

/// Scores at or above this are conventionally rejected
pub const REJECT_THRESHOLD: u32 = 10;

/// Domains that carry a fixed penalty, with their weights
const DOMAIN_PENALTIES: &[(&str, u32)] = &[
    // breached provider
    ("yahoo.com", 1),
    ("reply.facebook.com", 8),
    ("email.zillow.com", 8),
    ("reply.craigslist.org", 10),
    ("reply.linkedin.com", 8),
    ("test.com", 10),
];

const TRIGGER_WORDS: &[&str] = &["shit", "fuck", "asshole", "spam"];

/// Score plus the ordered reasons that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankReport {
    pub score: u32,
    pub reasons: Vec<String>,
}

impl RankReport {
    fn reject(reason: &str) -> Self {
        Self {
            score: REJECT_THRESHOLD,
            reasons: vec![reason.to_string()],
        }
    }

    fn add(&mut self, weight: u32, reason: impl Into<String>) {
        self.score += weight;
        self.reasons.push(reason.into());
    }

    pub fn is_reject(&self) -> bool {
        self.score >= REJECT_THRESHOLD
    }

    /// All reasons joined into one line
    pub fn summary(&self) -> String {
        self.reasons.join(", ")
    }
}

/// Scoring capability used by the rank step.
#[cfg_attr(test, mockall::automock)]
pub trait Ranker: Send + Sync {
    fn rank(&self, address: &str) -> RankReport;
}

/// The built-in network-free heuristic ranker. See [`rank_address`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRanker;

impl Ranker for StaticRanker {
    fn rank(&self, address: &str) -> RankReport {
        rank_address(address)
    }
}

/// Scores an address using only its text. Higher is worse.
///
/// Structurally broken addresses score exactly [`REJECT_THRESHOLD`] with a
/// single reason. Otherwise weak signals are added up in stages, and the
/// scan stops early at a checkpoint once the score reaches the threshold:
///
/// 1. local part length and digit density, throwaway locals, penalized domains
/// 2. `reply.` domains, deep subdomains, unusual TLDs, `reply` locals
/// 3. trigger words in the local part, +2 for each word found
///
/// # Examples
/// ```
/// use email_sanitizer::validation::rank::rank_address;
///
/// let report = rank_address("test@test.com");
/// assert!(report.score >= 10);
///
/// let report = rank_address("noat.com");
/// assert_eq!(report.score, 10);
/// assert_eq!(report.reasons, vec!["no @"]);
/// ```
pub fn rank_address(address: &str) -> RankReport {
    if address.is_empty() {
        return RankReport::reject("null/empty email");
    }

    let Some((local, rest)) = address.split_once('@') else {
        return RankReport::reject("no @");
    };

    if !address.contains('.') {
        return RankReport::reject("no .");
    }

    // the domain segment stops at any further '@'
    let domain = rest.split_once('@').map_or(rest, |(domain, _)| domain);
    if !domain.contains('.') {
        return RankReport::reject("no . in the domain");
    }

    let local = local.to_lowercase();
    let domain = domain.to_lowercase();

    if !local_part_is_valid(&local) {
        return RankReport::reject("invalid local");
    }

    if domain.contains("hardbounce") {
        return RankReport::reject("domain contains hardbounce");
    }

    let mut report = RankReport::default();

    let local_len = local.chars().count();
    if local_len > 20 {
        report.add(1, "local length > 20");
    }

    let digits = local.chars().filter(char::is_ascii_digit).count();
    if digits > 7 {
        report.add(1, "more than 7 numbers in local");
    }
    if digits > 14 {
        report.add(2, "more than 14 numbers in local");
    }
    if digits > 0 && digits as f64 / local_len as f64 > 0.8 {
        report.add(1, "more than 80% numbers in local");
    }

    if local == "test" {
        report.add(1, "local = test");
    }
    if local == "asdf" {
        report.add(1, "local = asdf");
    }

    if let Some((_, weight)) = DOMAIN_PENALTIES.iter().find(|(bad, _)| *bad == domain) {
        report.add(*weight, format!("domain = {}", domain));
    }

    if report.is_reject() {
        return report;
    }

    if domain.starts_with("reply.") {
        report.add(7, "domain starts with reply.");
    }

    let label_count = domain.split('.').count() as u32;
    if label_count > 2 {
        report.add(label_count - 2, "domain has more than usual segments");
    }

    let tail = domain.rsplit('.').next().unwrap_or_default();
    if tail.chars().count() == 1 {
        report.add(1, "domain tld is 1 char");
    } else {
        if tail == "edu" {
            report.add(1, "domain tld is edu");
        }
        if tail.chars().count() > 4 {
            report.add(2, "domain tld is longer than 4 characters");
        }
    }

    if local.starts_with("reply") {
        report.add(1, "local starts with reply");
    }
    if local.starts_with("reply-") {
        report.add(1, "local starts with reply-");
    }

    if report.is_reject() {
        return report;
    }

    for word in TRIGGER_WORDS {
        if local.contains(word) {
            report.add(2, format!("local contains trigger word '{}'", word));
        }
    }

    report
}

impl Outcome<Address> {
    /// Stores the built-in ranker's score as the address's static rank.
    ///
    /// A high score does not fail the pipeline; inspect
    /// [`Address::static_rank`] or add an `ensure` step to reject on it.
    pub fn rank(self) -> Self {
        self.rank_with(&StaticRanker)
    }

    /// Same as [`Outcome::rank`] with a caller supplied ranker.
    pub fn rank_with<R>(self, ranker: &R) -> Self
    where
        R: Ranker + ?Sized,
    {
        self.then(|address| {
            if address.normalized().is_empty() {
                return Outcome::failure(
                    ErrorKind::Empty,
                    "No email address provided, cannot rank",
                );
            }

            let report = ranker.rank(address.normalized());
            debug!(
                "Ranked '{}' at {} ({})",
                address.normalized(),
                report.score,
                report.summary()
            );

            Outcome::success(address.with_static_rank(report.score))
        })
    }
}
